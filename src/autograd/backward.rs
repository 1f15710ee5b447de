//! Backward pass over the arena
//!
//! Traversal is an explicit worklist. A node enters the worklist once every
//! dependent registered in its `children` map has delivered its contribution;
//! the root enters unconditionally. Graph depth never grows the call stack.

use super::graph::{Arena, NodeId};
use crate::error::{Error, Result};
use log::{debug, trace, warn};
use ndarray::ArrayD;
use std::collections::HashSet;

/// Propagate gradients from `root` to its ancestors.
///
/// `seed` defaults to ones of the root's shape. Gradients accumulate into whatever
/// the nodes already hold; call `zero_grad` between passes for fresh results.
/// Without a reset, exhausted counts make a node ready on every delivery, but it
/// is queued at most once at a time, so deliveries that arrive before it is
/// processed are forwarded together as one propagation.
///
/// On error the pass stops where it is and gradients already delivered remain.
pub(crate) fn run_backward(
    arena: &mut Arena,
    root: NodeId,
    seed: Option<ArrayD<f32>>,
) -> Result<()> {
    let node = arena.node(root);
    if !node.requires_grad {
        trace!("backward on untracked {} is a no-op", root);
        return Ok(());
    }

    let seed = match seed {
        Some(grad) => {
            if grad.shape() != node.data.shape() {
                return Err(Error::ShapeMismatch {
                    expected: node.data.shape().to_vec(),
                    got: grad.shape().to_vec(),
                });
            }
            grad
        }
        None => ArrayD::ones(node.data.raw_dim()),
    };

    debug!("backward from {}", root);
    arena.node_mut(root).accumulate(seed)?;

    let mut worklist = vec![root];
    let mut queued: HashSet<NodeId> = HashSet::from([root]);
    let mut propagated = 0usize;

    while let Some(id) = worklist.pop() {
        queued.remove(&id);

        let node = arena.node(id);
        let Some(producer) = node.producer else {
            continue;
        };
        let Some(grad) = node.grad.as_ref() else {
            continue;
        };

        let [lhs, rhs] = producer.parents;
        let contributions = producer
            .op
            .backward(grad, &arena.node(lhs).data, &arena.node(rhs).data);
        propagated += 1;

        for (parent, contribution) in producer.parents.into_iter().zip(contributions) {
            if deliver(arena, parent, id, contribution)? && queued.insert(parent) {
                worklist.push(parent);
            }
        }
    }

    debug!("backward from {} finished after {} propagations", root, propagated);
    Ok(())
}

/// Accumulate a contribution from `origin` into `target` and acknowledge it.
///
/// Returns whether `target` is an interior node that is now ready to propagate.
fn deliver(
    arena: &mut Arena,
    target: NodeId,
    origin: NodeId,
    contribution: ArrayD<f32>,
) -> Result<bool> {
    let node = arena.node_mut(target);
    if !node.requires_grad {
        return Ok(false);
    }

    node.accumulate(contribution)?;

    match node.children.get_mut(&origin) {
        Some(count) if *count > 0 => {
            *count -= 1;
            trace!("{} -> {}: {} contributions still owed", origin, target, count);
        }
        _ => warn!(
            "{} already received every contribution from {}; accumulating across passes",
            target, origin
        ),
    }

    Ok(!node.is_leaf() && node.is_ready())
}
