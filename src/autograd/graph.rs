//! Arena-backed computational graph
//!
//! Every tensor lives as a record in a single `Vec`, addressed by [`NodeId`].
//! Parent and dependent links are ids, never references, so the graph is a plain
//! DAG of indices: parents always have smaller ids than the nodes they produce.

use super::op::BinaryOp;
use super::tensor::Tensor;
use crate::config::GraphConfig;
use crate::error::{Error, Result};
use log::warn;
use ndarray::{ArrayD, IxDyn};
use std::cell::{Ref, RefCell, RefMut};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// Index of a node in its graph's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Get the arena index
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Operation and operands that produced a non-leaf node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Producer {
    pub(crate) op: BinaryOp,
    pub(crate) parents: [NodeId; 2],
}

/// A single record in the arena
#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) data: ArrayD<f32>,
    pub(crate) grad: Option<ArrayD<f32>>,
    pub(crate) requires_grad: bool,
    pub(crate) producer: Option<Producer>,
    /// Outstanding backward contributions owed by each dependent
    pub(crate) children: BTreeMap<NodeId, usize>,
    /// Registered contributions per dependent, restored by `zero_grad`
    pub(crate) fan_in: BTreeMap<NodeId, usize>,
}

impl Node {
    /// Gradient state of a freshly constructed node
    fn initial_grad(data: &ArrayD<f32>, requires_grad: bool, is_leaf: bool) -> Option<ArrayD<f32>> {
        if requires_grad && is_leaf {
            Some(ArrayD::zeros(data.raw_dim()))
        } else {
            None
        }
    }

    pub(crate) fn is_leaf(&self) -> bool {
        self.producer.is_none()
    }

    /// True once every dependent has delivered its contribution
    pub(crate) fn is_ready(&self) -> bool {
        self.children.values().all(|&count| count == 0)
    }

    /// Add a contribution into `grad`, initialising it if unset.
    pub(crate) fn accumulate(&mut self, contribution: ArrayD<f32>) -> Result<()> {
        if contribution.shape() != self.data.shape() {
            return Err(Error::ShapeMismatch {
                expected: self.data.shape().to_vec(),
                got: contribution.shape().to_vec(),
            });
        }

        match self.grad.as_mut() {
            Some(existing) => *existing += &contribution,
            None => self.grad = Some(contribution),
        }
        Ok(())
    }

    /// Restore construction-time gradient and dependent counts
    pub(crate) fn reset(&mut self) {
        self.grad = Self::initial_grad(&self.data, self.requires_grad, self.is_leaf());
        self.children = self.fan_in.clone();
    }
}

/// Node storage shared by every tensor handle of one graph
#[derive(Debug)]
pub(crate) struct Arena {
    pub(crate) nodes: Vec<Node>,
    pub(crate) config: GraphConfig,
}

impl Arena {
    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    fn push(&mut self, node: Node) -> Result<NodeId> {
        if let Some(limit) = self.config.max_nodes {
            if self.nodes.len() >= limit {
                return Err(Error::GraphFull { limit });
            }
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        Ok(id)
    }

    /// Append a leaf record
    pub(crate) fn push_leaf(&mut self, data: ArrayD<f32>, requires_grad: bool) -> Result<NodeId> {
        let grad = Node::initial_grad(&data, requires_grad, true);
        self.push(Node {
            data,
            grad,
            requires_grad,
            producer: None,
            children: BTreeMap::new(),
            fan_in: BTreeMap::new(),
        })
    }

    /// Apply `op` to two existing nodes and record the result.
    ///
    /// Operands broadcast like ndarray/numpy arrays. The edge is only recorded when
    /// both operands track gradients; otherwise the result is an untracked leaf.
    pub(crate) fn push_binary(&mut self, op: BinaryOp, lhs: NodeId, rhs: NodeId) -> Result<NodeId> {
        let (left, right) = (self.node(lhs), self.node(rhs));
        let data = op.forward(&left.data, &right.data)?;
        let tracked = left.requires_grad && right.requires_grad;

        if !tracked {
            if self.config.warn_on_dropped_tracking && (left.requires_grad || right.requires_grad) {
                warn!(
                    "{} of {} and {} mixes tracked and untracked operands; result is untracked",
                    op, lhs, rhs
                );
            }
            return self.push_leaf(data, false);
        }

        let id = self.push(Node {
            data,
            grad: None,
            requires_grad: true,
            producer: Some(Producer {
                op,
                parents: [lhs, rhs],
            }),
            children: BTreeMap::new(),
            fan_in: BTreeMap::new(),
        })?;

        // Self-use (x op x) registers the same dependent twice
        for parent in [lhs, rhs] {
            let node = self.node_mut(parent);
            *node.children.entry(id).or_insert(0) += 1;
            *node.fan_in.entry(id).or_insert(0) += 1;
        }

        Ok(id)
    }

    /// Ids of `root` and all of its ancestors, in no particular order
    pub(crate) fn ancestors(&self, root: NodeId) -> Vec<NodeId> {
        let mut seen = vec![false; self.nodes.len()];
        let mut stack = vec![root];
        let mut out = Vec::new();

        while let Some(id) = stack.pop() {
            if std::mem::replace(&mut seen[id.0], true) {
                continue;
            }
            out.push(id);
            if let Some(producer) = self.node(id).producer {
                stack.extend(producer.parents);
            }
        }

        out
    }
}

/// Computational graph handle
///
/// Cloning a `Graph` is cheap and yields another handle to the same arena.
/// Tensors keep their graph alive; nodes are never removed individually.
#[derive(Clone)]
pub struct Graph {
    inner: Rc<RefCell<Arena>>,
}

impl Graph {
    /// Create an empty graph with default configuration
    pub fn new() -> Self {
        Self::with_config(GraphConfig::default())
    }

    /// Create an empty graph with the given configuration
    pub fn with_config(config: GraphConfig) -> Self {
        let nodes = match config.max_nodes {
            Some(limit) => Vec::with_capacity(limit.min(1024)),
            None => Vec::new(),
        };
        Self {
            inner: Rc::new(RefCell::new(Arena { nodes, config })),
        }
    }

    /// Create a leaf tensor from an n-dimensional array
    pub fn tensor(&self, data: ArrayD<f32>, requires_grad: bool) -> Result<Tensor> {
        let id = self.arena_mut().push_leaf(data, requires_grad)?;
        Ok(Tensor::from_parts(id, self.clone()))
    }

    /// Create a 1-D leaf tensor from a vector
    pub fn from_vec(&self, data: Vec<f32>, requires_grad: bool) -> Result<Tensor> {
        self.tensor(ArrayD::from_shape_vec(IxDyn(&[data.len()]), data)?, requires_grad)
    }

    /// Create a leaf tensor with the given shape from row-major values
    pub fn from_shape_vec(
        &self,
        shape: &[usize],
        data: Vec<f32>,
        requires_grad: bool,
    ) -> Result<Tensor> {
        self.tensor(ArrayD::from_shape_vec(IxDyn(shape), data)?, requires_grad)
    }

    /// Create a 0-dimensional leaf tensor
    pub fn scalar(&self, value: f32, requires_grad: bool) -> Result<Tensor> {
        self.tensor(ArrayD::from_elem(IxDyn(&[]), value), requires_grad)
    }

    /// Create a leaf tensor filled with zeros
    pub fn zeros(&self, shape: &[usize], requires_grad: bool) -> Result<Tensor> {
        self.tensor(ArrayD::zeros(IxDyn(shape)), requires_grad)
    }

    /// Create a leaf tensor filled with ones
    pub fn ones(&self, shape: &[usize], requires_grad: bool) -> Result<Tensor> {
        self.tensor(ArrayD::ones(IxDyn(shape)), requires_grad)
    }

    /// Number of nodes recorded so far
    pub fn len(&self) -> usize {
        self.arena().nodes.len()
    }

    /// Check if no node has been recorded
    pub fn is_empty(&self) -> bool {
        self.arena().nodes.is_empty()
    }

    /// Configuration this graph was built with
    pub fn config(&self) -> GraphConfig {
        self.arena().config.clone()
    }

    /// Whether two handles refer to the same arena
    pub fn same_graph(&self, other: &Graph) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn arena(&self) -> Ref<'_, Arena> {
        self.inner.borrow()
    }

    pub(crate) fn arena_mut(&self) -> RefMut<'_, Arena> {
        self.inner.borrow_mut()
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arena = self.arena();
        f.debug_struct("Graph")
            .field("num_nodes", &arena.nodes.len())
            .field("config", &arena.config)
            .finish()
    }
}
