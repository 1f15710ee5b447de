//! Graph-recording combine operations

use super::op::BinaryOp;
use super::Tensor;
use crate::error::{Error, Result};

/// Add two tensors element-wise
///
/// The result is tracked only if both operands are; otherwise it is a plain
/// untracked leaf and the edge to the operands is not recorded.
pub fn add(a: &Tensor, b: &Tensor) -> Result<Tensor> {
    combine(BinaryOp::Add, a, b)
}

/// Multiply two tensors element-wise
///
/// Same tracking rule as [`add`].
pub fn mul(a: &Tensor, b: &Tensor) -> Result<Tensor> {
    combine(BinaryOp::Mul, a, b)
}

fn combine(op: BinaryOp, a: &Tensor, b: &Tensor) -> Result<Tensor> {
    let graph = a.graph();
    if !graph.same_graph(b.graph()) {
        return Err(Error::GraphMismatch);
    }

    let id = graph.arena_mut().push_binary(op, a.id(), b.id())?;
    Ok(Tensor::from_parts(id, graph.clone()))
}
