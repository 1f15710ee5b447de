//! Tensor handle with gradient tracking

use super::backward::run_backward;
use super::graph::{Graph, NodeId};
use super::op::BinaryOp;
use crate::error::Result;
use log::debug;
use ndarray::ArrayD;
use std::collections::BTreeMap;

/// Tensor with automatic differentiation support
///
/// A `Tensor` is a handle: a node id plus the graph that owns the node. Cloning
/// it does not copy data, and two clones compare as the same node.
#[derive(Clone)]
pub struct Tensor {
    id: NodeId,
    graph: Graph,
}

impl Tensor {
    pub(crate) fn from_parts(id: NodeId, graph: Graph) -> Self {
        Self { id, graph }
    }

    /// Node id within the owning graph
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Graph that owns this tensor
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Copy of the forward value
    pub fn data(&self) -> ArrayD<f32> {
        self.graph.arena().node(self.id).data.clone()
    }

    /// Shape of the forward value
    pub fn shape(&self) -> Vec<usize> {
        self.graph.arena().node(self.id).data.shape().to_vec()
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.graph.arena().node(self.id).data.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get gradient (if any has been set)
    pub fn grad(&self) -> Option<ArrayD<f32>> {
        self.graph.arena().node(self.id).grad.clone()
    }

    /// Check if requires gradient
    pub fn requires_grad(&self) -> bool {
        self.graph.arena().node(self.id).requires_grad
    }

    /// Operation that produced this tensor, `None` for leaves
    pub fn op(&self) -> Option<BinaryOp> {
        self.graph.arena().node(self.id).producer.map(|p| p.op)
    }

    /// Check if this tensor is a leaf
    pub fn is_leaf(&self) -> bool {
        self.graph.arena().node(self.id).is_leaf()
    }

    /// Operands this tensor was produced from (empty for leaves)
    pub fn parents(&self) -> Vec<Tensor> {
        match self.graph.arena().node(self.id).producer {
            Some(producer) => producer
                .parents
                .iter()
                .map(|&id| Tensor::from_parts(id, self.graph.clone()))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Outstanding backward contributions per dependent
    pub fn children(&self) -> BTreeMap<NodeId, usize> {
        self.graph.arena().node(self.id).children.clone()
    }

    /// Run a backward pass seeded with ones of this tensor's shape
    pub fn backward(&self) -> Result<()> {
        run_backward(&mut self.graph.arena_mut(), self.id, None)
    }

    /// Run a backward pass seeded with an explicit upstream gradient
    pub fn backward_with(&self, grad: ArrayD<f32>) -> Result<()> {
        run_backward(&mut self.graph.arena_mut(), self.id, Some(grad))
    }

    /// Reset gradients and dependent counts of this tensor and all its ancestors
    ///
    /// Tracked leaves go back to zero gradients, produced tensors to no gradient,
    /// and every dependent count to the number of times it was registered. Nodes
    /// outside the ancestry are untouched.
    pub fn zero_grad(&self) {
        let mut arena = self.graph.arena_mut();
        let ids = arena.ancestors(self.id);
        debug!("zero_grad from {} resets {} nodes", self.id, ids.len());
        for id in ids {
            arena.node_mut(id).reset();
        }
    }
}

impl PartialEq for Tensor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.graph.same_graph(&other.graph)
    }
}

impl Eq for Tensor {}

impl std::fmt::Debug for Tensor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let arena = self.graph.arena();
        let node = arena.node(self.id);
        f.debug_struct("Tensor")
            .field("id", &self.id)
            .field("data", &node.data)
            .field("grad", &node.grad)
            .field("requires_grad", &node.requires_grad)
            .field("op", &node.producer.map(|p| p.op))
            .finish()
    }
}
