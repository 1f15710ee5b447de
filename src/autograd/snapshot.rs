//! Serializable view of a graph
//!
//! A snapshot copies every node record out of the arena with plain indices, so
//! it can be compared in tests or dumped as JSON for inspection.

use super::graph::Graph;
use super::op::BinaryOp;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One node of a [`GraphSnapshot`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub id: usize,
    /// `None` for leaves
    pub op: Option<BinaryOp>,
    pub parents: Vec<usize>,
    /// Outstanding contributions keyed by dependent id
    pub children: BTreeMap<usize, usize>,
    /// Registered contributions keyed by dependent id, restored by `zero_grad`
    pub fan_in: BTreeMap<usize, usize>,
    pub requires_grad: bool,
    pub shape: Vec<usize>,
    pub data: Vec<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grad: Option<Vec<f32>>,
}

/// All nodes of a graph, in id order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<NodeSnapshot>,
}

impl GraphSnapshot {
    /// Capture the current state of `graph`
    pub fn capture(graph: &Graph) -> Self {
        let arena = graph.arena();
        let nodes = arena
            .nodes
            .iter()
            .enumerate()
            .map(|(id, node)| NodeSnapshot {
                id,
                op: node.producer.map(|p| p.op),
                parents: node
                    .producer
                    .map(|p| p.parents.iter().map(|parent| parent.index()).collect())
                    .unwrap_or_default(),
                children: node
                    .children
                    .iter()
                    .map(|(dependent, &count)| (dependent.index(), count))
                    .collect(),
                fan_in: node
                    .fan_in
                    .iter()
                    .map(|(dependent, &count)| (dependent.index(), count))
                    .collect(),
                requires_grad: node.requires_grad,
                shape: node.data.shape().to_vec(),
                data: node.data.iter().copied().collect(),
                grad: node.grad.as_ref().map(|g| g.iter().copied().collect()),
            })
            .collect();

        Self { nodes }
    }

    /// Pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Parse a snapshot previously produced by [`GraphSnapshot::to_json`]
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))
    }
}

impl Graph {
    /// Capture a serializable snapshot of every node
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot::capture(self)
    }
}
