//! YAML schema for graph configuration

use serde::{Deserialize, Serialize};

/// Settings applied to every node recorded in a [`Graph`](crate::autograd::Graph)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Maximum number of nodes the arena may hold (unbounded if absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_nodes: Option<usize>,

    /// Log a warning when mixing tracked and untracked operands drops tracking
    #[serde(default = "default_true")]
    pub warn_on_dropped_tracking: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            max_nodes: None,
            warn_on_dropped_tracking: true,
        }
    }
}

fn default_true() -> bool {
    true
}
