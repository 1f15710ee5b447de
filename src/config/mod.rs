//! Declarative YAML configuration
//!
//! Graph limits and diagnostics can be set in code or loaded from YAML.
//!
//! # Example
//!
//! ```yaml
//! max_nodes: 100000
//! warn_on_dropped_tracking: false
//! ```

mod load;
mod schema;
mod validate;

pub use load::load_config;
pub use schema::GraphConfig;
pub use validate::{validate_config, ValidationError};
