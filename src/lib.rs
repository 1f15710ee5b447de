//! # Picograd: Minimal Reverse-Mode Autograd
//!
//! Picograd records elementwise tensor arithmetic into a computational graph and
//! propagates gradients backward through it.
//!
//! ## Architecture
//!
//! - **autograd**: Arena-backed graph, `add`/`mul` combine ops, and the backward pass
//! - **config**: Declarative YAML configuration for graph limits and diagnostics
//!
//! ## Example
//!
//! ```
//! use picograd::autograd::{add, mul, Graph};
//!
//! let graph = Graph::new();
//! let a = graph.from_vec(vec![1.0, 2.0], true)?;
//! let b = graph.from_vec(vec![3.0, 4.0], true)?;
//!
//! let c = mul(&add(&a, &b)?, &a)?;
//! c.backward()?;
//!
//! // dc/da = (a + b) + a, dc/db = a
//! let grad_a: Vec<f32> = a.grad().unwrap().iter().copied().collect();
//! let grad_b: Vec<f32> = b.grad().unwrap().iter().copied().collect();
//! assert_eq!(grad_a, vec![5.0, 8.0]);
//! assert_eq!(grad_b, vec![1.0, 2.0]);
//! # Ok::<(), picograd::Error>(())
//! ```

pub mod autograd;
pub mod config;

pub mod error;

// Re-export commonly used types
pub use autograd::{add, backward, mul, BinaryOp, Graph, NodeId, Tensor};
pub use config::GraphConfig;
pub use error::{Error, Result};
