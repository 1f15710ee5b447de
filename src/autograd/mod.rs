//! Arena-based autograd engine
//!
//! Records elementwise `add`/`mul` into a computational graph and propagates
//! gradients backward with fan-in accounting: a node only forwards its gradient
//! once every dependent has delivered its share.

mod backward;
mod graph;
mod op;
mod ops;
mod snapshot;
mod tensor;


pub use graph::{Graph, NodeId};
pub use op::BinaryOp;
pub use ops::*;
pub use snapshot::{GraphSnapshot, NodeSnapshot};
pub use tensor::Tensor;

use crate::error::Result;

/// Perform backward pass on a tensor
///
/// With `grad_output = None` the pass is seeded with ones of the tensor's shape.
pub fn backward(tensor: &Tensor, grad_output: Option<ndarray::ArrayD<f32>>) -> Result<()> {
    match grad_output {
        Some(grad) => tensor.backward_with(grad),
        None => tensor.backward(),
    }
}
