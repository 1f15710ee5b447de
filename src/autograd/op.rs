//! Binary operations and their local-derivative rules

use crate::error::{Error, Result};
use ndarray::{ArrayD, IxDyn};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Operation that produced a non-leaf node
///
/// Leaves have no producing operation, so the leaf tag is `Option::<BinaryOp>::None`
/// wherever an op is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinaryOp {
    /// Elementwise addition
    Add,
    /// Elementwise multiplication
    Mul,
}

impl BinaryOp {
    /// Tag used in logs and snapshots
    pub fn name(&self) -> &'static str {
        match self {
            BinaryOp::Add => "add",
            BinaryOp::Mul => "mul",
        }
    }

    /// Apply the elementwise kernel, broadcasting both operands to a common shape.
    pub fn forward(&self, lhs: &ArrayD<f32>, rhs: &ArrayD<f32>) -> Result<ArrayD<f32>> {
        let mismatch = || Error::ShapeMismatch {
            expected: lhs.shape().to_vec(),
            got: rhs.shape().to_vec(),
        };
        let shape = IxDyn(&broadcast_shape(lhs.shape(), rhs.shape()).ok_or_else(mismatch)?);
        let left = lhs.broadcast(shape.clone()).ok_or_else(mismatch)?;
        let right = rhs.broadcast(shape).ok_or_else(mismatch)?;

        Ok(match self {
            BinaryOp::Add => &left + &right,
            BinaryOp::Mul => &left * &right,
        })
    }

    /// Route `grad` to both operands.
    ///
    /// Returns `[∂L/∂lhs, ∂L/∂rhs]` given `grad = ∂L/∂out` and the operands' forward data.
    pub fn backward(
        &self,
        grad: &ArrayD<f32>,
        lhs: &ArrayD<f32>,
        rhs: &ArrayD<f32>,
    ) -> [ArrayD<f32>; 2] {
        match self {
            // ∂(a+b)/∂a = ∂(a+b)/∂b = 1
            BinaryOp::Add => [grad.clone(), grad.clone()],
            // ∂(a*b)/∂a = b, ∂(a*b)/∂b = a
            BinaryOp::Mul => [grad * rhs, grad * lhs],
        }
    }
}

/// Common shape of two operands under numpy broadcasting rules
///
/// Trailing axes are aligned; each pair must be equal or contain a 1.
pub fn broadcast_shape(lhs: &[usize], rhs: &[usize]) -> Option<Vec<usize>> {
    let ndim = lhs.len().max(rhs.len());
    let mut shape = vec![0; ndim];

    for axis in 0..ndim {
        let l = axis.checked_sub(ndim - lhs.len()).map_or(1, |i| lhs[i]);
        let r = axis.checked_sub(ndim - rhs.len()).map_or(1, |i| rhs[i]);
        shape[axis] = match (l, r) {
            (l, r) if l == r => l,
            (1, r) => r,
            (l, 1) => l,
            _ => return None,
        };
    }

    Some(shape)
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, IxDyn};

    fn dyn1(values: &[f32]) -> ArrayD<f32> {
        arr1(values).into_dyn()
    }

    #[test]
    fn test_forward_kernels() {
        let a = dyn1(&[1.0, 2.0]);
        let b = dyn1(&[3.0, 4.0]);

        assert_eq!(BinaryOp::Add.forward(&a, &b).unwrap(), dyn1(&[4.0, 6.0]));
        assert_eq!(BinaryOp::Mul.forward(&a, &b).unwrap(), dyn1(&[3.0, 8.0]));
    }

    #[test]
    fn test_forward_broadcasts_both_sides() {
        let scalar = ArrayD::from_elem(IxDyn(&[]), 2.0);
        let v = dyn1(&[1.0, 2.0, 3.0]);

        assert_eq!(BinaryOp::Mul.forward(&v, &scalar).unwrap(), dyn1(&[2.0, 4.0, 6.0]));
        assert_eq!(BinaryOp::Add.forward(&scalar, &v).unwrap(), dyn1(&[3.0, 4.0, 5.0]));

        let column = ArrayD::from_shape_vec(IxDyn(&[2, 1]), vec![10.0, 20.0]).unwrap();
        let out = BinaryOp::Add.forward(&column, &v).unwrap();
        assert_eq!(out.shape(), &[2, 3]);
        assert_eq!(
            out.iter().copied().collect::<Vec<_>>(),
            vec![11.0, 12.0, 13.0, 21.0, 22.0, 23.0]
        );
    }

    #[test]
    fn test_forward_rejects_incompatible_shapes() {
        let result = BinaryOp::Add.forward(&dyn1(&[1.0, 2.0]), &dyn1(&[1.0, 2.0, 3.0]));
        match result {
            Err(Error::ShapeMismatch { expected, got }) => {
                assert_eq!(expected, vec![2]);
                assert_eq!(got, vec![3]);
            }
            other => panic!("expected shape mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_broadcast_shape() {
        assert_eq!(broadcast_shape(&[3], &[]), Some(vec![3]));
        assert_eq!(broadcast_shape(&[3], &[1]), Some(vec![3]));
        assert_eq!(broadcast_shape(&[2, 1], &[4]), Some(vec![2, 4]));
        assert_eq!(broadcast_shape(&[5, 1, 3], &[4, 1]), Some(vec![5, 4, 3]));
        assert_eq!(broadcast_shape(&[2], &[3]), None);
        assert_eq!(broadcast_shape(&[2, 3], &[3, 3]), None);
    }

    #[test]
    fn test_add_routes_gradient_unchanged() {
        let grad = dyn1(&[0.5, 2.0]);
        let [ga, gb] = BinaryOp::Add.backward(&grad, &dyn1(&[9.0, 9.0]), &dyn1(&[7.0, 7.0]));
        assert_eq!(ga, grad);
        assert_eq!(gb, grad);
    }

    #[test]
    fn test_mul_swaps_operands() {
        let grad = ArrayD::ones(IxDyn(&[2]));
        let [ga, gb] = BinaryOp::Mul.backward(&grad, &dyn1(&[2.0, 3.0]), &dyn1(&[5.0, 7.0]));
        assert_eq!(ga, dyn1(&[5.0, 7.0]));
        assert_eq!(gb, dyn1(&[2.0, 3.0]));
    }

    #[test]
    fn test_serde_tags() {
        assert_eq!(serde_json::to_string(&BinaryOp::Add).unwrap(), "\"add\"");
        let op: BinaryOp = serde_json::from_str("\"mul\"").unwrap();
        assert_eq!(op, BinaryOp::Mul);
        assert_eq!(op.to_string(), "mul");
    }
}
