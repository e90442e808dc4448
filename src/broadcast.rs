//! Bidirectional (numpy-style) broadcasting of symbolic shapes.

use crate::infer_shapes::{DimAxis, InferShapesError};
use crate::sym_dim::SymDim;
use crate::sym_shape::SymShape;

/// Broadcast a pair of dimension sizes.
///
/// `axis` is the output axis which the pair contributes to, used for error
/// reporting.
fn broadcast_dim(a: &SymDim, b: &SymDim, axis: usize) -> Result<SymDim, InferShapesError> {
    let dim = match (a, b) {
        (a, b) if a == b => a.clone(),

        // If either size is 1, it will be broadcast against the other size.
        (SymDim::Fixed(1), b) => b.clone(),
        (a, SymDim::Fixed(1)) => a.clone(),

        // If both sizes are fixed and different, we know execution will fail.
        (SymDim::Fixed(_), SymDim::Fixed(_)) => {
            return Err(InferShapesError::IncompatibleDimensions {
                axis: DimAxis::Broadcast(axis),
                lhs: a.clone(),
                rhs: b.clone(),
            });
        }

        // If one size is fixed and not 1, execution can only succeed if the
        // other size is equal to it.
        (SymDim::Fixed(size), _) | (_, SymDim::Fixed(size)) => SymDim::Fixed(*size),

        // Neither size is known and they are not the same symbol. The result
        // could be either, depending on which one is 1 at runtime.
        _ => SymDim::Unknown,
    };
    Ok(dim)
}

/// Broadcast two shapes together following ONNX's
/// [multidirectional broadcasting rules](https://onnx.ai/onnx/repo-docs/Broadcasting.html).
///
/// The shorter shape is padded on the left with 1-sized dimensions.
///
/// ```
/// use rten_matmul_infer::{broadcast_shapes, SymShape};
///
/// let a = SymShape::from_dims(["batch".into(), 1.into(), 5.into()]);
/// let b = SymShape::from_fixed(&[4, 1]);
/// let out = broadcast_shapes(a.dims(), b.dims()).unwrap();
/// assert_eq!(out, SymShape::from_dims(["batch".into(), 4.into(), 5.into()]));
/// ```
pub fn broadcast_shapes(a: &[SymDim], b: &[SymDim]) -> Result<SymShape, InferShapesError> {
    let ndim = a.len().max(b.len());
    let a_pad = ndim - a.len();
    let b_pad = ndim - b.len();
    let one = SymDim::Fixed(1);

    (0..ndim)
        .map(|axis| {
            let a_dim = if axis < a_pad { &one } else { &a[axis - a_pad] };
            let b_dim = if axis < b_pad { &one } else { &b[axis - b_pad] };
            broadcast_dim(a_dim, b_dim, axis)
        })
        .collect()
}
