//! Shape and type inference for ONNX Runtime's contrib MatMul operators.
//!
//! These operators live in the `com.microsoft` domain. See the
//! [contrib operator reference](https://github.com/microsoft/onnxruntime/blob/main/docs/ContribOperators.md)
//! for operator details.

mod matmul;

pub use matmul::{FusedMatMul, MatMulInteger16, SparseToDenseMatMul, TransposeMatMul};

use crate::context::InferenceContext;
use crate::infer_shapes::InferShapesError;

/// Domain of ONNX Runtime's contrib operators.
pub const MS_DOMAIN: &str = "com.microsoft";

/// Check that a node has exactly `expected` inputs.
fn check_input_count(ctx: &dyn InferenceContext, expected: usize) -> Result<(), InferShapesError> {
    let actual = ctx.num_inputs();
    if actual != expected {
        return Err(InferShapesError::IncorrectInputCount { expected, actual });
    }
    Ok(())
}
