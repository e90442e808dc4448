use crate::batch_matmul::{MatMulFlags, infer_matmul_shape};
use crate::context::{InferenceContext, get_flag};
use crate::elem_type::{ElemType, ValueType};
use crate::infer_shapes::{InferShapes, InferShapesError, OutputInfo, TypeConstraint};
use crate::ops::check_input_count;

const FLOAT_TYPES: &[ElemType] = &[
    ElemType::Float16,
    ElemType::Float,
    ElemType::Double,
    ElemType::BFloat16,
];

const SPARSE_MATMUL_TYPES: &[ElemType] = &[
    ElemType::Float,
    ElemType::Double,
    ElemType::Int64,
    ElemType::Int32,
    ElemType::UInt64,
    ElemType::UInt32,
];

const INT16_TYPES: &[ElemType] = &[ElemType::Int16, ElemType::UInt16];

/// Infer the output of a two-input matrix multiplication.
///
/// `out_type` is the type of the output, if known.
fn matmul_output(
    ctx: &dyn InferenceContext,
    flags: MatMulFlags,
    out_type: Option<ValueType>,
) -> Result<Vec<OutputInfo>, InferShapesError> {
    let lhs = ctx.input_shape(0);
    let rhs = ctx.input_shape(1);
    let shape = infer_matmul_shape(lhs.as_ref(), rhs.as_ref(), flags)?;
    Ok(vec![OutputInfo {
        value_type: out_type,
        shape,
    }])
}

/// Convert the type of an input to the type of a dense output.
fn dense_output_type(input_type: Option<ValueType>) -> Option<ValueType> {
    input_type.map(|ty| ValueType::Tensor(ty.elem_type()))
}

/// FusedMatMul operator.
///
/// Matrix product with optional transposition of the operands. The output
/// type is the type of the first input.
pub struct FusedMatMul;

impl InferShapes for FusedMatMul {
    fn infer_shapes(
        &self,
        ctx: &dyn InferenceContext,
    ) -> Result<Vec<OutputInfo>, InferShapesError> {
        check_input_count(ctx, 2)?;
        let types = TypeConstraint::dense(FLOAT_TYPES);
        let a_type = types.check(ctx, 0)?;
        types.check(ctx, 1)?;

        let flags = MatMulFlags {
            transpose_a: get_flag(ctx, "transA", false)?,
            transpose_b: get_flag(ctx, "transB", false)?,
            transpose_batch_a: get_flag(ctx, "transBatchA", false)?,
            transpose_batch_b: get_flag(ctx, "transBatchB", false)?,
        };
        matmul_output(ctx, flags, dense_output_type(a_type))
    }
}

/// TransposeMatMul operator.
///
/// This is an older version of [`FusedMatMul`] which supports transposing
/// the matrix dimensions but not the batch dimensions.
pub struct TransposeMatMul;

impl InferShapes for TransposeMatMul {
    fn infer_shapes(
        &self,
        ctx: &dyn InferenceContext,
    ) -> Result<Vec<OutputInfo>, InferShapesError> {
        check_input_count(ctx, 2)?;
        let types = TypeConstraint::dense(FLOAT_TYPES);
        let a_type = types.check(ctx, 0)?;
        types.check(ctx, 1)?;

        let flags = MatMulFlags {
            transpose_a: get_flag(ctx, "transA", false)?,
            transpose_b: get_flag(ctx, "transB", false)?,
            ..Default::default()
        };
        matmul_output(ctx, flags, dense_output_type(a_type))
    }
}

/// SparseToDenseMatMul operator.
///
/// Multiplies a sparse matrix A by a dense matrix B. The output is dense and
/// has the element type of B.
pub struct SparseToDenseMatMul;

impl InferShapes for SparseToDenseMatMul {
    fn infer_shapes(
        &self,
        ctx: &dyn InferenceContext,
    ) -> Result<Vec<OutputInfo>, InferShapesError> {
        check_input_count(ctx, 2)?;
        TypeConstraint::sparse(SPARSE_MATMUL_TYPES).check(ctx, 0)?;
        let b_type = TypeConstraint::dense(SPARSE_MATMUL_TYPES).check(ctx, 1)?;

        let flags = MatMulFlags {
            transpose_a: get_flag(ctx, "transA", false)?,
            transpose_b: get_flag(ctx, "transB", false)?,
            ..Default::default()
        };
        matmul_output(ctx, flags, dense_output_type(b_type))
    }
}

/// MatMulInteger16 operator.
///
/// Matrix product of 16-bit integer tensors with the shape rules of
/// `numpy.matmul`. The output is always an int32 tensor.
pub struct MatMulInteger16;

impl InferShapes for MatMulInteger16 {
    fn infer_shapes(
        &self,
        ctx: &dyn InferenceContext,
    ) -> Result<Vec<OutputInfo>, InferShapesError> {
        check_input_count(ctx, 2)?;
        let types = TypeConstraint::dense(INT16_TYPES);
        types.check(ctx, 0)?;
        types.check(ctx, 1)?;

        matmul_output(
            ctx,
            MatMulFlags::default(),
            Some(ValueType::Tensor(ElemType::Int32)),
        )
    }
}
