//! Shape inference for batched matrix multiplication with transposed operands.
//!
//! This implements the shape rules of `numpy.matmul`, extended with flags
//! that transpose the matrix dimensions of either operand and flags that
//! move the first dimension of an operand into the matrix dimensions. These
//! flags correspond to the `transA`, `transB`, `transBatchA` and
//! `transBatchB` attributes of ONNX Runtime's `FusedMatMul` operator.

use crate::broadcast::broadcast_shapes;
use crate::infer_shapes::{DimAxis, InferShapesError};
use crate::sym_dim::SymDim;
use crate::sym_shape::SymShape;

/// Flags which control how operands of a matrix multiplication are
/// rearranged before the product is computed.
///
/// All flags default to false.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatMulFlags {
    /// Swap the last two dimensions of the LHS.
    pub transpose_a: bool,
    /// Swap the last two dimensions of the RHS.
    pub transpose_b: bool,
    /// Use the first dimension of the LHS as the matrix rows, treating the
    /// remaining dimensions except the last as batch dimensions.
    pub transpose_batch_a: bool,
    /// Use the first dimension of the RHS as the matrix rows, treating the
    /// remaining dimensions except the last as batch dimensions.
    pub transpose_batch_b: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Operand {
    Lhs,
    Rhs,
}

/// An operand of a matrix multiplication viewed as a stack of matrices.
#[derive(Debug)]
struct MatrixView<'a> {
    batch: &'a [SymDim],
    rows: SymDim,
    cols: SymDim,

    /// True if the operand was a vector which was promoted to a matrix.
    promoted: bool,
}

impl<'a> MatrixView<'a> {
    /// Rearrange the dimensions of an operand with a non-zero rank.
    fn new(shape: &'a SymShape, operand: Operand, transpose: bool, transpose_batch: bool) -> Self {
        let dims = shape.dims();
        let ndim = dims.len();
        debug_assert!(ndim > 0);

        // A vector is promoted to a row vector when it is the LHS or a column
        // vector when it is the RHS. The transpose flags have no effect.
        if ndim == 1 {
            let (rows, cols) = match operand {
                Operand::Lhs => (SymDim::Fixed(1), dims[0].clone()),
                Operand::Rhs => (dims[0].clone(), SymDim::Fixed(1)),
            };
            return Self {
                batch: &[],
                rows,
                cols,
                promoted: true,
            };
        }

        let (batch, mut row_axis) = if transpose_batch {
            (&dims[1..ndim - 1], 0)
        } else {
            (&dims[..ndim - 2], ndim - 2)
        };
        let mut col_axis = ndim - 1;
        if transpose {
            std::mem::swap(&mut row_axis, &mut col_axis);
        }

        Self {
            batch,
            rows: dims[row_axis].clone(),
            cols: dims[col_axis].clone(),
            promoted: false,
        }
    }
}

/// Infer the output shape of a matrix multiplication.
///
/// `lhs` and `rhs` are the operand shapes, or `None` if unknown. If either
/// shape is unknown the result is `Ok(None)`. Otherwise both operands must
/// have at least one dimension.
///
/// The output shape is the broadcast of the operands' batch dimensions,
/// followed by the rows of the LHS and the columns of the RHS. Operands that
/// are vectors participate in the product but do not contribute a dimension
/// to the output, so the product of two vectors is a scalar.
///
/// ```
/// use rten_matmul_infer::{infer_matmul_shape, MatMulFlags, SymShape};
///
/// let lhs = SymShape::from_fixed(&[8, 1, 3, 4]);
/// let rhs = SymShape::from_fixed(&[1, 5, 4, 6]);
/// let out = infer_matmul_shape(Some(&lhs), Some(&rhs), MatMulFlags::default()).unwrap();
/// assert_eq!(out, Some(SymShape::from_fixed(&[8, 5, 3, 6])));
/// ```
pub fn infer_matmul_shape(
    lhs: Option<&SymShape>,
    rhs: Option<&SymShape>,
    flags: MatMulFlags,
) -> Result<Option<SymShape>, InferShapesError> {
    let (Some(lhs), Some(rhs)) = (lhs, rhs) else {
        return Ok(None);
    };

    for (input, shape) in [lhs, rhs].into_iter().enumerate() {
        if shape.ndim() == 0 {
            return Err(InferShapesError::InvalidRank { input });
        }
    }

    let a = MatrixView::new(
        lhs,
        Operand::Lhs,
        flags.transpose_a,
        flags.transpose_batch_a,
    );
    let b = MatrixView::new(
        rhs,
        Operand::Rhs,
        flags.transpose_b,
        flags.transpose_batch_b,
    );

    // Sizes that are not known are assumed to match.
    if a.cols.is_fixed() && b.rows.is_fixed() && a.cols != b.rows {
        return Err(InferShapesError::IncompatibleDimensions {
            axis: DimAxis::Contraction,
            lhs: a.cols,
            rhs: b.rows,
        });
    }

    let batch = broadcast_shapes(a.batch, b.batch)?;
    let rows = (!a.promoted).then_some(a.rows);
    let cols = (!b.promoted).then_some(b.cols);
    let out_shape = batch.dims().iter().cloned().chain(rows).chain(cols).collect();

    Ok(Some(out_shape))
}

#[cfg(test)]
mod tests {
    use rten_testing::TestCases;

    use super::{MatMulFlags, infer_matmul_shape};
    use crate::infer_shapes::{DimAxis, InferShapesError};
    use crate::sym_dim::SymDim;
    use crate::sym_shape::{SymShape, sym_shape};

    const NO_FLAGS: MatMulFlags = MatMulFlags {
        transpose_a: false,
        transpose_b: false,
        transpose_batch_a: false,
        transpose_batch_b: false,
    };

    #[derive(Debug)]
    struct Case {
        lhs: SymShape,
        rhs: SymShape,
        flags: MatMulFlags,
        expected: SymShape,
    }

    fn check_cases(cases: impl IntoIterator<Item = Case>) {
        cases.test_each(|case| {
            let out = infer_matmul_shape(Some(&case.lhs), Some(&case.rhs), case.flags).unwrap();
            assert_eq!(out.as_ref(), Some(&case.expected));
        })
    }

    #[test]
    fn test_matmul() {
        let cases = [
            // No batch dims
            Case {
                lhs: sym_shape!("m", "k"),
                rhs: sym_shape!("k", "n"),
                flags: NO_FLAGS,
                expected: sym_shape!("m", "n"),
            },
            Case {
                lhs: sym_shape!(3, 4),
                rhs: sym_shape!(4, 6),
                flags: NO_FLAGS,
                expected: sym_shape!(3, 6),
            },
            // Matching batch dims
            Case {
                lhs: sym_shape!("batch", "m", "k"),
                rhs: sym_shape!("batch", "k", "n"),
                flags: NO_FLAGS,
                expected: sym_shape!("batch", "m", "n"),
            },
            // Broadcast batch dims
            Case {
                lhs: sym_shape!(8, 1, 3, 4),
                rhs: sym_shape!(1, 5, 4, 6),
                flags: NO_FLAGS,
                expected: sym_shape!(8, 5, 3, 6),
            },
            Case {
                lhs: sym_shape!(1, "batch_b", "m", "k"),
                rhs: sym_shape!("batch_a", 1, "k", "n"),
                flags: NO_FLAGS,
                expected: sym_shape!("batch_a", "batch_b", "m", "n"),
            },
            // Batch dims with different ranks
            Case {
                lhs: sym_shape!(2, 3, 4),
                rhs: sym_shape!(4, 5),
                flags: NO_FLAGS,
                expected: sym_shape!(2, 3, 5),
            },
            Case {
                lhs: sym_shape!(3, 4),
                rhs: sym_shape!(7, 2, 4, 5),
                flags: NO_FLAGS,
                expected: sym_shape!(7, 2, 3, 5),
            },
        ];
        check_cases(cases);
    }

    #[test]
    fn test_matmul_vectors() {
        let cases = [
            // Dot product
            Case {
                lhs: sym_shape!(4),
                rhs: sym_shape!(4),
                flags: NO_FLAGS,
                expected: sym_shape!(),
            },
            // Vector-matrix product
            Case {
                lhs: sym_shape!(4),
                rhs: sym_shape!(4, 6),
                flags: NO_FLAGS,
                expected: sym_shape!(6),
            },
            // Matrix-vector product
            Case {
                lhs: sym_shape!(3, 4),
                rhs: sym_shape!(4),
                flags: NO_FLAGS,
                expected: sym_shape!(3),
            },
            // Vector with batched matrix
            Case {
                lhs: sym_shape!(4),
                rhs: sym_shape!(2, 4, 6),
                flags: NO_FLAGS,
                expected: sym_shape!(2, 6),
            },
            Case {
                lhs: sym_shape!(2, 3, 4),
                rhs: sym_shape!(4),
                flags: NO_FLAGS,
                expected: sym_shape!(2, 3),
            },
            Case {
                lhs: sym_shape!("k"),
                rhs: sym_shape!("k", "n"),
                flags: NO_FLAGS,
                expected: sym_shape!("n"),
            },
        ];
        check_cases(cases);
    }

    #[test]
    fn test_matmul_vector_ignores_transpose_flags() {
        let all_flags = MatMulFlags {
            transpose_a: true,
            transpose_b: true,
            transpose_batch_a: true,
            transpose_batch_b: true,
        };
        let cases = [
            (sym_shape!(4), sym_shape!(4)),
            (sym_shape!(4), sym_shape!(4, 6)),
            (sym_shape!(3, 4), sym_shape!(4)),
        ];

        cases.test_each(|(lhs, rhs)| {
            // Set only the flags which apply to the vector operands.
            let flags = MatMulFlags {
                transpose_a: lhs.ndim() == 1,
                transpose_batch_a: lhs.ndim() == 1,
                transpose_b: rhs.ndim() == 1,
                transpose_batch_b: rhs.ndim() == 1,
            };
            let expected = infer_matmul_shape(Some(lhs), Some(rhs), NO_FLAGS).unwrap();
            let out = infer_matmul_shape(Some(lhs), Some(rhs), flags).unwrap();
            assert_eq!(out, expected);

            if lhs.ndim() == 1 && rhs.ndim() == 1 {
                let out = infer_matmul_shape(Some(lhs), Some(rhs), all_flags).unwrap();
                assert_eq!(out, expected);
            }
        });
    }

    #[test]
    fn test_matmul_transpose() {
        let cases = [
            Case {
                lhs: sym_shape!(4, 3),
                rhs: sym_shape!(4, 6),
                flags: MatMulFlags {
                    transpose_a: true,
                    ..NO_FLAGS
                },
                expected: sym_shape!(3, 6),
            },
            Case {
                lhs: sym_shape!(3, 4),
                rhs: sym_shape!(6, 4),
                flags: MatMulFlags {
                    transpose_b: true,
                    ..NO_FLAGS
                },
                expected: sym_shape!(3, 6),
            },
            Case {
                lhs: sym_shape!("batch", "k", "m"),
                rhs: sym_shape!("batch", "n", "k"),
                flags: MatMulFlags {
                    transpose_a: true,
                    transpose_b: true,
                    ..NO_FLAGS
                },
                expected: sym_shape!("batch", "m", "n"),
            },
        ];
        check_cases(cases);
    }

    #[test]
    fn test_matmul_transpose_batch() {
        let cases = [
            // Baseline without batch transpose.
            Case {
                lhs: sym_shape!(3, 4, 5),
                rhs: sym_shape!(3, 5, 6),
                flags: NO_FLAGS,
                expected: sym_shape!(3, 4, 6),
            },
            // LHS is viewed as [4, 3, 5].
            Case {
                lhs: sym_shape!(3, 4, 5),
                rhs: sym_shape!(4, 5, 6),
                flags: MatMulFlags {
                    transpose_batch_a: true,
                    ..NO_FLAGS
                },
                expected: sym_shape!(4, 3, 6),
            },
            // LHS is viewed as [4, 5, 3].
            Case {
                lhs: sym_shape!(3, 4, 5),
                rhs: sym_shape!(4, 3, 6),
                flags: MatMulFlags {
                    transpose_a: true,
                    transpose_batch_a: true,
                    ..NO_FLAGS
                },
                expected: sym_shape!(4, 5, 6),
            },
            // RHS is viewed as [2, 5, 7].
            Case {
                lhs: sym_shape!(2, 3, 5),
                rhs: sym_shape!(5, 2, 7),
                flags: MatMulFlags {
                    transpose_batch_b: true,
                    ..NO_FLAGS
                },
                expected: sym_shape!(2, 3, 7),
            },
            // RHS is viewed as [2, 5, 6].
            Case {
                lhs: sym_shape!(2, 3, 5),
                rhs: sym_shape!(6, 2, 5),
                flags: MatMulFlags {
                    transpose_b: true,
                    transpose_batch_b: true,
                    ..NO_FLAGS
                },
                expected: sym_shape!(2, 3, 6),
            },
            // LHS with multiple batch dims is viewed as [3, 4, 2, 5].
            Case {
                lhs: sym_shape!(2, 3, 4, 5),
                rhs: sym_shape!(5, 7),
                flags: MatMulFlags {
                    transpose_batch_a: true,
                    ..NO_FLAGS
                },
                expected: sym_shape!(3, 4, 2, 7),
            },
            // Batch transpose has no effect on a matrix.
            Case {
                lhs: sym_shape!(3, 4),
                rhs: sym_shape!(4, 6),
                flags: MatMulFlags {
                    transpose_batch_a: true,
                    transpose_batch_b: true,
                    ..NO_FLAGS
                },
                expected: sym_shape!(3, 6),
            },
        ];
        check_cases(cases);
    }

    #[test]
    fn test_matmul_unknown_dims() {
        let cases = [
            Case {
                lhs: sym_shape!(None::<usize>, 4),
                rhs: sym_shape!(4, 6),
                flags: NO_FLAGS,
                expected: sym_shape!(None::<usize>, 6),
            },
            // Unknown contraction dim is assumed to match.
            Case {
                lhs: sym_shape!(3, None::<usize>),
                rhs: sym_shape!(5, 6),
                flags: NO_FLAGS,
                expected: sym_shape!(3, 6),
            },
            Case {
                lhs: sym_shape!(3, "k"),
                rhs: sym_shape!(5, 6),
                flags: NO_FLAGS,
                expected: sym_shape!(3, 6),
            },
            // Unknown batch dims.
            Case {
                lhs: sym_shape!(None::<usize>, 3, 4),
                rhs: sym_shape!(None::<usize>, 4, 5),
                flags: NO_FLAGS,
                expected: sym_shape!(None::<usize>, 3, 5),
            },
            Case {
                lhs: sym_shape!("batch", 3, 4),
                rhs: sym_shape!(8, 4, 5),
                flags: NO_FLAGS,
                expected: sym_shape!(8, 3, 5),
            },
        ];
        check_cases(cases);
    }

    #[test]
    fn test_matmul_unknown_shape() {
        let shape = sym_shape!(3, 4);
        assert_eq!(infer_matmul_shape(None, Some(&shape), NO_FLAGS), Ok(None));
        assert_eq!(infer_matmul_shape(Some(&shape), None, NO_FLAGS), Ok(None));
        assert_eq!(infer_matmul_shape(None, None, NO_FLAGS), Ok(None));

        // A scalar operand is only reported once both shapes are known.
        let scalar = sym_shape!();
        assert_eq!(infer_matmul_shape(Some(&scalar), None, NO_FLAGS), Ok(None));
        assert_eq!(infer_matmul_shape(None, Some(&scalar), NO_FLAGS), Ok(None));
    }

    #[test]
    fn test_matmul_invalid() {
        #[derive(Debug)]
        struct Case {
            lhs: Option<SymShape>,
            rhs: Option<SymShape>,
            expected: InferShapesError,
        }

        let cases = [
            Case {
                lhs: Some(sym_shape!(3, 4)),
                rhs: Some(sym_shape!(5, 6)),
                expected: InferShapesError::IncompatibleDimensions {
                    axis: DimAxis::Contraction,
                    lhs: SymDim::Fixed(4),
                    rhs: SymDim::Fixed(5),
                },
            },
            Case {
                lhs: Some(sym_shape!(4)),
                rhs: Some(sym_shape!(5)),
                expected: InferShapesError::IncompatibleDimensions {
                    axis: DimAxis::Contraction,
                    lhs: SymDim::Fixed(4),
                    rhs: SymDim::Fixed(5),
                },
            },
            Case {
                lhs: Some(sym_shape!(2, 3, 4)),
                rhs: Some(sym_shape!(3, 4, 5)),
                expected: InferShapesError::IncompatibleDimensions {
                    axis: DimAxis::Broadcast(0),
                    lhs: SymDim::Fixed(2),
                    rhs: SymDim::Fixed(3),
                },
            },
            Case {
                lhs: Some(sym_shape!()),
                rhs: Some(sym_shape!(3, 4)),
                expected: InferShapesError::InvalidRank { input: 0 },
            },
            Case {
                lhs: Some(sym_shape!(3, 4)),
                rhs: Some(sym_shape!()),
                expected: InferShapesError::InvalidRank { input: 1 },
            },
        ];

        cases.test_each(|case| {
            let err = infer_matmul_shape(case.lhs.as_ref(), case.rhs.as_ref(), NO_FLAGS).err();
            assert_eq!(err.as_ref(), Some(&case.expected));
        });
    }

    #[test]
    fn test_matmul_is_repeatable() {
        let lhs = sym_shape!("batch", 1, 3, 4);
        let rhs = sym_shape!(5, 4, 6);
        let flags = MatMulFlags::default();

        let first = infer_matmul_shape(Some(&lhs), Some(&rhs), flags);
        let second = infer_matmul_shape(Some(&lhs), Some(&rhs), flags);
        assert_eq!(first, second);
        assert_eq!(first, Ok(Some(sym_shape!("batch", 5, 3, 6))));

        // Inputs are left unchanged.
        assert_eq!(lhs, sym_shape!("batch", 1, 3, 4));
        assert_eq!(rhs, sym_shape!(5, 4, 6));
    }
}
