//! Traits for shape inference and the errors it reports.

use std::error::Error;
use std::fmt;

use crate::context::InferenceContext;
use crate::elem_type::{ElemType, ValueType};
use crate::sym_dim::SymDim;
use crate::sym_shape::SymShape;

/// Identifies the pair of dimensions that failed a compatibility check.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DimAxis {
    /// The inner dimension of a matrix multiplication, ie. the columns of
    /// the LHS and the rows of the RHS.
    Contraction,
    /// An axis of the output shape produced by broadcasting.
    Broadcast(usize),
}

#[derive(Clone, Debug, PartialEq)]
pub enum InferShapesError {
    /// Too many or too few inputs were provided for this operator.
    IncorrectInputCount { expected: usize, actual: usize },

    /// An input is a scalar but the operator requires at least one dimension.
    InvalidRank {
        /// Index of the operator input.
        input: usize,
    },

    /// Two dimensions have known sizes which are not compatible.
    ///
    /// Operator execution will fail if given inputs with these shapes.
    IncompatibleDimensions {
        axis: DimAxis,
        lhs: SymDim,
        rhs: SymDim,
    },

    /// An attribute has a value of the wrong type.
    InvalidAttribute {
        name: String,
        /// The type of the value that was found.
        kind: &'static str,
    },

    /// An input has an element type that the operator does not support.
    UnsupportedType { input: usize, value_type: ValueType },

    /// An input is a sparse tensor where a dense tensor is expected, or
    /// vice versa.
    UnexpectedValueKind { input: usize, value_type: ValueType },
}

impl fmt::Display for InferShapesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IncorrectInputCount { expected, actual } => write!(
                f,
                "expected {} inputs but {} were provided",
                expected, actual
            ),
            Self::InvalidRank { input } => write!(
                f,
                "input tensors of wrong rank (0): input {} is a scalar",
                input
            ),
            Self::IncompatibleDimensions {
                axis: DimAxis::Contraction,
                lhs,
                rhs,
            } => write!(
                f,
                "incompatible dimensions for matrix multiplication: lhs has {} columns but rhs has {} rows",
                lhs, rhs
            ),
            Self::IncompatibleDimensions {
                axis: DimAxis::Broadcast(axis),
                lhs,
                rhs,
            } => write!(
                f,
                "incompatible dimensions for broadcasting: sizes {} and {} at axis {} cannot be broadcast",
                lhs, rhs, axis
            ),
            Self::InvalidAttribute { name, kind } => {
                write!(f, "attribute \"{}\" has unexpected type {}", name, kind)
            }
            Self::UnsupportedType { input, value_type } => {
                write!(f, "input {} has unsupported type {}", input, value_type)
            }
            Self::UnexpectedValueKind { input, value_type } => {
                write!(f, "input {} has unexpected value kind {}", input, value_type)
            }
        }
    }
}

impl Error for InferShapesError {}

/// Inferred type and shape of an operator output.
///
/// Either field may be `None` if it could not be determined. The type is
/// often known even when the shape is not.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OutputInfo {
    pub value_type: Option<ValueType>,
    pub shape: Option<SymShape>,
}

/// Infer the types and shapes of an operator's outputs.
pub trait InferShapes {
    /// Infer output types and shapes given information about the node
    /// provided by `ctx`.
    ///
    /// Returns one entry per output. Insufficient information about inputs
    /// is not an error. The affected output fields are left as `None` and a
    /// later inference pass may fill them in.
    fn infer_shapes(
        &self,
        ctx: &dyn InferenceContext,
    ) -> Result<Vec<OutputInfo>, InferShapesError>;
}

/// Constraint on the type of an operator input.
#[derive(Clone, Copy, Debug)]
pub struct TypeConstraint {
    /// True if the input must be a sparse tensor, false if it must be dense.
    pub sparse: bool,
    /// Permitted element types.
    pub elem_types: &'static [ElemType],
}

impl TypeConstraint {
    pub const fn dense(elem_types: &'static [ElemType]) -> Self {
        Self {
            sparse: false,
            elem_types,
        }
    }

    pub const fn sparse(elem_types: &'static [ElemType]) -> Self {
        Self {
            sparse: true,
            elem_types,
        }
    }

    /// Check the type of the index'th input against this constraint.
    ///
    /// Returns the input type if known.
    pub fn check(
        &self,
        ctx: &dyn InferenceContext,
        input: usize,
    ) -> Result<Option<ValueType>, InferShapesError> {
        let Some(value_type) = ctx.input_type(input) else {
            return Ok(None);
        };
        if value_type.is_sparse() != self.sparse {
            return Err(InferShapesError::UnexpectedValueKind { input, value_type });
        }
        if !self.elem_types.contains(&value_type.elem_type()) {
            return Err(InferShapesError::UnsupportedType { input, value_type });
        }
        Ok(Some(value_type))
    }
}
