//! Tensor shapes with symbolic dimensions.

use std::fmt;

use smallvec::SmallVec;

use crate::sym_dim::SymDim;

/// Shape of a tensor whose dimension sizes may be symbolic.
///
/// Shapes are immutable values. Shape inference never modifies the shapes it
/// is given, it returns new shapes instead.
///
/// ```
/// use rten_matmul_infer::{SymDim, SymShape};
///
/// let shape = SymShape::from_dims(["batch".into(), 16.into(), SymDim::Unknown]);
/// assert_eq!(shape.ndim(), 3);
/// assert_eq!(shape.dim(1), Some(&SymDim::Fixed(16)));
/// assert_eq!(shape.to_string(), "[\"batch\", 16, ?]");
/// ```
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SymShape {
    dims: SmallVec<[SymDim; 4]>,
}

impl SymShape {
    /// Create a shape from a sequence of dimensions.
    pub fn from_dims<I: IntoIterator<Item = SymDim>>(dims: I) -> Self {
        Self {
            dims: dims.into_iter().collect(),
        }
    }

    /// Create a shape where all dimension sizes are known.
    pub fn from_fixed(dims: &[usize]) -> Self {
        Self::from_dims(dims.iter().copied().map(SymDim::Fixed))
    }

    /// Create the shape of a scalar (a tensor with no dimensions).
    pub fn scalar() -> Self {
        Self::default()
    }

    /// Return the number of dimensions.
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    /// Return the dimensions as a slice.
    pub fn dims(&self) -> &[SymDim] {
        &self.dims
    }

    /// Return the size of the index'th dimension, or `None` if out of bounds.
    pub fn dim(&self, index: usize) -> Option<&SymDim> {
        self.dims.get(index)
    }

    /// Return the dimension sizes if all are known.
    pub fn to_fixed(&self) -> Option<Vec<usize>> {
        self.dims.iter().map(|d| d.fixed()).collect()
    }
}

impl From<Vec<SymDim>> for SymShape {
    fn from(dims: Vec<SymDim>) -> Self {
        Self {
            dims: SmallVec::from_vec(dims),
        }
    }
}

impl From<&[usize]> for SymShape {
    fn from(dims: &[usize]) -> Self {
        Self::from_fixed(dims)
    }
}

impl FromIterator<SymDim> for SymShape {
    fn from_iter<I: IntoIterator<Item = SymDim>>(iter: I) -> Self {
        Self::from_dims(iter)
    }
}

impl fmt::Display for SymShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, dim) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", dim)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
pub(crate) use tests::sym_shape;
