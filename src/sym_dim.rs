use std::fmt;

/// Size of a single dimension in a symbolic shape.
///
/// A dimension is either a known size, a named size whose value is not known
/// (an ONNX `dim_param` such as `"batch"`), or completely unknown.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SymDim {
    /// A dimension with a known size.
    Fixed(usize),
    /// A dimension with an unknown size that is identified by name.
    ///
    /// Two dimensions with the same name are assumed to have the same size.
    /// Nothing else is assumed about the value.
    Symbol(String),
    /// A dimension with an unknown size.
    Unknown,
}

impl SymDim {
    /// Return the size of this dimension if it is known.
    pub fn fixed(&self) -> Option<usize> {
        match self {
            Self::Fixed(size) => Some(*size),
            Self::Symbol(_) | Self::Unknown => None,
        }
    }

    /// Return true if this dimension has a known size.
    pub fn is_fixed(&self) -> bool {
        matches!(self, Self::Fixed(_))
    }
}

impl From<usize> for SymDim {
    fn from(size: usize) -> Self {
        Self::Fixed(size)
    }
}

impl From<&str> for SymDim {
    fn from(name: &str) -> Self {
        Self::Symbol(name.to_string())
    }
}

impl From<String> for SymDim {
    fn from(name: String) -> Self {
        Self::Symbol(name)
    }
}

impl<T: Into<SymDim>> From<Option<T>> for SymDim {
    fn from(dim: Option<T>) -> Self {
        dim.map(|d| d.into()).unwrap_or(Self::Unknown)
    }
}

impl fmt::Display for SymDim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(size) => write!(f, "{}", size),
            Self::Symbol(name) => write!(f, "\"{}\"", name),
            Self::Unknown => write!(f, "?"),
        }
    }
}
