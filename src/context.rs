//! Interface between shape inference and the graph that hosts an operator.

use std::fmt;

use crate::elem_type::ValueType;
use crate::infer_shapes::InferShapesError;
use crate::sym_shape::SymShape;

/// Value of an operator attribute.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttrValue {
    Int(i64),
    Float(f32),
    String(String),
    Ints(Vec<i64>),
    Floats(Vec<f32>),
}

impl AttrValue {
    /// Return the name of this attribute's type, as used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Ints(_) => "ints",
            Self::Floats(_) => "floats",
        }
    }
}

impl From<i64> for AttrValue {
    fn from(val: i64) -> Self {
        Self::Int(val)
    }
}

impl From<bool> for AttrValue {
    fn from(val: bool) -> Self {
        Self::Int(val as i64)
    }
}

impl From<f32> for AttrValue {
    fn from(val: f32) -> Self {
        Self::Float(val)
    }
}

impl From<&str> for AttrValue {
    fn from(val: &str) -> Self {
        Self::String(val.to_string())
    }
}

impl From<Vec<i64>> for AttrValue {
    fn from(val: Vec<i64>) -> Self {
        Self::Ints(val)
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(val) => write!(f, "{}", val),
            Self::Float(val) => write!(f, "{}", val),
            Self::String(val) => write!(f, "\"{}\"", val),
            Self::Ints(vals) => write!(f, "{:?}", vals),
            Self::Floats(vals) => write!(f, "{:?}", vals),
        }
    }
}

/// Information about a graph node that shape inference needs from the host.
///
/// Each method returns `None` if the host does not have the information.
/// Missing shapes and types are not errors. Inference will produce less
/// information for the outputs instead.
pub trait InferenceContext {
    /// Return the value of the attribute called `name`, if set.
    fn attribute(&self, name: &str) -> Option<&AttrValue>;

    /// Return the number of inputs the node has.
    fn num_inputs(&self) -> usize;

    /// Return the shape of the index'th input, if known.
    fn input_shape(&self, index: usize) -> Option<SymShape>;

    /// Return the type of the index'th input, if known.
    fn input_type(&self, index: usize) -> Option<ValueType>;
}

/// Read a boolean flag stored as an integer attribute.
///
/// Any non-zero value is true. Returns `default` if the attribute is not set.
pub fn get_flag(
    ctx: &dyn InferenceContext,
    name: &str,
    default: bool,
) -> Result<bool, InferShapesError> {
    match ctx.attribute(name) {
        None => Ok(default),
        Some(AttrValue::Int(val)) => Ok(*val != 0),
        Some(other) => Err(InferShapesError::InvalidAttribute {
            name: name.to_string(),
            kind: other.kind(),
        }),
    }
}
