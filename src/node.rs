use rustc_hash::FxHashMap;

use crate::context::{AttrValue, InferenceContext};
use crate::elem_type::ValueType;
use crate::ops::MS_DOMAIN;
use crate::sym_shape::SymShape;

/// Known information about a node input.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InputInfo {
    pub shape: Option<SymShape>,
    pub value_type: Option<ValueType>,
}

/// Description of a graph node which owns its attributes and input
/// information.
///
/// This is a simple [`InferenceContext`] for hosts which don't have a graph
/// representation of their own.
///
/// ```
/// use rten_matmul_infer::{ElemType, NodeInfo, SymShape, ValueType};
///
/// let node = NodeInfo::new("FusedMatMul")
///     .with_name("attn/matmul")
///     .with_attr("transB", 1)
///     .with_input(SymShape::from_fixed(&[2, 3]), ValueType::Tensor(ElemType::Float))
///     .with_input_shape(SymShape::from_fixed(&[4, 3]));
/// assert_eq!(node.name(), "attn/matmul");
/// ```
#[derive(Clone, Debug)]
pub struct NodeInfo {
    name: String,
    domain: String,
    op_type: String,
    attrs: FxHashMap<String, AttrValue>,
    inputs: Vec<InputInfo>,
}

impl NodeInfo {
    /// Create a node for an operator in the `com.microsoft` domain, with no
    /// attributes or inputs.
    pub fn new(op_type: &str) -> Self {
        Self {
            name: String::new(),
            domain: MS_DOMAIN.to_string(),
            op_type: op_type.to_string(),
            attrs: FxHashMap::default(),
            inputs: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_domain(mut self, domain: &str) -> Self {
        self.domain = domain.to_string();
        self
    }

    /// Set an attribute, replacing any existing value.
    pub fn with_attr(mut self, name: &str, value: impl Into<AttrValue>) -> Self {
        self.attrs.insert(name.to_string(), value.into());
        self
    }

    /// Add an input with a known shape and type.
    pub fn with_input(mut self, shape: SymShape, value_type: ValueType) -> Self {
        self.inputs.push(InputInfo {
            shape: Some(shape),
            value_type: Some(value_type),
        });
        self
    }

    /// Add an input with a known shape and unknown type.
    pub fn with_input_shape(mut self, shape: SymShape) -> Self {
        self.inputs.push(InputInfo {
            shape: Some(shape),
            value_type: None,
        });
        self
    }

    /// Add an input with a known type and unknown shape.
    pub fn with_input_type(mut self, value_type: ValueType) -> Self {
        self.inputs.push(InputInfo {
            shape: None,
            value_type: Some(value_type),
        });
        self
    }

    /// Add an input with unknown shape and type.
    pub fn with_unknown_input(mut self) -> Self {
        self.inputs.push(InputInfo::default());
        self
    }

    /// Replace the information about the index'th input.
    ///
    /// This is used when a later pass has learned more about an input, for
    /// example after constant folding.
    ///
    /// Panics if `index` is out of bounds.
    pub fn set_input(&mut self, index: usize, info: InputInfo) {
        self.inputs[index] = info;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn op_type(&self) -> &str {
        &self.op_type
    }

    pub fn inputs(&self) -> &[InputInfo] {
        &self.inputs
    }
}

impl InferenceContext for NodeInfo {
    fn attribute(&self, name: &str) -> Option<&AttrValue> {
        self.attrs.get(name)
    }

    fn num_inputs(&self) -> usize {
        self.inputs.len()
    }

    fn input_shape(&self, index: usize) -> Option<SymShape> {
        self.inputs.get(index)?.shape.clone()
    }

    fn input_type(&self, index: usize) -> Option<ValueType> {
        self.inputs.get(index)?.value_type
    }
}
