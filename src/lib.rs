//! Shape and type inference for ONNX Runtime's contrib MatMul operators.
//!
//! # About shape inference
//!
//! Graph optimizations and validation depend upon knowing the shapes and
//! element types of values in a graph before it is run. Shape inference
//! computes these from the shapes of the graph inputs, which may contain
//! dimensions whose size is only known at runtime, such as a batch size.
//!
//! This crate implements the shape rules shared by the MatMul-family
//! operators in the `com.microsoft` domain: `FusedMatMul`, `TransposeMatMul`,
//! `SparseToDenseMatMul` and `MatMulInteger16`. These follow `numpy.matmul`:
//!
//! - The last two dimensions of each operand are the rows and columns of a
//!   matrix. Preceding dimensions are batch dimensions which are broadcast
//!   together.
//! - A vector LHS is treated as a single row and a vector RHS as a single
//!   column. The extra dimension is dropped from the output.
//!
//! Operators may additionally transpose the matrix dimensions of an operand
//! or move its first dimension into the matrix dimensions (see
//! [`MatMulFlags`]).
//!
//! # Crate overview
//!
//! The core of the crate is [`infer_matmul_shape`], a pure function of the
//! operand shapes and flags. Shapes are represented by [`SymShape`], whose
//! dimensions are [`SymDim`]s that may be fixed, named or unknown.
//!
//! Operators implement the [`InferShapes`] trait. They read attributes and
//! input information from the host through the [`InferenceContext`] trait
//! and produce an [`OutputInfo`] per output. [`OpRegistry`] maps operator
//! names to implementations and can process many nodes in parallel.
//!
//! Inference distinguishes between two kinds of outcome:
//!
//! - Inputs whose shapes are definitely invalid produce an
//!   [`InferShapesError`].
//! - Inputs whose shapes are not known produce outputs whose shapes are not
//!   known (`None`). This is not an error. A later inference pass may have
//!   more information.
//!
//! ```
//! use rten_matmul_infer::{ElemType, NodeInfo, OpRegistry, SymShape, ValueType};
//!
//! let reg = OpRegistry::with_contrib_matmul_ops();
//! let float = ValueType::Tensor(ElemType::Float);
//! let node = NodeInfo::new("FusedMatMul")
//!     .with_attr("transB", 1)
//!     .with_input(SymShape::from_dims(["batch".into(), 3.into(), 4.into()]), float)
//!     .with_input(SymShape::from_fixed(&[5, 4]), float);
//!
//! let outputs = reg.infer_node(&node).unwrap().unwrap();
//! assert_eq!(outputs[0].value_type, Some(float));
//! assert_eq!(
//!     outputs[0].shape,
//!     Some(SymShape::from_dims(["batch".into(), 3.into(), 5.into()]))
//! );
//! ```

mod batch_matmul;
mod broadcast;
mod context;
mod elem_type;
mod env;
mod infer_shapes;
mod node;
pub mod ops;
mod registry;
mod sym_dim;
mod sym_shape;

pub use batch_matmul::{MatMulFlags, infer_matmul_shape};
pub use broadcast::broadcast_shapes;
pub use context::{AttrValue, InferenceContext, get_flag};
pub use elem_type::{ElemType, ValueType};
pub use infer_shapes::{DimAxis, InferShapes, InferShapesError, OutputInfo, TypeConstraint};
pub use node::{InputInfo, NodeInfo};
pub use registry::{DynInferShapes, NodeError, NodeResult, OpRegistry};
pub use sym_dim::SymDim;
pub use sym_shape::SymShape;
