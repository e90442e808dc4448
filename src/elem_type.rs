use std::fmt;

/// Tensor element type.
///
/// The discriminants match the values of ONNX's `TensorProto.DataType` enum.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(i32)]
pub enum ElemType {
    Float = 1,
    UInt8 = 2,
    Int8 = 3,
    UInt16 = 4,
    Int16 = 5,
    Int32 = 6,
    Int64 = 7,
    String = 8,
    Bool = 9,
    Float16 = 10,
    Double = 11,
    UInt32 = 12,
    UInt64 = 13,
    Complex64 = 14,
    Complex128 = 15,
    BFloat16 = 16,
}

impl ElemType {
    const ALL: [ElemType; 16] = [
        Self::Float,
        Self::UInt8,
        Self::Int8,
        Self::UInt16,
        Self::Int16,
        Self::Int32,
        Self::Int64,
        Self::String,
        Self::Bool,
        Self::Float16,
        Self::Double,
        Self::UInt32,
        Self::UInt64,
        Self::Complex64,
        Self::Complex128,
        Self::BFloat16,
    ];

    /// Convert an ONNX `TensorProto.DataType` value to an element type.
    ///
    /// Returns `None` for `UNDEFINED` (0) and for values this crate does not
    /// recognize.
    pub fn from_onnx(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|ty| ty.onnx_code() == code)
    }

    /// Return the ONNX `TensorProto.DataType` value for this type.
    pub fn onnx_code(self) -> i32 {
        self as i32
    }

    /// Return the name used for this type in ONNX type constraints, eg.
    /// "float" in `tensor(float)`.
    pub fn name(self) -> &'static str {
        match self {
            Self::Float => "float",
            Self::UInt8 => "uint8",
            Self::Int8 => "int8",
            Self::UInt16 => "uint16",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::String => "string",
            Self::Bool => "bool",
            Self::Float16 => "float16",
            Self::Double => "double",
            Self::UInt32 => "uint32",
            Self::UInt64 => "uint64",
            Self::Complex64 => "complex64",
            Self::Complex128 => "complex128",
            Self::BFloat16 => "bfloat16",
        }
    }
}

impl fmt::Display for ElemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Type of an operator input or output.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueType {
    /// Dense tensor.
    Tensor(ElemType),
    /// Sparse tensor, in either COO or CSR format.
    SparseTensor(ElemType),
}

impl ValueType {
    pub fn elem_type(self) -> ElemType {
        match self {
            Self::Tensor(ty) | Self::SparseTensor(ty) => ty,
        }
    }

    pub fn is_sparse(self) -> bool {
        matches!(self, Self::SparseTensor(_))
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tensor(ty) => write!(f, "tensor({})", ty),
            Self::SparseTensor(ty) => write!(f, "sparse_tensor({})", ty),
        }
    }
}
