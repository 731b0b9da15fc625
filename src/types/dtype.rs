//! This module defines the canonical dtype descriptors shared by the host side
//! and the native GraphBLAS engine.
//!
//! Each descriptor is a `static` constructed at compile time, so the registry can
//! hand out `&'static Dtype` references and every lookup path resolves to the
//! very same instance.

use crate::error::GrblasError;
use arrow::datatypes::DataType as ArrowDataType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// The element kind behind a descriptor.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DtypeKind {
    Bool,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Fp32,
    Fp64,
}

/// The broad class of values a kind accepts, in the host's terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueClass {
    Bool,
    Int,
    Float,
}

impl DtypeKind {
    /// Converts an Arrow `DataType` into a `DtypeKind`.
    pub fn from_arrow_type(arrow_type: &ArrowDataType) -> Result<Self, GrblasError> {
        match arrow_type {
            ArrowDataType::Boolean => Ok(Self::Bool),
            ArrowDataType::Int8 => Ok(Self::Int8),
            ArrowDataType::UInt8 => Ok(Self::UInt8),
            ArrowDataType::Int16 => Ok(Self::Int16),
            ArrowDataType::UInt16 => Ok(Self::UInt16),
            ArrowDataType::Int32 => Ok(Self::Int32),
            ArrowDataType::UInt32 => Ok(Self::UInt32),
            ArrowDataType::Int64 => Ok(Self::Int64),
            ArrowDataType::UInt64 => Ok(Self::UInt64),
            ArrowDataType::Float32 => Ok(Self::Fp32),
            ArrowDataType::Float64 => Ok(Self::Fp64),
            dt => Err(GrblasError::UnknownDtype(format!(
                "Arrow type {:?} has no GraphBLAS equivalent",
                dt
            ))),
        }
    }

    /// Converts a `DtypeKind` back into an Arrow `DataType`.
    pub fn to_arrow_type(&self) -> ArrowDataType {
        match self {
            Self::Bool => ArrowDataType::Boolean,
            Self::Int8 => ArrowDataType::Int8,
            Self::UInt8 => ArrowDataType::UInt8,
            Self::Int16 => ArrowDataType::Int16,
            Self::UInt16 => ArrowDataType::UInt16,
            Self::Int32 => ArrowDataType::Int32,
            Self::UInt32 => ArrowDataType::UInt32,
            Self::Int64 => ArrowDataType::Int64,
            Self::UInt64 => ArrowDataType::UInt64,
            Self::Fp32 => ArrowDataType::Float32,
            Self::Fp64 => ArrowDataType::Float64,
        }
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Self::Bool)
    }

    /// Returns `true` for signed and unsigned integers (not booleans).
    pub fn is_integer(&self) -> bool {
        self.is_signed_int() || self.is_unsigned_int()
    }

    pub fn is_signed_int(&self) -> bool {
        matches!(self, Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64)
    }

    pub fn is_unsigned_int(&self) -> bool {
        matches!(self, Self::UInt8 | Self::UInt16 | Self::UInt32 | Self::UInt64)
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Self::Fp32 | Self::Fp64)
    }

    pub fn value_class(&self) -> ValueClass {
        if self.is_bool() {
            ValueClass::Bool
        } else if self.is_float() {
            ValueClass::Float
        } else {
            ValueClass::Int
        }
    }
}

/// A canonical element-type descriptor bridging host value types and native type tags.
#[derive(Debug, Serialize)]
pub struct Dtype {
    /// Canonical name, e.g. `"INT64"`.
    pub name: &'static str,
    /// Name of the native type object, e.g. `"GrB_INT64"`.
    pub gb_name: &'static str,
    /// C type used when declaring native buffers, e.g. `"int64_t"`.
    pub c_type: &'static str,
    /// Element type name of the equivalent host array, e.g. `"int64"`.
    pub np_type: &'static str,
    /// Size of one element in bytes.
    pub size: usize,
    pub kind: DtypeKind,
}

impl Dtype {
    pub fn is_bool(&self) -> bool {
        self.kind.is_bool()
    }

    pub fn is_integer(&self) -> bool {
        self.kind.is_integer()
    }

    pub fn is_float(&self) -> bool {
        self.kind.is_float()
    }

    pub fn to_arrow_type(&self) -> ArrowDataType {
        self.kind.to_arrow_type()
    }
}

// Descriptors compare by canonical name, so `INDEX == UINT64`.
impl PartialEq for Dtype {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Dtype {}

impl Hash for Dtype {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl PartialEq<str> for Dtype {
    fn eq(&self, other: &str) -> bool {
        self.name == other
    }
}

impl PartialEq<&str> for Dtype {
    fn eq(&self, other: &&str) -> bool {
        self.name == *other
    }
}

impl fmt::Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

//==================================================================================
// Canonical descriptors
//==================================================================================

macro_rules! define_dtype {
    ($ident:ident, $name:literal, $gb:literal, $c:literal, $np:literal, $size:literal, $kind:ident) => {
        pub static $ident: Dtype = Dtype {
            name: $name,
            gb_name: $gb,
            c_type: $c,
            np_type: $np,
            size: $size,
            kind: DtypeKind::$kind,
        };
    };
}

define_dtype!(BOOL, "BOOL", "GrB_BOOL", "bool", "bool", 1, Bool);
define_dtype!(INT8, "INT8", "GrB_INT8", "int8_t", "int8", 1, Int8);
define_dtype!(UINT8, "UINT8", "GrB_UINT8", "uint8_t", "uint8", 1, UInt8);
define_dtype!(INT16, "INT16", "GrB_INT16", "int16_t", "int16", 2, Int16);
define_dtype!(UINT16, "UINT16", "GrB_UINT16", "uint16_t", "uint16", 2, UInt16);
define_dtype!(INT32, "INT32", "GrB_INT32", "int32_t", "int32", 4, Int32);
define_dtype!(UINT32, "UINT32", "GrB_UINT32", "uint32_t", "uint32", 4, UInt32);
define_dtype!(INT64, "INT64", "GrB_INT64", "int64_t", "int64", 8, Int64);
define_dtype!(UINT64, "UINT64", "GrB_UINT64", "uint64_t", "uint64", 8, UInt64);
define_dtype!(FP32, "FP32", "GrB_FP32", "float", "float32", 4, Fp32);
define_dtype!(FP64, "FP64", "GrB_FP64", "double", "float64", 8, Fp64);

// The native index type. Not registered under its own name: it is a UINT64
// that declares buffers as `GrB_Index[]`.
define_dtype!(INDEX, "UINT64", "GrB_UINT64", "GrB_Index", "uint64", 8, UInt64);

/// Every canonical descriptor, in registry order.
pub static CANONICAL_DTYPES: [&Dtype; 11] = [
    &BOOL, &INT8, &UINT8, &INT16, &UINT16, &INT32, &UINT32, &INT64, &UINT64, &FP32, &FP64,
];

impl DtypeKind {
    /// The canonical descriptor for this kind.
    pub fn dtype(&self) -> &'static Dtype {
        match self {
            Self::Bool => &BOOL,
            Self::Int8 => &INT8,
            Self::UInt8 => &UINT8,
            Self::Int16 => &INT16,
            Self::UInt16 => &UINT16,
            Self::Int32 => &INT32,
            Self::UInt32 => &UINT32,
            Self::Int64 => &INT64,
            Self::UInt64 => &UINT64,
            Self::Fp32 => &FP32,
            Self::Fp64 => &FP64,
        }
    }

    /// The kind two typed host values combine to in one array: booleans yield
    /// to anything, mixed signedness moves to a signed kind wider than both
    /// (FP64 past 64 bits), and FP32 only holds integers up to 16 bits.
    pub fn promote(self, other: Self) -> Self {
        let (low, high) = if self <= other { (self, other) } else { (other, self) };
        if low == high || low.is_bool() {
            return high;
        }
        if high.is_float() {
            return if high == Self::Fp32 && low.size() <= 2 {
                Self::Fp32
            } else {
                Self::Fp64
            };
        }
        if low.is_signed_int() == high.is_signed_int() {
            return if low.size() >= high.size() { low } else { high };
        }
        let (signed, unsigned) = if low.is_signed_int() { (low, high) } else { (high, low) };
        if signed.size() > unsigned.size() {
            return signed;
        }
        match unsigned.size() {
            1 => Self::Int16,
            2 => Self::Int32,
            4 => Self::Int64,
            _ => Self::Fp64,
        }
    }

    fn size(self) -> usize {
        self.dtype().size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizes_match_rust_primitives() {
        assert_eq!(INT16.size, std::mem::size_of::<i16>());
        assert_eq!(UINT32.size, std::mem::size_of::<u32>());
        assert_eq!(FP64.size, std::mem::size_of::<f64>());
        assert_eq!(BOOL.size, 1);
    }

    #[test]
    fn test_index_equals_uint64() {
        assert_eq!(INDEX, UINT64);
        assert_eq!(INDEX.c_type, "GrB_Index");
        assert_ne!(INDEX.c_type, UINT64.c_type);
    }

    #[test]
    fn test_arrow_roundtrip_for_every_kind() {
        for dtype in CANONICAL_DTYPES.iter() {
            let arrow = dtype.to_arrow_type();
            assert_eq!(DtypeKind::from_arrow_type(&arrow).unwrap(), dtype.kind);
        }
        assert!(DtypeKind::from_arrow_type(&ArrowDataType::Utf8).is_err());
    }

    #[test]
    fn test_promotion_table() {
        use DtypeKind::*;
        assert_eq!(Int8.promote(UInt8), Int16);
        assert_eq!(UInt8.promote(Int8), Int16);
        assert_eq!(UInt32.promote(Int32), Int64);
        assert_eq!(Int64.promote(UInt64), Fp64);
        assert_eq!(UInt16.promote(Int64), Int64);
        assert_eq!(Int16.promote(Int64), Int64);
        assert_eq!(UInt8.promote(UInt64), UInt64);
        assert_eq!(Bool.promote(UInt8), UInt8);
        assert_eq!(Fp32.promote(Int16), Fp32);
        assert_eq!(Fp32.promote(Int32), Fp64);
        assert_eq!(Fp32.promote(Fp64), Fp64);
        assert_eq!(Fp32.promote(Fp32), Fp32);
    }

    #[test]
    fn test_kind_dtype_is_canonical_instance() {
        for dtype in CANONICAL_DTYPES.iter() {
            assert!(std::ptr::eq(dtype.kind.dtype(), *dtype));
        }
    }
}
