//! Host values and dtype-tagged scalar values.
//!
//! `HostValue` is what the binding receives from the host language: a loosely
//! typed value that may not be representable natively at all (`None`, strings).
//! `ScalarValue` is a single element of one concrete dtype, which is what buffers
//! and scalars store.

use num_traits::{NumCast, ToPrimitive, Zero};
use std::fmt;

use crate::types::dtype::{Dtype, DtypeKind, ValueClass};

//==================================================================================
// 1. ScalarValue
//==================================================================================

/// A single element of a concrete dtype.
#[derive(Debug, Clone, Copy)]
pub enum ScalarValue {
    Bool(bool),
    Int8(i8),
    UInt8(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Fp32(f32),
    Fp64(f64),
}

/// Applies `$body` to the payload of every numeric variant; booleans are handled
/// by the caller-provided `$bool` arm.
macro_rules! dispatch_numeric {
    ($value:expr, $b:ident => $bool:expr, $v:ident => $body:expr) => {
        match $value {
            ScalarValue::Bool($b) => $bool,
            ScalarValue::Int8($v) => $body,
            ScalarValue::UInt8($v) => $body,
            ScalarValue::Int16($v) => $body,
            ScalarValue::UInt16($v) => $body,
            ScalarValue::Int32($v) => $body,
            ScalarValue::UInt32($v) => $body,
            ScalarValue::Int64($v) => $body,
            ScalarValue::UInt64($v) => $body,
            ScalarValue::Fp32($v) => $body,
            ScalarValue::Fp64($v) => $body,
        }
    };
}

/// Comparison domain for values of different dtypes.
enum Numeric {
    Int(i128),
    Float(f64),
}

impl ScalarValue {
    pub fn kind(&self) -> DtypeKind {
        match self {
            Self::Bool(_) => DtypeKind::Bool,
            Self::Int8(_) => DtypeKind::Int8,
            Self::UInt8(_) => DtypeKind::UInt8,
            Self::Int16(_) => DtypeKind::Int16,
            Self::UInt16(_) => DtypeKind::UInt16,
            Self::Int32(_) => DtypeKind::Int32,
            Self::UInt32(_) => DtypeKind::UInt32,
            Self::Int64(_) => DtypeKind::Int64,
            Self::UInt64(_) => DtypeKind::UInt64,
            Self::Fp32(_) => DtypeKind::Fp32,
            Self::Fp64(_) => DtypeKind::Fp64,
        }
    }

    /// The canonical descriptor of this value's dtype.
    pub fn dtype(&self) -> &'static Dtype {
        self.kind().dtype()
    }

    /// The zero value of a dtype (`False`, `0`, `0.0`).
    pub fn zero(dtype: &Dtype) -> Self {
        match dtype.kind {
            DtypeKind::Bool => Self::Bool(false),
            DtypeKind::Int8 => Self::Int8(0),
            DtypeKind::UInt8 => Self::UInt8(0),
            DtypeKind::Int16 => Self::Int16(0),
            DtypeKind::UInt16 => Self::UInt16(0),
            DtypeKind::Int32 => Self::Int32(0),
            DtypeKind::UInt32 => Self::UInt32(0),
            DtypeKind::Int64 => Self::Int64(0),
            DtypeKind::UInt64 => Self::UInt64(0),
            DtypeKind::Fp32 => Self::Fp32(0.0),
            DtypeKind::Fp64 => Self::Fp64(0.0),
        }
    }

    /// Converts this value into `dtype` the way a numeric array cast would:
    /// booleans become 0/1, floats truncate toward zero, and anything that
    /// does not fit returns `None`.
    pub fn cast(self, dtype: &Dtype) -> Option<Self> {
        if self.kind() == dtype.kind {
            return Some(self);
        }
        let cast = match dtype.kind {
            DtypeKind::Bool => Self::Bool(self.is_truthy()),
            DtypeKind::Int8 => Self::Int8(NumCast::from(self)?),
            DtypeKind::UInt8 => Self::UInt8(NumCast::from(self)?),
            DtypeKind::Int16 => Self::Int16(NumCast::from(self)?),
            DtypeKind::UInt16 => Self::UInt16(NumCast::from(self)?),
            DtypeKind::Int32 => Self::Int32(NumCast::from(self)?),
            DtypeKind::UInt32 => Self::UInt32(NumCast::from(self)?),
            DtypeKind::Int64 => Self::Int64(NumCast::from(self)?),
            DtypeKind::UInt64 => Self::UInt64(NumCast::from(self)?),
            DtypeKind::Fp32 => Self::Fp32(NumCast::from(self)?),
            DtypeKind::Fp64 => Self::Fp64(NumCast::from(self)?),
        };
        Some(cast)
    }

    /// Zero and `false` are falsy; everything else (NaN included) is truthy.
    pub fn is_truthy(&self) -> bool {
        dispatch_numeric!(*self, b => b, v => !Zero::is_zero(&v))
    }

    /// Decodes one element of `dtype` from native-endian bytes.
    pub fn from_ne_bytes(dtype: &Dtype, bytes: &[u8]) -> Option<Self> {
        let value = match dtype.kind {
            DtypeKind::Bool => Self::Bool(*bytes.first()? != 0),
            DtypeKind::Int8 => Self::Int8(i8::from_ne_bytes(bytes.try_into().ok()?)),
            DtypeKind::UInt8 => Self::UInt8(u8::from_ne_bytes(bytes.try_into().ok()?)),
            DtypeKind::Int16 => Self::Int16(i16::from_ne_bytes(bytes.try_into().ok()?)),
            DtypeKind::UInt16 => Self::UInt16(u16::from_ne_bytes(bytes.try_into().ok()?)),
            DtypeKind::Int32 => Self::Int32(i32::from_ne_bytes(bytes.try_into().ok()?)),
            DtypeKind::UInt32 => Self::UInt32(u32::from_ne_bytes(bytes.try_into().ok()?)),
            DtypeKind::Int64 => Self::Int64(i64::from_ne_bytes(bytes.try_into().ok()?)),
            DtypeKind::UInt64 => Self::UInt64(u64::from_ne_bytes(bytes.try_into().ok()?)),
            DtypeKind::Fp32 => Self::Fp32(f32::from_ne_bytes(bytes.try_into().ok()?)),
            DtypeKind::Fp64 => Self::Fp64(f64::from_ne_bytes(bytes.try_into().ok()?)),
        };
        Some(value)
    }

    /// Encodes this value as native-endian bytes, `size_of` its dtype long.
    pub fn to_ne_bytes(&self) -> Vec<u8> {
        dispatch_numeric!(*self, b => vec![b as u8], v => v.to_ne_bytes().to_vec())
    }

    fn numeric(&self) -> Numeric {
        match *self {
            Self::Bool(b) => Numeric::Int(b as i128),
            Self::Int8(v) => Numeric::Int(v.into()),
            Self::UInt8(v) => Numeric::Int(v.into()),
            Self::Int16(v) => Numeric::Int(v.into()),
            Self::UInt16(v) => Numeric::Int(v.into()),
            Self::Int32(v) => Numeric::Int(v.into()),
            Self::UInt32(v) => Numeric::Int(v.into()),
            Self::Int64(v) => Numeric::Int(v.into()),
            Self::UInt64(v) => Numeric::Int(v.into()),
            Self::Fp32(v) => Numeric::Float(v.into()),
            Self::Fp64(v) => Numeric::Float(v),
        }
    }
}

impl ToPrimitive for ScalarValue {
    fn to_i64(&self) -> Option<i64> {
        dispatch_numeric!(*self, b => Some(b as i64), v => v.to_i64())
    }

    fn to_u64(&self) -> Option<u64> {
        dispatch_numeric!(*self, b => Some(b as u64), v => v.to_u64())
    }

    fn to_f64(&self) -> Option<f64> {
        dispatch_numeric!(*self, b => Some(if b { 1.0 } else { 0.0 }), v => v.to_f64())
    }

    fn to_f32(&self) -> Option<f32> {
        dispatch_numeric!(*self, b => Some(if b { 1.0 } else { 0.0 }), v => v.to_f32())
    }
}

// Numeric equality across dtypes: `Int64(1) == Fp64(1.0) == Bool(true)`.
impl PartialEq for ScalarValue {
    fn eq(&self, other: &Self) -> bool {
        match (self.numeric(), other.numeric()) {
            (Numeric::Int(a), Numeric::Int(b)) => a == b,
            (Numeric::Int(a), Numeric::Float(b)) | (Numeric::Float(b), Numeric::Int(a)) => {
                int_equals_float(a, b)
            }
            (Numeric::Float(a), Numeric::Float(b)) => a == b,
        }
    }
}

// Exact: a float only equals an integer it represents with no rounding.
fn int_equals_float(a: i128, b: f64) -> bool {
    const LIMIT: f64 = 170_141_183_460_469_231_731_687_303_715_884_105_728.0; // 2^127
    b.fract() == 0.0 && (-LIMIT..LIMIT).contains(&b) && a == b as i128
}

/// Renders the value the way the host prints array elements (`True`, `5`, `1.0`).
impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
            Self::Fp32(v) => fmt_float(f, v as f64),
            Self::Fp64(v) => fmt_float(f, v),
            other => dispatch_numeric!(other, _b => Ok(()), v => write!(f, "{}", v)),
        }
    }
}

fn fmt_float(f: &mut fmt::Formatter<'_>, v: f64) -> fmt::Result {
    if v.is_nan() {
        f.write_str("nan")
    } else if v.is_infinite() {
        f.write_str(if v > 0.0 { "inf" } else { "-inf" })
    } else if v.fract() == 0.0 && v.abs() < 1e16 {
        write!(f, "{:.1}", v)
    } else {
        write!(f, "{}", v)
    }
}

macro_rules! impl_scalar_from {
    ($($t:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$t> for ScalarValue {
                fn from(v: $t) -> Self {
                    ScalarValue::$variant(v)
                }
            }
        )+
    };
}

impl_scalar_from!(
    bool => Bool,
    i8 => Int8,
    u8 => UInt8,
    i16 => Int16,
    u16 => UInt16,
    i32 => Int32,
    u32 => UInt32,
    i64 => Int64,
    u64 => UInt64,
    f32 => Fp32,
    f64 => Fp64,
);

//==================================================================================
// 2. HostValue
//==================================================================================

/// A value as supplied by the host language.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum HostValue {
    #[default]
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// An element that already carries a dtype (a host-array scalar).
    Typed(ScalarValue),
}

impl HostValue {
    /// The host's name for this value's type, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "NoneType",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::Typed(v) => v.dtype().np_type,
        }
    }

    /// The value class this host value belongs to, or `None` for values with
    /// no numeric meaning.
    pub fn value_class(&self) -> Option<ValueClass> {
        match self {
            Self::Bool(_) => Some(ValueClass::Bool),
            Self::Int(_) => Some(ValueClass::Int),
            Self::Float(_) => Some(ValueClass::Float),
            Self::Typed(v) => Some(v.kind().value_class()),
            Self::None | Self::Str(_) => None,
        }
    }

    /// The natural dtype-tagged form: `bool` → BOOL, `int` → INT64, `float` → FP64.
    pub fn as_scalar(&self) -> Option<ScalarValue> {
        match self {
            Self::Bool(b) => Some(ScalarValue::Bool(*b)),
            Self::Int(i) => Some(ScalarValue::Int64(*i)),
            Self::Float(x) => Some(ScalarValue::Fp64(*x)),
            Self::Typed(v) => Some(*v),
            Self::None | Self::Str(_) => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl fmt::Display for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Bool(b) => write!(f, "{}", ScalarValue::Bool(*b)),
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", ScalarValue::Fp64(*x)),
            Self::Str(s) => write!(f, "'{}'", s),
            Self::Typed(v) => write!(f, "{}", v),
        }
    }
}

impl From<bool> for HostValue {
    fn from(v: bool) -> Self {
        HostValue::Bool(v)
    }
}

impl From<i64> for HostValue {
    fn from(v: i64) -> Self {
        HostValue::Int(v)
    }
}

impl From<i32> for HostValue {
    fn from(v: i32) -> Self {
        HostValue::Int(v.into())
    }
}

impl From<f64> for HostValue {
    fn from(v: f64) -> Self {
        HostValue::Float(v)
    }
}

impl From<&str> for HostValue {
    fn from(v: &str) -> Self {
        HostValue::Str(v.to_owned())
    }
}

impl From<String> for HostValue {
    fn from(v: String) -> Self {
        HostValue::Str(v)
    }
}

impl From<ScalarValue> for HostValue {
    fn from(v: ScalarValue) -> Self {
        HostValue::Typed(v)
    }
}

impl<T: Into<HostValue>> From<Option<T>> for HostValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(HostValue::None, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::dtype::{BOOL, FP32, INT64, INT8, UINT16, UINT64};

    #[test]
    fn test_cast_follows_numeric_rules() {
        assert_eq!(ScalarValue::Fp64(1.9).cast(&INT64), Some(ScalarValue::Int64(1)));
        assert_eq!(ScalarValue::Bool(true).cast(&UINT16), Some(ScalarValue::UInt16(1)));
        assert_eq!(ScalarValue::Int64(3).cast(&BOOL), Some(ScalarValue::Bool(true)));
        assert_eq!(ScalarValue::Int64(300).cast(&INT8), None);
        assert_eq!(ScalarValue::Int64(-1).cast(&UINT64), None);
        assert_eq!(ScalarValue::Fp64(f64::NAN).cast(&INT64), None);
        assert!(matches!(ScalarValue::Int64(2).cast(&FP32), Some(ScalarValue::Fp32(x)) if x == 2.0));
    }

    #[test]
    fn test_equality_is_numeric_across_dtypes() {
        assert_eq!(ScalarValue::Int8(5), ScalarValue::Int64(5));
        assert_eq!(ScalarValue::Fp64(5.0), ScalarValue::UInt32(5));
        assert_eq!(ScalarValue::Bool(true), ScalarValue::Int64(1));
        assert_ne!(ScalarValue::Fp64(5.5), ScalarValue::Int64(5));
        assert_ne!(ScalarValue::UInt64(u64::MAX), ScalarValue::Int64(-1));
    }

    #[test]
    fn test_int_float_equality_is_exact() {
        let two_53 = 1i64 << 53;
        assert_ne!(ScalarValue::Int64(two_53 + 1), ScalarValue::Fp64(two_53 as f64));
        assert_eq!(ScalarValue::Int64(two_53), ScalarValue::Fp64(two_53 as f64));
        assert_ne!(ScalarValue::UInt64(u64::MAX), ScalarValue::Fp64(u64::MAX as f64));
        assert_ne!(ScalarValue::Int64(0), ScalarValue::Fp64(f64::NAN));
        assert_ne!(ScalarValue::Int64(i64::MAX), ScalarValue::Fp64(f64::INFINITY));
        assert_eq!(ScalarValue::Int8(-3), ScalarValue::Fp32(-3.0));
    }

    #[test]
    fn test_truthiness() {
        assert!(!ScalarValue::Bool(false).is_truthy());
        assert!(!ScalarValue::Int32(0).is_truthy());
        assert!(!ScalarValue::Fp64(0.0).is_truthy());
        assert!(ScalarValue::Fp64(-0.5).is_truthy());
        assert!(ScalarValue::UInt8(7).is_truthy());
        assert!(!ScalarValue::UInt64(0).is_truthy());
        assert!(!ScalarValue::Fp32(-0.0).is_truthy());
        assert!(ScalarValue::Fp64(f64::NAN).is_truthy());
    }

    #[test]
    fn test_display_matches_host_printing() {
        assert_eq!(ScalarValue::Bool(true).to_string(), "True");
        assert_eq!(ScalarValue::Int16(-4).to_string(), "-4");
        assert_eq!(ScalarValue::Fp64(1.0).to_string(), "1.0");
        assert_eq!(ScalarValue::Fp64(-1.1).to_string(), "-1.1");
        assert_eq!(ScalarValue::Fp32(f32::INFINITY).to_string(), "inf");
    }

    #[test]
    fn test_bytes_roundtrip_preserves_value() {
        for value in [
            ScalarValue::Bool(true),
            ScalarValue::Int16(-300),
            ScalarValue::UInt64(u64::MAX),
            ScalarValue::Fp32(2.5),
        ] {
            let bytes = value.to_ne_bytes();
            assert_eq!(bytes.len(), value.dtype().size);
            let back = ScalarValue::from_ne_bytes(value.dtype(), &bytes).unwrap();
            assert_eq!(back.kind(), value.kind());
            assert_eq!(back, value);
        }
    }

    #[test]
    fn test_host_value_classes() {
        assert_eq!(HostValue::from(3).as_scalar(), Some(ScalarValue::Int64(3)));
        assert_eq!(HostValue::from(Some(false)), HostValue::Bool(false));
        assert_eq!(HostValue::from(None::<i64>), HostValue::None);
        assert_eq!(HostValue::from("x").value_class(), None);
        assert_eq!(HostValue::Typed(ScalarValue::Fp32(1.0)).type_name(), "float32");
    }
}
