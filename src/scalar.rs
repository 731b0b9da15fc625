// In: src/scalar.rs

//! The user-facing single-value container.
//!
//! A [`Scalar`] commits to a dtype when it is created and never changes it. Its
//! content is one of three states:
//!
//! ```text
//!   new(dtype) ──> TypeOnly ──set(v)──> Present(v) ──clear()──> Empty
//!                     │                    ▲   │                  │
//!                     └──────clear()───────┼───┼──────────────────┤
//!                                          └───┴─────set(v)───────┘
//! ```
//!
//! `TypeOnly` and `Empty` read the same (no value); they differ only in whether
//! a storage cell has been materialised.

use std::ffi::c_void;
use std::fmt;

use crate::buffer::OwnedBuffer;
use crate::config::Order;
use crate::error::{GrblasError, Result};
use crate::ffi::NativeObject;
use crate::types::{lookup_dtype, Dtype, DtypeSpecifier, HostType, HostValue, ScalarValue, ValueClass};

/// What a [`Scalar`] currently holds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScalarState {
    /// Freshly constructed: a dtype but no storage yet.
    TypeOnly,
    /// Explicitly cleared.
    Empty,
    Present(ScalarValue),
}

/// A named, dtype-tagged container for at most one value.
#[derive(Debug, Clone)]
pub struct Scalar {
    name: Option<String>,
    dtype: &'static Dtype,
    state: ScalarState,
}

impl Scalar {
    /// A valueless scalar of the given dtype.
    pub fn new<'a>(dtype: impl Into<DtypeSpecifier<'a>>) -> Result<Self> {
        Ok(Self {
            name: None,
            dtype: lookup_dtype(dtype)?,
            state: ScalarState::TypeOnly,
        })
    }

    /// A scalar holding `value`, with its dtype inferred from the value.
    pub fn from_value(value: impl Into<HostValue>) -> Result<Self> {
        let value = value.into();
        let dtype = match &value {
            HostValue::Bool(_) => lookup_dtype(HostType::Bool)?,
            HostValue::Int(_) => lookup_dtype(HostType::Int)?,
            HostValue::Float(_) => lookup_dtype(HostType::Float)?,
            HostValue::Typed(v) => v.dtype(),
            HostValue::None | HostValue::Str(_) => {
                return Err(GrblasError::InvalidValueType(format!(
                    "cannot infer a dtype for a Scalar from {} value {}",
                    value.type_name(),
                    value
                )))
            }
        };
        let mut scalar = Self {
            name: None,
            dtype,
            state: ScalarState::TypeOnly,
        };
        scalar.set(value)?;
        Ok(scalar)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn dtype(&self) -> &'static Dtype {
        self.dtype
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn state(&self) -> ScalarState {
        self.state
    }

    /// The stored value, or `None` when the scalar is empty.
    pub fn value(&self) -> Option<ScalarValue> {
        match self.state {
            ScalarState::Present(value) => Some(value),
            ScalarState::TypeOnly | ScalarState::Empty => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        !matches!(self.state, ScalarState::Present(_))
    }

    /// `true` clears the scalar. `false` on a valueless scalar stores the
    /// dtype's zero value; a present value is kept.
    pub fn set_empty(&mut self, empty: bool) {
        if empty {
            self.clear();
        } else if self.is_empty() {
            self.state = ScalarState::Present(ScalarValue::zero(self.dtype));
        }
    }

    /// Assigns `value`, which must belong to the dtype's value class.
    ///
    /// BOOL scalars accept only booleans, integer scalars accept integers and
    /// booleans, float scalars accept any number. Assigning `None` clears.
    ///
    /// # Errors
    /// - `ScalarTypeError` if the value would have to be narrowed (a float into
    ///   an integer dtype) or is not a number at all.
    /// - `ValueOutOfRange` if an integer does not fit the dtype.
    pub fn set(&mut self, value: impl Into<HostValue>) -> Result<()> {
        let value = value.into();
        if value.is_none() {
            self.clear();
            return Ok(());
        }
        let type_error = || GrblasError::ScalarTypeError {
            value: format!("{} {}", value.type_name(), value),
            dtype: self.dtype.name.to_string(),
        };
        let class = value.value_class().ok_or_else(type_error)?;
        if !accepts(self.dtype.kind.value_class(), class) {
            return Err(type_error());
        }
        let scalar = value.as_scalar().ok_or_else(type_error)?;
        let converted = scalar
            .cast(self.dtype)
            .ok_or_else(|| GrblasError::ValueOutOfRange {
                name: self.name.clone().unwrap_or_else(|| "Scalar".to_string()),
                value: scalar.to_string(),
                dtype: self.dtype.name.to_string(),
            })?;
        self.state = ScalarState::Present(converted);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.state = ScalarState::Empty;
    }

    /// An independent copy with the same dtype, state and value.
    pub fn dup(&self) -> Self {
        self.clone()
    }

    /// Present and non-zero.
    pub fn is_truthy(&self) -> bool {
        self.value().map_or(false, |value| value.is_truthy())
    }

    /// The value as a one-element buffer, or a zero-length buffer if there is none.
    pub fn to_buffer(&self) -> Result<OwnedBuffer> {
        let mut buffer = OwnedBuffer::with_capacity(self.dtype, 1, Order::C);
        if let Some(value) = self.value() {
            buffer.push(value)?;
        }
        Ok(buffer)
    }
}

/// Whether a scalar of class `target` may hold a value of class `value`
/// without narrowing.
fn accepts(target: ValueClass, value: ValueClass) -> bool {
    match target {
        ValueClass::Bool => value == ValueClass::Bool,
        ValueClass::Int => matches!(value, ValueClass::Bool | ValueClass::Int),
        ValueClass::Float => true,
    }
}

// Empty scalars compare unequal to everything, themselves included.
impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        match (self.value(), other.value()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

impl PartialEq<HostValue> for Scalar {
    fn eq(&self, other: &HostValue) -> bool {
        match (self.value(), other.as_scalar()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

macro_rules! impl_scalar_eq {
    ($($t:ty),+) => {
        $(
            impl PartialEq<$t> for Scalar {
                fn eq(&self, other: &$t) -> bool {
                    *self == HostValue::from(*other)
                }
            }
        )+
    };
}

impl_scalar_eq!(bool, i64, i32, f64);

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Scalar(")?;
        if let Some(name) = &self.name {
            write!(f, "name={}, ", name)?;
        }
        match self.value() {
            Some(value) => write!(f, "dtype={}, value={})", self.dtype, value),
            None => write!(f, "dtype={}, value=None)", self.dtype),
        }
    }
}

impl NativeObject for Scalar {
    fn native_handle(&self) -> *const c_void {
        (&self.state as *const ScalarState).cast()
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn type_name(&self) -> &str {
        "Scalar"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ffi::{CallArg, Pointer};
    use crate::types::dtype::{BOOL, FP32, FP64, INT64, INT8, UINT8};

    #[test]
    fn test_new_is_valueless() {
        let s = Scalar::new(&INT8).unwrap();
        assert_eq!(s.dtype(), "INT8");
        assert_eq!(s.state(), ScalarState::TypeOnly);
        assert_eq!(s.value(), None);
        assert!(s.is_empty());
        assert!(!s.is_truthy());
    }

    #[test]
    fn test_set_empty_false_stores_zero() {
        let mut s = Scalar::new(&INT8).unwrap();
        s.set_empty(false);
        assert!(matches!(s.value(), Some(ScalarValue::Int8(0))));

        let mut b = Scalar::new(HostType::Bool).unwrap();
        assert_eq!(b.dtype(), &BOOL);
        b.set_empty(false);
        assert!(matches!(b.value(), Some(ScalarValue::Bool(false))));
    }

    #[test]
    fn test_set_empty_false_keeps_value() {
        let mut s = Scalar::from_value(7).unwrap();
        s.set_empty(false);
        assert_eq!(s, 7);
    }

    #[test]
    fn test_from_value_infers_dtype() {
        let s = Scalar::from_value(5).unwrap();
        assert_eq!(s.dtype(), &INT64);
        let b = Scalar::from_value(false).unwrap();
        assert_eq!(b.dtype(), &BOOL);
        assert!(matches!(b.value(), Some(ScalarValue::Bool(false))));
        let f = Scalar::from_value(-1.1).unwrap();
        assert_eq!(f.dtype(), "FP64");
        assert_eq!(f, -1.1);
        let t = Scalar::from_value(ScalarValue::Fp32(2.5)).unwrap();
        assert_eq!(t.dtype(), &FP32);
        assert!(Scalar::from_value("five").is_err());
        assert!(Scalar::from_value(HostValue::None).is_err());
    }

    #[test]
    fn test_dup_is_independent() {
        let s = Scalar::from_value(5).unwrap();
        let mut s2 = s.dup();
        assert_eq!(s2.dtype(), s.dtype());
        assert_eq!(s2, 5);
        s2.set(6).unwrap();
        assert_eq!(s, 5);
        assert_eq!(s2, 6);

        let cleared = {
            let mut c = Scalar::from_value(1).unwrap();
            c.clear();
            c
        };
        assert_eq!(cleared.dup().state(), ScalarState::Empty);
    }

    #[test]
    fn test_clear_from_every_state() {
        let mut fresh = Scalar::new(&FP64).unwrap();
        fresh.clear();
        assert_eq!(fresh.state(), ScalarState::Empty);

        let mut s = Scalar::from_value(5).unwrap();
        assert!(!s.is_empty());
        s.clear();
        assert_eq!(s.value(), None);
        assert!(s.is_empty());

        let mut b = Scalar::from_value(true).unwrap();
        b.clear();
        assert!(b.is_empty());
    }

    #[test]
    fn test_equality() {
        let s = Scalar::from_value(5).unwrap();
        assert_eq!(s, 5);
        assert_ne!(s, 27);
        assert_eq!(s, 5.0);
        assert_eq!(s, Scalar::from_value(5.0).unwrap());

        let mut empty = Scalar::from_value(5).unwrap();
        empty.clear();
        assert_ne!(empty, 5);
        assert_ne!(empty, HostValue::None);
        assert_ne!(empty, empty.dup());
    }

    #[test]
    fn test_truthiness() {
        assert!(Scalar::from_value(5).unwrap().is_truthy());
        assert!(Scalar::from_value(true).unwrap().is_truthy());
        assert!(!Scalar::from_value(0).unwrap().is_truthy());

        let mut b = Scalar::new(&BOOL).unwrap();
        b.set(false).unwrap();
        assert!(matches!(b.value(), Some(ScalarValue::Bool(false))));
        assert!(!b.is_truthy());
    }

    #[test]
    fn test_set_rejects_narrowing() {
        let mut s = Scalar::from_value(5).unwrap();
        s.set(12).unwrap();
        assert_eq!(s, 12);
        let err = s.set(12.5).unwrap_err();
        assert!(matches!(err, GrblasError::ScalarTypeError { .. }));
        assert_eq!(s, 12);
        assert!(matches!(s.set("12"), Err(GrblasError::ScalarTypeError { .. })));
    }

    #[test]
    fn test_set_class_rules() {
        let mut b = Scalar::new(&BOOL).unwrap();
        assert!(b.set(1).is_err());

        let mut f = Scalar::new(&FP32).unwrap();
        f.set(3).unwrap();
        assert!(matches!(f.value(), Some(ScalarValue::Fp32(x)) if x == 3.0));

        let mut u = Scalar::new(&UINT8).unwrap();
        u.set(true).unwrap();
        assert_eq!(u, 1);
        assert!(matches!(u.set(256), Err(GrblasError::ValueOutOfRange { .. })));
        assert!(matches!(u.set(ScalarValue::Fp64(1.0)), Err(GrblasError::ScalarTypeError { .. })));
    }

    #[test]
    fn test_set_none_clears() {
        let mut s = Scalar::from_value(5).unwrap();
        s.set(HostValue::None).unwrap();
        assert!(s.is_empty());
    }

    #[test]
    fn test_to_buffer() {
        let s = Scalar::from_value(42).unwrap();
        let buffer = s.to_buffer().unwrap();
        assert_eq!(buffer.to_vec::<i64>().unwrap(), vec![42]);
        assert!(Scalar::new(&INT64).unwrap().to_buffer().unwrap().is_empty());
    }

    #[test]
    fn test_pointer_to_scalar() {
        let anonymous = Scalar::from_value(1).unwrap();
        assert_eq!(Pointer::new(&anonymous).debug_name(), "&temp_scalar");
        let named = Scalar::from_value(1).unwrap().with_name("s_0");
        assert_eq!(Pointer::new(&named).debug_name(), "&s_0");
    }

    #[test]
    fn test_display() {
        let s = Scalar::from_value(2.0).unwrap().with_name("x");
        assert_eq!(s.to_string(), "Scalar(name=x, dtype=FP64, value=2.0)");
        assert_eq!(Scalar::new(&INT8).unwrap().to_string(), "Scalar(dtype=INT8, value=None)");
    }
}
