//! Links Rust primitive types to their dtype descriptors.

use arrow::datatypes::ArrowNativeType;
use bytemuck::Pod;

use crate::types::dtype::{Dtype, BOOL, FP32, FP64, INT16, INT32, INT64, INT8, UINT16, UINT32, UINT64, UINT8};
use crate::types::value::ScalarValue;

/// A Rust type that can be stored as an element of a native buffer.
///
/// `Storage` is the plain-old-data representation written to memory. It equals
/// `Self` for every numeric type; `bool` is stored as a `u8` holding 0 or 1.
pub trait Element: Copy + Send + Sync + 'static {
    type Storage: Pod + ArrowNativeType;

    fn dtype() -> &'static Dtype;
    fn into_storage(self) -> Self::Storage;
    fn from_storage(raw: Self::Storage) -> Self;
    fn into_value(self) -> ScalarValue;
}

macro_rules! impl_numeric_element {
    ($($t:ty => $dtype:ident),+ $(,)?) => {
        $(
            impl Element for $t {
                type Storage = $t;

                fn dtype() -> &'static Dtype {
                    &$dtype
                }

                fn into_storage(self) -> Self::Storage {
                    self
                }

                fn from_storage(raw: Self::Storage) -> Self {
                    raw
                }

                fn into_value(self) -> ScalarValue {
                    ScalarValue::from(self)
                }
            }
        )+
    };
}

impl_numeric_element!(
    i8 => INT8,
    u8 => UINT8,
    i16 => INT16,
    u16 => UINT16,
    i32 => INT32,
    u32 => UINT32,
    i64 => INT64,
    u64 => UINT64,
    f32 => FP32,
    f64 => FP64,
);

impl Element for bool {
    type Storage = u8;

    fn dtype() -> &'static Dtype {
        &BOOL
    }

    fn into_storage(self) -> u8 {
        self as u8
    }

    fn from_storage(raw: u8) -> Self {
        raw != 0
    }

    fn into_value(self) -> ScalarValue {
        ScalarValue::Bool(self)
    }
}
