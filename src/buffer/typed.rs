// In: src/buffer/typed.rs

//! Typed buffers handed to native calls.
//!
//! Ownership is carried by the type rather than by runtime flags:
//! - [`OwnedBuffer`] exclusively owns aligned, mutable storage. It may be moved
//!   into the native engine, retained past a call, or mutated freely.
//! - [`BufferView`] borrows another value's storage read-only and cannot
//!   outlive it, so it is only valid for the duration of one call.
//! - [`TypedBuffer`] is what the marshaller returns: one or the other.

use arrow::buffer::MutableBuffer;
use std::ffi::c_void;
use std::fmt;

use crate::config::Order;
use crate::error::{GrblasError, Result};
use crate::types::{Dtype, Element, ScalarValue};
use crate::utils::{
    join_preview, safe_bytes_to_typed_slice, safe_bytes_to_typed_slice_mut, typed_slice_to_bytes,
};

fn copy_into_mutable(bytes: &[u8]) -> MutableBuffer {
    let mut data = MutableBuffer::with_capacity(bytes.len());
    data.extend_from_slice(bytes);
    data
}

fn check_element<T: Element>(dtype: &Dtype) -> Result<()> {
    if T::dtype().kind != dtype.kind {
        return Err(GrblasError::InvalidValueType(format!(
            "buffer holds {} elements, not {}",
            dtype.name,
            T::dtype().name
        )));
    }
    Ok(())
}

//==================================================================================
// 1. BufferView
//==================================================================================

/// A read-only, borrowed view of contiguous elements of one dtype.
#[derive(Debug, Clone, Copy)]
pub struct BufferView<'a> {
    dtype: &'static Dtype,
    data: &'a [u8],
    order: Order,
}

impl<'a> BufferView<'a> {
    /// Wraps `data`, which must hold a whole number of `dtype` elements.
    pub fn new(dtype: &'static Dtype, data: &'a [u8], order: Order) -> Result<Self> {
        if data.len() % dtype.size != 0 {
            return Err(GrblasError::InternalError(format!(
                "{} bytes is not a whole number of {} elements",
                data.len(),
                dtype.name
            )));
        }
        Ok(Self { dtype, data, order })
    }

    pub fn dtype(&self) -> &'static Dtype {
        self.dtype
    }

    pub fn order(&self) -> Order {
        self.order
    }

    pub fn len(&self) -> usize {
        self.data.len() / self.dtype.size
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    /// Base address for a native call.
    pub fn as_ptr(&self) -> *const c_void {
        self.data.as_ptr().cast()
    }

    pub fn get(&self, index: usize) -> Option<ScalarValue> {
        let size = self.dtype.size;
        let start = index.checked_mul(size)?;
        let bytes = self.data.get(start..start.checked_add(size)?)?;
        ScalarValue::from_ne_bytes(self.dtype, bytes)
    }

    pub fn iter(&self) -> impl Iterator<Item = ScalarValue> + 'a {
        let dtype = self.dtype;
        self.data
            .chunks_exact(dtype.size)
            .filter_map(move |bytes| ScalarValue::from_ne_bytes(dtype, bytes))
    }

    /// The elements as their storage type (`u8` for booleans).
    pub fn as_slice<T: Element>(&self) -> Result<&'a [T::Storage]> {
        check_element::<T>(self.dtype)?;
        safe_bytes_to_typed_slice(self.data)
    }

    pub fn to_vec<T: Element>(&self) -> Result<Vec<T>> {
        Ok(self
            .as_slice::<T>()?
            .iter()
            .map(|&raw| T::from_storage(raw))
            .collect())
    }

    /// Copies the viewed elements into freshly allocated, exclusively owned storage.
    pub fn to_owned_buffer(&self) -> OwnedBuffer {
        OwnedBuffer {
            dtype: self.dtype,
            data: copy_into_mutable(self.data),
            order: self.order,
        }
    }

    /// `(c_type[]){1, 2, 3}`, eliding the middle of long buffers.
    pub fn preview(&self) -> String {
        let values = join_preview(self.len(), |i| {
            self.get(i).map(|v| v.to_string()).unwrap_or_default()
        });
        format!("({}[]){{{}}}", self.dtype.c_type, values)
    }
}

//==================================================================================
// 2. OwnedBuffer
//==================================================================================

/// Contiguous elements of one dtype in storage this buffer exclusively owns.
#[derive(Debug)]
pub struct OwnedBuffer {
    dtype: &'static Dtype,
    data: MutableBuffer,
    order: Order,
}

impl OwnedBuffer {
    /// A zero-initialised buffer of `len` elements.
    pub fn zeroed(dtype: &'static Dtype, len: usize) -> Self {
        Self {
            dtype,
            data: MutableBuffer::from_len_zeroed(len * dtype.size),
            order: Order::C,
        }
    }

    /// An empty buffer with room for `capacity` elements.
    pub fn with_capacity(dtype: &'static Dtype, capacity: usize, order: Order) -> Self {
        Self {
            dtype,
            data: MutableBuffer::with_capacity(capacity * dtype.size),
            order,
        }
    }

    /// Copies a slice of Rust elements into a new buffer of their dtype.
    pub fn from_slice<T: Element>(values: &[T]) -> Self {
        let storage: Vec<T::Storage> = values.iter().map(|&v| v.into_storage()).collect();
        let mut buffer = Self::with_capacity(T::dtype(), values.len(), Order::C);
        buffer.data.extend_from_slice(&typed_slice_to_bytes(&storage));
        buffer
    }

    /// Appends one element, which must already be of this buffer's dtype.
    pub fn push(&mut self, value: ScalarValue) -> Result<()> {
        if value.kind() != self.dtype.kind {
            return Err(GrblasError::InternalError(format!(
                "cannot push a {} element into a {} buffer",
                value.dtype().name,
                self.dtype.name
            )));
        }
        self.data.extend_from_slice(&value.to_ne_bytes());
        Ok(())
    }

    /// Overwrites element `index`, converting `value` into this buffer's dtype.
    pub fn set(&mut self, index: usize, value: ScalarValue) -> Result<()> {
        let len = self.len();
        let converted = value
            .cast(self.dtype)
            .ok_or_else(|| GrblasError::ValueOutOfRange {
                name: format!("element {}", index),
                value: value.to_string(),
                dtype: self.dtype.name.to_string(),
            })?;
        let size = self.dtype.size;
        let range = index
            .checked_mul(size)
            .and_then(|start| Some(start..start.checked_add(size)?));
        let slot = range
            .and_then(|range| self.data.as_slice_mut().get_mut(range))
            .ok_or_else(|| {
                GrblasError::InvalidValueType(format!(
                    "index {} is out of bounds for a buffer of length {}",
                    index, len
                ))
            })?;
        slot.copy_from_slice(&converted.to_ne_bytes());
        Ok(())
    }

    pub fn view(&self) -> BufferView<'_> {
        BufferView {
            dtype: self.dtype,
            data: self.data.as_slice(),
            order: self.order,
        }
    }

    pub fn dtype(&self) -> &'static Dtype {
        self.dtype
    }

    pub fn order(&self) -> Order {
        self.order
    }

    pub fn len(&self) -> usize {
        self.data.len() / self.dtype.size
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.data.as_slice()
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        self.data.as_slice_mut()
    }

    pub fn as_ptr(&self) -> *const c_void {
        self.data.as_ptr().cast()
    }

    /// Base address for native calls that write into the buffer.
    pub fn as_mut_ptr(&mut self) -> *mut c_void {
        self.data.as_mut_ptr().cast()
    }

    pub fn get(&self, index: usize) -> Option<ScalarValue> {
        self.view().get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = ScalarValue> + '_ {
        self.view().iter()
    }

    pub fn as_slice<T: Element>(&self) -> Result<&[T::Storage]> {
        self.view().as_slice::<T>()
    }

    pub fn as_mut_slice<T: Element>(&mut self) -> Result<&mut [T::Storage]> {
        check_element::<T>(self.dtype)?;
        safe_bytes_to_typed_slice_mut(self.data.as_slice_mut())
    }

    pub fn to_vec<T: Element>(&self) -> Result<Vec<T>> {
        self.view().to_vec::<T>()
    }
}

impl Clone for OwnedBuffer {
    fn clone(&self) -> Self {
        self.view().to_owned_buffer()
    }
}

//==================================================================================
// 3. TypedBuffer
//==================================================================================

/// The result of marshalling: either storage of its own or a view of the input's.
#[derive(Debug)]
pub enum TypedBuffer<'a> {
    Owned(OwnedBuffer),
    Borrowed(BufferView<'a>),
}

impl<'a> TypedBuffer<'a> {
    pub fn view(&self) -> BufferView<'_> {
        match self {
            TypedBuffer::Owned(buffer) => buffer.view(),
            TypedBuffer::Borrowed(view) => *view,
        }
    }

    /// `true` if this buffer exclusively owns its storage.
    pub fn is_owned(&self) -> bool {
        matches!(self, TypedBuffer::Owned(_))
    }

    /// Returns exclusively owned storage, copying only if this is a view.
    pub fn into_owned(self) -> OwnedBuffer {
        match self {
            TypedBuffer::Owned(buffer) => buffer,
            TypedBuffer::Borrowed(view) => view.to_owned_buffer(),
        }
    }

    pub fn dtype(&self) -> &'static Dtype {
        self.view().dtype()
    }

    pub fn order(&self) -> Order {
        self.view().order()
    }

    pub fn len(&self) -> usize {
        self.view().len()
    }

    pub fn is_empty(&self) -> bool {
        self.view().is_empty()
    }

    pub fn as_ptr(&self) -> *const c_void {
        self.view().as_ptr()
    }

    pub fn get(&self, index: usize) -> Option<ScalarValue> {
        self.view().get(index)
    }

    pub fn to_vec<T: Element>(&self) -> Result<Vec<T>> {
        self.view().to_vec::<T>()
    }

    /// All elements, decoded.
    pub fn values(&self) -> Vec<ScalarValue> {
        self.view().iter().collect()
    }
}

impl fmt::Display for BufferView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.preview())
    }
}
