// In: src/ffi/carg.rs

//! Call-argument adapters.
//!
//! Neither adapter calls into the native engine. They only take addresses and
//! render names, for the dispatch layer to pass along and to quote in errors.

use once_cell::unsync::OnceCell;
use std::borrow::Cow;
use std::ffi::c_void;

use crate::buffer::{marshal_value_buffer, HostInput, OwnedBuffer};
use crate::config::MarshalOptions;
use crate::error::Result;
use crate::types::dtype::INDEX;
use crate::types::Dtype;

/// Something that can be passed to a native routine.
pub trait CallArg {
    /// The address handed to the native call.
    fn address(&self) -> *const c_void;

    /// A C-like rendering of the argument for debug and error messages.
    fn debug_name(&self) -> Cow<'_, str>;
}

/// Renders `function(arg1, arg2, ...)` from the arguments' debug names.
pub fn format_call(function: &str, args: &[&dyn CallArg]) -> String {
    let rendered: Vec<Cow<'_, str>> = args.iter().map(|arg| arg.debug_name()).collect();
    format!("{}({})", function, rendered.join(", "))
}

//==================================================================================
// 1. CArray
//==================================================================================

/// A row-major buffer this adapter owns, presented as a C array argument.
#[derive(Debug, Clone)]
pub struct CArray {
    buffer: OwnedBuffer,
    name: Option<String>,
    rendered: OnceCell<String>,
}

impl CArray {
    /// A zero-initialised array of `size` elements (`GrB_Index` by default).
    pub fn with_size(size: usize, dtype: Option<&'static Dtype>) -> Self {
        let dtype = dtype.unwrap_or(&INDEX);
        Self::from_buffer(OwnedBuffer::zeroed(dtype, size))
    }

    /// Copies `values` into a new row-major array of `dtype` (`GrB_Index` by default).
    pub fn from_values<'a>(
        values: impl Into<HostInput<'a>>,
        dtype: Option<&'static Dtype>,
    ) -> Result<Self> {
        let dtype = dtype.unwrap_or(&INDEX);
        let (buffer, _) = marshal_value_buffer(values, Some(dtype.into()), &MarshalOptions::ownable())?;
        Ok(Self::from_buffer(buffer.into_owned()))
    }

    pub fn from_buffer(buffer: OwnedBuffer) -> Self {
        Self {
            buffer,
            name: None,
            rendered: OnceCell::new(),
        }
    }

    /// Uses `name` instead of the rendered contents as the debug name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn dtype(&self) -> &'static Dtype {
        self.buffer.dtype()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn buffer(&self) -> &OwnedBuffer {
        &self.buffer
    }

    /// Mutable access for native calls that fill the array. Drops the cached rendering.
    pub fn buffer_mut(&mut self) -> &mut OwnedBuffer {
        self.rendered.take();
        &mut self.buffer
    }

    pub fn into_buffer(self) -> OwnedBuffer {
        self.buffer
    }
}

impl CallArg for CArray {
    fn address(&self) -> *const c_void {
        self.buffer.as_ptr()
    }

    fn debug_name(&self) -> Cow<'_, str> {
        if let Some(name) = &self.name {
            return Cow::Borrowed(name.as_str());
        }
        Cow::Borrowed(self.rendered.get_or_init(|| self.buffer.view().preview()))
    }
}

//==================================================================================
// 2. Pointer
//==================================================================================

/// An object that owns a native handle.
pub trait NativeObject {
    /// Address of the native handle.
    fn native_handle(&self) -> *const c_void;

    /// The user-visible name, if any.
    fn name(&self) -> Option<&str>;

    /// The object's type name, e.g. `"Scalar"`.
    fn type_name(&self) -> &str;
}

/// Passes an object's native handle by address (`&name` in C terms).
///
/// The wrapper borrows the object and so cannot outlive it.
pub struct Pointer<'a, T: NativeObject + ?Sized> {
    target: &'a T,
}

impl<'a, T: NativeObject + ?Sized> Pointer<'a, T> {
    pub fn new(target: &'a T) -> Self {
        Self { target }
    }

    pub fn target(&self) -> &'a T {
        self.target
    }
}

impl<T: NativeObject + ?Sized> CallArg for Pointer<'_, T> {
    fn address(&self) -> *const c_void {
        self.target.native_handle()
    }

    fn debug_name(&self) -> Cow<'_, str> {
        match self.target.name() {
            Some(name) if !name.is_empty() => Cow::Owned(format!("&{}", name)),
            _ => Cow::Owned(format!(
                "&temp_{}",
                self.target.type_name().to_lowercase()
            )),
        }
    }
}
