// In: src/ffi/mod.rs

//! The boundary with the native engine and with the Python interpreter.
//!
//! - `carg`: wrappers that present buffers and handle-owning objects as call
//!   arguments (an address plus a readable name for error messages).
//! - `symbols`: resolution of native routines by name.
//! - `python`: the `pyo3` surface, compiled only with the `python` feature.

pub mod carg;
pub mod symbols;

#[cfg(feature = "python")]
pub mod python;

pub use carg::{format_call, CArray, CallArg, NativeObject, Pointer};
pub use symbols::{libget, NativeLibrary, SymbolTable};
