//! This file is the root of the `grblas_core` Rust crate.
//!
//! Its responsibilities are strictly limited to:
//! 1.  Declaring the top-level modules of the library (`types`, `buffer`, `ffi`,
//!     `scalar`, ...) and re-exporting their main entry points.
//! 2.  Defining the `#[pymodule]` which acts as the entry point when the compiled
//!     library is imported into Python (`python` feature only).

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
//==================================================================================
// 1. Module Declarations
//==================================================================================
#[macro_use]
mod observability; // Make macros available throughout the crate

#[doc(hidden)]
pub use log as __log;

pub mod buffer;
pub mod config;
pub mod error;
pub mod ffi;
pub mod scalar;
pub mod types;
pub mod utils;

pub use buffer::{
    marshal_index_buffer, marshal_value_buffer, resolve_shape, BufferView, HostArray, HostInput,
    OwnedBuffer, TypedBuffer,
};
pub use config::{MarshalOptions, Order};
pub use error::{GrblasError, Result};
pub use ffi::{format_call, libget, CArray, CallArg, NativeObject, Pointer, SymbolTable};
pub use observability::init_logging;
pub use scalar::{Scalar, ScalarState};
pub use types::{lookup_dtype, Dtype, DtypeSpecifier, HostValue, ScalarValue};

//==================================================================================
// 2. Python Module Definition
//==================================================================================
#[cfg(feature = "python")]
use pyo3::prelude::*;

/// The `grblas_core` Python module.
#[cfg(feature = "python")]
#[pymodule]
fn grblas_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // --- Classes ---
    m.add_class::<ffi::python::PyScalar>()?;

    // --- Functions ---
    m.add_function(wrap_pyfunction!(ffi::python::lookup_dtype_py, m)?)?;
    m.add_function(wrap_pyfunction!(ffi::python::enable_verbose_logging_py, m)?)?;

    // --- Expose the error type raised for marshalling failures ---
    m.add(
        "GrblasError",
        m.py().get_type_bound::<pyo3::exceptions::PyValueError>(),
    )?;

    m.add("__version__", VERSION)?;
    Ok(())
}
