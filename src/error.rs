// In: src/error.rs

//! This module defines the single, unified error type for the grblas native boundary.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.
//!
//! Every error is raised synchronously at the point of detection. Nothing in this
//! layer retries or substitutes defaults, so each variant names the offending
//! argument and what was expected of it.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T, E = GrblasError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum GrblasError {
    // =========================================================================
    // === Marshalling Errors
    // =========================================================================
    #[error("Unknown dtype: {0}")]
    UnknownDtype(String),

    #[error("{name} must be integers, not {found}")]
    TypeMismatch { name: String, found: String },

    #[error("{0}")]
    InvalidValueType(String),

    #[error(
        "Either nrows and ncols must be provided, or one of the following arrays \
         must be 2d (from which to get nrows and ncols): {}",
        .candidates.join(", ")
    )]
    ShapeUnresolvable { candidates: Vec<String> },

    #[error("cannot assign {value} to a Scalar of dtype {dtype}")]
    ScalarTypeError { value: String, dtype: String },

    #[error("{name}: value {value} is out of range for dtype {dtype}")]
    ValueOutOfRange {
        name: String,
        value: String,
        dtype: String,
    },

    #[error("cannot reshape {len} elements into shape {shape:?}")]
    ShapeMismatch { shape: Vec<usize>, len: usize },

    // =========================================================================
    // === Native Library Errors
    // =========================================================================
    #[error("native symbol '{name}' could not be resolved: {reason}")]
    SymbolLookup { name: String, reason: String },

    // =========================================================================
    // === External Error Wrappers
    // =========================================================================
    /// An error from the Serde JSON library, typically while loading options.
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// An error from the underlying I/O subsystem (e.g. opening a log file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error from a safe byte-casting operation failing.
    #[error("Byte slice casting error: {0}")]
    PodCast(String), // bytemuck::PodCastError doesn't impl Error

    /// An error raised while crossing into or out of the Python interpreter.
    #[error("FFI operation failed: {0}")]
    FfiError(String),

    #[error("Internal logic error (this is a bug): {0}")]
    InternalError(String),
}

// =============================================================================
// === Manual `From` Implementations ===
// =============================================================================

impl From<bytemuck::PodCastError> for GrblasError {
    fn from(err: bytemuck::PodCastError) -> Self {
        GrblasError::PodCast(err.to_string())
    }
}

#[cfg(feature = "python")]
impl From<pyo3::PyErr> for GrblasError {
    fn from(err: pyo3::PyErr) -> Self {
        GrblasError::FfiError(err.to_string())
    }
}

#[cfg(feature = "python")]
impl From<GrblasError> for pyo3::PyErr {
    fn from(err: GrblasError) -> pyo3::PyErr {
        match err {
            GrblasError::ScalarTypeError { .. } | GrblasError::TypeMismatch { .. } => {
                pyo3::exceptions::PyTypeError::new_err(err.to_string())
            }
            _ => pyo3::exceptions::PyValueError::new_err(err.to_string()),
        }
    }
}
