//! This module provides a set of shared, low-level utility functions used
//! throughout the crate.
//!
//! Its primary responsibilities include:
//! 1.  Providing safe, validated conversions between raw byte slices and typed slices.
//! 2.  Rendering bounded previews of long buffers for diagnostics.

use crate::error::{GrblasError, Result};

//==================================================================================
// 1. Byte/Typed Slice Conversions
//==================================================================================

/// Safely reinterprets a byte slice as a slice of a plain-old-data type.
///
/// # Errors
/// Returns `GrblasError::PodCast` if the length is not a multiple of the element
/// size or the slice is not suitably aligned for `T`.
pub fn safe_bytes_to_typed_slice<T>(bytes: &[u8]) -> Result<&[T]>
where
    T: bytemuck::Pod,
{
    bytemuck::try_cast_slice(bytes).map_err(GrblasError::from)
}

/// Mutable counterpart of [`safe_bytes_to_typed_slice`].
pub fn safe_bytes_to_typed_slice_mut<T>(bytes: &mut [u8]) -> Result<&mut [T]>
where
    T: bytemuck::Pod,
{
    bytemuck::try_cast_slice_mut(bytes).map_err(GrblasError::from)
}

/// Copies a typed slice into a new byte vector, in native byte order.
pub fn typed_slice_to_bytes<T: bytemuck::Pod>(data: &[T]) -> Vec<u8> {
    bytemuck::cast_slice(data).to_vec()
}

//==================================================================================
// 2. Diagnostics
//==================================================================================

/// Buffers with at least this many elements are truncated in previews.
pub const PREVIEW_THRESHOLD: usize = 20;
/// How many elements are kept from each end of a truncated preview.
pub const PREVIEW_EDGE: usize = 5;

/// Joins `len` rendered items with `", "`, eliding the middle of long sequences:
/// `1, 2, 3, 4, 5, ..., 21, 22, 23, 24, 25`.
pub fn join_preview<F>(len: usize, render: F) -> String
where
    F: Fn(usize) -> String,
{
    let parts: Vec<String> = if len < PREVIEW_THRESHOLD {
        (0..len).map(&render).collect()
    } else {
        (0..PREVIEW_EDGE)
            .map(&render)
            .chain(std::iter::once("...".to_string()))
            .chain((len - PREVIEW_EDGE..len).map(&render))
            .collect()
    };
    parts.join(", ")
}
