// In: src/buffer/marshal.rs

//! Conversion of host values into typed buffers for native calls.
//!
//! Both entry points follow the same three steps:
//! 1. Resolve the target dtype (given, or inferred from the input).
//! 2. Produce a contiguous buffer in the requested order. A typed host array
//!    whose dtype and layout already match is viewed in place unless a copy
//!    was requested; everything else is converted element by element.
//! 3. If the caller needs to hand the buffer over (`ownable`), guarantee it
//!    owns its storage, copying a borrowed view if necessary.

use crate::buffer::host::{HostInput, Shaped};
use crate::buffer::typed::{BufferView, OwnedBuffer, TypedBuffer};
use crate::config::{MarshalOptions, Order};
use crate::error::{GrblasError, Result};
use crate::types::dtype::{BOOL, FP64, INT32, INT64};
use crate::types::dtype::DtypeKind;
use crate::types::{lookup_dtype, platform_default_int, Dtype, DtypeSpecifier, HostValue, ScalarValue, ValueClass};

//==================================================================================
// 1. Public API
//==================================================================================

/// Marshals index-like values (row/column indices, counts) into a buffer of `dtype`.
///
/// # Errors
/// - `TypeMismatch` if `values` is a typed host array whose elements are
///   neither integers nor booleans.
/// - `InvalidValueType` / `ValueOutOfRange` if an element cannot be converted.
pub fn marshal_index_buffer<'a, 's>(
    values: impl Into<HostInput<'a>>,
    dtype: impl Into<DtypeSpecifier<'s>>,
    name: &str,
    opts: &MarshalOptions,
) -> Result<TypedBuffer<'a>> {
    let input = values.into();
    let dtype = lookup_dtype(dtype)?;

    if let HostInput::Array(array) = input {
        let integral = array
            .dtype()
            .map_or(false, |dt| dt.is_integer() || dt.is_bool());
        if !integral {
            return Err(GrblasError::TypeMismatch {
                name: name.to_string(),
                found: array.element_type_name().to_string(),
            });
        }
    }

    let buffer = build_buffer(input, dtype, name, opts)?;
    Ok(finish(buffer, name, opts))
}

/// Marshals values into a buffer, inferring the dtype when none is given.
///
/// Returns the buffer together with the dtype it was built with.
///
/// # Errors
/// - `UnknownDtype` if `dtype` does not resolve.
/// - `InvalidValueType` if inference finds generic objects, or an element
///   cannot be converted.
pub fn marshal_value_buffer<'a>(
    values: impl Into<HostInput<'a>>,
    dtype: Option<DtypeSpecifier<'_>>,
    opts: &MarshalOptions,
) -> Result<(TypedBuffer<'a>, &'static Dtype)> {
    let input = values.into();
    let dtype = match dtype {
        Some(spec) => lookup_dtype(spec)?,
        None => infer_value_dtype(input)?,
    };
    let buffer = build_buffer(input, dtype, "values", opts)?;
    Ok((finish(buffer, "values", opts), dtype))
}

/// Infers the dtype a value buffer would get without an explicit dtype.
pub fn infer_value_dtype(input: HostInput<'_>) -> Result<&'static Dtype> {
    match input {
        HostInput::Array(array) => array.dtype().ok_or_else(object_values_error),
        HostInput::Sequence(values) => {
            let inferred = infer_sequence_dtype(values)?;
            Ok(widen_for_portability(inferred.dtype, !inferred.plain_ints))
        }
    }
}

/// Determines `(nrows, ncols)`, filling missing dimensions from the first
/// two-dimensional array in `arrays`.
///
/// # Errors
/// `ShapeUnresolvable`, naming every candidate, if a dimension is missing and no
/// candidate is two-dimensional.
pub fn resolve_shape(
    nrows: Option<u64>,
    ncols: Option<u64>,
    arrays: &[(&str, &dyn Shaped)],
) -> Result<(u64, u64)> {
    if let (Some(nrows), Some(ncols)) = (nrows, ncols) {
        return Ok((nrows, ncols));
    }
    let shape = arrays
        .iter()
        .map(|(_, array)| array.shape())
        .find(|shape| shape.len() == 2)
        .ok_or_else(|| GrblasError::ShapeUnresolvable {
            candidates: arrays.iter().map(|(name, _)| name.to_string()).collect(),
        })?;
    Ok((
        nrows.unwrap_or(shape[0] as u64),
        ncols.unwrap_or(shape[1] as u64),
    ))
}

//==================================================================================
// 2. Private Core Logic
//==================================================================================

fn object_values_error() -> GrblasError {
    GrblasError::InvalidValueType("object dtype for values is not allowed".to_string())
}

/// A dtype inferred for a host sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Inferred {
    dtype: &'static Dtype,
    /// The integer width came from plain host integers rather than typed values.
    plain_ints: bool,
}

/// The dtype the host would pick for a list.
///
/// Typed values promote against each other. Plain values are weak: they only
/// lift the result's class, so a plain float turns typed integers into FP64
/// and a plain integer turns booleans into the platform's default integer.
/// Without typed values any float makes it FP64, all booleans make it BOOL,
/// otherwise the platform's default integer. An empty list is FP64.
fn infer_sequence_dtype(values: &[HostValue]) -> Result<Inferred> {
    let mut typed: Option<DtypeKind> = None;
    let mut saw_int = false;
    let mut saw_float = false;
    for value in values {
        match value {
            HostValue::Typed(v) => {
                let kind = v.kind();
                typed = Some(typed.map_or(kind, |t| t.promote(kind)));
            }
            _ => match value.value_class() {
                Some(ValueClass::Float) => saw_float = true,
                Some(ValueClass::Int) => saw_int = true,
                Some(ValueClass::Bool) => {}
                None => return Err(object_values_error()),
            },
        }
    }
    let plain = |dtype: &'static Dtype| Inferred { dtype, plain_ints: false };
    let class = match typed {
        Some(kind) => kind.value_class(),
        None if values.is_empty() => return Ok(plain(&FP64)),
        None => ValueClass::Bool,
    };
    Ok(match class {
        ValueClass::Float => plain(typed.map_or(&FP64, |k| k.dtype())),
        _ if saw_float => plain(&FP64),
        ValueClass::Int => plain(typed.map_or(&FP64, |k| k.dtype())),
        ValueClass::Bool if saw_int => Inferred {
            dtype: platform_default_int(),
            plain_ints: true,
        },
        ValueClass::Bool => plain(&BOOL),
    })
}

/// Plain host integers default to a 32-bit dtype on some platforms. A width
/// that came from plain integers is widened to INT64 so the same list
/// marshals identically everywhere; typed sources keep their width.
pub(crate) fn widen_for_portability(inferred: &'static Dtype, typed_source: bool) -> &'static Dtype {
    if !typed_source && inferred == &INT32 {
        log::debug!("widening inferred {} values to {}", inferred, INT64.name);
        log_metric!("event" = "widen_platform_int", "from" = inferred.name, "to" = INT64.name);
        return &INT64;
    }
    inferred
}

fn coerce(value: &HostValue, dtype: &'static Dtype, name: &str) -> Result<ScalarValue> {
    let scalar = value.as_scalar().ok_or_else(|| {
        GrblasError::InvalidValueType(format!(
            "{} contains a {} value ({}); expected {} elements",
            name,
            value.type_name(),
            value,
            dtype.np_type
        ))
    })?;
    scalar
        .cast(dtype)
        .ok_or_else(|| GrblasError::ValueOutOfRange {
            name: name.to_string(),
            value: scalar.to_string(),
            dtype: dtype.name.to_string(),
        })
}

fn build_buffer<'a>(
    input: HostInput<'a>,
    dtype: &'static Dtype,
    name: &str,
    opts: &MarshalOptions,
) -> Result<TypedBuffer<'a>> {
    if let HostInput::Array(array) = input {
        if let Some((source, bytes)) = array.typed_bytes() {
            let layout_matches = opts.order == Order::C || array.ndim() <= 1;
            if !opts.copy && layout_matches && source.kind == dtype.kind {
                log::debug!("{}: viewing {} {} elements in place", name, array.len(), dtype);
                let view = BufferView::new(dtype, bytes, opts.order)?;
                return Ok(TypedBuffer::Borrowed(view));
            }
        }
    }

    let mut buffer = OwnedBuffer::with_capacity(dtype, input.len(), opts.order);
    for value in input.values(opts.order)? {
        buffer.push(coerce(&value, dtype, name)?)?;
    }
    Ok(TypedBuffer::Owned(buffer))
}

fn finish<'a>(buffer: TypedBuffer<'a>, name: &str, opts: &MarshalOptions) -> TypedBuffer<'a> {
    if !opts.ownable || buffer.is_owned() {
        return buffer;
    }
    log::debug!(
        "{}: copying {} borrowed elements so the native engine may own them",
        name,
        buffer.len()
    );
    log_metric!("event" = "copy_for_ownership", "name" = name, "len" = buffer.len());
    TypedBuffer::Owned(buffer.into_owned())
}

//==================================================================================
// 3. Unit Tests
//==================================================================================
