// In: src/ffi/python.rs

use num_traits::ToPrimitive;
use pyo3::basic::CompareOp;
use pyo3::exceptions::PyTypeError;
use pyo3::prelude::*;
use pyo3::types::{PyBool, PyFloat, PyLong, PyString, PyType};

use crate::error::GrblasError;
use crate::observability;
use crate::scalar::Scalar;
use crate::types::{lookup_dtype, lookup_type_name, Dtype, HostValue, ScalarValue, ValueClass};

//==================================================================================
// I. Conversions
//==================================================================================

/// Converts a Python object into a host value. Order matters: host array
/// scalars subclass `float` and `bool` is a subclass of `int` in Python.
fn to_host_value(obj: &Bound<'_, PyAny>) -> PyResult<HostValue> {
    if obj.is_none() {
        return Ok(HostValue::None);
    }
    if let Some(value) = typed_host_value(obj)? {
        return Ok(value);
    }
    if obj.is_instance_of::<PyBool>() {
        return Ok(HostValue::Bool(obj.extract()?));
    }
    if obj.is_instance_of::<PyLong>() {
        return Ok(HostValue::Int(obj.extract()?));
    }
    if obj.is_instance_of::<PyFloat>() {
        return Ok(HostValue::Float(obj.extract()?));
    }
    if let Ok(s) = obj.downcast::<PyString>() {
        return Ok(HostValue::Str(s.to_str()?.to_owned()));
    }
    Err(PyTypeError::new_err(format!(
        "unsupported value of type {}",
        obj.get_type().qualname()?
    )))
}

/// Host array scalars (`int8(3)`, `float32(1.5)`) carry their element type in
/// `dtype.name` and stay typed.
fn typed_host_value(obj: &Bound<'_, PyAny>) -> PyResult<Option<HostValue>> {
    if !obj.hasattr("dtype")? || obj.hasattr("__len__")? {
        return Ok(None);
    }
    let name: String = obj.getattr("dtype")?.getattr("name")?.extract()?;
    let dtype = lookup_dtype(name.as_str())?;
    let raw = match dtype.kind.value_class() {
        ValueClass::Bool => ScalarValue::Bool(obj.is_truthy()?),
        ValueClass::Int if dtype.kind.is_unsigned_int() => {
            ScalarValue::UInt64(obj.call_method0("__int__")?.extract()?)
        }
        ValueClass::Int => ScalarValue::Int64(obj.call_method0("__int__")?.extract()?),
        ValueClass::Float => ScalarValue::Fp64(obj.call_method0("__float__")?.extract()?),
    };
    let value = raw.cast(dtype).ok_or_else(|| GrblasError::ValueOutOfRange {
        name: "value".to_string(),
        value: raw.to_string(),
        dtype: dtype.name.to_string(),
    })?;
    Ok(Some(HostValue::Typed(value)))
}

fn scalar_to_py(py: Python<'_>, value: ScalarValue) -> PyObject {
    match value {
        ScalarValue::Bool(b) => b.into_py(py),
        ScalarValue::UInt64(v) => v.into_py(py),
        ScalarValue::Fp32(v) => f64::from(v).into_py(py),
        ScalarValue::Fp64(v) => v.into_py(py),
        other => other.to_i64().into_py(py),
    }
}

/// Accepts a dtype name, a type object (`bool`, `int`, `float`, or a host
/// array scalar class such as `int64`), or anything with a `name` attribute
/// (a host array dtype).
fn resolve_dtype(spec: &Bound<'_, PyAny>) -> PyResult<&'static Dtype> {
    if let Ok(ty) = spec.downcast::<PyType>() {
        let name: String = ty.getattr("__name__")?.extract()?;
        return Ok(lookup_type_name(&name)?);
    }
    if let Ok(s) = spec.downcast::<PyString>() {
        return Ok(lookup_dtype(s.to_str()?)?);
    }
    let name: String = spec.getattr("name")?.extract()?;
    Ok(lookup_dtype(name.as_str())?)
}

//==================================================================================
// II. Scalar
//==================================================================================

#[pyclass(name = "Scalar", module = "grblas_core")]
#[derive(Clone)]
pub struct PyScalar {
    inner: Scalar,
}

#[pymethods]
impl PyScalar {
    /// Creates an empty Scalar of the given dtype.
    #[staticmethod]
    #[pyo3(signature = (dtype, *, name = None))]
    fn new(dtype: &Bound<'_, PyAny>, name: Option<String>) -> PyResult<Self> {
        let mut inner = Scalar::new(resolve_dtype(dtype)?)?;
        if let Some(name) = name {
            inner = inner.with_name(name);
        }
        Ok(Self { inner })
    }

    /// Creates a Scalar holding `value`, inferring its dtype.
    #[staticmethod]
    #[pyo3(signature = (value, *, name = None))]
    fn from_value(value: &Bound<'_, PyAny>, name: Option<String>) -> PyResult<Self> {
        let mut inner = Scalar::from_value(to_host_value(value)?)?;
        if let Some(name) = name {
            inner = inner.with_name(name);
        }
        Ok(Self { inner })
    }

    fn dup(&self) -> Self {
        Self {
            inner: self.inner.dup(),
        }
    }

    fn clear(&mut self) {
        self.inner.clear();
    }

    #[getter]
    fn value(&self, py: Python<'_>) -> PyObject {
        match self.inner.value() {
            Some(value) => scalar_to_py(py, value),
            None => py.None(),
        }
    }

    #[setter]
    fn set_value(&mut self, value: &Bound<'_, PyAny>) -> PyResult<()> {
        self.inner.set(to_host_value(value)?)?;
        Ok(())
    }

    #[getter]
    fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    #[setter]
    fn set_is_empty(&mut self, empty: bool) {
        self.inner.set_empty(empty);
    }

    #[getter]
    fn dtype(&self) -> &'static str {
        self.inner.dtype().name
    }

    #[getter]
    fn name(&self) -> Option<String> {
        self.inner.name().map(str::to_owned)
    }

    fn __richcmp__(&self, other: &Bound<'_, PyAny>, op: CompareOp) -> PyObject {
        let py = other.py();
        let equal = if let Ok(other) = other.downcast::<PyScalar>() {
            self.inner == other.borrow().inner
        } else {
            match to_host_value(other) {
                Ok(value) => self.inner == value,
                Err(_) => return py.NotImplemented(),
            }
        };
        match op {
            CompareOp::Eq => equal.into_py(py),
            CompareOp::Ne => (!equal).into_py(py),
            _ => py.NotImplemented(),
        }
    }

    fn __bool__(&self) -> bool {
        self.inner.is_truthy()
    }

    fn __repr__(&self) -> String {
        self.inner.to_string()
    }
}

//==================================================================================
// III. Module Functions
//==================================================================================

/// Resolves a dtype specifier to its canonical name.
#[pyfunction]
#[pyo3(name = "lookup_dtype")]
pub fn lookup_dtype_py(spec: &Bound<'_, PyAny>) -> PyResult<&'static str> {
    Ok(resolve_dtype(spec)?.name)
}

#[pyfunction]
#[pyo3(name = "enable_verbose_logging", signature = (log_file = None))]
pub fn enable_verbose_logging_py(log_file: Option<String>) -> PyResult<()> {
    observability::init_logging(log_file.as_deref())?;
    Ok(())
}
