// In: src/buffer/host.rs

//! Host-side inputs to the marshaller.
//!
//! A [`HostArray`] plays the role of the host's typed n-dimensional array: a
//! shape plus either aligned elements of one dtype or a list of generic objects.
//! Plain host lists are passed as slices of [`HostValue`].

use arrow::buffer::Buffer;
use ndarray::{ArrayBase, ArrayD, Data, Dimension, IxDyn, RawData};

use crate::config::Order;
use crate::error::{GrblasError, Result};
use crate::types::{Dtype, Element, HostValue, ScalarValue};

/// Anything with an n-dimensional shape.
pub trait Shaped {
    fn shape(&self) -> &[usize];

    fn ndim(&self) -> usize {
        self.shape().len()
    }
}

impl<S: RawData, D: Dimension> Shaped for ArrayBase<S, D> {
    fn shape(&self) -> &[usize] {
        ArrayBase::shape(self)
    }
}

#[derive(Debug, Clone)]
enum HostData {
    Typed { dtype: &'static Dtype, buffer: Buffer },
    Object(Vec<HostValue>),
}

/// A host array: typed elements (or generic objects) with a row-major shape.
#[derive(Debug, Clone)]
pub struct HostArray {
    data: HostData,
    shape: Vec<usize>,
}

impl HostArray {
    /// A one-dimensional typed array.
    pub fn from_vec<T: Element>(values: Vec<T>) -> Self {
        let shape = vec![values.len()];
        Self::typed(values, shape)
    }

    /// A typed array of the given shape, with `values` in row-major order.
    pub fn from_shape_vec<T: Element>(shape: &[usize], values: Vec<T>) -> Result<Self> {
        let expected: usize = shape.iter().product();
        if expected != values.len() {
            return Err(GrblasError::ShapeMismatch {
                shape: shape.to_vec(),
                len: values.len(),
            });
        }
        Ok(Self::typed(values, shape.to_vec()))
    }

    /// Copies an `ndarray` array of any layout, keeping its logical shape.
    pub fn from_ndarray<T, S, D>(array: &ArrayBase<S, D>) -> Self
    where
        T: Element,
        S: Data<Elem = T>,
        D: Dimension,
    {
        let values: Vec<T> = array.iter().copied().collect();
        Self::typed(values, array.shape().to_vec())
    }

    /// A one-dimensional array of generic host objects.
    pub fn objects(values: Vec<HostValue>) -> Self {
        let shape = vec![values.len()];
        Self {
            data: HostData::Object(values),
            shape,
        }
    }

    fn typed<T: Element>(values: Vec<T>, shape: Vec<usize>) -> Self {
        let storage: Vec<T::Storage> = values.into_iter().map(Element::into_storage).collect();
        Self {
            data: HostData::Typed {
                dtype: T::dtype(),
                buffer: Buffer::from_vec(storage),
            },
            shape,
        }
    }

    /// The element dtype, or `None` for an object array.
    pub fn dtype(&self) -> Option<&'static Dtype> {
        match &self.data {
            HostData::Typed { dtype, .. } => Some(*dtype),
            HostData::Object(_) => None,
        }
    }

    /// The host's name for the element type (`"int64"`, `"object"`).
    pub fn element_type_name(&self) -> &'static str {
        self.dtype().map_or("object", |dtype| dtype.np_type)
    }

    pub fn is_object(&self) -> bool {
        matches!(self.data, HostData::Object(_))
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element `index` in row-major order.
    pub fn get(&self, index: usize) -> Option<HostValue> {
        match &self.data {
            HostData::Typed { dtype, buffer } => {
                let start = index.checked_mul(dtype.size)?;
                let bytes = buffer.as_slice().get(start..start.checked_add(dtype.size)?)?;
                ScalarValue::from_ne_bytes(dtype, bytes).map(HostValue::Typed)
            }
            HostData::Object(values) => values.get(index).cloned(),
        }
    }

    /// The raw row-major element bytes of a typed array.
    pub fn typed_bytes(&self) -> Option<(&'static Dtype, &[u8])> {
        match &self.data {
            HostData::Typed { dtype, buffer } => Some((*dtype, buffer.as_slice())),
            HostData::Object(_) => None,
        }
    }

    /// Row-major positions of the elements, listed in `order`.
    pub fn linear_order(&self, order: Order) -> Result<Vec<usize>> {
        let n = self.len();
        if order == Order::C || self.ndim() <= 1 {
            return Ok((0..n).collect());
        }
        let positions = ArrayD::from_shape_vec(IxDyn(&self.shape), (0..n).collect::<Vec<_>>())
            .map_err(|e| GrblasError::InternalError(format!("invalid host array shape: {}", e)))?;
        // Logical iteration of the transpose visits the first axis fastest.
        Ok(positions.t().iter().copied().collect())
    }
}

impl Shaped for HostArray {
    fn shape(&self) -> &[usize] {
        &self.shape
    }
}

/// What the marshaller accepts: a plain host sequence or a typed host array.
#[derive(Debug, Clone, Copy)]
pub enum HostInput<'a> {
    Sequence(&'a [HostValue]),
    Array(&'a HostArray),
}

impl<'a> HostInput<'a> {
    pub fn len(&self) -> usize {
        match self {
            HostInput::Sequence(values) => values.len(),
            HostInput::Array(array) => array.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The elements in the requested order.
    pub fn values(&self, order: Order) -> Result<Vec<HostValue>> {
        match self {
            HostInput::Sequence(values) => Ok(values.to_vec()),
            HostInput::Array(array) => array
                .linear_order(order)?
                .into_iter()
                .map(|i| {
                    array.get(i).ok_or_else(|| {
                        GrblasError::InternalError(format!("host array has no element {}", i))
                    })
                })
                .collect(),
        }
    }
}

impl<'a> From<&'a [HostValue]> for HostInput<'a> {
    fn from(values: &'a [HostValue]) -> Self {
        HostInput::Sequence(values)
    }
}

impl<'a> From<&'a Vec<HostValue>> for HostInput<'a> {
    fn from(values: &'a Vec<HostValue>) -> Self {
        HostInput::Sequence(values.as_slice())
    }
}

impl<'a, const N: usize> From<&'a [HostValue; N]> for HostInput<'a> {
    fn from(values: &'a [HostValue; N]) -> Self {
        HostInput::Sequence(values.as_slice())
    }
}

impl<'a> From<&'a HostArray> for HostInput<'a> {
    fn from(array: &'a HostArray) -> Self {
        HostInput::Array(array)
    }
}
