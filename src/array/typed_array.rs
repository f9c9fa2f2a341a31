use ndarray::{ArrayD, ArrayViewD, IxDyn, ShapeBuilder, Slice};
use thiserror::Error;

use crate::array_subset::{ArraySubset, IncompatibleArraySubsetAndShapeError};

use super::{
    typed_array_apply, with_element_type, ArrayShape, Element, IncompatibleElementTypeError,
    LogicalType,
};

/// An in-memory multidimensional array of a [`LogicalType`].
///
/// Arrays created by this crate use a column-major (Fortran) memory layout, where axis 0 varies fastest.
/// Any layout is accepted as input, element positions are always interpreted by logical index.
#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub enum TypedArray {
    Bool(ArrayD<bool>),
    Int8(ArrayD<i8>),
    Int16(ArrayD<i16>),
    Int32(ArrayD<i32>),
    Int64(ArrayD<i64>),
    UInt8(ArrayD<u8>),
    UInt16(ArrayD<u16>),
    UInt32(ArrayD<u32>),
    UInt64(ArrayD<u64>),
    Float16(ArrayD<half::f16>),
    Float32(ArrayD<f32>),
    Float64(ArrayD<f64>),
}

/// An error creating a [`TypedArray`] from bytes.
#[derive(Debug, Error)]
pub enum TypedArrayBytesError {
    /// The number of bytes does not match the shape and element size.
    #[error("got {0} bytes, expected {1}")]
    InvalidBytesLength(usize, usize),
    /// The shape is too large to address in memory.
    #[error("array shape {0:?} is too large")]
    ShapeTooLarge(ArrayShape),
    /// The bytes hold an element value that is invalid for the logical type.
    #[error("invalid element value for logical type {0}")]
    InvalidElementValue(LogicalType),
}

impl<T: Element> From<ArrayD<T>> for TypedArray {
    fn from(array: ArrayD<T>) -> Self {
        T::into_typed_array(array)
    }
}

impl<T: Element> TryFrom<TypedArray> for ArrayD<T> {
    type Error = IncompatibleElementTypeError;

    fn try_from(array: TypedArray) -> Result<Self, Self::Error> {
        array.into_ndarray()
    }
}

impl TypedArray {
    /// Returns the logical type of the array elements.
    #[must_use]
    pub const fn logical_type(&self) -> LogicalType {
        match self {
            Self::Bool(_) => LogicalType::Bool,
            Self::Int8(_) => LogicalType::Int8,
            Self::Int16(_) => LogicalType::Int16,
            Self::Int32(_) => LogicalType::Int32,
            Self::Int64(_) => LogicalType::Int64,
            Self::UInt8(_) => LogicalType::UInt8,
            Self::UInt16(_) => LogicalType::UInt16,
            Self::UInt32(_) => LogicalType::UInt32,
            Self::UInt64(_) => LogicalType::UInt64,
            Self::Float16(_) => LogicalType::Float16,
            Self::Float32(_) => LogicalType::Float32,
            Self::Float64(_) => LogicalType::Float64,
        }
    }

    /// Returns the shape of the array.
    #[must_use]
    pub fn shape(&self) -> ArrayShape {
        typed_array_apply!(self, array => array.shape().iter().map(|&size| size as u64).collect())
    }

    /// Returns the number of dimensions of the array.
    #[must_use]
    pub fn dimensionality(&self) -> usize {
        typed_array_apply!(self, array => array.ndim())
    }

    /// Returns the number of elements in the array.
    #[must_use]
    pub fn num_elements(&self) -> u64 {
        typed_array_apply!(self, array => array.len() as u64)
    }

    /// Convert into an [`ndarray::ArrayD`] of element type `T`.
    ///
    /// # Errors
    /// Returns [`IncompatibleElementTypeError`] if `T` is not the element type of the array.
    pub fn into_ndarray<T: Element>(self) -> Result<ArrayD<T>, IncompatibleElementTypeError> {
        T::try_from_typed_array(self).map_err(|array| {
            IncompatibleElementTypeError::new(array.logical_type(), T::LOGICAL_TYPE)
        })
    }

    /// Borrow as an [`ndarray::ArrayViewD`] of element type `T`.
    ///
    /// # Errors
    /// Returns [`IncompatibleElementTypeError`] if `T` is not the element type of the array.
    pub fn as_ndarray<T: Element>(
        &self,
    ) -> Result<ArrayViewD<'_, T>, IncompatibleElementTypeError> {
        T::typed_array_view(self).ok_or_else(|| {
            IncompatibleElementTypeError::new(self.logical_type(), T::LOGICAL_TYPE)
        })
    }

    /// Extract an owned copy of the elements within `subset`.
    ///
    /// The output has a column-major layout.
    ///
    /// # Errors
    /// Returns [`IncompatibleArraySubsetAndShapeError`] if `subset` is not within the array.
    pub fn subset(
        &self,
        subset: &ArraySubset,
    ) -> Result<Self, IncompatibleArraySubsetAndShapeError> {
        let shape = self.shape();
        if !subset.inbounds(&shape) {
            return Err(IncompatibleArraySubsetAndShapeError::new(
                subset.clone(),
                shape,
            ));
        }
        let ranges = subset.to_ranges_usize();
        Ok(typed_array_apply!(self, array => {
            let view = array.slice_each_axis(|axis| Slice::from(ranges[axis.axis.index()].clone()));
            to_owned_fortran(&view).into()
        }))
    }

    /// Create an array from native endian bytes in column-major order.
    ///
    /// # Errors
    /// Returns [`TypedArrayBytesError`] if the bytes are incompatible with `logical_type` and `shape`.
    pub fn from_ne_bytes(
        logical_type: LogicalType,
        shape: &[u64],
        bytes: &[u8],
    ) -> Result<Self, TypedArrayBytesError> {
        let shape_usize = shape_to_usize(shape)
            .ok_or_else(|| TypedArrayBytesError::ShapeTooLarge(shape.to_vec()))?;
        let expected_len = shape_usize
            .iter()
            .try_fold(logical_type.size(), |acc, &size| acc.checked_mul(size))
            .ok_or_else(|| TypedArrayBytesError::ShapeTooLarge(shape.to_vec()))?;
        if bytes.len() != expected_len {
            return Err(TypedArrayBytesError::InvalidBytesLength(
                bytes.len(),
                expected_len,
            ));
        }
        with_element_type!(logical_type, T => {
            let elements = T::elements_from_ne_bytes(bytes)
                .ok_or(TypedArrayBytesError::InvalidElementValue(logical_type))?;
            let array = ArrayD::<T>::from_shape_vec(IxDyn(&shape_usize).f(), elements)
                .map_err(|_| TypedArrayBytesError::InvalidBytesLength(bytes.len(), expected_len))?;
            Ok(array.into())
        })
    }

    /// Returns the array elements as native endian bytes in column-major order.
    #[must_use]
    pub fn to_ne_bytes(&self) -> Vec<u8> {
        typed_array_apply!(self, array => to_ne_bytes_fortran(array))
    }
}

/// Convert a shape to `usize`, returning [`None`] if any size does not fit.
pub(crate) fn shape_to_usize(shape: &[u64]) -> Option<Vec<usize>> {
    shape.iter().map(|&size| usize::try_from(size).ok()).collect()
}

fn to_ne_bytes_fortran<T: Element>(array: &ArrayD<T>) -> Vec<u8> {
    // Reversing the axes makes a standard order iteration visit axis 0 fastest.
    let elements: Vec<T> = array.t().iter().copied().collect();
    T::elements_to_ne_bytes(&elements)
}

/// Copy a view into a new array with a column-major layout.
fn to_owned_fortran<T: Element>(view: &ArrayViewD<'_, T>) -> ArrayD<T> {
    let mut array = ArrayD::from_elem(IxDyn(view.shape()).f(), T::default());
    array.assign(view);
    array
}
