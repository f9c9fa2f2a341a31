//! The array codec.
//!
//! Encodes a [`TypedArray`] and an integer origin into a [`WireArray`], and decodes a [`WireArray`] back into a [`TypedArray`], origin, and axis names.
//!
//! The wire payload is the row-major flatten of the axis-reversed array, so axis 0 varies fastest in the payload.
//! For example, the 2x3 array `[[1, 2, 3], [4, 5, 6]]` is carried as `[1, 4, 2, 5, 3, 6]`.
//!
//! Elements are never numerically converted.
//! Each element is bit-reinterpreted as the same-width wire storage type of its [`DType registry`](crate::dtype_registry) entry with [`bytemuck::must_cast`], which checks the widths at compile time.
//! A `u16` element `65535` is carried as the `i16` bit pattern `-1` and decoded back to `65535`.
//!
//! Encoding leaves the axis names of the message empty, see [`WireArray::with_axis_names`].

use ndarray::{ArrayD, ArrayViewD, IxDyn, ShapeBuilder};
use thiserror::Error;

use crate::{
    array::{
        shape_to_usize, IncompatibleElementTypeError, LogicalType, TypedArray, WireElement,
    },
    array_subset::IncompatibleDimensionalityError,
    dtype_registry::{self, UnknownDTypeError, UnsupportedDTypeError},
    wire::{Bounds, DatasetDescription, InvalidBoundsError, WireArray, WireStorage},
};

/// A codec error.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The logical type of the array has no DType registry entry.
    #[error(transparent)]
    UnsupportedDType(#[from] UnsupportedDTypeError),
    /// The DType tag of the message has no DType registry entry.
    #[error(transparent)]
    UnknownDType(#[from] UnknownDTypeError),
    /// The payload length does not equal the number of elements in the bounds.
    #[error("payload has {got} elements, expected {expected}")]
    ShapeMismatch {
        /// The number of elements in the bounds, saturated at [`u64::MAX`].
        expected: u64,
        /// The payload length.
        got: usize,
    },
    /// Invalid bounds.
    #[error(transparent)]
    InvalidBounds(#[from] InvalidBoundsError),
    /// The origin and the array have a different number of axes.
    #[error(transparent)]
    IncompatibleDimensionality(#[from] IncompatibleDimensionalityError),
    /// The element type requested does not match the DType tag of the message.
    #[error(transparent)]
    IncompatibleElementType(#[from] IncompatibleElementTypeError),
}

/// A decoded array, with its origin and axis names.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedArray<A = TypedArray> {
    array: A,
    origin: Vec<i64>,
    axis_names: Vec<char>,
}

impl<A> DecodedArray<A> {
    /// Returns the array.
    #[must_use]
    pub const fn array(&self) -> &A {
        &self.array
    }

    /// Returns the origin, the start of the bounds of the message.
    #[must_use]
    pub fn origin(&self) -> &[i64] {
        &self.origin
    }

    /// Returns the axis names of the message.
    #[must_use]
    pub fn axis_names(&self) -> &[char] {
        &self.axis_names
    }

    /// Consume the decoded array and return the array, origin, and axis names.
    #[must_use]
    pub fn into_parts(self) -> (A, Vec<i64>, Vec<char>) {
        (self.array, self.origin, self.axis_names)
    }

    fn map<B>(self, f: impl FnOnce(A) -> B) -> DecodedArray<B> {
        DecodedArray {
            array: f(self.array),
            origin: self.origin,
            axis_names: self.axis_names,
        }
    }
}

/// Encode `array` with its first element at `origin` (default all-zero).
///
/// # Errors
/// Returns a [`CodecError`] if
///  - the logical type of `array` is not registered ([`CodecError::UnsupportedDType`]),
///  - the length of `origin` does not match the dimensionality of `array`, or
///  - the stop of the bounds overflows an [`i64`] ([`CodecError::InvalidBounds`]).
pub fn encode_array(array: &TypedArray, origin: Option<&[i64]>) -> Result<WireArray, CodecError> {
    match array {
        TypedArray::Int8(array) => encode_ndarray(&array.view(), origin),
        TypedArray::Int16(array) => encode_ndarray(&array.view(), origin),
        TypedArray::Int32(array) => encode_ndarray(&array.view(), origin),
        TypedArray::Int64(array) => encode_ndarray(&array.view(), origin),
        TypedArray::UInt8(array) => encode_ndarray(&array.view(), origin),
        TypedArray::UInt16(array) => encode_ndarray(&array.view(), origin),
        TypedArray::UInt32(array) => encode_ndarray(&array.view(), origin),
        TypedArray::UInt64(array) => encode_ndarray(&array.view(), origin),
        TypedArray::Float32(array) => encode_ndarray(&array.view(), origin),
        TypedArray::Float64(array) => encode_ndarray(&array.view(), origin),
        TypedArray::Bool(_) | TypedArray::Float16(_) => {
            Err(UnsupportedDTypeError::new(array.logical_type()).into())
        }
    }
}

/// Encode an [`ndarray::ArrayViewD`] with its first element at `origin` (default all-zero).
///
/// # Errors
/// See [`encode_array`].
pub fn encode_ndarray<T: WireElement>(
    array: &ArrayViewD<'_, T>,
    origin: Option<&[i64]>,
) -> Result<WireArray, CodecError> {
    let entry = dtype_registry::by_logical_type(T::LOGICAL_TYPE)?;
    debug_assert_eq!(
        entry.wire_storage_type(),
        <T::Wire as WireStorage>::STORAGE_TYPE
    );

    let bounds = encode_bounds(array.shape(), origin)?;
    let payload = T::Wire::into_payload(flatten_reversed(array));
    Ok(WireArray::new(
        DatasetDescription::new(bounds, Vec::new(), entry.tag()),
        payload,
    ))
}

/// Decode a [`WireArray`].
///
/// # Errors
/// Returns a [`CodecError`] if
///  - the DType tag of the message is not registered ([`CodecError::UnknownDType`]),
///  - `start > stop` on any axis of the bounds ([`CodecError::InvalidBounds`]), or
///  - the length of the payload field of the DType does not equal the number of elements in the bounds ([`CodecError::ShapeMismatch`]).
pub fn decode_array(wire_array: &WireArray) -> Result<DecodedArray, CodecError> {
    let entry = dtype_registry::by_tag(wire_array.description().datatype())?;
    match entry.logical_type() {
        LogicalType::Int8 => decode_typed::<i8>(wire_array),
        LogicalType::Int16 => decode_typed::<i16>(wire_array),
        LogicalType::Int32 => decode_typed::<i32>(wire_array),
        LogicalType::Int64 => decode_typed::<i64>(wire_array),
        LogicalType::UInt8 => decode_typed::<u8>(wire_array),
        LogicalType::UInt16 => decode_typed::<u16>(wire_array),
        LogicalType::UInt32 => decode_typed::<u32>(wire_array),
        LogicalType::UInt64 => decode_typed::<u64>(wire_array),
        LogicalType::Float32 => decode_typed::<f32>(wire_array),
        LogicalType::Float64 => decode_typed::<f64>(wire_array),
        logical_type @ (LogicalType::Bool | LogicalType::Float16) => {
            Err(UnsupportedDTypeError::new(logical_type).into())
        }
    }
}

fn decode_typed<T: WireElement>(wire_array: &WireArray) -> Result<DecodedArray, CodecError> {
    Ok(decode_ndarray::<T>(wire_array)?.map(TypedArray::from))
}

/// Decode a [`WireArray`] into an [`ndarray::ArrayD`] with a column-major layout.
///
/// # Errors
/// Returns [`CodecError::IncompatibleElementType`] if the logical type of the DType tag is not that of `T`.
/// See [`decode_array`] for other errors.
pub fn decode_ndarray<T: WireElement>(
    wire_array: &WireArray,
) -> Result<DecodedArray<ArrayD<T>>, CodecError> {
    let description = wire_array.description();
    let entry = dtype_registry::by_tag(description.datatype())?;
    if entry.logical_type() != T::LOGICAL_TYPE {
        return Err(
            IncompatibleElementTypeError::new(entry.logical_type(), T::LOGICAL_TYPE).into(),
        );
    }
    let shape = description.bounds().shape()?;

    // A payload held in another field cannot match a non-empty shape
    let elements: &[T::Wire] = wire_array.payload().elements::<T::Wire>().unwrap_or_default();
    let array = unflatten_reversed::<T>(&shape, elements)?;
    Ok(DecodedArray {
        array,
        origin: description.bounds().start().to_vec(),
        axis_names: description.axis_names().to_vec(),
    })
}

fn encode_bounds(shape: &[usize], origin: Option<&[i64]>) -> Result<Bounds, CodecError> {
    let start = origin.map_or_else(|| vec![0; shape.len()], <[i64]>::to_vec);
    if start.len() != shape.len() {
        return Err(IncompatibleDimensionalityError::new(start.len(), shape.len()).into());
    }
    let mut overflow_axis = None;
    let stop = std::iter::zip(&start, shape)
        .enumerate()
        .map(|(axis, (&start, &size))| {
            i64::try_from(size)
                .ok()
                .and_then(|size| start.checked_add(size))
                .unwrap_or_else(|| {
                    overflow_axis.get_or_insert(axis);
                    i64::MAX
                })
        })
        .collect::<Vec<_>>();
    let bounds = Bounds::new(start, stop)?;
    match overflow_axis {
        Some(axis) => Err(InvalidBoundsError::new(bounds, axis).into()),
        None => Ok(bounds),
    }
}

/// Flatten the axis-reversed view of `array` in row-major order and reinterpret the elements as wire storage.
fn flatten_reversed<T: WireElement>(array: &ArrayViewD<'_, T>) -> Vec<T::Wire> {
    let reversed = array.view().reversed_axes();
    if let Some(elements) = reversed.as_slice() {
        // column-major input
        bytemuck::must_cast_slice::<T, T::Wire>(elements).to_vec()
    } else {
        reversed
            .iter()
            .map(|&element| bytemuck::must_cast::<T, T::Wire>(element))
            .collect()
    }
}

/// The inverse of [`flatten_reversed`], the output has a column-major layout.
fn unflatten_reversed<T: WireElement>(
    shape: &[u64],
    elements: &[T::Wire],
) -> Result<ArrayD<T>, CodecError> {
    let expected = shape
        .iter()
        .try_fold(1u64, |acc, &size| acc.checked_mul(size))
        .unwrap_or(u64::MAX);
    let shape_mismatch = || CodecError::ShapeMismatch {
        expected,
        got: elements.len(),
    };
    if u64::try_from(elements.len()).ok() != Some(expected) {
        return Err(shape_mismatch());
    }
    let shape = shape_to_usize(shape).ok_or_else(shape_mismatch)?;

    // The row-major order of the axis-reversed destination is its column-major memory order
    let elements = bytemuck::must_cast_slice::<T::Wire, T>(elements).to_vec();
    ArrayD::from_shape_vec(IxDyn(&shape).f(), elements).map_err(|_| shape_mismatch())
}
