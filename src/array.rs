//! Typed multidimensional arrays.
//!
//! A [`TypedArray`] is an in-memory [`ndarray::ArrayD`] of one of the supported [`LogicalType`]s.
//! Arrays follow a column-major (Fortran) axis convention: axis 0 varies fastest in the native memory layout.
//!
//! The [`Element`] trait maps Rust element types to logical types, and [`WireElement`] additionally maps an element type to the same-width wire storage type it is carried as in a [`WireArray`](crate::wire::WireArray).

mod data_type;
mod element;
mod endianness;
mod typed_array;

pub use data_type::{LogicalType, UnknownLogicalTypeError};
pub use element::{Element, WireElement};
pub use endianness::{reverse_endianness, Endianness, NATIVE_ENDIAN};
pub use typed_array::{TypedArray, TypedArrayBytesError};

pub(crate) use typed_array::shape_to_usize;

use thiserror::Error;

/// An ND index to an element in an array.
pub type ArrayIndices = Vec<u64>;

/// The shape of an array.
pub type ArrayShape = Vec<u64>;

/// An incompatible element type error.
#[derive(Copy, Clone, Debug, Error)]
#[error("incompatible element type {0}, expected {1}")]
pub struct IncompatibleElementTypeError(LogicalType, LogicalType);

impl IncompatibleElementTypeError {
    /// Create a new incompatible element type error.
    #[must_use]
    pub const fn new(got: LogicalType, expected: LogicalType) -> Self {
        Self(got, expected)
    }
}

/// Evaluate `$body` with `$array` bound to the [`ndarray::ArrayD`] held by a [`TypedArray`].
macro_rules! typed_array_apply {
    ($typed_array:expr, $array:ident => $body:expr) => {
        match $typed_array {
            $crate::array::TypedArray::Bool($array) => $body,
            $crate::array::TypedArray::Int8($array) => $body,
            $crate::array::TypedArray::Int16($array) => $body,
            $crate::array::TypedArray::Int32($array) => $body,
            $crate::array::TypedArray::Int64($array) => $body,
            $crate::array::TypedArray::UInt8($array) => $body,
            $crate::array::TypedArray::UInt16($array) => $body,
            $crate::array::TypedArray::UInt32($array) => $body,
            $crate::array::TypedArray::UInt64($array) => $body,
            $crate::array::TypedArray::Float16($array) => $body,
            $crate::array::TypedArray::Float32($array) => $body,
            $crate::array::TypedArray::Float64($array) => $body,
        }
    };
}

/// Evaluate `$body` with the type alias `$element` set to the element type of a [`LogicalType`].
macro_rules! with_element_type {
    ($logical_type:expr, $element:ident => $body:expr) => {
        match $logical_type {
            $crate::array::LogicalType::Bool => {
                type $element = bool;
                $body
            }
            $crate::array::LogicalType::Int8 => {
                type $element = i8;
                $body
            }
            $crate::array::LogicalType::Int16 => {
                type $element = i16;
                $body
            }
            $crate::array::LogicalType::Int32 => {
                type $element = i32;
                $body
            }
            $crate::array::LogicalType::Int64 => {
                type $element = i64;
                $body
            }
            $crate::array::LogicalType::UInt8 => {
                type $element = u8;
                $body
            }
            $crate::array::LogicalType::UInt16 => {
                type $element = u16;
                $body
            }
            $crate::array::LogicalType::UInt32 => {
                type $element = u32;
                $body
            }
            $crate::array::LogicalType::UInt64 => {
                type $element = u64;
                $body
            }
            $crate::array::LogicalType::Float16 => {
                type $element = half::f16;
                $body
            }
            $crate::array::LogicalType::Float32 => {
                type $element = f32;
                $body
            }
            $crate::array::LogicalType::Float64 => {
                type $element = f64;
                $body
            }
        }
    };
}

pub(crate) use typed_array_apply;
pub(crate) use with_element_type;
