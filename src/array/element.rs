use ndarray::{ArrayD, ArrayViewD};

use crate::wire::WireStorage;

use super::{LogicalType, TypedArray};

/// A trait representing an array element type.
pub trait Element:
    Copy + Default + PartialEq + core::fmt::Debug + Send + Sync + 'static
{
    /// The logical type of the element.
    const LOGICAL_TYPE: LogicalType;

    /// Wrap an [`ndarray::ArrayD`] of this element type in a [`TypedArray`].
    fn into_typed_array(array: ArrayD<Self>) -> TypedArray;

    /// Unwrap a [`TypedArray`] holding this element type.
    ///
    /// # Errors
    /// Returns the input array if it holds a different element type.
    fn try_from_typed_array(array: TypedArray) -> Result<ArrayD<Self>, TypedArray>;

    /// Borrow a [`TypedArray`] holding this element type as an [`ndarray::ArrayViewD`].
    fn typed_array_view(array: &TypedArray) -> Option<ArrayViewD<'_, Self>>;

    /// Convert native endian bytes into elements.
    ///
    /// Returns [`None`] if the bytes are not a whole number of elements or hold an invalid element value.
    fn elements_from_ne_bytes(bytes: &[u8]) -> Option<Vec<Self>>;

    /// Convert elements into native endian bytes.
    fn elements_to_ne_bytes(elements: &[Self]) -> Vec<u8>;
}

/// A trait representing an element type that can be carried in a wire message.
///
/// [`WireElement::Wire`] is the same-width wire storage type the element bits are reinterpreted as.
/// The reinterpretation is checked at compile time with [`bytemuck::must_cast`].
pub trait WireElement: Element + bytemuck::Pod {
    /// The wire storage type.
    type Wire: WireStorage;
}

impl Element for bool {
    const LOGICAL_TYPE: LogicalType = LogicalType::Bool;

    fn into_typed_array(array: ArrayD<Self>) -> TypedArray {
        TypedArray::Bool(array)
    }

    fn try_from_typed_array(array: TypedArray) -> Result<ArrayD<Self>, TypedArray> {
        match array {
            TypedArray::Bool(array) => Ok(array),
            array => Err(array),
        }
    }

    fn typed_array_view(array: &TypedArray) -> Option<ArrayViewD<'_, Self>> {
        match array {
            TypedArray::Bool(array) => Some(array.view()),
            _ => None,
        }
    }

    fn elements_from_ne_bytes(bytes: &[u8]) -> Option<Vec<Self>> {
        bytes
            .iter()
            .map(|&byte| match byte {
                0 => Some(false),
                1 => Some(true),
                _ => None,
            })
            .collect()
    }

    fn elements_to_ne_bytes(elements: &[Self]) -> Vec<u8> {
        elements.iter().map(|&element| u8::from(element)).collect()
    }
}

macro_rules! impl_element_pod {
    ($raw_type:ty, $variant:ident) => {
        impl Element for $raw_type {
            const LOGICAL_TYPE: LogicalType = LogicalType::$variant;

            fn into_typed_array(array: ArrayD<Self>) -> TypedArray {
                TypedArray::$variant(array)
            }

            fn try_from_typed_array(array: TypedArray) -> Result<ArrayD<Self>, TypedArray> {
                match array {
                    TypedArray::$variant(array) => Ok(array),
                    array => Err(array),
                }
            }

            fn typed_array_view(array: &TypedArray) -> Option<ArrayViewD<'_, Self>> {
                match array {
                    TypedArray::$variant(array) => Some(array.view()),
                    _ => None,
                }
            }

            fn elements_from_ne_bytes(bytes: &[u8]) -> Option<Vec<Self>> {
                (bytes.len() % core::mem::size_of::<Self>() == 0)
                    .then(|| bytemuck::pod_collect_to_vec(bytes))
            }

            fn elements_to_ne_bytes(elements: &[Self]) -> Vec<u8> {
                bytemuck::cast_slice(elements).to_vec()
            }
        }
    };
}

impl_element_pod!(i8, Int8);
impl_element_pod!(i16, Int16);
impl_element_pod!(i32, Int32);
impl_element_pod!(i64, Int64);
impl_element_pod!(u8, UInt8);
impl_element_pod!(u16, UInt16);
impl_element_pod!(u32, UInt32);
impl_element_pod!(u64, UInt64);
impl_element_pod!(half::f16, Float16);
impl_element_pod!(f32, Float32);
impl_element_pod!(f64, Float64);

macro_rules! impl_wire_element {
    ($raw_type:ty, $wire_type:ty) => {
        impl WireElement for $raw_type {
            type Wire = $wire_type;
        }
    };
}

impl_wire_element!(i8, i8);
impl_wire_element!(u8, i8);
impl_wire_element!(i16, i16);
impl_wire_element!(u16, i16);
impl_wire_element!(i32, i32);
impl_wire_element!(u32, i32);
impl_wire_element!(f32, i32);
impl_wire_element!(i64, i64);
impl_wire_element!(u64, i64);
impl_wire_element!(f64, f64);
