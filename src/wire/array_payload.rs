use crate::dtype_registry::{PayloadField, WireStorageType};

/// The flat element sequence of a [`WireArray`](super::WireArray).
///
/// Exactly one payload field is populated, so the payload is a sum over the five field types.
#[derive(Clone, Debug, PartialEq)]
pub enum ArrayPayload {
    /// `data8`.
    Data8(Vec<i8>),
    /// `data16`.
    Data16(Vec<i16>),
    /// `data32`.
    Data32(Vec<i32>),
    /// `data64`.
    Data64(Vec<i64>),
    /// `dataDouble`.
    DataDouble(Vec<f64>),
}

impl ArrayPayload {
    /// Create an empty payload in `field`.
    #[must_use]
    pub const fn new_empty(field: PayloadField) -> Self {
        match field {
            PayloadField::Data8 => Self::Data8(Vec::new()),
            PayloadField::Data16 => Self::Data16(Vec::new()),
            PayloadField::Data32 => Self::Data32(Vec::new()),
            PayloadField::Data64 => Self::Data64(Vec::new()),
            PayloadField::DataDouble => Self::DataDouble(Vec::new()),
        }
    }

    /// Returns the populated payload field.
    #[must_use]
    pub const fn field(&self) -> PayloadField {
        match self {
            Self::Data8(_) => PayloadField::Data8,
            Self::Data16(_) => PayloadField::Data16,
            Self::Data32(_) => PayloadField::Data32,
            Self::Data64(_) => PayloadField::Data64,
            Self::DataDouble(_) => PayloadField::DataDouble,
        }
    }

    /// Returns the number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Data8(elements) => elements.len(),
            Self::Data16(elements) => elements.len(),
            Self::Data32(elements) => elements.len(),
            Self::Data64(elements) => elements.len(),
            Self::DataDouble(elements) => elements.len(),
        }
    }

    /// Returns true if the payload has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the elements if the payload is held in the field for `T`.
    #[must_use]
    pub fn elements<T: WireStorage>(&self) -> Option<&[T]> {
        T::payload_elements(self)
    }
}

/// A trait representing a wire storage type, the element type of a payload field.
pub trait WireStorage: bytemuck::Pod + PartialEq + core::fmt::Debug + Send + Sync {
    /// The wire storage type.
    const STORAGE_TYPE: WireStorageType;

    /// Wrap elements in the payload field for this type.
    fn into_payload(elements: Vec<Self>) -> ArrayPayload;

    /// Borrow the elements of a payload if it is held in the field for this type.
    fn payload_elements(payload: &ArrayPayload) -> Option<&[Self]>;
}

macro_rules! impl_wire_storage {
    ($raw_type:ty, $storage_type:ident, $variant:ident) => {
        impl WireStorage for $raw_type {
            const STORAGE_TYPE: WireStorageType = WireStorageType::$storage_type;

            fn into_payload(elements: Vec<Self>) -> ArrayPayload {
                ArrayPayload::$variant(elements)
            }

            fn payload_elements(payload: &ArrayPayload) -> Option<&[Self]> {
                match payload {
                    ArrayPayload::$variant(elements) => Some(elements),
                    _ => None,
                }
            }
        }
    };
}

impl_wire_storage!(i8, Int8, Data8);
impl_wire_storage!(i16, Int16, Data16);
impl_wire_storage!(i32, Int32, Data32);
impl_wire_storage!(i64, Int64, Data64);
impl_wire_storage!(f64, Float64, DataDouble);
