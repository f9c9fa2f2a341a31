//! The DType registry.
//!
//! The wire format carries signed integers of four widths and a single floating point type.
//! The registry maps each wire-transmissible [`LogicalType`] to the same-width [`WireStorageType`] its bits are reinterpreted as, the [`PayloadField`] that carries it, and the DType tag that names it in a [`DatasetDescription`](crate::wire::DatasetDescription).
//!
//! | Tag       | Logical type | Wire storage type | Payload field  |
//! |-----------|--------------|-------------------|----------------|
//! | `i8`      | `int8`       | `int8`            | `data8`        |
//! | `u8`      | `uint8`      | `int8`            | `data8`        |
//! | `i16`     | `int16`      | `int16`           | `data16`       |
//! | `u16`     | `uint16`     | `int16`           | `data16`       |
//! | `i32`     | `int32`      | `int32`           | `data32`       |
//! | `u32`     | `uint32`     | `int32`           | `data32`       |
//! | `i64`     | `int64`      | `int64`           | `data64`       |
//! | `u64`     | `uint64`     | `int64`           | `data64`       |
//! | `float32` | `float32`    | `int32`           | `data32`       |
//! | `float64` | `float64`    | `float64`         | `dataDouble`   |
//!
//! The registry is an immutable static table. Lookups never fall back to a default entry.

use derive_more::Display;
use thiserror::Error;

use self::WireStorageType as WST;
use crate::array::LogicalType;

/// A wire storage type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Display)]
pub enum WireStorageType {
    /// `int8`.
    #[display("int8")]
    Int8,
    /// `int16`.
    #[display("int16")]
    Int16,
    /// `int32`.
    #[display("int32")]
    Int32,
    /// `int64`.
    #[display("int64")]
    Int64,
    /// `float64`.
    #[display("float64")]
    Float64,
}

impl WireStorageType {
    /// Returns the size of an element in bytes.
    #[must_use]
    pub const fn size(&self) -> usize {
        match self {
            Self::Int8 => 1,
            Self::Int16 => 2,
            Self::Int32 => 4,
            Self::Int64 | Self::Float64 => 8,
        }
    }

    /// Returns the payload field that carries elements of this wire storage type.
    #[must_use]
    pub const fn payload_field(&self) -> PayloadField {
        match self {
            Self::Int8 => PayloadField::Data8,
            Self::Int16 => PayloadField::Data16,
            Self::Int32 => PayloadField::Data32,
            Self::Int64 => PayloadField::Data64,
            Self::Float64 => PayloadField::DataDouble,
        }
    }
}

/// A wire message payload field.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Display)]
pub enum PayloadField {
    /// `data8`.
    #[display("data8")]
    Data8,
    /// `data16`.
    #[display("data16")]
    Data16,
    /// `data32`.
    #[display("data32")]
    Data32,
    /// `data64`.
    #[display("data64")]
    Data64,
    /// `dataDouble`.
    #[display("dataDouble")]
    DataDouble,
}

/// A DType registry entry.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DTypeEntry {
    tag: &'static str,
    wire_storage_type: WireStorageType,
    logical_type: LogicalType,
    payload_field: PayloadField,
}

impl DTypeEntry {
    const fn new(
        tag: &'static str,
        wire_storage_type: WireStorageType,
        logical_type: LogicalType,
    ) -> Self {
        Self {
            tag,
            wire_storage_type,
            logical_type,
            payload_field: wire_storage_type.payload_field(),
        }
    }

    /// Returns the DType tag.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        self.tag
    }

    /// Returns the wire storage type.
    #[must_use]
    pub const fn wire_storage_type(&self) -> WireStorageType {
        self.wire_storage_type
    }

    /// Returns the logical type.
    #[must_use]
    pub const fn logical_type(&self) -> LogicalType {
        self.logical_type
    }

    /// Returns the payload field.
    #[must_use]
    pub const fn payload_field(&self) -> PayloadField {
        self.payload_field
    }
}

/// An unknown DType tag error.
#[derive(Clone, Debug, Error)]
#[error("unknown dtype tag {0:?}")]
pub struct UnknownDTypeError(String);

impl UnknownDTypeError {
    /// Create a new unknown DType tag error.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Returns the unknown tag.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.0
    }
}

/// An unsupported DType error, the logical type has no registry entry.
#[derive(Copy, Clone, Debug, Error)]
#[error("logical type {0} is not supported by the wire format")]
pub struct UnsupportedDTypeError(LogicalType);

impl UnsupportedDTypeError {
    /// Create a new unsupported DType error.
    #[must_use]
    pub const fn new(logical_type: LogicalType) -> Self {
        Self(logical_type)
    }

    /// Returns the unsupported logical type.
    #[must_use]
    pub const fn logical_type(&self) -> LogicalType {
        self.0
    }
}

const ENTRIES: [DTypeEntry; 10] = [
    DTypeEntry::new("i8", WST::Int8, LogicalType::Int8),
    DTypeEntry::new("u8", WST::Int8, LogicalType::UInt8),
    DTypeEntry::new("i16", WST::Int16, LogicalType::Int16),
    DTypeEntry::new("u16", WST::Int16, LogicalType::UInt16),
    DTypeEntry::new("i32", WST::Int32, LogicalType::Int32),
    DTypeEntry::new("u32", WST::Int32, LogicalType::UInt32),
    DTypeEntry::new("i64", WST::Int64, LogicalType::Int64),
    DTypeEntry::new("u64", WST::Int64, LogicalType::UInt64),
    DTypeEntry::new("float32", WST::Int32, LogicalType::Float32),
    DTypeEntry::new("float64", WST::Float64, LogicalType::Float64),
];

// Bit reinterpretation must be lossless.
const _: () = {
    let mut i = 0;
    while i < ENTRIES.len() {
        let entry = &ENTRIES[i];
        assert!(entry.wire_storage_type.size() == entry.logical_type.size());
        i += 1;
    }
};

static DTYPE_ENTRIES: [DTypeEntry; 10] = ENTRIES;

/// Returns every registry entry.
#[must_use]
pub fn entries() -> &'static [DTypeEntry] {
    &DTYPE_ENTRIES
}

/// Look up a registry entry by DType tag.
///
/// # Errors
/// Returns [`UnknownDTypeError`] if `tag` is not registered.
pub fn by_tag(tag: &str) -> Result<&'static DTypeEntry, UnknownDTypeError> {
    let index = match tag {
        "i8" => 0,
        "u8" => 1,
        "i16" => 2,
        "u16" => 3,
        "i32" => 4,
        "u32" => 5,
        "i64" => 6,
        "u64" => 7,
        "float32" => 8,
        "float64" => 9,
        _ => return Err(UnknownDTypeError::new(tag)),
    };
    Ok(&DTYPE_ENTRIES[index])
}

/// Look up a registry entry by logical type.
///
/// # Errors
/// Returns [`UnsupportedDTypeError`] if `logical_type` is not registered.
pub fn by_logical_type(
    logical_type: LogicalType,
) -> Result<&'static DTypeEntry, UnsupportedDTypeError> {
    let index = match logical_type {
        LogicalType::Int8 => 0,
        LogicalType::UInt8 => 1,
        LogicalType::Int16 => 2,
        LogicalType::UInt16 => 3,
        LogicalType::Int32 => 4,
        LogicalType::UInt32 => 5,
        LogicalType::Int64 => 6,
        LogicalType::UInt64 => 7,
        LogicalType::Float32 => 8,
        LogicalType::Float64 => 9,
        LogicalType::Bool | LogicalType::Float16 => {
            return Err(UnsupportedDTypeError::new(logical_type))
        }
    };
    Ok(&DTYPE_ENTRIES[index])
}

#[cfg(test)]
mod tests {
    use crate::array::{Element, WireElement};
    use crate::wire::WireStorage;

    use super::*;

    #[test]
    fn dtype_registry_lookups_agree() {
        for entry in entries() {
            assert_eq!(by_tag(entry.tag()).unwrap(), entry);
            assert_eq!(by_logical_type(entry.logical_type()).unwrap(), entry);
            assert_eq!(entry.wire_storage_type().size(), entry.logical_type().size());
            assert_eq!(entry.payload_field(), entry.wire_storage_type().payload_field());
        }
    }

    #[test]
    fn dtype_registry_lookup_failures() {
        let err = by_tag("complex64").unwrap_err();
        assert_eq!(err.tag(), "complex64");
        assert!(by_tag("uint16").is_err());
        assert!(by_tag("").is_err());
        assert_eq!(
            by_logical_type(LogicalType::Bool).unwrap_err().logical_type(),
            LogicalType::Bool
        );
        assert!(by_logical_type(LogicalType::Float16).is_err());
    }

    #[test]
    fn dtype_registry_float_and_unsigned_substitution() {
        let entry = by_logical_type(LogicalType::Float32).unwrap();
        assert_eq!(entry.wire_storage_type(), WireStorageType::Int32);
        assert_eq!(entry.payload_field(), PayloadField::Data32);
        let entry = by_logical_type(LogicalType::UInt16).unwrap();
        assert_eq!(entry.wire_storage_type(), WireStorageType::Int16);
        let entry = by_logical_type(LogicalType::Float64).unwrap();
        assert_eq!(entry.wire_storage_type(), WireStorageType::Float64);
        assert_eq!(entry.payload_field(), PayloadField::DataDouble);
    }

    fn wire_element_matches_registry<T: WireElement>() {
        let entry = by_logical_type(T::LOGICAL_TYPE).unwrap();
        assert_eq!(
            <T::Wire as WireStorage>::STORAGE_TYPE,
            entry.wire_storage_type()
        );
        assert_eq!(<T as Element>::LOGICAL_TYPE, entry.logical_type());
    }

    #[test]
    fn dtype_registry_wire_elements() {
        wire_element_matches_registry::<i8>();
        wire_element_matches_registry::<u8>();
        wire_element_matches_registry::<i16>();
        wire_element_matches_registry::<u16>();
        wire_element_matches_registry::<i32>();
        wire_element_matches_registry::<u32>();
        wire_element_matches_registry::<i64>();
        wire_element_matches_registry::<u64>();
        wire_element_matches_registry::<f32>();
        wire_element_matches_registry::<f64>();
    }
}
