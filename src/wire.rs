//! The wire message model.
//!
//! A [`WireArray`] is a self-describing message carrying a [`DatasetDescription`] and an [`ArrayPayload`].
//! The payload is serialised as five fields (`data8`, `data16`, `data32`, `data64`, `dataDouble`), at most one of which is non-empty.
//! Missing fields deserialise as empty.
//!
//! ```json
//! {
//!     "description": {
//!         "bounds": { "start": [0, 0], "stop": [2, 3] },
//!         "axisNames": ["y", "x"],
//!         "datatype": "u16"
//!     },
//!     "data8": [],
//!     "data16": [1, 4, 2, 5, 3, 6],
//!     "data32": [],
//!     "data64": [],
//!     "dataDouble": []
//! }
//! ```
//!
//! `f64` payload elements that are not finite have no JSON representation.

mod array_payload;
mod bounds;
mod dataset_description;

pub use array_payload::{ArrayPayload, WireStorage};
pub use bounds::{Bounds, InvalidBoundsError};
pub use dataset_description::DatasetDescription;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dtype_registry::{self, PayloadField};

/// A wire array message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(into = "WireArrayFields", try_from = "WireArrayFields")]
pub struct WireArray {
    description: DatasetDescription,
    payload: ArrayPayload,
}

impl WireArray {
    /// Create a new wire array.
    ///
    /// The payload is not validated against the description until the message is decoded.
    #[must_use]
    pub const fn new(description: DatasetDescription, payload: ArrayPayload) -> Self {
        Self {
            description,
            payload,
        }
    }

    /// Returns the dataset description.
    #[must_use]
    pub const fn description(&self) -> &DatasetDescription {
        &self.description
    }

    /// Returns the payload.
    #[must_use]
    pub const fn payload(&self) -> &ArrayPayload {
        &self.payload
    }

    /// Replace the axis names of the description.
    #[must_use]
    pub fn with_axis_names(mut self, axis_names: Vec<char>) -> Self {
        self.description = self.description.with_axis_names(axis_names);
        self
    }

    /// Consume the wire array and return its description and payload.
    #[must_use]
    pub fn into_parts(self) -> (DatasetDescription, ArrayPayload) {
        (self.description, self.payload)
    }
}

/// A wire array with more than one non-empty payload field.
#[derive(Clone, Debug, Error)]
#[error("a wire array must have at most one non-empty payload field, got {0:?}")]
pub struct MultiplePayloadFieldsError(Vec<PayloadField>);

impl MultiplePayloadFieldsError {
    /// Returns the non-empty payload fields.
    #[must_use]
    pub fn fields(&self) -> &[PayloadField] {
        &self.0
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireArrayFields {
    description: DatasetDescription,
    #[serde(default)]
    data8: Vec<i8>,
    #[serde(default)]
    data16: Vec<i16>,
    #[serde(default)]
    data32: Vec<i32>,
    #[serde(default)]
    data64: Vec<i64>,
    #[serde(default)]
    data_double: Vec<f64>,
}

impl From<WireArray> for WireArrayFields {
    fn from(wire_array: WireArray) -> Self {
        let mut fields = Self {
            description: wire_array.description,
            data8: Vec::new(),
            data16: Vec::new(),
            data32: Vec::new(),
            data64: Vec::new(),
            data_double: Vec::new(),
        };
        match wire_array.payload {
            ArrayPayload::Data8(elements) => fields.data8 = elements,
            ArrayPayload::Data16(elements) => fields.data16 = elements,
            ArrayPayload::Data32(elements) => fields.data32 = elements,
            ArrayPayload::Data64(elements) => fields.data64 = elements,
            ArrayPayload::DataDouble(elements) => fields.data_double = elements,
        }
        fields
    }
}

impl TryFrom<WireArrayFields> for WireArray {
    type Error = MultiplePayloadFieldsError;

    fn try_from(fields: WireArrayFields) -> Result<Self, Self::Error> {
        let WireArrayFields {
            description,
            data8,
            data16,
            data32,
            data64,
            data_double,
        } = fields;
        let mut payloads = [
            (!data8.is_empty()).then(|| ArrayPayload::Data8(data8)),
            (!data16.is_empty()).then(|| ArrayPayload::Data16(data16)),
            (!data32.is_empty()).then(|| ArrayPayload::Data32(data32)),
            (!data64.is_empty()).then(|| ArrayPayload::Data64(data64)),
            (!data_double.is_empty()).then(|| ArrayPayload::DataDouble(data_double)),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>();

        let payload = match payloads.len() {
            0 => {
                // Empty fields are indistinguishable, so recover the field from the tag
                let field = dtype_registry::by_tag(description.datatype())
                    .map_or(PayloadField::Data8, dtype_registry::DTypeEntry::payload_field);
                ArrayPayload::new_empty(field)
            }
            1 => payloads.remove(0),
            _ => {
                return Err(MultiplePayloadFieldsError(
                    payloads.iter().map(ArrayPayload::field).collect(),
                ))
            }
        };
        Ok(Self {
            description,
            payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn description(datatype: &str, stop: Vec<i64>) -> DatasetDescription {
        let start = vec![0; stop.len()];
        DatasetDescription::new(Bounds::new(start, stop).unwrap(), vec![], datatype)
    }

    #[test]
    fn wire_array_serialize() {
        let wire_array = WireArray::new(
            description("u16", vec![2, 3]),
            ArrayPayload::Data16(vec![1, 4, 2, 5, 3, 6]),
        )
        .with_axis_names(vec!['y', 'x']);
        let json = serde_json::to_string(&wire_array).unwrap();
        assert_eq!(
            json,
            r#"{"description":{"bounds":{"start":[0,0],"stop":[2,3]},"axisNames":["y","x"],"datatype":"u16"},"data8":[],"data16":[1,4,2,5,3,6],"data32":[],"data64":[],"dataDouble":[]}"#
        );
        let wire_array_out: WireArray = serde_json::from_str(&json).unwrap();
        assert_eq!(wire_array_out, wire_array);
    }

    #[test]
    fn wire_array_serialize_double() {
        let wire_array = WireArray::new(
            description("float64", vec![2]),
            ArrayPayload::DataDouble(vec![0.5, -1.25]),
        );
        let json = serde_json::to_string(&wire_array).unwrap();
        assert!(json.contains(r#""dataDouble":[0.5,-1.25]"#));
        assert_eq!(serde_json::from_str::<WireArray>(&json).unwrap(), wire_array);
    }

    #[test]
    fn wire_array_empty_payload_field_from_tag() {
        let json = r#"{"description":{"bounds":{"start":[0],"stop":[0]},"datatype":"float32"}}"#;
        let wire_array: WireArray = serde_json::from_str(json).unwrap();
        assert_eq!(wire_array.payload(), &ArrayPayload::Data32(vec![]));
        assert!(wire_array.description().axis_names().is_empty());

        let json = r#"{"description":{"bounds":{"start":[0],"stop":[0]},"datatype":"c64"}}"#;
        let wire_array: WireArray = serde_json::from_str(json).unwrap();
        assert_eq!(wire_array.payload(), &ArrayPayload::Data8(vec![]));
    }

    #[test]
    fn wire_array_multiple_payload_fields() {
        let json = r#"{"description":{"bounds":{"start":[0],"stop":[1]},"datatype":"i8"},"data8":[1],"data16":[1]}"#;
        let err = serde_json::from_str::<WireArray>(json).unwrap_err();
        assert!(err.to_string().contains("at most one non-empty payload field"));
    }

    #[test]
    fn wire_array_into_parts() {
        let wire_array = WireArray::new(description("i8", vec![1]), ArrayPayload::Data8(vec![-3]));
        let (description_out, payload) = wire_array.into_parts();
        assert_eq!(description_out.datatype(), "i8");
        assert_eq!(payload, ArrayPayload::Data8(vec![-3]));
    }
}
