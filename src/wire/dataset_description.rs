use serde::{Deserialize, Serialize};

use super::Bounds;

/// A description of a dataset or of the region of a dataset carried by a [`WireArray`](super::WireArray).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetDescription {
    bounds: Bounds,
    #[serde(default)]
    axis_names: Vec<char>,
    datatype: String,
}

impl DatasetDescription {
    /// Create a new dataset description.
    #[must_use]
    pub fn new(bounds: Bounds, axis_names: Vec<char>, datatype: impl Into<String>) -> Self {
        Self {
            bounds,
            axis_names,
            datatype: datatype.into(),
        }
    }

    /// Returns the bounds.
    #[must_use]
    pub const fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Returns the axis names, one single-character label per axis.
    ///
    /// May be empty for a description produced by the codec alone.
    #[must_use]
    pub fn axis_names(&self) -> &[char] {
        &self.axis_names
    }

    /// Returns the DType tag.
    #[must_use]
    pub fn datatype(&self) -> &str {
        &self.datatype
    }

    /// Replace the axis names.
    #[must_use]
    pub fn with_axis_names(mut self, axis_names: Vec<char>) -> Self {
        self.axis_names = axis_names;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_description_serde() {
        let description = DatasetDescription::new(
            Bounds::new(vec![0, 0], vec![4, 5]).unwrap(),
            vec!['y', 'x'],
            "u16",
        );
        let json = serde_json::to_string(&description).unwrap();
        assert_eq!(
            json,
            r#"{"bounds":{"start":[0,0],"stop":[4,5]},"axisNames":["y","x"],"datatype":"u16"}"#
        );
        let description_out: DatasetDescription = serde_json::from_str(&json).unwrap();
        assert_eq!(description_out, description);
    }
}
