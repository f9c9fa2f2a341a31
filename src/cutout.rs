//! The cutout service.
//!
//! A [`CutoutService`] is a read-only query surface over a [`DatasetRepository`](crate::repository::DatasetRepository).
//! It lists datasets, describes them, and serves bounded cutouts of them as [`WireArray`] messages.
//!
//! Each call is stateless, and a failed call leaves the service and its repository usable.
//! The service holds no mutable state, so it can serve concurrent requests if the repository supports concurrent reads.
//!
//! Cutouts are materialised in memory.
//! The [cutout element limit](crate::config::Config#cutout-element-limit) bounds the size of a cutout.

use thiserror::Error;

use crate::{
    array::ArrayShape,
    array_subset::{ArraySubset, IncompatibleDimensionalityError},
    codec::{encode_array, CodecError},
    config::global_config,
    dtype_registry::{self, DTypeEntry},
    repository::{DatasetMetadata, ReadableRepository, RepositoryError},
    wire::{Bounds, DatasetDescription, InvalidBoundsError, WireArray},
};

/// A cutout error.
#[derive(Debug, Error)]
pub enum CutoutError {
    /// The dataset does not exist.
    #[error("dataset {0} not found")]
    NotFound(String),
    /// The bounds have `start > stop` on an axis.
    #[error(transparent)]
    InvalidBounds(#[from] InvalidBoundsError),
    /// The bounds exceed the extent of the dataset.
    #[error("bounds {bounds} exceed the shape {shape:?} of dataset {name}")]
    OutOfBounds {
        /// The dataset name.
        name: String,
        /// The requested bounds.
        bounds: Bounds,
        /// The dataset shape.
        shape: ArrayShape,
    },
    /// The bounds and the dataset have a different number of axes.
    #[error(transparent)]
    IncompatibleDimensionality(#[from] IncompatibleDimensionalityError),
    /// The cutout has more elements than the configured limit.
    #[error("cutout of {0} elements exceeds the limit of {1} elements")]
    CutoutTooLarge(u64, u64),
    /// A codec error.
    #[error(transparent)]
    CodecError(#[from] CodecError),
    /// A repository error.
    #[error(transparent)]
    RepositoryError(RepositoryError),
}

impl From<RepositoryError> for CutoutError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(name) => Self::NotFound(name),
            err => Self::RepositoryError(err),
        }
    }
}

/// The cutout service.
#[derive(Debug, Clone)]
pub struct CutoutService {
    repository: ReadableRepository,
}

impl CutoutService {
    /// Create a new cutout service over `repository`.
    #[must_use]
    pub fn new(repository: ReadableRepository) -> Self {
        Self { repository }
    }

    /// Returns the underlying repository.
    #[must_use]
    pub fn repository(&self) -> &ReadableRepository {
        &self.repository
    }

    /// Returns the names of all datasets in repository order.
    ///
    /// # Errors
    /// Returns [`CutoutError::RepositoryError`] if the repository cannot be listed.
    pub fn list_datasets(&self) -> Result<Vec<String>, CutoutError> {
        Ok(self.repository.list_entries()?)
    }

    /// Describe the dataset `name`.
    ///
    /// The bounds start at the origin and stop at the shape of the dataset.
    /// The axis names are the stored axis names of the dataset or, if it has none, the [default axis labels](crate::config::Config#default-axis-labels).
    ///
    /// # Errors
    /// Returns a [`CutoutError`] if
    ///  - the dataset does not exist ([`CutoutError::NotFound`]),
    ///  - the logical type of the dataset is not registered ([`CodecError::UnsupportedDType`]), or
    ///  - there is an underlying error with the repository.
    pub fn get_description(&self, name: &str) -> Result<DatasetDescription, CutoutError> {
        let metadata = self.dataset_metadata(name)?;
        let entry = registry_entry(&metadata)?;
        let bounds = Bounds::new_with_shape(metadata.shape()).ok_or_else(|| {
            RepositoryError::InvalidMetadata(
                name.to_string(),
                format!("shape {:?} exceeds the bounds range", metadata.shape()),
            )
        })?;
        Ok(DatasetDescription::new(
            bounds,
            axis_names(&metadata),
            entry.tag(),
        ))
    }

    /// Fetch the cutout of the dataset `name` within `bounds`.
    ///
    /// The message has the same axis names as the [description](Self::get_description) of the dataset.
    ///
    /// # Errors
    /// Returns a [`CutoutError`] if
    ///  - the dataset does not exist ([`CutoutError::NotFound`]),
    ///  - the dimensionality of `bounds` does not match the dataset ([`CutoutError::IncompatibleDimensionality`]),
    ///  - `start > stop` on any axis ([`CutoutError::InvalidBounds`]),
    ///  - `start < 0` or `stop` exceeds the shape of the dataset on any axis ([`CutoutError::OutOfBounds`]),
    ///  - the cutout exceeds the [cutout element limit](crate::config::Config#cutout-element-limit) ([`CutoutError::CutoutTooLarge`]),
    ///  - the logical type of the dataset is not registered ([`CodecError::UnsupportedDType`]), or
    ///  - there is an underlying error with the repository.
    pub fn get_cutout_block(&self, name: &str, bounds: &Bounds) -> Result<WireArray, CutoutError> {
        let metadata = self.dataset_metadata(name)?;
        if bounds.dimensionality() != metadata.dimensionality() {
            return Err(IncompatibleDimensionalityError::new(
                bounds.dimensionality(),
                metadata.dimensionality(),
            )
            .into());
        }
        let shape = bounds.shape()?;

        let out_of_bounds = || CutoutError::OutOfBounds {
            name: name.to_string(),
            bounds: bounds.clone(),
            shape: metadata.shape().to_vec(),
        };
        let start = bounds
            .start()
            .iter()
            .map(|&start| u64::try_from(start).ok())
            .collect::<Option<Vec<_>>>()
            .ok_or_else(out_of_bounds)?;
        let array_subset = ArraySubset::new_with_start_shape(start, shape)?;
        if !array_subset.inbounds(metadata.shape()) {
            return Err(out_of_bounds());
        }

        let limit = global_config().cutout_element_limit();
        if let Some(limit) = limit {
            let num_elements = array_subset.num_elements();
            if num_elements > limit {
                return Err(CutoutError::CutoutTooLarge(num_elements, limit));
            }
        }

        registry_entry(&metadata)?;
        let array = self.repository.read_block(name, &array_subset)?;
        let wire_array = encode_array(&array, Some(bounds.start()))?;
        Ok(wire_array.with_axis_names(axis_names(&metadata)))
    }

    fn dataset_metadata(&self, name: &str) -> Result<DatasetMetadata, CutoutError> {
        self.repository
            .metadata(name)?
            .ok_or_else(|| CutoutError::NotFound(name.to_string()))
    }
}

fn registry_entry(metadata: &DatasetMetadata) -> Result<&'static DTypeEntry, CutoutError> {
    dtype_registry::by_logical_type(metadata.data_type())
        .map_err(|err| CodecError::from(err).into())
}

fn axis_names(metadata: &DatasetMetadata) -> Vec<char> {
    metadata.axis_names().map_or_else(
        || global_config().axis_labels_for(metadata.dimensionality()),
        <[char]>::to_vec,
    )
}
