//! Dataset repositories.
//!
//! A dataset repository holds named multidimensional arrays ("datasets") and serves rectangular blocks of them.
//! It is the storage boundary of the [`CutoutService`](crate::cutout::CutoutService).
//!
//! This module defines the [`DatasetRepository`] trait and includes
//!  - [`MemoryRepository`]: datasets held in memory,
//!  - [`FilesystemRepository`]: datasets stored as raw column-major arrays in a directory tree, and
//!  - [`UsageLogRepository`]: a repository adapter that logs calls to a wrapped repository.
//!
//! Repositories are shared read-only across requests as a [`ReadableRepository`].

mod filesystem;
mod memory;
mod usage_log;

use std::sync::Arc;

use thiserror::Error;

pub use filesystem::{FilesystemRepository, FilesystemRepositoryCreateError};
pub use memory::MemoryRepository;
pub use usage_log::UsageLogRepository;

use crate::{
    array::{ArrayShape, LogicalType, TypedArray, TypedArrayBytesError},
    array_subset::{ArraySubset, IncompatibleArraySubsetAndShapeError},
};

/// [`Arc`] wrapped dataset repository.
pub type ReadableRepository = Arc<dyn DatasetRepository>;

/// The metadata of a dataset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatasetMetadata {
    shape: ArrayShape,
    data_type: LogicalType,
    axis_names: Option<Vec<char>>,
}

impl DatasetMetadata {
    /// Create new dataset metadata.
    ///
    /// # Errors
    /// Returns an error string if the number of `axis_names` does not match the dimensionality of `shape`.
    pub fn new(
        shape: ArrayShape,
        data_type: LogicalType,
        axis_names: Option<Vec<char>>,
    ) -> Result<Self, String> {
        if let Some(axis_names) = &axis_names {
            if axis_names.len() != shape.len() {
                return Err(format!(
                    "{} axis names for {} axes",
                    axis_names.len(),
                    shape.len()
                ));
            }
        }
        Ok(Self {
            shape,
            data_type,
            axis_names,
        })
    }

    /// Returns the shape.
    #[must_use]
    pub fn shape(&self) -> &[u64] {
        &self.shape
    }

    /// Returns the logical type of the elements.
    #[must_use]
    pub const fn data_type(&self) -> LogicalType {
        self.data_type
    }

    /// Returns the stored axis names, if any.
    #[must_use]
    pub fn axis_names(&self) -> Option<&[char]> {
        self.axis_names.as_deref()
    }

    /// Returns the dimensionality.
    #[must_use]
    pub fn dimensionality(&self) -> usize {
        self.shape.len()
    }
}

/// Dataset repository traits.
pub trait DatasetRepository: Send + Sync + core::fmt::Debug {
    /// Returns the names of all datasets in repository-defined order.
    ///
    /// # Errors
    /// Returns a [`RepositoryError`] if there is an underlying error with the repository.
    fn list_entries(&self) -> Result<Vec<String>, RepositoryError>;

    /// Returns the metadata of the dataset `name`, or [`None`] if it does not exist.
    ///
    /// # Errors
    /// Returns a [`RepositoryError`] if there is an underlying error with the repository or the metadata is invalid.
    fn metadata(&self, name: &str) -> Result<Option<DatasetMetadata>, RepositoryError>;

    /// Returns the shape of the dataset `name`, or [`None`] if it does not exist.
    ///
    /// # Errors
    /// Returns a [`RepositoryError`] if there is an underlying error with the repository.
    fn shape_of(&self, name: &str) -> Result<Option<ArrayShape>, RepositoryError> {
        Ok(self.metadata(name)?.map(|metadata| metadata.shape))
    }

    /// Read the elements of the dataset `name` within `array_subset`.
    ///
    /// The output has the shape of `array_subset` and a column-major layout.
    ///
    /// # Errors
    /// Returns a [`RepositoryError`] if
    ///  - the dataset does not exist ([`RepositoryError::NotFound`]),
    ///  - `array_subset` is not within the dataset ([`RepositoryError::IncompatibleSubset`]), or
    ///  - there is an underlying error with the repository.
    fn read_block(
        &self,
        name: &str,
        array_subset: &ArraySubset,
    ) -> Result<TypedArray, RepositoryError>;
}

/// A repository error.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// An IO error.
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    /// Invalid dataset metadata.
    #[error("invalid metadata for dataset {0}: {1}")]
    InvalidMetadata(String, String),
    /// The dataset does not exist.
    #[error("dataset {0} not found")]
    NotFound(String),
    /// The dataset name is not valid.
    #[error("invalid dataset name {0:?}")]
    InvalidDatasetName(String),
    /// The array subset is not within the dataset.
    #[error(transparent)]
    IncompatibleSubset(#[from] IncompatibleArraySubsetAndShapeError),
    /// The stored elements are not valid for the data type of the dataset.
    #[error(transparent)]
    InvalidData(#[from] TypedArrayBytesError),
    /// Any other error.
    #[error("{0}")]
    Other(String),
}

impl From<&str> for RepositoryError {
    fn from(err: &str) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<String> for RepositoryError {
    fn from(err: String) -> Self {
        Self::Other(err)
    }
}
