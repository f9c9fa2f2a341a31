//! An in-memory dataset repository.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use crate::{array::TypedArray, array_subset::ArraySubset};

use super::{DatasetMetadata, DatasetRepository, RepositoryError};

#[derive(Debug)]
struct MemoryDataset {
    array: TypedArray,
    metadata: DatasetMetadata,
}

/// An in-memory dataset repository.
///
/// Datasets are listed in name order.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    datasets: RwLock<BTreeMap<String, MemoryDataset>>,
}

impl MemoryRepository {
    /// Create a new empty memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the dataset `name`, replacing any existing dataset with that name.
    ///
    /// # Errors
    /// Returns [`RepositoryError::InvalidMetadata`] if the number of `axis_names` does not match the dimensionality of `array`.
    pub fn insert(
        &self,
        name: impl Into<String>,
        array: TypedArray,
        axis_names: Option<Vec<char>>,
    ) -> Result<(), RepositoryError> {
        let name = name.into();
        let metadata = DatasetMetadata::new(array.shape(), array.logical_type(), axis_names)
            .map_err(|err| RepositoryError::InvalidMetadata(name.clone(), err))?;
        self.datasets
            .write()
            .insert(name, MemoryDataset { array, metadata });
        Ok(())
    }

    /// Remove the dataset `name`, returning true if it existed.
    pub fn remove(&self, name: &str) -> bool {
        self.datasets.write().remove(name).is_some()
    }
}

impl DatasetRepository for MemoryRepository {
    fn list_entries(&self) -> Result<Vec<String>, RepositoryError> {
        Ok(self.datasets.read().keys().cloned().collect())
    }

    fn metadata(&self, name: &str) -> Result<Option<DatasetMetadata>, RepositoryError> {
        Ok(self
            .datasets
            .read()
            .get(name)
            .map(|dataset| dataset.metadata.clone()))
    }

    fn read_block(
        &self,
        name: &str,
        array_subset: &ArraySubset,
    ) -> Result<TypedArray, RepositoryError> {
        let datasets = self.datasets.read();
        let dataset = datasets
            .get(name)
            .ok_or_else(|| RepositoryError::NotFound(name.to_string()))?;
        Ok(dataset.array.subset(array_subset)?)
    }
}
