//! A filesystem dataset repository.

use std::{
    collections::HashMap,
    fs::File,
    io::{Read, Seek, SeekFrom},
    path::{Component, Path, PathBuf},
    sync::Arc,
};

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use walkdir::WalkDir;

use crate::{
    array::{reverse_endianness, Endianness, LogicalType, TypedArray},
    array_subset::ArraySubset,
    config::global_config,
};

use super::{DatasetMetadata, DatasetRepository, RepositoryError};

const METADATA_FILE: &str = "dataset.json";
const DATA_FILE: &str = "data";

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct DatasetMetadataFile {
    shape: Vec<u64>,
    data_type: LogicalType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    axis_names: Option<String>,
}

/// A filesystem dataset repository.
///
/// Every directory below the base path holding a `dataset.json` metadata file and a `data` file is a dataset.
/// The dataset name is the path of the directory relative to the base path with `/` separators, e.g. `group/volume`.
///
/// The metadata file holds the shape, logical type, and optional axis names of the dataset:
/// ```json
/// {
///     "shape": [100, 200, 300],
///     "data_type": "uint16",
///     "axis_names": "zyx"
/// }
/// ```
/// The data file holds the elements in column-major order as little endian bytes.
/// Blocks are read with a seek and read per contiguous run of elements, the remainder of the data file is not read.
#[derive(Debug)]
pub struct FilesystemRepository {
    base_path: PathBuf,
    sort: bool,
    datasets: Mutex<HashMap<String, Arc<RwLock<()>>>>,
}

impl FilesystemRepository {
    /// Create a new filesystem repository at `base_path`, creating the directory if it does not exist.
    ///
    /// Listings are sorted if the [sort listings](crate::config::Config#sort-listings) configuration is enabled.
    ///
    /// # Errors
    /// Returns a [`FilesystemRepositoryCreateError`] if `base_path`:
    ///   - is not valid,
    ///   - points to an existing file rather than a directory, or
    ///   - cannot be created.
    pub fn new<P: AsRef<Path>>(base_path: P) -> Result<Self, FilesystemRepositoryCreateError> {
        let base_path = base_path.as_ref().to_path_buf();
        if base_path.to_str().is_none() || base_path.is_file() {
            return Err(FilesystemRepositoryCreateError::InvalidBasePath(base_path));
        }
        std::fs::create_dir_all(&base_path)?;

        Ok(Self {
            base_path,
            sort: global_config().sort_listings(),
            datasets: Mutex::default(),
        })
    }

    /// Set whether listings are sorted.
    #[must_use]
    pub const fn sorted(mut self, sort: bool) -> Self {
        self.sort = sort;
        self
    }

    /// Returns the base path.
    #[must_use]
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Maps a dataset name to a filesystem [`PathBuf`].
    ///
    /// Returns [`None`] if the name is empty or has an empty, `.` or `..` component.
    #[must_use]
    pub fn name_to_fspath(&self, name: &str) -> Option<PathBuf> {
        let mut path = self.base_path.clone();
        for component in name.split('/') {
            if component.is_empty()
                || component == "."
                || component == ".."
                || component.contains('\\')
            {
                return None;
            }
            path.push(component);
        }
        Some(path)
    }

    /// Maps a filesystem dataset directory to a dataset name.
    fn fspath_to_name(&self, path: &Path) -> Option<String> {
        let path = pathdiff::diff_paths(path, &self.base_path)?;
        let components = path
            .components()
            .map(|component| match component {
                Component::Normal(component) => component.to_str(),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()?;
        (!components.is_empty()).then(|| components.join("/"))
    }

    fn get_dataset_lock(&self, name: &str) -> Arc<RwLock<()>> {
        self.datasets
            .lock()
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(RwLock::default()))
            .clone()
    }

    /// Returns the lock of the dataset `name`, or [`None`] if it has no metadata file.
    ///
    /// Absent names get no lock entry.
    fn get_existing_dataset_lock(&self, name: &str) -> Option<Arc<RwLock<()>>> {
        if let Some(dataset) = self.datasets.lock().get(name) {
            return Some(dataset.clone());
        }
        let path = self.name_to_fspath(name)?;
        path.join(METADATA_FILE)
            .is_file()
            .then(|| self.get_dataset_lock(name))
    }

    fn read_metadata(
        &self,
        name: &str,
    ) -> Result<Option<(PathBuf, DatasetMetadata)>, RepositoryError> {
        let Some(path) = self.name_to_fspath(name) else {
            return Ok(None);
        };
        // A name running through a file is absent, not an IO error
        if !path.is_dir() {
            return Ok(None);
        }
        let metadata_file = match std::fs::read(path.join(METADATA_FILE)) {
            Ok(metadata_file) => metadata_file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let invalid = |reason: String| RepositoryError::InvalidMetadata(name.to_string(), reason);
        let DatasetMetadataFile {
            shape,
            data_type,
            axis_names,
        } = serde_json::from_slice(&metadata_file).map_err(|err| invalid(err.to_string()))?;
        let metadata = DatasetMetadata::new(
            shape,
            data_type,
            axis_names.map(|axis_names| axis_names.chars().collect()),
        )
        .map_err(invalid)?;

        // Validate the data file length against the metadata
        let expected_len = metadata
            .shape()
            .iter()
            .try_fold(data_type.size() as u64, |acc, &size| acc.checked_mul(size))
            .ok_or_else(|| invalid(format!("shape {:?} is too large", metadata.shape())))?;
        let len = match std::fs::metadata(path.join(DATA_FILE)) {
            Ok(data_file) => data_file.len(),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(invalid("missing data file".to_string()))
            }
            Err(err) => return Err(err.into()),
        };
        if len != expected_len {
            return Err(invalid(format!(
                "data file has {len} bytes, expected {expected_len}"
            )));
        }

        Ok(Some((path, metadata)))
    }

    /// Create the dataset `name` holding `array`, replacing any existing dataset with that name.
    ///
    /// # Errors
    /// Returns a [`RepositoryError`] if
    ///  - `name` is not a valid dataset name,
    ///  - the number of `axis_names` does not match the dimensionality of `array`, or
    ///  - there is an IO error.
    pub fn create_dataset(
        &self,
        name: &str,
        array: &TypedArray,
        axis_names: Option<Vec<char>>,
    ) -> Result<(), RepositoryError> {
        let path = self
            .name_to_fspath(name)
            .ok_or_else(|| RepositoryError::InvalidDatasetName(name.to_string()))?;
        let metadata = DatasetMetadataFile {
            shape: array.shape(),
            data_type: array.logical_type(),
            axis_names: axis_names.map(String::from_iter),
        };
        if let Some(axis_names) = &metadata.axis_names {
            if axis_names.chars().count() != metadata.shape.len() {
                return Err(RepositoryError::InvalidMetadata(
                    name.to_string(),
                    format!(
                        "{} axis names for {} axes",
                        axis_names.chars().count(),
                        metadata.shape.len()
                    ),
                ));
            }
        }
        let metadata_file = serde_json::to_vec_pretty(&metadata)
            .map_err(|err| RepositoryError::Other(err.to_string()))?;

        let mut bytes = array.to_ne_bytes();
        if !Endianness::Little.is_native() {
            reverse_endianness(&mut bytes, array.logical_type().size());
        }

        let dataset = self.get_dataset_lock(name);
        let _lock = dataset.write();
        std::fs::create_dir_all(&path)?;
        // Data first, a dataset is listed once its metadata file exists
        std::fs::write(path.join(DATA_FILE), bytes)?;
        std::fs::write(path.join(METADATA_FILE), metadata_file)?;
        Ok(())
    }
}

impl DatasetRepository for FilesystemRepository {
    fn list_entries(&self) -> Result<Vec<String>, RepositoryError> {
        let mut names = Vec::new();
        for entry in WalkDir::new(&self.base_path).min_depth(2) {
            let entry = entry.map_err(std::io::Error::from)?;
            if entry.file_type().is_file() && entry.file_name() == METADATA_FILE {
                if let Some(name) = entry
                    .path()
                    .parent()
                    .and_then(|path| self.fspath_to_name(path))
                {
                    names.push(name);
                }
            }
        }
        if self.sort {
            names.sort();
        }
        Ok(names)
    }

    fn metadata(&self, name: &str) -> Result<Option<DatasetMetadata>, RepositoryError> {
        let Some(dataset) = self.get_existing_dataset_lock(name) else {
            return Ok(None);
        };
        let _lock = dataset.read();
        Ok(self.read_metadata(name)?.map(|(_, metadata)| metadata))
    }

    fn read_block(
        &self,
        name: &str,
        array_subset: &ArraySubset,
    ) -> Result<TypedArray, RepositoryError> {
        let dataset = self
            .get_existing_dataset_lock(name)
            .ok_or_else(|| RepositoryError::NotFound(name.to_string()))?;
        let _lock = dataset.read();

        let (path, metadata) = self
            .read_metadata(name)?
            .ok_or_else(|| RepositoryError::NotFound(name.to_string()))?;
        let element_size = metadata.data_type().size();
        let runs = array_subset.contiguous_runs_fortran(metadata.shape())?;

        // The subset is within the validated data file, so its length fits in a u64
        let num_bytes = usize::try_from(array_subset.num_elements() * element_size as u64)
            .map_err(|_| {
                RepositoryError::Other(format!("array subset {array_subset} is too large"))
            })?;
        let mut bytes = vec![0; num_bytes];
        if num_bytes > 0 {
            let run_bytes = num_bytes / runs.len();
            let mut file = File::open(path.join(DATA_FILE))?;
            for ((start, _), buffer) in std::iter::zip(runs, bytes.chunks_exact_mut(run_bytes)) {
                file.seek(SeekFrom::Start(start * element_size as u64))?;
                file.read_exact(buffer)?;
            }
        }
        if !Endianness::Little.is_native() {
            reverse_endianness(&mut bytes, element_size);
        }

        Ok(TypedArray::from_ne_bytes(
            metadata.data_type(),
            array_subset.shape(),
            &bytes,
        )?)
    }
}

/// A filesystem repository creation error.
#[derive(Debug, Error)]
pub enum FilesystemRepositoryCreateError {
    /// An IO error.
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    /// The path is not valid on this system.
    #[error("base path {0} is not valid")]
    InvalidBasePath(PathBuf),
}
