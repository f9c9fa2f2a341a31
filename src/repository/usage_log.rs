//! A repository adapter which logs function calls.

use std::{io::Write, sync::Arc};

use itertools::Itertools;
use parking_lot::Mutex;

use crate::{array::TypedArray, array_subset::ArraySubset};

use super::{DatasetMetadata, DatasetRepository, ReadableRepository, RepositoryError};

/// The usage log repository. Logs repository method calls.
///
/// It is intended to aid in debugging and monitoring a [`CutoutService`](crate::cutout::CutoutService) by revealing its repository access patterns.
///
/// ### Example (log to stdout)
/// ```rust
/// # use std::sync::Arc;
/// # use parking_lot::Mutex;
/// # use dvidmsg::repository::{MemoryRepository, UsageLogRepository};
/// let repository = Arc::new(MemoryRepository::new());
/// let log_writer = Arc::new(Mutex::new(
///     // std::io::BufWriter::new(
///     std::io::stdout(),
///     //    )
/// ));
/// let repository = Arc::new(UsageLogRepository::new(repository, log_writer, || {
///     chrono::Utc::now().format("[%T%.3f] ").to_string()
/// }));
/// ```
///
/// Serving cutouts with the above [`UsageLogRepository`] prints outputs like:
/// ```text
/// [23:41:19.885] list_entries() -> [grayscale, segmentation]
/// [23:41:19.885] metadata(grayscale) -> Ok(shape [100, 200, 300] uint8)
/// [23:41:19.886] read_block(grayscale, start [50, 100, 150] shape [50, 100, 150]) -> Ok([50, 100, 150])
/// [23:41:19.887] metadata(missing) -> Ok(None)
/// ```
pub struct UsageLogRepository {
    repository: ReadableRepository,
    handle: Arc<Mutex<dyn Write + Send + Sync>>,
    prefix_func: fn() -> String,
}

impl core::fmt::Debug for UsageLogRepository {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "usage log of {:?}", self.repository)
    }
}

impl UsageLogRepository {
    /// Create a new usage log repository wrapping `repository`.
    pub fn new(
        repository: ReadableRepository,
        handle: Arc<Mutex<dyn Write + Send + Sync>>,
        prefix_func: fn() -> String,
    ) -> Self {
        Self {
            repository,
            handle,
            prefix_func,
        }
    }
}

impl DatasetRepository for UsageLogRepository {
    fn list_entries(&self) -> Result<Vec<String>, RepositoryError> {
        let result = self.repository.list_entries();
        writeln!(
            self.handle.lock(),
            "{}list_entries() -> [{}]",
            (self.prefix_func)(),
            result.as_ref().unwrap_or(&vec![]).iter().format(", ")
        )?;
        result
    }

    fn metadata(&self, name: &str) -> Result<Option<DatasetMetadata>, RepositoryError> {
        let result = self.repository.metadata(name);
        writeln!(
            self.handle.lock(),
            "{}metadata({name}) -> {}",
            (self.prefix_func)(),
            match &result {
                Ok(Some(metadata)) => format!(
                    "Ok(shape {:?} {})",
                    metadata.shape(),
                    metadata.data_type()
                ),
                Ok(None) => "Ok(None)".to_string(),
                Err(err) => format!("Err({err})"),
            }
        )?;
        result
    }

    fn read_block(
        &self,
        name: &str,
        array_subset: &ArraySubset,
    ) -> Result<TypedArray, RepositoryError> {
        let result = self.repository.read_block(name, array_subset);
        writeln!(
            self.handle.lock(),
            "{}read_block({name}, {array_subset}) -> {}",
            (self.prefix_func)(),
            match &result {
                Ok(array) => format!("Ok({:?})", array.shape()),
                Err(err) => format!("Err({err})"),
            }
        )?;
        result
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::super::{test_util, MemoryRepository};
    use super::*;

    #[test]
    fn usage_log() -> Result<(), Box<dyn Error>> {
        let memory = Arc::new(MemoryRepository::new());
        memory.insert(
            "volume",
            test_util::sample_volume().into(),
            Some(vec!['z', 'y', 'x']),
        )?;
        memory.insert("group/plane", test_util::plane(), None)?;

        let log_writer = Arc::new(Mutex::new(Vec::<u8>::new()));
        let repository =
            UsageLogRepository::new(memory, log_writer.clone(), || "[log] ".to_string());
        test_util::repository_list(&repository)?;
        test_util::repository_read(&repository)?;

        let log = String::from_utf8(log_writer.lock().clone())?;
        let lines: Vec<&str> = log.lines().collect();
        assert_eq!(lines[0], "[log] list_entries() -> [group/plane, volume]");
        assert!(lines.contains(&"[log] metadata(volume) -> Ok(shape [4, 3, 2] uint16)"));
        assert!(lines.contains(&"[log] metadata(missing) -> Ok(None)"));
        assert!(lines.contains(
            &"[log] read_block(volume, start [1, 1, 0] shape [2, 1, 2]) -> Ok([2, 1, 2])"
        ));
        assert!(lines.contains(
            &"[log] read_block(missing, start [0, 0, 0] shape [4, 3, 2]) -> Err(dataset missing not found)"
        ));
        assert!(lines.iter().all(|line| line.starts_with("[log] ")));
        Ok(())
    }
}
