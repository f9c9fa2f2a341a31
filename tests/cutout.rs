use std::{error::Error, sync::Arc};

use dvidmsg::{
    array::TypedArray,
    array_subset::ArraySubset,
    codec::{decode_array, decode_ndarray},
    cutout::{CutoutError, CutoutService},
    repository::{
        DatasetRepository, FilesystemRepository, MemoryRepository, ReadableRepository,
        UsageLogRepository,
    },
    wire::{Bounds, WireArray},
};
use ndarray::{ArrayD, Ix3, IxDyn};
use parking_lot::Mutex;
use rayon::prelude::*;

fn grayscale() -> ArrayD<u8> {
    ArrayD::from_shape_fn(IxDyn(&[10, 20, 30]), |index| {
        u8::try_from((index[0] * 31 + index[1] * 7 + index[2]) % 256).unwrap()
    })
}

fn segmentation() -> ArrayD<u64> {
    ArrayD::from_shape_fn(IxDyn(&[10, 20, 30]), |index| {
        u64::MAX - (index[0] * 600 + index[1] * 30 + index[2]) as u64
    })
}

fn probabilities() -> ArrayD<f32> {
    ArrayD::from_shape_fn(IxDyn(&[7, 5]), |index| index[0] as f32 / 7.0 - index[1] as f32)
}

fn datasets() -> Vec<(&'static str, TypedArray, Option<Vec<char>>)> {
    vec![
        ("grayscale", grayscale().into(), Some(vec!['z', 'y', 'x'])),
        ("segmentation", segmentation().into(), Some(vec!['z', 'y', 'x'])),
        ("predictions/probabilities", probabilities().into(), None),
    ]
}

fn memory_repository() -> Result<ReadableRepository, Box<dyn Error>> {
    let repository = MemoryRepository::new();
    for (name, array, axis_names) in datasets() {
        repository.insert(name, array, axis_names)?;
    }
    Ok(Arc::new(repository))
}

fn filesystem_repository(path: &std::path::Path) -> Result<ReadableRepository, Box<dyn Error>> {
    let repository = FilesystemRepository::new(path)?.sorted(true);
    for (name, array, axis_names) in datasets() {
        repository.create_dataset(name, &array, axis_names)?;
    }
    Ok(Arc::new(repository))
}

/// Fetch the upper half of every dataset and compare it with a direct read.
fn client_flow(service: &CutoutService) -> Result<(), Box<dyn Error>> {
    let names = service.list_datasets()?;
    assert_eq!(
        names,
        vec!["grayscale", "predictions/probabilities", "segmentation"]
    );

    for name in &names {
        let description = service.get_description(name)?;
        let stop = description.bounds().stop().to_vec();
        let start: Vec<i64> = stop.iter().map(|stop| stop / 2).collect();
        let bounds = Bounds::new(start.clone(), stop.clone())?;

        let message = service.get_cutout_block(name, &bounds)?;
        assert_eq!(message.description().bounds(), &bounds);
        assert_eq!(message.description().axis_names(), description.axis_names());
        assert_eq!(message.description().datatype(), description.datatype());

        let json = serde_json::to_string(&message)?;
        let decoded = decode_array(&serde_json::from_str::<WireArray>(&json)?)?;
        assert_eq!(decoded.origin(), start.as_slice());

        let subset = ArraySubset::new_with_ranges(
            &start
                .iter()
                .zip(&stop)
                .map(|(&start, &stop)| start as u64..stop as u64)
                .collect::<Vec<_>>(),
        );
        let expected = service.repository().read_block(name, &subset)?;
        assert_eq!(decoded.array(), &expected);
    }
    Ok(())
}

#[test]
fn cutout_client_flow_memory() -> Result<(), Box<dyn Error>> {
    client_flow(&CutoutService::new(memory_repository()?))
}

#[test]
#[cfg_attr(miri, ignore)]
fn cutout_client_flow_filesystem() -> Result<(), Box<dyn Error>> {
    let path = tempfile::TempDir::new()?;
    client_flow(&CutoutService::new(filesystem_repository(path.path())?))
}

#[test]
#[cfg_attr(miri, ignore)]
fn cutout_memory_and_filesystem_agree() -> Result<(), Box<dyn Error>> {
    let path = tempfile::TempDir::new()?;
    let memory = CutoutService::new(memory_repository()?);
    let filesystem = CutoutService::new(filesystem_repository(path.path())?);

    let bounds = Bounds::new(vec![1, 3, 5], vec![9, 4, 30])?;
    for name in ["grayscale", "segmentation"] {
        let a = memory.get_cutout_block(name, &bounds)?;
        let b = filesystem.get_cutout_block(name, &bounds)?;
        assert_eq!(serde_json::to_string(&a)?, serde_json::to_string(&b)?);
    }
    assert_eq!(
        memory.get_description("predictions/probabilities")?,
        filesystem.get_description("predictions/probabilities")?
    );
    Ok(())
}

#[test]
fn cutout_default_axis_names() -> Result<(), Box<dyn Error>> {
    let service = CutoutService::new(memory_repository()?);
    let description = service.get_description("predictions/probabilities")?;
    assert_eq!(description.axis_names(), &['x', 'c']);

    let message = service.get_cutout_block(
        "predictions/probabilities",
        &Bounds::new(vec![2, 1], vec![4, 3])?,
    )?;
    assert_eq!(message.description().axis_names(), &['x', 'c']);
    let decoded = decode_ndarray::<f32>(&message)?;
    assert_eq!(decoded.array()[IxDyn(&[0, 0])], 2.0 / 7.0 - 1.0);
    Ok(())
}

#[test]
fn cutout_concurrent_requests() -> Result<(), Box<dyn Error>> {
    let service = CutoutService::new(memory_repository()?);
    let expected = segmentation().into_dimensionality::<Ix3>()?;
    (0..10i64).into_par_iter().try_for_each(|z| {
        let bounds = Bounds::new(vec![z, 0, 0], vec![z + 1, 20, 30])?;
        let decoded = decode_ndarray::<u64>(&service.get_cutout_block("segmentation", &bounds)?)?;
        let z = usize::try_from(z)?;
        assert_eq!(
            decoded.array(),
            &expected.slice(ndarray::s![z..=z, .., ..]).to_owned().into_dyn()
        );
        Ok::<_, Box<dyn Error + Send + Sync>>(())
    })
    .map_err(|err| err as Box<dyn Error>)
}

#[test]
#[cfg_attr(miri, ignore)]
fn cutout_concurrent_requests_filesystem() -> Result<(), Box<dyn Error>> {
    let path = tempfile::TempDir::new()?;
    let service = CutoutService::new(filesystem_repository(path.path())?);
    let results: Vec<_> = (0..16)
        .into_par_iter()
        .map(|i| {
            let bounds = Bounds::new(vec![0, i, 0], vec![10, i + 1, 30]).unwrap();
            service.get_cutout_block("grayscale", &bounds)
        })
        .collect();
    for (i, result) in results.into_iter().enumerate() {
        let decoded = decode_ndarray::<u8>(&result?)?;
        assert_eq!(decoded.array().shape(), &[10, 1, 30]);
        assert_eq!(decoded.array()[IxDyn(&[0, 0, 0])], u8::try_from(i * 7)?);
    }
    Ok(())
}

#[test]
fn cutout_usage_log() -> Result<(), Box<dyn Error>> {
    let log_writer = Arc::new(Mutex::new(Vec::<u8>::new()));
    let repository = Arc::new(UsageLogRepository::new(
        memory_repository()?,
        log_writer.clone(),
        || chrono::Utc::now().format("[%T%.3f] ").to_string(),
    ));
    let service = CutoutService::new(repository);
    service.list_datasets()?;
    service.get_cutout_block("grayscale", &Bounds::new(vec![0, 0, 0], vec![1, 2, 3])?)?;
    assert!(matches!(
        service.get_description("missing"),
        Err(CutoutError::NotFound(_))
    ));

    let log = String::from_utf8(log_writer.lock().clone())?;
    let lines: Vec<&str> = log
        .lines()
        .map(|line| line.split_once("] ").map_or(line, |(_, line)| line))
        .collect();
    assert_eq!(
        lines,
        vec![
            "list_entries() -> [grayscale, predictions/probabilities, segmentation]",
            "metadata(grayscale) -> Ok(shape [10, 20, 30] uint8)",
            "read_block(grayscale, start [0, 0, 0] shape [1, 2, 3]) -> Ok([1, 2, 3])",
            "metadata(missing) -> Ok(None)",
        ]
    );
    Ok(())
}

#[test]
#[cfg_attr(miri, ignore)]
fn cutout_filesystem_added_dataset_is_listed() -> Result<(), Box<dyn Error>> {
    let path = tempfile::TempDir::new()?;
    let repository = Arc::new(FilesystemRepository::new(path.path())?.sorted(true));
    let service = CutoutService::new(repository.clone());
    assert!(service.list_datasets()?.is_empty());

    repository.create_dataset("late", &TypedArray::from(grayscale()), None)?;
    assert_eq!(service.list_datasets()?, vec!["late"]);
    assert_eq!(repository.shape_of("late")?, Some(vec![10, 20, 30]));
    Ok(())
}

#[test]
#[cfg_attr(miri, ignore)]
fn cutout_filesystem_names_through_files_not_found() -> Result<(), Box<dyn Error>> {
    let path = tempfile::TempDir::new()?;
    let service = CutoutService::new(filesystem_repository(path.path())?);
    for name in ["grayscale/data", "grayscale/dataset.json"] {
        assert!(matches!(
            service.get_description(name),
            Err(CutoutError::NotFound(missing)) if missing == name
        ));
        assert!(matches!(
            service.get_cutout_block(name, &Bounds::new(vec![0], vec![1])?),
            Err(CutoutError::NotFound(missing)) if missing == name
        ));
    }
    Ok(())
}
