use derive_more::Display;
use serde::{de::Error, Deserialize, Serialize};
use thiserror::Error;

use crate::{array::ArrayShape, array_subset::IncompatibleDimensionalityError};

/// The per-axis start (inclusive) and stop (exclusive) of a region, in signed array coordinates.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Display)]
#[display("start {start:?} stop {stop:?}")]
pub struct Bounds {
    start: Vec<i64>,
    stop: Vec<i64>,
}

/// An invalid bounds error, the start of an axis exceeds its stop.
#[derive(Clone, Debug, Error)]
#[error("invalid bounds {0}: start exceeds stop on axis {1}")]
pub struct InvalidBoundsError(Bounds, usize);

impl InvalidBoundsError {
    /// Create a new invalid bounds error.
    #[must_use]
    pub const fn new(bounds: Bounds, axis: usize) -> Self {
        Self(bounds, axis)
    }

    /// Returns the invalid bounds.
    #[must_use]
    pub const fn bounds(&self) -> &Bounds {
        &self.0
    }

    /// Returns the first axis with invalid bounds.
    #[must_use]
    pub const fn axis(&self) -> usize {
        self.1
    }
}

impl Bounds {
    /// Create new bounds.
    ///
    /// # Errors
    /// Returns [`IncompatibleDimensionalityError`] if `start` and `stop` have different lengths.
    pub fn new(start: Vec<i64>, stop: Vec<i64>) -> Result<Self, IncompatibleDimensionalityError> {
        if start.len() == stop.len() {
            Ok(Self { start, stop })
        } else {
            Err(IncompatibleDimensionalityError::new(stop.len(), start.len()))
        }
    }

    /// Create bounds covering an array of `shape` starting at the origin.
    ///
    /// Returns [`None`] if any size exceeds [`i64::MAX`].
    #[must_use]
    pub fn new_with_shape(shape: &[u64]) -> Option<Self> {
        let stop = shape
            .iter()
            .map(|&size| i64::try_from(size).ok())
            .collect::<Option<Vec<_>>>()?;
        Some(Self {
            start: vec![0; shape.len()],
            stop,
        })
    }

    /// Returns the start of each axis.
    #[must_use]
    pub fn start(&self) -> &[i64] {
        &self.start
    }

    /// Returns the stop of each axis.
    #[must_use]
    pub fn stop(&self) -> &[i64] {
        &self.stop
    }

    /// Returns the number of axes.
    #[must_use]
    pub fn dimensionality(&self) -> usize {
        self.start.len()
    }

    /// Returns the shape, `stop - start` on each axis.
    ///
    /// # Errors
    /// Returns [`InvalidBoundsError`] if `start > stop` on any axis, or the size of an axis is not representable.
    pub fn shape(&self) -> Result<ArrayShape, InvalidBoundsError> {
        std::iter::zip(&self.start, &self.stop)
            .enumerate()
            .map(|(axis, (&start, &stop))| {
                stop.checked_sub(start)
                    .and_then(|size| u64::try_from(size).ok())
                    .ok_or_else(|| InvalidBoundsError::new(self.clone(), axis))
            })
            .collect()
    }
}

impl<'de> Deserialize<'de> for Bounds {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(deny_unknown_fields)]
        struct BoundsFields {
            start: Vec<i64>,
            stop: Vec<i64>,
        }
        let BoundsFields { start, stop } = BoundsFields::deserialize(d)?;
        Self::new(start, stop).map_err(|err| D::Error::custom(err.to_string()))
    }
}
