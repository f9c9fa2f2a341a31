use std::iter::FusedIterator;

use itertools::izip;

use crate::array_subset::{ArraySubset, IncompatibleArraySubsetAndShapeError};

/// Iterates over the contiguous runs of elements of an array subset within a column-major array.
///
/// The iterator item is a tuple: (linearised index of the first element, # contiguous elements).
/// Runs are visited in column-major order, so concatenating them yields the subset in column-major order.
pub struct ContiguousRunsIterator {
    outer_start: Vec<u64>,
    outer_shape: Vec<u64>,
    outer_strides: Vec<u64>,
    inner_offset: u64,
    contiguous_elements: u64,
    index: u64,
    num_runs: u64,
}

impl ContiguousRunsIterator {
    /// Create a new contiguous runs iterator.
    ///
    /// # Errors
    /// Returns [`IncompatibleArraySubsetAndShapeError`] if `array_shape` does not encapsulate `subset`.
    pub fn new(
        subset: &ArraySubset,
        array_shape: &[u64],
    ) -> Result<Self, IncompatibleArraySubsetAndShapeError> {
        if !subset.inbounds(array_shape) {
            return Err(IncompatibleArraySubsetAndShapeError::new(
                subset.clone(),
                array_shape.to_vec(),
            ));
        }

        let mut contiguous = true;
        let mut contiguous_elements = 1;
        let mut inner_offset = 0;
        let mut stride = 1;
        let mut outer_start = Vec::new();
        let mut outer_shape = Vec::new();
        let mut outer_strides = Vec::new();
        for (&subset_start, &subset_size, &array_size) in
            izip!(subset.start(), subset.shape(), array_shape)
        {
            if contiguous {
                contiguous_elements *= subset_size;
                inner_offset += subset_start * stride;
                contiguous = subset_start == 0 && subset_size == array_size;
            } else {
                outer_start.push(subset_start);
                outer_shape.push(subset_size);
                outer_strides.push(stride);
            }
            stride *= array_size;
        }

        let num_runs = if contiguous_elements == 0 {
            0
        } else {
            outer_shape.iter().product()
        };
        Ok(Self {
            outer_start,
            outer_shape,
            outer_strides,
            inner_offset,
            contiguous_elements,
            index: 0,
            num_runs,
        })
    }

    /// Return the number of contiguous elements (fixed on each iteration).
    #[must_use]
    pub fn contiguous_elements(&self) -> u64 {
        self.contiguous_elements
    }
}

impl Iterator for ContiguousRunsIterator {
    type Item = (u64, u64);

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.num_runs {
            return None;
        }
        let mut current = self.index;
        let mut offset = self.inner_offset;
        for (&start, &size, &stride) in
            izip!(&self.outer_start, &self.outer_shape, &self.outer_strides)
        {
            offset += (current % size + start) * stride;
            current /= size;
        }
        self.index += 1;
        Some((offset, self.contiguous_elements))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.num_runs - self.index).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ContiguousRunsIterator {}

impl FusedIterator for ContiguousRunsIterator {}
