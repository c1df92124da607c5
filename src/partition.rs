//! Row partitioning for the worker pool.

use std::ops::Range;

use log::{debug, warn};

use crate::error::{FilterError, Result};

/// A half-open band of rows `[start, start + size)` owned by one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    pub start: usize,
    pub size: usize,
}

impl Partition {
    pub fn end(&self) -> usize {
        self.start + self.size
    }

    pub fn rows(&self) -> Range<usize> {
        self.start..self.end()
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}

/// Split `height` rows into `workers` contiguous bands.
///
/// Every band gets `height / workers` rows except the last, which also takes
/// the remainder. With more workers than rows the leading bands are empty.
pub fn partition(height: usize, workers: usize) -> Result<Vec<Partition>> {
    if workers == 0 {
        return Err(FilterError::config("worker count must be at least 1"));
    }
    if height == 0 {
        return Err(FilterError::config("cannot partition an image with no rows"));
    }
    if workers > height {
        warn!(
            "{} workers for {} rows; {} partitions will be empty",
            workers,
            height,
            workers - 1
        );
    }

    let base = height / workers;
    let partitions: Vec<Partition> = (0..workers)
        .map(|i| {
            let start = i * base;
            let size = if i == workers - 1 {
                height - base * (workers - 1)
            } else {
                base
            };
            Partition { start, size }
        })
        .collect();

    debug!(
        "partitioned {} rows into {} bands of {} (last {})",
        height,
        workers,
        base,
        partitions[workers - 1].size
    );

    Ok(partitions)
}
