//! Parallel Laplacian pass over a partitioned image.
//!
//! The source buffer is shared read-only. The result buffer is carved into
//! one `&mut [Pixel]` band per partition before any worker starts, so each
//! worker can only ever touch its own rows and the borrow checker enforces
//! it. The only synchronisation is the final join.

use std::mem;
use std::panic;
use std::thread;

use log::debug;

use crate::config::Config;
use crate::error::{FilterError, Result};
use crate::kernel;
use crate::partition::{self, Partition};
use crate::pixel::{Pixel, PixelBuffer};

/// Partition `source` per `config` and run the filter.
pub fn filter(source: &PixelBuffer, config: &Config) -> Result<PixelBuffer> {
    let partitions = partition::partition(source.height(), config.workers.get())?;
    convolve(source, &partitions)
}

/// Run the Laplacian over `source`, one scoped thread per partition.
pub fn convolve(source: &PixelBuffer, partitions: &[Partition]) -> Result<PixelBuffer> {
    check_tiling(partitions, source.height())?;

    let (width, height) = source.dimensions();
    let mut result = PixelBuffer::filled(width, height, Pixel::BLACK)?;
    let bands = split_bands(result.pixels_mut(), partitions, width);

    debug!(
        "convolving {}x{} across {} partitions",
        width,
        height,
        bands.len()
    );

    run_threads(source, bands)?;
    Ok(result)
}

fn run_threads(source: &PixelBuffer, bands: Vec<(Partition, &mut [Pixel])>) -> Result<()> {
    thread::scope(|scope| -> Result<()> {
        let mut handles = Vec::with_capacity(bands.len());

        for (worker, (part, band)) in bands.into_iter().enumerate() {
            // Already-spawned workers are still joined by the scope on error.
            let handle = thread::Builder::new()
                .name(format!("laplacian-{}", worker))
                .spawn_scoped(scope, move || run_band(source, worker, part, band))
                .map_err(|source| FilterError::Spawn { worker, source })?;
            handles.push(handle);
        }

        for handle in handles {
            if let Err(payload) = handle.join() {
                panic::resume_unwind(payload);
            }
        }

        Ok(())
    })
}

fn run_band(source: &PixelBuffer, worker: usize, part: Partition, band: &mut [Pixel]) {
    debug!("worker {} filtering rows {:?}", worker, part.rows());

    let width = source.width();
    for (offset, row) in band.chunks_exact_mut(width).enumerate() {
        kernel::convolve_row(source, part.start + offset, row);
    }
}

/// Hand out one disjoint mutable band per partition.
fn split_bands<'a>(
    mut rest: &'a mut [Pixel],
    partitions: &[Partition],
    width: usize,
) -> Vec<(Partition, &'a mut [Pixel])> {
    let mut bands = Vec::with_capacity(partitions.len());
    let mut consumed_rows = 0;

    for part in partitions {
        if part.is_empty() {
            bands.push((*part, Default::default()));
            continue;
        }
        debug_assert_eq!(part.start, consumed_rows);
        let (band, tail) = mem::take(&mut rest).split_at_mut(part.size * width);
        bands.push((*part, band));
        rest = tail;
        consumed_rows += part.size;
    }

    bands
}

/// Non-empty partitions must cover `[0, height)` in order, without gaps.
fn check_tiling(partitions: &[Partition], height: usize) -> Result<()> {
    if partitions.is_empty() {
        return Err(FilterError::config("at least one partition is required"));
    }

    let mut next = 0;
    for part in partitions.iter().filter(|p| !p.is_empty()) {
        if part.start != next {
            return Err(FilterError::config(format!(
                "partition starting at row {} should start at row {}",
                part.start, next
            )));
        }
        next = part.start.checked_add(part.size).ok_or_else(|| {
            FilterError::config(format!(
                "partition of {} rows at row {} overflows",
                part.size, part.start
            ))
        })?;
    }

    if next != height {
        return Err(FilterError::config(format!(
            "partitions cover {} rows, image has {}",
            next, height
        )));
    }

    Ok(())
}
