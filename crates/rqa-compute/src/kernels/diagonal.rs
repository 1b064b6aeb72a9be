//! Diagonal line extraction.
//!
//! # Carryover Layout
//!
//! Each diagonal keeps one running length that survives from tile to tile.
//!
//! Without symmetry the buffer has `2N - 1` slots and diagonal `d = x - y`
//! lives at slot `(N - 1) + d`. A tile launches `dim_x + dim_y - 1` units;
//! unit `u` enters at column `u - (dim_y - 1)` of the top edge, or through
//! the left edge when that is negative.
//!
//! With symmetry only `d >= 0` is kept, at slot `d`, and the tile is swept
//! as two families:
//!
//! ```text
//!   offset == 0   top edge     d = anchor + id      slots [anchor, anchor + dim_x)
//!   offset >  0   left edge    d = anchor - id      slots [anchor - extent, anchor)
//! ```
//!
//! where `extent = dim_y - 1`. Left-edge slots are laid out in ascending `d`
//! so unit `id` owns slot `extent - id` of its window; [`mirrored_slot`] is
//! the single mapping between the two.

use rayon::prelude::*;
use rqa_core::FrequencyDistribution;
use std::ops::Range;

use super::cells::CellSource;
use crate::error::{ComputeError, ComputeResult};
use crate::substrate::{ComputeSubstrate, KernelLaunch};
use crate::tiling::Tile;

/// Entry edge of a symmetric diagonal family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagonalFamily {
    /// Diagonals entering through the top edge, on or above the anchor.
    Top,
    /// Diagonals entering through the left edge, below the anchor.
    Left,
}

impl DiagonalFamily {
    /// Kernel `offset` parameter of the family.
    pub const fn offset(self) -> usize {
        match self {
            DiagonalFamily::Top => 0,
            DiagonalFamily::Left => 1,
        }
    }
}

/// Slot within a family window for unit `id`, and unit for slot `id`.
///
/// Identity for the top-edge family (`offset == 0`), `extent - id` for the
/// left-edge family. The mapping is its own inverse.
#[inline]
pub const fn mirrored_slot(offset: usize, id: usize, extent: usize) -> usize {
    if offset == 0 {
        id
    } else {
        extent - id
    }
}

/// Slot of diagonal `start_x + delta - start_y` in the `2N - 1` buffer.
#[inline]
pub fn asymmetric_slot(vectors: usize, start_x: usize, start_y: usize, delta: isize) -> usize {
    ((vectors - 1 + start_x) as isize + delta - start_y as isize) as usize
}

/// Slots of the `2N - 1` buffer touched by `tile`.
pub fn asymmetric_window(vectors: usize, tile: &Tile) -> Range<usize> {
    let first = asymmetric_slot(
        vectors,
        tile.start_x,
        tile.start_y,
        -(tile.dim_y as isize - 1),
    );
    first..first + tile.dim_x + tile.dim_y - 1
}

/// Slots of the symmetric buffer touched by one family of `tile`.
///
/// # Errors
///
/// Returns `ComputeError::KernelFailed` if the left-edge family is requested
/// for a tile whose window would start below the main diagonal.
pub fn symmetric_window(tile: &Tile, family: DiagonalFamily) -> ComputeResult<Range<usize>> {
    let anchor = tile.anchor();
    match family {
        DiagonalFamily::Top => Ok(anchor..anchor + tile.dim_x),
        DiagonalFamily::Left => {
            let extent = tile.dim_y.saturating_sub(1);
            let first = anchor.checked_sub(extent).ok_or_else(|| {
                ComputeError::kernel_failed(
                    "diagonal_lines_symmetric",
                    format!(
                        "tile ({}, {}) has no room for {} left-edge diagonals below anchor {}",
                        tile.px, tile.py, extent, anchor
                    ),
                )
            })?;
            Ok(first..anchor)
        }
    }
}

/// Run length along one diagonal, continuing from `carry`.
#[inline]
fn scan<C: CellSource>(
    source: &C,
    (x0, y0): (usize, usize),
    length: usize,
    carry: &mut usize,
    weight: u64,
    counts: &mut FrequencyDistribution,
) {
    let mut run = *carry;
    for step in 0..length {
        if source.is_set(x0 + step, y0 + step) {
            run += 1;
        } else if run > 0 {
            counts.record(run, weight);
            run = 0;
        }
    }
    *carry = run;
}

fn window_mismatch(kernel: &str, window: usize, expected: usize) -> ComputeError {
    ComputeError::kernel_failed(
        kernel,
        format!("carry window holds {window} diagonals, tile launches {expected}"),
    )
}

/// Sweep all `dim_x + dim_y - 1` diagonals of a tile, one parallel unit
/// each, skipping those inside the Theiler window.
///
/// `window` is the [`asymmetric_window`] of the tile.
pub fn sweep_diagonals<S: ComputeSubstrate, C: CellSource>(
    substrate: &S,
    source: &C,
    tile: &Tile,
    theiler: usize,
    window: &mut [usize],
) -> ComputeResult<FrequencyDistribution> {
    const KERNEL: &str = "diagonal_lines";
    let (dim_x, dim_y) = (source.dim_x(), source.dim_y());
    let units = (dim_x + dim_y).saturating_sub(1);
    if window.len() != units {
        return Err(window_mismatch(KERNEL, window.len(), units));
    }
    let anchor = tile.start_x as isize - tile.start_y as isize;

    substrate.dispatch(KernelLaunch::new(KERNEL, units), |_| {
        window
            .par_iter_mut()
            .enumerate()
            .fold(FrequencyDistribution::new, |mut counts, (unit, carry)| {
                let delta = unit as isize - (dim_y as isize - 1);
                if (anchor + delta).unsigned_abs() < theiler {
                    return counts;
                }
                let start = if delta >= 0 {
                    (delta as usize, 0)
                } else {
                    (0, delta.unsigned_abs())
                };
                let length = (dim_x - start.0).min(dim_y - start.1);
                scan(source, start, length, carry, 1, &mut counts);
                counts
            })
            .reduce(FrequencyDistribution::new, FrequencyDistribution::merged)
    })
}

/// Sweep one family of diagonals of an upper-triangle tile.
///
/// Lines are weighted 2 off the main diagonal, standing in for their mirror
/// image below it. `window` is the [`symmetric_window`] of the family.
pub fn sweep_diagonals_symmetric<S: ComputeSubstrate, C: CellSource>(
    substrate: &S,
    source: &C,
    tile: &Tile,
    family: DiagonalFamily,
    theiler: usize,
    window: &mut [usize],
) -> ComputeResult<FrequencyDistribution> {
    const KERNEL: &str = "diagonal_lines_symmetric";
    let (dim_x, dim_y) = (source.dim_x(), source.dim_y());
    let offset = family.offset();
    let extent = dim_y.saturating_sub(1);
    let units = match family {
        DiagonalFamily::Top => dim_x,
        DiagonalFamily::Left => extent,
    };
    if window.len() != units {
        return Err(window_mismatch(KERNEL, window.len(), units));
    }
    let anchor = tile.anchor();

    substrate.dispatch(KernelLaunch::new(KERNEL, units), |_| {
        window
            .par_iter_mut()
            .enumerate()
            .fold(FrequencyDistribution::new, |mut counts, (slot, carry)| {
                let id = mirrored_slot(offset, slot, extent);
                let (start, global) = match family {
                    DiagonalFamily::Top => ((id, 0), anchor + id),
                    DiagonalFamily::Left => ((0, id), anchor - id),
                };
                if global < theiler {
                    return counts;
                }
                let weight = if global > 0 { 2 } else { 1 };
                let length = (dim_x - start.0).min(dim_y - start.1);
                scan(source, start, length, carry, weight, &mut counts);
                counts
            })
            .reduce(FrequencyDistribution::new, FrequencyDistribution::merged)
    })
}
