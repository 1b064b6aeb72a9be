//! Vertical and white vertical line extraction.

use rayon::prelude::*;
use rqa_core::FrequencyDistribution;

use super::cells::CellSource;
use crate::error::{ComputeError, ComputeResult};
use crate::substrate::{ComputeSubstrate, KernelLaunch};

/// Per-column state carried from one row-tile to the next.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnCarry {
    /// Recurrences seen so far.
    pub points: u64,
    /// Length of the open run of recurrences.
    pub vertical: usize,
    /// Length of the open run of non-recurrences.
    pub white_vertical: usize,
}

impl ColumnCarry {
    /// Advance by one cell, recording any run the cell closes.
    #[inline]
    pub fn step(&mut self, set: bool, counts: &mut VerticalCounts) {
        if set {
            self.points += 1;
            self.vertical += 1;
            if self.white_vertical > 0 {
                counts.white_vertical.record(self.white_vertical, 1);
                self.white_vertical = 0;
            }
        } else {
            self.white_vertical += 1;
            if self.vertical > 0 {
                counts.vertical.record(self.vertical, 1);
                self.vertical = 0;
            }
        }
    }

    /// Record the runs still open at the end of the column.
    pub fn flush(&mut self, counts: &mut VerticalCounts) {
        if self.vertical > 0 {
            counts.vertical.record(self.vertical, 1);
            self.vertical = 0;
        }
        if self.white_vertical > 0 {
            counts.white_vertical.record(self.white_vertical, 1);
            self.white_vertical = 0;
        }
    }
}

/// Vertical line histograms of one sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerticalCounts {
    pub vertical: FrequencyDistribution,
    pub white_vertical: FrequencyDistribution,
}

impl VerticalCounts {
    pub fn merge(&mut self, other: &VerticalCounts) {
        self.vertical.merge(&other.vertical);
        self.white_vertical.merge(&other.white_vertical);
    }

    fn merged(mut self, other: VerticalCounts) -> VerticalCounts {
        self.merge(&other);
        self
    }
}

/// Sweep every column of `source` top to bottom, one parallel unit per
/// column, continuing from and writing back to `carry`.
///
/// # Errors
///
/// Returns `ComputeError::KernelFailed` if `carry` does not hold one entry
/// per column.
pub fn sweep_columns<S: ComputeSubstrate, C: CellSource>(
    substrate: &S,
    source: &C,
    carry: &mut [ColumnCarry],
) -> ComputeResult<VerticalCounts> {
    const KERNEL: &str = "vertical_lines";
    if carry.len() != source.dim_x() {
        return Err(ComputeError::kernel_failed(
            KERNEL,
            format!(
                "carry window holds {} columns, tile has {}",
                carry.len(),
                source.dim_x()
            ),
        ));
    }
    let dim_y = source.dim_y();

    substrate.dispatch(KernelLaunch::new(KERNEL, carry.len()), |_| {
        carry
            .par_iter_mut()
            .enumerate()
            .fold(VerticalCounts::default, |mut counts, (x, state)| {
                let mut column = *state;
                for y in 0..dim_y {
                    column.step(source.is_set(x, y), &mut counts);
                }
                *state = column;
                counts
            })
            .reduce(VerticalCounts::default, VerticalCounts::merged)
    })
}
