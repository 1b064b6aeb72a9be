//! Global line histograms and the carryover they are completed from.

use std::mem::size_of;
use std::ops::Range;

use rqa_core::{FrequencyDistribution, LineDistributions};
use tracing::debug;

use crate::error::{ComputeError, ComputeResult};
use crate::kernels::{ColumnCarry, VerticalCounts};
use crate::substrate::{ComputeSubstrate, DeviceBuffer};

/// Collects tile results into the final [`LineDistributions`].
///
/// Column carry is indexed by global column. Diagonal carry holds `2N - 1`
/// slots, or `N` when only the upper triangle is processed.
#[derive(Debug)]
pub struct HistogramAggregator {
    vectors: usize,
    symmetric: bool,
    columns: DeviceBuffer<ColumnCarry>,
    diagonals: DeviceBuffer<usize>,
    diagonal: FrequencyDistribution,
    vertical: FrequencyDistribution,
    white_vertical: FrequencyDistribution,
}

impl HistogramAggregator {
    /// Allocate cleared carryover for `vectors` columns on `substrate`.
    pub fn new<S: ComputeSubstrate>(
        substrate: &S,
        vectors: usize,
        symmetric: bool,
    ) -> ComputeResult<Self> {
        Ok(Self {
            vectors,
            symmetric,
            columns: substrate.allocate("column_carry", vectors)?,
            diagonals: substrate.allocate("diagonal_carry", diagonal_slots(vectors, symmetric))?,
            diagonal: FrequencyDistribution::with_max_length(vectors),
            vertical: FrequencyDistribution::with_max_length(vectors),
            white_vertical: FrequencyDistribution::with_max_length(vectors),
        })
    }

    /// Device bytes held by the carryover of a run over `vectors` columns.
    pub fn carry_bytes(vectors: usize, symmetric: bool) -> u64 {
        let columns = vectors * size_of::<ColumnCarry>();
        let diagonals = diagonal_slots(vectors, symmetric) * size_of::<usize>();
        (columns + diagonals) as u64
    }

    pub fn is_symmetric(&self) -> bool {
        self.symmetric
    }

    /// Column carry for global columns `start..start + len`.
    pub fn column_window(&mut self, start: usize, len: usize) -> ComputeResult<&mut [ColumnCarry]> {
        let vectors = self.vectors;
        self.columns
            .get_mut(start..start + len)
            .ok_or_else(|| out_of_range("column_carry", start..start + len, vectors))
    }

    /// Diagonal carry for `slots`.
    pub fn diagonal_carry(&mut self, slots: Range<usize>) -> ComputeResult<&mut [usize]> {
        let available = self.diagonals.len();
        self.diagonals
            .get_mut(slots.clone())
            .ok_or_else(|| out_of_range("diagonal_carry", slots, available))
    }

    pub fn absorb_vertical(&mut self, counts: &VerticalCounts) {
        self.vertical.merge(&counts.vertical);
        self.white_vertical.merge(&counts.white_vertical);
    }

    pub fn absorb_diagonal(&mut self, counts: &FrequencyDistribution) {
        self.diagonal.merge(counts);
    }

    /// Flush every open run and hand out the final distributions, each
    /// padded to `N` lengths.
    pub fn finish<S: ComputeSubstrate>(mut self, substrate: &S) -> ComputeResult<LineDistributions> {
        let columns = substrate.download(&self.columns)?;
        let diagonals = substrate.download(&self.diagonals)?;

        let mut tail = VerticalCounts::default();
        let mut recurrence_points = Vec::with_capacity(columns.len());
        for mut column in columns {
            recurrence_points.push(column.points);
            column.flush(&mut tail);
        }
        self.absorb_vertical(&tail);

        let mut open_diagonals = 0usize;
        for (slot, &run) in diagonals.iter().enumerate() {
            if run == 0 {
                continue;
            }
            open_diagonals += 1;
            let weight = if self.symmetric && slot > 0 { 2 } else { 1 };
            self.diagonal.record(run, weight);
        }
        debug!(
            open_diagonals,
            open_vertical = tail.vertical.lines_from(1),
            "Carryover flushed"
        );

        let Self {
            vectors,
            mut diagonal,
            mut vertical,
            mut white_vertical,
            ..
        } = self;
        diagonal.pad_to(vectors);
        vertical.pad_to(vectors);
        white_vertical.pad_to(vectors);

        Ok(LineDistributions {
            recurrence_points,
            diagonal,
            vertical,
            white_vertical,
        })
    }
}

fn diagonal_slots(vectors: usize, symmetric: bool) -> usize {
    if symmetric {
        vectors
    } else {
        (2 * vectors).saturating_sub(1)
    }
}

fn out_of_range(label: &str, range: Range<usize>, len: usize) -> ComputeError {
    ComputeError::kernel_failed(
        label,
        format!("slots {}..{} outside carry of {len}", range.start, range.end),
    )
}
