//! Recurrence membership of a single cell.

use rayon::prelude::*;
use rqa_core::{AnalysisSettings, CoreError, EmbeddedSeries, Metric, Neighbourhood};
use std::cmp::Ordering;

use crate::error::{ComputeError, ComputeResult};
use crate::substrate::{ComputeSubstrate, DeviceBuffer, KernelLaunch};

/// Largest `(distance, index)` pair still counted among a column's `k`
/// nearest neighbours.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NeighbourBound {
    pub distance: f32,
    pub index: usize,
}

impl NeighbourBound {
    /// Whether `(distance, index)` sorts at or before the bound.
    #[inline]
    pub fn admits(&self, distance: f32, index: usize) -> bool {
        distance
            .total_cmp(&self.distance)
            .then(index.cmp(&self.index))
            != Ordering::Greater
    }
}

/// Rank bound of column `column` among all vectors.
///
/// Candidates are ordered by distance, ties broken by index, and the vector
/// itself takes part at distance zero.
pub fn neighbour_bound(
    embedding: &EmbeddedSeries,
    metric: Metric,
    k: usize,
    column: usize,
) -> NeighbourBound {
    let reference = embedding.vector(column);
    let mut candidates: Vec<NeighbourBound> = (0..embedding.number_of_vectors())
        .map(|index| NeighbourBound {
            distance: metric.distance(reference, embedding.vector(index)),
            index,
        })
        .collect();

    let nth = k.clamp(1, candidates.len()) - 1;
    let (_, bound, _) = candidates.select_nth_unstable_by(nth, |a, b| {
        a.distance
            .total_cmp(&b.distance)
            .then(a.index.cmp(&b.index))
    });
    *bound
}

/// Device bytes held by the ranked bounds of `vectors` columns.
pub fn bound_bytes(vectors: usize) -> u64 {
    (vectors * std::mem::size_of::<NeighbourBound>()) as u64
}

/// Neighbour-ranking pre-pass: one parallel unit per column.
///
/// # Errors
///
/// - `CoreError::InvalidConfig` if `k` is zero or exceeds the vector count
/// - substrate errors from allocation or dispatch
pub fn rank_neighbours<S: ComputeSubstrate>(
    substrate: &S,
    embedding: &EmbeddedSeries,
    metric: Metric,
    k: usize,
) -> ComputeResult<DeviceBuffer<NeighbourBound>> {
    let vectors = embedding.number_of_vectors();
    if k == 0 || k > vectors {
        return Err(CoreError::invalid_config(
            "analysis.neighbourhood.k",
            k,
            format!("k must be within 1..={vectors}"),
        )
        .into());
    }

    let mut bounds = substrate.allocate::<NeighbourBound>("neighbour_bounds", vectors)?;
    substrate.dispatch(KernelLaunch::new("rank_neighbours", vectors), |_| {
        bounds
            .par_iter_mut()
            .enumerate()
            .for_each(|(column, bound)| *bound = neighbour_bound(embedding, metric, k, column));
    })?;
    Ok(bounds)
}

/// Membership predicate for one run.
#[derive(Debug, Clone, Copy)]
pub enum RecurrenceTest<'a> {
    /// Value based criterion: fixed radius or radius corridor.
    Radius {
        metric: Metric,
        neighbourhood: Neighbourhood,
    },
    /// Fixed amount of neighbours, one bound per global column.
    Ranked {
        metric: Metric,
        bounds: &'a [NeighbourBound],
    },
}

impl<'a> RecurrenceTest<'a> {
    /// Build the predicate for `settings`.
    ///
    /// # Errors
    ///
    /// Returns `ComputeError::KernelFailed` when a fixed amount neighbourhood
    /// is requested without ranked bounds.
    pub fn new(
        settings: &AnalysisSettings,
        bounds: Option<&'a [NeighbourBound]>,
    ) -> ComputeResult<Self> {
        match (settings.neighbourhood, bounds) {
            (Neighbourhood::FixedAmount { .. }, Some(bounds)) => Ok(RecurrenceTest::Ranked {
                metric: settings.metric,
                bounds,
            }),
            (Neighbourhood::FixedAmount { .. }, None) => Err(ComputeError::kernel_failed(
                "rank_neighbours",
                "neighbour bounds missing for a fixed amount neighbourhood",
            )),
            (neighbourhood, _) => Ok(RecurrenceTest::Radius {
                metric: settings.metric,
                neighbourhood,
            }),
        }
    }

    /// Whether global cell `(x, y)` with column vector `column` and row
    /// vector `row` is a recurrence.
    #[inline]
    pub fn is_recurrence(&self, column: &[f32], row: &[f32], x: usize, y: usize) -> bool {
        match *self {
            RecurrenceTest::Radius {
                metric,
                neighbourhood,
            } => neighbourhood
                .admits(metric.distance(column, row))
                .unwrap_or(false),
            RecurrenceTest::Ranked { metric, bounds } => {
                bounds[x].admits(metric.distance(column, row), y)
            }
        }
    }
}

/// Vectors of one tile: one per column and one per row.
#[derive(Debug, Clone, Copy)]
pub struct TileVectors<'a> {
    columns: &'a [f32],
    rows: &'a [f32],
    dimension: usize,
}

impl<'a> TileVectors<'a> {
    pub fn new(columns: &'a [f32], rows: &'a [f32], dimension: usize) -> Self {
        Self {
            columns,
            rows,
            dimension,
        }
    }

    #[inline]
    pub fn column(&self, x: usize) -> &'a [f32] {
        &self.columns[x * self.dimension..(x + 1) * self.dimension]
    }

    #[inline]
    pub fn row(&self, y: usize) -> &'a [f32] {
        &self.rows[y * self.dimension..(y + 1) * self.dimension]
    }

    pub fn dim_x(&self) -> usize {
        self.columns.len() / self.dimension
    }

    pub fn dim_y(&self) -> usize {
        self.rows.len() / self.dimension
    }
}
