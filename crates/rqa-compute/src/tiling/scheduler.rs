use rqa_core::{MatrixEncoding, ProcessingOrder};
use tracing::{debug, warn};

use super::Tile;
use crate::error::{ComputeError, ComputeResult};
use crate::kernels::matrix_bytes;

/// Bytes one `edge`×`edge` tile occupies: its matrix (if materialized) plus
/// the column and row vectors.
pub fn tile_bytes(encoding: Option<MatrixEncoding>, edge: usize, dimension: usize) -> u64 {
    let matrix = encoding.map_or(0, |encoding| matrix_bytes(encoding, edge, edge));
    let vectors = (2 * edge * dimension * std::mem::size_of::<f32>()) as u64;
    matrix + vectors
}

/// Partition plan for one run.
///
/// # Example
///
/// ```
/// use rqa_compute::tiling::TileScheduler;
/// use rqa_core::{MatrixEncoding, ProcessingOrder};
///
/// let scheduler = TileScheduler::plan(10, 3, Some(MatrixEncoding::Byte), 1 << 20, 4).unwrap();
/// assert_eq!(scheduler.edge_length(), 4);
/// assert_eq!(scheduler.partitions(), 3);
///
/// let upper = scheduler.tiles(true, ProcessingOrder::RowMajor);
/// assert_eq!(upper.len(), 6);
/// assert_eq!((upper[5].dim_x, upper[5].dim_y), (2, 2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileScheduler {
    vectors: usize,
    edge: usize,
}

impl TileScheduler {
    /// Pick the largest edge `e <= min(vectors, max_edge)` whose tile fits
    /// `budget`.
    ///
    /// `encoding` is `None` when tiles are never materialized.
    ///
    /// # Errors
    ///
    /// - `ComputeError::BudgetTooSmall` if a 1×1 tile exceeds the budget
    /// - `CoreError::EmptyInput` if there are no vectors
    pub fn plan(
        vectors: usize,
        dimension: usize,
        encoding: Option<MatrixEncoding>,
        budget: u64,
        max_edge: usize,
    ) -> ComputeResult<Self> {
        if vectors == 0 {
            return Err(rqa_core::CoreError::EmptyInput("no vectors to tile".into()).into());
        }

        let smallest = tile_bytes(encoding, 1, dimension);
        if smallest > budget {
            return Err(ComputeError::BudgetTooSmall {
                budget,
                edge: 1,
                required: smallest,
            });
        }

        let cap = vectors.min(max_edge.max(1));
        let (mut low, mut high) = (1usize, cap);
        while low < high {
            let mid = low + (high - low + 1) / 2;
            if tile_bytes(encoding, mid, dimension) <= budget {
                low = mid;
            } else {
                high = mid - 1;
            }
        }

        if low < cap {
            warn!(
                edge = low,
                requested = cap,
                budget,
                "Memory budget forces a smaller tile edge"
            );
        }
        debug!(vectors, edge = low, "Tile edge chosen");

        Ok(Self { vectors, edge: low })
    }

    /// Plan with a fixed edge length, clamped to `1..=vectors`.
    pub fn with_edge(vectors: usize, edge: usize) -> Self {
        Self {
            vectors,
            edge: edge.clamp(1, vectors.max(1)),
        }
    }

    pub fn edge_length(&self) -> usize {
        self.edge
    }

    pub fn vectors(&self) -> usize {
        self.vectors
    }

    /// Partitions per axis.
    pub fn partitions(&self) -> usize {
        self.vectors.div_ceil(self.edge)
    }

    /// `(start, length)` of partition `p`.
    pub fn partition(&self, p: usize) -> (usize, usize) {
        let start = p * self.edge;
        (start, self.edge.min(self.vectors - start))
    }

    /// Descriptor for partition pair `(px, py)`.
    pub fn tile(&self, px: usize, py: usize) -> Tile {
        let (start_x, dim_x) = self.partition(px);
        let (start_y, dim_y) = self.partition(py);
        Tile {
            px,
            py,
            start_x,
            start_y,
            dim_x,
            dim_y,
        }
    }

    /// Tiles in processing order.
    ///
    /// With `symmetric` only tiles on or above the main diagonal
    /// (`px >= py`) are emitted.
    pub fn tiles(&self, symmetric: bool, order: ProcessingOrder) -> Vec<Tile> {
        let p = self.partitions();
        let mut tiles = Vec::with_capacity(if symmetric { p * (p + 1) / 2 } else { p * p });

        match order {
            ProcessingOrder::RowMajor => {
                for py in 0..p {
                    let first = if symmetric { py } else { 0 };
                    for px in first..p {
                        tiles.push(self.tile(px, py));
                    }
                }
            }
            ProcessingOrder::Wavefront => {
                for level in 0..(2 * p).saturating_sub(1) {
                    for py in 0..p {
                        if py > level || level - py >= p {
                            continue;
                        }
                        let px = level - py;
                        if symmetric && px < py {
                            continue;
                        }
                        tiles.push(self.tile(px, py));
                    }
                }
            }
        }

        tiles
    }
}
