//! Tile decomposition of the N×N recurrence matrix.
//!
//! The matrix is cut into square partitions of edge `e` along both axes; the
//! last partition of an axis takes the remainder. `x` indexes columns and `y`
//! rows throughout.

mod ledger;
mod scheduler;


pub use ledger::DependencyLedger;
pub use scheduler::{tile_bytes, TileScheduler};

use serde::Serialize;

/// One rectangular sub-matrix and its position in the partition grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Tile {
    /// Column partition.
    pub px: usize,
    /// Row partition.
    pub py: usize,
    /// First global column.
    pub start_x: usize,
    /// First global row.
    pub start_y: usize,
    /// Columns covered.
    pub dim_x: usize,
    /// Rows covered.
    pub dim_y: usize,
}

impl Tile {
    /// Whether the tile straddles the main diagonal.
    #[inline]
    pub fn is_diagonal_block(&self) -> bool {
        self.px == self.py
    }

    /// Offset `start_x - start_y` of the diagonal through the top-left corner.
    ///
    /// Only meaningful for tiles on or above the main diagonal.
    #[inline]
    pub fn anchor(&self) -> usize {
        self.start_x.saturating_sub(self.start_y)
    }

    /// Number of cells.
    #[inline]
    pub fn cells(&self) -> usize {
        self.dim_x * self.dim_y
    }
}
