//! Data-parallel kernels over one tile.
//!
//! Every kernel reads cells through [`CellSource`], so the same sweep runs
//! over a materialized [`TileMatrix`], over membership evaluated inline, or
//! over the transpose of either.

pub mod cells;
pub mod diagonal;
pub mod matrix;
pub mod membership;
pub mod vertical;


pub use cells::{CellSource, InlineCells, RecordingCells, Transposed};
pub use diagonal::{
    asymmetric_slot, asymmetric_window, mirrored_slot, sweep_diagonals,
    sweep_diagonals_symmetric, symmetric_window, DiagonalFamily,
};
pub use matrix::{build_by_cell, build_by_column, matrix_bytes, TileMatrix};
pub use membership::{
    bound_bytes, neighbour_bound, rank_neighbours, NeighbourBound, RecurrenceTest, TileVectors,
};
pub use vertical::{sweep_columns, ColumnCarry, VerticalCounts};
