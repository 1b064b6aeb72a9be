//! Tiled, data-parallel recurrence quantification analysis.
//!
//! The N×N recurrence matrix is never held in memory as a whole. It is cut
//! into tiles sized to a memory budget, and each tile is swept by parallel
//! kernels that extract vertical, white vertical and diagonal line lengths.
//! Runs crossing a tile boundary continue through per-column and
//! per-diagonal carryover, so the final histograms do not depend on how the
//! matrix was tiled.
//!
//! # Architecture
//!
//! ```text
//! RqaComputation ──> RqaEngine ──> TileScheduler ──> [Tile, ...]
//!                        │
//!                        ├──> kernels (matrix, vertical, diagonal)
//!                        │        └──> ComputeSubstrate (CpuSubstrate: rayon)
//!                        └──> HistogramAggregator ──> LineDistributions
//!                                                          └──> RqaSummary
//! ```
//!
//! # Example
//!
//! ```
//! use rqa_compute::RqaComputation;
//! use rqa_core::{AnalysisSettings, EngineConfig};
//!
//! let settings = AnalysisSettings {
//!     embedding_dimension: 3,
//!     time_delay: 1,
//!     ..AnalysisSettings::default()
//! };
//! let series = [0.1, 0.5, 0.3, 1.7, 0.8, 2.4, 0.6, 1.2, 1.4, 2.1, 0.8];
//! let summary = RqaComputation::from_series(&series, settings, EngineConfig::default())
//!     .unwrap()
//!     .run()
//!     .unwrap();
//! assert!((summary.recurrence_rate() - 21.0 / 81.0).abs() < 1e-12);
//! ```

pub mod aggregate;
pub mod baseline;
pub mod engine;
pub mod error;
pub mod kernels;
pub mod substrate;
pub mod tiling;

pub use aggregate::HistogramAggregator;
pub use engine::{EngineOutput, RecurrencePlotComputation, RqaComputation, RqaEngine};
pub use error::{ComputeError, ComputeResult};
pub use substrate::{ComputeSubstrate, CpuSubstrate};
pub use tiling::{Tile, TileScheduler};
