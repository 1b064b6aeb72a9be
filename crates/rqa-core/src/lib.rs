//! Core domain types for tiled recurrence quantification analysis (RQA).
//!
//! This crate holds everything the engine and its consumers agree on:
//!
//! - [`AnalysisSettings`]: embedding parameters, metric, neighbourhood, Theiler
//!   corrector and minimum line lengths
//! - [`EmbeddedSeries`]: delay-embedded phase-space vectors
//! - [`FrequencyDistribution`] and [`LineDistributions`]: run-length histograms
//!   produced by the engine
//! - [`RqaSummary`]: the scalar RQA measures derived from those histograms
//! - [`RqaConfig`]: layered configuration (TOML file + environment)
//!
//! The tiled computation itself lives in `rqa-compute`.
//!
//! # Example
//!
//! ```
//! use rqa_core::{AnalysisSettings, Metric, Neighbourhood};
//!
//! let settings = AnalysisSettings {
//!     embedding_dimension: 3,
//!     time_delay: 1,
//!     metric: Metric::Euclidean,
//!     neighbourhood: Neighbourhood::fixed_radius(1.0),
//!     ..AnalysisSettings::default()
//! };
//! assert!(settings.validate().is_ok());
//! assert!(settings.is_matrix_symmetric());
//! assert_eq!(settings.number_of_vectors(11).unwrap(), 9);
//! ```

pub mod config;
pub mod distribution;
pub mod embedding;
pub mod error;
pub mod matrix;
pub mod measures;
pub mod metric;
pub mod neighbourhood;
pub mod runtimes;
pub mod settings;

pub use config::{
    EngineConfig, ExtractionStrategy, LoggingConfig, MatrixEncoding, ProcessingOrder, RqaConfig,
    SubstrateConfig,
};
pub use distribution::{FrequencyDistribution, LineDistributions};
pub use embedding::EmbeddedSeries;
pub use error::{CoreError, CoreResult, ErrorCategory};
pub use matrix::RecurrenceMatrix;
pub use measures::{LineLengthThresholds, RqaMeasures, RqaSummary};
pub use metric::Metric;
pub use neighbourhood::Neighbourhood;
pub use runtimes::Runtimes;
pub use settings::AnalysisSettings;
