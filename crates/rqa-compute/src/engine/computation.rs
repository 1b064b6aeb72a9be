//! Front-end computations pairing settings with input data.

use rqa_core::{
    AnalysisSettings, EmbeddedSeries, EngineConfig, RecurrenceMatrix, RqaConfig, RqaSummary,
};
use tracing::info;

use super::RqaEngine;
use crate::error::ComputeResult;

/// Recurrence quantification of one series.
///
/// # Example
///
/// ```
/// use rqa_compute::RqaComputation;
/// use rqa_core::{AnalysisSettings, EngineConfig};
///
/// let settings = AnalysisSettings {
///     embedding_dimension: 3,
///     time_delay: 1,
///     ..AnalysisSettings::default()
/// };
/// let series = [0.1, 0.5, 0.3, 1.7, 0.8, 2.4, 0.6, 1.2, 1.4, 2.1, 0.8];
/// let computation = RqaComputation::from_series(&series, settings, EngineConfig::default()).unwrap();
/// let summary = computation.run().unwrap();
/// assert_eq!(summary.longest_diagonal_line(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct RqaComputation {
    settings: AnalysisSettings,
    embedding: EmbeddedSeries,
    engine: EngineConfig,
}

impl RqaComputation {
    /// Pair already embedded vectors with settings.
    pub fn new(settings: AnalysisSettings, embedding: EmbeddedSeries, engine: EngineConfig) -> Self {
        Self {
            settings,
            embedding,
            engine,
        }
    }

    /// Embed `series` with the delay parameters of `settings`.
    ///
    /// # Errors
    ///
    /// Returns a data error if the series is too short for the embedding.
    pub fn from_series(
        series: &[f32],
        settings: AnalysisSettings,
        engine: EngineConfig,
    ) -> ComputeResult<Self> {
        settings.validate()?;
        let embedding = settings.embed(series)?;
        Ok(Self::new(settings, embedding, engine))
    }

    /// Build from a loaded [`RqaConfig`].
    pub fn from_config(series: &[f32], config: &RqaConfig) -> ComputeResult<Self> {
        Self::from_series(series, config.analysis.clone(), config.engine.clone())
    }

    pub fn settings(&self) -> &AnalysisSettings {
        &self.settings
    }

    pub fn embedding(&self) -> &EmbeddedSeries {
        &self.embedding
    }

    /// Run the engine and derive the summary.
    pub fn run(&self) -> ComputeResult<RqaSummary> {
        let engine = RqaEngine::new(self.engine.clone())?;
        let output = engine.run(&self.embedding, &self.settings)?;
        let summary = RqaSummary::new(
            self.settings.line_thresholds(),
            output.distributions,
            output.runtimes,
        )?;
        info!(
            recurrence_rate = summary.recurrence_rate(),
            determinism = summary.determinism(),
            laminarity = summary.laminarity(),
            "RQA summary ready"
        );
        Ok(summary)
    }
}

/// Full recurrence plot of one series.
#[derive(Debug, Clone)]
pub struct RecurrencePlotComputation {
    settings: AnalysisSettings,
    embedding: EmbeddedSeries,
    engine: EngineConfig,
}

impl RecurrencePlotComputation {
    pub fn new(settings: AnalysisSettings, embedding: EmbeddedSeries, engine: EngineConfig) -> Self {
        Self {
            settings,
            embedding,
            engine,
        }
    }

    /// Embed `series` with the delay parameters of `settings`.
    pub fn from_series(
        series: &[f32],
        settings: AnalysisSettings,
        engine: EngineConfig,
    ) -> ComputeResult<Self> {
        settings.validate()?;
        let embedding = settings.embed(series)?;
        Ok(Self::new(settings, embedding, engine))
    }

    /// Build from a loaded [`RqaConfig`].
    pub fn from_config(series: &[f32], config: &RqaConfig) -> ComputeResult<Self> {
        Self::from_series(series, config.analysis.clone(), config.engine.clone())
    }

    pub fn settings(&self) -> &AnalysisSettings {
        &self.settings
    }

    pub fn embedding(&self) -> &EmbeddedSeries {
        &self.embedding
    }

    /// Compute the matrix. Rows are stored top to bottom; see
    /// [`RecurrenceMatrix::rows_reversed`] for plotting with the origin at
    /// the bottom left.
    pub fn run(&self) -> ComputeResult<RecurrenceMatrix> {
        let engine = RqaEngine::new(self.engine.clone())?;
        engine.build_matrix(&self.embedding, &self.settings)
    }
}
