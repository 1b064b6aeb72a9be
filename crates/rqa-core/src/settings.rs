//! Analysis settings shared by every RQA computation.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::embedding::{embedding_offset, EmbeddedSeries};
use crate::error::{CoreError, CoreResult};
use crate::measures::LineLengthThresholds;
use crate::metric::Metric;
use crate::neighbourhood::Neighbourhood;

/// Parameters of one recurrence analysis.
///
/// # Example
///
/// ```
/// use rqa_core::{AnalysisSettings, Neighbourhood};
///
/// let settings = AnalysisSettings::default();
/// assert_eq!(settings.embedding_dimension, 2);
/// assert_eq!(settings.offset(), 2);
///
/// let fan = AnalysisSettings {
///     neighbourhood: Neighbourhood::fixed_amount(4),
///     ..AnalysisSettings::default()
/// };
/// assert!(!fan.is_matrix_symmetric());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Embedding dimension `m`.
    pub embedding_dimension: usize,
    /// Time delay `t` between vector components.
    pub time_delay: usize,
    /// Distance between vectors.
    pub metric: Metric,
    /// Recurrence criterion.
    pub neighbourhood: Neighbourhood,
    /// Theiler corrector `w`: diagonals with `|x - y| < w` are excluded.
    pub theiler_corrector: usize,
    /// Shortest diagonal line counted by the measures.
    pub min_diagonal_line_length: usize,
    /// Shortest vertical line counted by the measures.
    pub min_vertical_line_length: usize,
    /// Shortest white vertical line counted by the measures.
    pub min_white_vertical_line_length: usize,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            embedding_dimension: 2,
            time_delay: 2,
            metric: Metric::default(),
            neighbourhood: Neighbourhood::default(),
            theiler_corrector: 1,
            min_diagonal_line_length: 2,
            min_vertical_line_length: 2,
            min_white_vertical_line_length: 2,
        }
    }
}

impl AnalysisSettings {
    /// Samples consumed by the delay window, `(m - 1) t`.
    pub fn offset(&self) -> usize {
        embedding_offset(self.embedding_dimension, self.time_delay)
    }

    /// Number of vectors a series of `series_length` samples embeds into.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::SeriesTooShort` if no vector fits.
    pub fn number_of_vectors(&self, series_length: usize) -> CoreResult<usize> {
        let offset = self.offset();
        if series_length <= offset {
            return Err(CoreError::SeriesTooShort {
                length: series_length,
                required: offset + 1,
            });
        }
        Ok(series_length - offset)
    }

    /// Whether only the upper triangle of the matrix needs computing.
    pub fn is_matrix_symmetric(&self) -> bool {
        self.metric.is_symmetric() && self.neighbourhood.is_radius_based()
    }

    /// Minimum line lengths as consumed by the measure derivation.
    pub fn line_thresholds(&self) -> LineLengthThresholds {
        LineLengthThresholds {
            diagonal: self.min_diagonal_line_length,
            vertical: self.min_vertical_line_length,
            white_vertical: self.min_white_vertical_line_length,
        }
    }

    /// Delay-embed `series` with these settings.
    pub fn embed(&self, series: &[f32]) -> CoreResult<EmbeddedSeries> {
        EmbeddedSeries::from_series(series, self.embedding_dimension, self.time_delay)
    }

    /// Validate all parameters.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidConfig` if:
    /// - embedding dimension or time delay is zero
    /// - the neighbourhood parameters are invalid
    /// - any minimum line length is zero
    pub fn validate(&self) -> CoreResult<()> {
        if self.embedding_dimension == 0 {
            return Err(CoreError::invalid_config(
                "analysis.embedding_dimension",
                self.embedding_dimension,
                "embedding dimension must be at least 1",
            ));
        }
        if self.time_delay == 0 {
            return Err(CoreError::invalid_config(
                "analysis.time_delay",
                self.time_delay,
                "time delay must be at least 1",
            ));
        }
        self.neighbourhood.validate()?;
        self.line_thresholds().validate()
    }
}

impl fmt::Display for AnalysisSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Recurrence Analysis Settings")?;
        writeln!(f, "----------------------------")?;
        writeln!(f, "Embedding dimension: {}", self.embedding_dimension)?;
        writeln!(f, "Time delay: {}", self.time_delay)?;
        writeln!(f, "Similarity measure: {}", self.metric)?;
        writeln!(f, "Neighbourhood: {}", self.neighbourhood)?;
        writeln!(f, "Theiler corrector: {}", self.theiler_corrector)?;
        writeln!(f, "Minimum diagonal line length: {}", self.min_diagonal_line_length)?;
        writeln!(f, "Minimum vertical line length: {}", self.min_vertical_line_length)?;
        writeln!(
            f,
            "Minimum white vertical line length: {}",
            self.min_white_vertical_line_length
        )?;
        writeln!(f, "Offset: {}", self.offset())?;
        write!(f, "Matrix symmetry: {}", self.is_matrix_symmetric())
    }
}
