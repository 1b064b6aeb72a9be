//! Sequential full-matrix reference.
//!
//! Builds the whole N×N matrix in host memory and reads every line off it
//! directly. It shares the membership test with the engine but none of the
//! tiling or carryover, which makes it the yardstick the tiled paths are
//! checked against.

use rqa_core::{
    AnalysisSettings, CoreError, EmbeddedSeries, FrequencyDistribution, LineDistributions,
    Neighbourhood, RecurrenceMatrix,
};

use crate::error::ComputeResult;
use crate::kernels::{neighbour_bound, RecurrenceTest};

/// Full recurrence matrix, computed cell by cell.
pub fn baseline_matrix(
    embedding: &EmbeddedSeries,
    settings: &AnalysisSettings,
) -> ComputeResult<RecurrenceMatrix> {
    settings.validate()?;
    if settings.embedding_dimension != embedding.dimension() {
        return Err(CoreError::DimensionMismatch {
            expected: settings.embedding_dimension,
            actual: embedding.dimension(),
        }
        .into());
    }

    let vectors = embedding.number_of_vectors();
    let bounds = match settings.neighbourhood {
        Neighbourhood::FixedAmount { k } => {
            if k > vectors {
                return Err(CoreError::invalid_config(
                    "analysis.neighbourhood.k",
                    k,
                    format!("k must be within 1..={vectors}"),
                )
                .into());
            }
            Some(
                (0..vectors)
                    .map(|column| neighbour_bound(embedding, settings.metric, k, column))
                    .collect::<Vec<_>>(),
            )
        }
        _ => None,
    };
    let test = RecurrenceTest::new(settings, bounds.as_deref())?;

    let mut matrix = RecurrenceMatrix::new(vectors);
    for y in 0..vectors {
        for x in 0..vectors {
            let set = test.is_recurrence(embedding.vector(x), embedding.vector(y), x, y);
            matrix.set(x, y, set);
        }
    }
    Ok(matrix)
}

/// Line distributions of `embedding` without tiling.
pub fn baseline_distributions(
    embedding: &EmbeddedSeries,
    settings: &AnalysisSettings,
) -> ComputeResult<LineDistributions> {
    let matrix = baseline_matrix(embedding, settings)?;
    Ok(matrix_distributions(&matrix, settings.theiler_corrector))
}

/// Read all lines off a complete matrix. Diagonals with `|x - y| < theiler`
/// are skipped.
pub fn matrix_distributions(matrix: &RecurrenceMatrix, theiler: usize) -> LineDistributions {
    let n = matrix.size();
    let mut vertical = FrequencyDistribution::with_max_length(n);
    let mut white_vertical = FrequencyDistribution::with_max_length(n);
    let mut diagonal = FrequencyDistribution::with_max_length(n);

    for x in 0..n {
        let (mut black, mut white) = (0usize, 0usize);
        for y in 0..n {
            if matrix.is_recurrence(x, y) {
                black += 1;
                white_vertical.record(white, 1);
                white = 0;
            } else {
                white += 1;
                vertical.record(black, 1);
                black = 0;
            }
        }
        vertical.record(black, 1);
        white_vertical.record(white, 1);
    }

    for offset in -(n as isize - 1)..n as isize {
        if offset.unsigned_abs() < theiler {
            continue;
        }
        let (x0, y0) = if offset >= 0 {
            (offset as usize, 0)
        } else {
            (0, offset.unsigned_abs())
        };
        let length = n - x0.max(y0);
        let mut run = 0usize;
        for step in 0..length {
            if matrix.is_recurrence(x0 + step, y0 + step) {
                run += 1;
            } else {
                diagonal.record(run, 1);
                run = 0;
            }
        }
        diagonal.record(run, 1);
    }

    LineDistributions {
        recurrence_points: matrix.column_counts(),
        diagonal,
        vertical,
        white_vertical,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rqa_core::Metric;

    fn reference() -> (EmbeddedSeries, AnalysisSettings) {
        let settings = AnalysisSettings {
            embedding_dimension: 3,
            time_delay: 1,
            ..AnalysisSettings::default()
        };
        let series = [0.1, 0.5, 0.3, 1.7, 0.8, 2.4, 0.6, 1.2, 1.4, 2.1, 0.8];
        (settings.embed(&series).unwrap(), settings)
    }

    #[test]
    fn test_reference_distributions() {
        let (embedding, settings) = reference();
        let distributions = baseline_distributions(&embedding, &settings).unwrap();
        assert_eq!(distributions.recurrence_points, vec![1, 2, 3, 2, 3, 1, 4, 3, 2]);
        assert_eq!(distributions.diagonal.counts(), &[6, 0, 2, 0, 0, 0, 0, 0, 0]);
        assert_eq!(distributions.vertical.counts(), &[15, 3, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(distributions.white_vertical.counts(), &[8, 5, 7, 2, 1, 0, 0, 1, 0]);
    }

    #[test]
    fn test_taxicab_reference_is_identity() {
        let (embedding, mut settings) = reference();
        settings.metric = Metric::Taxicab;
        let distributions = baseline_distributions(&embedding, &settings).unwrap();
        assert_eq!(distributions.recurrence_points, vec![1; 9]);
        assert_eq!(distributions.diagonal.lines_from(1), 0);
        assert_eq!(distributions.vertical.counts()[0], 9);
        assert_eq!(distributions.white_vertical.counts(), &[2, 2, 2, 2, 2, 2, 2, 2, 0]);
    }

    #[test]
    fn test_theiler_zero_counts_main_diagonal() {
        let (embedding, mut settings) = reference();
        settings.theiler_corrector = 0;
        let distributions = baseline_distributions(&embedding, &settings).unwrap();
        // the main diagonal is fully recurrent
        assert_eq!(distributions.diagonal.count(9), 1);
        assert_eq!(distributions.diagonal.points_from(1), 21);
    }

    #[test]
    fn test_dimension_mismatch() {
        let (embedding, mut settings) = reference();
        settings.embedding_dimension = 2;
        let err = baseline_matrix(&embedding, &settings).unwrap_err();
        assert!(err.is_data_error());
    }
}
