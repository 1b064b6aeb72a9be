//! Delay embedding of scalar time series into phase-space vectors.

use crate::error::{CoreError, CoreResult};

/// Number of leading samples consumed by the delay window.
#[inline]
pub const fn embedding_offset(embedding_dimension: usize, time_delay: usize) -> usize {
    embedding_dimension.saturating_sub(1) * time_delay
}

/// Phase-space vectors stored contiguously, vector `i` at
/// `values[i * dimension..(i + 1) * dimension]`.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedSeries {
    dimension: usize,
    values: Vec<f32>,
}

impl EmbeddedSeries {
    /// Delay-embed a scalar series.
    ///
    /// Vector `i` is `[series[i], series[i + t], ..., series[i + (m - 1) t]]`,
    /// which yields `len - (m - 1) t` vectors.
    ///
    /// # Errors
    ///
    /// - `CoreError::InvalidConfig` if `m` or `t` is zero
    /// - `CoreError::SeriesTooShort` if not even one vector fits
    ///
    /// # Example
    ///
    /// ```
    /// use rqa_core::EmbeddedSeries;
    ///
    /// let series = [1.0, 2.0, 3.0, 4.0, 5.0];
    /// let embedded = EmbeddedSeries::from_series(&series, 2, 2).unwrap();
    /// assert_eq!(embedded.number_of_vectors(), 3);
    /// assert_eq!(embedded.vector(1), &[2.0, 4.0]);
    /// ```
    pub fn from_series(
        series: &[f32],
        embedding_dimension: usize,
        time_delay: usize,
    ) -> CoreResult<Self> {
        if embedding_dimension == 0 {
            return Err(CoreError::invalid_config(
                "analysis.embedding_dimension",
                embedding_dimension,
                "embedding dimension must be at least 1",
            ));
        }
        if time_delay == 0 {
            return Err(CoreError::invalid_config(
                "analysis.time_delay",
                time_delay,
                "time delay must be at least 1",
            ));
        }

        let offset = embedding_offset(embedding_dimension, time_delay);
        if series.len() <= offset {
            return Err(CoreError::SeriesTooShort {
                length: series.len(),
                required: offset + 1,
            });
        }

        let count = series.len() - offset;
        let mut values = Vec::with_capacity(count * embedding_dimension);
        for i in 0..count {
            values.extend((0..embedding_dimension).map(|k| series[i + k * time_delay]));
        }

        Ok(Self {
            dimension: embedding_dimension,
            values,
        })
    }

    /// Wrap precomputed vectors laid out contiguously.
    ///
    /// # Errors
    ///
    /// - `CoreError::InvalidConfig` if `dimension` is zero
    /// - `CoreError::EmptyInput` if `values` is empty
    /// - `CoreError::RaggedVectors` if the length is not a multiple of `dimension`
    pub fn from_vectors(values: Vec<f32>, dimension: usize) -> CoreResult<Self> {
        if dimension == 0 {
            return Err(CoreError::invalid_config(
                "analysis.embedding_dimension",
                dimension,
                "embedding dimension must be at least 1",
            ));
        }
        if values.is_empty() {
            return Err(CoreError::EmptyInput("no embedding vectors".into()));
        }
        if values.len() % dimension != 0 {
            return Err(CoreError::RaggedVectors {
                length: values.len(),
                dimension,
            });
        }
        Ok(Self { dimension, values })
    }

    /// Components per vector.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of vectors, the side length of the recurrence matrix.
    #[inline]
    pub fn number_of_vectors(&self) -> usize {
        self.values.len() / self.dimension
    }

    /// Vector `index`.
    #[inline]
    pub fn vector(&self, index: usize) -> &[f32] {
        let start = index * self.dimension;
        &self.values[start..start + self.dimension]
    }

    /// Contiguous block of `count` vectors starting at `start`.
    #[inline]
    pub fn vectors(&self, start: usize, count: usize) -> &[f32] {
        &self.values[start * self.dimension..(start + count) * self.dimension]
    }

    /// All vectors as one flat slice.
    #[inline]
    pub fn as_flat(&self) -> &[f32] {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_layout() {
        let series: Vec<f32> = (0..10).map(|i| i as f32).collect();
        let embedded = EmbeddedSeries::from_series(&series, 3, 2).unwrap();
        assert_eq!(embedded.number_of_vectors(), 6);
        assert_eq!(embedded.vector(0), &[0.0, 2.0, 4.0]);
        assert_eq!(embedded.vector(5), &[5.0, 7.0, 9.0]);
        assert_eq!(embedded.vectors(4, 2), &[4.0, 6.0, 8.0, 5.0, 7.0, 9.0]);
    }

    #[test]
    fn test_dimension_one_is_identity() {
        let series = [0.5, 0.25, 0.125];
        let embedded = EmbeddedSeries::from_series(&series, 1, 7).unwrap();
        assert_eq!(embedded.as_flat(), &series);
    }

    #[test]
    fn test_series_too_short() {
        let err = EmbeddedSeries::from_series(&[1.0, 2.0, 3.0, 4.0], 3, 2).unwrap_err();
        match err {
            CoreError::SeriesTooShort { length, required } => {
                assert_eq!(length, 4);
                assert_eq!(required, 5);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_zero_parameters_rejected() {
        assert!(EmbeddedSeries::from_series(&[1.0; 8], 0, 1)
            .unwrap_err()
            .is_configuration_error());
        assert!(EmbeddedSeries::from_series(&[1.0; 8], 2, 0)
            .unwrap_err()
            .is_configuration_error());
    }

    #[test]
    fn test_from_vectors_validation() {
        assert!(EmbeddedSeries::from_vectors(vec![1.0, 2.0, 3.0], 2).is_err());
        assert!(EmbeddedSeries::from_vectors(vec![], 2).is_err());
        let ok = EmbeddedSeries::from_vectors(vec![1.0, 2.0, 3.0, 4.0], 2).unwrap();
        assert_eq!(ok.number_of_vectors(), 2);
        assert_eq!(ok.vector(1), &[3.0, 4.0]);
    }
}
