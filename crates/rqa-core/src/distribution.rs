//! Run-length frequency distributions.

use serde::{Deserialize, Serialize};

/// Histogram of line lengths: `counts[l - 1]` is the number of lines of
/// exactly length `l`.
///
/// The distribution grows on demand, so worker-local instances stay small and
/// only the final merged distribution is padded to the matrix size.
///
/// # Example
///
/// ```
/// use rqa_core::FrequencyDistribution;
///
/// let mut dist = FrequencyDistribution::new();
/// dist.record(3, 1);
/// dist.record(1, 2);
/// assert_eq!(dist.counts(), &[2, 0, 1]);
/// assert_eq!(dist.points_from(1), 5);
/// assert_eq!(dist.longest(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrequencyDistribution {
    counts: Vec<u64>,
}

impl FrequencyDistribution {
    /// Empty distribution.
    pub fn new() -> Self {
        Self::default()
    }

    /// Zeroed distribution covering lengths `1..=max_length`.
    pub fn with_max_length(max_length: usize) -> Self {
        Self {
            counts: vec![0; max_length],
        }
    }

    /// Wrap existing counts, `counts[l - 1]` for length `l`.
    pub fn from_counts(counts: Vec<u64>) -> Self {
        Self { counts }
    }

    /// Add `weight` lines of `length`. Zero lengths are ignored.
    #[inline]
    pub fn record(&mut self, length: usize, weight: u64) {
        if length == 0 {
            return;
        }
        if self.counts.len() < length {
            self.counts.resize(length, 0);
        }
        self.counts[length - 1] += weight;
    }

    /// Add all counts of `other` into `self`.
    pub fn merge(&mut self, other: &FrequencyDistribution) {
        if self.counts.len() < other.counts.len() {
            self.counts.resize(other.counts.len(), 0);
        }
        for (mine, theirs) in self.counts.iter_mut().zip(&other.counts) {
            *mine += theirs;
        }
    }

    /// By-value merge, the shape rayon's `reduce` expects.
    pub fn merged(mut self, other: FrequencyDistribution) -> FrequencyDistribution {
        self.merge(&other);
        self
    }

    /// Extend with zero buckets up to `max_length`.
    pub fn pad_to(&mut self, max_length: usize) {
        if self.counts.len() < max_length {
            self.counts.resize(max_length, 0);
        }
    }

    /// Raw counts.
    #[inline]
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Number of length buckets.
    #[inline]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// True when no bucket exists.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Lines of exactly `length`.
    pub fn count(&self, length: usize) -> u64 {
        if length == 0 {
            return 0;
        }
        self.counts.get(length - 1).copied().unwrap_or(0)
    }

    /// `(length, count)` pairs for every bucket, zero counts included.
    pub fn iter(&self) -> impl Iterator<Item = (usize, u64)> + '_ {
        self.counts.iter().enumerate().map(|(i, &c)| (i + 1, c))
    }

    /// Number of lines of at least `min_length`.
    pub fn lines_from(&self, min_length: usize) -> u64 {
        self.iter()
            .filter(|&(len, _)| len >= min_length)
            .map(|(_, c)| c)
            .sum()
    }

    /// Cells covered by lines of at least `min_length`.
    pub fn points_from(&self, min_length: usize) -> u64 {
        self.iter()
            .filter(|&(len, _)| len >= min_length)
            .map(|(len, c)| len as u64 * c)
            .sum()
    }

    /// Longest length with a non-zero count, 0 when empty.
    pub fn longest(&self) -> usize {
        self.counts
            .iter()
            .rposition(|&c| c != 0)
            .map_or(0, |i| i + 1)
    }

    /// Shannon entropy (natural log) of the lengths of at least `min_length`.
    pub fn entropy_from(&self, min_length: usize) -> f64 {
        let total = self.lines_from(min_length);
        if total == 0 {
            return 0.0;
        }
        let total = total as f64;
        let sum: f64 = self
            .iter()
            .filter(|&(len, c)| len >= min_length && c > 0)
            .map(|(_, c)| {
                let p = c as f64 / total;
                p * p.ln()
            })
            .sum();
        if sum == 0.0 {
            0.0
        } else {
            -sum
        }
    }
}

/// Complete engine output consumed by the measure derivation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineDistributions {
    /// Recurrent cells per column.
    pub recurrence_points: Vec<u64>,
    /// Diagonal line lengths, Theiler window applied.
    pub diagonal: FrequencyDistribution,
    /// Vertical line lengths.
    pub vertical: FrequencyDistribution,
    /// White vertical line lengths.
    pub white_vertical: FrequencyDistribution,
}

impl LineDistributions {
    /// Side length of the analysed matrix.
    pub fn number_of_vectors(&self) -> usize {
        self.recurrence_points.len()
    }

    /// Total number of recurrent cells.
    pub fn number_of_recurrence_points(&self) -> u64 {
        self.recurrence_points.iter().sum()
    }
}
