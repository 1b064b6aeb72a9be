//! Distance metrics between embedding vectors.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Similarity measure applied to pairs of phase-space vectors.
///
/// Distances are accumulated in `f32` in component order, matching the
/// precision of the stored vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// L2 norm of the difference.
    #[default]
    Euclidean,
    /// L-infinity norm (Chebyshev / supremum).
    Maximum,
    /// L1 norm (Manhattan).
    Taxicab,
}

impl Metric {
    /// Distance between two vectors of equal length.
    #[inline]
    pub fn distance(self, a: &[f32], b: &[f32]) -> f32 {
        debug_assert_eq!(a.len(), b.len());
        let pairs = a.iter().zip(b.iter());
        match self {
            Metric::Euclidean => {
                let mut sum = 0.0f32;
                for (x, y) in pairs {
                    let diff = x - y;
                    sum += diff * diff;
                }
                sum.sqrt()
            }
            Metric::Maximum => {
                let mut max = 0.0f32;
                for (x, y) in pairs {
                    let diff = (x - y).abs();
                    if diff > max {
                        max = diff;
                    }
                }
                max
            }
            Metric::Taxicab => {
                let mut sum = 0.0f32;
                for (x, y) in pairs {
                    sum += (x - y).abs();
                }
                sum
            }
        }
    }

    /// Whether `distance(a, b) == distance(b, a)` for all inputs.
    pub const fn is_symmetric(self) -> bool {
        match self {
            Metric::Euclidean | Metric::Maximum | Metric::Taxicab => true,
        }
    }

    /// Human readable name.
    pub const fn name(self) -> &'static str {
        match self {
            Metric::Euclidean => "Euclidean Metric",
            Metric::Maximum => "Maximum Metric",
            Metric::Taxicab => "Taxicab Metric",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
