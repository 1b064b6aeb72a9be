//! Scalar RQA measures derived from line distributions.
//!
//! The engine only produces histograms; everything here is closed-form
//! arithmetic over them. With `N` vectors, recurrence points `RP`, and the
//! diagonal, vertical and white vertical distributions `D`, `V`, `W`:
//!
//! ```text
//! RR      = sum(RP) / N^2
//! DET     = sum_{l >= l_min} l * D[l] / sum(RP)
//! L       = sum_{l >= l_min} l * D[l] / sum_{l >= l_min} D[l]
//! L_max   = max { l : D[l] > 0 }            (all lengths)
//! DIV     = 1 / L_max
//! L_entr  = -sum_{l >= l_min} p(l) ln p(l),  p(l) = D[l] / sum_{l >= l_min} D[l]
//! LAM, TT, V_max, V_entr   vertical analogues with v_min
//! W, W_max, W_entr         white vertical analogues with w_min
//! ```
//!
//! Any ratio with a zero denominator is reported as 0.

mod summary;


use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

pub use summary::{RqaMeasures, RqaSummary};

/// Minimum line lengths applied when deriving measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineLengthThresholds {
    /// Minimum diagonal line length (`l_min`).
    pub diagonal: usize,
    /// Minimum vertical line length (`v_min`).
    pub vertical: usize,
    /// Minimum white vertical line length (`w_min`).
    pub white_vertical: usize,
}

impl Default for LineLengthThresholds {
    fn default() -> Self {
        Self {
            diagonal: 2,
            vertical: 2,
            white_vertical: 2,
        }
    }
}

impl LineLengthThresholds {
    /// All thresholds must be at least 1.
    pub fn validate(&self) -> CoreResult<()> {
        let fields = [
            ("analysis.min_diagonal_line_length", self.diagonal),
            ("analysis.min_vertical_line_length", self.vertical),
            (
                "analysis.min_white_vertical_line_length",
                self.white_vertical,
            ),
        ];
        for (field, value) in fields {
            if value == 0 {
                return Err(CoreError::invalid_config(
                    field,
                    value,
                    "minimum line length must be at least 1",
                ));
            }
        }
        Ok(())
    }
}

/// `numerator / denominator`, or 0 when the denominator vanishes.
#[inline]
pub(crate) fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}
