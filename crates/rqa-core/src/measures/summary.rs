use serde::{Deserialize, Serialize};
use std::fmt;

use super::{ratio, LineLengthThresholds};
use crate::distribution::LineDistributions;
use crate::error::{CoreError, CoreResult};
use crate::runtimes::Runtimes;

/// Snapshot of every scalar measure, suitable for serialization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RqaMeasures {
    pub recurrence_rate: f64,
    pub average_local_recurrence_rate: f64,
    pub determinism: f64,
    pub average_diagonal_line: f64,
    pub longest_diagonal_line: usize,
    pub divergence: f64,
    pub entropy_diagonal_lines: f64,
    pub laminarity: f64,
    pub trapping_time: f64,
    pub longest_vertical_line: usize,
    pub entropy_vertical_lines: f64,
    pub average_white_vertical_line: f64,
    pub longest_white_vertical_line: usize,
    pub entropy_white_vertical_lines: f64,
    pub ratio_determinism_recurrence_rate: f64,
    pub ratio_laminarity_determinism: f64,
}

/// Result of an RQA computation: the engine's distributions plus the line
/// length thresholds the measures are derived with.
///
/// Thresholds can be changed after the fact without recomputing the
/// distributions.
#[derive(Debug, Clone, Serialize)]
pub struct RqaSummary {
    thresholds: LineLengthThresholds,
    distributions: LineDistributions,
    runtimes: Runtimes,
}

impl RqaSummary {
    /// Wrap engine output.
    ///
    /// # Errors
    ///
    /// - `CoreError::InvalidConfig` if a threshold is zero
    /// - `CoreError::EmptyInput` if the distributions describe an empty matrix
    pub fn new(
        thresholds: LineLengthThresholds,
        distributions: LineDistributions,
        runtimes: Runtimes,
    ) -> CoreResult<Self> {
        thresholds.validate()?;
        if distributions.recurrence_points.is_empty() {
            return Err(CoreError::EmptyInput(
                "distributions cover no vectors".into(),
            ));
        }
        Ok(Self {
            thresholds,
            distributions,
            runtimes,
        })
    }

    pub fn thresholds(&self) -> LineLengthThresholds {
        self.thresholds
    }

    /// Replace the minimum line lengths.
    pub fn set_thresholds(&mut self, thresholds: LineLengthThresholds) -> CoreResult<()> {
        thresholds.validate()?;
        self.thresholds = thresholds;
        Ok(())
    }

    pub fn distributions(&self) -> &LineDistributions {
        &self.distributions
    }

    pub fn runtimes(&self) -> &Runtimes {
        &self.runtimes
    }

    pub fn number_of_vectors(&self) -> usize {
        self.distributions.number_of_vectors()
    }

    pub fn number_of_recurrence_points(&self) -> u64 {
        self.distributions.number_of_recurrence_points()
    }

    // Diagonal lines

    pub fn number_of_diagonal_lines(&self) -> u64 {
        self.distributions
            .diagonal
            .lines_from(self.thresholds.diagonal)
    }

    pub fn number_of_diagonal_lines_points(&self) -> u64 {
        self.distributions
            .diagonal
            .points_from(self.thresholds.diagonal)
    }

    pub fn longest_diagonal_line(&self) -> usize {
        self.distributions.diagonal.longest()
    }

    pub fn entropy_diagonal_lines(&self) -> f64 {
        self.distributions
            .diagonal
            .entropy_from(self.thresholds.diagonal)
    }

    // Vertical lines

    pub fn number_of_vertical_lines(&self) -> u64 {
        self.distributions
            .vertical
            .lines_from(self.thresholds.vertical)
    }

    pub fn number_of_vertical_lines_points(&self) -> u64 {
        self.distributions
            .vertical
            .points_from(self.thresholds.vertical)
    }

    pub fn longest_vertical_line(&self) -> usize {
        self.distributions.vertical.longest()
    }

    pub fn entropy_vertical_lines(&self) -> f64 {
        self.distributions
            .vertical
            .entropy_from(self.thresholds.vertical)
    }

    // White vertical lines

    pub fn number_of_white_vertical_lines(&self) -> u64 {
        self.distributions
            .white_vertical
            .lines_from(self.thresholds.white_vertical)
    }

    pub fn number_of_white_vertical_lines_points(&self) -> u64 {
        self.distributions
            .white_vertical
            .points_from(self.thresholds.white_vertical)
    }

    pub fn longest_white_vertical_line(&self) -> usize {
        self.distributions.white_vertical.longest()
    }

    pub fn entropy_white_vertical_lines(&self) -> f64 {
        self.distributions
            .white_vertical
            .entropy_from(self.thresholds.white_vertical)
    }

    // Measures

    /// Recurrence rate (RR).
    pub fn recurrence_rate(&self) -> f64 {
        let n = self.number_of_vectors() as f64;
        ratio(self.number_of_recurrence_points() as f64, n * n)
    }

    /// Mean number of recurrences per vector.
    pub fn average_local_recurrence_rate(&self) -> f64 {
        ratio(
            self.number_of_recurrence_points() as f64,
            self.number_of_vectors() as f64,
        )
    }

    /// Determinism (DET).
    pub fn determinism(&self) -> f64 {
        ratio(
            self.number_of_diagonal_lines_points() as f64,
            self.number_of_recurrence_points() as f64,
        )
    }

    /// Average diagonal line length (L).
    pub fn average_diagonal_line(&self) -> f64 {
        ratio(
            self.number_of_diagonal_lines_points() as f64,
            self.number_of_diagonal_lines() as f64,
        )
    }

    /// Divergence (DIV).
    pub fn divergence(&self) -> f64 {
        ratio(1.0, self.longest_diagonal_line() as f64)
    }

    /// Laminarity (LAM).
    pub fn laminarity(&self) -> f64 {
        ratio(
            self.number_of_vertical_lines_points() as f64,
            self.number_of_recurrence_points() as f64,
        )
    }

    /// Trapping time (TT).
    pub fn trapping_time(&self) -> f64 {
        ratio(
            self.number_of_vertical_lines_points() as f64,
            self.number_of_vertical_lines() as f64,
        )
    }

    /// Average white vertical line length (W).
    pub fn average_white_vertical_line(&self) -> f64 {
        ratio(
            self.number_of_white_vertical_lines_points() as f64,
            self.number_of_white_vertical_lines() as f64,
        )
    }

    /// DET / RR.
    pub fn ratio_determinism_recurrence_rate(&self) -> f64 {
        ratio(self.determinism(), self.recurrence_rate())
    }

    /// LAM / DET.
    pub fn ratio_laminarity_determinism(&self) -> f64 {
        ratio(self.laminarity(), self.determinism())
    }

    /// Indices of vectors whose local recurrence rate `RP[i] / N` is at
    /// most `threshold`.
    pub fn indices_by_local_recurrence_rate(&self, threshold: f64) -> Vec<usize> {
        let n = self.number_of_vectors() as f64;
        self.distributions
            .recurrence_points
            .iter()
            .enumerate()
            .filter(|&(_, &points)| points as f64 / n <= threshold)
            .map(|(i, _)| i)
            .collect()
    }

    /// Indices of vectors with at most `threshold` recurrences.
    pub fn indices_by_number_of_local_recurrence_points(&self, threshold: u64) -> Vec<usize> {
        self.distributions
            .recurrence_points
            .iter()
            .enumerate()
            .filter(|&(_, &points)| points <= threshold)
            .map(|(i, _)| i)
            .collect()
    }

    /// Every scalar measure at once.
    pub fn measures(&self) -> RqaMeasures {
        RqaMeasures {
            recurrence_rate: self.recurrence_rate(),
            average_local_recurrence_rate: self.average_local_recurrence_rate(),
            determinism: self.determinism(),
            average_diagonal_line: self.average_diagonal_line(),
            longest_diagonal_line: self.longest_diagonal_line(),
            divergence: self.divergence(),
            entropy_diagonal_lines: self.entropy_diagonal_lines(),
            laminarity: self.laminarity(),
            trapping_time: self.trapping_time(),
            longest_vertical_line: self.longest_vertical_line(),
            entropy_vertical_lines: self.entropy_vertical_lines(),
            average_white_vertical_line: self.average_white_vertical_line(),
            longest_white_vertical_line: self.longest_white_vertical_line(),
            entropy_white_vertical_lines: self.entropy_white_vertical_lines(),
            ratio_determinism_recurrence_rate: self.ratio_determinism_recurrence_rate(),
            ratio_laminarity_determinism: self.ratio_laminarity_determinism(),
        }
    }

    /// Thresholds and measures as pretty-printed JSON.
    pub fn to_json(&self) -> CoreResult<String> {
        #[derive(Serialize)]
        struct Report {
            thresholds: LineLengthThresholds,
            number_of_vectors: usize,
            number_of_recurrence_points: u64,
            measures: RqaMeasures,
        }

        let report = Report {
            thresholds: self.thresholds,
            number_of_vectors: self.number_of_vectors(),
            number_of_recurrence_points: self.number_of_recurrence_points(),
            measures: self.measures(),
        };
        Ok(serde_json::to_string_pretty(&report)?)
    }
}

impl fmt::Display for RqaSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.measures();
        writeln!(f, "RQA Result:")?;
        writeln!(f, "-----------")?;
        writeln!(f, "Minimum diagonal line length (L_min): {}", self.thresholds.diagonal)?;
        writeln!(f, "Minimum vertical line length (V_min): {}", self.thresholds.vertical)?;
        writeln!(
            f,
            "Minimum white vertical line length (W_min): {}",
            self.thresholds.white_vertical
        )?;
        writeln!(f)?;
        writeln!(f, "Recurrence rate (RR): {:.6}", m.recurrence_rate)?;
        writeln!(f, "Determinism (DET): {:.6}", m.determinism)?;
        writeln!(f, "Average diagonal line length (L): {:.6}", m.average_diagonal_line)?;
        writeln!(f, "Longest diagonal line length (L_max): {}", m.longest_diagonal_line)?;
        writeln!(f, "Divergence (DIV): {:.6}", m.divergence)?;
        writeln!(f, "Entropy diagonal lines (L_entr): {:.6}", m.entropy_diagonal_lines)?;
        writeln!(f, "Laminarity (LAM): {:.6}", m.laminarity)?;
        writeln!(f, "Trapping time (TT): {:.6}", m.trapping_time)?;
        writeln!(f, "Longest vertical line length (V_max): {}", m.longest_vertical_line)?;
        writeln!(f, "Entropy vertical lines (V_entr): {:.6}", m.entropy_vertical_lines)?;
        writeln!(
            f,
            "Average white vertical line length (W): {:.6}",
            m.average_white_vertical_line
        )?;
        writeln!(
            f,
            "Longest white vertical line length (W_max): {}",
            m.longest_white_vertical_line
        )?;
        writeln!(
            f,
            "Entropy white vertical lines (W_entr): {:.6}",
            m.entropy_white_vertical_lines
        )?;
        writeln!(f)?;
        writeln!(
            f,
            "Ratio determinism / recurrence rate (DET/RR): {:.6}",
            m.ratio_determinism_recurrence_rate
        )?;
        write!(
            f,
            "Ratio laminarity / determinism (LAM/DET): {:.6}",
            m.ratio_laminarity_determinism
        )
    }
}
