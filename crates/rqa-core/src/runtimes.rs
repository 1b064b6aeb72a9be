//! Wall-clock timings of the engine phases.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign};
use std::time::Duration;

/// Time spent per phase, summed over all tiles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Runtimes {
    /// Uploading vectors and neighbour bounds.
    pub transfer_to_device: Duration,
    /// Downloading carryover state and histograms.
    pub transfer_from_device: Duration,
    /// Dedicated matrix construction kernels.
    pub create_matrix: Duration,
    /// Vertical and white vertical sweeps (including fused construction).
    pub detect_vertical_lines: Duration,
    /// Diagonal sweeps.
    pub detect_diagonal_lines: Duration,
}

impl Runtimes {
    /// Sum of all phases.
    pub fn total(&self) -> Duration {
        self.transfer_to_device
            + self.transfer_from_device
            + self.create_matrix
            + self.detect_vertical_lines
            + self.detect_diagonal_lines
    }
}

impl Add for Runtimes {
    type Output = Runtimes;

    fn add(mut self, rhs: Runtimes) -> Runtimes {
        self += rhs;
        self
    }
}

impl AddAssign for Runtimes {
    fn add_assign(&mut self, rhs: Runtimes) {
        self.transfer_to_device += rhs.transfer_to_device;
        self.transfer_from_device += rhs.transfer_from_device;
        self.create_matrix += rhs.create_matrix;
        self.detect_vertical_lines += rhs.detect_vertical_lines;
        self.detect_diagonal_lines += rhs.detect_diagonal_lines;
    }
}

impl fmt::Display for Runtimes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Runtimes")?;
        writeln!(f, "--------")?;
        writeln!(f, "Transfer to device: {:?}", self.transfer_to_device)?;
        writeln!(f, "Transfer from device: {:?}", self.transfer_from_device)?;
        writeln!(f, "Create matrix: {:?}", self.create_matrix)?;
        writeln!(f, "Detect vertical lines: {:?}", self.detect_vertical_lines)?;
        writeln!(f, "Detect diagonal lines: {:?}", self.detect_diagonal_lines)?;
        write!(f, "Total: {:?}", self.total())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_is_fieldwise() {
        let a = Runtimes {
            create_matrix: Duration::from_millis(3),
            detect_vertical_lines: Duration::from_millis(1),
            ..Runtimes::default()
        };
        let b = Runtimes {
            create_matrix: Duration::from_millis(2),
            transfer_to_device: Duration::from_millis(5),
            ..Runtimes::default()
        };
        let sum = a + b;
        assert_eq!(sum.create_matrix, Duration::from_millis(5));
        assert_eq!(sum.transfer_to_device, Duration::from_millis(5));
        assert_eq!(sum.total(), Duration::from_millis(11));
    }
}
