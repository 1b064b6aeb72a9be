use tracing::error;

use super::Tile;
use crate::error::{ComputeError, ComputeResult};

/// Completion grid over the partition pairs.
///
/// Carryover threads down each column partition and along each row
/// partition, so a tile may only start once the scheduled tile above it and
/// the scheduled tile to its left have finished.
#[derive(Debug, Clone)]
pub struct DependencyLedger {
    partitions: usize,
    symmetric: bool,
    completed: Vec<bool>,
}

impl DependencyLedger {
    pub fn new(partitions: usize, symmetric: bool) -> Self {
        Self {
            partitions,
            symmetric,
            completed: vec![false; partitions * partitions],
        }
    }

    /// Whether `(px, py)` is part of the schedule.
    pub fn is_scheduled(&self, px: usize, py: usize) -> bool {
        px < self.partitions && py < self.partitions && (!self.symmetric || px >= py)
    }

    pub fn is_complete(&self, px: usize, py: usize) -> bool {
        self.completed[py * self.partitions + px]
    }

    /// Check that every scheduled predecessor of `tile` has completed.
    ///
    /// # Errors
    ///
    /// Returns `ComputeError::OrderingViolation` naming the first missing
    /// predecessor.
    pub fn check_ready(&self, tile: &Tile) -> ComputeResult<()> {
        let (px, py) = (tile.px, tile.py);
        let mut predecessors = [None, None];
        if py > 0 {
            predecessors[0] = Some((px, py - 1, "column"));
        }
        if px > 0 {
            predecessors[1] = Some((px - 1, py, "row"));
        }

        for (pred_x, pred_y, axis) in predecessors.into_iter().flatten() {
            if self.is_scheduled(pred_x, pred_y) && !self.is_complete(pred_x, pred_y) {
                error!(px, py, pred_x, pred_y, axis, "Tile ordering violated");
                return Err(ComputeError::OrderingViolation {
                    px,
                    py,
                    pred_x,
                    pred_y,
                    axis,
                });
            }
        }
        Ok(())
    }

    pub fn mark_complete(&mut self, tile: &Tile) {
        self.completed[tile.py * self.partitions + tile.px] = true;
    }

    /// Check that every scheduled tile has completed.
    ///
    /// # Errors
    ///
    /// Returns `ComputeError::OrderingViolation` for the first pending tile,
    /// reported against itself.
    pub fn ensure_complete(&self) -> ComputeResult<()> {
        for py in 0..self.partitions {
            for px in 0..self.partitions {
                if self.is_scheduled(px, py) && !self.is_complete(px, py) {
                    return Err(ComputeError::OrderingViolation {
                        px,
                        py,
                        pred_x: px,
                        pred_y: py,
                        axis: "flush",
                    });
                }
            }
        }
        Ok(())
    }
}
