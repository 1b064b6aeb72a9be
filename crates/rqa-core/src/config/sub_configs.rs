//! Engine, substrate and logging configuration sections.

use serde::{Deserialize, Serialize};

use super::constants::{
    DEFAULT_DEVICE_MEMORY_BYTES, DEFAULT_EDGE_LENGTH, DEFAULT_MEMORY_BUDGET_BYTES,
    EDGE_LENGTH_CEILING, WORKER_THREADS_CEILING,
};
use crate::error::{CoreError, CoreResult};

/// Physical encoding of a materialized tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatrixEncoding {
    /// 32 cells per word, column-major. Smallest footprint.
    Bit,
    /// One byte per cell, row-major.
    Byte,
}

/// How tiles are turned into line statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionStrategy {
    /// Build the tile matrix, then run the extractors over it.
    #[default]
    Materialized,
    /// Evaluate membership inside the extractors; no matrix is allocated.
    Fused,
}

/// Order in which tiles are visited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingOrder {
    /// Row of tiles by row of tiles, left to right.
    #[default]
    RowMajor,
    /// Anti-diagonal fronts of tiles (`px + py` ascending).
    Wavefront,
}

/// Compute substrate configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SubstrateConfig {
    /// Worker threads; 0 uses one per logical core.
    pub worker_threads: usize,
    /// Device memory available for buffers.
    pub device_memory_bytes: u64,
}

impl Default for SubstrateConfig {
    fn default() -> Self {
        Self {
            worker_threads: 0,
            device_memory_bytes: DEFAULT_DEVICE_MEMORY_BYTES,
        }
    }
}

impl SubstrateConfig {
    /// Validate substrate parameters.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidConfig` if the worker count exceeds
    /// the pool ceiling or device memory is zero.
    pub fn validate(&self) -> CoreResult<()> {
        if self.worker_threads > WORKER_THREADS_CEILING {
            return Err(CoreError::invalid_config(
                "engine.substrate.worker_threads",
                self.worker_threads,
                format!("worker count must be within 0..={WORKER_THREADS_CEILING}"),
            ));
        }
        if self.device_memory_bytes == 0 {
            return Err(CoreError::invalid_config(
                "engine.substrate.device_memory_bytes",
                self.device_memory_bytes,
                "device memory must be greater than 0",
            ));
        }
        Ok(())
    }
}

/// Tiled engine configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Bytes one tile (matrix plus vectors) may occupy. The engine lowers
    /// it to the device memory left once carryover is allocated.
    pub memory_budget_bytes: u64,
    /// Upper bound on the tile edge length.
    pub max_edge_length: usize,
    /// Tile encoding; unset picks bit packing unless the matrix is retained.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<MatrixEncoding>,
    pub strategy: ExtractionStrategy,
    pub processing_order: ProcessingOrder,
    /// Process only the upper triangle when the matrix is symmetric.
    pub exploit_symmetry: bool,
    /// Keep the full recurrence matrix in the output.
    pub retain_matrix: bool,
    pub substrate: SubstrateConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            memory_budget_bytes: DEFAULT_MEMORY_BUDGET_BYTES,
            max_edge_length: DEFAULT_EDGE_LENGTH,
            encoding: None,
            strategy: ExtractionStrategy::default(),
            processing_order: ProcessingOrder::default(),
            exploit_symmetry: true,
            retain_matrix: false,
            substrate: SubstrateConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Encoding actually used for materialized tiles.
    pub fn resolve_encoding(&self) -> MatrixEncoding {
        match self.encoding {
            Some(encoding) => encoding,
            None if self.retain_matrix => MatrixEncoding::Byte,
            None => MatrixEncoding::Bit,
        }
    }

    /// Validate engine parameters.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidConfig` if:
    /// - the memory budget is zero or exceeds device memory
    /// - the edge length cap is outside `1..=65535`
    /// - matrix retention is combined with fused extraction
    /// - the substrate section is invalid
    pub fn validate(&self) -> CoreResult<()> {
        self.substrate.validate()?;
        if self.memory_budget_bytes == 0 {
            return Err(CoreError::invalid_config(
                "engine.memory_budget_bytes",
                self.memory_budget_bytes,
                "memory budget must be greater than 0",
            ));
        }
        if self.memory_budget_bytes > self.substrate.device_memory_bytes {
            return Err(CoreError::invalid_config(
                "engine.memory_budget_bytes",
                self.memory_budget_bytes,
                format!(
                    "memory budget exceeds device memory of {} bytes",
                    self.substrate.device_memory_bytes
                ),
            ));
        }
        if self.max_edge_length == 0 || self.max_edge_length > EDGE_LENGTH_CEILING {
            return Err(CoreError::invalid_config(
                "engine.max_edge_length",
                self.max_edge_length,
                format!("edge length must be within 1..={EDGE_LENGTH_CEILING}"),
            ));
        }
        if self.retain_matrix && self.strategy == ExtractionStrategy::Fused {
            return Err(CoreError::invalid_config(
                "engine.retain_matrix",
                self.retain_matrix,
                "fused extraction never materializes the matrix",
            ));
        }
        Ok(())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            include_location: false,
        }
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> CoreResult<()> {
        const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
        const FORMATS: [&str; 2] = ["pretty", "compact"];

        if !LEVELS.contains(&self.level.to_ascii_lowercase().as_str()) {
            return Err(CoreError::invalid_config(
                "logging.level",
                &self.level,
                format!("level must be one of {LEVELS:?}"),
            ));
        }
        if !FORMATS.contains(&self.format.as_str()) {
            return Err(CoreError::invalid_config(
                "logging.format",
                &self.format,
                format!("format must be one of {FORMATS:?}"),
            ));
        }
        Ok(())
    }
}
