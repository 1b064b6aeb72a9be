//! Engine error types.
//!
//! Every error aborts the whole computation: a tile that fails leaves
//! carryover state that no later tile can repair, so there is no partial
//! result and nothing is retried.

use rqa_core::{CoreError, ErrorCategory};
use thiserror::Error;

/// Errors raised while scheduling tiles or running kernels.
#[derive(Debug, Error)]
pub enum ComputeError {
    /// Settings, configuration or input data were rejected
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The memory budget cannot hold even a single-cell tile
    #[error("Memory budget of {budget} bytes is too small: one {edge}x{edge} tile needs {required} bytes")]
    BudgetTooSmall {
        /// Configured budget
        budget: u64,
        /// Edge length of the smallest tile tried
        edge: usize,
        /// Bytes that tile needs
        required: u64,
    },

    /// The compute backend could not be brought up
    #[error("Compute substrate unavailable: {0}")]
    NoDevice(String),

    /// A buffer would exceed device memory
    #[error("Allocation of {requested} bytes for '{label}' exceeds device memory ({in_use} of {capacity} bytes in use)")]
    AllocationFailed {
        /// Buffer label
        label: String,
        /// Requested bytes
        requested: u64,
        /// Bytes already allocated
        in_use: u64,
        /// Device capacity
        capacity: u64,
    },

    /// A kernel launch failed or a parallel unit panicked
    #[error("Kernel '{kernel}' failed: {message}")]
    KernelFailed {
        /// Kernel name
        kernel: String,
        /// Failure description
        message: String,
    },

    /// A tile was dispatched before a predecessor sharing its carryover
    #[error("Tile ({px}, {py}) dispatched before its {axis} predecessor ({pred_x}, {pred_y}) completed")]
    OrderingViolation {
        /// Column partition of the tile
        px: usize,
        /// Row partition of the tile
        py: usize,
        /// Column partition of the missing predecessor
        pred_x: usize,
        /// Row partition of the missing predecessor
        pred_y: usize,
        /// Carryover axis the two tiles share
        axis: &'static str,
    },
}

/// Result type for engine operations.
pub type ComputeResult<T> = Result<T, ComputeError>;

impl ComputeError {
    /// Create a kernel failure error.
    pub fn kernel_failed(kernel: impl Into<String>, message: impl Into<String>) -> Self {
        ComputeError::KernelFailed {
            kernel: kernel.into(),
            message: message.into(),
        }
    }

    /// Category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            ComputeError::Core(err) => err.category(),
            ComputeError::BudgetTooSmall { .. } => ErrorCategory::Configuration,
            ComputeError::NoDevice(_)
            | ComputeError::AllocationFailed { .. }
            | ComputeError::KernelFailed { .. }
            | ComputeError::OrderingViolation { .. } => ErrorCategory::Substrate,
        }
    }

    /// Check if this error stems from configuration.
    pub fn is_configuration_error(&self) -> bool {
        self.category() == ErrorCategory::Configuration
    }

    /// Check if this error stems from the compute substrate.
    pub fn is_substrate_error(&self) -> bool {
        self.category() == ErrorCategory::Substrate
    }

    /// Check if this error stems from the input data.
    pub fn is_data_error(&self) -> bool {
        self.category() == ErrorCategory::Data
    }
}
