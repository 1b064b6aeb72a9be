//! Core error types.
//!
//! Every failure in the RQA pipeline falls into one of three categories
//! (see [`ErrorCategory`]): bad configuration, an unusable compute substrate,
//! or input data that cannot be analysed. Core errors only ever report the
//! configuration and data categories; substrate failures originate in
//! `rqa-compute`.

use thiserror::Error;

/// Coarse classification shared by all RQA error types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Parameters that can never produce a valid computation.
    Configuration,
    /// The compute backend is unavailable or failed.
    Substrate,
    /// The input series or vectors cannot be analysed with the given parameters.
    Data,
}

/// Errors raised while validating settings, loading configuration, or
/// preparing input data.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A parameter failed validation
    #[error("Invalid configuration '{field}': {value}. {reason}")]
    InvalidConfig {
        /// Dotted path of the offending field
        field: String,
        /// Offending value rendered as a string
        value: String,
        /// Reason for invalidity
        reason: String,
    },

    /// Configuration could not be read or parsed
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The series is shorter than the embedding window
    #[error("Time series too short: {length} samples, embedding requires at least {required}")]
    SeriesTooShort {
        /// Number of samples provided
        length: usize,
        /// Minimum number of samples for one embedding vector
        required: usize,
    },

    /// A flat vector buffer does not divide into whole vectors
    #[error("Vector buffer of {length} values is not a multiple of dimension {dimension}")]
    RaggedVectors {
        /// Length of the flat buffer
        length: usize,
        /// Expected vector dimension
        dimension: usize,
    },

    /// Embedded vectors disagree with the configured embedding dimension
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension from the analysis settings
        expected: usize,
        /// Dimension of the provided vectors
        actual: usize,
    },

    /// Empty input provided
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::SerializationError(err.to_string())
    }
}

impl From<config::ConfigError> for CoreError {
    fn from(err: config::ConfigError) -> Self {
        CoreError::ConfigError(err.to_string())
    }
}

impl CoreError {
    /// Create an invalid configuration error.
    pub fn invalid_config(
        field: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        CoreError::InvalidConfig {
            field: field.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            CoreError::InvalidConfig { .. } | CoreError::ConfigError(_) => {
                ErrorCategory::Configuration
            }
            CoreError::SeriesTooShort { .. }
            | CoreError::RaggedVectors { .. }
            | CoreError::DimensionMismatch { .. }
            | CoreError::EmptyInput(_)
            | CoreError::SerializationError(_) => ErrorCategory::Data,
        }
    }

    /// Check if this error stems from configuration.
    pub fn is_configuration_error(&self) -> bool {
        self.category() == ErrorCategory::Configuration
    }

    /// Check if this error stems from the input data.
    pub fn is_data_error(&self) -> bool {
        self.category() == ErrorCategory::Data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_message() {
        let err = CoreError::invalid_config("analysis.time_delay", 0, "must be at least 1");
        let msg = err.to_string();
        assert!(msg.contains("analysis.time_delay"));
        assert!(msg.contains("must be at least 1"));
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_series_too_short_is_data_error() {
        let err = CoreError::SeriesTooShort {
            length: 3,
            required: 5,
        };
        assert_eq!(err.category(), ErrorCategory::Data);
        assert!(err.to_string().contains("3 samples"));
    }

    #[test]
    fn test_config_error_conversion() {
        let err: CoreError = config::ConfigError::Message("bad key".into()).into();
        assert!(matches!(err, CoreError::ConfigError(_)));
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_serde_error_conversion() {
        let parse: Result<u32, _> = serde_json::from_str("not json");
        let err: CoreError = parse.unwrap_err().into();
        assert!(matches!(err, CoreError::SerializationError(_)));
        assert!(err.is_data_error());
    }
}
