//! Layered configuration for RQA computations.

pub mod constants;
mod sub_configs;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{CoreError, CoreResult};
use crate::settings::AnalysisSettings;

pub use sub_configs::{
    EngineConfig, ExtractionStrategy, LoggingConfig, MatrixEncoding, ProcessingOrder,
    SubstrateConfig,
};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RqaConfig {
    #[serde(default)]
    pub analysis: AnalysisSettings,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl RqaConfig {
    /// Load configuration from files and environment.
    ///
    /// Configuration is loaded in order:
    /// 1. config/default.toml (optional)
    /// 2. Environment variables with the RQA prefix. Prefix, section and key
    ///    are all separated by `__` (e.g. `RQA__ENGINE__MEMORY_BUDGET_BYTES`).
    ///    Variables starting with a single `RQA_` are ignored.
    pub fn load() -> CoreResult<Self> {
        if !Path::new(constants::DEFAULT_CONFIG_FILE).exists() {
            debug!(
                path = constants::DEFAULT_CONFIG_FILE,
                "No default config file, using built-in defaults"
            );
        }
        log_env_overrides();

        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(
                config::Environment::with_prefix(constants::ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            );

        let config: RqaConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CoreError::ConfigError(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let config: RqaConfig = toml::from_str(&content)
            .map_err(|e| CoreError::ConfigError(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;
        debug!(path = %path.display(), "Configuration file loaded");
        Ok(config)
    }

    /// Validate every section.
    pub fn validate(&self) -> CoreResult<()> {
        self.analysis.validate()?;
        self.engine.validate()?;
        self.logging.validate()
    }
}

/// Report the environment variables `load` applies, and the ones it skips
/// because they use a single underscore after the prefix.
fn log_env_overrides() {
    let applied = format!("{}__", constants::ENV_PREFIX);
    let misspelled = format!("{}_", constants::ENV_PREFIX);
    for (key, _) in std::env::vars_os() {
        let Some(key) = key.to_str() else {
            continue;
        };
        if key.starts_with(&applied) {
            debug!(key, "Environment override applied");
        } else if key.starts_with(&misspelled) {
            warn!(
                key,
                expected = %applied,
                "Environment variable ignored, a double underscore must follow the prefix"
            );
        }
    }
}
