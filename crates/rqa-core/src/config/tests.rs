//! Tests for configuration defaults, parsing and validation.

use std::io::Write;

use super::constants::{DEFAULT_EDGE_LENGTH, DEFAULT_MEMORY_BUDGET_BYTES, EDGE_LENGTH_CEILING};
use super::*;
use crate::metric::Metric;
use crate::neighbourhood::Neighbourhood;

#[test]
fn test_default_config_is_valid() {
    let config = RqaConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.engine.memory_budget_bytes, DEFAULT_MEMORY_BUDGET_BYTES);
    assert_eq!(config.engine.max_edge_length, DEFAULT_EDGE_LENGTH);
    assert_eq!(config.engine.strategy, ExtractionStrategy::Materialized);
    assert_eq!(config.engine.processing_order, ProcessingOrder::RowMajor);
    assert!(config.engine.exploit_symmetry);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_resolve_encoding() {
    let mut engine = EngineConfig::default();
    assert_eq!(engine.resolve_encoding(), MatrixEncoding::Bit);
    engine.retain_matrix = true;
    assert_eq!(engine.resolve_encoding(), MatrixEncoding::Byte);
    engine.encoding = Some(MatrixEncoding::Bit);
    assert_eq!(engine.resolve_encoding(), MatrixEncoding::Bit);
}

#[test]
fn test_engine_validation_failures() {
    let zero_budget = EngineConfig {
        memory_budget_bytes: 0,
        ..EngineConfig::default()
    };
    assert!(zero_budget.validate().is_err());

    let oversized_edge = EngineConfig {
        max_edge_length: EDGE_LENGTH_CEILING + 1,
        ..EngineConfig::default()
    };
    let err = oversized_edge.validate().unwrap_err();
    assert!(err.to_string().contains("engine.max_edge_length"));

    let over_device = EngineConfig {
        memory_budget_bytes: 2048,
        substrate: SubstrateConfig {
            worker_threads: 1,
            device_memory_bytes: 1024,
        },
        ..EngineConfig::default()
    };
    assert!(over_device.validate().is_err());

    let fused_retained = EngineConfig {
        strategy: ExtractionStrategy::Fused,
        retain_matrix: true,
        ..EngineConfig::default()
    };
    assert!(fused_retained.validate().unwrap_err().is_configuration_error());

    let too_many_workers = EngineConfig {
        substrate: SubstrateConfig {
            worker_threads: 1 << 20,
            ..SubstrateConfig::default()
        },
        ..EngineConfig::default()
    };
    let err = too_many_workers.validate().unwrap_err();
    assert!(err.to_string().contains("engine.substrate.worker_threads"));
}

#[test]
fn test_logging_validation() {
    let mut logging = LoggingConfig::default();
    assert!(logging.validate().is_ok());
    logging.level = "DEBUG".into();
    assert!(logging.validate().is_ok());
    logging.level = "verbose".into();
    assert!(logging.validate().is_err());
    logging.level = "info".into();
    logging.format = "xml".into();
    assert!(logging.validate().is_err());
}

#[test]
fn test_from_file_parses_sections() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[analysis]
embedding_dimension = 3
time_delay = 1
metric = "maximum"
theiler_corrector = 0

[analysis.neighbourhood]
kind = "radius_corridor"
inner_radius = 0.2
outer_radius = 0.9

[engine]
memory_budget_bytes = 65536
max_edge_length = 128
encoding = "byte"
strategy = "fused"
processing_order = "wavefront"

[engine.substrate]
worker_threads = 2

[logging]
level = "debug"
"#
    )
    .unwrap();

    let config = RqaConfig::from_file(file.path()).unwrap();
    assert_eq!(config.analysis.embedding_dimension, 3);
    assert_eq!(config.analysis.metric, Metric::Maximum);
    assert_eq!(config.analysis.theiler_corrector, 0);
    assert_eq!(
        config.analysis.neighbourhood,
        Neighbourhood::radius_corridor(0.2, 0.9)
    );
    assert_eq!(config.analysis.min_diagonal_line_length, 2);
    assert_eq!(config.engine.memory_budget_bytes, 65536);
    assert_eq!(config.engine.encoding, Some(MatrixEncoding::Byte));
    assert_eq!(config.engine.strategy, ExtractionStrategy::Fused);
    assert_eq!(config.engine.processing_order, ProcessingOrder::Wavefront);
    assert_eq!(config.engine.substrate.worker_threads, 2);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, "pretty");
}

#[test]
fn test_from_file_rejects_invalid_values() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[analysis]\nmin_diagonal_line_length = 0").unwrap();
    let err = RqaConfig::from_file(file.path()).unwrap_err();
    assert!(err.is_configuration_error());
    assert!(err.to_string().contains("min_diagonal_line_length"));
}

#[test]
fn test_from_file_reports_parse_errors() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[engine]\nmemory_budget_bytes = \"lots\"").unwrap();
    let err = RqaConfig::from_file(file.path()).unwrap_err();
    assert!(matches!(err, CoreError::ConfigError(_)));
}

#[test]
fn test_from_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = RqaConfig::from_file(&dir.path().join("absent.toml")).unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}

#[test]
fn test_round_trip_through_toml() {
    let config = RqaConfig::default();
    let text = toml::to_string(&config).unwrap();
    let parsed: RqaConfig = toml::from_str(&text).unwrap();
    assert_eq!(parsed.analysis, config.analysis);
    assert_eq!(parsed.engine.max_edge_length, config.engine.max_edge_length);
}

// The only test that touches the process environment; keep it that way or
// serialize the others around it.
#[test]
fn test_load_applies_environment_overrides() {
    const EDGE: &str = "RQA__ENGINE__MAX_EDGE_LENGTH";
    const WORKERS: &str = "RQA__ENGINE__SUBSTRATE__WORKER_THREADS";
    const SINGLE_UNDERSCORE: &str = "RQA_ENGINE__MAX_EDGE_LENGTH";

    std::env::set_var(SINGLE_UNDERSCORE, "77");
    let ignored = RqaConfig::load();
    std::env::remove_var(SINGLE_UNDERSCORE);
    assert_eq!(ignored.unwrap().engine.max_edge_length, DEFAULT_EDGE_LENGTH);

    std::env::set_var(EDGE, "77");
    std::env::set_var(WORKERS, "3");
    let applied = RqaConfig::load();
    std::env::remove_var(WORKERS);
    let applied = applied.unwrap();
    assert_eq!(applied.engine.max_edge_length, 77);
    assert_eq!(applied.engine.substrate.worker_threads, 3);

    std::env::set_var(EDGE, "0");
    let rejected = RqaConfig::load();
    std::env::remove_var(EDGE);
    assert!(rejected.unwrap_err().is_configuration_error());
}
