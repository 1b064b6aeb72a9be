//! Golden fixture: an 11-sample series embedded with m = 3, t = 1.
//!
//! Every engine configuration must reproduce the same distributions and
//! measures, whatever the tile size, strategy, encoding or tile order.

use std::io::Write;

use rqa_compute::{RecurrencePlotComputation, RqaComputation, RqaEngine};
use rqa_core::{
    AnalysisSettings, EmbeddedSeries, EngineConfig, ExtractionStrategy, LineDistributions,
    MatrixEncoding, Metric, ProcessingOrder, RqaConfig, RqaSummary, SubstrateConfig,
};

const SERIES: [f32; 11] = [0.1, 0.5, 0.3, 1.7, 0.8, 2.4, 0.6, 1.2, 1.4, 2.1, 0.8];

const EUCLIDEAN_ROWS: [&str; 9] = [
    "100000000",
    "010000100",
    "001010100",
    "000100010",
    "001010001",
    "000001000",
    "011000110",
    "000100110",
    "000010001",
];

fn settings(metric: Metric) -> AnalysisSettings {
    AnalysisSettings {
        embedding_dimension: 3,
        time_delay: 1,
        metric,
        ..AnalysisSettings::default()
    }
}

fn embedding() -> EmbeddedSeries {
    settings(Metric::Euclidean).embed(&SERIES).unwrap()
}

fn expected(metric: Metric) -> LineDistributions {
    use rqa_core::FrequencyDistribution as F;
    match metric {
        Metric::Euclidean => LineDistributions {
            recurrence_points: vec![1, 2, 3, 2, 3, 1, 4, 3, 2],
            diagonal: F::from_counts(vec![6, 0, 2, 0, 0, 0, 0, 0, 0]),
            vertical: F::from_counts(vec![15, 3, 0, 0, 0, 0, 0, 0, 0]),
            white_vertical: F::from_counts(vec![8, 5, 7, 2, 1, 0, 0, 1, 0]),
        },
        Metric::Maximum => LineDistributions {
            recurrence_points: vec![1, 2, 3, 2, 3, 1, 5, 3, 3],
            diagonal: F::from_counts(vec![8, 0, 2, 0, 0, 0, 0, 0, 0]),
            vertical: F::from_counts(vec![16, 2, 1, 0, 0, 0, 0, 0, 0]),
            white_vertical: F::from_counts(vec![9, 5, 6, 2, 1, 0, 0, 1, 0]),
        },
        Metric::Taxicab => LineDistributions {
            recurrence_points: vec![1; 9],
            diagonal: F::from_counts(vec![0; 9]),
            vertical: F::from_counts(vec![9, 0, 0, 0, 0, 0, 0, 0, 0]),
            white_vertical: F::from_counts(vec![2, 2, 2, 2, 2, 2, 2, 2, 0]),
        },
    }
}

fn engine_config(
    edge: usize,
    strategy: ExtractionStrategy,
    encoding: Option<MatrixEncoding>,
    order: ProcessingOrder,
    exploit_symmetry: bool,
) -> EngineConfig {
    EngineConfig {
        max_edge_length: edge,
        strategy,
        encoding,
        processing_order: order,
        exploit_symmetry,
        substrate: SubstrateConfig {
            worker_threads: 3,
            ..SubstrateConfig::default()
        },
        ..EngineConfig::default()
    }
}

fn all_configs() -> Vec<EngineConfig> {
    let mut configs = Vec::new();
    let variants = [
        (ExtractionStrategy::Materialized, Some(MatrixEncoding::Bit)),
        (ExtractionStrategy::Materialized, Some(MatrixEncoding::Byte)),
        (ExtractionStrategy::Fused, None),
    ];
    for edge in [1, 2, 3, 4, 5, 9, 64] {
        for (strategy, encoding) in variants {
            for order in [ProcessingOrder::RowMajor, ProcessingOrder::Wavefront] {
                for exploit_symmetry in [true, false] {
                    configs.push(engine_config(edge, strategy, encoding, order, exploit_symmetry));
                }
            }
        }
    }
    configs
}

fn assert_close(actual: f64, expected: f64, what: &str) {
    assert!(
        (actual - expected).abs() < 1e-12,
        "{what}: expected {expected}, got {actual}"
    );
}

#[test]
fn test_distributions_for_every_metric_and_configuration() {
    let embedding = embedding();
    for metric in [Metric::Euclidean, Metric::Maximum, Metric::Taxicab] {
        let settings = settings(metric);
        let expected = expected(metric);
        for config in all_configs() {
            let described = format!("{metric:?} with {config:?}");
            let engine = RqaEngine::new(config).unwrap();
            let output = engine.run(&embedding, &settings).unwrap();
            assert_eq!(output.distributions, expected, "{described}");
        }
    }
}

#[test]
fn test_euclidean_measures() {
    let summary = RqaComputation::new(
        settings(Metric::Euclidean),
        embedding(),
        engine_config(4, ExtractionStrategy::Materialized, None, ProcessingOrder::RowMajor, true),
    )
    .run()
    .unwrap();

    assert_eq!(summary.number_of_vectors(), 9);
    assert_eq!(summary.number_of_recurrence_points(), 21);
    assert_close(summary.recurrence_rate(), 21.0 / 81.0, "RR");
    assert_close(summary.determinism(), 6.0 / 21.0, "DET");
    assert_close(summary.average_diagonal_line(), 3.0, "L");
    assert_eq!(summary.longest_diagonal_line(), 3);
    assert_close(summary.divergence(), 1.0 / 3.0, "DIV");
    assert_close(summary.entropy_diagonal_lines(), 0.0, "L_entr");
    assert_close(summary.laminarity(), 6.0 / 21.0, "LAM");
    assert_close(summary.trapping_time(), 2.0, "TT");
    assert_eq!(summary.longest_vertical_line(), 2);
    assert_close(summary.entropy_vertical_lines(), 0.0, "V_entr");
    assert_close(summary.average_white_vertical_line(), 3.25, "W");
    assert_eq!(summary.longest_white_vertical_line(), 8);
    assert_close(summary.entropy_white_vertical_lines(), 1.331660286822432, "W_entr");
}

#[test]
fn test_maximum_measures() {
    let summary = RqaComputation::new(
        settings(Metric::Maximum),
        embedding(),
        engine_config(3, ExtractionStrategy::Fused, None, ProcessingOrder::Wavefront, true),
    )
    .run()
    .unwrap();

    assert_close(summary.recurrence_rate(), 23.0 / 81.0, "RR");
    assert_close(summary.determinism(), 6.0 / 23.0, "DET");
    assert_close(summary.average_diagonal_line(), 3.0, "L");
    assert_close(summary.laminarity(), 7.0 / 23.0, "LAM");
    assert_close(summary.trapping_time(), 7.0 / 3.0, "TT");
    assert_eq!(summary.longest_vertical_line(), 3);
    assert_close(summary.entropy_vertical_lines(), 0.6365141682948128, "V_entr");
    assert_close(summary.average_white_vertical_line(), 49.0 / 15.0, "W");
    assert_eq!(summary.longest_white_vertical_line(), 8);
    assert_close(summary.entropy_white_vertical_lines(), 1.3624474851916286, "W_entr");
}

#[test]
fn test_taxicab_measures() {
    let summary = RqaComputation::new(
        settings(Metric::Taxicab),
        embedding(),
        engine_config(2, ExtractionStrategy::Materialized, None, ProcessingOrder::RowMajor, false),
    )
    .run()
    .unwrap();

    assert_close(summary.recurrence_rate(), 9.0 / 81.0, "RR");
    assert_close(summary.determinism(), 0.0, "DET");
    assert_close(summary.average_diagonal_line(), 0.0, "L");
    assert_eq!(summary.longest_diagonal_line(), 0);
    assert_close(summary.divergence(), 0.0, "DIV");
    assert_close(summary.laminarity(), 0.0, "LAM");
    assert_close(summary.trapping_time(), 0.0, "TT");
    assert_eq!(summary.longest_vertical_line(), 1);
    assert_close(summary.average_white_vertical_line(), 5.0, "W");
    assert_eq!(summary.longest_white_vertical_line(), 8);
    assert_close(summary.entropy_white_vertical_lines(), 7f64.ln(), "W_entr");
}

#[test]
fn test_summary_from_series_and_report() {
    let summary = RqaComputation::from_series(
        &SERIES,
        settings(Metric::Euclidean),
        EngineConfig::default(),
    )
    .unwrap()
    .run()
    .unwrap();

    let report = summary.to_string();
    assert!(report.contains("RQA Result:"));
    let json = summary.to_json().unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert!(parsed.is_object());

    let copy = RqaSummary::new(
        summary.thresholds(),
        summary.distributions().clone(),
        *summary.runtimes(),
    )
    .unwrap();
    assert_eq!(copy.measures(), summary.measures());
}

#[test]
fn test_computation_from_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[analysis]
embedding_dimension = 3
time_delay = 1
metric = "maximum"

[engine]
max_edge_length = 2
strategy = "fused"
processing_order = "wavefront"
"#
    )
    .unwrap();

    let config = RqaConfig::from_file(file.path()).unwrap();
    let summary = RqaComputation::from_config(&SERIES, &config)
        .unwrap()
        .run()
        .unwrap();
    assert_eq!(summary.distributions(), &expected(Metric::Maximum));
}

#[test]
fn test_recurrence_plot_from_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[analysis]
embedding_dimension = 3
time_delay = 1

[engine]
max_edge_length = 4
retain_matrix = true
"#
    )
    .unwrap();

    let config = RqaConfig::from_file(file.path()).unwrap();
    let computation = RecurrencePlotComputation::from_config(&SERIES, &config).unwrap();
    assert_eq!(computation.settings(), &config.analysis);
    assert_eq!(computation.embedding().number_of_vectors(), 9);

    let plot = computation.run().unwrap();
    for (y, row) in EUCLIDEAN_ROWS.iter().enumerate() {
        let expected: Vec<u8> = row.bytes().map(|b| b - b'0').collect();
        assert_eq!(plot.row(y), expected.as_slice(), "row {y}");
    }

    let short = RecurrencePlotComputation::from_config(&SERIES[..2], &config).unwrap_err();
    assert!(short.is_data_error());
}

#[test]
fn test_recurrence_plot() {
    for edge in [1, 4, 9] {
        let plot = RecurrencePlotComputation::from_series(
            &SERIES,
            settings(Metric::Euclidean),
            engine_config(edge, ExtractionStrategy::Materialized, None, ProcessingOrder::RowMajor, true),
        )
        .unwrap()
        .run()
        .unwrap();

        assert_eq!(plot.size(), 9);
        for (y, row) in EUCLIDEAN_ROWS.iter().enumerate() {
            let expected: Vec<u8> = row.bytes().map(|b| b - b'0').collect();
            assert_eq!(plot.row(y), expected.as_slice(), "row {y} at edge {edge}");
        }
        assert_eq!(plot.rows_reversed().next(), Some(plot.row(8)));
    }
}

#[test]
fn test_retained_matrix_matches_plot() {
    let engine = RqaEngine::new(EngineConfig {
        retain_matrix: true,
        max_edge_length: 4,
        ..EngineConfig::default()
    })
    .unwrap();
    let output = engine.run(&embedding(), &settings(Metric::Euclidean)).unwrap();
    let matrix = output.matrix.unwrap();
    assert_eq!(matrix.column_counts(), expected(Metric::Euclidean).recurrence_points);
    assert_eq!(matrix, engine.build_matrix(&embedding(), &settings(Metric::Euclidean)).unwrap());
}
