//! Tiling Benchmark Binary
//!
//! Runs the engine over a synthetic series at several tile edge lengths and
//! reports per-phase timings.
//!
//! Usage:
//!   tiling-bench [OPTIONS]
//!
//! Options:
//!   --length <N>         Samples in the synthetic series, default: 2000
//!   --edges <LIST>       Comma separated tile edge caps, default: 64,256,1024
//!   --seed <N>           Generator seed, default: 42
//!   --config <PATH>      TOML configuration file
//!   --verify             Compare every run against the sequential baseline
//!   --output <PATH>      Write results as JSON

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rqa_compute::baseline::baseline_distributions;
use rqa_compute::RqaEngine;
use rqa_core::{LoggingConfig, Neighbourhood, RqaConfig, RqaSummary};

#[derive(Parser, Debug)]
#[command(name = "tiling-bench")]
#[command(about = "Tile edge length benchmark for the RQA engine")]
struct Args {
    /// Samples in the synthetic series.
    #[arg(long, default_value_t = 2000)]
    length: usize,

    /// Tile edge caps to compare.
    #[arg(long, value_delimiter = ',', default_value = "64,256,1024")]
    edges: Vec<usize>,

    /// Seed for the noise generator.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Override the embedding dimension.
    #[arg(long)]
    dimension: Option<usize>,

    /// Override the time delay.
    #[arg(long)]
    delay: Option<usize>,

    /// Override the neighbourhood with a fixed radius.
    #[arg(long)]
    radius: Option<f32>,

    /// TOML configuration file. Without it, config/default.toml and RQA__*
    /// environment variables are used.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Compare every run against the sequential baseline.
    #[arg(long)]
    verify: bool,

    /// Path to save JSON output.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct BenchRecord {
    edge_cap: usize,
    edge_length: usize,
    tiles: usize,
    create_matrix_ms: f64,
    vertical_ms: f64,
    diagonal_ms: f64,
    transfer_ms: f64,
    total_ms: f64,
    recurrence_rate: f64,
    determinism: f64,
    laminarity: f64,
    verified: Option<bool>,
}

fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = config.level.to_lowercase();
        EnvFilter::new(format!("rqa_compute={level},rqa_core={level},tiling_bench={level}"))
    });
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_file(config.include_location)
        .with_line_number(config.include_location);
    match config.format.as_str() {
        "compact" => builder.compact().init(),
        _ => builder.pretty().init(),
    }
}

/// Noisy sine wave.
fn synthetic_series(length: usize, seed: u64) -> Vec<f32> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..length)
        .map(|t| (t as f32 * 0.07).sin() + 0.2 * rng.gen_range(-1.0f32..1.0))
        .collect()
}

fn ms(duration: std::time::Duration) -> f64 {
    duration.as_secs_f64() * 1e3
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => RqaConfig::from_file(path)?,
        None => RqaConfig::load()?,
    };
    if let Some(dimension) = args.dimension {
        config.analysis.embedding_dimension = dimension;
    }
    if let Some(delay) = args.delay {
        config.analysis.time_delay = delay;
    }
    if let Some(radius) = args.radius {
        config.analysis.neighbourhood = Neighbourhood::fixed_radius(radius);
    }
    config.validate()?;
    init_logging(&config.logging);

    if args.edges.is_empty() {
        bail!("at least one edge length is required");
    }

    let series = synthetic_series(args.length, args.seed);
    let embedding = config
        .analysis
        .embed(&series)
        .context("series too short for the embedding")?;
    info!(
        vectors = embedding.number_of_vectors(),
        seed = args.seed,
        "Synthetic series ready"
    );

    let expected = if args.verify {
        Some(baseline_distributions(&embedding, &config.analysis)?)
    } else {
        None
    };

    println!("=== RQA Tiling Benchmark ===");
    println!("{}", config.analysis);
    println!(
        "{:>8} {:>8} {:>8} {:>10} {:>10} {:>10} {:>10}",
        "cap", "edge", "tiles", "matrix ms", "vert ms", "diag ms", "total ms"
    );

    let mut records = Vec::with_capacity(args.edges.len());
    for &edge_cap in &args.edges {
        let mut engine_config = config.engine.clone();
        engine_config.max_edge_length = edge_cap;
        let engine = RqaEngine::new(engine_config)?;
        let output = engine.run(&embedding, &config.analysis)?;

        let verified = expected
            .as_ref()
            .map(|expected| expected == &output.distributions);
        if verified == Some(false) {
            bail!("edge cap {edge_cap}: distributions differ from the baseline");
        }

        let runtimes = output.runtimes;
        let summary = RqaSummary::new(
            config.analysis.line_thresholds(),
            output.distributions,
            runtimes,
        )?;
        println!(
            "{:>8} {:>8} {:>8} {:>10.2} {:>10.2} {:>10.2} {:>10.2}",
            edge_cap,
            output.edge_length,
            output.tiles,
            ms(runtimes.create_matrix),
            ms(runtimes.detect_vertical_lines),
            ms(runtimes.detect_diagonal_lines),
            ms(runtimes.total()),
        );

        records.push(BenchRecord {
            edge_cap,
            edge_length: output.edge_length,
            tiles: output.tiles,
            create_matrix_ms: ms(runtimes.create_matrix),
            vertical_ms: ms(runtimes.detect_vertical_lines),
            diagonal_ms: ms(runtimes.detect_diagonal_lines),
            transfer_ms: ms(runtimes.transfer_to_device + runtimes.transfer_from_device),
            total_ms: ms(runtimes.total()),
            recurrence_rate: summary.recurrence_rate(),
            determinism: summary.determinism(),
            laminarity: summary.laminarity(),
            verified,
        });
    }

    if let Some(path) = &args.output {
        let json = serde_json::to_string_pretty(&records)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Results written to {}", path.display());
    }

    Ok(())
}
