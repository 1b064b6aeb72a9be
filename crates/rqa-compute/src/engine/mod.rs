//! Tiled RQA engine.
//!
//! # Run Phases
//!
//! ```text
//! validate -> size tiles -> allocate carry -> rank neighbours (FAN only)
//!          -> for each tile in order:
//!               check ledger, upload vectors,
//!               build matrix (materialized), vertical sweep (+ mirrored sweep),
//!               diagonal sweep, absorb histograms, mark complete
//!          -> flush carry, download
//! ```
//!
//! Tiles run one after another; parallelism lives inside each kernel.

mod computation;

pub use computation::{RecurrencePlotComputation, RqaComputation};

use std::time::Instant;

use rqa_core::{
    AnalysisSettings, CoreError, EmbeddedSeries, EngineConfig, ExtractionStrategy,
    LineDistributions, MatrixEncoding, Neighbourhood, RecurrenceMatrix, Runtimes,
};
use tracing::{debug, error, info, instrument};

use crate::aggregate::HistogramAggregator;
use crate::error::ComputeResult;
use crate::kernels::{
    asymmetric_window, bound_bytes, build_by_cell, build_by_column, rank_neighbours, sweep_columns,
    sweep_diagonals, sweep_diagonals_symmetric, symmetric_window, CellSource, DiagonalFamily,
    InlineCells, NeighbourBound, RecordingCells, RecurrenceTest, TileMatrix, TileVectors,
    Transposed,
};
use crate::substrate::{ComputeSubstrate, CpuSubstrate, DeviceBuffer};
use crate::tiling::{DependencyLedger, Tile, TileScheduler};

/// Result of one engine run.
#[derive(Debug, Clone)]
pub struct EngineOutput {
    pub distributions: LineDistributions,
    /// Full matrix, present when retention was requested.
    pub matrix: Option<RecurrenceMatrix>,
    pub runtimes: Runtimes,
    /// Tiles processed.
    pub tiles: usize,
    /// Edge length the scheduler settled on.
    pub edge_length: usize,
}

/// Per-run state shared by all tiles.
struct RunContext<'a> {
    embedding: &'a EmbeddedSeries,
    test: RecurrenceTest<'a>,
    symmetric: bool,
    theiler: usize,
}

/// Computes line distributions tile by tile on a [`ComputeSubstrate`].
///
/// # Example
///
/// ```
/// use rqa_compute::RqaEngine;
/// use rqa_core::{AnalysisSettings, EngineConfig};
///
/// let settings = AnalysisSettings {
///     embedding_dimension: 3,
///     time_delay: 1,
///     ..AnalysisSettings::default()
/// };
/// let series = [0.1, 0.5, 0.3, 1.7, 0.8, 2.4, 0.6, 1.2, 1.4, 2.1, 0.8];
/// let embedding = settings.embed(&series).unwrap();
///
/// let engine = RqaEngine::new(EngineConfig::default()).unwrap();
/// let output = engine.run(&embedding, &settings).unwrap();
/// assert_eq!(output.distributions.number_of_recurrence_points(), 21);
/// ```
#[derive(Debug)]
pub struct RqaEngine<S: ComputeSubstrate = CpuSubstrate> {
    config: EngineConfig,
    substrate: S,
}

impl RqaEngine<CpuSubstrate> {
    /// Engine on a fresh CPU substrate.
    ///
    /// # Errors
    ///
    /// - `CoreError::InvalidConfig` if the configuration is rejected
    /// - `ComputeError::NoDevice` if the worker pool cannot start
    pub fn new(config: EngineConfig) -> ComputeResult<Self> {
        config.validate()?;
        let substrate = CpuSubstrate::new(&config.substrate)?;
        Ok(Self { config, substrate })
    }
}

impl<S: ComputeSubstrate> RqaEngine<S> {
    /// Engine on a caller-provided substrate.
    pub fn with_substrate(config: EngineConfig, substrate: S) -> ComputeResult<Self> {
        config.validate()?;
        Ok(Self { config, substrate })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn substrate(&self) -> &S {
        &self.substrate
    }

    /// Compute the line distributions of `embedding` under `settings`.
    ///
    /// # Errors
    ///
    /// Any configuration, substrate or data error aborts the run; no partial
    /// result is returned.
    #[instrument(skip(self, embedding, settings), fields(vectors = embedding.number_of_vectors()))]
    pub fn run(
        &self,
        embedding: &EmbeddedSeries,
        settings: &AnalysisSettings,
    ) -> ComputeResult<EngineOutput> {
        self.execute(embedding, settings).map_err(|e| {
            error!(error = %e, category = ?e.category(), "RQA run failed");
            e
        })
    }

    /// Compute the full recurrence matrix without extracting lines.
    #[instrument(skip(self, embedding, settings), fields(vectors = embedding.number_of_vectors()))]
    pub fn build_matrix(
        &self,
        embedding: &EmbeddedSeries,
        settings: &AnalysisSettings,
    ) -> ComputeResult<RecurrenceMatrix> {
        self.assemble_matrix(embedding, settings).map_err(|e| {
            error!(error = %e, category = ?e.category(), "Recurrence plot failed");
            e
        })
    }

    fn execute(
        &self,
        embedding: &EmbeddedSeries,
        settings: &AnalysisSettings,
    ) -> ComputeResult<EngineOutput> {
        self.check_inputs(embedding, settings)?;
        let vectors = embedding.number_of_vectors();
        let symmetric = self.is_symmetric(settings);
        let encoding = match self.config.strategy {
            ExtractionStrategy::Materialized => Some(self.config.resolve_encoding()),
            ExtractionStrategy::Fused => None,
        };

        let resident =
            HistogramAggregator::carry_bytes(vectors, symmetric) + ranking_bytes(settings, vectors);
        let scheduler = TileScheduler::plan(
            vectors,
            embedding.dimension(),
            encoding,
            self.tile_budget(resident),
            self.config.max_edge_length,
        )?;
        let tiles = scheduler.tiles(symmetric, self.config.processing_order);
        info!(
            vectors,
            tiles = tiles.len(),
            edge = scheduler.edge_length(),
            symmetric,
            strategy = ?self.config.strategy,
            encoding = ?encoding,
            device = self.substrate.device_name(),
            "Starting RQA run"
        );

        let mut runtimes = Runtimes::default();
        let bounds = self.rank(embedding, settings, &mut runtimes)?;
        let context = RunContext {
            embedding,
            test: RecurrenceTest::new(settings, bounds.as_deref())?,
            symmetric,
            theiler: settings.theiler_corrector,
        };

        let mut aggregator = HistogramAggregator::new(&self.substrate, vectors, symmetric)?;
        let mut ledger = DependencyLedger::new(scheduler.partitions(), symmetric);
        let mut retained = self
            .config
            .retain_matrix
            .then(|| RecurrenceMatrix::new(vectors));

        for tile in &tiles {
            ledger.check_ready(tile)?;
            runtimes += self.process_tile(&context, tile, encoding, &mut aggregator, retained.as_mut())?;
            ledger.mark_complete(tile);
        }
        ledger.ensure_complete()?;
        self.substrate.synchronize()?;

        let started = Instant::now();
        let distributions = aggregator.finish(&self.substrate)?;
        runtimes.transfer_from_device += started.elapsed();

        info!(
            recurrence_points = distributions.number_of_recurrence_points(),
            elapsed_ms = runtimes.total().as_millis() as u64,
            "RQA run complete"
        );

        Ok(EngineOutput {
            distributions,
            matrix: retained,
            runtimes,
            tiles: tiles.len(),
            edge_length: scheduler.edge_length(),
        })
    }

    #[instrument(skip_all, level = "debug", fields(px = tile.px, py = tile.py))]
    fn process_tile(
        &self,
        context: &RunContext<'_>,
        tile: &Tile,
        encoding: Option<MatrixEncoding>,
        aggregator: &mut HistogramAggregator,
        retained: Option<&mut RecurrenceMatrix>,
    ) -> ComputeResult<Runtimes> {
        let mut runtimes = Runtimes::default();

        let started = Instant::now();
        let (columns, rows) = self.upload_vectors(context.embedding, tile)?;
        runtimes.transfer_to_device = started.elapsed();

        let vectors = TileVectors::new(&columns, &rows, context.embedding.dimension());
        let inline = InlineCells::new(vectors, &context.test, tile.start_x, tile.start_y);
        let mirror = context.symmetric && !tile.is_diagonal_block();

        match encoding {
            None => {
                let started = Instant::now();
                self.sweep_vertical(&inline, tile.start_x, aggregator)?;
                if mirror {
                    self.sweep_vertical(&Transposed(&inline), tile.start_y, aggregator)?;
                }
                runtimes.detect_vertical_lines = started.elapsed();

                let started = Instant::now();
                self.sweep_diagonal(&inline, tile, context, aggregator)?;
                runtimes.detect_diagonal_lines = started.elapsed();
            }
            Some(encoding) => {
                let matrix = TileMatrix::allocate(&self.substrate, encoding, tile.dim_x, tile.dim_y)?;

                let started = Instant::now();
                if matrix.is_packed() {
                    build_by_cell(&self.substrate, &inline, &matrix)?;
                    runtimes.create_matrix = started.elapsed();

                    let started = Instant::now();
                    self.sweep_vertical(&matrix, tile.start_x, aggregator)?;
                    runtimes.detect_vertical_lines = started.elapsed();
                } else {
                    // the byte matrix is filled while its columns are swept
                    let recording = RecordingCells::new(inline, &matrix);
                    self.sweep_vertical(&recording, tile.start_x, aggregator)?;
                    runtimes.detect_vertical_lines = started.elapsed();
                }

                if mirror {
                    let started = Instant::now();
                    self.sweep_vertical(&Transposed(&matrix), tile.start_y, aggregator)?;
                    runtimes.detect_vertical_lines += started.elapsed();
                }

                let started = Instant::now();
                self.sweep_diagonal(&matrix, tile, context, aggregator)?;
                runtimes.detect_diagonal_lines = started.elapsed();

                if let Some(retained) = retained {
                    let started = Instant::now();
                    copy_tile(&matrix, tile, mirror, retained);
                    runtimes.transfer_from_device = started.elapsed();
                }
            }
        }

        debug!(
            start_x = tile.start_x,
            start_y = tile.start_y,
            dim_x = tile.dim_x,
            dim_y = tile.dim_y,
            mirror,
            elapsed_us = runtimes.total().as_micros() as u64,
            "Tile processed"
        );
        Ok(runtimes)
    }

    fn assemble_matrix(
        &self,
        embedding: &EmbeddedSeries,
        settings: &AnalysisSettings,
    ) -> ComputeResult<RecurrenceMatrix> {
        self.check_inputs(embedding, settings)?;
        let vectors = embedding.number_of_vectors();
        let symmetric = self.is_symmetric(settings);
        let scheduler = TileScheduler::plan(
            vectors,
            embedding.dimension(),
            Some(MatrixEncoding::Byte),
            self.tile_budget(ranking_bytes(settings, vectors)),
            self.config.max_edge_length,
        )?;
        let tiles = scheduler.tiles(symmetric, self.config.processing_order);
        info!(
            vectors,
            tiles = tiles.len(),
            edge = scheduler.edge_length(),
            symmetric,
            "Building recurrence plot"
        );

        let mut runtimes = Runtimes::default();
        let bounds = self.rank(embedding, settings, &mut runtimes)?;
        let test = RecurrenceTest::new(settings, bounds.as_deref())?;
        let mut plot = RecurrenceMatrix::new(vectors);

        for tile in &tiles {
            let (columns, rows) = self.upload_vectors(embedding, tile)?;
            let vectors = TileVectors::new(&columns, &rows, embedding.dimension());
            let inline = InlineCells::new(vectors, &test, tile.start_x, tile.start_y);
            let matrix =
                TileMatrix::allocate(&self.substrate, MatrixEncoding::Byte, tile.dim_x, tile.dim_y)?;
            build_by_column(&self.substrate, &inline, &matrix)?;
            copy_tile(&matrix, tile, symmetric && !tile.is_diagonal_block(), &mut plot);
        }
        self.substrate.synchronize()?;

        info!(recurrence_points = plot.recurrence_count(), "Recurrence plot complete");
        Ok(plot)
    }

    fn check_inputs(
        &self,
        embedding: &EmbeddedSeries,
        settings: &AnalysisSettings,
    ) -> ComputeResult<()> {
        settings.validate()?;
        if settings.embedding_dimension != embedding.dimension() {
            return Err(CoreError::DimensionMismatch {
                expected: settings.embedding_dimension,
                actual: embedding.dimension(),
            }
            .into());
        }
        if embedding.number_of_vectors() == 0 {
            return Err(CoreError::EmptyInput("embedding holds no vectors".into()).into());
        }
        Ok(())
    }

    /// Tile budget once `resident` bytes of run-long buffers are held on
    /// the device.
    fn tile_budget(&self, resident: u64) -> u64 {
        let free = self
            .substrate
            .memory_capacity()
            .saturating_sub(self.substrate.memory_in_use())
            .saturating_sub(resident);
        let budget = self.config.memory_budget_bytes.min(free);
        if budget < self.config.memory_budget_bytes {
            debug!(
                resident,
                free,
                requested = self.config.memory_budget_bytes,
                "Run-long buffers shrink the tile budget"
            );
        }
        budget
    }

    fn is_symmetric(&self, settings: &AnalysisSettings) -> bool {
        settings.is_matrix_symmetric() && self.config.exploit_symmetry
    }

    /// Neighbour-ranking pre-pass for fixed amount neighbourhoods.
    fn rank(
        &self,
        embedding: &EmbeddedSeries,
        settings: &AnalysisSettings,
        runtimes: &mut Runtimes,
    ) -> ComputeResult<Option<DeviceBuffer<NeighbourBound>>> {
        let Neighbourhood::FixedAmount { k } = settings.neighbourhood else {
            return Ok(None);
        };
        let started = Instant::now();
        let bounds = rank_neighbours(&self.substrate, embedding, settings.metric, k)?;
        runtimes.create_matrix += started.elapsed();
        debug!(k, "Neighbour bounds ranked");
        Ok(Some(bounds))
    }

    fn upload_vectors(
        &self,
        embedding: &EmbeddedSeries,
        tile: &Tile,
    ) -> ComputeResult<(DeviceBuffer<f32>, DeviceBuffer<f32>)> {
        let columns = self
            .substrate
            .upload("column_vectors", embedding.vectors(tile.start_x, tile.dim_x))?;
        let rows = self
            .substrate
            .upload("row_vectors", embedding.vectors(tile.start_y, tile.dim_y))?;
        Ok((columns, rows))
    }

    fn sweep_vertical<C: CellSource>(
        &self,
        source: &C,
        first_column: usize,
        aggregator: &mut HistogramAggregator,
    ) -> ComputeResult<()> {
        let carry = aggregator.column_window(first_column, source.dim_x())?;
        let counts = sweep_columns(&self.substrate, source, carry)?;
        aggregator.absorb_vertical(&counts);
        Ok(())
    }

    fn sweep_diagonal<C: CellSource>(
        &self,
        source: &C,
        tile: &Tile,
        context: &RunContext<'_>,
        aggregator: &mut HistogramAggregator,
    ) -> ComputeResult<()> {
        if !context.symmetric {
            let window = asymmetric_window(context.embedding.number_of_vectors(), tile);
            let carry = aggregator.diagonal_carry(window)?;
            let counts = sweep_diagonals(&self.substrate, source, tile, context.theiler, carry)?;
            aggregator.absorb_diagonal(&counts);
            return Ok(());
        }

        let families: &[DiagonalFamily] = if tile.is_diagonal_block() {
            &[DiagonalFamily::Top]
        } else {
            &[DiagonalFamily::Top, DiagonalFamily::Left]
        };
        for &family in families {
            let carry = aggregator.diagonal_carry(symmetric_window(tile, family)?)?;
            let counts = sweep_diagonals_symmetric(
                &self.substrate,
                source,
                tile,
                family,
                context.theiler,
                carry,
            )?;
            aggregator.absorb_diagonal(&counts);
        }
        Ok(())
    }
}

/// Device bytes of the neighbour-ranking pre-pass.
fn ranking_bytes(settings: &AnalysisSettings, vectors: usize) -> u64 {
    match settings.neighbourhood {
        Neighbourhood::FixedAmount { .. } => bound_bytes(vectors),
        _ => 0,
    }
}

/// Copy a tile into the full matrix, and its mirror image when the tile
/// stands in for one below the main diagonal.
fn copy_tile(matrix: &TileMatrix, tile: &Tile, mirror: bool, target: &mut RecurrenceMatrix) {
    for y in 0..tile.dim_y {
        for x in 0..tile.dim_x {
            if matrix.get(x, y) {
                target.set(tile.start_x + x, tile.start_y + y, true);
                if mirror {
                    target.set(tile.start_y + y, tile.start_x + x, true);
                }
            }
        }
    }
}
