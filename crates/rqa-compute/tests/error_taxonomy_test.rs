//! Failure paths of the engine, grouped by error category.

use std::sync::atomic::{AtomicUsize, Ordering};

use rqa_compute::substrate::{DeviceBuffer, DeviceElement, KernelLaunch};
use rqa_compute::{ComputeError, ComputeResult, ComputeSubstrate, CpuSubstrate, RqaComputation, RqaEngine};
use rqa_core::{
    AnalysisSettings, CoreError, EmbeddedSeries, EngineConfig, ErrorCategory, ExtractionStrategy,
    Neighbourhood, SubstrateConfig,
};

fn series(length: usize) -> Vec<f32> {
    (0..length).map(|t| (t as f32 * 0.3).sin()).collect()
}

fn settings() -> AnalysisSettings {
    AnalysisSettings {
        embedding_dimension: 3,
        time_delay: 1,
        neighbourhood: Neighbourhood::fixed_radius(0.4),
        ..AnalysisSettings::default()
    }
}

/// CPU substrate whose kernels named `failing` report a launch failure.
struct FlakySubstrate {
    inner: CpuSubstrate,
    failing: &'static str,
    launches: AtomicUsize,
}

impl FlakySubstrate {
    fn new(failing: &'static str) -> Self {
        Self {
            inner: CpuSubstrate::new(&SubstrateConfig::default()).unwrap(),
            failing,
            launches: AtomicUsize::new(0),
        }
    }
}

impl ComputeSubstrate for FlakySubstrate {
    fn device_name(&self) -> &str {
        "flaky"
    }

    fn memory_capacity(&self) -> u64 {
        self.inner.memory_capacity()
    }

    fn memory_in_use(&self) -> u64 {
        self.inner.memory_in_use()
    }

    fn allocate<T: DeviceElement>(
        &self,
        label: &'static str,
        len: usize,
    ) -> ComputeResult<DeviceBuffer<T>> {
        self.inner.allocate(label, len)
    }

    fn dispatch<R, F>(&self, launch: KernelLaunch, kernel: F) -> ComputeResult<R>
    where
        R: Send,
        F: FnOnce(usize) -> R + Send,
    {
        self.launches.fetch_add(1, Ordering::Relaxed);
        if launch.name.starts_with(self.failing) {
            return Err(ComputeError::kernel_failed(launch.name, "device lost"));
        }
        self.inner.dispatch(launch, kernel)
    }

    fn synchronize(&self) -> ComputeResult<()> {
        self.inner.synchronize()
    }
}

#[test]
fn test_budget_below_single_cell_is_configuration_error() {
    let embedding = settings().embed(&series(30)).unwrap();
    let engine = RqaEngine::new(EngineConfig {
        memory_budget_bytes: 1,
        ..EngineConfig::default()
    })
    .unwrap();

    let err = engine.run(&embedding, &settings()).unwrap_err();
    assert!(matches!(err, ComputeError::BudgetTooSmall { budget: 1, edge: 1, .. }));
    assert_eq!(err.category(), ErrorCategory::Configuration);
}

#[test]
fn test_invalid_settings_are_configuration_errors() {
    let embedding = settings().embed(&series(30)).unwrap();
    let engine = RqaEngine::new(EngineConfig::default()).unwrap();

    let zero_min_length = AnalysisSettings {
        min_diagonal_line_length: 0,
        ..settings()
    };
    let err = engine.run(&embedding, &zero_min_length).unwrap_err();
    assert!(err.is_configuration_error());

    let empty_corridor = AnalysisSettings {
        neighbourhood: Neighbourhood::radius_corridor(0.5, 0.2),
        ..settings()
    };
    let err = engine.run(&embedding, &empty_corridor).unwrap_err();
    assert!(err.is_configuration_error());
}

#[test]
fn test_invalid_engine_config_is_rejected_up_front() {
    let err = RqaEngine::new(EngineConfig {
        max_edge_length: 0,
        ..EngineConfig::default()
    })
    .unwrap_err();
    assert!(err.is_configuration_error());

    let err = RqaEngine::new(EngineConfig {
        retain_matrix: true,
        strategy: ExtractionStrategy::Fused,
        ..EngineConfig::default()
    })
    .unwrap_err();
    assert!(err.is_configuration_error());
}

#[test]
fn test_too_many_neighbours_is_configuration_error() {
    let fan = AnalysisSettings {
        neighbourhood: Neighbourhood::fixed_amount(50),
        ..settings()
    };
    let embedding = fan.embed(&series(20)).unwrap();
    let err = RqaEngine::new(EngineConfig::default())
        .unwrap()
        .run(&embedding, &fan)
        .unwrap_err();
    assert!(err.is_configuration_error(), "{err}");
}

#[test]
fn test_short_series_is_data_error() {
    let err = RqaComputation::from_series(&[1.0, 2.0], settings(), EngineConfig::default())
        .unwrap_err();
    assert!(matches!(
        err,
        ComputeError::Core(CoreError::SeriesTooShort {
            length: 2,
            required: 3
        })
    ));
    assert!(err.is_data_error());
}

#[test]
fn test_dimension_mismatch_is_data_error() {
    let embedding = EmbeddedSeries::from_vectors(vec![0.0; 20], 2).unwrap();
    let err = RqaEngine::new(EngineConfig::default())
        .unwrap()
        .run(&embedding, &settings())
        .unwrap_err();
    assert!(matches!(
        err,
        ComputeError::Core(CoreError::DimensionMismatch {
            expected: 3,
            actual: 2
        })
    ));
    assert!(err.is_data_error());
}

#[test]
fn test_device_too_small_for_carryover_is_configuration_error() {
    let embedding = settings().embed(&series(301)).unwrap();
    let engine = RqaEngine::new(EngineConfig {
        memory_budget_bytes: 8192,
        substrate: SubstrateConfig {
            device_memory_bytes: 8192,
            ..SubstrateConfig::default()
        },
        ..EngineConfig::default()
    })
    .unwrap();

    let err = engine.run(&embedding, &settings()).unwrap_err();
    assert!(matches!(err, ComputeError::BudgetTooSmall { edge: 1, .. }), "{err}");
    assert!(err.is_configuration_error());
    assert_eq!(engine.substrate().peak_memory(), 0);
}

#[test]
fn test_device_memory_exhaustion_is_substrate_error() {
    let substrate = CpuSubstrate::new(&SubstrateConfig {
        device_memory_bytes: 256,
        ..SubstrateConfig::default()
    })
    .unwrap();
    let _held = substrate.allocate::<u64>("held", 16).unwrap();

    let err = substrate.allocate::<u64>("tile_matrix", 32).unwrap_err();
    assert!(
        matches!(err, ComputeError::AllocationFailed { requested: 256, in_use: 128, .. }),
        "{err}"
    );
    assert!(err.is_substrate_error());
    assert_eq!(substrate.memory_in_use(), 128);
}

#[test]
fn test_kernel_failure_aborts_without_result() {
    let embedding = settings().embed(&series(60)).unwrap();
    let config = EngineConfig {
        max_edge_length: 8,
        ..EngineConfig::default()
    };

    for failing in ["diagonal_lines", "vertical_lines", "create_matrix"] {
        let engine = RqaEngine::with_substrate(config.clone(), FlakySubstrate::new(failing)).unwrap();
        let err = engine.run(&embedding, &settings()).unwrap_err();
        assert!(
            matches!(&err, ComputeError::KernelFailed { kernel, .. } if kernel.starts_with(failing)),
            "{err}"
        );
        assert!(err.is_substrate_error());
        assert_eq!(engine.substrate().memory_in_use(), 0);
    }
}

#[test]
fn test_failure_stops_at_first_tile() {
    let embedding = settings().embed(&series(60)).unwrap();
    let engine = RqaEngine::with_substrate(
        EngineConfig {
            max_edge_length: 4,
            ..EngineConfig::default()
        },
        FlakySubstrate::new("create_matrix"),
    )
    .unwrap();

    assert!(engine.run(&embedding, &settings()).is_err());
    assert_eq!(engine.substrate().launches.load(Ordering::Relaxed), 1);
}

#[test]
fn test_failing_substrate_passes_when_kernel_unused() {
    let embedding = settings().embed(&series(40)).unwrap();
    let engine = RqaEngine::with_substrate(
        EngineConfig {
            strategy: ExtractionStrategy::Fused,
            ..EngineConfig::default()
        },
        FlakySubstrate::new("create_matrix"),
    )
    .unwrap();

    let output = engine.run(&embedding, &settings()).unwrap();
    let reference = RqaEngine::new(EngineConfig::default())
        .unwrap()
        .run(&embedding, &settings())
        .unwrap();
    assert_eq!(output.distributions, reference.distributions);
}
