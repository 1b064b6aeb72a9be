//! Tests for the CPU substrate and buffer accounting.

use rayon::prelude::*;
use rqa_core::SubstrateConfig;

use super::*;
use crate::error::ComputeError;

fn substrate(capacity: u64) -> CpuSubstrate {
    CpuSubstrate::new(&SubstrateConfig {
        worker_threads: 2,
        device_memory_bytes: capacity,
    })
    .unwrap()
}

#[test]
fn test_pool_uses_configured_workers() {
    let substrate = substrate(1024);
    assert_eq!(substrate.worker_threads(), 2);
    assert!(substrate.device_name().contains("2 workers"));
    assert_eq!(substrate.memory_capacity(), 1024);
}

#[test]
fn test_allocation_is_accounted_and_released() {
    let substrate = substrate(1024);
    {
        let buffer: DeviceBuffer<u32> = substrate.allocate("carry", 64).unwrap();
        assert_eq!(buffer.len(), 64);
        assert_eq!(buffer.size_bytes(), 256);
        assert!(buffer.iter().all(|&v| v == 0));
        assert_eq!(substrate.memory_in_use(), 256);
    }
    assert_eq!(substrate.memory_in_use(), 0);
    assert_eq!(substrate.peak_memory(), 256);
}

#[test]
fn test_allocation_beyond_capacity_fails() {
    let substrate = substrate(1024);
    let _held: DeviceBuffer<u8> = substrate.allocate("held", 1000).unwrap();
    let err = substrate.allocate::<u64>("too_big", 8).unwrap_err();
    match &err {
        ComputeError::AllocationFailed {
            label,
            requested,
            in_use,
            capacity,
        } => {
            assert_eq!(label, "too_big");
            assert_eq!(*requested, 64);
            assert_eq!(*in_use, 1000);
            assert_eq!(*capacity, 1024);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.is_substrate_error());
}

#[test]
fn test_upload_and_download() {
    let substrate = substrate(1024);
    let buffer = substrate.upload("vectors", &[0.5f32, 1.5, 2.5]).unwrap();
    assert_eq!(substrate.memory_in_use(), 12);
    assert_eq!(substrate.download(&buffer).unwrap(), vec![0.5, 1.5, 2.5]);
}

#[test]
fn test_dispatch_runs_inside_pool() {
    let substrate = substrate(1024);
    let total = substrate
        .dispatch(KernelLaunch::new("square_sum", 100), |work| {
            (0..work as u64).into_par_iter().map(|i| i * i).sum::<u64>()
        })
        .unwrap();
    assert_eq!(total, 328_350);
    assert!(substrate.synchronize().is_ok());
}

#[test]
fn test_dispatch_surfaces_panics() {
    let substrate = substrate(1024);
    let err = substrate
        .dispatch(KernelLaunch::new("faulty", 4), |work| {
            (0..work).into_par_iter().for_each(|i| {
                if i == 3 {
                    panic!("unit {i} failed");
                }
            });
        })
        .unwrap_err();
    assert!(err.is_substrate_error());
    assert!(err.to_string().contains("faulty"));
}
