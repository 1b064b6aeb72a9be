//! rayon-backed substrate.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use rayon::{ThreadPool, ThreadPoolBuilder};
use rqa_core::SubstrateConfig;
use tracing::{debug, error, trace};

use super::buffer::{DeviceBuffer, MemoryLedger};
use super::{ComputeSubstrate, DeviceElement, KernelLaunch};
use crate::error::{ComputeError, ComputeResult};

/// Substrate running kernels on a dedicated rayon pool.
///
/// Device memory is simulated by a [`MemoryLedger`] with the configured
/// capacity; allocations beyond it fail instead of touching the host
/// allocator.
///
/// # Example
///
/// ```
/// use rqa_compute::substrate::{ComputeSubstrate, CpuSubstrate, KernelLaunch};
/// use rqa_core::SubstrateConfig;
///
/// let substrate = CpuSubstrate::new(&SubstrateConfig::default()).unwrap();
/// let buffer = substrate.upload("values", &[1u32, 2, 3]).unwrap();
/// let sum = substrate
///     .dispatch(KernelLaunch::new("sum", buffer.len()), |_| buffer.iter().sum::<u32>())
///     .unwrap();
/// assert_eq!(sum, 6);
/// ```
pub struct CpuSubstrate {
    pool: ThreadPool,
    ledger: Arc<MemoryLedger>,
    name: String,
}

impl CpuSubstrate {
    /// Build the worker pool.
    ///
    /// # Errors
    ///
    /// Returns `ComputeError::NoDevice` if the pool cannot be started.
    pub fn new(config: &SubstrateConfig) -> ComputeResult<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.worker_threads)
            .thread_name(|index| format!("rqa-worker-{index}"))
            .build()
            .map_err(|e| {
                error!(error = %e, "Failed to start worker pool");
                ComputeError::NoDevice(format!("failed to start worker pool: {e}"))
            })?;

        let name = format!("cpu ({} workers)", pool.current_num_threads());
        debug!(
            device = %name,
            capacity = config.device_memory_bytes,
            "Compute substrate ready"
        );

        Ok(Self {
            pool,
            ledger: Arc::new(MemoryLedger::new(config.device_memory_bytes)),
            name,
        })
    }

    /// Worker threads in the pool.
    pub fn worker_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Largest number of bytes held at once.
    pub fn peak_memory(&self) -> u64 {
        self.ledger.peak()
    }
}

impl ComputeSubstrate for CpuSubstrate {
    fn device_name(&self) -> &str {
        &self.name
    }

    fn memory_capacity(&self) -> u64 {
        self.ledger.capacity()
    }

    fn memory_in_use(&self) -> u64 {
        self.ledger.in_use()
    }

    fn allocate<T: DeviceElement>(
        &self,
        label: &'static str,
        len: usize,
    ) -> ComputeResult<DeviceBuffer<T>> {
        DeviceBuffer::allocate(&self.ledger, label, len)
    }

    fn dispatch<R, F>(&self, launch: KernelLaunch, kernel: F) -> ComputeResult<R>
    where
        R: Send,
        F: FnOnce(usize) -> R + Send,
    {
        let started = Instant::now();
        let work = launch.global_work_size;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.pool.install(|| kernel(work))));

        match outcome {
            Ok(result) => {
                trace!(
                    kernel = launch.name,
                    global_work_size = work,
                    elapsed_us = started.elapsed().as_micros() as u64,
                    "Kernel finished"
                );
                Ok(result)
            }
            Err(payload) => {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "parallel unit panicked".to_string());
                error!(kernel = launch.name, %message, "Kernel panicked");
                Err(ComputeError::kernel_failed(launch.name, message))
            }
        }
    }

    fn synchronize(&self) -> ComputeResult<()> {
        // Dispatch already joins every unit before returning.
        Ok(())
    }
}

impl std::fmt::Debug for CpuSubstrate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuSubstrate")
            .field("name", &self.name)
            .field("ledger", &self.ledger)
            .finish()
    }
}
