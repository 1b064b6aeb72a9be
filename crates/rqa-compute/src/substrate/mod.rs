//! Compute substrate seam.
//!
//! The engine never talks to threads or memory directly. It asks a
//! [`ComputeSubstrate`] to allocate device buffers, move data to and from them,
//! and launch kernels with a global work size. [`CpuSubstrate`] implements the
//! contract on a dedicated rayon pool with accounted device memory.
//!
//! # Kernel Model
//!
//! ```text
//! dispatch(kernel, global_work_size, body)
//!   body runs inside the substrate's pool and fans out into
//!   `global_work_size` independent units (rayon parallel iterators);
//!   the call returns only once every unit has finished.
//! ```
//!
//! Units of one launch must not depend on each other. Anything shared is
//! folded into worker-local accumulators and reduced once at the join.

mod buffer;
mod cpu;

#[cfg(test)]
mod tests;

pub use buffer::{DeviceBuffer, MemoryLedger};
pub use cpu::CpuSubstrate;

use crate::error::ComputeResult;

/// Types that can live in a device buffer.
pub trait DeviceElement: Default + Send + Sync + 'static {}

impl<T: Default + Send + Sync + 'static> DeviceElement for T {}

/// Name and size of one kernel launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelLaunch {
    /// Kernel name, used for logging and error reports.
    pub name: &'static str,
    /// Number of parallel units.
    pub global_work_size: usize,
}

impl KernelLaunch {
    pub const fn new(name: &'static str, global_work_size: usize) -> Self {
        Self {
            name,
            global_work_size,
        }
    }
}

/// Buffer, transfer and dispatch primitives consumed by the engine.
///
/// Every operation fails with a substrate error when the backend is gone or
/// device memory is exhausted.
pub trait ComputeSubstrate: Send + Sync {
    /// Human readable device name.
    fn device_name(&self) -> &str;

    /// Device memory in bytes.
    fn memory_capacity(&self) -> u64;

    /// Bytes held by live buffers.
    fn memory_in_use(&self) -> u64;

    /// Allocate a default-initialized buffer of `len` elements.
    fn allocate<T: DeviceElement>(
        &self,
        label: &'static str,
        len: usize,
    ) -> ComputeResult<DeviceBuffer<T>>;

    /// Allocate a buffer and copy `host` into it.
    fn upload<T: DeviceElement + Copy>(
        &self,
        label: &'static str,
        host: &[T],
    ) -> ComputeResult<DeviceBuffer<T>> {
        let mut buffer = self.allocate(label, host.len())?;
        buffer.copy_from_slice(host);
        Ok(buffer)
    }

    /// Copy a buffer back to host memory.
    fn download<T: DeviceElement + Copy>(&self, buffer: &DeviceBuffer<T>) -> ComputeResult<Vec<T>> {
        Ok(buffer.to_vec())
    }

    /// Launch `kernel` with `launch.global_work_size` units and block until
    /// all of them completed.
    fn dispatch<R, F>(&self, launch: KernelLaunch, kernel: F) -> ComputeResult<R>
    where
        R: Send,
        F: FnOnce(usize) -> R + Send;

    /// Wait for all outstanding work.
    fn synchronize(&self) -> ComputeResult<()>;
}
