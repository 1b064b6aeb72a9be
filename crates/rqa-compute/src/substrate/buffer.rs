//! Accounted device buffers.

use parking_lot::Mutex;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use crate::error::{ComputeError, ComputeResult};

#[derive(Debug, Default)]
struct Usage {
    in_use: u64,
    peak: u64,
}

/// Tracks device memory held by live [`DeviceBuffer`]s.
#[derive(Debug)]
pub struct MemoryLedger {
    capacity: u64,
    usage: Mutex<Usage>,
}

impl MemoryLedger {
    pub fn new(capacity: u64) -> Self {
        Self {
            capacity,
            usage: Mutex::new(Usage::default()),
        }
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub fn in_use(&self) -> u64 {
        self.usage.lock().in_use
    }

    /// High-water mark since creation.
    pub fn peak(&self) -> u64 {
        self.usage.lock().peak
    }

    fn reserve(&self, label: &str, bytes: u64) -> ComputeResult<()> {
        let mut usage = self.usage.lock();
        let available = self.capacity.saturating_sub(usage.in_use);
        if bytes > available {
            return Err(ComputeError::AllocationFailed {
                label: label.to_string(),
                requested: bytes,
                in_use: usage.in_use,
                capacity: self.capacity,
            });
        }
        usage.in_use += bytes;
        usage.peak = usage.peak.max(usage.in_use);
        Ok(())
    }

    fn release(&self, bytes: u64) {
        let mut usage = self.usage.lock();
        usage.in_use = usage.in_use.saturating_sub(bytes);
    }
}

/// Buffer owned by a substrate. Its bytes are returned to the ledger on drop.
pub struct DeviceBuffer<T> {
    label: &'static str,
    data: Vec<T>,
    bytes: u64,
    ledger: Arc<MemoryLedger>,
}

impl<T: Default> DeviceBuffer<T> {
    /// Reserve `len` elements on `ledger` and default-initialize them.
    pub fn allocate(
        ledger: &Arc<MemoryLedger>,
        label: &'static str,
        len: usize,
    ) -> ComputeResult<Self> {
        let bytes = (len as u64).saturating_mul(std::mem::size_of::<T>() as u64);
        ledger.reserve(label, bytes)?;
        let mut data = Vec::with_capacity(len);
        data.resize_with(len, T::default);
        Ok(Self {
            label,
            data,
            bytes,
            ledger: Arc::clone(ledger),
        })
    }
}

impl<T> DeviceBuffer<T> {
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Bytes reserved for this buffer.
    pub fn size_bytes(&self) -> u64 {
        self.bytes
    }
}

impl<T> Deref for DeviceBuffer<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.data
    }
}

impl<T> DerefMut for DeviceBuffer<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        &mut self.data
    }
}

impl<T> Drop for DeviceBuffer<T> {
    fn drop(&mut self) {
        self.ledger.release(self.bytes);
    }
}

impl<T> fmt::Debug for DeviceBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceBuffer")
            .field("label", &self.label)
            .field("len", &self.data.len())
            .field("bytes", &self.bytes)
            .finish()
    }
}
