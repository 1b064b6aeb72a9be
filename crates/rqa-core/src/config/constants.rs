//! Configuration defaults and limits.

/// File layered first by [`super::RqaConfig::load`], relative to the
/// working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config/default.toml";

/// Prefix of environment variables read by [`super::RqaConfig::load`].
pub const ENV_PREFIX: &str = "RQA";

/// Default cap on the tile edge length.
pub const DEFAULT_EDGE_LENGTH: usize = 10_240;

/// Hard ceiling on the tile edge length.
pub const EDGE_LENGTH_CEILING: usize = 65_535;

/// Default memory budget per tile (512 MiB).
pub const DEFAULT_MEMORY_BUDGET_BYTES: u64 = 512 * 1024 * 1024;

/// Default device memory of the CPU substrate (4 GiB).
pub const DEFAULT_DEVICE_MEMORY_BYTES: u64 = 4 * 1024 * 1024 * 1024;

/// Largest worker pool the CPU substrate accepts.
pub const WORKER_THREADS_CEILING: usize = 1024;
