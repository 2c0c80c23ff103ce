//! Depth-camera obstacle detection
//!
//! Facade over the workspace crates: `core` for frames, geometry and errors,
//! `point_cloud` for the projection, ground removal and clustering stages,
//! and `vision` for the configured service.

pub use obstacles_core as core;
pub use obstacles_point_cloud as point_cloud;
pub use obstacles_vision as vision;

pub use obstacles_core::{Error, Result};

/// Initialize a single global Rayon thread pool for projection and normal estimation.
///
/// Call this once at startup before the first frame is processed.
/// Repeated calls are idempotent and return the first initialization result.
///
/// Priority order:
/// 1. explicit `num_threads`
/// 2. `OBSTACLES_CPU_THREADS` env var
/// 3. Rayon default
pub fn init_thread_pool(num_threads: Option<usize>) -> Result<()> {
    obstacles_core::init_global_thread_pool(num_threads)
}
