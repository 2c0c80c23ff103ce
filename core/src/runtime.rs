use crate::{Error, Result};
use rayon::ThreadPoolBuilder;
use std::env;
use std::sync::OnceLock;

/// Environment variable read by [`init_global_thread_pool`] when no explicit count is given.
pub const CPU_THREADS_ENV: &str = "OBSTACLES_CPU_THREADS";

static THREAD_POOL_INIT: OnceLock<std::result::Result<(), String>> = OnceLock::new();

/// Initialize the global Rayon thread pool used by projection and normal estimation.
///
/// Priority:
/// 1. `num_threads` argument
/// 2. `OBSTACLES_CPU_THREADS` environment variable
/// 3. Rayon default
///
/// Only the first call has an effect; later calls return its outcome.
pub fn init_global_thread_pool(num_threads: Option<usize>) -> Result<()> {
    let res = THREAD_POOL_INIT.get_or_init(|| {
        let configured_threads = match num_threads {
            Some(n) => Some(n),
            None => read_cpu_threads_from_env()?,
        };

        let mut builder = ThreadPoolBuilder::new();
        if let Some(n) = configured_threads {
            if n == 0 {
                return Err(format!("{CPU_THREADS_ENV} must be >= 1"));
            }
            builder = builder.num_threads(n);
        }

        builder.build_global().map_err(|e| e.to_string())
    });
    res.clone().map_err(Error::ConfigValidation)
}

fn read_cpu_threads_from_env() -> std::result::Result<Option<usize>, String> {
    let raw = match env::var(CPU_THREADS_ENV) {
        Ok(v) => v,
        Err(env::VarError::NotPresent) => return Ok(None),
        Err(e) => return Err(format!("failed to read {CPU_THREADS_ENV}: {e}")),
    };

    let parsed: usize = raw
        .parse()
        .map_err(|_| format!("{CPU_THREADS_ENV} must be a positive integer, got '{raw}'"))?;
    if parsed == 0 {
        return Err(format!("{CPU_THREADS_ENV} must be >= 1"));
    }
    Ok(Some(parsed))
}
