//! Worker pool for per-file sub-tasks.

use crate::error::ScanError;
use rayon::{ThreadPool, ThreadPoolBuilder};

/// Smallest pool the scanner accepts
pub const MIN_WORKERS: usize = 2;

/// Half the logical cores, never fewer than [`MIN_WORKERS`]
pub fn default_worker_count() -> usize {
    (num_cpus::get() / 2).max(MIN_WORKERS)
}

/// A rayon thread pool owned by the caller.
///
/// The scanner only borrows it, so one pool can serve several scans.
/// Dropping it shuts the threads down.
pub struct WorkerPool {
    pool: ThreadPool,
}

impl WorkerPool {
    /// Pool with [`default_worker_count`] threads
    pub fn new() -> Result<Self, ScanError> {
        Self::with_workers(default_worker_count())
    }

    /// Pool with `workers` threads, raised to [`MIN_WORKERS`] if lower
    pub fn with_workers(workers: usize) -> Result<Self, ScanError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers.max(MIN_WORKERS))
            .thread_name(|index| format!("media-atlas-worker-{}", index))
            .build()
            .map_err(|e| ScanError::Pool(e.to_string()))?;

        Ok(Self { pool })
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run two closures on the pool, potentially in parallel, and wait for both
    pub fn join<A, B, RA, RB>(&self, a: A, b: B) -> (RA, RB)
    where
        A: FnOnce() -> RA + Send,
        B: FnOnce() -> RB + Send,
        RA: Send,
        RB: Send,
    {
        self.pool.install(|| rayon::join(a, b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiny_pools_are_raised_to_minimum() {
        let pool = WorkerPool::with_workers(1).unwrap();
        assert_eq!(pool.workers(), MIN_WORKERS);
    }

    #[test]
    fn default_count_respects_minimum() {
        assert!(default_worker_count() >= MIN_WORKERS);
    }

    #[test]
    fn join_returns_both_results() {
        let pool = WorkerPool::with_workers(2).unwrap();
        let (a, b) = pool.join(|| 2 + 2, || "four".len());
        assert_eq!((a, b), (4, 4));
    }
}
