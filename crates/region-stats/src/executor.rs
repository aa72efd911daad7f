//! Batch executor for per-region work.

use std::sync::Arc;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::{RegionStatsError, Result};

/// Runs one function over a slice of work items and collects the results
/// in input order.
#[derive(Clone)]
pub enum Executor {
    /// On the calling thread.
    Sequential,
    /// On rayon's shared global pool.
    Global,
    /// On a dedicated pool.
    Pool(Arc<ThreadPool>),
}

impl Executor {
    /// Pick an executor for a worker count: 0 shares the global pool, 1 runs
    /// sequentially, anything larger gets its own pool.
    pub fn from_workers(workers: usize) -> Result<Self> {
        match workers {
            0 => Ok(Self::Global),
            1 => Ok(Self::Sequential),
            n => {
                let pool = ThreadPoolBuilder::new()
                    .num_threads(n)
                    .thread_name(|i| format!("region-stats-{i}"))
                    .build()
                    .map_err(|e| {
                        RegionStatsError::config(format!("Failed to create thread pool: {e}"))
                    })?;
                Ok(Self::Pool(Arc::new(pool)))
            }
        }
    }

    /// Number of threads work is spread over.
    pub fn threads(&self) -> usize {
        match self {
            Self::Sequential => 1,
            Self::Global => rayon::current_num_threads(),
            Self::Pool(pool) => pool.current_num_threads(),
        }
    }

    /// Apply `f` to every item; output order matches `items`.
    pub fn map<T, R, F>(&self, items: &[T], f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync + Send,
    {
        match self {
            Self::Sequential => items.iter().map(f).collect(),
            Self::Global => items.par_iter().map(f).collect(),
            Self::Pool(pool) => pool.install(|| items.par_iter().map(f).collect()),
        }
    }
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sequential => write!(f, "Sequential"),
            Self::Global => write!(f, "Global"),
            Self::Pool(pool) => write!(f, "Pool({})", pool.current_num_threads()),
        }
    }
}
