//! Implements the backends that distribute home cells among threads.
//!
//! Every backend splits the work into the same fixed-length chunks (the
//! chunk length never depends on the number of threads) and returns one
//! result per chunk, in chunk order. Callers combine the per-chunk results
//! sequentially, so every backend produces bitwise identical results.

use crate::config::CountConfig;
use crate::error::Error;
use rayon::prelude::*;

/// a trait for expressing how to process a list of work items in chunks
///
/// We implement this for each parallelism "backend," so we have a uniform
/// interface for easily switching between backends.
pub trait Executor {
    /// Applies `f` to each consecutive chunk of `chunk_len` items (the last
    /// chunk may be shorter) and returns the outputs in chunk order.
    fn map_chunks<T, R, F>(&self, items: &[T], chunk_len: usize, f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&[T]) -> R + Sync + Send;
}

/// Runs everything on the calling thread
pub struct SerialExecutor;

impl Executor for SerialExecutor {
    fn map_chunks<T, R, F>(&self, items: &[T], chunk_len: usize, f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&[T]) -> R + Sync + Send,
    {
        items.chunks(chunk_len).map(f).collect()
    }
}

/// Distributes chunks over a rayon thread pool
pub struct RayonExecutor {
    // when None, we use rayon's global pool
    pool: Option<rayon::ThreadPool>,
}

impl RayonExecutor {
    /// an executor backed by rayon's global thread pool
    pub fn global() -> Self {
        RayonExecutor { pool: None }
    }

    /// an executor backed by a dedicated pool of `num_threads` threads
    pub fn with_threads(num_threads: usize) -> Result<Self, Error> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build()
            .map_err(|err| Error::thread_pool(err.to_string()))?;
        Ok(RayonExecutor { pool: Some(pool) })
    }

    pub fn num_threads(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }
}

impl Executor for RayonExecutor {
    fn map_chunks<T, R, F>(&self, items: &[T], chunk_len: usize, f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&[T]) -> R + Sync + Send,
    {
        // collect preserves the order of the chunks
        let run = || items.par_chunks(chunk_len).map(&f).collect::<Vec<R>>();
        match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ExecutorChoice {
    Serial,
    GlobalPool,
    DedicatedPool(usize),
}

/// The executor selected by a [`CountConfig`]
pub(crate) enum ConfiguredExecutor {
    Serial(SerialExecutor),
    Rayon(RayonExecutor),
}

impl ConfiguredExecutor {
    pub(crate) fn new(config: &CountConfig) -> Result<Self, Error> {
        Ok(match config.executor_choice() {
            ExecutorChoice::Serial => ConfiguredExecutor::Serial(SerialExecutor),
            ExecutorChoice::GlobalPool => ConfiguredExecutor::Rayon(RayonExecutor::global()),
            ExecutorChoice::DedicatedPool(n) => {
                ConfiguredExecutor::Rayon(RayonExecutor::with_threads(n)?)
            }
        })
    }

    pub(crate) fn num_threads(&self) -> usize {
        match self {
            ConfiguredExecutor::Serial(_) => 1,
            ConfiguredExecutor::Rayon(executor) => executor.num_threads(),
        }
    }
}

impl Executor for ConfiguredExecutor {
    fn map_chunks<T, R, F>(&self, items: &[T], chunk_len: usize, f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&[T]) -> R + Sync + Send,
    {
        match self {
            ConfiguredExecutor::Serial(executor) => executor.map_chunks(items, chunk_len, f),
            ConfiguredExecutor::Rayon(executor) => executor.map_chunks(items, chunk_len, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk_sums(executor: &impl Executor) -> Vec<u64> {
        let items: Vec<u64> = (0..10).collect();
        executor.map_chunks(&items, 4, |chunk| chunk.iter().sum())
    }

    #[test]
    fn chunk_order_is_preserved() {
        assert_eq!(chunk_sums(&SerialExecutor), [6, 22, 17]);
        assert_eq!(chunk_sums(&RayonExecutor::global()), [6, 22, 17]);
        assert_eq!(chunk_sums(&RayonExecutor::with_threads(3).unwrap()), [6, 22, 17]);
    }

    #[test]
    fn empty_items() {
        let items: [u64; 0] = [];
        let out: Vec<u64> = SerialExecutor.map_chunks(&items, 4, |chunk| chunk.len() as u64);
        assert!(out.is_empty());
        let out: Vec<u64> = RayonExecutor::global().map_chunks(&items, 4, |c| c.len() as u64);
        assert!(out.is_empty());
    }
}
