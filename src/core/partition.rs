//! Static partitioning of the neurons of a layer onto a fixed pool of workers.
//!
//! Worker `k` out of `W` owns the indices `k, k + W, k + 2W, ...` of every layer.
//! Each phase hands every worker exclusive access to the items it owns, so that workers never write the same neuron, output slot or weight row.
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::SNNError;

/// Round-robin assignment of indices to a fixed number of workers.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct WorkPartitioner {
    num_workers: usize,
}

impl WorkPartitioner {
    /// Create a new partitioner for the given number of workers.
    /// Returns an error if there is no worker.
    pub fn build(num_workers: usize) -> Result<Self, SNNError> {
        if num_workers == 0 {
            return Err(SNNError::InvalidParameters(
                "The number of workers must be positive".to_string(),
            ));
        }
        Ok(WorkPartitioner { num_workers })
    }

    /// Returns the number of workers.
    pub fn num_workers(&self) -> usize {
        self.num_workers
    }

    /// The global index handled by a worker at a given round.
    pub fn index(&self, worker: usize, round: usize) -> usize {
        worker + round * self.num_workers
    }

    /// The worker owning a given global index.
    pub fn owner(&self, index: usize) -> usize {
        index % self.num_workers
    }

    /// The number of rounds needed to cover `len` indices.
    pub fn num_rounds(&self, len: usize) -> usize {
        (len + self.num_workers - 1) / self.num_workers
    }

    /// The sequence of indices below `len` visited by a worker.
    /// A worker whose identifier is not below the number of workers visits nothing.
    pub fn worker_indices(&self, worker: usize, len: usize) -> impl Iterator<Item = usize> {
        let partitioner = *self;
        let num_rounds = if worker < self.num_workers {
            self.num_rounds(len)
        } else {
            0
        };
        (0..num_rounds)
            .map(move |round| partitioner.index(worker, round))
            .take_while(move |&index| index < len)
    }

    /// The indices visited by every worker, in worker order.
    pub fn assignment(&self, len: usize) -> Vec<Vec<usize>> {
        (0..self.num_workers)
            .map(|worker| self.worker_indices(worker, len).collect())
            .collect()
    }

    /// Distribute the items of a layer to the workers, following the round-robin rule.
    /// Each item is paired with its global index; bucket `k` holds the items of worker `k` in round order.
    pub fn distribute<T, I>(&self, items: I) -> Vec<Vec<(usize, T)>>
    where
        I: IntoIterator<Item = T>,
    {
        let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
        let len = slots.len();
        (0..self.num_workers)
            .map(|worker| {
                self.worker_indices(worker, len)
                    .filter_map(|index| slots[index].take().map(|item| (index, item)))
                    .collect()
            })
            .collect()
    }
}

/// A fixed-size pool of workers executing one task per worker and joining them before returning.
pub struct WorkerPool {
    pool: ThreadPool,
    partitioner: WorkPartitioner,
}

impl WorkerPool {
    /// Acquire a pool of `num_workers` threads.
    pub fn build(num_workers: usize) -> Result<Self, SNNError> {
        let partitioner = WorkPartitioner::build(num_workers)?;
        let pool = ThreadPoolBuilder::new()
            .num_threads(num_workers)
            .thread_name(|i| format!("snn-worker-{}", i))
            .build()
            .map_err(|e| SNNError::WorkerPool(e.to_string()))?;
        log::debug!("Worker pool with {} workers acquired", num_workers);
        Ok(WorkerPool { pool, partitioner })
    }

    /// Returns the partitioner of the pool.
    pub fn partitioner(&self) -> &WorkPartitioner {
        &self.partitioner
    }

    /// Returns the number of workers.
    pub fn num_workers(&self) -> usize {
        self.partitioner.num_workers()
    }

    /// Distribute the items to the workers and run `task` on every item, on behalf of its owner.
    /// Returns once every worker is done.
    pub fn fork<T, I, F>(&self, items: I, task: F)
    where
        T: Send,
        I: IntoIterator<Item = T>,
        F: Fn(usize, usize, T) + Sync + Send,
    {
        let buckets = self.partitioner.distribute(items);
        self.pool.install(|| {
            buckets
                .into_par_iter()
                .enumerate()
                .for_each(|(worker, bucket)| {
                    bucket
                        .into_iter()
                        .for_each(|(index, item)| task(worker, index, item))
                })
        });
    }
}
