//! Thin shim over the worker thread pool
//!
//! The scheduler posts exactly two top-level tasks per pipeline step and
//! joins on them; inner fan-out over groups or cells goes through the
//! parallel iterators of the same pool. Without the `parallel` feature every
//! operation degenerates to in-order execution with identical semantics.

use crate::error::Result;

#[cfg(feature = "parallel")]
use crate::error::SimulationError;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
#[cfg(feature = "parallel")]
use std::sync::Arc;

/// Handle to the worker pool shared by all tasks of one simulation
#[derive(Clone)]
pub struct TaskPool {
    #[cfg(feature = "parallel")]
    pool: Arc<rayon::ThreadPool>,
}

impl TaskPool {
    /// Create a pool with the given number of workers; `0` picks the rayon
    /// default (one per logical core)
    pub fn new(num_threads: usize) -> Result<Self> {
        #[cfg(feature = "parallel")]
        {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(num_threads)
                .build()
                .map_err(|e| SimulationError::task_pool(e.to_string()))?;
            Ok(Self {
                pool: Arc::new(pool),
            })
        }
        #[cfg(not(feature = "parallel"))]
        {
            let _ = num_threads;
            Ok(Self {})
        }
    }

    /// Number of worker threads backing this pool
    pub fn num_threads(&self) -> usize {
        #[cfg(feature = "parallel")]
        {
            self.pool.current_num_threads()
        }
        #[cfg(not(feature = "parallel"))]
        {
            1
        }
    }

    /// Run two tasks, potentially in parallel, and wait for both
    pub fn join<A, B, RA, RB>(&self, a: A, b: B) -> (RA, RB)
    where
        A: FnOnce() -> RA + Send,
        B: FnOnce() -> RB + Send,
        RA: Send,
        RB: Send,
    {
        #[cfg(feature = "parallel")]
        {
            self.pool.join(a, b)
        }
        #[cfg(not(feature = "parallel"))]
        {
            (a(), b())
        }
    }

    /// Execute `op` inside the pool so nested parallel iterators use its
    /// workers
    pub fn install<OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        #[cfg(feature = "parallel")]
        {
            self.pool.install(op)
        }
        #[cfg(not(feature = "parallel"))]
        {
            op()
        }
    }

    /// Apply `f` to every item, fanning out across workers
    pub fn for_each_mut<T, F>(&self, items: &mut [T], f: F)
    where
        T: Send,
        F: Fn(usize, &mut T) + Send + Sync,
    {
        #[cfg(feature = "parallel")]
        {
            self.pool.install(|| {
                items
                    .par_iter_mut()
                    .enumerate()
                    .for_each(|(index, item)| f(index, item));
            });
        }
        #[cfg(not(feature = "parallel"))]
        {
            for (index, item) in items.iter_mut().enumerate() {
                f(index, item);
            }
        }
    }

    /// Apply `f` to every item, stopping at the first error
    pub fn try_for_each_mut<T, E, F>(&self, items: &mut [T], f: F) -> std::result::Result<(), E>
    where
        T: Send,
        E: Send,
        F: Fn(usize, &mut T) -> std::result::Result<(), E> + Send + Sync,
    {
        #[cfg(feature = "parallel")]
        {
            self.pool.install(|| {
                items
                    .par_iter_mut()
                    .enumerate()
                    .try_for_each(|(index, item)| f(index, item))
            })
        }
        #[cfg(not(feature = "parallel"))]
        {
            for (index, item) in items.iter_mut().enumerate() {
                f(index, item)?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_runs_both_tasks() {
        let pool = TaskPool::new(2).unwrap();
        let (a, b) = pool.join(|| 1 + 1, || "ok");
        assert_eq!(a, 2);
        assert_eq!(b, "ok");
    }

    #[test]
    fn test_for_each_mut_touches_every_item() {
        let pool = TaskPool::new(2).unwrap();
        let mut items = vec![0u32; 64];
        pool.for_each_mut(&mut items, |index, item| *item = index as u32);
        for (index, item) in items.iter().enumerate() {
            assert_eq!(*item, index as u32);
        }
    }

    #[test]
    fn test_try_for_each_mut_propagates_errors() {
        let pool = TaskPool::new(2).unwrap();
        let mut items = vec![0u32; 8];
        let result = pool.try_for_each_mut(&mut items, |index, _item| {
            if index == 3 {
                Err("boom")
            } else {
                Ok(())
            }
        });
        assert_eq!(result, Err("boom"));
    }
}
