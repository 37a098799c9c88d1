//! Thread-partitioned spike accumulation
//!
//! Each update task appends the spikes of its cell groups from whatever
//! worker thread it lands on. Sharding by worker index keeps the hot path
//! uncontended; the per-shard mutexes only matter on the cold gather/clear
//! paths.

use spindle_core::Spike;
use std::sync::{Mutex, PoisonError};

/// A spike accumulator sharded across worker threads.
///
/// The driver keeps two of these, one per epoch parity: one side is filled
/// by Update(k) while the other is drained by the exchange of epoch k-1.
pub struct SpikeStore {
    shards: Vec<Mutex<Vec<Spike>>>,
}

impl SpikeStore {
    /// Create a store with one shard per worker thread
    pub fn new(num_threads: usize) -> Self {
        let shards = (0..num_threads.max(1)).map(|_| Mutex::new(Vec::new())).collect();
        Self { shards }
    }

    fn shard(&self) -> &Mutex<Vec<Spike>> {
        #[cfg(feature = "parallel")]
        let index = rayon::current_thread_index().unwrap_or(0) % self.shards.len();
        #[cfg(not(feature = "parallel"))]
        let index = 0;
        &self.shards[index]
    }

    /// Append spikes to the calling thread's shard
    pub fn insert(&self, spikes: &[Spike]) {
        self.shard()
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(spikes);
    }

    /// Collate every shard into a single vector, in shard order.
    ///
    /// The store is left intact; the next epoch's update clears it.
    pub fn gather(&self) -> Vec<Spike> {
        let mut spikes = Vec::new();
        for shard in &self.shards {
            spikes.extend_from_slice(&shard.lock().unwrap_or_else(PoisonError::into_inner));
        }
        spikes
    }

    /// Discard the contents of every shard
    pub fn clear(&self) {
        for shard in &self.shards {
            shard.lock().unwrap_or_else(PoisonError::into_inner).clear();
        }
    }
}
