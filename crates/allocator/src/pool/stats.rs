//! Pool allocator statistics

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Statistics for pool allocator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PoolStats {
    /// Successful reservations (probes excluded)
    pub total_allocs: u64,
    /// Successful frees
    pub total_frees: u64,
    /// Successful resizes that kept or moved a block
    pub total_resizes: u64,
    /// Resizes that had to copy the payload to a new block
    pub relocations: u64,
    /// Allocation requests no free block could satisfy
    pub failed_allocs: u64,
    /// Peak occupied bytes
    pub peak_usage: usize,
    /// Currently occupied bytes
    pub current_usage: usize,
    /// Currently free bytes
    pub free_bytes: usize,
    /// Number of blocks in the directory
    pub block_count: usize,
    /// Number of free blocks in the directory
    pub free_blocks: usize,
    /// Size of the largest free block
    pub largest_free_block: usize,
}

impl PoolStats {
    /// Fraction of free space that is not usable by one request
    ///
    /// `0.0` when all free bytes sit in a single block or nothing is free.
    pub fn fragmentation(&self) -> f64 {
        if self.free_bytes == 0 {
            return 0.0;
        }
        1.0 - self.largest_free_block as f64 / self.free_bytes as f64
    }
}

/// Running counters kept by the allocator
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Counters {
    pub total_allocs: u64,
    pub total_frees: u64,
    pub total_resizes: u64,
    pub relocations: u64,
    pub failed_allocs: u64,
    pub peak_usage: usize,
}

impl Counters {
    pub fn record_alloc(&mut self, used: usize) {
        self.total_allocs += 1;
        self.peak_usage = self.peak_usage.max(used);
    }

    pub fn record_resize(&mut self, used: usize, relocated: bool) {
        self.total_resizes += 1;
        if relocated {
            self.relocations += 1;
        }
        self.peak_usage = self.peak_usage.max(used);
    }
}
