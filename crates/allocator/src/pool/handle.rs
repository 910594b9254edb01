//! Pool identity and allocation handles

use core::fmt;
use core::num::NonZeroU64;
use core::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier of a pool epoch
///
/// A fresh id is minted when a pool is created and again when it is reset,
/// so handles issued before a reset are rejected afterwards instead of
/// aliasing new allocations.
///
/// Uses `NonZeroU64` so `Option<PoolId>` stays the size of the id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoolId(NonZeroU64);

impl PoolId {
    /// Generate a new unique pool id
    pub(crate) fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        let id = COUNTER.fetch_add(1, Ordering::Relaxed);
        Self(NonZeroU64::new(id).unwrap_or(NonZeroU64::MIN))
    }

    /// Raw id value
    #[inline]
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pool#{}", self.0)
    }
}

/// Handle to a block handed out by a [`PoolAllocator`](super::PoolAllocator)
///
/// The handle is the arena offset of the block's first byte, tagged with the
/// issuing pool. It is `Copy` and carries no lifetime; the pool validates it
/// on every use, so presenting a handle that is stale, foreign, or already
/// freed yields an error rather than touching the wrong block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Allocation {
    pool: PoolId,
    offset: usize,
}

impl Allocation {
    pub(crate) fn new(pool: PoolId, offset: usize) -> Self {
        Self { pool, offset }
    }

    /// Byte offset of the block from the start of the arena
    #[inline]
    pub fn offset(self) -> usize {
        self.offset
    }

    /// Pool epoch that issued this handle
    #[inline]
    pub fn pool(self) -> PoolId {
        self.pool
    }
}

impl fmt::Display for Allocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.pool, self.offset)
    }
}
