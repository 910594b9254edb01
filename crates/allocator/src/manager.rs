//! Pool lifecycle manager
//!
//! [`PoolManager`] owns at most one [`PoolAllocator`] and gives it an
//! explicit init / deinit lifecycle. Operations on a manager without a live
//! pool fail with [`MemoryError::NotInitialized`] instead of touching stale
//! state.

#[cfg(feature = "logging")]
use tracing::{debug, warn};

use crate::error::{MemoryError, MemoryResult};
use crate::pool::{Allocation, PoolAllocator, PoolConfig};

/// Owner of a single pool with an explicit lifecycle
#[derive(Debug, Default)]
pub struct PoolManager {
    pool: Option<PoolAllocator>,
    config: PoolConfig,
}

impl PoolManager {
    /// Creates an uninitialized manager with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an uninitialized manager whose pools use `config`
    #[must_use]
    pub fn with_config(config: PoolConfig) -> Self {
        Self { pool: None, config }
    }

    /// Reserves a pool of `capacity` bytes
    ///
    /// A pool that is already live is released first; its handles are
    /// rejected by the new pool. If the new reservation fails the manager
    /// is left uninitialized.
    pub fn init(&mut self, capacity: usize) -> MemoryResult<()> {
        if let Some(previous) = self.pool.take() {
            #[cfg(feature = "logging")]
            warn!(
                pool = %previous.id(),
                capacity = previous.capacity(),
                "Re-initializing live pool, releasing previous arena"
            );
            drop(previous);
        }

        self.pool = Some(PoolAllocator::with_config(capacity, self.config.clone())?);
        Ok(())
    }

    /// Releases the pool and every block; no-op when uninitialized
    pub fn deinit(&mut self) {
        if let Some(pool) = self.pool.take() {
            #[cfg(feature = "logging")]
            debug!(pool = %pool.id(), name = pool.name(), "Pool released");
            drop(pool);
        }
    }

    /// Whether a pool is live
    pub fn is_initialized(&self) -> bool {
        self.pool.is_some()
    }

    /// The live pool
    pub fn pool(&self) -> MemoryResult<&PoolAllocator> {
        self.pool.as_ref().ok_or(MemoryError::NotInitialized)
    }

    /// The live pool, mutably
    pub fn pool_mut(&mut self) -> MemoryResult<&mut PoolAllocator> {
        self.pool.as_mut().ok_or(MemoryError::NotInitialized)
    }

    /// See [`PoolAllocator::allocate`]
    pub fn allocate(&mut self, size: usize) -> MemoryResult<Allocation> {
        self.pool_mut()?.allocate(size)
    }

    /// See [`PoolAllocator::free`]
    pub fn free(&mut self, allocation: Allocation) -> MemoryResult<()> {
        self.pool_mut()?.free(allocation)
    }

    /// See [`PoolAllocator::resize`]
    pub fn resize(
        &mut self,
        allocation: Option<Allocation>,
        new_size: usize,
    ) -> MemoryResult<Option<Allocation>> {
        self.pool_mut()?.resize(allocation, new_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operations_require_init() {
        let mut manager = PoolManager::new();
        assert!(!manager.is_initialized());
        assert!(matches!(
            manager.allocate(8),
            Err(MemoryError::NotInitialized)
        ));
        assert!(matches!(
            manager.resize(None, 8),
            Err(MemoryError::NotInitialized)
        ));
    }

    #[test]
    fn test_init_deinit_cycle() {
        let mut manager = PoolManager::with_config(PoolConfig::performance());
        manager.init(64).unwrap();
        let a = manager.allocate(16).unwrap();
        manager.free(a).unwrap();

        manager.deinit();
        assert!(!manager.is_initialized());
        assert!(matches!(manager.free(a), Err(MemoryError::NotInitialized)));

        // deinit twice is harmless
        manager.deinit();
    }

    #[test]
    fn test_reinit_releases_previous_pool() {
        let mut manager = PoolManager::with_config(PoolConfig::performance());
        manager.init(32).unwrap();
        let stale = manager.allocate(8).unwrap();

        manager.init(128).unwrap();
        let pool = manager.pool().unwrap();
        assert_eq!(pool.capacity(), 128);
        assert!(pool.is_empty());
        assert!(matches!(
            manager.free(stale),
            Err(MemoryError::ForeignAllocation { .. })
        ));
    }

    #[test]
    fn test_failed_reinit_leaves_manager_uninitialized() {
        let mut manager = PoolManager::with_config(PoolConfig::performance());
        manager.init(32).unwrap();
        assert!(manager.init(0).is_err());
        assert!(!manager.is_initialized());
    }
}
