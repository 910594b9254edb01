//! Main pool allocator implementation
//!
//! One arena is reserved at construction and never resized. Requests are
//! served from it first-fit, walking the block directory from offset 0.
//!
//! ## Invariants
//!
//! - The arena length equals `capacity` for the lifetime of the pool
//! - The directory covers the arena exactly once with no adjacent free blocks
//! - Every `Allocation` returned names the start of an occupied block in the
//!   current epoch
//! - Failed operations leave directory and arena untouched

use core::fmt;

#[cfg(feature = "logging")]
use tracing::{debug, trace};

use super::directory::{Block, Directory, Lookup};
use super::{Allocation, PoolConfig, PoolId, PoolStats};
use crate::error::{MemoryError, MemoryResult};
use crate::pool::stats::Counters;

/// First-fit allocator over a fixed-capacity byte arena
///
/// # Memory Layout
/// ```text
/// arena:  [ A (used) ][ free ][    B (used)    ][      free      ]
///         ^0          ^16    ^24               ^64              ^128
/// ```
///
/// Mutation goes through `&mut self`, so a pool has exactly one user at a
/// time; wrap it in a lock if it must be shared.
pub struct PoolAllocator {
    /// Current epoch; handles from other epochs are rejected
    id: PoolId,

    /// Owned arena, reserved once
    memory: Box<[u8]>,

    /// Ordered block map of the arena
    directory: Directory,

    /// Configuration
    config: PoolConfig,

    /// Statistics (only updated if enabled)
    counters: Counters,
}

impl PoolAllocator {
    /// Creates a new pool with custom configuration
    ///
    /// # Errors
    /// Returns an error if:
    /// - `capacity` is zero
    /// - The arena cannot be reserved
    pub fn with_config(capacity: usize, config: PoolConfig) -> MemoryResult<Self> {
        if capacity == 0 {
            return Err(MemoryError::invalid_pool_config(
                "pool capacity must be non-zero",
            ));
        }

        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(capacity)
            .map_err(|_| MemoryError::initialization_failed("pool arena"))?;
        buffer.resize(capacity, config.dealloc_pattern.unwrap_or(0));

        let pool = Self {
            id: PoolId::next(),
            memory: buffer.into_boxed_slice(),
            directory: Directory::new(capacity),
            config,
            counters: Counters::default(),
        };

        #[cfg(feature = "logging")]
        debug!(pool = %pool.config.name, id = %pool.id, capacity, "Pool initialized");

        Ok(pool)
    }

    /// Creates a new pool with default configuration
    pub fn new(capacity: usize) -> MemoryResult<Self> {
        Self::with_config(capacity, PoolConfig::default())
    }

    /// Creates a pool with production config
    pub fn production(capacity: usize) -> MemoryResult<Self> {
        Self::with_config(capacity, PoolConfig::production())
    }

    /// Creates a pool with debug config - fill patterns and statistics on
    pub fn debug(capacity: usize) -> MemoryResult<Self> {
        Self::with_config(capacity, PoolConfig::debug())
    }

    /// Creates a pool with performance config - minimal overhead
    pub fn performance(capacity: usize) -> MemoryResult<Self> {
        Self::with_config(capacity, PoolConfig::performance())
    }

    /// Reserves `size` bytes from the first free block that fits
    ///
    /// A `size` of zero is a [`probe`](Self::probe): nothing is reserved.
    ///
    /// # Errors
    /// [`MemoryError::PoolExhausted`] when no free block is large enough;
    /// the pool is left unchanged.
    pub fn allocate(&mut self, size: usize) -> MemoryResult<Allocation> {
        if size == 0 {
            return self.probe();
        }

        let Some(index) = self.directory.first_fit(size) else {
            if self.config.track_stats {
                self.counters.failed_allocs += 1;
            }
            return Err(self.exhausted(size));
        };

        self.directory.occupy(index, size);
        let offset = self.directory.block(index).offset();
        if let Some(pattern) = self.config.alloc_pattern {
            self.memory[offset..offset + size].fill(pattern);
        }

        if self.config.track_stats {
            self.counters.record_alloc(self.directory.used_bytes());
        }

        #[cfg(feature = "logging")]
        trace!(pool = %self.config.name, offset, size, "Allocated block");

        Ok(Allocation::new(self.id, offset))
    }

    /// Returns a handle to the start of the first free block without
    /// reserving it
    ///
    /// The handle aliases whatever the next allocation from that block
    /// receives. Freeing it reports [`MemoryError::DoubleFree`]; resizing it
    /// or reading through it reports [`MemoryError::NotAllocated`].
    pub fn probe(&self) -> MemoryResult<Allocation> {
        match self.directory.first_free() {
            Some(index) => Ok(Allocation::new(self.id, self.directory.block(index).offset())),
            None => Err(self.exhausted(0)),
        }
    }

    /// Releases a block and merges it with free neighbours
    ///
    /// # Errors
    /// - [`MemoryError::ForeignAllocation`] for handles of another pool or epoch
    /// - [`MemoryError::DoubleFree`] when the block is already free
    /// - [`MemoryError::InvalidPointer`] when no block starts at the offset
    ///
    /// The pool is unchanged on every error path.
    pub fn free(&mut self, allocation: Allocation) -> MemoryResult<()> {
        let index = self.locate(allocation)?;
        let block = self.directory.block(index);
        if block.is_free() {
            return Err(MemoryError::double_free(block.offset()));
        }

        if let Some(pattern) = self.config.dealloc_pattern {
            self.memory[block.offset()..block.end()].fill(pattern);
        }
        self.directory.release(index);
        if self.config.track_stats {
            self.counters.total_frees += 1;
        }

        #[cfg(feature = "logging")]
        trace!(pool = %self.config.name, offset = block.offset(), size = block.size(), "Freed block");

        Ok(())
    }

    /// Changes the size of a block, moving it only when it cannot grow in
    /// place
    ///
    /// - `None` behaves as [`allocate`](Self::allocate)`(new_size)`
    /// - `new_size == 0` behaves as [`free`](Self::free) and returns `None`
    /// - shrinking keeps the handle and frees the tail
    /// - growing into a free successor keeps the handle
    /// - otherwise the payload is copied into a fresh block and the old one
    ///   is freed
    ///
    /// # Errors
    /// Handle errors as for [`free`](Self::free), [`MemoryError::NotAllocated`]
    /// for a free block, and [`MemoryError::PoolExhausted`] when no block can
    /// take the new size. The original block is intact on every error path.
    pub fn resize(
        &mut self,
        allocation: Option<Allocation>,
        new_size: usize,
    ) -> MemoryResult<Option<Allocation>> {
        let Some(allocation) = allocation else {
            return self.allocate(new_size).map(Some);
        };
        if new_size == 0 {
            self.free(allocation)?;
            return Ok(None);
        }

        let index = self.locate_occupied(allocation)?;
        let block = self.directory.block(index);

        if block.size() >= new_size {
            if let Some(pattern) = self.config.dealloc_pattern {
                self.memory[block.offset() + new_size..block.end()].fill(pattern);
            }
            self.directory.split(index, new_size);
            self.record_resize(false);
            return Ok(Some(allocation));
        }

        if self.directory.can_grow_in_place(index, new_size) {
            self.directory.absorb_next(index);
            self.directory.split(index, new_size);
            if let Some(pattern) = self.config.alloc_pattern {
                self.memory[block.end()..block.offset() + new_size].fill(pattern);
            }
            self.record_resize(false);
            return Ok(Some(allocation));
        }

        let target = self.allocate(new_size)?;
        let len = block.size().min(new_size);
        self.memory
            .copy_within(block.offset()..block.offset() + len, target.offset());
        self.free(allocation)?;
        self.record_resize(true);

        #[cfg(feature = "logging")]
        trace!(
            pool = %self.config.name,
            from = block.offset(),
            to = target.offset(),
            len,
            "Relocated block"
        );

        Ok(Some(target))
    }

    /// Payload bytes of an occupied block
    pub fn bytes(&self, allocation: Allocation) -> MemoryResult<&[u8]> {
        let block = self.directory.block(self.locate_occupied(allocation)?);
        Ok(&self.memory[block.offset()..block.end()])
    }

    /// Mutable payload bytes of an occupied block
    pub fn bytes_mut(&mut self, allocation: Allocation) -> MemoryResult<&mut [u8]> {
        let block = self.directory.block(self.locate_occupied(allocation)?);
        Ok(&mut self.memory[block.offset()..block.end()])
    }

    /// Returns every block to the free state
    ///
    /// Starts a new epoch: handles issued before the reset are rejected with
    /// [`MemoryError::ForeignAllocation`]. Statistics are cleared.
    pub fn reset(&mut self) {
        self.directory.reset();
        if let Some(pattern) = self.config.dealloc_pattern {
            self.memory.fill(pattern);
        }
        self.id = PoolId::next();
        self.counters = Counters::default();

        #[cfg(feature = "logging")]
        debug!(pool = %self.config.name, id = %self.id, "Pool reset");
    }

    /// Blocks in arena order
    pub fn blocks(&self) -> impl ExactSizeIterator<Item = &Block> + '_ {
        self.directory.blocks().iter()
    }

    /// Verifies the directory invariants
    pub fn check_invariants(&self) -> MemoryResult<()> {
        self.directory.check()
    }

    /// Current epoch id
    pub fn id(&self) -> PoolId {
        self.id
    }

    /// Pool name from the configuration
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Active configuration
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Returns the total capacity in bytes
    pub fn capacity(&self) -> usize {
        self.memory.len()
    }

    /// Returns the number of occupied bytes
    pub fn used_bytes(&self) -> usize {
        self.directory.used_bytes()
    }

    /// Returns the number of free bytes
    pub fn free_bytes(&self) -> usize {
        self.directory.free_bytes()
    }

    /// Size of the largest single request that can currently succeed
    pub fn largest_free_block(&self) -> usize {
        self.directory.largest_free()
    }

    /// Returns the number of blocks in the directory
    pub fn block_count(&self) -> usize {
        self.directory.blocks().len()
    }

    /// Returns the number of free blocks
    pub fn free_block_count(&self) -> usize {
        self.directory.free_count()
    }

    /// Checks if nothing is allocated
    pub fn is_empty(&self) -> bool {
        self.used_bytes() == 0
    }

    /// Checks if no free block remains
    pub fn is_full(&self) -> bool {
        self.directory.first_free().is_none()
    }

    /// Fraction of free space not usable by a single request
    pub fn fragmentation(&self) -> f64 {
        let free = self.free_bytes();
        if free == 0 {
            return 0.0;
        }
        1.0 - self.largest_free_block() as f64 / free as f64
    }

    /// Get statistics (if tracking is enabled)
    pub fn stats(&self) -> Option<PoolStats> {
        if !self.config.track_stats {
            return None;
        }

        let used = self.used_bytes();
        Some(PoolStats {
            total_allocs: self.counters.total_allocs,
            total_frees: self.counters.total_frees,
            total_resizes: self.counters.total_resizes,
            relocations: self.counters.relocations,
            failed_allocs: self.counters.failed_allocs,
            peak_usage: self.counters.peak_usage,
            current_usage: used,
            free_bytes: self.capacity() - used,
            block_count: self.block_count(),
            free_blocks: self.free_block_count(),
            largest_free_block: self.largest_free_block(),
        })
    }

    /// Clears the counters without touching allocations
    pub fn reset_statistics(&mut self) {
        self.counters = Counters::default();
    }

    /// Index of the block starting at the handle's offset, free or not
    fn locate(&self, allocation: Allocation) -> MemoryResult<usize> {
        if allocation.pool() != self.id {
            return Err(MemoryError::foreign_allocation(self.id, allocation.pool()));
        }

        let offset = allocation.offset();
        match self.directory.lookup(offset) {
            Lookup::Start(index) => Ok(index),
            // freed earlier and merged into its predecessor
            Lookup::Inside(index) if self.directory.block(index).is_free() => {
                Err(MemoryError::double_free(offset))
            }
            Lookup::Inside(_) | Lookup::OutOfRange => Err(MemoryError::invalid_pointer(offset)),
        }
    }

    fn locate_occupied(&self, allocation: Allocation) -> MemoryResult<usize> {
        let index = match self.locate(allocation) {
            Err(MemoryError::DoubleFree { offset }) => {
                return Err(MemoryError::not_allocated(offset));
            }
            result => result?,
        };
        if self.directory.block(index).is_free() {
            return Err(MemoryError::not_allocated(allocation.offset()));
        }
        Ok(index)
    }

    fn record_resize(&mut self, relocated: bool) {
        if self.config.track_stats {
            self.counters
                .record_resize(self.directory.used_bytes(), relocated);
        }
    }

    fn exhausted(&self, requested: usize) -> MemoryError {
        MemoryError::pool_exhausted(
            &self.config.name,
            requested,
            self.directory.largest_free(),
            self.capacity(),
        )
    }
}

impl fmt::Debug for PoolAllocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolAllocator")
            .field("id", &self.id)
            .field("name", &self.config.name)
            .field("capacity", &self.capacity())
            .field("used", &self.used_bytes())
            .field("blocks", &self.block_count())
            .finish_non_exhaustive()
    }
}

/// Directory dump, one line per block
impl fmt::Display for PoolAllocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "pool '{}' ({}): {} / {} bytes used, {} blocks",
            self.config.name,
            self.id,
            self.used_bytes(),
            self.capacity(),
            self.block_count()
        )?;
        for block in self.blocks() {
            writeln!(
                f,
                "  [{:>8}..{:>8}) {:>8} bytes  {}",
                block.offset(),
                block.end(),
                block.size(),
                if block.is_free() { "free" } else { "used" }
            )?;
        }
        Ok(())
    }
}
