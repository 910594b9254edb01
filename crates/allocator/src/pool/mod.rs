//! Pool allocator implementation
//!
//! A fixed-capacity pool carved into variable-sized blocks, first-fit, with
//! immediate coalescing of free neighbours.
//!
//! ## Modules
//! - `allocator` - Main PoolAllocator implementation
//! - `config` - Configuration variants (production, debug, performance)
//! - `directory` - Ordered block map of the arena
//! - `handle` - Pool ids and allocation handles
//! - `stats` - Statistics tracking types

pub mod allocator;
pub mod config;
mod directory;
pub mod handle;
pub mod stats;

pub use allocator::PoolAllocator;
pub use config::PoolConfig;
pub use directory::Block;
pub use handle::{Allocation, PoolId};
pub use stats::PoolStats;
