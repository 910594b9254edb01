//! # mempool-allocator
//!
//! Fixed-capacity memory pool with a first-fit block directory.
//!
//! One arena is reserved when the pool is created; afterwards every
//! allocation, free, and resize is served from that arena without going back
//! to the system allocator for payload bytes.
//!
//! ## Quick Start
//!
//! ```rust
//! use mempool_allocator::prelude::*;
//!
//! fn main() -> MemoryResult<()> {
//!     let mut pool = PoolAllocator::new(1024)?;
//!
//!     let header = pool.allocate(64)?;
//!     pool.bytes_mut(header)?.fill(0x2A);
//!
//!     // grows in place when the next block is free, moves otherwise
//!     let header = pool.resize(Some(header), 128)?.expect("non-zero size");
//!     assert_eq!(pool.bytes(header)?[0], 0x2A);
//!
//!     pool.free(header)?;
//!     assert!(pool.is_empty());
//!     Ok(())
//! }
//! ```
//!
//! ## How It Works
//!
//! ```text
//!   arena    [ used 64 ][ free 32 ][ used 128 ][        free 800        ]
//!   blocks   (0,64,U) → (64,32,F) → (96,128,U) → (224,800,F)
//! ```
//!
//! - **allocate** takes the lowest-offset free block that fits and splits off
//!   the unused tail as a new free block
//! - **free** marks the block free and merges it with free neighbours, so two
//!   free blocks are never adjacent
//! - **resize** shrinks in place, grows into a free successor when it can,
//!   and otherwise copies the payload to a fresh block
//!
//! Handles ([`Allocation`]) are arena offsets tagged with the pool epoch and
//! are validated on every call.
//!
//! ## Features
//!
//! - `logging` (default): diagnostics through `tracing`
//! - `serde`: `Serialize`/`Deserialize` for config, stats, and blocks
//!
//! ## Limitations
//!
//! - **Single owner**: every mutating call takes `&mut self`
//! - **Byte granularity**: no alignment beyond 1
//! - **Fixed size**: the arena never grows

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod error;
pub mod manager;
pub mod pool;

pub use crate::error::{MemoryError, MemoryResult, Result};
pub use crate::manager::PoolManager;
pub use crate::pool::{Allocation, Block, PoolAllocator, PoolConfig, PoolId, PoolStats};

pub mod prelude {
    //! Convenient re-exports of commonly used types.

    pub use crate::error::{MemoryError, MemoryResult};
    pub use crate::manager::PoolManager;
    pub use crate::pool::{Allocation, Block, PoolAllocator, PoolConfig, PoolStats};
}
