//! Error types for mempool
//!
//! Uses thiserror for clean, idiomatic Rust error definitions.

use thiserror::Error;

use crate::pool::PoolId;

#[cfg(feature = "logging")]
use tracing::{error, warn};

// ============================================================================
// Main Error Types
// ============================================================================

/// Memory pool errors
#[must_use = "errors should be handled"]
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum MemoryError {
    // --- Lifecycle Errors ---
    #[error("Initialization failed: {reason}")]
    InitializationFailed { reason: String },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("Memory pool is not initialized")]
    NotInitialized,

    // --- Pool Errors ---
    #[error(
        "Memory pool '{pool}' exhausted: requested {requested} bytes, largest free block {largest_free} (capacity: {capacity})"
    )]
    PoolExhausted {
        pool: String,
        requested: usize,
        largest_free: usize,
        capacity: usize,
    },

    // --- Handle Errors ---
    #[error("Allocation from {found} presented to {expected} (stale or foreign handle)")]
    ForeignAllocation { expected: PoolId, found: PoolId },

    #[error("No block starts at offset {offset}")]
    InvalidPointer { offset: usize },

    #[error("Double free of block at offset {offset}")]
    DoubleFree { offset: usize },

    #[error("Block at offset {offset} is not allocated")]
    NotAllocated { offset: usize },

    // --- System Errors ---
    #[error("Memory corruption detected in {component}: {details}")]
    Corruption { component: String, details: String },
}

impl MemoryError {
    /// Check if error is retryable
    ///
    /// Only exhaustion qualifies: freeing other blocks can make room.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::PoolExhausted { .. })
    }

    /// Check if error stems from handing the pool a bad handle or state
    #[must_use]
    pub fn is_misuse(&self) -> bool {
        matches!(
            self,
            Self::ForeignAllocation { .. }
                | Self::InvalidPointer { .. }
                | Self::DoubleFree { .. }
                | Self::NotAllocated { .. }
                | Self::NotInitialized
        )
    }

    /// Get error code for categorization
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InitializationFailed { .. } => "MEM:SYSTEM:INIT",
            Self::InvalidConfig { .. } => "MEM:CONFIG:INVALID",
            Self::NotInitialized => "MEM:POOL:UNINITIALIZED",
            Self::PoolExhausted { .. } => "MEM:POOL:EXHAUSTED",
            Self::ForeignAllocation { .. } => "MEM:HANDLE:FOREIGN",
            Self::InvalidPointer { .. } => "MEM:HANDLE:INVALID",
            Self::DoubleFree { .. } => "MEM:HANDLE:DOUBLE_FREE",
            Self::NotAllocated { .. } => "MEM:HANDLE:NOT_ALLOCATED",
            Self::Corruption { .. } => "MEM:SYSTEM:CORRUPTION",
        }
    }

    // ============================================================================
    // Convenience Constructors
    // ============================================================================

    /// Create initialization failed error
    pub fn initialization_failed(component: &str) -> Self {
        #[cfg(feature = "logging")]
        error!("Failed to initialize {component}");

        Self::InitializationFailed {
            reason: format!("failed to initialize {component}"),
        }
    }

    /// Create invalid pool config error
    pub fn invalid_pool_config(reason: &str) -> Self {
        Self::InvalidConfig {
            reason: format!("invalid pool config: {reason}"),
        }
    }

    /// Create pool exhausted error
    pub fn pool_exhausted(
        pool: &str,
        requested: usize,
        largest_free: usize,
        capacity: usize,
    ) -> Self {
        #[cfg(feature = "logging")]
        warn!(pool, requested, largest_free, "Memory pool exhausted");

        Self::PoolExhausted {
            pool: pool.to_string(),
            requested,
            largest_free,
            capacity,
        }
    }

    /// Create foreign allocation error
    pub fn foreign_allocation(expected: PoolId, found: PoolId) -> Self {
        #[cfg(feature = "logging")]
        warn!(%expected, %found, "Handle does not belong to this pool");

        Self::ForeignAllocation { expected, found }
    }

    /// Create invalid pointer error
    pub fn invalid_pointer(offset: usize) -> Self {
        #[cfg(feature = "logging")]
        warn!(offset, "No block starts at offset");

        Self::InvalidPointer { offset }
    }

    /// Create double free error
    pub fn double_free(offset: usize) -> Self {
        #[cfg(feature = "logging")]
        warn!(offset, "Double free ignored");

        Self::DoubleFree { offset }
    }

    /// Create not allocated error
    pub fn not_allocated(offset: usize) -> Self {
        Self::NotAllocated { offset }
    }

    /// Create memory corruption error
    pub fn corruption(component: &str, details: &str) -> Self {
        #[cfg(feature = "logging")]
        error!("Memory corruption: {component} - {details}");

        Self::Corruption {
            component: component.to_string(),
            details: details.to_string(),
        }
    }
}

// ============================================================================
// Result Types
// ============================================================================

/// Result type for memory operations
pub type MemoryResult<T> = core::result::Result<T, MemoryError>;

/// Generic result type alias
pub type Result<T> = MemoryResult<T>;

// ============================================================================
// Tests
// ============================================================================
