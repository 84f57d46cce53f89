//! Error types returned by heap operations.

use thiserror::Error;

/// Heap operation result type.
pub type HeapResult<T> = Result<T, HeapError>;

/// Heap operation errors.
///
/// All of these are recoverable and reported to the immediate caller.
/// Broken internal invariants are bugs in the heap itself and surface as debug assertions instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HeapError {
    /// The heap was created with a zero capacity.
    #[error("heap capacity must be positive")]
    InvalidCapacity,

    /// An allocation of zero bytes was requested.
    #[error("allocation size must be positive")]
    InvalidSize,

    /// No free block is long enough for the request.
    /// Freeing memory or compacting the heap might make room.
    #[error("no free block can hold {size} bytes")]
    NoFit { size: usize },

    /// The address doesn't belong to a live allocation (never allocated or already freed).
    #[error("address {address} is not a live allocation")]
    InvalidFree { address: usize },

    /// Relocation buffers handed to compaction can't hold one entry per live allocation.
    #[error("compaction needs room for {required} relocations, got {provided}")]
    OutputCapacityExceeded { required: usize, provided: usize },

    /// Payload access for an address that doesn't start a live allocation.
    #[error("no live allocation starts at address {address}")]
    UnknownBlock { address: usize },

    /// A placement strategy name that doesn't match any strategy.
    #[error("unknown placement strategy: {0}")]
    UnknownStrategy(String),
}
