//! Error types for the allocator's one fallible external dependency.

/// The page provider refused to grow the heap.
///
/// This is the only error the core ever produces; every public
/// operation (`alloc`, `resize`, `zero_alloc`) converts it to `None`
/// rather than surfacing a `Result`, per the allocator's "no
/// exceptions, every failure path yields NULL or a boolean" contract.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// The page provider could not satisfy the requested growth.
    #[error("page provider out of memory")]
    OutOfMemory,
}
