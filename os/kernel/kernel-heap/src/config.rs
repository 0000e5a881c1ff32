//! Allocator tunables.
//!
//! Centralizes the constants that govern the heap's layout and search
//! behavior in one place rather than scattering magic numbers across
//! call sites.

/// Marker type carrying the allocator's tunable constants as associated
/// items, so they can be referenced as `HeapConfig::WORD_SIZE` etc.
/// without instantiating anything.
pub struct HeapConfig;

impl HeapConfig {
    /// Size of a word: the unit of header/footer metadata (bytes).
    pub const WORD_SIZE: usize = 8;

    /// Double-word size: payload alignment and minimum size granularity
    /// (bytes).
    pub const DOUBLE_WORD_SIZE: usize = 2 * Self::WORD_SIZE;

    /// Minimum block size: large enough to hold a header, footer, and
    /// the two free-list pointers threaded through a free block's
    /// payload.
    pub const MIN_BLOCK_SIZE: usize = 2 * Self::DOUBLE_WORD_SIZE;

    /// Default amount (bytes) by which the heap is extended when no
    /// fitting free block exists.
    pub const CHUNK_SIZE: usize = 2048;

    /// Maximum number of free-list nodes [`crate::fit::find_fit`] will
    /// visit before giving up, bounding worst-case allocation latency.
    pub const FIT_SEARCH_CAP: usize = 200;
}

/// Rounds `size` up to the next multiple of `granularity`.
///
/// `granularity` must be a power of two.
#[must_use]
pub const fn round_up(size: usize, granularity: usize) -> usize {
    (size + (granularity - 1)) & !(granularity - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_up_examples() {
        assert_eq!(round_up(0, 16), 0);
        assert_eq!(round_up(1, 16), 16);
        assert_eq!(round_up(16, 16), 16);
        assert_eq!(round_up(17, 16), 32);
    }
}
