//! Block header/footer codec.
//!
//! A block's metadata word packs three fields into a single [`u64`]:
//! the block size (bits 4..64, since every block size is a multiple of
//! 16) and two single-bit flags in the low nibble. Using a
//! [`bitfield_struct::bitfield`] gives named accessors instead of manual
//! shifting, the same trick a page-table entry type uses for its own
//! packed word.

use bitfield_struct::bitfield;

use crate::config::HeapConfig;

/// A packed block header or footer word.
///
/// - `this_alloc` (bit 0): the block described by this tag is allocated.
/// - `prev_alloc` (bit 1): the block immediately preceding this one on
///   the heap is allocated. Unused (always `false`) in footers.
/// - bits 2..4 are reserved and always zero.
/// - `size` (bits 4..64): the block's total size in bytes, stored as a
///   60-bit count of 16-byte units so the low 4 bits of the real size
///   are implicitly zero.
#[bitfield(u64)]
pub struct BlockTag {
    pub this_alloc: bool,
    pub prev_alloc: bool,
    #[bits(2)]
    _reserved: u8,
    #[bits(60)]
    size_units: u64,
}

impl BlockTag {
    /// Packs a tag from a byte size and the two allocation flags.
    ///
    /// # Panics
    /// Panics in debug builds if `size` is not a multiple of
    /// [`HeapConfig::DOUBLE_WORD_SIZE`].
    #[must_use]
    pub fn pack(size: usize, this_alloc: bool, prev_alloc: bool) -> Self {
        debug_assert_eq!(
            size % HeapConfig::DOUBLE_WORD_SIZE,
            0,
            "block size must be a multiple of the double-word size"
        );
        Self::new()
            .with_this_alloc(this_alloc)
            .with_prev_alloc(prev_alloc)
            .with_size_units((size / HeapConfig::DOUBLE_WORD_SIZE) as u64)
    }

    /// The block size in bytes this tag describes.
    #[must_use]
    pub fn size(&self) -> usize {
        (self.size_units() as usize) * HeapConfig::DOUBLE_WORD_SIZE
    }
}
