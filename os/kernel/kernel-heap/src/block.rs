//! Block navigation: locating a block's neighbors and converting
//! between header addresses and payload addresses.
//!
//! This module owns every raw pointer computation the allocator
//! performs, the way a single module owns the pointer arithmetic for
//! one paging level in a page-table implementation — keeping all of
//! it in one place makes the unsafe surface auditable.

use core::ptr::NonNull;

use crate::codec::BlockTag;
use crate::config::HeapConfig;

/// A block on the heap, identified by the address of its header word.
///
/// Copy/clone are cheap (it's just a pointer); all the interesting
/// behavior lives in the methods below, which read and write through
/// the pointer unsafely.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Block {
    header: NonNull<u8>,
}

impl Block {
    /// Wraps the header address `addr` as a `Block`. `addr` must point
    /// at a valid, live header word.
    #[must_use]
    pub fn at(addr: NonNull<u8>) -> Self {
        Self { header: addr }
    }

    /// The address of this block's header word.
    #[must_use]
    pub fn addr(&self) -> NonNull<u8> {
        self.header
    }

    #[must_use]
    fn header_ptr(&self) -> *mut u64 {
        self.header.as_ptr().cast()
    }

    /// Reads this block's header tag.
    #[must_use]
    pub fn tag(&self) -> BlockTag {
        // SAFETY: caller-established invariant that `header` points at
        // a live header word.
        BlockTag::from_bits(unsafe { self.header_ptr().read() })
    }

    /// Overwrites this block's header tag.
    pub fn set_tag(&self, tag: BlockTag) {
        // SAFETY: see `tag`.
        unsafe { self.header_ptr().write(tag.into_bits()) }
    }

    /// This block's total size in bytes, as recorded in its header.
    #[must_use]
    pub fn size(&self) -> usize {
        self.tag().size()
    }

    /// Whether this block is currently allocated.
    #[must_use]
    pub fn is_allocated(&self) -> bool {
        self.tag().this_alloc()
    }

    /// Whether the block immediately preceding this one is allocated.
    ///
    /// Reading this bit is always safe; it is what makes [`Self::prev`]
    /// possible without scanning from the start of the heap.
    #[must_use]
    pub fn prev_allocated(&self) -> bool {
        self.tag().prev_alloc()
    }

    /// Sets the `prev_alloc` bit without disturbing size or
    /// `this_alloc`.
    pub fn set_prev_allocated(&self, prev_alloc: bool) {
        let mut tag = self.tag();
        tag.set_prev_alloc(prev_alloc);
        self.set_tag(tag);
    }

    /// This block's footer address, valid only while the block is free.
    #[must_use]
    fn footer_ptr(&self) -> *mut u64 {
        // SAFETY: footer lives at `header + size - WORD_SIZE`; callers
        // only invoke this on free blocks, which reserve that word.
        unsafe {
            self.header
                .as_ptr()
                .add(self.size() - HeapConfig::WORD_SIZE)
                .cast()
        }
    }

    /// Writes this (free) block's footer to match its header.
    pub fn write_footer(&self) {
        let tag = BlockTag::pack(self.size(), false, false);
        // SAFETY: block is free (caller-enforced), so the footer word
        // is reserved payload.
        unsafe { self.footer_ptr().write(tag.into_bits()) };
    }

    /// The next block, computed by striding past this block's size.
    ///
    /// Valid whenever `size() > 0`; calling it on the epilogue (size 0)
    /// would alias this block with itself, so callers check size first.
    #[must_use]
    pub fn next(&self) -> Self {
        // SAFETY: `size()` bytes ahead of a live block's header is
        // itself a live header (the next block, or the epilogue).
        let next = unsafe { self.header.as_ptr().add(self.size()) };
        Self::at(NonNull::new(next).expect("next block address is never null"))
    }

    /// The previous block, by reading its footer.
    ///
    /// # Panics
    /// Panics (debug builds) if `prev_allocated()` is `true`: an
    /// allocated predecessor has no footer to read, per the heap's
    /// footer-omission invariant.
    #[must_use]
    pub fn prev(&self) -> Self {
        debug_assert!(
            !self.prev_allocated(),
            "previous block has no footer while allocated"
        );
        // SAFETY: the word immediately before this header is the
        // previous block's footer, present because `prev_allocated()`
        // is false.
        let footer = unsafe { self.header.as_ptr().sub(HeapConfig::WORD_SIZE).cast::<u64>() };
        let prev_size = BlockTag::from_bits(unsafe { footer.read() }).size();
        let prev_header = unsafe { self.header.as_ptr().sub(prev_size) };
        Self::at(NonNull::new(prev_header).expect("previous block address is never null"))
    }

    /// The user-visible payload address for this (allocated) block.
    #[must_use]
    pub fn payload(&self) -> NonNull<u8> {
        // SAFETY: the payload always starts one word past the header.
        NonNull::new(unsafe { self.header.as_ptr().add(HeapConfig::WORD_SIZE) })
            .expect("payload address is never null")
    }

    /// Recovers the block owning a payload pointer previously returned
    /// by [`Self::payload`].
    #[must_use]
    pub fn from_payload(payload: NonNull<u8>) -> Self {
        // SAFETY: inverse of `payload`; `payload` must have come from
        // this module.
        let header = unsafe { payload.as_ptr().sub(HeapConfig::WORD_SIZE) };
        Self::at(NonNull::new(header).expect("header address is never null"))
    }

    /// Number of usable payload bytes in this block (size minus the
    /// header word).
    #[must_use]
    pub fn payload_size(&self) -> usize {
        self.size() - HeapConfig::WORD_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_buf(len: usize) -> std::vec::Vec<u8> {
        std::vec::vec![0u8; len]
    }

    #[test]
    fn next_strides_by_size() {
        let mut buf = make_buf(64);
        let base = NonNull::new(buf.as_mut_ptr()).unwrap();
        let b = Block::at(base);
        b.set_tag(BlockTag::pack(32, true, true));
        let n = b.next();
        assert_eq!(n.addr().as_ptr() as usize, base.as_ptr() as usize + 32);
    }

    #[test]
    fn prev_reads_footer_size() {
        let mut buf = make_buf(96);
        let base = NonNull::new(buf.as_mut_ptr()).unwrap();
        let first = Block::at(base);
        first.set_tag(BlockTag::pack(32, false, true));
        first.write_footer();

        let second_addr = NonNull::new(unsafe { base.as_ptr().add(32) }).unwrap();
        let second = Block::at(second_addr);
        second.set_tag(BlockTag::pack(32, true, false));

        let recovered = second.prev();
        assert_eq!(recovered.addr(), first.addr());
        assert_eq!(recovered.size(), 32);
    }

    #[test]
    fn payload_roundtrip() {
        let mut buf = make_buf(32);
        let base = NonNull::new(buf.as_mut_ptr()).unwrap();
        let b = Block::at(base);
        b.set_tag(BlockTag::pack(32, true, true));
        let p = b.payload();
        assert_eq!(Block::from_payload(p).addr(), b.addr());
        assert_eq!(b.payload_size(), 24);
    }
}
