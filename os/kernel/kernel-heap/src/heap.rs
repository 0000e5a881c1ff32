//! The public surface: `init`, `alloc`, `release`, `resize`,
//! `zero_alloc`, and the heap-growth step they share.
//!
//! Every failure path here returns `None`/`false`/`()` rather than
//! `Result` — the core never panics or propagates an error type to its
//! caller.

use core::ptr::NonNull;

use log::{debug, trace, warn};

use crate::block::Block;
use crate::checker;
use crate::codec::BlockTag;
use crate::coalesce::coalesce;
use crate::config::{round_up, HeapConfig};
use crate::fit::find_fit;
use crate::free_list::FreeList;
use crate::place::place;
use crate::provider::PageProvider;

/// A dynamic memory heap over a single growable region supplied by
/// `P`.
///
/// Not `Sync`: concurrent calls into one instance are a caller bug. See
/// [`crate::global`] for a synchronized wrapper suited to a single
/// global static instance.
pub struct Heap<P: PageProvider> {
    provider: P,
    list: FreeList,
    /// Address of the first real block (i.e. the original epilogue
    /// header written by `init`, before the first `extend_heap` turned
    /// it into a free block's header). This address never changes once
    /// set: the heap only ever grows at its high end.
    first_block: Option<Block>,
    initialized: bool,
}

impl<P: PageProvider> Heap<P> {
    /// Wraps `provider` in a heap that has not yet requested any
    /// memory from it.
    pub const fn new(provider: P) -> Self {
        Self {
            provider,
            list: FreeList::new(),
            first_block: None,
            initialized: false,
        }
    }

    /// Initializes the heap: writes the prologue/epilogue sentinels and
    /// performs the first growth of [`HeapConfig::CHUNK_SIZE`] bytes.
    ///
    /// Idempotent-by-convention: callers are expected to call this at
    /// most once (`alloc` calls it lazily), but a second call would
    /// simply re-request sentinel space and is not guarded against here
    /// — mirroring the original `mm_init`, which the driver also only
    /// ever calls once per heap instance.
    pub fn init(&mut self) -> bool {
        let Ok(base) = self.provider.sbrk(2 * HeapConfig::WORD_SIZE) else {
            return false;
        };

        let prologue = Block::at(base);
        prologue.set_tag(BlockTag::pack(0, true, true));

        // SAFETY: `base + WORD_SIZE` is within the just-granted 2-word span.
        let epilogue_addr =
            NonNull::new(unsafe { base.as_ptr().add(HeapConfig::WORD_SIZE) })
                .expect("epilogue address is never null");
        let epilogue = Block::at(epilogue_addr);
        epilogue.set_tag(BlockTag::pack(0, true, true));

        self.first_block = Some(epilogue);
        self.initialized = true;

        if self.extend_heap(HeapConfig::CHUNK_SIZE).is_none() {
            return false;
        }

        debug!("heap initialized");
        true
    }

    fn ensure_init(&mut self) {
        if !self.initialized {
            self.init();
        }
    }

    /// Grows the heap by at least `bytes`, rounded up to a multiple of
    /// the double-word size, and forwards the new span to the
    /// coalescer. Returns `None` if the provider refuses to grow.
    fn extend_heap(&mut self, bytes: usize) -> Option<Block> {
        let bytes = round_up(bytes, HeapConfig::DOUBLE_WORD_SIZE);

        // The current epilogue sits at `heap_hi - WORD_SIZE`; its
        // `prev_alloc` bit records whether the last real block is
        // currently allocated, which the new free block inherits.
        let old_epilogue_addr =
            NonNull::new(unsafe { self.provider.heap_hi().sub(HeapConfig::WORD_SIZE) as *mut u8 })
                .expect("epilogue address is never null");
        let old_epilogue = Block::at(old_epilogue_addr);
        let prev_alloc = old_epilogue.prev_allocated();

        if let Err(err) = self.provider.sbrk(bytes) {
            warn!("heap extend by {bytes} bytes failed: {err}");
            return None;
        }

        let new_block = old_epilogue;
        new_block.set_tag(BlockTag::pack(bytes, false, prev_alloc));
        new_block.write_footer();

        let new_epilogue_addr =
            NonNull::new(unsafe { self.provider.heap_hi().sub(HeapConfig::WORD_SIZE) as *mut u8 })
                .expect("epilogue address is never null");
        Block::at(new_epilogue_addr).set_tag(BlockTag::pack(0, true, false));

        trace!("extended heap by {bytes} bytes");
        Some(coalesce(&mut self.list, new_block))
    }

    /// Allocates at least `size` bytes, returning a 16-byte-aligned
    /// payload pointer, or `None` if `size == 0`, `size` is so close to
    /// `usize::MAX` that adding the header overhead would overflow, or
    /// the heap could not grow far enough to satisfy the request.
    pub fn alloc(&mut self, size: usize) -> Option<NonNull<u8>> {
        self.ensure_init();
        if size == 0 {
            return None;
        }

        let with_header = size.checked_add(HeapConfig::WORD_SIZE)?;
        let asize = core::cmp::max(
            round_up(with_header, HeapConfig::DOUBLE_WORD_SIZE),
            HeapConfig::MIN_BLOCK_SIZE,
        );

        let block = match find_fit(&self.list, asize) {
            Some(block) => block,
            None => {
                let extend_size = core::cmp::max(asize, HeapConfig::CHUNK_SIZE);
                self.extend_heap(extend_size)?
            }
        };

        place(&mut self.list, block, asize);
        debug_assert!(self.check(), "heap corrupted after alloc");
        Some(block.payload())
    }

    /// Releases a previously allocated pointer. A no-op if `ptr` is
    /// `None`.
    ///
    /// # Safety-adjacent contract
    /// `ptr`, if present, must be a payload pointer this heap
    /// previously returned and that has not already been released.
    /// Violating this is undefined behavior the allocator does not
    /// detect — only [`Self::check`] can catch the resulting
    /// corruption, and only after the fact.
    pub fn release(&mut self, ptr: Option<NonNull<u8>>) {
        let Some(ptr) = ptr else {
            return;
        };

        let block = Block::from_payload(ptr);
        let size = block.size();
        block.set_tag(BlockTag::pack(size, false, block.prev_allocated()));
        block.write_footer();
        coalesce(&mut self.list, block);
        debug_assert!(self.check(), "heap corrupted after release");
    }

    /// Resizes the allocation at `ptr` to `size` bytes, preserving the
    /// leading `min(size, old_size)` bytes.
    ///
    /// `ptr == None` delegates to [`Self::alloc`]; `size == 0` releases
    /// `ptr` and returns `None`. Otherwise always allocates a fresh
    /// block and copies — there is no in-place shrink or
    /// neighbor-absorbing growth.
    pub fn resize(&mut self, ptr: Option<NonNull<u8>>, size: usize) -> Option<NonNull<u8>> {
        let Some(ptr) = ptr else {
            return self.alloc(size);
        };
        if size == 0 {
            self.release(Some(ptr));
            return None;
        }

        let old_block = Block::from_payload(ptr);
        let old_payload_size = old_block.payload_size();

        let new_ptr = self.alloc(size)?;
        let copy_len = core::cmp::min(size, old_payload_size);
        // SAFETY: `ptr` and `new_ptr` are both live payload regions of
        // at least `copy_len` bytes, and (being distinct allocations)
        // never overlap.
        unsafe {
            core::ptr::copy_nonoverlapping(ptr.as_ptr(), new_ptr.as_ptr(), copy_len);
        }
        self.release(Some(ptr));
        Some(new_ptr)
    }

    /// Allocates `nmemb * size` bytes and zeroes them, returning `None`
    /// on multiplication overflow or allocation failure.
    pub fn zero_alloc(&mut self, nmemb: usize, size: usize) -> Option<NonNull<u8>> {
        let total = nmemb.checked_mul(size)?;
        let ptr = self.alloc(total)?;
        // SAFETY: `alloc` guarantees `total` writable bytes at `ptr`.
        unsafe {
            core::ptr::write_bytes(ptr.as_ptr(), 0, total);
        }
        Some(ptr)
    }

    /// Audits the heap's invariants; see [`crate::checker`].
    #[must_use]
    pub fn check(&self) -> bool {
        let Some(first_block) = self.first_block else {
            return false;
        };
        checker::check(
            first_block,
            self.provider.heap_lo(),
            self.provider.heap_hi(),
            &self.list,
        )
    }
}
