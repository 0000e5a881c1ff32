//! The heap invariant auditor.
//!
//! A single pass that walks the heap and the free list and checks them
//! against each other. Exported for tests and for `debug_assert!` call
//! sites; never invoked from a release-mode code path.
//!
//! Bounds convention: `heap_hi` here is the address one past the last
//! valid byte (an exclusive upper bound, `[heap_lo, heap_hi)`). Every
//! offset derived from `heap_hi` in this crate (the epilogue's address,
//! bounds checks) follows that convention consistently.

use crate::block::Block;
use crate::config::HeapConfig;
use crate::free_list::FreeList;

/// Runs the full heap audit: sentinel placement, block-by-block bounds
/// and alignment, no-adjacent-free, `prev_alloc`-bit consistency (each
/// block's `prev_alloc` bit must match its physical predecessor's
/// allocated state), free-list/heap-walk agreement, and in-bounds
/// `next`/`prev` pointers for every visited free-list node.
///
/// `first_block` is the first real block after the prologue;
/// `heap_lo` is the address of the prologue word, `heap_hi` is one
/// past the last heap byte (so the epilogue header sits at
/// `heap_hi - WORD_SIZE`).
#[must_use]
pub fn check(first_block: Block, heap_lo: *const u8, heap_hi: *const u8, list: &FreeList) -> bool {
    let within_heap = |b: Block| {
        let addr = b.addr().as_ptr() as *const u8;
        addr >= heap_lo && addr < heap_hi
    };

    let prologue = Block::at(
        core::ptr::NonNull::new(unsafe { first_block.addr().as_ptr().sub(HeapConfig::WORD_SIZE) })
            .expect("prologue address is never null"),
    );
    if prologue.addr().as_ptr() as *const u8 != heap_lo {
        return false;
    }
    if prologue.size() != 0 || !prologue.is_allocated() {
        return false;
    }

    let mut prev_was_free = false;
    let mut prev_was_alloc = true; // the prologue is always allocated.
    let mut free_count_on_heap = 0usize;
    let mut block = first_block;

    loop {
        let size = block.size();
        if size == 0 {
            let expected_epilogue_addr = unsafe { heap_hi.sub(HeapConfig::WORD_SIZE) };
            if block.addr().as_ptr() as *const u8 != expected_epilogue_addr {
                return false;
            }
            if !block.is_allocated() {
                return false;
            }
            if block.prev_allocated() != prev_was_alloc {
                return false;
            }
            break;
        }

        if !within_heap(block) {
            return false;
        }
        // A block's header sits one word off double-word alignment, so
        // that its payload (header + WORD_SIZE) lands 16-byte aligned.
        let addr = block.addr().as_ptr() as usize;
        if addr % HeapConfig::DOUBLE_WORD_SIZE != HeapConfig::WORD_SIZE {
            return false;
        }
        if size < HeapConfig::MIN_BLOCK_SIZE || size % HeapConfig::DOUBLE_WORD_SIZE != 0 {
            return false;
        }

        if block.prev_allocated() != prev_was_alloc {
            return false;
        }

        let is_free = !block.is_allocated();
        if is_free {
            if prev_was_free {
                return false;
            }
            free_count_on_heap += 1;
        }
        prev_was_free = is_free;
        prev_was_alloc = !is_free;

        block = block.next();
    }

    let mut free_count_in_list = 0usize;
    for node in list.iter() {
        if !within_heap(node) {
            return false;
        }
        if let Some(prev) = FreeList::prev_of(node) {
            if !within_heap(prev) {
                return false;
            }
        }
        free_count_in_list += 1;
    }

    free_count_in_list == free_count_on_heap
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::BlockTag;
    use core::ptr::NonNull;

    /// Builds `[prologue][a][b][epilogue]` with `a`/`b` allocation
    /// flags as given, returns (buf, first_block addr, lo, hi).
    fn layout(a_alloc: bool, b_alloc: bool) -> (std::vec::Vec<u8>, usize, usize, usize) {
        let mut buf = std::vec![0u8; 8 + 32 + 32 + 8];
        let base = buf.as_mut_ptr() as usize;

        let prologue = Block::at(NonNull::new(base as *mut u8).unwrap());
        prologue.set_tag(BlockTag::pack(0, true, true));

        let a = Block::at(NonNull::new((base + 8) as *mut u8).unwrap());
        a.set_tag(BlockTag::pack(32, a_alloc, true));
        if !a_alloc {
            a.write_footer();
        }

        let b = Block::at(NonNull::new((base + 40) as *mut u8).unwrap());
        b.set_tag(BlockTag::pack(32, b_alloc, a_alloc));
        if !b_alloc {
            b.write_footer();
        }

        let epilogue = Block::at(NonNull::new((base + 72) as *mut u8).unwrap());
        epilogue.set_tag(BlockTag::pack(0, true, b_alloc));

        let lo = base;
        let hi = base + 80; // one past the last valid byte.
        (buf, base + 8, lo, hi)
    }

    #[test]
    fn sound_heap_with_no_free_blocks_passes() {
        let (buf, first, lo, hi) = layout(true, true);
        let first_block = Block::at(NonNull::new(first as *mut u8).unwrap());
        let list = FreeList::new();
        assert!(check(first_block, lo as *const u8, hi as *const u8, &list));
        drop(buf);
    }

    #[test]
    fn free_block_not_in_list_is_caught() {
        let (buf, first, lo, hi) = layout(false, true);
        let first_block = Block::at(NonNull::new(first as *mut u8).unwrap());
        let list = FreeList::new(); // `a` is free but missing from the list.
        assert!(!check(first_block, lo as *const u8, hi as *const u8, &list));
        drop(buf);
    }

    #[test]
    fn adjacent_free_blocks_are_caught() {
        let (buf, first, lo, hi) = layout(false, false);
        let first_block = Block::at(NonNull::new(first as *mut u8).unwrap());
        let mut list = FreeList::new();
        list.insert(Block::at(NonNull::new((lo + 8) as *mut u8).unwrap()));
        list.insert(Block::at(NonNull::new((lo + 40) as *mut u8).unwrap()));
        assert!(!check(first_block, lo as *const u8, hi as *const u8, &list));
        drop(buf);
    }

    #[test]
    fn matching_free_block_passes() {
        let (buf, first, lo, hi) = layout(false, true);
        let first_block = Block::at(NonNull::new(first as *mut u8).unwrap());
        let mut list = FreeList::new();
        list.insert(Block::at(NonNull::new((lo + 8) as *mut u8).unwrap()));
        assert!(check(first_block, lo as *const u8, hi as *const u8, &list));
        drop(buf);
    }

    #[test]
    fn prev_alloc_mismatch_is_caught() {
        let (buf, first, lo, hi) = layout(true, true);
        let first_block = Block::at(NonNull::new(first as *mut u8).unwrap());
        // Corrupt `b`'s prev_alloc bit: `a` is allocated, but `b` claims
        // its predecessor is free.
        let b = Block::at(NonNull::new((lo + 40) as *mut u8).unwrap());
        b.set_tag(BlockTag::pack(32, true, false));
        let list = FreeList::new();
        assert!(!check(first_block, lo as *const u8, hi as *const u8, &list));
        drop(buf);
    }

    #[test]
    fn out_of_bounds_free_list_pointer_is_caught() {
        let (buf, first, lo, hi) = layout(false, true);
        let first_block = Block::at(NonNull::new(first as *mut u8).unwrap());
        let mut list = FreeList::new();
        let a = Block::at(NonNull::new((lo + 8) as *mut u8).unwrap());
        list.insert(a);
        // Corrupt `a`'s own `next` link (its first payload word) to
        // point well outside the heap, without ever writing through
        // that bogus address itself.
        let next_slot = a.payload().as_ptr().cast::<usize>();
        unsafe { next_slot.write((hi as usize) + 4096) };
        assert!(!check(first_block, lo as *const u8, hi as *const u8, &list));
        drop(buf);
    }

    #[test]
    fn out_of_bounds_prev_pointer_is_caught() {
        let (buf, first, lo, hi) = layout(false, true);
        let first_block = Block::at(NonNull::new(first as *mut u8).unwrap());
        let mut list = FreeList::new();
        let a = Block::at(NonNull::new((lo + 8) as *mut u8).unwrap());
        list.insert(a);
        // Corrupt `a`'s own `prev` link (its second payload word) to
        // point well outside the heap. `a` is the root, whose `prev` is
        // otherwise always `None`, so this only exercises the checker's
        // own `prev_of` read, not anything `insert`/`remove` would do.
        let prev_slot = unsafe { a.payload().as_ptr().add(HeapConfig::WORD_SIZE).cast::<usize>() };
        unsafe { prev_slot.write((hi as usize) + 4096) };
        assert!(!check(first_block, lo as *const u8, hi as *const u8, &list));
        drop(buf);
    }
}
