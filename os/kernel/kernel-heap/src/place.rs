//! Split-and-place: carving an allocation out of a chosen free block.

use crate::block::Block;
use crate::codec::BlockTag;
use crate::config::HeapConfig;
use crate::free_list::FreeList;

/// Places an `asize`-byte allocation at the start of `block`, which
/// must currently be free with `block.size() >= asize`.
///
/// If the remainder after carving out `asize` bytes is at least
/// [`HeapConfig::MIN_BLOCK_SIZE`], it is split off as a new free block
/// and reinserted into `list`. Otherwise the whole block is handed to
/// the caller.
///
/// `block` is always removed from `list` by this call, whether or not
/// a remainder is split off.
///
/// `prev_alloc` is written as `true` in both the allocated block's own
/// header and (when no split occurs) in the next block's header: a
/// free block's physical predecessor is always allocated, by the
/// no-adjacent-free invariant the coalescer maintains, so a block drawn
/// from the free list always has an allocated predecessor.
pub fn place(list: &mut FreeList, block: Block, asize: usize) {
    let csize = block.size();
    debug_assert!(csize >= asize, "place called with an undersized block");

    if csize - asize >= HeapConfig::MIN_BLOCK_SIZE {
        block.set_tag(BlockTag::pack(asize, true, true));

        let remainder = block.next();
        let remainder_size = csize - asize;
        remainder.set_tag(BlockTag::pack(remainder_size, false, true));
        remainder.write_footer();
        list.insert(remainder);
    } else {
        block.set_tag(BlockTag::pack(csize, true, true));
        block.next().set_prev_allocated(true);
    }

    list.remove(block);
}
