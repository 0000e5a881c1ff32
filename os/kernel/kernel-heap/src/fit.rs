//! Bounded best-fit selection over the free list.

use crate::block::Block;
use crate::config::HeapConfig;
use crate::free_list::FreeList;

/// Walks `list` from its root for at most
/// [`HeapConfig::FIT_SEARCH_CAP`] nodes and returns the smallest block
/// whose size is at least `asize`, breaking ties by first occurrence.
///
/// A block whose size exactly equals `asize` short-circuits the scan
/// immediately. Returns `None` if no visited node fits, or the list is
/// empty.
///
/// The cap trades perfect best-fit quality for a predictable worst-case
/// latency and must be preserved exactly (200 nodes), since it is
/// observable through allocator throughput.
#[must_use]
pub fn find_fit(list: &FreeList, asize: usize) -> Option<Block> {
    let mut best: Option<Block> = None;
    let mut best_size = usize::MAX;

    for block in list.iter().take(HeapConfig::FIT_SEARCH_CAP) {
        let size = block.size();
        if size == asize {
            return Some(block);
        }
        if size >= asize && size < best_size {
            best_size = size;
            best = Some(block);
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::BlockTag;
    use core::ptr::NonNull;

    fn block_of_size(buf: &mut [u8], offset: usize, size: usize) -> Block {
        let b = Block::at(NonNull::new(unsafe { buf.as_mut_ptr().add(offset) }).unwrap());
        b.set_tag(BlockTag::pack(size, false, true));
        b.write_footer();
        b
    }

    #[test]
    fn empty_list_returns_none() {
        let list = FreeList::new();
        assert_eq!(find_fit(&list, 32), None);
    }

    #[test]
    fn perfect_match_short_circuits() {
        let mut buf = std::vec![0u8; 256];
        let small = block_of_size(&mut buf, 0, 32);
        let perfect = block_of_size(&mut buf, 32, 64);
        let big = block_of_size(&mut buf, 96, 128);

        let mut list = FreeList::new();
        list.insert(small);
        list.insert(perfect);
        list.insert(big);

        assert_eq!(find_fit(&list, 64), Some(perfect));
    }

    #[test]
    fn picks_smallest_sufficient_block() {
        let mut buf = std::vec![0u8; 256];
        let a = block_of_size(&mut buf, 0, 128);
        let b = block_of_size(&mut buf, 128, 48);

        let mut list = FreeList::new();
        list.insert(a);
        list.insert(b);

        assert_eq!(find_fit(&list, 40), Some(b));
    }

    #[test]
    fn no_block_fits_returns_none() {
        let mut buf = std::vec![0u8; 64];
        let a = block_of_size(&mut buf, 0, 32);
        let mut list = FreeList::new();
        list.insert(a);
        assert_eq!(find_fit(&list, 64), None);
    }

    #[test]
    fn search_is_capped_at_fit_search_cap_nodes() {
        // Build FIT_SEARCH_CAP + 5 tiny free blocks followed by one large
        // one that would fit; the large one is never visited.
        let cap = HeapConfig::FIT_SEARCH_CAP;
        let total = cap + 5;
        let mut buf = std::vec![0u8; total * 32 + 64];
        let mut list = FreeList::new();
        // Insert the large fitting block first so later head-inserts
        // push it past the search cap.
        let big = block_of_size(&mut buf, total * 32, 64);
        list.insert(big);
        for i in 0..total {
            let b = block_of_size(&mut buf, i * 32, 32);
            list.insert(b);
        }

        assert_eq!(find_fit(&list, 64), None);
    }
}
