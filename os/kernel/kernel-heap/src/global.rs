//! An optional [`core::alloc::GlobalAlloc`] front end over [`Heap`].
//!
//! Wraps a `Heap<StaticHeapProvider<N>>` in a spinlock purely to satisfy
//! `GlobalAlloc`'s `Sync` bound for a single `static` instance — the
//! core heap stays un-synchronized; multi-threaded access to one `Heap`
//! is still the caller's job to prevent. Follows the familiar
//! kernel-allocator shape: a static `.bss` region, lazily initialized,
//! wrapped in a spinlock, wired to `GlobalAlloc`.

use core::alloc::{GlobalAlloc, Layout};
use core::ptr::{self, NonNull};

use kernel_sync::SpinLock;

use crate::config::HeapConfig;
use crate::heap::Heap;
use crate::provider::StaticHeapProvider;

/// A `GlobalAlloc` implementation backed by a fixed `N`-byte static
/// region.
///
/// The first call into any of `alloc`/`alloc_zeroed` initializes the
/// heap lazily, same as [`Heap::alloc`]. Requests whose alignment
/// exceeds [`HeapConfig::DOUBLE_WORD_SIZE`] are refused (a null pointer
/// is returned): the underlying heap only ever guarantees 16-byte
/// payload alignment.
pub struct GlobalHeapAllocator<const N: usize> {
    heap: SpinLock<Heap<StaticHeapProvider<N>>>,
}

impl<const N: usize> GlobalHeapAllocator<N> {
    /// An allocator over an uninitialized `N`-byte static region.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            heap: SpinLock::new(Heap::new(StaticHeapProvider::new())),
        }
    }
}

impl<const N: usize> Default for GlobalHeapAllocator<N> {
    fn default() -> Self {
        Self::new()
    }
}

fn alignment_ok(layout: Layout) -> bool {
    layout.align() <= HeapConfig::DOUBLE_WORD_SIZE
}

// SAFETY: every access to `heap` goes through `SpinLock::with_lock`,
// which holds the lock for the duration of the critical section.
unsafe impl<const N: usize> GlobalAlloc for GlobalHeapAllocator<N> {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if !alignment_ok(layout) {
            return ptr::null_mut();
        }
        self.heap
            .with_lock(|heap| heap.alloc(layout.size()))
            .map_or(ptr::null_mut(), NonNull::as_ptr)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, _layout: Layout) {
        let Some(ptr) = NonNull::new(ptr) else {
            return;
        };
        self.heap.with_lock(|heap| heap.release(Some(ptr)));
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        if !alignment_ok(layout) {
            return ptr::null_mut();
        }
        self.heap
            .with_lock(|heap| heap.zero_alloc(1, layout.size()))
            .map_or(ptr::null_mut(), NonNull::as_ptr)
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        if !alignment_ok(layout) {
            return ptr::null_mut();
        }
        let ptr = NonNull::new(ptr);
        self.heap
            .with_lock(|heap| heap.resize(ptr, new_size))
            .map_or(ptr::null_mut(), NonNull::as_ptr)
    }
}
