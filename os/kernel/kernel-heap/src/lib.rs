//! # Dynamic Memory Heap
//!
//! An explicit-free-list, boundary-tag dynamic memory allocator over a
//! single, monotonically growable region of bytes: packed header/footer
//! words, a `prev_alloc` bit that lets allocated blocks omit their
//! footer, a head-inserted doubly linked free list, a four-case
//! boundary-tag coalescer, and a bounded best-fit search.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     Heap<P: PageProvider>                │
//! │    • alloc / release / resize / zero_alloc / check       │
//! │    • owns the free list, drives growth on demand         │
//! └───────────────────────┬────────────────────────────────--┘
//!                         │
//!           ┌─────────────┼─────────────┬───────────────┐
//!           ▼             ▼             ▼               ▼
//!     ┌──────────┐  ┌───────────┐ ┌───────────┐  ┌──────────────┐
//!     │  fit     │  │  place    │ │ coalesce  │  │  free_list   │
//!     │ bounded  │  │ split or  │ │ 4-case    │  │ head-insert, │
//!     │ best-fit │  │ take-all  │ │ boundary  │  │ splice       │
//!     └────┬─────┘  └─────┬─────┘ └─────┬─────┘  └──────┬───────┘
//!          └──────────────┴─────────────┴───────────────┘
//!                                │
//!                                ▼
//!                        ┌──────────────┐        ┌──────────────┐
//!                        │   block      │◄───────┤   codec      │
//!                        │ navigation   │        │  BlockTag    │
//!                        └──────┬───────┘        └──────────────┘
//!                               │
//!                               ▼
//!                       ┌───────────────┐
//!                       │  provider     │
//!                       │ PageProvider  │
//!                       └───────────────┘
//! ```
//!
//! ## Core Components
//!
//! ### Block codec ([`codec`])
//! Packs a block's size and allocation flags into a single bit-packed
//! word, the header/footer format every other module reads and writes.
//!
//! ### Block navigation ([`block`])
//! All raw pointer arithmetic for locating a block's header, footer,
//! payload, and physical neighbors lives here, behind a small `Block`
//! handle.
//!
//! ### Free list ([`free_list`])
//! An explicit, unordered, head-inserted doubly linked list threaded
//! through free blocks' own payload bytes — no separate bookkeeping
//! storage.
//!
//! ### Coalescer ([`coalesce`])
//! Merges a newly freed or newly grown block with whichever physical
//! neighbors are also free, by the four-case boundary-tag rule.
//!
//! ### Fit and placement ([`fit`], [`place`])
//! A bounded best-fit scan selects a candidate free block; placement
//! either splits it (when the remainder is large enough to host a
//! minimum-size block) or hands over the whole block.
//!
//! ### Page provider ([`provider`])
//! The external collaborator the heap grows against:
//! [`provider::PageProvider`] is implemented by
//! [`provider::StaticHeapProvider`] for production use over a fixed
//! static region.
//!
//! ### Checker ([`checker`])
//! A from-scratch heap walk cross-checked against the free list, used
//! in `debug_assert!`s and available directly through [`heap::Heap::check`].
//!
//! ### Global allocator front end ([`global`])
//! [`global::GlobalHeapAllocator`] adapts a `Heap` to
//! [`core::alloc::GlobalAlloc`] for use as a `#[global_allocator]`.
//!
//! ## Safety Model
//!
//! * **No panics on the public surface**: every fallible operation
//!   (`alloc`, `resize`, `zero_alloc`, `init`) reports failure as
//!   `None`/`false` rather than unwinding or propagating a `Result`.
//! * **Single-threaded core**: [`heap::Heap`] is not `Sync`; concurrent
//!   access from multiple threads is the caller's responsibility to
//!   prevent (see [`global`] for a synchronized wrapper).
//! * **Caller-enforced allocation discipline**: releasing a pointer
//!   twice, or one this heap never returned, is undefined behavior the
//!   allocator does not detect at the time of the call — only
//!   [`heap::Heap::check`] can notice the resulting corruption, and only
//!   after the fact.
//!
//! ## Usage
//!
//! ```rust
//! use kernel_heap::heap::Heap;
//! use kernel_heap::provider::StaticHeapProvider;
//!
//! let mut heap: Heap<StaticHeapProvider<65536>> = Heap::new(StaticHeapProvider::new());
//! let p = heap.alloc(128).expect("heap exhausted");
//! unsafe {
//!     p.as_ptr().write(0x42);
//! }
//! heap.release(Some(p));
//! assert!(heap.check());
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]

pub mod block;
pub mod checker;
pub mod coalesce;
pub mod codec;
pub mod config;
pub mod error;
pub mod fit;
pub mod free_list;
pub mod global;
pub mod heap;
pub mod place;
pub mod provider;
