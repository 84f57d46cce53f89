//! A heap simulator over a single fixed-size region.
//!
//! This crate manages a byte region on behalf of its callers the way a `malloc` implementation
//! manages the process heap, except that everything is explicit: addresses are offsets into the
//! region, every failure is a returned error and fragmentation can be undone on demand.
//!
//! # Usage
//! ```
//! use kheap::{Heap, Strategy};
//!
//! let mut heap = Heap::new(100, Strategy::BestFit).unwrap();
//! let a = heap.allocate(30).unwrap();
//! let b = heap.allocate(20).unwrap();
//! heap.payload_mut(b).unwrap().fill(42);
//!
//! heap.free(a).unwrap();
//! let compaction = heap.compact();
//! let b = compaction.translate(b).unwrap();
//! assert_eq!(b, 0);
//! assert_eq!(heap.payload(b).unwrap(), &[42; 20]);
//! assert_eq!(heap.available_memory(), 80);
//! ```
//!
//! # Mode of operation
//! The heap keeps two [block lists](#block-lists): one for free ranges and one for allocations.
//! Together they always tile the region exactly.
//! - When an allocation is requested the free list is searched with the heap's
//!   [strategy](#strategies). The chosen block is split: the allocation takes its low end and the
//!   remainder stays free. If no block is long enough the request fails with
//!   [`HeapError::NoFit`], which is not fatal.
//! - On deallocation the block moves back to the free list and is merged with every free block it
//!   touches, so no two free blocks are ever contiguous.
//! - [Compaction](#compaction) slides all allocations towards the start of the region,
//!   leaving a single free block at its end.
//!
//! ## Blocks
//! A [`Block`] is an `(address, length)` pair describing a range of the region. Descriptors live
//! outside of the region and can't be cloned, so moving a block between the two lists is an
//! ownership transfer: at any point each block belongs to exactly one list.
//!
//! ## Block lists
//! A [`BlockList`] is an ordered collection of blocks with address lookup, fit searches,
//! sorting and coalescing. The heap re-sorts its free list by address after every mutation,
//! which is what makes fit searches deterministic and coalescing cheap to reason about.
//!
//! ## Strategies
//! A [`Strategy`] picks the free block that serves a request:
//! - [`FirstFit`](Strategy::FirstFit) takes the lowest block that is long enough.
//! - [`BestFit`](Strategy::BestFit) takes the block leaving the smallest leftover.
//! - [`WorstFit`](Strategy::WorstFit) takes the block leaving the largest leftover.
//!
//! Ties always go to the block with the lowest address.
//!
//! ## Compaction
//! [`Heap::compact`] moves allocations in ascending address order, each to the lowest address not
//! yet taken, so a copy never overwrites bytes that still have to be read. The heap doesn't know
//! where its callers keep addresses: the returned [`Compaction`] lists the old and new address of
//! every allocation and patching them is up to the caller.
//!
//! # Threads
//! A [`Heap`] has a single owner and no internal locking. Independent heaps share nothing and
//! can be used from different threads; sharing one heap requires an external `Mutex`.
//!
//! # Logging
//! Operations are instrumented with [`tracing`] spans and events. The crate never installs a
//! subscriber, so logs only show up if the application sets one up.

pub use crate::block::Block;
pub use crate::blocklist::BlockList;
pub use crate::error::{HeapError, HeapResult};
pub use crate::heap::{Compaction, Heap, Statistics};
pub use crate::strategy::Strategy;

mod block;
mod blocklist;
mod error;
mod heap;
mod region;
mod strategy;
mod util;
