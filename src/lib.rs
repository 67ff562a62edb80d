//! # tlsf - A Two-Level Segregated Fit Memory Allocator Core
//!
//! This crate provides a **Two-Level Segregated Fit (TLSF)** allocator core:
//! a free-list allocator with worst-case O(1) allocation and deallocation,
//! suitable for real-time and embedded workloads.
//!
//! ## Overview
//!
//! TLSF keeps free blocks in a two-level array of bins, with bitmaps marking
//! which bins are non-empty so the right bin is found in a handful of
//! instructions instead of a linear scan:
//!
//! ```text
//!   Two-Level Bin Directory:
//!
//!   First level (by power-of-two range):  l1 = 0 .. 21
//!   Second level (linear subdivisions):    l2 = 0 .. 15
//!
//!   ┌────────────────────────────────────────────────────────────────┐
//!   │ l1=0  │ l1=1  │ l1=2  │  ...  │ l1=21                          │
//!   │┌─┬─┬─┐│┌─┬─┬─┐│┌─┬─┬─┐│       │┌─┬─┬─┐                         │
//!   ││0│1│..││0│1│..││0│1│..││       ││0│1│..│  each cell: free-list  │
//!   │└─┴─┴─┘│└─┴─┴─┘│└─┴─┴─┘│       │└─┴─┴─┘  head (or empty)         │
//!   └────────────────────────────────────────────────────────────────┘
//!            ▲                               ▲
//!            l1_bitmap: u32 (bit per l1)      l2_bitmap: u16 per l1 row
//! ```
//!
//! Allocation maps the requested size to a `(l1, l2)` pair, then uses the
//! bitmaps to find the next non-empty bin at or above that pair in O(1):
//!
//! ```text
//!   allocate(n)
//!     │
//!     ▼
//!   round up to alignment
//!     │
//!     ▼
//!   map size -> (l1, l2) ───────────► find next set bit >= (l1, l2)
//!     │                                        │
//!     │                               found a bin with a big-enough head?
//!     │                                  │                    │
//!     │                                 yes                  no
//!     │                                  │                    │
//!     │                                  ▼                    ▼
//!     │                            split or consume     acquire a new chunk
//!     │                                  │              from the backing
//!     ▼                                  ▼              provider, retry
//!   Allocation { token, address, size }
//! ```
//!
//! Freeing a block eagerly coalesces it with both physical neighbours (if
//! they are also free) before reinserting it, which keeps external
//! fragmentation bounded without a background compactor.
//!
//! ## Crate Structure
//!
//! ```text
//!   tlsf
//!   ├── align       - Power-of-two alignment helpers
//!   ├── mapping     - size <-> (l1, l2) bin mapping
//!   ├── bins        - Bitmap-indexed bin directory
//!   ├── block       - Fixed-size block descriptor (internal layout)
//!   ├── descriptors - Index-addressed block descriptor pool
//!   ├── chunk       - Backing-region registry and per-chunk stats
//!   ├── provider    - The ChunkProvider trait, the allocator's only
//!   │                 dependency on the outside world
//!   ├── dump        - Deterministic debug snapshot formatting
//!   ├── allocator   - The Tlsf type itself: allocate/free/reset
//!   └── testing     - VecChunkProvider, a first-party mock provider
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use tlsf::{Config, Tlsf};
//! use tlsf::testing::VecChunkProvider;
//!
//! let provider = VecChunkProvider::new(0x1000_0000, 64 * 1024);
//! let mut allocator = Tlsf::new(provider, Config::new(64)).unwrap();
//!
//! let allocation = allocator.allocate(256).unwrap();
//! assert_eq!(allocation.size, 256);
//!
//! allocator.free(allocation.token);
//! ```
//!
//! ## How It Works
//!
//! Every block lives in a growable, index-addressed pool rather than behind
//! a pointer, so a [`Token`] stays valid across reallocation of the pool
//! itself and the allocator can back memory its own process cannot
//! dereference:
//!
//! ```text
//!   Block Descriptor (32 bytes, fixed layout):
//!
//!   ┌────────────┬────────────┬────────┬────────┬──────────┬──────────┬──────────┬────────┐
//!   │ chunk_index│ offset     │ size   │ status │ free_prev│ free_next│ phys_prev│phys_next│
//!   │   u32      │   u32      │  u32   │  u8    │   u32    │   u32    │   u32    │  u32   │
//!   └────────────┴────────────┴────────┴────────┴──────────┴──────────┴──────────┴────────┘
//! ```
//!
//! Freed descriptors are not compacted away: they are threaded onto an
//! Available list inside the same pool and handed back out before the pool
//! grows further, the same way the block pool recycles Free blocks.
//!
//! ## Features
//!
//! - **O(1) allocate and free**: bitmap-indexed bin search, no scanning.
//! - **Eager two-neighbour coalescing**: bounds external fragmentation.
//! - **Index-addressed, not pointer-based**: works over memory the host
//!   process cannot itself dereference (accelerator memory, shared memory
//!   windows, simulated address spaces).
//! - **Pluggable backing store**: the [`ChunkProvider`] trait is the only
//!   seam to the outside world; see [`testing::VecChunkProvider`] for a
//!   reference implementation used throughout this crate's own tests.
//!
//! ## Limitations
//!
//! - **Single-threaded only**: no synchronization primitives; wrap in a
//!   mutex or give each thread its own instance.
//! - **Minimum block size is the configured alignment**: requests are
//!   rounded up to it, so very small, high-alignment workloads waste space.
//! - **Programming errors are debug-only checks**: double-free and stale
//!   tokens trip `debug_assert!` rather than returning a `Result`, per this
//!   crate's trusted-caller contract (see [`error::TlsfError`]'s docs).

pub mod align;
pub mod error;
pub mod mapping;

pub mod bins;
pub mod block;
pub mod chunk;
pub mod descriptors;
mod dump;
pub mod provider;

pub mod allocator;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use allocator::{Allocation, Config, Tlsf, Token};
pub use error::TlsfError;
pub use provider::{ChunkProvider, ProvidedChunk};
