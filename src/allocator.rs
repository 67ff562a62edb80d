//! The allocator core: orchestrates allocation, splitting, coalescing,
//! free-list maintenance and chunk acquisition on top of the block pool,
//! chunk registry and bin directory.
//!
//! ```text
//!   allocate(size)
//!     │
//!     ▼
//!   round up to alignment
//!     │
//!     ▼
//!   map to (L1, L2) ──────────────► search bin directory
//!     │                                   │
//!     │                          found, big enough?
//!     │                             │           │
//!     │                            yes          no/none
//!     │                             │           │
//!     │                             ▼           ▼
//!     │                        split/consume   acquire chunk, retry
//!     │                             │
//!     ▼                             ▼
//!   return Allocation { token, chunk_id, address, size }
//! ```
//!
//! `free(token)` marks the block Free, eagerly coalesces with both
//! physical neighbours if they're also Free, and reinserts the (possibly
//! now larger) block at the head of its bin.

use std::fmt;

use crate::align::{align_up_u64, is_power_of_two};
use crate::bins::BinDirectory;
use crate::block::{Block, BlockStatus, Link};
use crate::chunk::{ChunkDescriptor, ChunkRegistry, ChunkSummary};
use crate::descriptors::BlockPool;
use crate::dump;
use crate::error::TlsfError;
use crate::mapping::{L2_COUNT, size_to_bin};
use crate::provider::ChunkProvider;

/// Construction parameters for [`Tlsf::new`].
#[derive(Debug, Clone, Copy)]
pub struct Config {
  pub alignment: u32,
  pub initial_chunk_capacity: usize,
  pub initial_block_capacity: usize,
}

impl Config {
  /// A config with the given alignment and the default pre-sizing hints.
  pub fn new(alignment: u32) -> Self {
    Self { alignment, ..Self::default() }
  }

  /// Rejects a non-power-of-two alignment; a power-of-two alignment below
  /// `MIN_ALIGNMENT` is raised to it rather than rejected.
  fn validate<E: std::error::Error + 'static>(&mut self) -> Result<(), TlsfError<E>> {
    if !is_power_of_two(self.alignment) {
      return Err(TlsfError::InvalidAlignment(self.alignment));
    }
    self.alignment = self.alignment.max(crate::align::MIN_ALIGNMENT);
    Ok(())
  }
}

impl Default for Config {
  fn default() -> Self {
    Self {
      alignment: crate::align::MIN_ALIGNMENT,
      initial_chunk_capacity: 4,
      initial_block_capacity: 16,
    }
  }
}

/// An opaque handle to a live allocation. Produced by [`Tlsf::allocate`],
/// consumed by [`Tlsf::free`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token(pub(crate) usize);

/// The result of a successful [`Tlsf::allocate`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
  pub token: Token,
  pub chunk_id: u64,
  pub address: u64,
  pub size: u32,
}

/// A Two-Level Segregated Fit allocator instance, generic over its
/// backing [`ChunkProvider`].
///
/// Single-threaded: every method takes `&mut self` (`chunks`/`dump`
/// excepted), and there is no internal synchronisation. Wrap in a mutex
/// for multi-threaded use, or give each thread its own instance (the
/// intended story).
pub struct Tlsf<P: ChunkProvider> {
  provider: P,
  alignment: u32,
  chunks: ChunkRegistry,
  blocks: BlockPool,
  bins: BinDirectory,
}

impl<P: ChunkProvider> Tlsf<P> {
  pub fn new(provider: P, mut config: Config) -> Result<Self, TlsfError<P::Error>> {
    config.validate()?;
    Ok(Self {
      provider,
      alignment: config.alignment,
      chunks: ChunkRegistry::with_capacity(config.initial_chunk_capacity),
      blocks: BlockPool::with_capacity(config.initial_block_capacity),
      bins: BinDirectory::new(),
    })
  }

  pub fn alignment(&self) -> u32 {
    self.alignment
  }

  /// Read-only summaries of every chunk currently held, in acquisition
  /// order.
  pub fn chunks(&self) -> Vec<ChunkSummary> {
    self.chunks.iter().map(ChunkSummary::from).collect()
  }

  /// Writes a deterministic human-readable snapshot of the allocator's
  /// state to `out`.
  pub fn dump(&self, out: &mut impl fmt::Write) -> fmt::Result {
    dump::write_dump(self, out)
  }

  pub(crate) fn bins(&self) -> &BinDirectory {
    &self.bins
  }

  /// Total number of block descriptor slots currently allocated from the
  /// pool, including recycled (`Available`) slots. Mainly useful in tests
  /// to confirm [`Tlsf::reset`] actually discards descriptor state.
  pub fn block_count(&self) -> usize {
    self.blocks.len()
  }

  pub(crate) fn block(&self, index: usize) -> &Block {
    self.blocks.get(index)
  }

  /// Allocates `size` bytes, rounding up to the configured alignment.
  ///
  /// Acquires a new chunk from the backing provider if no free block is
  /// currently big enough; that is the only failure path.
  pub fn allocate(&mut self, size: u32) -> Result<Allocation, TlsfError<P::Error>> {
    if size == 0 {
      return Err(TlsfError::RequestTooLarge(size));
    }
    let aligned = align_up_u64(size as u64, self.alignment as u64);
    if aligned > u32::MAX as u64 {
      return Err(TlsfError::RequestTooLarge(size));
    }
    let aligned = aligned as u32;

    loop {
      let (mut l1, mut l2) = size_to_bin(aligned);
      let mut found = None;
      while let Some((fl, sl)) = self.bins.find_suitable(l1, l2) {
        let head = self.bins.head(fl, sl).expect("find_suitable only returns populated bins");
        if self.blocks.get(head).size >= aligned {
          found = Some((head, fl, sl));
          break;
        }
        // Head of this bin is too small for a request that still maps
        // here (L2 granularity coarser than the exact byte count).
        // Advance past it rather than assume bin membership implies fit.
        if sl + 1 < L2_COUNT {
          l1 = fl;
          l2 = sl + 1;
        } else {
          l1 = fl + 1;
          l2 = 0;
        }
      }

      if let Some((index, fl, sl)) = found {
        return Ok(self.use_block(index, aligned, fl, sl));
      }

      self.acquire_chunk(aligned)?;
      // Loop back: the freshly registered chunk's free block is now
      // reachable from the bin directory.
    }
  }

  /// Frees a previously allocated token. Double-free and stale tokens are
  /// only checked in debug builds (`debug_assert!`); see the crate's
  /// design notes for why that's the contract rather than a guarantee.
  pub fn free(&mut self, token: Token) {
    let index = token.0;
    debug_assert_eq!(
      self.blocks.get(index).status,
      BlockStatus::Used,
      "free() called on a block that is not Used (double free or stale token?)"
    );

    let chunk_index = self.blocks.get(index).chunk_index;
    let freed_size = self.blocks.get(index).size;
    {
      let chunk = self.chunks.get_mut(chunk_index);
      chunk.total_allocated -= freed_size;
      chunk.used_count -= 1;
      chunk.free_count += 1;
    }
    self.blocks.get_mut(index).status = BlockStatus::Free;

    self.coalesce_with_prev(index, chunk_index);
    self.coalesce_with_next(index, chunk_index);

    self.insert_free_block(index);
  }

  /// Releases every chunk back to the provider and discards all
  /// allocator state. Every invariant trivially holds over the resulting
  /// empty allocator.
  pub fn reset(&mut self) {
    for chunk in self.chunks.iter() {
      self.provider.free_chunk(chunk.id);
    }
    log::debug!("tlsf reset: released {} chunk(s)", self.chunks.len());
    self.chunks.clear();
    self.blocks.clear();
    self.bins = BinDirectory::new();
  }

  fn coalesce_with_prev(&mut self, index: usize, chunk_index: u32) {
    let Some(prev) = self.blocks.get(index).phys_prev.get() else { return };
    if self.blocks.get(prev).status != BlockStatus::Free {
      return;
    }

    let (p_l1, p_l2) = size_to_bin(self.blocks.get(prev).size);
    self.remove_free_block(prev, p_l1, p_l2);

    let prev_size = self.blocks.get(prev).size;
    let prev_offset = self.blocks.get(prev).offset;
    let prev_prev = self.blocks.get(prev).phys_prev.get();

    {
      let block = self.blocks.get_mut(index);
      block.size += prev_size;
      block.offset = prev_offset;
      block.phys_prev = Link::from(prev_prev);
    }
    match prev_prev {
      Some(pp) => self.blocks.get_mut(pp).phys_next = Link::some(index),
      None => self.chunks.get_mut(chunk_index).first_block = Link::some(index),
    }

    self.blocks.recycle(prev);
    self.chunks.get_mut(chunk_index).free_count -= 1;
    log::trace!("coalesced block {index} with physical predecessor {prev}, new size {}", self.blocks.get(index).size);
  }

  fn coalesce_with_next(&mut self, index: usize, chunk_index: u32) {
    let Some(next) = self.blocks.get(index).phys_next.get() else { return };
    if self.blocks.get(next).status != BlockStatus::Free {
      return;
    }

    let (n_l1, n_l2) = size_to_bin(self.blocks.get(next).size);
    self.remove_free_block(next, n_l1, n_l2);

    let next_size = self.blocks.get(next).size;
    let next_next = self.blocks.get(next).phys_next.get();

    {
      let block = self.blocks.get_mut(index);
      block.size += next_size;
      block.phys_next = Link::from(next_next);
    }
    if let Some(nn) = next_next {
      self.blocks.get_mut(nn).phys_prev = Link::some(index);
    }

    self.blocks.recycle(next);
    self.chunks.get_mut(chunk_index).free_count -= 1;
    log::trace!("coalesced block {index} with physical successor {next}, new size {}", self.blocks.get(index).size);
  }

  /// Consumes (whole, or via split) the free block at `index`, known to
  /// live in bin `(l1, l2)` and to be at least `requested` bytes.
  fn use_block(&mut self, index: usize, requested: u32, l1: usize, l2: usize) -> Allocation {
    self.remove_free_block(index, l1, l2);

    let chunk_index = self.blocks.get(index).chunk_index;
    let offset = self.blocks.get(index).offset;
    let block_size = self.blocks.get(index).size;
    let surplus = block_size - requested;

    let (used_index, used_size) = if surplus == 0 {
      let block = self.blocks.get_mut(index);
      block.status = BlockStatus::Used;
      block.free_prev = Link::NONE;
      block.free_next = Link::NONE;
      (index, block_size)
    } else {
      let new_index = self.blocks.alloc();
      {
        let used = self.blocks.get_mut(new_index);
        *used = Block::free(chunk_index, offset, requested);
        used.status = BlockStatus::Used;
      }
      {
        let remainder = self.blocks.get_mut(index);
        remainder.offset = offset + requested;
        remainder.size = surplus;
      }
      self.splice_before(index, new_index, chunk_index);

      let (r_l1, r_l2) = size_to_bin(surplus);
      self.insert_free_block_at(index, r_l1, r_l2);

      log::trace!("split block {index}: {requested} used + {surplus} remainder");
      (new_index, requested)
    };

    let chunk = self.chunks.get_mut(chunk_index);
    chunk.used_count += 1;
    if surplus == 0 {
      chunk.free_count -= 1;
    }
    chunk.total_allocated += used_size;

    let chunk = self.chunks.get(chunk_index);
    Allocation { token: Token(used_index), chunk_id: chunk.id, address: chunk.base_address + offset as u64, size: used_size }
  }

  /// Splices `new_index` into the physical list immediately before
  /// `index`.
  fn splice_before(&mut self, index: usize, new_index: usize, chunk_index: u32) {
    let old_prev = self.blocks.get(index).phys_prev.get();
    {
      let new_block = self.blocks.get_mut(new_index);
      new_block.phys_prev = Link::from(old_prev);
      new_block.phys_next = Link::some(index);
    }
    match old_prev {
      Some(p) => self.blocks.get_mut(p).phys_next = Link::some(new_index),
      None => self.chunks.get_mut(chunk_index).first_block = Link::some(new_index),
    }
    self.blocks.get_mut(index).phys_prev = Link::some(new_index);
  }

  fn acquire_chunk(&mut self, min_size: u32) -> Result<(), TlsfError<P::Error>> {
    let provided = self.provider.try_allocate_chunk(min_size).map_err(|source| {
      log::warn!("chunk provider failed to supply a chunk of at least {min_size} bytes");
      TlsfError::ChunkAllocationFailed(source)
    })?;
    debug_assert!(is_power_of_two(provided.size), "provider returned a non-power-of-two chunk size");
    debug_assert!(provided.size >= self.alignment, "provider returned a chunk smaller than the configured alignment");

    let aligned_base = align_up_u64(provided.base_address, self.alignment as u64);
    let gap = (aligned_base - provided.base_address) as u32;
    let usable = provided.size - gap;
    debug_assert!(usable >= min_size, "alignment gap left too little usable space in the new chunk");

    let chunk_index = self.chunks.push(ChunkDescriptor {
      id: provided.id,
      base_address: provided.base_address,
      size: provided.size,
      total_allocated: 0,
      used_count: 0,
      free_count: 1,
      first_block: Link::NONE,
    });

    let block_index = self.blocks.alloc();
    *self.blocks.get_mut(block_index) = Block::free(chunk_index, gap, usable);
    self.chunks.get_mut(chunk_index).first_block = Link::some(block_index);

    let (l1, l2) = size_to_bin(usable);
    self.insert_free_block_at(block_index, l1, l2);

    log::debug!(
      "acquired chunk {} ({} bytes at {:#x}, {usable} usable)",
      provided.id,
      provided.size,
      provided.base_address
    );
    Ok(())
  }

  /// Inserts a block (already known to map to `(l1, l2)`) at the head of
  /// that bin's free-list.
  fn insert_free_block_at(&mut self, index: usize, l1: usize, l2: usize) {
    let old_head = self.bins.head(l1, l2);
    {
      let block = self.blocks.get_mut(index);
      block.status = BlockStatus::Free;
      block.free_prev = Link::NONE;
      block.free_next = Link::from(old_head);
    }
    if let Some(head) = old_head {
      self.blocks.get_mut(head).free_prev = Link::some(index);
    }
    self.bins.set_head(l1, l2, Some(index));
    self.bins.set_l1(l1);
    self.bins.set_l2(l1, l2);
  }

  /// Computes the block's current bin and inserts it there.
  fn insert_free_block(&mut self, index: usize) {
    let (l1, l2) = size_to_bin(self.blocks.get(index).size);
    self.insert_free_block_at(index, l1, l2);
  }

  /// Removes the block, known to live in bin `(l1, l2)`, from its
  /// free-list.
  fn remove_free_block(&mut self, index: usize, l1: usize, l2: usize) {
    let prev = self.blocks.get(index).free_prev.get();
    let next = self.blocks.get(index).free_next.get();

    match prev {
      Some(p) => self.blocks.get_mut(p).free_next = Link::from(next),
      None => {
        self.bins.set_head(l1, l2, next);
        if next.is_none() && self.bins.clear_l2(l1, l2) {
          self.bins.clear_l1(l1);
        }
      }
    }
    if let Some(n) = next {
      self.blocks.get_mut(n).free_prev = Link::from(prev);
    }
  }
}
