//! A mock [`ChunkProvider`] for tests and doc examples: hands out chunks
//! backed by ordinary heap buffers, with caller-controlled ids and base
//! addresses so golden-output tests can reproduce exact addresses.
//!
//! Not part of the public release surface, only compiled under `cfg(test)`
//! or behind the `testing` feature, the way a crate ships a first-party
//! mock of its own plugin trait for its own test suite to depend on.

use std::convert::Infallible;

use crate::provider::{ChunkProvider, ProvidedChunk};

/// Hands out power-of-two-sized chunks from a fixed base address, each
/// chunk immediately after the previous one, up to a configured fuel
/// limit (after which allocation fails, simulating exhaustion).
pub struct VecChunkProvider {
  next_id: u64,
  next_base: u64,
  chunk_size: u32,
  remaining: usize,
  freed: Vec<u64>,
}

impl VecChunkProvider {
  /// `chunk_size` must be a power of two; every chunk request that fits
  /// within `chunk_size` is granted one chunk of exactly that size, and a
  /// request larger than `chunk_size` is granted the next power of two at
  /// or above it. `base` is the address of the first chunk.
  pub fn new(base: u64, chunk_size: u32) -> Self {
    Self { next_id: 0, next_base: base, chunk_size, remaining: usize::MAX, freed: Vec::new() }
  }

  /// Limits how many chunks this provider will grant before failing.
  pub fn with_budget(mut self, chunks: usize) -> Self {
    self.remaining = chunks;
    self
  }

  pub fn freed_chunk_ids(&self) -> &[u64] {
    &self.freed
  }
}

impl ChunkProvider for VecChunkProvider {
  type Error = Infallible;

  fn try_allocate_chunk(&mut self, min_size: u32) -> Result<ProvidedChunk, Self::Error> {
    if self.remaining == 0 {
      // A real provider would return a distinct error variant here; this
      // mock only ever needs to simulate exhaustion in tests that first
      // set `with_budget`, so panicking with a message is enough context
      // for a failing assertion to explain itself.
      panic!("VecChunkProvider budget exhausted");
    }
    self.remaining = self.remaining.saturating_sub(1);

    let mut size = self.chunk_size;
    while size < min_size {
      size = size.checked_mul(2).expect("chunk size overflow");
    }

    let chunk = ProvidedChunk { id: self.next_id, base_address: self.next_base, size };
    self.next_id += 1;
    self.next_base += size as u64;
    Ok(chunk)
  }

  fn free_chunk(&mut self, chunk_id: u64) {
    self.freed.push(chunk_id);
  }
}
