//! The chunk registry: one descriptor per backing region acquired from
//! the [`crate::ChunkProvider`], growing monotonically and only ever
//! cleared whole by [`crate::Tlsf::reset`].

use crate::block::Link;

/// Per-chunk bookkeeping: the backing region plus running statistics.
#[derive(Debug, Clone, Copy)]
pub struct ChunkDescriptor {
  pub id: u64,
  pub base_address: u64,
  pub size: u32,
  pub total_allocated: u32,
  pub used_count: u32,
  pub free_count: u32,
  /// Index of the first block in this chunk's physical (address) order.
  pub first_block: Link,
}

/// A read-only summary of a chunk, returned by [`crate::Tlsf::chunks`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSummary {
  pub id: u64,
  pub base_address: u64,
  pub size: u32,
  pub total_allocated: u32,
  pub used_count: u32,
  pub free_count: u32,
}

impl From<&ChunkDescriptor> for ChunkSummary {
  fn from(c: &ChunkDescriptor) -> Self {
    Self {
      id: c.id,
      base_address: c.base_address,
      size: c.size,
      total_allocated: c.total_allocated,
      used_count: c.used_count,
      free_count: c.free_count,
    }
  }
}

/// Growable array of acquired chunks.
#[derive(Default)]
pub struct ChunkRegistry {
  chunks: Vec<ChunkDescriptor>,
}

impl ChunkRegistry {
  pub fn new() -> Self {
    Self { chunks: Vec::new() }
  }

  pub fn with_capacity(capacity: usize) -> Self {
    Self { chunks: Vec::with_capacity(capacity) }
  }

  pub fn push(&mut self, chunk: ChunkDescriptor) -> u32 {
    self.chunks.push(chunk);
    (self.chunks.len() - 1) as u32
  }

  pub fn get(&self, index: u32) -> &ChunkDescriptor {
    &self.chunks[index as usize]
  }

  pub fn get_mut(&mut self, index: u32) -> &mut ChunkDescriptor {
    &mut self.chunks[index as usize]
  }

  pub fn len(&self) -> usize {
    self.chunks.len()
  }

  pub fn is_empty(&self) -> bool {
    self.chunks.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &ChunkDescriptor> {
    self.chunks.iter()
  }

  pub fn clear(&mut self) {
    self.chunks.clear();
  }
}
