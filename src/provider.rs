//! The backing chunk provider: the allocator's only collaborator, and the
//! one piece of this crate's contract it does not implement itself.
//!
//! A provider hands out large, contiguous regions of memory ("chunks") on
//! request and reclaims them when told to. What backs a chunk (native
//! heap, a managed buffer, GPU memory, a test double) is none of the
//! allocator core's business; it only ever stores a chunk's id, base
//! address and size, and never dereferences the address itself.

/// A chunk handed back by [`ChunkProvider::try_allocate_chunk`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProvidedChunk {
  /// Opaque identifier, unique within the provider's lifetime. The core
  /// stores this and passes it back to `free_chunk`; it never interprets
  /// it.
  pub id: u64,
  /// Base address of the region. Never dereferenced by the core.
  pub base_address: u64,
  /// Size in bytes. Must be a power of two and at least the allocator's
  /// configured alignment, so the bin mapping covers the whole chunk in
  /// one first-level class cleanly.
  pub size: u32,
}

/// The contract an external memory source must satisfy to back a
/// [`crate::Tlsf`] instance.
///
/// Implementations are free to fail `try_allocate_chunk` for any reason
/// (out of memory, a hard cap, an injected test failure); the allocator
/// propagates that failure to its caller without leaving any partially
/// registered state behind.
pub trait ChunkProvider {
  /// The provider's own error type, preserved through
  /// [`crate::error::TlsfError::ChunkAllocationFailed`].
  type Error: std::error::Error + 'static;

  /// Requests a chunk of at least `min_size` bytes.
  ///
  /// On success, the returned [`ProvidedChunk::size`] must be a power of
  /// two and at least `min_size` and at least the allocator's alignment.
  fn try_allocate_chunk(&mut self, min_size: u32) -> Result<ProvidedChunk, Self::Error>;

  /// Releases a chunk previously returned by `try_allocate_chunk`.
  ///
  /// Called only from [`crate::Tlsf::reset`]. Idempotency is not required;
  /// the core never calls this twice for the same id.
  fn free_chunk(&mut self, chunk_id: u64);
}
