//! Error taxonomy for the public allocator surface.
//!
//! Three kinds reach callers: a bad construction-time alignment, a chunk
//! provider that refused to supply a chunk, and a request too large to
//! ever be satisfied. Programming errors (double-free, stale tokens) are
//! not part of this enum; they trip `debug_assert!`s at the call site
//! instead, per the allocator's single-threaded, trusted-caller contract.

/// Errors surfaced by [`crate::Tlsf`]'s public methods.
///
/// Generic over `E`, the backing [`crate::ChunkProvider`]'s own error type,
/// so a provider failure is preserved verbatim rather than erased behind a
/// trait object.
#[derive(Debug, thiserror::Error)]
pub enum TlsfError<E: std::error::Error + 'static> {
  /// The alignment passed to [`crate::Config`] was not a power of two. A
  /// power-of-two alignment below [`crate::align::MIN_ALIGNMENT`] is raised
  /// to it rather than rejected.
  #[error("alignment {0} is not a power of two")]
  InvalidAlignment(u32),

  /// The chunk provider's `try_allocate_chunk` returned an error.
  #[error("chunk provider failed to supply a chunk")]
  ChunkAllocationFailed(#[source] E),

  /// The requested size, once aligned up, does not fit in a `u32` byte
  /// count, or was zero.
  #[error("requested size {0} cannot be satisfied by this allocator")]
  RequestTooLarge(u32),
}
