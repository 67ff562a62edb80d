//! End-to-end scenario tests driving the public API exactly as a caller
//! would: construct, allocate, free, reset, and check both the returned
//! `Allocation`s and the chunk-level bookkeeping they leave behind.

use tlsf::testing::VecChunkProvider;
use tlsf::{Config, Tlsf};

const BASE: u64 = 0xFE00_1200_0000_0000;
const CHUNK_SIZE: u32 = 65536;

fn allocator(alignment: u32) -> Tlsf<VecChunkProvider> {
  Tlsf::new(VecChunkProvider::new(BASE, CHUNK_SIZE), Config::new(alignment)).unwrap()
}

#[test]
fn single_allocate_then_free_returns_the_chunk_to_one_whole_free_block() {
  let mut a = allocator(64);

  let alloc = a.allocate(512).unwrap();
  assert_eq!(alloc.address, BASE);
  assert_eq!(alloc.size, 512);
  assert_eq!(alloc.chunk_id, 0);

  a.free(alloc.token);
  let chunk = a.chunks()[0];
  assert_eq!(chunk.used_count, 0);
  assert_eq!(chunk.free_count, 1);
  assert_eq!(chunk.total_allocated, 0);

  let mut out = String::new();
  a.dump(&mut out).unwrap();
  assert_eq!(
    out,
    concat!(
      "alignment: 64\n",
      "chunks:\n",
      "  [0] id=0x0 base=0xfe00120000000000 size=65536 allocated=0 used=0 free=1\n",
      "bins:\n",
      "  l1=0000000000000010000000\n",
      "  (7,0) range=[65536,69632) head=1\n",
      "blocks:\n",
      "  [0] Avail\n",
      "  [1] chunk=0 offset=0 size=65536 Free free=(-,-) phys=(-,-)\n",
    )
  );
}

#[test]
fn three_allocations_back_to_back_under_coarse_alignment() {
  let mut a = allocator(1024);

  let first = a.allocate(512).unwrap();
  let second = a.allocate(1024).unwrap();
  let third = a.allocate(1025).unwrap();

  assert_eq!((first.address, first.size), (BASE, 1024));
  assert_eq!((second.address, second.size), (BASE + 1024, 1024));
  assert_eq!((third.address, third.size), (BASE + 2048, 2048));

  let chunk = a.chunks()[0];
  assert_eq!(chunk.used_count, 3);
  assert_eq!(chunk.total_allocated, 1024 + 1024 + 2048);
}

#[test]
fn a_request_bigger_than_the_base_chunk_size_forces_a_doubled_chunk() {
  let mut a = allocator(64);

  let alloc = a.allocate(65541).unwrap();
  assert_eq!(alloc.address, BASE);
  assert_eq!(alloc.size, 65600);

  let chunks = a.chunks();
  assert_eq!(chunks.len(), 1);
  assert_eq!(chunks[0].size, 131072);
}

#[test]
fn exhausting_the_first_chunk_acquires_a_second_one_at_the_next_address() {
  let mut a = allocator(64);

  let first = a.allocate(960).unwrap();
  let second = a.allocate(65536 - 65).unwrap();

  assert_eq!(first.chunk_id, 0);
  assert_eq!(second.chunk_id, 1);
  assert_eq!(second.address, BASE + CHUNK_SIZE as u64);

  assert_eq!(a.chunks().len(), 2);
}

#[test]
fn freeing_interior_blocks_out_of_order_still_coalesces_the_whole_chunk() {
  let mut a = allocator(64);
  let blocks: Vec<_> = (0..4).map(|_| a.allocate(64).unwrap()).collect();

  // Free out of allocation order: the last block first (merges with the
  // trailing remainder), then the first (merges forward), then the
  // remaining middle block (merges both ways at once).
  a.free(blocks[3].token);
  a.free(blocks[0].token);
  a.free(blocks[1].token);
  a.free(blocks[2].token);

  let chunk = a.chunks()[0];
  assert_eq!(chunk.used_count, 0);
  assert_eq!(chunk.free_count, 1);
  assert_eq!(chunk.total_allocated, 0);

  let mut out = String::new();
  a.dump(&mut out).unwrap();
  assert_eq!(
    out,
    concat!(
      "alignment: 64\n",
      "chunks:\n",
      "  [0] id=0x0 base=0xfe00120000000000 size=65536 allocated=0 used=0 free=1\n",
      "bins:\n",
      "  l1=0000000000000010000000\n",
      "  (7,0) range=[65536,69632) head=3\n",
      "blocks:\n",
      "  [0-2] Avail\n",
      "  [3] chunk=0 offset=0 size=65536 Free free=(-,-) phys=(-,-)\n",
      "  [4] Avail\n",
    )
  );
}

#[test]
fn reset_releases_every_chunk_back_to_the_provider() {
  let mut a = allocator(64);
  a.allocate(512).unwrap();
  a.allocate(70000).unwrap();
  assert_eq!(a.chunks().len(), 2);

  a.reset();

  assert_eq!(a.chunks().len(), 0);
  assert_eq!(a.block_count(), 0);

  // The allocator is fully usable again afterwards.
  let alloc = a.allocate(128).unwrap();
  assert_eq!(alloc.address, BASE + 2 * CHUNK_SIZE as u64);
}

#[test]
fn dump_output_is_stable_for_a_fixed_sequence_of_operations() {
  let mut a = allocator(64);
  let first = a.allocate(128).unwrap();
  let _second = a.allocate(256).unwrap();
  a.free(first.token);

  let mut out = String::new();
  a.dump(&mut out).unwrap();

  assert!(out.starts_with("alignment: 64\n"));
  assert!(out.contains("chunks:\n  [0] id=0x0"));
  assert!(out.contains("Free"));
  assert!(out.contains("Used"));

  // Dumping twice in a row must produce byte-identical output: nothing in
  // the allocator's state should be touched by dump() itself.
  let mut out2 = String::new();
  a.dump(&mut out2).unwrap();
  assert_eq!(out, out2);
}
