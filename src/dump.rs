//! Deterministic human-readable snapshot of an allocator's state, used for
//! debugging and for the golden-output scenario tests.

use std::fmt;

use crate::allocator::Tlsf;
use crate::block::BlockStatus;
use crate::mapping::{L1_COUNT, L2_COUNT, bin_range};
use crate::provider::ChunkProvider;

fn fmt_link(link: crate::block::Link) -> String {
  match link.get() {
    Some(index) => index.to_string(),
    None => "-".to_string(),
  }
}

pub(crate) fn write_dump<P: ChunkProvider>(tlsf: &Tlsf<P>, out: &mut impl fmt::Write) -> fmt::Result {
  writeln!(out, "alignment: {}", tlsf.alignment())?;

  writeln!(out, "chunks:")?;
  for (index, chunk) in tlsf.chunks().iter().enumerate() {
    writeln!(
      out,
      "  [{index}] id={:#x} base={:#x} size={} allocated={} used={} free={}",
      chunk.id, chunk.base_address, chunk.size, chunk.total_allocated, chunk.used_count, chunk.free_count
    )?;
  }

  writeln!(out, "bins:")?;
  writeln!(out, "  l1={:022b}", tlsf.bins().l1_bits())?;
  for l1 in 0..L1_COUNT {
    for l2 in 0..L2_COUNT {
      if let Some(head) = tlsf.bins().head(l1, l2) {
        let (lo, hi) = bin_range(l1, l2);
        writeln!(out, "  ({l1},{l2}) range=[{lo},{hi}) head={head}")?;
      }
    }
  }

  writeln!(out, "blocks:")?;
  let mut index = 0;
  while index < tlsf.block_count() {
    if tlsf.block(index).status == BlockStatus::Available {
      let start = index;
      while index < tlsf.block_count() && tlsf.block(index).status == BlockStatus::Available {
        index += 1;
      }
      if index - start == 1 {
        writeln!(out, "  [{start}] Avail")?;
      } else {
        writeln!(out, "  [{start}-{}] Avail", index - 1)?;
      }
      continue;
    }

    let block = tlsf.block(index);
    writeln!(
      out,
      "  [{index}] chunk={} offset={} size={} {:?} free=({},{}) phys=({},{})",
      block.chunk_index,
      block.offset,
      block.size,
      block.status,
      fmt_link(block.free_prev),
      fmt_link(block.free_next),
      fmt_link(block.phys_prev),
      fmt_link(block.phys_next),
    )?;
    index += 1;
  }

  Ok(())
}
