//! Alignment helpers shared by the size→bin mapping and the allocator core.

/// Minimum alignment the allocator ever accepts, derived from the bin
/// mapping's second-level granularity: `1 << (BASE_L1_LOG2 - L2_LOG2)`.
pub const MIN_ALIGNMENT: u32 = 64;

/// True if `n` is a power of two (zero is not).
///
/// # Examples
///
/// ```
/// use tlsf::align::is_power_of_two;
///
/// assert!(is_power_of_two(64));
/// assert!(!is_power_of_two(0));
/// assert!(!is_power_of_two(96));
/// ```
pub const fn is_power_of_two(n: u32) -> bool {
  n != 0 && (n & (n - 1)) == 0
}

/// Rounds `value` up to the next multiple of `align` (`align` must be a
/// power of two). Panics on overflow in debug builds, wraps in release.
/// Callers on the `u32` hot path validate headroom before calling this.
pub const fn align_up(value: u32, align: u32) -> u32 {
  (value + align - 1) & !(align - 1)
}

/// 64-bit counterpart of [`align_up`], used for absolute addresses.
pub const fn align_up_u64(value: u64, align: u64) -> u64 {
  (value + align - 1) & !(align - 1)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn power_of_two_detection() {
    assert!(is_power_of_two(1));
    assert!(is_power_of_two(2));
    assert!(is_power_of_two(1024));
    assert!(!is_power_of_two(0));
    assert!(!is_power_of_two(3));
    assert!(!is_power_of_two(1023));
  }

  #[test]
  fn align_up_rounds_to_next_multiple() {
    assert_eq!(align_up(0, 64), 0);
    assert_eq!(align_up(1, 64), 64);
    assert_eq!(align_up(64, 64), 64);
    assert_eq!(align_up(65, 64), 128);
    assert_eq!(align_up(1025, 1024), 2048);
  }

  #[test]
  fn align_up_u64_matches_u32_behaviour() {
    assert_eq!(align_up_u64(0, 64), 0);
    assert_eq!(align_up_u64(1, 64), 64);
    assert_eq!(align_up_u64(0xFE00_1200_0000_0001, 64), 0xFE00_1200_0000_0040);
  }
}
