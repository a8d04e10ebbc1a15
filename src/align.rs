/// Rounds `value` up to the next multiple of `align`.
///
/// `align` must be a power of two. The addition is unchecked, so only use it
/// on values already known to be far below `usize::MAX`; for caller supplied
/// sizes use [`checked_align_pow2`].
///
/// # Examples
///
/// ```rust
/// use rarena::align_pow2;
///
/// assert_eq!(align_pow2!(13, 8), 16);
/// assert_eq!(align_pow2!(4096, 4096), 4096);
/// assert_eq!(align_pow2!(4097, 4096), 8192);
/// ```
#[macro_export]
macro_rules! align_pow2 {
  ($value:expr, $align:expr) => {
    ($value + $align - 1) & !($align - 1)
  };
}

/// Same as [`align_pow2!`] but returns `None` when rounding would overflow.
#[inline]
pub fn checked_align_pow2(
  value: usize,
  align: usize,
) -> Option<usize> {
  debug_assert!(align.is_power_of_two());

  value.checked_add(align - 1).map(|v| v & !(align - 1))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_align_pow2() {
    for align in [1usize, 2, 4, 8, 16, 64, 4096] {
      let mut alignments = Vec::new();

      for i in 0..10 {
        let values = (align * i + 1)..=(align * (i + 1));

        let expected_alignment = align * (i + 1);

        alignments.push((values, expected_alignment));
      }

      for (values, expected) in alignments {
        for value in values {
          assert_eq!(expected, align_pow2!(value, align));
        }
      }
    }
  }

  #[test]
  fn test_align_pow2_zero_stays_zero() {
    assert_eq!(align_pow2!(0usize, 16usize), 0);
    assert_eq!(checked_align_pow2(0, 16), Some(0));
  }

  #[test]
  fn test_checked_align_pow2_overflow() {
    assert_eq!(checked_align_pow2(usize::MAX, 8), None);
    assert_eq!(checked_align_pow2(usize::MAX - 7, 8), Some(usize::MAX - 7));
    assert_eq!(checked_align_pow2(usize::MAX, 1), Some(usize::MAX));
  }
}
