//! Power-of-two alignment helpers.

/// Default allocation alignment: two machine pointer widths.
///
/// 16 bytes on 64-bit targets, which covers every scalar type and the
/// common SIMD-friendly struct layouts.
pub const DEFAULT_ALIGNMENT: usize = 2 * std::mem::size_of::<*const ()>();

/// Whether `x` is a power of two, by the bitwise test `x & (x - 1) == 0`.
///
/// Zero passes this test. It is never a valid alignment; [`align_forward`]
/// rejects it separately.
#[inline]
pub const fn is_power_of_two(x: usize) -> bool {
    x & x.wrapping_sub(1) == 0
}

/// Round `addr` up to the next multiple of `align`.
///
/// Returns `addr` unchanged when it is already aligned. The remainder is
/// taken with a mask, not a division.
///
/// # Panics
///
/// Panics if `align` is zero or not a power of two, or if the aligned
/// address would overflow `usize`.
#[inline]
pub fn align_forward(addr: usize, align: usize) -> usize {
    checked_align_forward(addr, align).expect("aligned address overflows usize")
}

/// Like [`align_forward`], but returns `None` instead of panicking when the
/// aligned address would overflow `usize`.
///
/// # Panics
///
/// Panics if `align` is zero or not a power of two.
#[inline]
pub fn checked_align_forward(addr: usize, align: usize) -> Option<usize> {
    assert_valid_align(align);
    let modulo = addr & (align - 1);
    if modulo == 0 {
        return Some(addr);
    }
    addr.checked_add(align - modulo)
}

/// Panic unless `align` is a usable alignment.
#[inline]
pub(crate) fn assert_valid_align(align: usize) {
    assert!(
        align != 0 && is_power_of_two(align),
        "alignment must be a non-zero power of two, got {align}"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn powers_of_two() {
        for shift in 0..usize::BITS {
            assert!(is_power_of_two(1usize << shift));
        }
        assert!(!is_power_of_two(3));
        assert!(!is_power_of_two(12));
        assert!(!is_power_of_two(usize::MAX));
    }

    #[test]
    fn zero_passes_bitwise_test() {
        assert!(is_power_of_two(0));
    }

    #[test]
    fn align_forward_rounds_up() {
        assert_eq!(align_forward(0, 8), 0);
        assert_eq!(align_forward(1, 8), 8);
        assert_eq!(align_forward(8, 8), 8);
        assert_eq!(align_forward(9, 8), 16);
        assert_eq!(align_forward(10, 16), 16);
        assert_eq!(align_forward(17, 1), 17);
    }

    #[test]
    fn checked_variant_reports_overflow() {
        assert_eq!(checked_align_forward(usize::MAX, 16), None);
        assert_eq!(checked_align_forward(usize::MAX, 1), Some(usize::MAX));
        assert_eq!(checked_align_forward(33, 32), Some(64));
    }

    #[test]
    fn default_alignment_is_two_pointers() {
        assert_eq!(DEFAULT_ALIGNMENT, 2 * std::mem::size_of::<usize>());
        assert!(is_power_of_two(DEFAULT_ALIGNMENT));
    }

    #[test]
    #[should_panic(expected = "non-zero power of two")]
    fn zero_alignment_panics() {
        align_forward(5, 0);
    }

    #[test]
    #[should_panic(expected = "non-zero power of two")]
    fn non_power_of_two_alignment_panics() {
        align_forward(5, 12);
    }

    #[test]
    #[should_panic(expected = "overflows")]
    fn overflowing_address_panics() {
        align_forward(usize::MAX, 16);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn result_is_smallest_aligned_value_at_or_above(
                addr in 0usize..(1 << 40),
                shift in 0u32..12,
            ) {
                let align = 1usize << shift;
                let aligned = align_forward(addr, align);
                prop_assert_eq!(aligned % align, 0);
                prop_assert!(aligned >= addr);
                prop_assert!(aligned - addr < align);
            }
        }
    }
}
