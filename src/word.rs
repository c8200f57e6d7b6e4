//! Trait for tree word types (u32, u64).
//!
//! The word type fixes the branching factor: every node, leaf or internal,
//! has exactly as many branches as the word has bits, so one word doubles
//! as a full per-node bitmap.

/// Trait for the unsigned integer word backing the tree.
///
/// A word serves three roles at once:
/// - a row of occupancy bits inside a leaf (bit set = index free)
/// - the materialized-children bitmap of an internal node
/// - the free-summary of either node kind
///
/// `BRANCHES` equals the bit width, so u32 gives 32-way branching and a
/// 1024-index leaf, u64 gives 64-way branching and a 4096-index leaf.
pub trait TreeWord: Copy + Eq + core::fmt::Debug {
    /// Branching factor: number of branches per node, equal to the bit width.
    const BRANCHES: u32;

    /// All bits clear.
    const ZERO: Self;

    /// All bits set.
    const ONES: Self;

    /// Set bit `bit` (0 = least significant).
    fn set_bit(&mut self, bit: u32);

    /// Clear bit `bit`.
    fn clear_bit(&mut self, bit: u32);

    /// Test bit `bit`.
    fn test_bit(self, bit: u32) -> bool;

    /// Index of the lowest set bit, or `None` if the word is zero.
    ///
    /// Single TZCNT instruction; this is what makes first-fit search O(1)
    /// per level.
    fn lowest_set_bit(self) -> Option<u32>;

    /// True if no bits are set.
    fn is_zero(self) -> bool;
}

impl TreeWord for u32 {
    const BRANCHES: u32 = 32;
    const ZERO: Self = 0;
    const ONES: Self = u32::MAX;

    #[inline(always)]
    fn set_bit(&mut self, bit: u32) {
        debug_assert!(bit < Self::BRANCHES, "bit out of bounds");
        *self |= 1 << bit;
    }

    #[inline(always)]
    fn clear_bit(&mut self, bit: u32) {
        debug_assert!(bit < Self::BRANCHES, "bit out of bounds");
        *self &= !(1 << bit);
    }

    #[inline(always)]
    fn test_bit(self, bit: u32) -> bool {
        debug_assert!(bit < Self::BRANCHES, "bit out of bounds");
        self & (1 << bit) != 0
    }

    #[inline(always)]
    fn lowest_set_bit(self) -> Option<u32> {
        if self == 0 {
            None
        } else {
            Some(self.trailing_zeros())
        }
    }

    #[inline(always)]
    fn is_zero(self) -> bool {
        self == 0
    }
}

impl TreeWord for u64 {
    const BRANCHES: u32 = 64;
    const ZERO: Self = 0;
    const ONES: Self = u64::MAX;

    #[inline(always)]
    fn set_bit(&mut self, bit: u32) {
        debug_assert!(bit < Self::BRANCHES, "bit out of bounds");
        *self |= 1 << bit;
    }

    #[inline(always)]
    fn clear_bit(&mut self, bit: u32) {
        debug_assert!(bit < Self::BRANCHES, "bit out of bounds");
        *self &= !(1 << bit);
    }

    #[inline(always)]
    fn test_bit(self, bit: u32) -> bool {
        debug_assert!(bit < Self::BRANCHES, "bit out of bounds");
        self & (1 << bit) != 0
    }

    #[inline(always)]
    fn lowest_set_bit(self) -> Option<u32> {
        if self == 0 {
            None
        } else {
            Some(self.trailing_zeros())
        }
    }

    #[inline(always)]
    fn is_zero(self) -> bool {
        self == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branches_constants() {
        assert_eq!(u32::BRANCHES, 32);
        assert_eq!(u64::BRANCHES, 64);
    }

    #[test]
    fn test_set_clear_test_bit_u32() {
        let mut w = u32::ZERO;
        assert!(!w.test_bit(0));

        w.set_bit(0);
        w.set_bit(31);
        assert!(w.test_bit(0));
        assert!(w.test_bit(31));
        assert!(!w.test_bit(15));

        w.clear_bit(0);
        assert!(!w.test_bit(0));
        assert!(w.test_bit(31));
    }

    #[test]
    fn test_set_clear_test_bit_u64() {
        let mut w = u64::ZERO;

        w.set_bit(63);
        assert_eq!(w, 1u64 << 63);
        assert!(w.test_bit(63));

        w.clear_bit(63);
        assert!(w.is_zero());
    }

    #[test]
    fn test_lowest_set_bit() {
        assert_eq!(u64::ZERO.lowest_set_bit(), None);
        assert_eq!(1u64.lowest_set_bit(), Some(0));
        assert_eq!(0b1000u64.lowest_set_bit(), Some(3));
        assert_eq!((1u64 << 63).lowest_set_bit(), Some(63));
        assert_eq!(u64::ONES.lowest_set_bit(), Some(0));

        assert_eq!(u32::ZERO.lowest_set_bit(), None);
        assert_eq!((1u32 << 31).lowest_set_bit(), Some(31));
    }

    #[test]
    fn test_ones_is_full() {
        let mut w = u32::ONES;
        for bit in 0..u32::BRANCHES {
            assert!(w.test_bit(bit));
            w.clear_bit(bit);
        }
        assert!(w.is_zero());
    }
}
