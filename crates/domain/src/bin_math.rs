//! Bin and bin-array arithmetic for liquidity-book markets.
//!
//! Price space is partitioned into fixed-width arrays of bins. A bin array
//! must exist on-chain before any bin inside it can hold liquidity, so the
//! shell range is deliberately placed across the next array boundary above
//! the active bin: the funding flow then always provisions exactly two
//! adjacent arrays.

use serde::{Deserialize, Serialize};

/// Number of bins held by one on-chain bin array.
pub const BIN_ARRAY_WIDTH: i32 = 70;

/// Half-width of a freshly created position shell, in bins.
pub const SHELL_HALF_WIDTH: i32 = 20;

/// Index of the bin array containing `bin_id`.
///
/// Euclidean division keeps negative bin ids in the array below zero
/// rather than rounding toward it.
pub fn bin_array_index(bin_id: i32) -> i32 {
    bin_id.div_euclid(BIN_ARRAY_WIDTH)
}

/// First bin id of the array boundary strictly above `active_bin`.
pub fn next_boundary_bin_id(active_bin: i32) -> i32 {
    (active_bin.div_euclid(BIN_ARRAY_WIDTH) + 1) * BIN_ARRAY_WIDTH
}

/// A contiguous, inclusive range of bins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinRange {
    pub lower: i32,
    pub upper: i32,
}

impl BinRange {
    pub fn new(lower: i32, upper: i32) -> Self {
        Self { lower, upper }
    }

    /// Width of the range (upper minus lower).
    pub fn width(&self) -> i32 {
        self.upper - self.lower
    }

    /// Number of bins covered, bounds inclusive.
    pub fn bin_count(&self) -> usize {
        (self.width() + 1) as usize
    }

    /// Range bounds relative to the active bin, the form the
    /// position-creation instruction expects.
    pub fn relative_to(&self, active_bin: i32) -> (i32, i32) {
        (self.lower - active_bin, self.upper - active_bin)
    }

    /// Bin-array indices of the lower and upper bound.
    pub fn array_indices(&self) -> (i32, i32) {
        (bin_array_index(self.lower), bin_array_index(self.upper))
    }
}

/// Computes the shell range for a new position: `SHELL_HALF_WIDTH` bins on
/// each side of the next array boundary above the active bin. Centering on
/// the boundary guarantees the range straddles two distinct arrays; a range
/// placed elsewhere could resolve to a single array and invalidate the
/// funding flow's two-array assumption.
pub fn shell_bin_range(active_bin: i32) -> BinRange {
    let boundary = next_boundary_bin_id(active_bin);
    BinRange::new(boundary - SHELL_HALF_WIDTH, boundary + SHELL_HALF_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_index_floor_division() {
        assert_eq!(bin_array_index(0), 0);
        assert_eq!(bin_array_index(69), 0);
        assert_eq!(bin_array_index(70), 1);
        assert_eq!(bin_array_index(-1), -1);
        assert_eq!(bin_array_index(-70), -1);
        assert_eq!(bin_array_index(-71), -2);
    }

    #[test]
    fn test_shell_range_example() {
        // Active bin 135 -> boundary 210 -> range [190, 230] across arrays 2 and 3.
        let range = shell_bin_range(135);
        assert_eq!(range, BinRange::new(190, 230));
        assert_eq!(range.array_indices(), (2, 3));
        assert_eq!(range.relative_to(135), (55, 95));
        assert_eq!(range.bin_count(), 41);
    }

    #[test]
    fn test_shell_range_straddles_two_arrays() {
        for active_bin in 0..10_000 {
            let range = shell_bin_range(active_bin);
            let (lower_idx, upper_idx) = range.array_indices();
            assert_ne!(lower_idx, upper_idx, "active bin {active_bin}");
            assert_eq!(upper_idx, lower_idx + 1, "active bin {active_bin}");
        }
    }

    #[test]
    fn test_boundary_above_active_bin() {
        // The boundary is strictly above the active bin, even when the
        // active bin sits exactly on one.
        assert_eq!(next_boundary_bin_id(0), 70);
        assert_eq!(next_boundary_bin_id(69), 70);
        assert_eq!(next_boundary_bin_id(70), 140);
        assert_eq!(next_boundary_bin_id(209), 210);
    }
}
