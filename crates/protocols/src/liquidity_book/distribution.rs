//! Liquidity distribution shaping.

use borsh::{BorshDeserialize, BorshSerialize};

/// Distribution weights are expressed in basis points per side.
pub const BASIS_POINT_MAX: u16 = 10_000;

/// Share of the deposit routed to one bin, relative to the position's
/// lower bound.
#[derive(BorshDeserialize, BorshSerialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinLiquidityDistribution {
    pub relative_bin_id: i32,
    /// Token X weight in basis points.
    pub distribution_x: u16,
    /// Token Y weight in basis points.
    pub distribution_y: u16,
}

/// Spreads a deposit uniformly over relative bins `0..=width`. Both sides
/// sum to exactly [`BASIS_POINT_MAX`]; the integer remainder is spread one
/// basis point at a time over the lowest bins.
pub fn uniform_distribution(width: i32) -> Vec<BinLiquidityDistribution> {
    let count = (width.max(0) + 1) as u16;
    let base = BASIS_POINT_MAX / count;
    let remainder = BASIS_POINT_MAX % count;
    (0..count)
        .map(|i| {
            let weight = base + u16::from(i < remainder);
            BinLiquidityDistribution {
                relative_bin_id: i32::from(i),
                distribution_x: weight,
                distribution_y: weight,
            }
        })
        .collect()
}
