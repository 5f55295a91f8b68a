use crate::bin_math::BinRange;
use crate::errors::DomainError;
use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// A liquidity position over a contiguous bin range of one pair,
/// identified by its mint address. A position fresh out of the creation
/// step holds all-zero shares (an "empty shell") until it is funded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    /// Position mint address (base58), the position's identity.
    pub position_mint: String,
    /// Address of the owning pair.
    pub pair: String,
    pub lower_bin_id: i32,
    pub upper_bin_id: i32,
    /// Liquidity shares per bin, lower bound first.
    pub liquidity_shares: Vec<u128>,
}

impl Position {
    /// Builds a position, validating bin ordering and that the share
    /// vector covers the range exactly. Raw on-chain records go through
    /// here so malformed data fails at the boundary.
    pub fn try_new(
        position_mint: String,
        pair: String,
        lower_bin_id: i32,
        upper_bin_id: i32,
        liquidity_shares: Vec<u128>,
    ) -> Result<Self, DomainError> {
        if lower_bin_id > upper_bin_id {
            return Err(DomainError::InvalidBinRange {
                lower: lower_bin_id,
                upper: upper_bin_id,
            });
        }
        let expected = BinRange::new(lower_bin_id, upper_bin_id).bin_count();
        if liquidity_shares.len() != expected {
            return Err(DomainError::ShareCountMismatch {
                expected,
                actual: liquidity_shares.len(),
            });
        }
        Ok(Self {
            position_mint,
            pair,
            lower_bin_id,
            upper_bin_id,
            liquidity_shares,
        })
    }

    pub fn bin_range(&self) -> BinRange {
        BinRange::new(self.lower_bin_id, self.upper_bin_id)
    }

    /// Sum of all per-bin shares. Widened to 256 bits so the sum cannot
    /// overflow at any realistic share count.
    pub fn total_liquidity(&self) -> U256 {
        self.liquidity_shares
            .iter()
            .fold(U256::zero(), |acc, &share| acc + U256::from(share))
    }

    pub fn has_liquidity(&self) -> bool {
        self.liquidity_shares.iter().any(|&share| share != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shares(values: &[u128]) -> Vec<u128> {
        values.to_vec()
    }

    #[test]
    fn test_rejects_inverted_range() {
        let err = Position::try_new("m".into(), "p".into(), 10, 5, vec![]).unwrap_err();
        assert_eq!(err, DomainError::InvalidBinRange { lower: 10, upper: 5 });
    }

    #[test]
    fn test_rejects_share_count_mismatch() {
        let err = Position::try_new("m".into(), "p".into(), 0, 2, shares(&[1, 2])).unwrap_err();
        assert_eq!(
            err,
            DomainError::ShareCountMismatch {
                expected: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn test_total_liquidity_is_exact_sum() {
        let pos =
            Position::try_new("m".into(), "p".into(), 0, 2, shares(&[u128::MAX, u128::MAX, 7]))
                .unwrap();
        let expected = U256::from(u128::MAX) + U256::from(u128::MAX) + U256::from(7u8);
        assert_eq!(pos.total_liquidity(), expected);
        assert!(pos.has_liquidity());
    }

    #[test]
    fn test_empty_shell_has_no_liquidity() {
        let pos = Position::try_new("m".into(), "p".into(), 0, 1, shares(&[0, 0])).unwrap();
        assert!(!pos.has_liquidity());
        assert_eq!(pos.total_liquidity(), U256::zero());
    }
}
