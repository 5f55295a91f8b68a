//! Liquidity-book DLMM program adapter.
//!
//! This module provides functionality to interact with a liquidity-book
//! market:
//! - Read pair and position state
//! - Derive program addresses for bin arrays and positions
//! - Build position-creation, bin-array and deposit instructions
//! - Shape liquidity distributions

/// On-chain account structures.
pub mod accounts;
/// Read-side client over the RPC provider.
pub mod client;
/// Liquidity distribution shaping.
pub mod distribution;
/// Instruction builders.
pub mod instructions;
/// Program address derivation.
pub mod pda;

use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

/// Liquidity-book program ID (devnet).
pub const LIQUIDITY_BOOK_PROGRAM_ID: &str = "1qbkdrr3z4ryLA7pZykqxvxWPoeifcVKo6ZG9CfkvVE";

/// Parses the default program id.
pub fn default_program_id() -> Pubkey {
    Pubkey::from_str(LIQUIDITY_BOOK_PROGRAM_ID).expect("Invalid program ID")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_id_parses() {
        assert!(Pubkey::from_str(LIQUIDITY_BOOK_PROGRAM_ID).is_ok());
    }
}
