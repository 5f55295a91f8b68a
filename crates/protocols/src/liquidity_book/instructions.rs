//! Instruction builders for the liquidity-book program.

use super::distribution::BinLiquidityDistribution;
use super::pda::{bin_array_pda, position_pda, token_vault_pda};
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::system_program;
use spl_associated_token_account::get_associated_token_address;

/// Parameters for creating an empty position.
#[derive(Debug, Clone)]
pub struct InitializePositionParams {
    /// Pair the position belongs to.
    pub pair: Pubkey,
    /// Payer and position owner.
    pub payer: Pubkey,
    /// Freshly generated position identity; must co-sign the transaction.
    pub position_mint: Pubkey,
    /// Lower range bound relative to the active bin.
    pub relative_bin_id_left: i32,
    /// Upper range bound relative to the active bin.
    pub relative_bin_id_right: i32,
    /// Index of the bin array containing the lower bound.
    pub bin_array_index: i32,
}

/// Parameters for depositing liquidity into an existing position.
#[derive(Debug, Clone)]
pub struct DepositParams {
    pub pair: Pubkey,
    pub payer: Pubkey,
    pub position_mint: Pubkey,
    pub token_x_mint: Pubkey,
    pub token_y_mint: Pubkey,
    /// Token X amount in native units.
    pub amount_x: u64,
    /// Token Y amount in native units.
    pub amount_y: u64,
    /// Bin array covering the lower range bound.
    pub bin_array_lower: Pubkey,
    /// Bin array covering the upper range bound.
    pub bin_array_upper: Pubkey,
    /// Per-bin deposit weights.
    pub distribution: Vec<BinLiquidityDistribution>,
}

/// Builds the position-creation instruction. The transaction must be
/// signed by both the payer and the position mint keypair.
pub fn initialize_position(program_id: &Pubkey, params: &InitializePositionParams) -> Instruction {
    // InitializePosition instruction discriminator
    let discriminator: [u8; 8] = [0xdb, 0xc0, 0xea, 0x47, 0xbe, 0xbf, 0x66, 0x50];

    let mut data = Vec::with_capacity(16);
    data.extend_from_slice(&discriminator);
    data.extend_from_slice(&params.relative_bin_id_left.to_le_bytes());
    data.extend_from_slice(&params.relative_bin_id_right.to_le_bytes());

    let position = position_pda(&params.position_mint, program_id);
    let position_token_account =
        get_associated_token_address(&params.payer, &params.position_mint);
    let bin_array_lower = bin_array_pda(&params.pair, params.bin_array_index, program_id);

    let accounts = vec![
        AccountMeta::new(params.payer, true),                     // payer
        AccountMeta::new_readonly(params.pair, false),            // pair
        AccountMeta::new(position, false),                        // position
        AccountMeta::new(params.position_mint, true),             // position_mint
        AccountMeta::new(position_token_account, false),          // position_token_account
        AccountMeta::new_readonly(bin_array_lower, false),        // bin_array_lower
        AccountMeta::new_readonly(spl_token::ID, false),          // token_program
        AccountMeta::new_readonly(system_program::ID, false),     // system_program
        AccountMeta::new_readonly(solana_sdk::sysvar::rent::ID, false), // rent
    ];

    Instruction {
        program_id: *program_id,
        accounts,
        data,
    }
}

/// Builds the bin-array initialization instruction.
pub fn initialize_bin_array(
    program_id: &Pubkey,
    pair: &Pubkey,
    payer: &Pubkey,
    index: i32,
) -> Instruction {
    // InitializeBinArray instruction discriminator
    let discriminator: [u8; 8] = [0x23, 0x56, 0x13, 0xb9, 0x4e, 0xd4, 0x4b, 0xd3];

    let mut data = Vec::with_capacity(12);
    data.extend_from_slice(&discriminator);
    data.extend_from_slice(&index.to_le_bytes());

    let bin_array = bin_array_pda(pair, index, program_id);

    let accounts = vec![
        AccountMeta::new_readonly(*pair, false),              // pair
        AccountMeta::new(bin_array, false),                   // bin_array
        AccountMeta::new(*payer, true),                       // payer
        AccountMeta::new_readonly(system_program::ID, false), // system_program
    ];

    Instruction {
        program_id: *program_id,
        accounts,
        data,
    }
}

/// Builds the deposit instruction. The account list is wide enough that
/// the final transaction references it through an address lookup table.
pub fn increase_position(program_id: &Pubkey, params: &DepositParams) -> Instruction {
    // IncreasePosition instruction discriminator
    let discriminator: [u8; 8] = [0xfd, 0xea, 0x80, 0x68, 0xc0, 0xbc, 0x2d, 0x5b];

    let mut data = Vec::with_capacity(28 + params.distribution.len() * 8);
    data.extend_from_slice(&discriminator);
    data.extend_from_slice(&params.amount_x.to_le_bytes());
    data.extend_from_slice(&params.amount_y.to_le_bytes());
    data.extend_from_slice(
        &borsh::to_vec(&params.distribution).expect("serialize distribution"),
    );

    let position = position_pda(&params.position_mint, program_id);
    let position_token_account =
        get_associated_token_address(&params.payer, &params.position_mint);
    let vault_x = token_vault_pda(&params.pair, &params.token_x_mint, program_id);
    let vault_y = token_vault_pda(&params.pair, &params.token_y_mint, program_id);
    let user_token_x = get_associated_token_address(&params.payer, &params.token_x_mint);
    let user_token_y = get_associated_token_address(&params.payer, &params.token_y_mint);

    let accounts = vec![
        AccountMeta::new(params.pair, false),                  // pair
        AccountMeta::new(position, false),                     // position
        AccountMeta::new_readonly(position_token_account, false), // position_token_account
        AccountMeta::new(params.bin_array_lower, false),       // bin_array_lower
        AccountMeta::new(params.bin_array_upper, false),       // bin_array_upper
        AccountMeta::new(vault_x, false),                      // token_vault_x
        AccountMeta::new(vault_y, false),                      // token_vault_y
        AccountMeta::new(user_token_x, false),                 // user_token_x
        AccountMeta::new(user_token_y, false),                 // user_token_y
        AccountMeta::new_readonly(params.token_x_mint, false), // token_x_mint
        AccountMeta::new_readonly(params.token_y_mint, false), // token_y_mint
        AccountMeta::new_readonly(params.payer, true),         // payer
        AccountMeta::new_readonly(spl_token::ID, false),       // token_program
    ];

    Instruction {
        program_id: *program_id,
        accounts,
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::liquidity_book::distribution::uniform_distribution;

    #[test]
    fn test_initialize_position_layout() {
        let program_id = Pubkey::new_unique();
        let params = InitializePositionParams {
            pair: Pubkey::new_unique(),
            payer: Pubkey::new_unique(),
            position_mint: Pubkey::new_unique(),
            relative_bin_id_left: 55,
            relative_bin_id_right: 95,
            bin_array_index: 2,
        };
        let ix = initialize_position(&program_id, &params);
        assert_eq!(ix.program_id, program_id);
        assert_eq!(ix.data.len(), 16);
        assert_eq!(&ix.data[8..12], &55i32.to_le_bytes());
        // Payer and position mint both sign.
        let signers: Vec<_> = ix.accounts.iter().filter(|m| m.is_signer).collect();
        assert_eq!(signers.len(), 2);
    }

    #[test]
    fn test_increase_position_packs_distribution() {
        let program_id = Pubkey::new_unique();
        let distribution = uniform_distribution(40);
        let params = DepositParams {
            pair: Pubkey::new_unique(),
            payer: Pubkey::new_unique(),
            position_mint: Pubkey::new_unique(),
            token_x_mint: Pubkey::new_unique(),
            token_y_mint: Pubkey::new_unique(),
            amount_x: 100_000_000,
            amount_y: 100_000,
            bin_array_lower: Pubkey::new_unique(),
            bin_array_upper: Pubkey::new_unique(),
            distribution: distribution.clone(),
        };
        let ix = increase_position(&program_id, &params);
        // disc + two u64 amounts + borsh vec (u32 length prefix + 8 bytes per entry)
        assert_eq!(ix.data.len(), 8 + 8 + 8 + 4 + distribution.len() * 8);
        assert_eq!(ix.accounts.len(), 13);
    }
}
