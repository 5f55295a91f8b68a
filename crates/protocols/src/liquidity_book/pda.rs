//! Program-derived addresses for liquidity-book accounts.

use solana_sdk::pubkey::Pubkey;

/// Address of the bin array `index` of `pair`. The index is encoded as
/// four little-endian bytes, matching the on-chain seed layout.
pub fn bin_array_pda(pair: &Pubkey, index: i32, program_id: &Pubkey) -> Pubkey {
    let (pda, _bump) = Pubkey::find_program_address(
        &[b"bin_array", pair.as_ref(), &index.to_le_bytes()],
        program_id,
    );
    pda
}

/// Address of the position account behind a position mint.
pub fn position_pda(position_mint: &Pubkey, program_id: &Pubkey) -> Pubkey {
    let (pda, _bump) =
        Pubkey::find_program_address(&[b"position", position_mint.as_ref()], program_id);
    pda
}

/// Address of a pair's vault for one of its token mints.
pub fn token_vault_pda(pair: &Pubkey, mint: &Pubkey, program_id: &Pubkey) -> Pubkey {
    let (pda, _bump) = Pubkey::find_program_address(
        &[b"token_vault", pair.as_ref(), mint.as_ref()],
        program_id,
    );
    pda
}
