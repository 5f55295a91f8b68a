//! On-chain account layouts and validated decoding.
//!
//! Raw account bytes become domain entities here or not at all: the
//! discriminator, bin ordering and share count are checked before any
//! record leaves this module.

use crate::error::ProtocolError;
use borsh::{BorshDeserialize, BorshSerialize};
use dlmm_lp_domain::entities::{Pair, Position};
use solana_sdk::pubkey::Pubkey;

/// Anchor discriminator of pair accounts.
pub const PAIR_DISCRIMINATOR: [u8; 8] = [0x55, 0x48, 0x31, 0xb0, 0xb6, 0xe4, 0x8d, 0x52];

/// Anchor discriminator of position accounts.
pub const POSITION_DISCRIMINATOR: [u8; 8] = [0xaa, 0xbc, 0x8f, 0xe4, 0x7a, 0x40, 0xf7, 0xd0];

/// Byte offset of the `pair` field inside a position account.
pub const POSITION_PAIR_OFFSET: usize = 8;

/// Byte offset of the `owner` field inside a position account.
pub const POSITION_OWNER_OFFSET: usize = 40;

#[derive(BorshDeserialize, BorshSerialize, Debug, Clone)]
pub struct PairAccount {
    pub discriminator: [u8; 8],
    pub bump: [u8; 1],
    pub bin_step: u16,
    pub active_bin: i32,
    pub token_x_mint: Pubkey,
    pub token_y_mint: Pubkey,
}

#[derive(BorshDeserialize, BorshSerialize, Debug, Clone)]
pub struct PositionAccount {
    pub discriminator: [u8; 8],
    pub pair: Pubkey,
    pub owner: Pubkey,
    pub position_mint: Pubkey,
    pub lower_bin_id: i32,
    pub upper_bin_id: i32,
    pub liquidity_shares: Vec<u128>,
}

/// Decodes a pair account into its domain record.
pub fn decode_pair(address: &Pubkey, data: &[u8]) -> Result<Pair, ProtocolError> {
    // Deserialize from a shrinking slice: accounts may carry reserved
    // trailing space that try_from_slice would reject.
    let mut slice = data;
    let raw = PairAccount::deserialize(&mut slice).map_err(|e| ProtocolError::MalformedAccount {
        kind: "pair",
        address: *address,
        reason: e.to_string(),
    })?;
    if raw.discriminator != PAIR_DISCRIMINATOR {
        return Err(ProtocolError::UnexpectedDiscriminator {
            address: *address,
            expected: "pair",
        });
    }
    Ok(Pair {
        address: address.to_string(),
        bin_step: raw.bin_step,
        active_bin: raw.active_bin,
        token_x_mint: raw.token_x_mint.to_string(),
        token_y_mint: raw.token_y_mint.to_string(),
    })
}

/// Decodes a position account into its domain record, running the
/// domain-level range/share validation.
pub fn decode_position(address: &Pubkey, data: &[u8]) -> Result<Position, ProtocolError> {
    let mut slice = data;
    let raw =
        PositionAccount::deserialize(&mut slice).map_err(|e| ProtocolError::MalformedAccount {
            kind: "position",
            address: *address,
            reason: e.to_string(),
        })?;
    if raw.discriminator != POSITION_DISCRIMINATOR {
        return Err(ProtocolError::UnexpectedDiscriminator {
            address: *address,
            expected: "position",
        });
    }
    let position = Position::try_new(
        raw.position_mint.to_string(),
        raw.pair.to_string(),
        raw.lower_bin_id,
        raw.upper_bin_id,
        raw.liquidity_shares,
    )?;
    Ok(position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dlmm_lp_domain::errors::DomainError;

    fn position_bytes(lower: i32, upper: i32, shares: Vec<u128>) -> (Pubkey, Vec<u8>) {
        let address = Pubkey::new_unique();
        let raw = PositionAccount {
            discriminator: POSITION_DISCRIMINATOR,
            pair: Pubkey::new_unique(),
            owner: Pubkey::new_unique(),
            position_mint: Pubkey::new_unique(),
            lower_bin_id: lower,
            upper_bin_id: upper,
            liquidity_shares: shares,
        };
        (address, borsh::to_vec(&raw).unwrap())
    }

    #[test]
    fn test_decode_pair() {
        let address = Pubkey::new_unique();
        let raw = PairAccount {
            discriminator: PAIR_DISCRIMINATOR,
            bump: [254],
            bin_step: 25,
            active_bin: 135,
            token_x_mint: Pubkey::new_unique(),
            token_y_mint: Pubkey::new_unique(),
        };
        let data = borsh::to_vec(&raw).unwrap();

        let pair = decode_pair(&address, &data).unwrap();
        assert_eq!(pair.address, address.to_string());
        assert_eq!(pair.bin_step, 25);
        assert_eq!(pair.active_bin, 135);

        let mut bad = data.clone();
        bad[0] ^= 0xff;
        assert!(matches!(
            decode_pair(&address, &bad).unwrap_err(),
            ProtocolError::UnexpectedDiscriminator { expected: "pair", .. }
        ));
    }

    #[test]
    fn test_decode_position() {
        let (address, data) = position_bytes(190, 230, vec![0; 41]);
        let position = decode_position(&address, &data).unwrap();
        assert_eq!(position.lower_bin_id, 190);
        assert_eq!(position.upper_bin_id, 230);
        assert!(!position.has_liquidity());
    }

    #[test]
    fn test_decode_tolerates_trailing_bytes() {
        let (address, mut data) = position_bytes(0, 1, vec![1, 2]);
        data.extend_from_slice(&[0u8; 64]);
        assert!(decode_position(&address, &data).is_ok());
    }

    #[test]
    fn test_wrong_discriminator_is_rejected() {
        let (address, mut data) = position_bytes(0, 1, vec![1, 2]);
        data[0] ^= 0xff;
        let err = decode_position(&address, &data).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::UnexpectedDiscriminator { expected: "position", .. }
        ));
    }

    #[test]
    fn test_share_count_mismatch_is_rejected() {
        let (address, data) = position_bytes(0, 2, vec![1, 2]);
        let err = decode_position(&address, &data).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::Domain(DomainError::ShareCountMismatch { expected: 3, actual: 2 })
        ));
    }

    #[test]
    fn test_pair_field_offsets_match_layout() {
        let (_, data) = position_bytes(0, 1, vec![1, 2]);
        // The memcmp filters in the client rely on these offsets.
        assert_eq!(POSITION_PAIR_OFFSET, 8);
        assert_eq!(POSITION_OWNER_OFFSET, 40);
        assert!(data.len() > POSITION_OWNER_OFFSET + 32);
    }
}
