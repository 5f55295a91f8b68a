//! Read-side client for liquidity-book markets.

use super::accounts::{
    self, POSITION_DISCRIMINATOR, POSITION_OWNER_OFFSET, POSITION_PAIR_OFFSET,
};
use crate::LiquidityBookReader;
use crate::error::ProtocolError;
use crate::rpc::RpcProvider;
use async_trait::async_trait;
use dlmm_lp_domain::entities::{Pair, Position};
use solana_client::rpc_filter::{Memcmp, RpcFilterType};
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use tracing::debug;

/// Client over one liquidity-book program deployment.
pub struct LiquidityBookClient {
    provider: Arc<RpcProvider>,
    program_id: Pubkey,
}

impl LiquidityBookClient {
    pub fn new(provider: Arc<RpcProvider>, program_id: Pubkey) -> Self {
        Self {
            provider,
            program_id,
        }
    }

    pub fn program_id(&self) -> Pubkey {
        self.program_id
    }

    /// Fetches and validates a pair account.
    pub async fn get_pair(&self, address: &Pubkey) -> Result<Pair, ProtocolError> {
        let account = self
            .provider
            .get_account_optional(address)
            .await?
            .ok_or(ProtocolError::AccountNotFound { address: *address })?;
        accounts::decode_pair(address, &account.data)
    }

    /// Fetches all positions owned by `owner` on `pair` via a filtered
    /// program-account scan.
    pub async fn get_user_positions(
        &self,
        owner: &Pubkey,
        pair: &Pubkey,
    ) -> Result<Vec<Position>, ProtocolError> {
        let filters = vec![
            RpcFilterType::Memcmp(Memcmp::new_raw_bytes(0, POSITION_DISCRIMINATOR.to_vec())),
            RpcFilterType::Memcmp(Memcmp::new_raw_bytes(
                POSITION_PAIR_OFFSET,
                pair.to_bytes().to_vec(),
            )),
            RpcFilterType::Memcmp(Memcmp::new_raw_bytes(
                POSITION_OWNER_OFFSET,
                owner.to_bytes().to_vec(),
            )),
        ];
        let raw = self
            .provider
            .get_program_accounts(&self.program_id, filters)
            .await?;
        debug!(owner = %owner, pair = %pair, count = raw.len(), "Fetched user positions");
        raw.iter()
            .map(|(address, account)| accounts::decode_position(address, &account.data))
            .collect()
    }
}

#[async_trait]
impl LiquidityBookReader for LiquidityBookClient {
    async fn fetch_user_positions(
        &self,
        owner: &Pubkey,
        pair: &Pubkey,
    ) -> Result<Vec<Position>, ProtocolError> {
        self.get_user_positions(owner, pair).await
    }

    async fn fetch_pair(&self, pair: &Pubkey) -> Result<Pair, ProtocolError> {
        self.get_pair(pair).await
    }
}
