pub mod error;
pub mod liquidity_book;
pub mod rpc;

use async_trait::async_trait;
use dlmm_lp_domain::entities::{Pair, Position};
use error::ProtocolError;
use solana_sdk::pubkey::Pubkey;

/// Read side of a liquidity-book market.
#[async_trait]
pub trait LiquidityBookReader: Send + Sync {
    /// All positions owned by `owner` on `pair`.
    async fn fetch_user_positions(
        &self,
        owner: &Pubkey,
        pair: &Pubkey,
    ) -> Result<Vec<Position>, ProtocolError>;

    /// Pair metadata for a single market.
    async fn fetch_pair(&self, pair: &Pubkey) -> Result<Pair, ProtocolError>;
}
