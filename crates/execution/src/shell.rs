//! Position shell creation.

use crate::chain::ChainClient;
use dlmm_lp_domain::bin_math::shell_bin_range;
use dlmm_lp_domain::entities::PendingShell;
use dlmm_lp_protocols::error::ProtocolError;
use dlmm_lp_protocols::liquidity_book::instructions::{
    InitializePositionParams, initialize_position,
};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer;
use solana_sdk::transaction::Transaction;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("failed to sign position creation transaction: {0}")]
    Signing(#[from] solana_sdk::signer::SignerError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Creates empty position shells straddling the next bin-array boundary.
pub struct ShellCreator<C> {
    chain: Arc<C>,
    program_id: Pubkey,
}

impl<C: ChainClient> ShellCreator<C> {
    pub fn new(chain: Arc<C>, program_id: Pubkey) -> Self {
        Self { chain, program_id }
    }

    /// Creates a position shell on `pair_address` and waits for the
    /// creation transaction to confirm. The shell holds no liquidity yet;
    /// the returned record feeds the funding pipeline.
    pub async fn create_shell<S: Signer>(
        &self,
        pair_address: &Pubkey,
        payer: &S,
    ) -> Result<PendingShell, ShellError> {
        let pair = self.chain.fetch_pair(pair_address).await?;
        let range = shell_bin_range(pair.active_bin);
        let (relative_left, relative_right) = range.relative_to(pair.active_bin);
        let (lower_array_index, _) = range.array_indices();

        // The position identity is a fresh keypair; it co-signs creation.
        let position_mint = Keypair::new();

        info!(
            pair = %pair_address,
            active_bin = pair.active_bin,
            lower = range.lower,
            upper = range.upper,
            "Creating position shell across the next bin-array boundary"
        );

        let instruction = initialize_position(
            &self.program_id,
            &InitializePositionParams {
                pair: *pair_address,
                payer: payer.pubkey(),
                position_mint: position_mint.pubkey(),
                relative_bin_id_left: relative_left,
                relative_bin_id_right: relative_right,
                bin_array_index: lower_array_index,
            },
        );

        let blockhash = self.chain.latest_blockhash().await?;
        let mut transaction = Transaction::new_with_payer(&[instruction], Some(&payer.pubkey()));
        let signers: Vec<&dyn Signer> = vec![payer, &position_mint];
        transaction.try_sign(&signers, blockhash)?;

        let signature = self.chain.send_and_confirm(&transaction).await?;
        info!(
            signature = %signature,
            position_mint = %position_mint.pubkey(),
            "Position shell created"
        );

        Ok(PendingShell {
            pair: pair_address.to_string(),
            position_mint: position_mint.pubkey().to_string(),
            lower_bin_id: range.lower,
            upper_bin_id: range.upper,
            created_at: unix_timestamp(),
        })
    }
}

fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
