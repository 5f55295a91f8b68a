use dlmm_lp_domain::errors::DomainError;
use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

/// Failures at the protocol boundary: RPC transport, missing accounts and
/// malformed on-chain data all land here.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("account {address} not found on chain")]
    AccountNotFound { address: Pubkey },

    #[error("account {address} is not a {expected} account")]
    UnexpectedDiscriminator {
        address: Pubkey,
        expected: &'static str,
    },

    #[error("malformed {kind} account {address}: {reason}")]
    MalformedAccount {
        kind: &'static str,
        address: Pubkey,
        reason: String,
    },

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Rpc(#[from] solana_client::client_error::ClientError),
}
