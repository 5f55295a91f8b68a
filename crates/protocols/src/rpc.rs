//! Async RPC provider for blockchain interaction.

use crate::error::ProtocolError;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::RpcProgramAccountsConfig;
use solana_client::rpc_filter::RpcFilterType;
use solana_sdk::account::Account;
use solana_sdk::address_lookup_table::AddressLookupTableAccount;
use solana_sdk::address_lookup_table::state::AddressLookupTable;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::{Transaction, VersionedTransaction};
use tracing::debug;

/// Configuration for the RPC provider.
#[derive(Debug, Clone)]
pub struct RpcConfig {
    /// JSON-RPC endpoint URL.
    pub url: String,
    /// Commitment level for reads and confirmations.
    pub commitment: CommitmentConfig,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: "https://api.devnet.solana.com".to_string(),
            commitment: CommitmentConfig::confirmed(),
        }
    }
}

/// Thin wrapper over the nonblocking RPC client. Failures are surfaced
/// as-is; retry policy is the caller's concern (and this client has none).
pub struct RpcProvider {
    client: RpcClient,
    commitment: CommitmentConfig,
}

impl RpcProvider {
    pub fn new(config: RpcConfig) -> Self {
        let client = RpcClient::new_with_commitment(config.url.clone(), config.commitment);
        Self {
            client,
            commitment: config.commitment,
        }
    }

    /// Latest blockhash at the configured commitment.
    pub async fn get_latest_blockhash(&self) -> Result<Hash, ProtocolError> {
        Ok(self.client.get_latest_blockhash().await?)
    }

    /// Current slot at `finalized` commitment. Lookup-table creation needs
    /// a slot the cluster has finalized.
    pub async fn get_finalized_slot(&self) -> Result<u64, ProtocolError> {
        Ok(self
            .client
            .get_slot_with_commitment(CommitmentConfig::finalized())
            .await?)
    }

    /// Fetches an account, `None` when it does not exist.
    pub async fn get_account_optional(
        &self,
        address: &Pubkey,
    ) -> Result<Option<Account>, ProtocolError> {
        let response = self
            .client
            .get_account_with_commitment(address, self.commitment)
            .await?;
        Ok(response.value)
    }

    /// Whether an account exists at the configured commitment.
    pub async fn account_exists(&self, address: &Pubkey) -> Result<bool, ProtocolError> {
        Ok(self.get_account_optional(address).await?.is_some())
    }

    /// Program accounts matching the given filters.
    pub async fn get_program_accounts(
        &self,
        program_id: &Pubkey,
        filters: Vec<RpcFilterType>,
    ) -> Result<Vec<(Pubkey, Account)>, ProtocolError> {
        let config = RpcProgramAccountsConfig {
            filters: Some(filters),
            ..RpcProgramAccountsConfig::default()
        };
        let accounts = self
            .client
            .get_program_accounts_with_config(program_id, config)
            .await?;
        debug!(program = %program_id, count = accounts.len(), "Fetched program accounts");
        Ok(accounts)
    }

    /// Submits a legacy transaction and waits for confirmation.
    pub async fn send_and_confirm_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<Signature, ProtocolError> {
        Ok(self.client.send_and_confirm_transaction(transaction).await?)
    }

    /// Submits a versioned transaction and waits for confirmation.
    pub async fn send_and_confirm_versioned(
        &self,
        transaction: &VersionedTransaction,
    ) -> Result<Signature, ProtocolError> {
        Ok(self.client.send_and_confirm_transaction(transaction).await?)
    }

    /// Resolves an address lookup table, `None` when the account does not
    /// exist. A just-extended table may lag behind its confirmation here.
    pub async fn get_address_lookup_table(
        &self,
        address: &Pubkey,
    ) -> Result<Option<AddressLookupTableAccount>, ProtocolError> {
        let Some(account) = self.get_account_optional(address).await? else {
            return Ok(None);
        };
        let table = AddressLookupTable::deserialize(&account.data).map_err(|e| {
            ProtocolError::MalformedAccount {
                kind: "address lookup table",
                address: *address,
                reason: e.to_string(),
            }
        })?;
        Ok(Some(AddressLookupTableAccount {
            key: *address,
            addresses: table.addresses.to_vec(),
        }))
    }
}
