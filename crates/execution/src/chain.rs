//! Chain-client seam for the lifecycle workflow.
//!
//! The pipeline talks to the chain only through this trait, so tests can
//! fail any individual step and assert nothing later runs.

use async_trait::async_trait;
use dlmm_lp_domain::entities::Pair;
use dlmm_lp_protocols::error::ProtocolError;
use dlmm_lp_protocols::liquidity_book::accounts::decode_pair;
use dlmm_lp_protocols::rpc::RpcProvider;
use solana_sdk::address_lookup_table::AddressLookupTableAccount;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::{Transaction, VersionedTransaction};

#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Fetches and validates pair metadata.
    async fn fetch_pair(&self, address: &Pubkey) -> Result<Pair, ProtocolError>;

    /// Whether an account exists on chain.
    async fn account_exists(&self, address: &Pubkey) -> Result<bool, ProtocolError>;

    /// Latest blockhash for transaction validity.
    async fn latest_blockhash(&self) -> Result<Hash, ProtocolError>;

    /// Current finalized slot.
    async fn finalized_slot(&self) -> Result<u64, ProtocolError>;

    /// Submits a legacy transaction and waits for confirmation.
    async fn send_and_confirm(
        &self,
        transaction: &Transaction,
    ) -> Result<Signature, ProtocolError>;

    /// Submits a versioned transaction and waits for confirmation.
    async fn send_and_confirm_versioned(
        &self,
        transaction: &VersionedTransaction,
    ) -> Result<Signature, ProtocolError>;

    /// Resolves an address lookup table; missing tables are an error, the
    /// compact transaction cannot be built without one.
    async fn fetch_lookup_table(
        &self,
        address: &Pubkey,
    ) -> Result<AddressLookupTableAccount, ProtocolError>;
}

#[async_trait]
impl ChainClient for RpcProvider {
    async fn fetch_pair(&self, address: &Pubkey) -> Result<Pair, ProtocolError> {
        let account = self
            .get_account_optional(address)
            .await?
            .ok_or(ProtocolError::AccountNotFound { address: *address })?;
        decode_pair(address, &account.data)
    }

    async fn account_exists(&self, address: &Pubkey) -> Result<bool, ProtocolError> {
        RpcProvider::account_exists(self, address).await
    }

    async fn latest_blockhash(&self) -> Result<Hash, ProtocolError> {
        self.get_latest_blockhash().await
    }

    async fn finalized_slot(&self) -> Result<u64, ProtocolError> {
        self.get_finalized_slot().await
    }

    async fn send_and_confirm(
        &self,
        transaction: &Transaction,
    ) -> Result<Signature, ProtocolError> {
        self.send_and_confirm_transaction(transaction).await
    }

    async fn send_and_confirm_versioned(
        &self,
        transaction: &VersionedTransaction,
    ) -> Result<Signature, ProtocolError> {
        RpcProvider::send_and_confirm_versioned(self, transaction).await
    }

    async fn fetch_lookup_table(
        &self,
        address: &Pubkey,
    ) -> Result<AddressLookupTableAccount, ProtocolError> {
        self.get_address_lookup_table(address)
            .await?
            .ok_or(ProtocolError::AccountNotFound { address: *address })
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use solana_client::client_error::{ClientError, ClientErrorKind};
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    pub(crate) fn injected_err() -> ProtocolError {
        ProtocolError::Rpc(ClientError {
            request: None,
            kind: ClientErrorKind::Custom("injected failure".to_string()),
        })
    }

    /// Scripted chain for pipeline tests: existence is table-driven and
    /// each RPC surface can be told to fail.
    #[derive(Default)]
    pub(crate) struct MockChain {
        pub pairs: HashMap<Pubkey, Pair>,
        pub existing: HashSet<Pubkey>,
        pub all_accounts_exist: bool,
        pub fail_exists: bool,
        pub fail_blockhash: bool,
        pub fail_slot: bool,
        pub fail_send: bool,
        pub fail_send_versioned: bool,
        pub missing_lookup_table: bool,
        pub exists_queries: Mutex<Vec<Pubkey>>,
        pub sent: Mutex<Vec<Transaction>>,
        pub sent_versioned: Mutex<Vec<VersionedTransaction>>,
    }

    #[async_trait]
    impl ChainClient for MockChain {
        async fn fetch_pair(&self, address: &Pubkey) -> Result<Pair, ProtocolError> {
            self.pairs
                .get(address)
                .cloned()
                .ok_or(ProtocolError::AccountNotFound { address: *address })
        }

        async fn account_exists(&self, address: &Pubkey) -> Result<bool, ProtocolError> {
            self.exists_queries.lock().unwrap().push(*address);
            if self.fail_exists {
                return Err(injected_err());
            }
            Ok(self.all_accounts_exist || self.existing.contains(address))
        }

        async fn latest_blockhash(&self) -> Result<Hash, ProtocolError> {
            if self.fail_blockhash {
                return Err(injected_err());
            }
            Ok(Hash::default())
        }

        async fn finalized_slot(&self) -> Result<u64, ProtocolError> {
            if self.fail_slot {
                return Err(injected_err());
            }
            Ok(1234)
        }

        async fn send_and_confirm(
            &self,
            transaction: &Transaction,
        ) -> Result<Signature, ProtocolError> {
            if self.fail_send {
                return Err(injected_err());
            }
            self.sent.lock().unwrap().push(transaction.clone());
            Ok(Signature::default())
        }

        async fn send_and_confirm_versioned(
            &self,
            transaction: &VersionedTransaction,
        ) -> Result<Signature, ProtocolError> {
            if self.fail_send_versioned {
                return Err(injected_err());
            }
            self.sent_versioned.lock().unwrap().push(transaction.clone());
            Ok(Signature::default())
        }

        async fn fetch_lookup_table(
            &self,
            address: &Pubkey,
        ) -> Result<AddressLookupTableAccount, ProtocolError> {
            if self.missing_lookup_table {
                return Err(ProtocolError::AccountNotFound { address: *address });
            }
            Ok(AddressLookupTableAccount {
                key: *address,
                addresses: Vec::new(),
            })
        }
    }
}
