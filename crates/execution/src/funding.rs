//! Liquidity funding pipeline.
//!
//! Funding a shell takes several dependent transactions, strictly in
//! order: account bootstrap (wrapped-native token account, bin arrays),
//! then lookup-table creation and extension, then the compact deposit
//! transaction referencing the table. Each confirmed transaction is final;
//! a failure aborts the remaining steps and reports what already
//! committed, it never rolls anything back.

use crate::chain::ChainClient;
use anyhow::anyhow;
use dlmm_lp_domain::entities::PendingShell;
use dlmm_lp_protocols::liquidity_book::distribution::uniform_distribution;
use dlmm_lp_protocols::liquidity_book::instructions::{
    DepositParams, increase_position, initialize_bin_array,
};
use dlmm_lp_protocols::liquidity_book::pda::bin_array_pda;
use solana_sdk::address_lookup_table::instruction::{create_lookup_table, extend_lookup_table};
use solana_sdk::instruction::Instruction;
use solana_sdk::message::{VersionedMessage, v0};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::signer::Signer;
use solana_sdk::transaction::{Transaction, VersionedTransaction};
use spl_associated_token_account::get_associated_token_address;
use spl_associated_token_account::instruction::create_associated_token_account;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Default token X deposit: 0.1 at 9 decimals.
pub const DEFAULT_AMOUNT_X: u64 = 100_000_000;

/// Default token Y deposit: 0.1 at 6 decimals.
pub const DEFAULT_AMOUNT_Y: u64 = 100_000;

/// The ordered steps of the funding pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FundingStep {
    /// Ensure the wallet's wrapped-native token account exists.
    EnsureNativeTokenAccount,
    /// Ensure both bin arrays covering the range exist.
    EnsureBinArrays,
    /// Submit the accumulated setup transaction, if any.
    SubmitSetup,
    /// Build the deposit instruction.
    BuildDeposit,
    /// Create, extend and resolve the address lookup table.
    PrepareLookupTable,
    /// Submit the compact deposit transaction.
    SubmitDeposit,
}

/// A transaction that confirmed during the run. Final on-chain whatever
/// happens afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommittedTx {
    Setup(Signature),
    LookupTable(Signature),
    Deposit(Signature),
}

/// Successful run: every committed transaction plus the deposit signature.
#[derive(Debug, Clone)]
pub struct FundingOutcome {
    pub committed: Vec<CommittedTx>,
    pub deposit_signature: Signature,
}

/// Failed run: the failing step and what had already committed before it.
#[derive(Debug, Error)]
#[error("funding aborted at {step:?}: {reason}")]
pub struct FundingError {
    pub step: FundingStep,
    /// Confirmed before the failure; these are not rolled back.
    pub committed: Vec<CommittedTx>,
    pub reason: anyhow::Error,
}

impl FundingError {
    fn at(step: FundingStep, committed: &[CommittedTx], reason: anyhow::Error) -> Self {
        Self {
            step,
            committed: committed.to_vec(),
            reason,
        }
    }
}

/// Token amounts for one deposit, in native units.
#[derive(Debug, Clone, Copy)]
pub struct DepositAmounts {
    pub amount_x: u64,
    pub amount_y: u64,
}

impl Default for DepositAmounts {
    fn default() -> Self {
        Self {
            amount_x: DEFAULT_AMOUNT_X,
            amount_y: DEFAULT_AMOUNT_Y,
        }
    }
}

/// Configuration for the funding pipeline.
#[derive(Debug, Clone)]
pub struct FundingConfig {
    /// Wait between lookup-table confirmation and resolution; the data
    /// source may not serve a just-confirmed table immediately.
    pub lookup_table_settle: Duration,
    /// Wait before the post-funding position refresh.
    pub refresh_settle: Duration,
}

impl Default for FundingConfig {
    fn default() -> Self {
        Self {
            lookup_table_settle: Duration::from_secs(1),
            refresh_settle: Duration::from_secs(2),
        }
    }
}

/// Runs the funding sequence for a pending shell.
pub struct FundingPipeline<C> {
    chain: Arc<C>,
    program_id: Pubkey,
    config: FundingConfig,
}

impl<C: ChainClient> FundingPipeline<C> {
    pub fn new(chain: Arc<C>, program_id: Pubkey, config: FundingConfig) -> Self {
        Self {
            chain,
            program_id,
            config,
        }
    }

    pub fn config(&self) -> &FundingConfig {
        &self.config
    }

    /// Funds `shell` with `amounts`, walking every step in order. Safe to
    /// retry after a failure: the bootstrap steps are existence-checked,
    /// so setup work a previous run confirmed is skipped, not repeated.
    pub async fn fund<S: Signer>(
        &self,
        shell: &PendingShell,
        amounts: &DepositAmounts,
        payer: &S,
    ) -> Result<FundingOutcome, FundingError> {
        use FundingStep as Step;

        let mut committed: Vec<CommittedTx> = Vec::new();
        let owner = payer.pubkey();

        let pair_key = Pubkey::from_str(&shell.pair).map_err(|e| {
            FundingError::at(
                Step::EnsureNativeTokenAccount,
                &committed,
                anyhow!("invalid pair address {}: {e}", shell.pair),
            )
        })?;
        let position_mint = Pubkey::from_str(&shell.position_mint).map_err(|e| {
            FundingError::at(
                Step::EnsureNativeTokenAccount,
                &committed,
                anyhow!("invalid position mint {}: {e}", shell.position_mint),
            )
        })?;

        // Step 1: wrapped-native token account bootstrap. New wallets lack
        // it and the deposit fails simulation without it.
        let mut setup: Vec<Instruction> = Vec::new();
        let wrapped_native = get_associated_token_address(&owner, &spl_token::native_mint::ID);
        let has_wrapped = self
            .chain
            .account_exists(&wrapped_native)
            .await
            .map_err(|e| FundingError::at(Step::EnsureNativeTokenAccount, &committed, e.into()))?;
        if !has_wrapped {
            debug!(account = %wrapped_native, "Wrapped native token account missing; scheduling creation");
            setup.push(create_associated_token_account(
                &owner,
                &owner,
                &spl_token::native_mint::ID,
                &spl_token::ID,
            ));
        }

        // Step 2: bin arrays covering the range.
        let range = shell.bin_range();
        let (lower_index, upper_index) = range.array_indices();
        let lower_array = bin_array_pda(&pair_key, lower_index, &self.program_id);
        let upper_array = bin_array_pda(&pair_key, upper_index, &self.program_id);

        let lower_exists = self
            .chain
            .account_exists(&lower_array)
            .await
            .map_err(|e| FundingError::at(Step::EnsureBinArrays, &committed, e.into()))?;
        if !lower_exists {
            debug!(index = lower_index, "Lower bin array missing; scheduling initialization");
            setup.push(initialize_bin_array(
                &self.program_id,
                &pair_key,
                &owner,
                lower_index,
            ));
        }
        if upper_index != lower_index {
            let upper_exists = self
                .chain
                .account_exists(&upper_array)
                .await
                .map_err(|e| FundingError::at(Step::EnsureBinArrays, &committed, e.into()))?;
            if !upper_exists {
                debug!(index = upper_index, "Upper bin array missing; scheduling initialization");
                setup.push(initialize_bin_array(
                    &self.program_id,
                    &pair_key,
                    &owner,
                    upper_index,
                ));
            }
        }

        // Step 3: submit the setup transaction only when it carries
        // instructions; later steps assume these accounts exist once it
        // confirms.
        if setup.is_empty() {
            debug!("All setup accounts exist; skipping setup transaction");
        } else {
            info!(instructions = setup.len(), "Submitting account setup transaction");
            let blockhash = self
                .chain
                .latest_blockhash()
                .await
                .map_err(|e| FundingError::at(Step::SubmitSetup, &committed, e.into()))?;
            let mut transaction = Transaction::new_with_payer(&setup, Some(&owner));
            transaction
                .try_sign(&[payer], blockhash)
                .map_err(|e| FundingError::at(Step::SubmitSetup, &committed, e.into()))?;
            let signature = self
                .chain
                .send_and_confirm(&transaction)
                .await
                .map_err(|e| FundingError::at(Step::SubmitSetup, &committed, e.into()))?;
            committed.push(CommittedTx::Setup(signature));
            info!(signature = %signature, "Setup transaction confirmed");
        }

        // Step 4: deposit instruction over a uniform distribution.
        let pair = self
            .chain
            .fetch_pair(&pair_key)
            .await
            .map_err(|e| FundingError::at(Step::BuildDeposit, &committed, e.into()))?;
        let token_x_mint = Pubkey::from_str(&pair.token_x_mint).map_err(|e| {
            FundingError::at(
                Step::BuildDeposit,
                &committed,
                anyhow!("invalid token X mint {}: {e}", pair.token_x_mint),
            )
        })?;
        let token_y_mint = Pubkey::from_str(&pair.token_y_mint).map_err(|e| {
            FundingError::at(
                Step::BuildDeposit,
                &committed,
                anyhow!("invalid token Y mint {}: {e}", pair.token_y_mint),
            )
        })?;

        let distribution = uniform_distribution(range.width());
        let deposit_ix = increase_position(
            &self.program_id,
            &DepositParams {
                pair: pair_key,
                payer: owner,
                position_mint,
                token_x_mint,
                token_y_mint,
                amount_x: amounts.amount_x,
                amount_y: amounts.amount_y,
                bin_array_lower: lower_array,
                bin_array_upper: upper_array,
                distribution,
            },
        );

        // Step 5: the deposit references too many accounts for a legacy
        // transaction, so route them through an address lookup table.
        let slot = self
            .chain
            .finalized_slot()
            .await
            .map_err(|e| FundingError::at(Step::PrepareLookupTable, &committed, e.into()))?;
        let (create_ix, table_address) = create_lookup_table(owner, owner, slot);
        let table_addresses: Vec<Pubkey> =
            deposit_ix.accounts.iter().map(|meta| meta.pubkey).collect();
        let extend_ix = extend_lookup_table(table_address, owner, Some(owner), table_addresses);

        let blockhash = self
            .chain
            .latest_blockhash()
            .await
            .map_err(|e| FundingError::at(Step::PrepareLookupTable, &committed, e.into()))?;
        let mut table_tx = Transaction::new_with_payer(&[create_ix, extend_ix], Some(&owner));
        table_tx
            .try_sign(&[payer], blockhash)
            .map_err(|e| FundingError::at(Step::PrepareLookupTable, &committed, e.into()))?;
        let signature = self
            .chain
            .send_and_confirm(&table_tx)
            .await
            .map_err(|e| FundingError::at(Step::PrepareLookupTable, &committed, e.into()))?;
        committed.push(CommittedTx::LookupTable(signature));
        info!(signature = %signature, table = %table_address, "Lookup table created and extended");

        tokio::time::sleep(self.config.lookup_table_settle).await;
        let table = self
            .chain
            .fetch_lookup_table(&table_address)
            .await
            .map_err(|e| FundingError::at(Step::PrepareLookupTable, &committed, e.into()))?;

        // Step 6: compact transaction against the lookup table.
        let blockhash = self
            .chain
            .latest_blockhash()
            .await
            .map_err(|e| FundingError::at(Step::SubmitDeposit, &committed, e.into()))?;
        let instructions = [deposit_ix];
        let message = v0::Message::try_compile(&owner, &instructions, &[table], blockhash)
            .map_err(|e| FundingError::at(Step::SubmitDeposit, &committed, e.into()))?;
        let transaction = VersionedTransaction::try_new(VersionedMessage::V0(message), &[payer])
            .map_err(|e| FundingError::at(Step::SubmitDeposit, &committed, e.into()))?;
        let signature = self
            .chain
            .send_and_confirm_versioned(&transaction)
            .await
            .map_err(|e| FundingError::at(Step::SubmitDeposit, &committed, e.into()))?;
        committed.push(CommittedTx::Deposit(signature));
        info!(signature = %signature, "Liquidity deposit confirmed");

        Ok(FundingOutcome {
            committed,
            deposit_signature: signature,
        })
    }
}
