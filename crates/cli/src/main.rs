//! Command Line Interface for the DLMM position toolkit.
use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use dlmm_lp_domain::display;
use dlmm_lp_execution::funding::{DEFAULT_AMOUNT_X, DEFAULT_AMOUNT_Y};
use dlmm_lp_execution::prelude::*;
use dlmm_lp_protocols::liquidity_book::client::LiquidityBookClient;
use dlmm_lp_protocols::liquidity_book::default_program_id;
use dlmm_lp_protocols::rpc::{RpcConfig, RpcProvider};
use dotenv::dotenv;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, read_keypair_file};
use solana_sdk::signer::Signer;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tracing::error;

mod state;

// Markets the aggregator scans. A production deployment would source this
// from a trusted registry instead of a compiled-in list.
const KNOWN_PAIRS: &[&str] = &["C8xWcMpzqetpxwLj7tJfSQ6J8Juh1wHFdT5KrkwdYPQB"];

#[derive(Parser)]
#[command(name = "dlmm-lp")]
#[command(about = "Position lifecycle toolkit for DLMM liquidity-book markets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List liquidity positions held by the configured wallet
    Positions,
    /// Create an empty position shell straddling the next bin-array boundary
    CreateShell {
        /// Pair address to open the position on
        #[arg(short, long)]
        pair: Option<String>,
    },
    /// Fund the pending position shell with liquidity
    AddLiquidity {
        /// Token X amount in native units
        #[arg(long, default_value_t = DEFAULT_AMOUNT_X)]
        amount_x: u64,

        /// Token Y amount in native units
        #[arg(long, default_value_t = DEFAULT_AMOUNT_Y)]
        amount_y: u64,
    },
    /// Discard the pending position shell
    Reset,
}

struct Toolkit {
    provider: Arc<RpcProvider>,
    wallet: Keypair,
    program_id: Pubkey,
    state_path: PathBuf,
}

fn load_toolkit() -> Result<Toolkit> {
    let url = env::var("RPC_URL").unwrap_or_else(|_| RpcConfig::default().url);
    let provider = Arc::new(RpcProvider::new(RpcConfig {
        url,
        ..RpcConfig::default()
    }));

    // Wallet problems surface here, before any RPC traffic.
    let keypair_path =
        env::var("WALLET_KEYPAIR").context("WALLET_KEYPAIR must be set in .env or environment")?;
    let wallet = read_keypair_file(&keypair_path)
        .map_err(|e| anyhow!("failed to read wallet keypair {keypair_path}: {e}"))?;

    let program_id = match env::var("LB_PROGRAM_ID") {
        Ok(raw) => Pubkey::from_str(&raw).context("invalid LB_PROGRAM_ID")?,
        Err(_) => default_program_id(),
    };

    let state_path = env::var("SHELL_STATE_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(".dlmm-shell.json"));

    Ok(Toolkit {
        provider,
        wallet,
        program_id,
        state_path,
    })
}

fn known_pairs() -> Result<Vec<Pubkey>> {
    KNOWN_PAIRS
        .iter()
        .map(|raw| Pubkey::from_str(raw).with_context(|| format!("invalid known pair {raw}")))
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let toolkit = load_toolkit()?;

    match cli.command {
        Commands::Positions => cmd_positions(&toolkit).await,
        Commands::CreateShell { pair } => cmd_create_shell(&toolkit, pair).await,
        Commands::AddLiquidity { amount_x, amount_y } => {
            cmd_add_liquidity(&toolkit, amount_x, amount_y).await
        }
        Commands::Reset => cmd_reset(&toolkit),
    }
}

async fn cmd_positions(toolkit: &Toolkit) -> Result<()> {
    let client = Arc::new(LiquidityBookClient::new(
        toolkit.provider.clone(),
        toolkit.program_id,
    ));
    let aggregator = PositionAggregator::new(
        client,
        AggregatorConfig {
            known_pairs: known_pairs()?,
        },
    );

    println!("🔍 Fetching positions for {}...", toolkit.wallet.pubkey());
    let book = aggregator.refresh(&toolkit.wallet.pubkey()).await;
    print_book(&book);
    Ok(())
}

fn print_book(book: &PositionBook) {
    if book.is_empty() {
        println!("No liquidity positions found for this wallet.");
        return;
    }

    println!(
        "{:<14} | {:<14} | {:<24} | {:<14}",
        "Pair", "Mint", "Price Range", "Liquidity"
    );
    println!("{}", "-".repeat(75));

    for position in &book.positions {
        let Some(pair) = book.pair_for(position) else {
            continue;
        };
        let range = match display::price_range(position, pair) {
            Ok(Some(range)) => format!("{} - {}", range.lower_price, range.upper_price),
            Ok(None) => "N/A (empty shell)".to_string(),
            Err(e) => format!("error: {e}"),
        };
        println!(
            "{:<14} | {:<14} | {:<24} | {:<14}",
            short(&position.pair),
            short(&position.position_mint),
            range,
            position.total_liquidity()
        );
    }
}

fn short(address: &str) -> String {
    let head: String = address.chars().take(10).collect();
    format!("{head}...")
}

async fn cmd_create_shell(toolkit: &Toolkit, pair: Option<String>) -> Result<()> {
    let mut workflow = state::load_workflow(&toolkit.state_path)?;
    if let Err(e) = workflow.begin_create() {
        if let Some(shell) = workflow.pending_shell() {
            let created = chrono::DateTime::from_timestamp(shell.created_at as i64, 0)
                .unwrap_or_default();
            println!(
                "A pending shell already exists (mint {}, created {}).",
                shell.position_mint,
                created.format("%Y-%m-%d %H:%M")
            );
            println!("Fund it with `dlmm-lp add-liquidity` or discard it with `dlmm-lp reset`.");
        }
        bail!(e);
    }

    let pair_address = match pair {
        Some(raw) => Pubkey::from_str(&raw).with_context(|| format!("invalid pair address {raw}"))?,
        None => known_pairs()?[0],
    };

    let creator = ShellCreator::new(toolkit.provider.clone(), toolkit.program_id);
    println!("📡 Creating position shell on {pair_address}...");

    match creator.create_shell(&pair_address, &toolkit.wallet).await {
        Ok(shell) => {
            workflow.shell_created(shell.clone())?;
            state::save_shell(&toolkit.state_path, &shell)?;
            println!("✅ Position shell created. Mint: {}", shell.position_mint);
            println!(
                "   Bin range [{}, {}]. Run `dlmm-lp add-liquidity` to fund it.",
                shell.lower_bin_id, shell.upper_bin_id
            );
            Ok(())
        }
        Err(err) => {
            error!(error = %err, "Failed to create position shell");
            bail!("failed to create position shell (see logs)");
        }
    }
}

async fn cmd_add_liquidity(toolkit: &Toolkit, amount_x: u64, amount_y: u64) -> Result<()> {
    let mut workflow = state::load_workflow(&toolkit.state_path)?;
    let shell = workflow.begin_funding().map_err(|e| match e {
        WorkflowError::NoPendingShell => {
            anyhow!("no pending shell; run `dlmm-lp create-shell` first")
        }
        other => anyhow!(other),
    })?;

    let pipeline = FundingPipeline::new(
        toolkit.provider.clone(),
        toolkit.program_id,
        FundingConfig::default(),
    );
    let amounts = DepositAmounts { amount_x, amount_y };

    println!("📡 Funding position {}...", shell.position_mint);
    match pipeline.fund(&shell, &amounts, &toolkit.wallet).await {
        Ok(outcome) => {
            workflow.funding_succeeded()?;
            state::clear_shell(&toolkit.state_path)?;
            println!("✅ Liquidity added. Signature: {}", outcome.deposit_signature);

            // The data source may lag a just-confirmed deposit; give it a
            // moment before refreshing the position list.
            tokio::time::sleep(pipeline.config().refresh_settle).await;
            cmd_positions(toolkit).await
        }
        Err(err) => {
            error!(
                step = ?err.step,
                committed = ?err.committed,
                reason = %err.reason,
                "Funding sequence failed"
            );
            workflow.fail(err.to_string());
            bail!("failed to add liquidity; the pending shell was kept for retry (see logs)");
        }
    }
}

fn cmd_reset(toolkit: &Toolkit) -> Result<()> {
    if state::clear_shell(&toolkit.state_path)? {
        println!("✅ Pending shell discarded.");
    } else {
        println!("Nothing to reset.");
    }
    Ok(())
}
