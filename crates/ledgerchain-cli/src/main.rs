//! ledgerchain-cli — a thin operator tool over the accounting engine.
//!
//! Startup sequence:
//!   1. Parse arguments, init logging
//!   2. Open the data directory as a `LedgerDb`
//!   3. Dispatch the requested subcommand
//!   4. Print the result and exit

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use ledgerchain_core::RecordId;
use ledgerchain_engine::{AccountBalanceEngine, TxRollupEngine};
use ledgerchain_script::TaprootRuntime;
use ledgerchain_storage::{LedgerConfig, LedgerDb};

#[derive(Parser, Debug)]
#[command(name = "ledgerchain", version, about = "Content-addressed double-entry ledger")]
struct Args {
    /// Directory for the persistent ledger database.
    #[arg(long, default_value = "./ledgerchain-data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open (creating if absent) the ledger database and exit.
    Init,
    /// Print an account's signed balance.
    Balance {
        account_id: String,
        /// Exclude sub-account balances.
        #[arg(long)]
        no_sub: bool,
    },
    /// Build a rollup over every transaction touching a ledger and print
    /// its id, height, and tx_root.
    Rollup {
        ledger_id: String,
        /// Parent rollup id, if this extends a chain.
        #[arg(long)]
        parent: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,ledgerchain=debug".parse().unwrap()),
        )
        .init();

    let args = Args::parse();
    let config = LedgerConfig::new(&args.data_dir);
    let db = LedgerDb::open(&config).context("opening ledger database")?;

    match args.command {
        Command::Init => {
            info!(data_dir = %args.data_dir.display(), "ledger database ready");
            println!("initialized ledger database at {}", args.data_dir.display());
        }
        Command::Balance { account_id, no_sub } => {
            let engine = AccountBalanceEngine::new(&db);
            let id = RecordId::from_hex(account_id);
            let amount = engine
                .balance(&id, !no_sub, &Default::default())
                .context("computing account balance")?;
            println!("{amount}");
        }
        Command::Rollup { ledger_id, parent } => {
            let id = RecordId::from_hex(ledger_id);
            let txns = db.transactions_for_ledger(&id).context("listing ledger transactions")?;
            if txns.is_empty() {
                anyhow::bail!("ledger {id} has no transactions to roll up");
            }
            let runtime = TaprootRuntime;
            let engine = TxRollupEngine::new(&db, &runtime);
            let parent_id = parent.map(RecordId::from_hex);
            let rollup = engine
                .prepare(&txns, parent_id, None, ledgerchain_core::Timestamp::now())
                .context("preparing rollup")?;
            db.put_tx_rollup(&rollup).context("persisting rollup")?;
            println!("{} height={} tx_root={}", rollup.id, rollup.height, rollup.tx_root);
        }
    }

    Ok(())
}
