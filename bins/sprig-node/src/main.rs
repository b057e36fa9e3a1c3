//! Sprig node binary.
//!
//! Provisions the master key, starts one sub-wallet per configured currency
//! from the shared HD tree, and lists the persisted branch assignments.

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sprig_node_lib::node::{provision_master_key, read_records};
use sprig_node_lib::{Node, NodeConfig};
use tracing::{error, info};

/// Sprig node: one HD key tree, one branch per currency.
#[derive(Parser, Debug)]
#[command(name = "sprig-node", version, about = "Multi-currency HD wallet node")]
struct Cli {
    /// TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data directory for the master key and wallet records
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log output format ("text" or "json")
    #[arg(long, global = true)]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Provision the master key from a mnemonic (a new one is generated if omitted).
    Init {
        /// Existing BIP-39 phrase to restore from
        #[arg(long)]
        mnemonic: Option<String>,

        /// Word count of a generated phrase (12 or 24)
        #[arg(long, default_value_t = 24)]
        words: usize,
    },
    /// Start every configured currency and run until Ctrl+C.
    Run,
    /// Print persisted wallet records as JSON.
    Wallets,
}

impl Cli {
    /// Merge CLI overrides into the file/env configuration.
    fn load_config(&self) -> Result<NodeConfig> {
        let mut config = NodeConfig::load(self.config.as_deref()).context("loading configuration")?;
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.log_format = format.clone();
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = match cli.load_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e:#}");
            process::exit(1);
        }
    };

    init_logging(&config.log_level, &config.log_format);

    let outcome = match cli.command {
        Command::Init { mnemonic, words } => init(&config, mnemonic, words),
        Command::Run => run(config).await,
        Command::Wallets => list_wallets(&config),
    };

    if let Err(e) = outcome {
        error!("{e:#}");
        process::exit(1);
    }
}

fn init(config: &NodeConfig, mnemonic: Option<String>, words: usize) -> Result<()> {
    let phrase = match mnemonic {
        Some(phrase) => phrase,
        None => {
            let phrase = sprig_wallet::generate_mnemonic(words)?;
            println!("Write down this mnemonic; it is the only backup of every wallet:");
            println!("{phrase}");
            phrase
        }
    };
    provision_master_key(config, &phrase).context("provisioning master key")?;
    info!("master key written to {:?}", config.key_path());
    Ok(())
}

async fn run(config: NodeConfig) -> Result<()> {
    info!("Sprig Node v{}", env!("CARGO_PKG_VERSION"));
    info!("data_dir: {:?}", config.data_dir);
    info!("currencies: {}", config.currencies.len());

    let node = match Node::start(config).await {
        Ok(node) => node,
        Err(e) if e.is_not_initialized() => {
            anyhow::bail!("{e}; run `sprig-node init` to provision the master key")
        }
        Err(e) => return Err(e).context("starting node"),
    };

    for wallet in node.wallets().iter() {
        info!(
            "{}: path={} highest_used_index={} blockheight={}",
            wallet.symbol(),
            wallet.derivation_path(),
            wallet.highest_used_index(),
            wallet.blockheight()
        );
    }
    info!("Sprig node running (Ctrl+C to stop)");

    tokio::signal::ctrl_c()
        .await
        .context("installing Ctrl+C handler")?;
    info!("received Ctrl+C, shutting down...");

    node.shutdown()?;
    info!("Sprig node shutdown complete");
    Ok(())
}

fn list_wallets(config: &NodeConfig) -> Result<()> {
    let records = read_records(config).context("reading wallet records")?;
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}

/// Initialize tracing subscriber with the given log level and output format.
///
/// Pass `format = "json"` for structured JSON output. Any other value
/// defaults to human-readable text.
fn init_logging(level_str: &str, format: &str) {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_str));

    if format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_level(true))
            .init();
    }
}
