//! # DPoS Node Entry Point
//!
//! ```text
//! dpos-node --config config.toml run --blocks blocks.json
//! dpos-node --config config.toml candidates
//! dpos-node --config config.toml validators
//! dpos-node --config config.toml params
//! dpos-node --config config.toml balance --address <hex>
//! ```
//!
//! Log filter: `--log-level`, lalu `RUST_LOG`, lalu `logging.level` dari config.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use dpos_common::config::{load_from_file, NodeConfig};
use dpos_common::Address;
use dpos_node::cli::{Cli, Commands};
use dpos_node::{load_block_log, NodeRuntime, NODE_NAME, NODE_VERSION};

fn init_tracing(cli: &Cli, config: &NodeConfig) {
    let filter = match &cli.log_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn run(cli: Cli, config: NodeConfig) -> Result<()> {
    let mut node = NodeRuntime::open(&config)?;

    match cli.cmd {
        Commands::Run { blocks } => {
            info!("═══════════════════════════════════════════════════════════════");
            info!("               {} v{}", NODE_NAME, NODE_VERSION);
            info!("═══════════════════════════════════════════════════════════════");
            info!("DB Path:      {}", config.storage.db_path);
            info!("Block Log:    {}", blocks.display());
            info!("Last Height:  {:?}", node.last_height());
            info!("═══════════════════════════════════════════════════════════════");

            let log = load_block_log(&blocks)?;
            let summary = node.replay(&log)?;
            info!(
                "replay done: {} block(s) applied, {} skipped, {} tx ok, {} tx rejected, height {:?}",
                summary.blocks_applied,
                summary.blocks_skipped,
                summary.txs_delivered,
                summary.txs_rejected,
                summary.last_height
            );
        }
        Commands::Candidates => {
            for c in node.candidates()? {
                let owner = c.owner.map(|o| o.to_string()).unwrap_or_else(|| "-".to_string());
                println!(
                    "{}  shares={} bonded={} rate={} commission={} owner={} moniker={:?}",
                    c.pub_key, c.shares, c.bonded, c.exchange_rate, c.commission, owner, c.description.moniker
                );
            }
        }
        Commands::Validators => {
            for v in node.validator_set()? {
                println!("{}  power={}", v.pub_key, v.power);
            }
        }
        Commands::Params => {
            let params = node.params()?;
            println!("{}", serde_json::to_string_pretty(&params)?);
        }
        Commands::Balance { address, denom } => {
            let account: Address = address.parse().context("invalid address")?;
            println!("{} {}{}", account, node.balance(&account, &denom)?, denom);
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let config = match load_from_file(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("cannot load config {}: {}", cli.config.display(), e);
            std::process::exit(1);
        }
    };
    init_tracing(&cli, &config);

    if let Err(e) = run(cli, config) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
