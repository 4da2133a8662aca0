//! Command line interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dpos-node", version, about = "DPoS staking node: genesis, block replay, state queries")]
pub struct Cli {
    /// Path to the TOML config file.
    #[arg(long, default_value = "./config.toml")]
    pub config: PathBuf,

    /// Override the log filter (otherwise `RUST_LOG`, then `logging.level`).
    #[arg(long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a JSON block log on top of the stored state
    Run {
        #[arg(long)]
        blocks: PathBuf,
    },
    /// List registered candidates
    Candidates,
    /// Show the last emitted validator set
    Validators,
    /// Show module params
    Params,
    /// Show an account balance
    Balance {
        #[arg(long)]
        address: String,
        #[arg(long, default_value = "stake")]
        denom: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_subcommand_parses() {
        let cli = Cli::try_parse_from(["dpos-node", "--config", "node.toml", "run", "--blocks", "b.json"])
            .expect("parse");
        assert_eq!(cli.config, PathBuf::from("node.toml"));
        assert!(matches!(cli.cmd, Commands::Run { ref blocks } if blocks == &PathBuf::from("b.json")));
    }

    #[test]
    fn balance_denom_defaults_to_stake() {
        let cli = Cli::try_parse_from(["dpos-node", "balance", "--address", "01"]).expect("parse");
        match cli.cmd {
            Commands::Balance { denom, .. } => assert_eq!(denom, "stake"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn missing_subcommand_is_error() {
        assert!(Cli::try_parse_from(["dpos-node"]).is_err());
    }
}
