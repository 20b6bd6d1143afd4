//! Inspect data-availability signer genesis files.

use clap::{Arg, ArgAction, Command};
use dasigners_committee::{genesis::GenesisState, stake::Ledger, Config, Keeper};
use dasigners_storage::Memory;
use std::{collections::BTreeSet, path::PathBuf};
use tracing::{error, info};

/// Returns the version of the crate.
pub const fn crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Flag for verbose output
const VERBOSE_FLAG: &str = "verbose";

const VALIDATE_CMD: &str = "validate";
const QUORUMS_CMD: &str = "quorums";

/// Chain identifier used when none is provided.
const DEFAULT_CHAIN_ID: &str = "16600";

fn main() -> std::process::ExitCode {
    // Define application
    let matches = Command::new("dasigners")
        .version(crate_version())
        .about("Inspect data-availability signer committees.")
        .arg(
            Arg::new(VERBOSE_FLAG)
                .short('v')
                .long(VERBOSE_FLAG)
                .action(ArgAction::SetTrue),
        )
        .subcommand(
            Command::new(VALIDATE_CMD)
                .about("Validate a genesis file and print a summary.")
                .arg(
                    Arg::new("genesis")
                        .required(true)
                        .help("Path to JSON genesis file")
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            Command::new(QUORUMS_CMD)
                .about("Import a genesis file and print the quorums of an epoch.")
                .arg(
                    Arg::new("genesis")
                        .required(true)
                        .help("Path to JSON genesis file")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("epoch")
                        .long("epoch")
                        .required(true)
                        .help("Epoch to inspect")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    Arg::new("chain-id")
                        .long("chain-id")
                        .default_value(DEFAULT_CHAIN_ID)
                        .help("Chain identifier")
                        .value_parser(clap::value_parser!(u64)),
                ),
        )
        .get_matches();

    // Create logger
    let level = if matches.get_flag(VERBOSE_FLAG) {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    // Parse subcommands
    let result = match matches.subcommand() {
        Some((VALIDATE_CMD, matches)) => {
            let path = matches.get_one::<PathBuf>("genesis").unwrap();
            validate(path)
        }
        Some((QUORUMS_CMD, matches)) => {
            let path = matches.get_one::<PathBuf>("genesis").unwrap();
            let epoch = *matches.get_one::<u64>("epoch").unwrap();
            let chain_id = *matches.get_one::<u64>("chain-id").unwrap();
            quorums(path, epoch, chain_id)
        }
        _ => {
            error!("no subcommand provided");
            return std::process::ExitCode::FAILURE;
        }
    };
    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "command failed");
            std::process::ExitCode::FAILURE
        }
    }
}

fn load(path: &PathBuf) -> Result<GenesisState, String> {
    let json = std::fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))?;
    GenesisState::from_json(&json).map_err(|e| e.to_string())
}

fn validate(path: &PathBuf) -> Result<(), String> {
    let genesis = load(path)?;
    genesis.validate().map_err(|e| e.to_string())?;
    let quorums: usize = genesis.quorums_by_epoch.iter().map(Vec::len).sum();
    info!(
        epoch = genesis.epoch_number,
        signers = genesis.signers.len(),
        quorums,
        registrations = genesis.registrations.len(),
        "genesis valid"
    );
    Ok(())
}

fn quorums(path: &PathBuf, epoch: u64, chain_id: u64) -> Result<(), String> {
    let genesis = load(path)?;
    let mut keeper = Keeper::new(Config { chain_id }, Memory::new(), Ledger::default());
    keeper.init_genesis(&genesis).map_err(|e| e.to_string())?;

    let count = keeper.quorum_count(epoch).map_err(|e| e.to_string())?;
    info!(epoch, count, "loaded quorums");
    for id in 0..count {
        let quorum = keeper.quorum(epoch, id).map_err(|e| e.to_string())?;
        let distinct = quorum.signers.iter().collect::<BTreeSet<_>>().len();
        info!(id, width = quorum.len(), distinct, "quorum");
    }
    Ok(())
}
