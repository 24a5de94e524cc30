//! Command-line interface definitions.

pub mod check;
pub mod inspect;
pub mod replay;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Lockstep - deterministic replicated-market ledger.
#[derive(Parser, Debug)]
#[command(name = "lockstep")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay an operation log and report the resulting state
    Replay(ReplayArgs),

    /// Decode an operation log and list its frames
    Inspect(InspectArgs),

    /// Run diagnostic checks
    #[command(subcommand)]
    Check(CheckCommand),
}

/// Subcommands for `lockstep check`
#[derive(Subcommand, Debug)]
pub enum CheckCommand {
    /// Validate configuration file
    Config(ConfigPathArg),
}

/// Shared argument for commands that only need a config path.
#[derive(Parser, Debug)]
pub struct ConfigPathArg {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,
}

/// Arguments for the `replay` subcommand.
#[derive(Parser, Debug)]
pub struct ReplayArgs {
    /// Path to the binary operation log
    pub log: PathBuf,

    /// Path to configuration file; built-in defaults when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Emit the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Include the state digest in the report
    #[arg(long)]
    pub digest: bool,
}

/// Arguments for the `inspect` subcommand.
#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// Path to the binary operation log
    pub log: PathBuf,
}
