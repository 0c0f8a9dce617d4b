//! CLI argument definitions.

use clap::{Args, Parser};

use crate::commands::Command;

/// Command-line client for the mecha API.
#[derive(Parser, Debug)]
#[command(name = "mecha")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Connection settings. Unset flags fall back to MECHA_API_URL and
/// MECHA_API_TIMEOUT_MS.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// API base URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Request timeout in milliseconds
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,
}
