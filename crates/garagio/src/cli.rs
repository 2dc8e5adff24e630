//! Clap derive structures for the `garagio` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// garagio -- command-line client for a two-door garage controller
#[derive(Debug, Parser)]
#[command(
    name = "garagio",
    version,
    about = "Watch and command a Garagio garage-door controller",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Device base URL (https only; overrides the stored account)
    #[arg(long, short = 'u', env = "GARAGIO_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Account username
    #[arg(long, short = 'n', env = "GARAGIO_USERNAME", global = true)]
    pub username: Option<String>,

    /// Account password
    #[arg(long, env = "GARAGIO_PASSWORD", global = true, hide_env = true)]
    pub password: Option<String>,

    /// Config file path (defaults to the platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Emit statuses as JSON lines instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch and print one status snapshot
    Status,

    /// Run the observation engine and print every status emission
    Watch,

    /// Open a door
    Open(DoorArgs),

    /// Close a door
    Close(DoorArgs),

    /// Inspect or update the stored account
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Debug, Args)]
pub struct DoorArgs {
    /// Door number
    #[arg(value_parser = clap::value_parser!(u8).range(0..=1))]
    pub door: u8,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the stored account (password withheld)
    Show,

    /// Update the stored account from the global flags
    Set,
}
