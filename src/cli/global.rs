use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::Level;

use crate::cli::commands::{accounts::AccountsArgs, inventory::InventoryArgs};

#[deny(missing_docs)]
#[derive(Parser, Debug)]
#[command(version = env!("CARGO_PKG_VERSION"))]
/// Orgatlas - Inventory AWS Organizations and IAM Identity Center into deterministic reports
pub struct CommandLineArgs {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Global arguments that apply to all subcommands
    #[command(flatten)]
    pub global_args: GlobalArgs,
}

impl CommandLineArgs {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        CommandLineArgs::parse()
    }
}

/// Top-level subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate the full IAM Identity Center inventory report
    Inventory(InventoryArgs),

    /// Export every account with its organizational-unit path as CSV
    Accounts(AccountsArgs),
}

/// Top-level global CLI arguments
#[derive(Args, Debug, Clone, Default)]
#[command(next_help_heading = "Global Options")]
pub struct GlobalArgs {
    /// Enable verbose output (up to 3 times for more detail)
    #[arg(global = true, long = "verbose", short = 'v', action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error messages
    #[arg(global = true, long, short)]
    pub quiet: bool,
}

impl GlobalArgs {
    pub fn log_level(&self) -> Level {
        if self.quiet {
            Level::ERROR
        } else {
            match self.verbose {
                0 => Level::INFO,  // Default level if no `-v` is provided
                1 => Level::DEBUG, // `-v`
                _ => Level::TRACE, // `-vv` or more
            }
        }
    }
}
