use std::path::PathBuf;

use clap::Args;

/// Walk the organizational-unit tree and export every account with its
/// OU path as an always-quoted CSV file.
#[derive(Args, Debug)]
pub struct AccountsArgs {
    /// Directory the timestamped CSV is written to
    #[arg(long, value_name = "DIR", default_value = "output")]
    pub output_dir: PathBuf,
}
