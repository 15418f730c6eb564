use std::path::PathBuf;

use clap::Args;

/// Collect accounts, users, groups, permission sets, memberships, and
/// assignments, and render them into one Markdown report.
#[derive(Args, Debug)]
pub struct InventoryArgs {
    /// Directory the timestamped report is written to
    #[arg(long, value_name = "DIR", default_value = "output")]
    pub output_dir: PathBuf,
}
