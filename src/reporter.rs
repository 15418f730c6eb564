use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::Local;
use tracing::info;

use crate::inventory::{AccountPlacement, Inventory};

mod csv_format;
mod markdown_format;

/// Timestamp fragment embedded in every output filename, so repeated runs
/// never collide.
pub fn run_stamp() -> String {
    Local::now().format("%Y-%m-%d_%H-%M-%S").to_string()
}

/// Render the full inventory to Markdown and write it under `output_dir`
/// as `inventory_<stamp>.md`.
pub fn write_inventory_report(
    inventory: &Inventory,
    output_dir: &Path,
    stamp: &str,
) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;

    let path = output_dir.join(format!("inventory_{stamp}.md"));
    let report = markdown_format::render(inventory, stamp);
    fs::write(&path, report)
        .with_context(|| format!("Failed to write inventory report {}", path.display()))?;

    info!("Inventory report saved to {}", path.display());
    Ok(path)
}

/// Render the accounts-with-OU-path relation to CSV and write it under
/// `output_dir` as `accounts_<stamp>.csv`.
pub fn write_accounts_csv(
    placements: &[AccountPlacement],
    output_dir: &Path,
    stamp: &str,
) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;

    let path = output_dir.join(format!("accounts_{stamp}.csv"));
    fs::write(&path, csv_format::render(placements))
        .with_context(|| format!("Failed to write accounts CSV {}", path.display()))?;

    info!("Accounts CSV saved to {}", path.display());
    Ok(path)
}
