use anyhow::{Context, Result};
use orgatlas::{
    cli::{Command, CommandLineArgs, GlobalArgs},
    directory::aws::AwsDirectory,
    inventory, reporter,
};
use tokio::runtime::Builder;
use tracing::info;
use tracing_core::metadata::LevelFilter;
use tracing_subscriber::{
    self, fmt, prelude::__tracing_subscriber_SubscriberExt, registry, util::SubscriberInitExt,
};

fn main() -> anyhow::Result<()> {
    let args = CommandLineArgs::parse_args();

    let runtime =
        Builder::new_multi_thread().enable_all().build().context("Failed to create Tokio runtime")?;
    runtime.block_on(async_main(args))
}

fn setup_logging(global_args: &GlobalArgs) {
    let level = LevelFilter::from_level(global_args.log_level());
    // Enable all targets for `-vvv` or more
    let all_targets = !global_args.quiet && global_args.verbose > 2;

    let filter = if all_targets {
        tracing_subscriber::filter::Targets::new().with_default(LevelFilter::TRACE)
    } else {
        // Per-target filtering, only chatty for this crate
        tracing_subscriber::filter::Targets::new()
            .with_default(LevelFilter::ERROR)
            .with_target("orgatlas", level)
    };

    let fmt_layer = fmt::layer().with_writer(std::io::stderr).with_target(true).with_ansi(false);

    registry().with(fmt_layer).with(filter).init();
}

async fn async_main(args: CommandLineArgs) -> Result<()> {
    setup_logging(&args.global_args);

    let stamp = reporter::run_stamp();
    info!("[start] timestamp: {stamp}");

    let directory = AwsDirectory::from_env().await?;

    match args.command {
        Command::Inventory(inventory_args) => {
            let inventory = inventory::collect(&directory).await?;
            reporter::write_inventory_report(&inventory, &inventory_args.output_dir, &stamp)?;
        }
        Command::Accounts(accounts_args) => {
            let placements = inventory::account_placements(&directory).await?;
            reporter::write_accounts_csv(&placements, &accounts_args.output_dir, &stamp)?;
        }
    }

    info!("[end]");
    Ok(())
}
