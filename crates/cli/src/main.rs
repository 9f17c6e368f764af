mod driver;
mod prompt;

use anyhow::Result;
use bulk_renamer_core::{load_config, load_config_from, AppConfig, LocalFs};
use clap::Parser;
use driver::{Driver, Outcome, SystemClock};
use prompt::TermSession;
use std::path::PathBuf;
use tracing::Level;

#[derive(Debug, Parser)]
#[command(name = "bulk-renamer")]
#[command(about = "Renames every file in a folder from a name template")]
struct Cli {
    /// Print debug diagnostics to stderr.
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
    /// Read settings from this file instead of the OS config directory.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match cli.config.as_deref() {
        Some(path) => load_config_from(path)?,
        None => load_config().unwrap_or_else(|err| {
            tracing::warn!(%err, "falling back to default settings");
            AppConfig::default()
        }),
    };

    let outcome = {
        let mut driver = Driver::new(TermSession::stdout(), LocalFs, SystemClock, config);
        driver.run()?
    };

    if let Outcome::Renamed(report) = outcome {
        if !report.is_success() {
            anyhow::bail!(
                "{} of {} renames failed",
                report.failed.len(),
                report.attempted()
            );
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
