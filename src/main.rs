//! # Radio Episode Log
//!
//! A single-purpose automation tool that polls the RSS feeds of two NHK radio
//! drama programs, extracts the broadcast date embedded in each episode
//! title, appends newly announced episodes to a per-program tracking sheet,
//! and emails a summary of the additions.
//!
//! ## Usage
//!
//! ```sh
//! radio_episode_log --config config.yaml run
//! ```
//!
//! ## Architecture
//!
//! One run walks the configured feeds sequentially:
//! 1. **Resolve sheet**: locate the program's tracking sheet by name
//! 2. **Fetch**: download and parse the RSS document
//! 3. **Resolve dates**: extract `M月D日` fragments and infer the year
//! 4. **Dedupe**: drop titles already recorded in the sheet
//! 5. **Append & notify**: write the new rows and send a summary email
//!
//! Each feed is an independent failure domain; errors are logged and the run
//! continues with the next feed. Scheduling is external (see the
//! `install-trigger` subcommand).

use clap::Parser;
use std::error::Error;
use std::path::Path;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod dates;
mod feed;
mod models;
mod notify;
mod pipeline;
mod sheet;
mod trigger;

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();

    let args = Cli::parse();
    debug!(?args.config, "Parsed CLI arguments");

    match args.command {
        Command::Run => {
            info!("radio_episode_log starting up");
            let settings = config::load_settings(Path::new(&args.config))?;
            info!(
                config = %args.config,
                feeds = settings.feeds.len(),
                "Loaded configuration"
            );
            pipeline::check_feeds(&settings).await;
        }
        Command::InstallTrigger { hour } => {
            trigger::install_trigger(&args.config, hour)?;
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
