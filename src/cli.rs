//! Command-line interface definitions.

use clap::{Parser, Subcommand};

/// Command-line arguments for the episode log.
///
/// # Examples
///
/// ```sh
/// # Check every configured feed once
/// radio_episode_log --config config.yaml run
///
/// # Install the daily 09:00 crontab trigger
/// radio_episode_log --config /etc/radio/config.yaml install-trigger
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the YAML configuration file
    #[arg(
        short,
        long,
        env = "RADIO_EPISODE_LOG_CONFIG",
        default_value = "config.yaml"
    )]
    pub config: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check every configured feed and record new episodes
    Run,
    /// Install (or replace) the daily crontab trigger for the run command
    InstallTrigger {
        /// Local hour of day (0-23) at which the daily run fires
        #[arg(long, default_value_t = 9)]
        hour: u8,
    },
}
