//! YAML configuration loading and validation.
//!
//! All runtime configuration lives in one YAML file: the feed/sheet pairs,
//! the directory holding the tracking sheets, and the notification email
//! settings. The settings value is loaded once at startup and passed into the
//! pipeline; nothing is compiled in.

use crate::models::FeedConfig;
use serde::Deserialize;
use std::error::Error;
use std::path::{Path, PathBuf};
use url::Url;

/// Top-level settings, deserialized from the config file.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Feed/sheet pairs, processed in order.
    pub feeds: Vec<FeedConfig>,
    /// Directory containing one `{sheet_name}.csv` file per feed.
    pub sheets_dir: PathBuf,
    /// Outbound notification settings.
    pub email: EmailSettings,
}

/// SMTP settings for the notification email.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailSettings {
    /// Sender address.
    pub from: String,
    /// Fixed recipient for every notification.
    pub to: String,
    /// SMTP relay host.
    pub smtp_host: String,
    /// SMTP relay port.
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// SMTP username; authentication is skipped when absent.
    #[serde(default)]
    pub smtp_username: Option<String>,
    /// SMTP password; authentication is skipped when absent.
    #[serde(default)]
    pub smtp_password: Option<String>,
}

fn default_smtp_port() -> u16 {
    587
}

/// Load and validate settings from a YAML file.
///
/// Validation rejects an empty feed list and any feed URL that is not
/// well-formed http(s), so misconfiguration surfaces at startup rather than
/// mid-run.
pub fn load_settings(path: &Path) -> Result<Settings, Box<dyn Error>> {
    let raw = std::fs::read_to_string(path)?;
    let settings: Settings = serde_yaml::from_str(&raw)?;

    if settings.feeds.is_empty() {
        return Err("configuration lists no feeds".into());
    }
    for feed in &settings.feeds {
        let parsed = Url::parse(&feed.feed_url)?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(format!("feed URL must be http(s): {}", feed.feed_url).into());
        }
        if feed.sheet_name.trim().is_empty() {
            return Err("feed has an empty sheet_name".into());
        }
    }
    Ok(settings)
}
