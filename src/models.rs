//! Data models for configured feeds and resolved episode entries.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

/// One configured feed/sheet pair.
///
/// The `sheet_name` doubles as the feed identity for date-pattern selection
/// and as the category label written into column 5 of the sheet.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Name of the tracking sheet (and the category label).
    pub sheet_name: String,
    /// URL of the program's RSS feed.
    pub feed_url: String,
}

/// An episode whose broadcast date was successfully resolved.
///
/// Items without a resolvable date never become entries; they are dropped
/// during per-feed processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEntry {
    /// Display title, as recorded in the sheet.
    pub title: String,
    /// Resolved broadcast date.
    pub date: NaiveDate,
}

static DISPLAY_TITLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"『(.+?)』").unwrap());

/// Extract the display title from a full feed item title.
///
/// Feed titles wrap the episode name in corner brackets
/// (`青春アドベンチャー『遠い声』(3月5日～)`); the text between the first
/// such pair is the display title. Titles without brackets pass through
/// unchanged.
pub fn extract_display_title(full_title: &str) -> String {
    DISPLAY_TITLE
        .captures(full_title)
        .map(|caps| caps[1].to_string())
        .unwrap_or_else(|| full_title.to_string())
}
