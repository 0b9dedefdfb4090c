//! Per-feed processing pipeline: fetch → resolve dates → dedupe → append →
//! notify.
//!
//! Feeds are processed strictly one at a time, in configured order, and every
//! step completes before the next begins. Each feed is its own failure
//! domain: a missing sheet, a fetch/parse error, or an append/notify error is
//! logged and the loop moves on to the next configured feed.

use crate::config::Settings;
use crate::dates::{self, format_date};
use crate::feed;
use crate::models::{FeedConfig, ResolvedEntry, extract_display_title};
use crate::notify;
use crate::sheet::Sheet;
use chrono::{Local, NaiveDate};
use std::collections::HashSet;
use std::error::Error;
use tracing::{error, info};

/// Run one full check over every configured feed.
pub async fn check_feeds(settings: &Settings) {
    info!("========== feed check starting ==========");
    for feed_cfg in &settings.feeds {
        info!(sheet = %feed_cfg.sheet_name, "--- processing sheet ---");

        // Resolve the sheet before touching the network; a missing sheet
        // skips the feed entirely.
        let sheet = match Sheet::open(&settings.sheets_dir, &feed_cfg.sheet_name) {
            Ok(sheet) => sheet,
            Err(e) => {
                error!(sheet = %feed_cfg.sheet_name, error = %e, "Sheet not found; skipping feed");
                continue;
            }
        };

        match process_feed(settings, feed_cfg, &sheet).await {
            Ok(()) => info!(sheet = %feed_cfg.sheet_name, "--- sheet processing complete ---"),
            Err(e) => {
                error!(sheet = %feed_cfg.sheet_name, error = %e, "Feed processing failed")
            }
        }
    }
    info!("========== feed check finished ==========");
}

async fn process_feed(
    settings: &Settings,
    feed_cfg: &FeedConfig,
    sheet: &Sheet,
) -> Result<(), Box<dyn Error>> {
    info!(url = %feed_cfg.feed_url, "Fetching feed");
    let titles = feed::fetch_item_titles(&feed_cfg.feed_url).await?;
    info!(count = titles.len(), "Fetched feed items");

    let today = Local::now().date_naive();
    let mut entries = resolve_items(&titles, &feed_cfg.sheet_name, today);
    entries.sort_by_key(|entry| entry.date);

    let existing = sheet.existing_titles()?;
    info!(count = existing.len(), "Existing titles in sheet");

    let to_add = select_new_entries(entries, &existing);
    info!(count = to_add.len(), "Entries to add");

    if to_add.is_empty() {
        info!("No new entries");
        return Ok(());
    }

    sheet.append_entries(&to_add)?;
    notify::send_notification(&settings.email, sheet.name(), &to_add)?;
    Ok(())
}

/// Resolve every fetched title into an entry with a concrete broadcast date.
///
/// Items whose title carries no recognizable or valid date are dropped; each
/// item's outcome is logged either way.
pub fn resolve_items(titles: &[String], feed_identity: &str, today: NaiveDate) -> Vec<ResolvedEntry> {
    titles
        .iter()
        .filter_map(|full_title| {
            let title = extract_display_title(full_title);
            let fragment = dates::extract_date_fragment(full_title, feed_identity);
            match dates::resolve_broadcast_date(fragment.as_deref(), today) {
                Some(date) => {
                    info!(title = %title, date = %format_date(date), "Parsed item");
                    Some(ResolvedEntry { title, date })
                }
                None => {
                    info!(title = %title, date = "unknown", "Parsed item");
                    None
                }
            }
        })
        .collect()
}

/// Drop candidates whose trimmed title already appears in the pre-run
/// snapshot of existing titles.
///
/// The snapshot is deliberately not extended as candidates are accepted, so
/// two candidates with identical titles in the same run would both pass.
pub fn select_new_entries(
    entries: Vec<ResolvedEntry>,
    existing: &HashSet<String>,
) -> Vec<ResolvedEntry> {
    entries
        .into_iter()
        .filter(|entry| !existing.contains(entry.title.trim()))
        .collect()
}
