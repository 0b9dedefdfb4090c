//! Email notification for newly recorded episodes.
//!
//! Sent after the rows are committed to the sheet; a send failure therefore
//! never rolls back storage, it only surfaces in the per-feed error log.

use crate::config::EmailSettings;
use crate::dates::format_date;
use crate::models::ResolvedEntry;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use std::error::Error;
use tracing::info;

pub fn compose_subject(sheet_name: &str) -> String {
    format!("{sheet_name} の新規RSSエントリー")
}

/// One `date : title` line per entry, in the order the entries were appended.
pub fn compose_body(entries: &[ResolvedEntry]) -> String {
    entries
        .iter()
        .map(|entry| format!("{} : {}", format_date(entry.date), entry.title))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Send the summary email for one sheet's newly added entries.
pub fn send_notification(
    email: &EmailSettings,
    sheet_name: &str,
    entries: &[ResolvedEntry],
) -> Result<(), Box<dyn Error>> {
    let message = Message::builder()
        .from(email.from.parse()?)
        .to(email.to.parse()?)
        .subject(compose_subject(sheet_name))
        .body(compose_body(entries))?;

    let mut builder = SmtpTransport::relay(&email.smtp_host)?.port(email.smtp_port);
    if let (Some(user), Some(pass)) = (&email.smtp_username, &email.smtp_password) {
        builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
    }
    builder.build().send(&message)?;

    info!(
        sheet = %sheet_name,
        entries = entries.len(),
        to = %email.to,
        "Sent notification email"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn entry(title: &str, y: i32, m: u32, d: u32) -> ResolvedEntry {
        ResolvedEntry {
            title: title.to_string(),
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
        }
    }

    #[test]
    fn test_compose_body_one_line_per_entry_in_order() {
        let body = compose_body(&[entry("遠い声", 2026, 1, 2), entry("砂の城", 2026, 1, 10)]);
        assert_eq!(body, "2026-01-02 : 遠い声\n2026-01-10 : 砂の城");
    }

    #[test]
    fn test_compose_body_empty() {
        assert_eq!(compose_body(&[]), "");
    }

    #[test]
    fn test_compose_subject_names_category() {
        assert_eq!(compose_subject("FMシアター"), "FMシアター の新規RSSエントリー");
    }
}
