//! RSS feed fetching and parsing.
//!
//! Only `channel/item/title` text is consumed from the feed document; every
//! other element is ignored. Fetch failures, XML syntax errors, and a missing
//! `channel` element all propagate to the per-feed error boundary in the
//! pipeline.

use quick_xml::Reader;
use quick_xml::events::Event;
use std::error::Error;
use tracing::{debug, instrument};

/// Fetch a feed document and return its item titles in document order.
#[instrument(level = "info", skip_all, fields(url = %feed_url))]
pub async fn fetch_item_titles(feed_url: &str) -> Result<Vec<String>, Box<dyn Error>> {
    let body = reqwest::get(feed_url).await?.text().await?;
    debug!(bytes = body.len(), "Fetched feed document");
    parse_item_titles(&body)
}

/// Parse an RSS 2.0 document, returning the text of every
/// `rss > channel > item > title` element in document order.
///
/// Errors on malformed XML and on documents without an `rss > channel`
/// element. A channel with no items is valid and yields an empty vector.
pub fn parse_item_titles(xml: &str) -> Result<Vec<String>, Box<dyn Error>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    const ITEM_TITLE: &[&str] = &["rss", "channel", "item", "title"];

    let mut path: Vec<String> = Vec::new();
    let mut titles: Vec<String> = Vec::new();
    let mut current_title: Option<String> = None;
    let mut saw_channel = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                path.push(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
                if path_is(&path, &["rss", "channel"]) {
                    saw_channel = true;
                }
                if path_is(&path, ITEM_TITLE) {
                    current_title = Some(String::new());
                }
            }
            Event::Text(e) => {
                if let Some(title) = current_title.as_mut() {
                    title.push_str(&e.unescape()?);
                }
            }
            Event::CData(e) => {
                if let Some(title) = current_title.as_mut() {
                    title.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Event::End(_) => {
                if path_is(&path, ITEM_TITLE) {
                    if let Some(title) = current_title.take() {
                        titles.push(title);
                    }
                }
                path.pop();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_channel {
        return Err("feed document has no rss/channel element".into());
    }
    Ok(titles)
}

fn path_is(path: &[String], expected: &[&str]) -> bool {
    path.len() == expected.len() && path.iter().zip(expected).all(|(a, b)| a == b)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>青春アドベンチャー</title>
    <link>https://example.invalid/program</link>
    <item>
      <title>『遠い声』(1月2日～)</title>
      <link>https://example.invalid/ep1</link>
    </item>
    <item>
      <title>『砂の城』(1月10日～)</title>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_parses_item_titles_in_document_order() {
        let titles = parse_item_titles(SAMPLE_FEED).unwrap();
        assert_eq!(
            titles,
            vec!["『遠い声』(1月2日～)".to_string(), "『砂の城』(1月10日～)".to_string()]
        );
    }

    #[test]
    fn test_channel_title_is_not_an_item_title() {
        let titles = parse_item_titles(SAMPLE_FEED).unwrap();
        assert!(!titles.iter().any(|t| t == "青春アドベンチャー"));
    }

    #[test]
    fn test_cdata_titles_are_read() {
        let xml = r#"<rss><channel><item><title><![CDATA[『遠い声』（1月2日）]]></title></item></channel></rss>"#;
        let titles = parse_item_titles(xml).unwrap();
        assert_eq!(titles, vec!["『遠い声』（1月2日）".to_string()]);
    }

    #[test]
    fn test_empty_channel_yields_no_titles() {
        let xml = r#"<rss version="2.0"><channel><title>x</title></channel></rss>"#;
        assert_eq!(parse_item_titles(xml).unwrap(), Vec::<String>::new());
    }

    #[test]
    fn test_mismatched_tags_error() {
        let xml = r#"<rss><channel><item></wrong></channel></rss>"#;
        assert!(parse_item_titles(xml).is_err());
    }

    #[test]
    fn test_document_without_channel_errors() {
        let xml = r#"<html><body>not a feed</body></html>"#;
        assert!(parse_item_titles(xml).is_err());
    }
}
