//! RSS 2.0 feed assembly from stored buckets.

use std::fmt::Write as _;

use crate::model::FeedItem;
use crate::store::DurableStore;

use super::index::read_index;

/// Channel-level metadata of the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
    /// Channel title
    pub title: String,

    /// Channel link
    pub link: String,

    /// Channel description
    pub description: String,
}

impl ChannelInfo {
    /// Create channel metadata.
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            description: description.into(),
        }
    }
}

impl Default for ChannelInfo {
    fn default() -> Self {
        Self::new("Article Archive", "https://docs.google.com/", "Latest articles")
    }
}

/// Escape text for XML element content and attribute values.
pub fn escape_xml(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&apos;"),
            _ => result.push(c),
        }
    }
    result
}

/// Load every item of the stored feed in bucket order.
///
/// Buckets that are missing, unreadable or malformed are skipped with a
/// warning. A missing index yields no items.
pub fn load_items(store: &dyn DurableStore, index_key: &str) -> Vec<FeedItem> {
    let index = read_index(store, index_key);
    let mut items = Vec::new();

    for key in &index.keys {
        let raw = match store.get_property(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                log::warn!("Bucket '{}' listed in the index is missing", key);
                continue;
            }
            Err(e) => {
                log::warn!("Failed to read bucket '{}': {}", key, e);
                continue;
            }
        };
        match serde_json::from_str::<Vec<FeedItem>>(&raw) {
            Ok(bucket) => items.extend(bucket),
            Err(e) => log::warn!("Skipping malformed bucket '{}': {}", key, e),
        }
    }

    log::debug!("Loaded {} feed items from {} buckets", items.len(), index.len());
    items
}

/// Serialize items as an RSS 2.0 document.
pub fn to_rss(items: &[FeedItem], channel: &ChannelInfo) -> String {
    let mut xml = String::with_capacity(256 + items.len() * 256);

    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push('\n');
    xml.push_str(r#"<rss version="2.0">"#);
    xml.push('\n');
    xml.push_str("<channel>\n");
    let _ = writeln!(xml, "<title>{}</title>", escape_xml(&channel.title));
    let _ = writeln!(xml, "<link>{}</link>", escape_xml(&channel.link));
    let _ = writeln!(
        xml,
        "<description>{}</description>",
        escape_xml(&channel.description)
    );

    for item in items {
        xml.push_str("<item>\n");
        let _ = writeln!(xml, "<title>{}</title>", escape_xml(&item.title));
        let _ = writeln!(xml, "<link>{}</link>", escape_xml(&item.url));
        let _ = writeln!(
            xml,
            "<description>{}</description>",
            escape_xml(&item.content)
        );
        let _ = writeln!(
            xml,
            r#"<guid isPermaLink="false">{}</guid>"#,
            escape_xml(&item.id)
        );
        xml.push_str("</item>\n");
    }

    xml.push_str("</channel>\n");
    xml.push_str("</rss>\n");
    xml
}

/// Read the stored buckets and serialize them as RSS 2.0.
pub fn assemble_feed(store: &dyn DurableStore, index_key: &str, channel: &ChannelInfo) -> String {
    to_rss(&load_items(store, index_key), channel)
}
