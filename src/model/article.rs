//! Rendered article and feed item records.

use serde::{Deserialize, Serialize};

/// A rendered document, keyed by document id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Document id
    pub id: String,

    /// Document title
    pub title: String,

    /// Rendered Markdown body
    pub markdown: String,
}

impl Article {
    /// Create a new article.
    pub fn new(id: impl Into<String>, title: impl Into<String>, markdown: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            markdown: markdown.into(),
        }
    }

    /// Convert to a feed item, linking to the document through `url_template`.
    ///
    /// Every `{id}` in the template is replaced with the document id.
    pub fn to_feed_item(&self, url_template: &str) -> FeedItem {
        FeedItem {
            id: self.id.clone(),
            title: self.title.clone(),
            url: url_template.replace("{id}", &self.id),
            content: self.markdown.clone(),
        }
    }
}

/// The syndicated form of an article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    /// Document id
    pub id: String,

    /// Item title
    pub title: String,

    /// Link to the document
    pub url: String,

    /// Markdown content, possibly truncated with a trailing `...`
    pub content: String,
}
