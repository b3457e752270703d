//! Rendering result with statistics.

use serde::{Deserialize, Serialize};

/// Result of rendering a document, including content and statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderResult {
    /// The rendered Markdown
    pub content: String,

    /// Extraction statistics
    pub stats: ExtractionStats,
}

impl RenderResult {
    /// Create a new render result.
    pub fn new(content: String, stats: ExtractionStats) -> Self {
        Self { content, stats }
    }
}

/// Statistics collected while rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Number of non-heading paragraphs emitted
    pub paragraph_count: u32,

    /// Number of headings emitted
    pub heading_count: u32,

    /// Number of list items emitted
    pub list_item_count: u32,

    /// Number of tables emitted
    pub table_count: u32,

    /// Number of horizontal rules
    pub rule_count: u32,

    /// Number of fallback blocks that produced text
    pub fallback_count: u32,

    /// Number of blocks that produced no output
    pub empty_block_count: u32,

    /// Number of non-text inline elements dropped
    pub skipped_inline_count: u32,

    /// Approximate word count (whitespace-separated tokens)
    pub word_count: u32,

    /// Character count (excluding whitespace)
    pub char_count: u32,
}

impl ExtractionStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add word and character counts from text.
    pub fn count_text(&mut self, text: &str) {
        self.word_count += text.split_whitespace().count() as u32;
        self.char_count += text.chars().filter(|c| !c.is_whitespace()).count() as u32;
    }
}
