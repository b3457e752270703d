//! Block-level types.

use super::{InlineContent, StyledText, Table};
use serde::{Deserialize, Serialize};

/// One structural unit of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// A paragraph, possibly a heading
    Paragraph(Paragraph),

    /// A list item
    ListItem(ListItem),

    /// A table
    Table(Table),

    /// Horizontal rule
    Rule,

    /// Any other element; rendered as its raw text if it has one
    Fallback {
        /// Extractable raw text
        #[serde(default)]
        text: Option<String>,
    },
}

impl Block {
    /// Create a fallback block carrying raw text.
    pub fn fallback(text: impl Into<String>) -> Self {
        Block::Fallback {
            text: Some(text.into()),
        }
    }
}

impl From<Paragraph> for Block {
    fn from(p: Paragraph) -> Self {
        Block::Paragraph(p)
    }
}

impl From<ListItem> for Block {
    fn from(item: ListItem) -> Self {
        Block::ListItem(item)
    }
}

impl From<Table> for Block {
    fn from(table: Table) -> Self {
        Block::Table(table)
    }
}

/// A paragraph of styled text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Inline elements in document order
    #[serde(default)]
    pub content: Vec<InlineContent>,

    /// Heading level (1-6) or None for a normal paragraph
    #[serde(default)]
    pub heading: Option<u8>,
}

impl Paragraph {
    /// Create a new empty paragraph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a paragraph with plain text.
    pub fn with_text(text: impl Into<String>) -> Self {
        let mut p = Self::new();
        p.add_text(text);
        p
    }

    /// Create a heading paragraph.
    pub fn heading(text: impl Into<String>, level: u8) -> Self {
        let mut p = Self::with_text(text);
        p.heading = Some(level);
        p
    }

    /// Add plain text to the paragraph.
    pub fn add_text(&mut self, text: impl Into<String>) {
        self.content.push(InlineContent::Text(StyledText::new(text)));
    }

    /// Add a styled text element.
    pub fn add_styled(&mut self, text: StyledText) {
        self.content.push(InlineContent::Text(text));
    }

    /// Get plain text content of the paragraph.
    pub fn plain_text(&self) -> String {
        plain_text(&self.content)
    }
}

/// A list item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    /// Inline elements in document order
    #[serde(default)]
    pub content: Vec<InlineContent>,

    /// Nesting level (0 = top level)
    #[serde(default)]
    pub nesting_level: u8,

    /// Glyph tag as reported by the source (e.g. `BULLET`, `NUMBER`)
    #[serde(default)]
    pub glyph: String,
}

impl ListItem {
    /// Create a list item with plain text.
    pub fn new(text: impl Into<String>, nesting_level: u8, glyph: impl Into<String>) -> Self {
        Self {
            content: vec![InlineContent::Text(StyledText::new(text))],
            nesting_level,
            glyph: glyph.into(),
        }
    }

    /// Create a bulleted list item.
    pub fn bullet(text: impl Into<String>, nesting_level: u8) -> Self {
        Self::new(text, nesting_level, "BULLET")
    }

    /// Create a numbered list item.
    pub fn numbered(text: impl Into<String>, nesting_level: u8) -> Self {
        Self::new(text, nesting_level, "NUMBER")
    }

    /// Get plain text content of the item.
    pub fn plain_text(&self) -> String {
        plain_text(&self.content)
    }
}

fn plain_text(content: &[InlineContent]) -> String {
    content
        .iter()
        .filter_map(|c| match c {
            InlineContent::Text(t) => Some(t.text.as_str()),
            InlineContent::Other { .. } => None,
        })
        .collect()
}
