//! Styled text types.

use serde::{Deserialize, Serialize};

/// The style attributes that survive into Markdown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeSet {
    /// Bold text
    #[serde(default)]
    pub bold: bool,

    /// Italic text
    #[serde(default)]
    pub italic: bool,

    /// Link target, if the text is a hyperlink
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl AttributeSet {
    /// Bold attributes.
    pub fn bold() -> Self {
        Self {
            bold: true,
            ..Default::default()
        }
    }

    /// Italic attributes.
    pub fn italic() -> Self {
        Self {
            italic: true,
            ..Default::default()
        }
    }

    /// Bold and italic attributes.
    pub fn bold_italic() -> Self {
        Self {
            bold: true,
            italic: true,
            link: None,
        }
    }

    /// Hyperlink attributes.
    pub fn link(url: impl Into<String>) -> Self {
        Self {
            link: Some(url.into()),
            ..Default::default()
        }
    }

    /// Check if any styling is applied.
    pub fn is_plain(&self) -> bool {
        !self.bold && !self.italic && self.link.is_none()
    }
}

/// Attributes applied to the half-open character range `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeSpan {
    /// First character offset
    pub start: usize,

    /// One past the last character offset
    pub end: usize,

    /// Attributes of the range
    #[serde(flatten)]
    pub attributes: AttributeSet,
}

/// A text element with per-character style attributes.
///
/// Offsets are character offsets into `text`. Characters not covered by any
/// span carry the default (plain) attributes; where spans overlap the later
/// span wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyledText {
    /// The text content
    pub text: String,

    /// Attribute spans over the text
    #[serde(default)]
    pub spans: Vec<AttributeSpan>,
}

impl StyledText {
    /// Create unstyled text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            spans: Vec::new(),
        }
    }

    /// Create text with one attribute set covering all of it.
    pub fn styled(text: impl Into<String>, attributes: AttributeSet) -> Self {
        let text = text.into();
        let end = text.chars().count();
        Self {
            text,
            spans: vec![AttributeSpan {
                start: 0,
                end,
                attributes,
            }],
        }
    }

    /// Add an attribute span.
    pub fn with_span(mut self, start: usize, end: usize, attributes: AttributeSet) -> Self {
        self.spans.push(AttributeSpan {
            start,
            end,
            attributes,
        });
        self
    }

    /// Length in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Offsets at which the attributes may change.
    ///
    /// These are hints as reported by the source: they may be unsorted,
    /// duplicated or out of range.
    pub fn attribute_indices(&self) -> Vec<usize> {
        self.spans
            .iter()
            .flat_map(|span| [span.start, span.end])
            .collect()
    }

    /// Attributes in effect at a character offset.
    pub fn attributes_at(&self, offset: usize) -> AttributeSet {
        self.spans
            .iter()
            .rev()
            .find(|span| span.start <= offset && offset < span.end)
            .map(|span| span.attributes.clone())
            .unwrap_or_default()
    }
}

/// A maximal run of constant attributes over `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledRun {
    /// First character offset
    pub start: usize,

    /// One past the last character offset
    pub end: usize,

    /// Attributes of the run
    pub attributes: AttributeSet,
}

impl StyledRun {
    /// Number of characters covered.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Check if the run covers nothing.
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Inline content within a paragraph or list item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InlineContent {
    /// A styled text element
    Text(StyledText),

    /// Anything else (inline image, footnote reference, ...); not rendered
    Other {
        /// Source element kind
        kind: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attributes_at_uses_covering_span() {
        let text = StyledText::new("bold italic")
            .with_span(0, 4, AttributeSet::bold())
            .with_span(5, 11, AttributeSet::italic());

        assert_eq!(text.attributes_at(0), AttributeSet::bold());
        assert_eq!(text.attributes_at(4), AttributeSet::default());
        assert_eq!(text.attributes_at(10), AttributeSet::italic());
        assert_eq!(text.attributes_at(99), AttributeSet::default());
    }

    #[test]
    fn test_later_span_wins() {
        let text = StyledText::styled("abc", AttributeSet::bold()).with_span(
            1,
            2,
            AttributeSet::link("http://example.com"),
        );
        assert_eq!(text.attributes_at(1), AttributeSet::link("http://example.com"));
        assert_eq!(text.attributes_at(2), AttributeSet::bold());
    }

    #[test]
    fn test_styled_text_json_shape() {
        let json = r#"{"text":"hi","spans":[{"start":0,"end":2,"bold":true}]}"#;
        let text: StyledText = serde_json::from_str(json).unwrap();
        assert_eq!(text.attributes_at(1), AttributeSet::bold());

        let inline: InlineContent = serde_json::from_str(r#"{"type":"other","kind":"image"}"#).unwrap();
        assert!(matches!(inline, InlineContent::Other { .. }));
    }
}
