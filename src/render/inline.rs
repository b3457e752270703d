//! Inline Markdown encoding of styled runs.

use crate::model::{AttributeSet, InlineContent, StyledText};

use super::segment::segment_text;

/// Escape the characters that would otherwise start Markdown code or escapes.
///
/// Only backslash and backtick are escaped, in a single pass, so an escaped
/// sequence is never escaped twice.
pub fn escape_inline(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '`') {
            result.push('\\');
        }
        result.push(c);
    }
    result
}

/// Encode one run of text with its attributes.
///
/// A link takes precedence: linked text is never wrapped in emphasis.
/// Whitespace inside the run is kept as is.
pub fn encode_run(text: &str, attributes: &AttributeSet) -> String {
    let escaped = escape_inline(text);

    if let Some(ref link) = attributes.link {
        return format!("[{}]({})", escaped, link);
    }

    match (attributes.bold, attributes.italic) {
        (true, true) => format!("***{}***", escaped),
        (true, false) => format!("**{}**", escaped),
        (false, true) => format!("*{}*", escaped),
        (false, false) => escaped,
    }
}

/// Encode a styled text element run by run.
pub fn encode_styled_text(text: &StyledText) -> String {
    let chars: Vec<char> = text.text.chars().collect();
    let mut output = String::new();

    for run in segment_text(text) {
        let chunk: String = chars[run.start..run.end]
            .iter()
            .filter(|&&c| c != '\r')
            .collect();
        if chunk.is_empty() {
            continue;
        }
        output.push_str(&encode_run(&chunk, &run.attributes));
    }

    output
}

/// Encode the inline content of a paragraph or list item.
///
/// Non-text elements are skipped.
pub fn encode_inline(content: &[InlineContent]) -> String {
    content
        .iter()
        .filter_map(|item| match item {
            InlineContent::Text(text) => Some(encode_styled_text(text)),
            InlineContent::Other { .. } => None,
        })
        .collect()
}
