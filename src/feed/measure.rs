//! Byte-size measurement for storage budgets.
//!
//! Storage ceilings are enforced with the same approximation the hosting
//! platform uses when it measures a string as a blob: every UTF-16 code unit
//! above 127 counts as three bytes, everything else as one. This is not the
//! UTF-8 length (a character outside the BMP counts as six bytes, not four)
//! and must not be "fixed", since truncation points depend on it.

use serde::Serialize;

/// Approximate stored size of a string in bytes.
pub fn byte_len(text: &str) -> usize {
    text.encode_utf16()
        .map(|unit| if unit > 127 { 3 } else { 1 })
        .sum()
}

/// Approximate stored size of a value serialized as compact JSON.
///
/// A value that cannot be serialized is reported as `usize::MAX` so that it
/// never fits any budget.
pub fn json_byte_len<T: Serialize + ?Sized>(value: &T) -> usize {
    serde_json::to_string(value)
        .map(|json| byte_len(&json))
        .unwrap_or(usize::MAX)
}
