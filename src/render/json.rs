//! JSON serialization of rendered output.

use crate::error::Result;
use serde::Serialize;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    Pretty,
    /// Compact JSON without extra whitespace
    #[default]
    Compact,
}

/// Serialize any model value to JSON.
///
/// Compact output is the wire format used for cache entries, durable
/// buckets and responses; byte budgets are always measured on it.
pub fn to_json<T: Serialize + ?Sized>(value: &T, format: JsonFormat) -> Result<String> {
    let json = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value)?,
        JsonFormat::Compact => serde_json::to_string(value)?,
    };
    Ok(json)
}
