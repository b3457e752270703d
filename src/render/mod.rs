//! Rendering module for converting documents to Markdown.
//!
//! The pipeline is leaf-first: [`segment`] splits styled text into runs,
//! [`inline`] encodes runs as Markdown inline syntax, and [`markdown`]
//! renders blocks and whole documents.

pub mod inline;
mod json;
mod markdown;
mod options;
mod result;
pub mod segment;

pub use inline::{encode_inline, encode_run, encode_styled_text, escape_inline};
pub use json::{to_json, JsonFormat};
pub use markdown::{
    escape_table_cell, heading_prefix, is_ordered_glyph, render_block, to_markdown,
    to_markdown_with_stats, MarkdownRenderer,
};
pub use options::RenderOptions;
pub use result::{ExtractionStats, RenderResult};
pub use segment::{segment, segment_by_scan, segment_text};
