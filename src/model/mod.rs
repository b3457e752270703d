//! Document model types for rich-text archive content.
//!
//! This module defines the intermediate representation (IR) that bridges a
//! document source and the Markdown renderer, plus the article and feed item
//! records that flow through caches and the durable store. The model is
//! plain data: every type is `serde`-serializable so documents can be loaded
//! from JSON and rendered articles can be cached as JSON.

mod article;
mod block;
mod table;
mod text;

pub use article::{Article, FeedItem};
pub use block::{Block, ListItem, Paragraph};
pub use table::{Table, TableCell, TableRow};
pub use text::{AttributeSet, AttributeSpan, InlineContent, StyledRun, StyledText};
