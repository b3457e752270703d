//! # docfeed
//!
//! Rich-text document archive publishing to Markdown and RSS.
//!
//! Documents are trees of blocks (paragraphs, list items, tables, rules)
//! whose text carries per-character style attributes. This library renders
//! them to Markdown, serves the results through a cache tier, and packs them
//! into byte-bounded buckets in a durable store from which an RSS 2.0 feed
//! is assembled.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docfeed::{render, load_document};
//!
//! fn main() -> docfeed::Result<()> {
//!     // Load a document serialized as JSON
//!     let doc = load_document("document.json")?;
//!
//!     // Convert to Markdown
//!     let options = render::RenderOptions::default();
//!     let markdown = render::to_markdown(&doc.blocks, &options);
//!     println!("{}", markdown);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Serving an archive
//!
//! ```no_run
//! use std::sync::Arc;
//! use docfeed::{Archive, ArchiveOptions, DirectorySource, FileStore, Request};
//!
//! fn main() -> docfeed::Result<()> {
//!     let archive = Archive::from_source(
//!         Arc::new(DirectorySource::new("./docs")),
//!         Arc::new(FileStore::open("cache.json")?),
//!         Arc::new(FileStore::open("store.json")?),
//!         ArchiveOptions::new("published"),
//!     );
//!
//!     archive.precache_all()?;
//!     archive.repack_feed();
//!     println!("{}", archive.handle(&Request::feed()).body);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Structural Markdown rendering**: headings, lists, tables, inline styles
//! - **Tiered caching**: TTL cache for articles, durable store for the feed
//! - **Byte-bounded packing**: per-bucket and total budgets with safe truncation
//! - **Parallel processing**: Uses Rayon when rendering many documents

pub mod archive;
pub mod error;
pub mod feed;
pub mod journal;
pub mod model;
pub mod render;
pub mod source;
pub mod store;

// Re-export commonly used types
pub use archive::{
    Archive, ArchiveOptions, ErrorResponse, ListResponse, Mime, PrecacheReport, RepackReport,
    Request, Response,
};
pub use error::{Error, Result};
pub use feed::{
    BucketIndex, BucketPacker, ChannelInfo, IndexLayout, PackOptions, PackOutcome,
};
pub use journal::Journal;
pub use model::{
    Article, AttributeSet, AttributeSpan, Block, FeedItem, InlineContent, ListItem, Paragraph,
    StyledRun, StyledText, Table, TableCell, TableRow,
};
pub use render::{ExtractionStats, JsonFormat, RenderOptions, RenderResult};
pub use source::{DirectorySource, DocumentEntry, DocumentSource, ListingSource, SourceDocument};
pub use store::{CacheTier, DurableStore, FileStore, MemoryStore};

use std::fs;
use std::path::Path;

/// Load a document serialized as JSON.
///
/// # Arguments
///
/// * `path` - Path to a file holding a [`SourceDocument`]
///
/// # Example
///
/// ```no_run
/// use docfeed::load_document;
///
/// let doc = load_document("document.json").unwrap();
/// println!("Blocks: {}", doc.blocks.len());
/// ```
pub fn load_document<P: AsRef<Path>>(path: P) -> Result<SourceDocument> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Convert a JSON document file to Markdown.
///
/// # Example
///
/// ```no_run
/// use docfeed::to_markdown;
///
/// let markdown = to_markdown("document.json").unwrap();
/// std::fs::write("output.md", markdown).unwrap();
/// ```
pub fn to_markdown<P: AsRef<Path>>(path: P) -> Result<String> {
    let doc = load_document(path)?;
    Ok(render::to_markdown(&doc.blocks, &RenderOptions::default()))
}

/// Convert a JSON document file to Markdown with statistics.
pub fn to_markdown_with_options<P: AsRef<Path>>(
    path: P,
    options: &RenderOptions,
) -> Result<RenderResult> {
    let doc = load_document(path)?;
    Ok(render::to_markdown_with_stats(&doc.blocks, options))
}

/// Render a JSON document file into an [`Article`] keyed by `id`.
pub fn render_article<P: AsRef<Path>>(
    path: P,
    id: impl Into<String>,
    options: &RenderOptions,
) -> Result<Article> {
    let doc = load_document(path)?;
    let markdown = render::to_markdown(&doc.blocks, options);
    Ok(Article::new(id, doc.title, markdown))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_markdown_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        let doc = SourceDocument {
            title: "Greeting".to_string(),
            blocks: vec![
                Paragraph::heading("Hello", 1).into(),
                ListItem::bullet("World", 0).into(),
            ],
        };
        fs::write(&path, serde_json::to_string(&doc).unwrap()).unwrap();

        assert_eq!(to_markdown(&path).unwrap(), "# Hello\n\n- World\n");

        let article = render_article(&path, "doc", &RenderOptions::default()).unwrap();
        assert_eq!(article.title, "Greeting");
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_document("/nonexistent/doc.json"),
            Err(Error::Io(_))
        ));
    }
}
