//! Document and listing collaborators.
//!
//! A [`DocumentSource`] hands out the block tree and title of a document by
//! id; a [`ListingSource`] enumerates the documents of a folder. The
//! [`DirectorySource`] implements both over JSON files on disk.

mod directory;

pub use directory::DirectorySource;

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::error::Result;
use crate::model::Block;

/// A document as delivered by a source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDocument {
    /// Document title
    #[serde(default)]
    pub title: String,

    /// Body blocks in document order
    #[serde(default)]
    pub blocks: Vec<Block>,
}

/// Provides document contents by id.
///
/// Unknown ids fail with [`Error::NotFound`](crate::Error::NotFound);
/// documents the source refuses to open fail with
/// [`Error::AccessDenied`](crate::Error::AccessDenied).
pub trait DocumentSource: Send + Sync {
    /// Body blocks of a document.
    fn blocks(&self, id: &str) -> Result<Vec<Block>>;

    /// Title of a document.
    fn title(&self, id: &str) -> Result<String>;

    /// Title and blocks together.
    fn document(&self, id: &str) -> Result<SourceDocument> {
        Ok(SourceDocument {
            title: self.title(id)?,
            blocks: self.blocks(id)?,
        })
    }
}

/// A listed document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentEntry {
    /// Document id
    pub id: String,

    /// Display name
    pub name: String,
}

impl DocumentEntry {
    /// Create a listing entry.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Enumerates the documents of a folder.
pub trait ListingSource: Send + Sync {
    /// Documents of a folder, sorted by descending title.
    fn list_documents(&self, folder_id: &str) -> Result<Vec<DocumentEntry>>;

    /// Ids of the documents of a folder, in listing order.
    fn list_document_ids(&self, folder_id: &str) -> Result<Vec<String>> {
        Ok(self
            .list_documents(folder_id)?
            .into_iter()
            .map(|entry| entry.id)
            .collect())
    }

    /// Whether a document belongs to a folder.
    fn contains(&self, folder_id: &str, id: &str) -> Result<bool> {
        Ok(self
            .list_documents(folder_id)?
            .iter()
            .any(|entry| entry.id == id))
    }
}

/// Compare titles for listing order: compatibility-normalized and
/// case-folded, ties broken by the raw title.
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    let key_a: String = a.nfkc().flat_map(char::to_lowercase).collect();
    let key_b: String = b.nfkc().flat_map(char::to_lowercase).collect();
    key_a.cmp(&key_b).then_with(|| a.cmp(b))
}

/// Sort entries by descending title; equal titles keep id order.
pub fn sort_by_title_desc(entries: &mut [DocumentEntry]) {
    entries.sort_by(|a, b| compare_titles(&b.name, &a.name).then_with(|| a.id.cmp(&b.id)));
}
