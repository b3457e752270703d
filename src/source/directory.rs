//! Directory-backed document and listing source.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::{sort_by_title_desc, DocumentEntry, DocumentSource, ListingSource, SourceDocument};
use crate::error::{Error, Result};
use crate::model::Block;

const DOCUMENT_EXTENSION: &str = "json";

/// Documents stored as JSON files, grouped into folders by directory.
///
/// Layout: `<root>/<folder_id>/<document_id>.json`, each file holding a
/// serialized [`SourceDocument`]. Documents are opened by id regardless of
/// folder, as a document service would; folder membership is only checked
/// through [`ListingSource`].
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    /// Create a source rooted at `root`.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write a document into a folder, creating the folder if needed.
    pub fn store(&self, folder_id: &str, id: &str, document: &SourceDocument) -> Result<PathBuf> {
        validate_name(folder_id)?;
        validate_name(id)?;
        let dir = self.root.join(folder_id);
        fs::create_dir_all(&dir)?;
        let path = dir.join(format!("{}.{}", id, DOCUMENT_EXTENSION));
        fs::write(&path, serde_json::to_string_pretty(document)?)?;
        Ok(path)
    }

    /// Find the file of a document in any folder.
    fn locate(&self, id: &str) -> Result<PathBuf> {
        validate_name(id)?;
        let file_name = format!("{}.{}", id, DOCUMENT_EXTENSION);

        let direct = self.root.join(&file_name);
        if direct.is_file() {
            return Ok(direct);
        }

        let entries = fs::read_dir(&self.root).map_err(|e| map_io(e, &self.root))?;
        for entry in entries {
            let entry = entry.map_err(|e| map_io(e, &self.root))?;
            let candidate = entry.path().join(&file_name);
            if candidate.is_file() {
                return Ok(candidate);
            }
        }

        Err(Error::NotFound(id.to_string()))
    }

    fn load(&self, id: &str) -> Result<SourceDocument> {
        let path = self.locate(id)?;
        let text = fs::read_to_string(&path).map_err(|e| map_io(e, &path))?;
        serde_json::from_str(&text)
            .map_err(|e| Error::SourceAccess(format!("{}: {}", path.display(), e)))
    }
}

impl DocumentSource for DirectorySource {
    fn blocks(&self, id: &str) -> Result<Vec<Block>> {
        Ok(self.load(id)?.blocks)
    }

    fn title(&self, id: &str) -> Result<String> {
        Ok(self.load(id)?.title)
    }

    fn document(&self, id: &str) -> Result<SourceDocument> {
        self.load(id)
    }
}

impl ListingSource for DirectorySource {
    fn list_documents(&self, folder_id: &str) -> Result<Vec<DocumentEntry>> {
        validate_name(folder_id)?;
        let dir = self.root.join(folder_id);
        let entries = fs::read_dir(&dir).map_err(|e| map_io(e, &dir))?;

        let mut documents = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| map_io(e, &dir))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(DOCUMENT_EXTENSION) {
                continue;
            }
            let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let name = match fs::read_to_string(&path)
                .ok()
                .and_then(|text| serde_json::from_str::<SourceDocument>(&text).ok())
            {
                Some(doc) if !doc.title.is_empty() => doc.title,
                _ => {
                    log::debug!("Using file name as title for {}", path.display());
                    id.to_string()
                }
            };
            documents.push(DocumentEntry::new(id, name));
        }

        sort_by_title_desc(&mut documents);
        log::debug!("Listed {} documents in folder '{}'", documents.len(), folder_id);
        Ok(documents)
    }

    fn contains(&self, folder_id: &str, id: &str) -> Result<bool> {
        validate_name(folder_id)?;
        if validate_name(id).is_err() {
            return Ok(false);
        }
        let path = self
            .root
            .join(folder_id)
            .join(format!("{}.{}", id, DOCUMENT_EXTENSION));
        Ok(path.is_file())
    }
}

/// Reject names that could escape the root directory.
fn validate_name(name: &str) -> Result<()> {
    let bad = name.is_empty()
        || name.starts_with('.')
        || name.contains(['/', '\\', '\0'])
        || name.contains("..");
    if bad {
        return Err(Error::NotFound(name.to_string()));
    }
    Ok(())
}

fn map_io(err: io::Error, path: &Path) -> Error {
    match err.kind() {
        io::ErrorKind::NotFound => Error::NotFound(path.display().to_string()),
        io::ErrorKind::PermissionDenied => Error::AccessDenied(path.display().to_string()),
        _ => Error::SourceAccess(format!("{}: {}", path.display(), err)),
    }
}
