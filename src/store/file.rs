//! JSON-file-backed cache and property store.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;

use super::{check_size, CacheTier, DurableStore, Entry, CACHE_VALUE_LIMIT};
use crate::error::{Error, Result};

/// A key-value store persisted as one JSON object.
///
/// The whole map is loaded on open and rewritten after every mutation,
/// which suits the small stores the archive keeps. Expired cache entries are
/// dropped on the next write.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, Entry>>,
    value_limit: usize,
}

impl FileStore {
    /// Open a store, starting empty if the file does not exist yet.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => serde_json::from_str(&text)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        log::debug!("Opened store {} with {} entries", path.display(), entries.len());

        Ok(Self {
            path,
            entries: Mutex::new(entries),
            value_limit: CACHE_VALUE_LIMIT,
        })
    }

    /// Set the per-value ceiling in bytes.
    pub fn with_value_limit(mut self, limit: usize) -> Self {
        self.value_limit = limit;
        self
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, Entry>>> {
        self.entries
            .lock()
            .map_err(|_| Error::Other("file store lock poisoned".to_string()))
    }

    fn save(&self, entries: &BTreeMap<String, Entry>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    /// Apply a change to a copy of the map and keep it only once it is on disk.
    fn mutate<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut BTreeMap<String, Entry>),
    {
        let mut entries = self.lock()?;
        let mut next = entries.clone();
        f(&mut next);

        let now = Utc::now();
        next.retain(|_, entry| entry.is_live(now));
        self.save(&next)?;
        *entries = next;
        Ok(())
    }
}

impl CacheTier for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let now = Utc::now();
        Ok(self
            .lock()?
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value.clone()))
    }

    fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        check_size(key, value, self.value_limit)?;
        let entry = Entry::expiring(value, ttl, Utc::now());
        self.mutate(|entries| {
            entries.insert(key.to_string(), entry);
        })
    }

    fn remove_all(&self, keys: &[String]) -> Result<()> {
        self.mutate(|entries| {
            for key in keys {
                entries.remove(key);
            }
        })
    }
}

impl DurableStore for FileStore {
    fn get_property(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).map(|entry| entry.value.clone()))
    }

    fn set_property(&self, key: &str, value: &str) -> Result<()> {
        check_size(key, value, self.value_limit)?;
        self.mutate(|entries| {
            entries.insert(key.to_string(), Entry::durable(value));
        })
    }

    fn delete_property(&self, key: &str) -> Result<()> {
        self.mutate(|entries| {
            entries.remove(key);
        })
    }
}
