//! Bucket index maintenance in the durable store.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::store::DurableStore;

use super::packer::Bucket;

/// Default key of the bucket index; also the default bucket key prefix.
pub const DEFAULT_INDEX_KEY: &str = "RSS_DATA";

/// Ordered list of bucket storage keys.
///
/// The index is the only record of which buckets are live. It is stored as
/// a JSON array of strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BucketIndex {
    /// Bucket keys in feed order
    pub keys: Vec<String>,
}

impl BucketIndex {
    /// Create an index from keys.
    pub fn new(keys: Vec<String>) -> Self {
        Self { keys }
    }

    /// Number of live buckets.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Check if no buckets are live.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Storage key naming for the index and its buckets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexLayout {
    /// Key holding the index itself
    pub index_key: String,

    /// Prefix of bucket keys
    pub bucket_prefix: String,
}

impl IndexLayout {
    /// Create a layout.
    pub fn new(index_key: impl Into<String>, bucket_prefix: impl Into<String>) -> Self {
        Self {
            index_key: index_key.into(),
            bucket_prefix: bucket_prefix.into(),
        }
    }

    /// Key of the bucket at zero-based `position`.
    pub fn bucket_key(&self, position: usize) -> String {
        bucket_key(&self.bucket_prefix, position)
    }
}

impl Default for IndexLayout {
    fn default() -> Self {
        Self::new(DEFAULT_INDEX_KEY, DEFAULT_INDEX_KEY)
    }
}

/// Key of the bucket at zero-based `position`: `RSS_DATA001`, `RSS_DATA002`, ...
pub fn bucket_key(prefix: &str, position: usize) -> String {
    format!("{}{:03}", prefix, position + 1)
}

/// Read the index. A missing, unreadable or malformed index reads as empty.
pub fn read_index(store: &dyn DurableStore, index_key: &str) -> BucketIndex {
    let raw = match store.get_property(index_key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return BucketIndex::default(),
        Err(e) => {
            log::warn!("Failed to read bucket index '{}': {}", index_key, e);
            return BucketIndex::default();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(index) => index,
        Err(e) => {
            log::warn!("Ignoring malformed bucket index '{}': {}", index_key, e);
            BucketIndex::default()
        }
    }
}

/// Replace the stored buckets with `buckets` and rewrite the index.
///
/// Keys listed by the previous index are deleted first (never the index key
/// itself). A bucket whose write fails is logged and left out of the new
/// index, so the index only ever names keys that were written. Only the
/// final index write is reported as an error.
pub fn commit_buckets(
    store: &dyn DurableStore,
    layout: &IndexLayout,
    buckets: &[Bucket],
) -> Result<BucketIndex> {
    let previous = read_index(store, &layout.index_key);
    for key in previous.keys.iter().filter(|k| **k != layout.index_key) {
        if let Err(e) = store.delete_property(key) {
            log::warn!("Failed to delete stale bucket '{}': {}", key, e);
        }
    }

    let mut written = Vec::with_capacity(buckets.len());
    for (position, bucket) in buckets.iter().enumerate() {
        let key = layout.bucket_key(position);
        let stored = bucket
            .to_json()
            .and_then(|json| store.set_property(&key, &json));
        match stored {
            Ok(()) => written.push(key),
            Err(e) => log::warn!("Failed to store bucket '{}': {}", key, e),
        }
    }

    let index = BucketIndex::new(written);
    store.set_property(&layout.index_key, &serde_json::to_string(&index)?)?;
    log::debug!(
        "Committed {} buckets under '{}'",
        index.len(),
        layout.index_key
    );
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::packer::{pack, PackOptions};
    use crate::model::FeedItem;
    use crate::store::MemoryStore;

    fn items(count: usize, content_len: usize) -> Vec<FeedItem> {
        (0..count)
            .map(|i| FeedItem {
                id: format!("doc{}", i),
                title: format!("Title {}", i),
                url: format!("https://example.com/{}", i),
                content: "x".repeat(content_len),
            })
            .collect()
    }

    #[test]
    fn test_bucket_key() {
        assert_eq!(bucket_key("RSS_DATA", 0), "RSS_DATA001");
        assert_eq!(bucket_key("RSS_DATA", 41), "RSS_DATA042");
        assert_eq!(bucket_key("P", 999), "P1000");
    }

    #[test]
    fn test_read_index_defaults() {
        let store = MemoryStore::properties();
        assert!(read_index(&store, "RSS_DATA").is_empty());

        store.set_property("RSS_DATA", "not json").unwrap();
        assert!(read_index(&store, "RSS_DATA").is_empty());

        store.set_property("RSS_DATA", r#"["RSS_DATA001"]"#).unwrap();
        assert_eq!(read_index(&store, "RSS_DATA").keys, vec!["RSS_DATA001"]);
    }

    #[test]
    fn test_commit_writes_index_and_buckets() {
        let store = MemoryStore::properties();
        let outcome = pack(items(5, 3000), &PackOptions::default());
        let index = commit_buckets(&store, &IndexLayout::default(), &outcome.buckets).unwrap();

        assert_eq!(index.len(), outcome.buckets.len());
        assert_eq!(index.keys[0], "RSS_DATA001");
        let stored = store.get_property("RSS_DATA").unwrap().unwrap();
        assert_eq!(stored, serde_json::to_string(&index.keys).unwrap());
        for key in &index.keys {
            assert!(store.get_property(key).unwrap().is_some());
        }
    }

    #[test]
    fn test_double_commit_leaves_only_latest_keys() {
        let store = MemoryStore::properties();
        let layout = IndexLayout::default();

        let first = pack(items(6, 3000), &PackOptions::default());
        commit_buckets(&store, &layout, &first.buckets).unwrap();
        assert!(first.buckets.len() > 1);

        let second = pack(items(1, 10), &PackOptions::default());
        let index = commit_buckets(&store, &layout, &second.buckets).unwrap();

        assert_eq!(index.keys, vec!["RSS_DATA001"]);
        let mut keys = store.keys();
        keys.sort();
        assert_eq!(keys, vec!["RSS_DATA", "RSS_DATA001"]);
    }

    #[test]
    fn test_failed_bucket_write_is_left_out() {
        // A store too small for any bucket but large enough for the index.
        let store = MemoryStore::new(64);
        let outcome = pack(items(1, 200), &PackOptions::default());
        let index = commit_buckets(&store, &IndexLayout::default(), &outcome.buckets).unwrap();

        assert!(index.is_empty());
        assert_eq!(store.get_property("RSS_DATA").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_index_key_is_never_deleted() {
        let store = MemoryStore::properties();
        store
            .set_property("RSS_DATA", r#"["RSS_DATA","RSS_DATA001"]"#)
            .unwrap();
        store.set_property("RSS_DATA001", "[]").unwrap();

        commit_buckets(&store, &IndexLayout::default(), &[]).unwrap();
        assert_eq!(store.get_property("RSS_DATA").unwrap().as_deref(), Some("[]"));
        assert_eq!(store.get_property("RSS_DATA001").unwrap(), None);
    }
}
