//! In-memory cache and property store.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;

use super::{check_size, CacheTier, DurableStore, Entry, CACHE_VALUE_LIMIT, PROPERTY_VALUE_LIMIT};
use crate::error::{Error, Result};

/// A key-value store held in memory.
///
/// Implements both [`CacheTier`] and [`DurableStore`]; the value ceiling
/// decides which role it is sized for.
#[derive(Debug)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, Entry>>,
    value_limit: usize,
}

impl MemoryStore {
    /// Create a store with the given per-value ceiling in bytes.
    pub fn new(value_limit: usize) -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
            value_limit,
        }
    }

    /// A store sized like the script cache.
    pub fn cache() -> Self {
        Self::new(CACHE_VALUE_LIMIT)
    }

    /// A store sized like the property service.
    pub fn properties() -> Self {
        Self::new(PROPERTY_VALUE_LIMIT)
    }

    /// Keys currently held, live or not, in sorted order.
    pub fn keys(&self) -> Vec<String> {
        self.lock()
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of entries held.
    pub fn len(&self) -> usize {
        self.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, Entry>>> {
        self.entries
            .lock()
            .map_err(|_| Error::Other("memory store lock poisoned".to_string()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::cache()
    }
}

impl CacheTier for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let now = Utc::now();
        let entries = self.lock()?;
        Ok(entries
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value.clone()))
    }

    fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        check_size(key, value, self.value_limit)?;
        let now = Utc::now();
        let mut entries = self.lock()?;
        entries.retain(|_, entry| entry.is_live(now));
        entries.insert(key.to_string(), Entry::expiring(value, ttl, now));
        Ok(())
    }

    fn remove_all(&self, keys: &[String]) -> Result<()> {
        let mut entries = self.lock()?;
        for key in keys {
            entries.remove(key);
        }
        Ok(())
    }
}

impl DurableStore for MemoryStore {
    fn get_property(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).map(|entry| entry.value.clone()))
    }

    fn set_property(&self, key: &str, value: &str) -> Result<()> {
        check_size(key, value, self.value_limit)?;
        self.lock()?.insert(key.to_string(), Entry::durable(value));
        Ok(())
    }

    fn delete_property(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_roundtrip() {
        let cache = MemoryStore::cache();
        cache.put("a", "1", Duration::from_secs(60)).unwrap();
        cache.put("b", "2", Duration::from_secs(60)).unwrap();

        assert_eq!(cache.get("a").unwrap(), Some("1".to_string()));
        let all = cache
            .get_all(&["a".to_string(), "b".to_string(), "c".to_string()])
            .unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all["b"], "2");

        cache.remove_all(&["a".to_string()]).unwrap();
        assert_eq!(cache.get("a").unwrap(), None);
    }

    #[test]
    fn test_expired_entries_are_invisible() {
        let cache = MemoryStore::cache();
        cache.put("gone", "v", Duration::ZERO).unwrap();
        assert_eq!(cache.get("gone").unwrap(), None);
    }

    #[test]
    fn test_put_prunes_expired_entries() {
        let cache = MemoryStore::cache();
        cache.put("gone", "v", Duration::ZERO).unwrap();
        cache.put("kept", "v", Duration::from_secs(60)).unwrap();
        assert_eq!(cache.keys(), vec!["kept"]);
    }

    #[test]
    fn test_oversized_values_are_refused() {
        let store = MemoryStore::new(4);
        assert!(store.set_property("k", "12345").is_err());
        assert!(store.put("k", "12345", Duration::from_secs(1)).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_properties() {
        let store = MemoryStore::properties();
        store.set_property("RSS_DATA", "[]").unwrap();
        assert_eq!(store.get_property("RSS_DATA").unwrap(), Some("[]".to_string()));
        store.delete_property("RSS_DATA").unwrap();
        store.delete_property("missing").unwrap();
        assert_eq!(store.get_property("RSS_DATA").unwrap(), None);
    }
}
