//! Cache tier and durable store collaborators.
//!
//! The archive talks to two kinds of key-value storage:
//!
//! - a [`CacheTier`]: advisory, entries expire after a TTL and values above
//!   a size ceiling are refused;
//! - a [`DurableStore`]: properties that persist until deleted, with a
//!   small per-key ceiling.
//!
//! Both traits are implemented by [`MemoryStore`] (tests, embedding) and
//! [`FileStore`] (a JSON file, used by the CLI).

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::feed::byte_len;

/// Default ceiling for one cache value (100 KB).
pub const CACHE_VALUE_LIMIT: usize = 100 * 1024;

/// Default ceiling for one durable property value (9 KB).
pub const PROPERTY_VALUE_LIMIT: usize = 9 * 1024;

/// A TTL-based cache.
pub trait CacheTier: Send + Sync {
    /// Get a live value.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Get every live value among `keys`; missing keys are absent from the map.
    fn get_all(&self, keys: &[String]) -> Result<HashMap<String, String>> {
        let mut found = HashMap::new();
        for key in keys {
            if let Some(value) = self.get(key)? {
                found.insert(key.clone(), value);
            }
        }
        Ok(found)
    }

    /// Store a value for `ttl`.
    ///
    /// Fails with [`Error::StorageOverflow`] when the value exceeds the
    /// cache's size ceiling; callers are expected to check first.
    fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// Remove values.
    fn remove_all(&self, keys: &[String]) -> Result<()>;
}

/// A persistent property store.
pub trait DurableStore: Send + Sync {
    /// Read a property.
    fn get_property(&self, key: &str) -> Result<Option<String>>;

    /// Write a property, failing with [`Error::StorageOverflow`] above the
    /// per-key ceiling.
    fn set_property(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a property. Deleting a missing key is not an error.
    fn delete_property(&self, key: &str) -> Result<()>;
}

/// A stored value and its expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Stored value
    pub value: String,

    /// Expiry instant; `None` for durable properties
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Entry {
    /// Create an entry expiring `ttl` from `now`.
    pub fn expiring(value: impl Into<String>, ttl: Duration, now: DateTime<Utc>) -> Self {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        Self {
            value: value.into(),
            expires_at: Some(now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC)),
        }
    }

    /// Create an entry that never expires.
    pub fn durable(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            expires_at: None,
        }
    }

    /// Whether the entry is still readable at `now`.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(true, |at| now < at)
    }
}

/// Reject a value larger than `limit` bytes.
pub(crate) fn check_size(key: &str, value: &str, limit: usize) -> Result<()> {
    let size = byte_len(value);
    if size > limit {
        return Err(Error::StorageOverflow {
            key: key.to_string(),
            size,
            limit,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_expiry() {
        let now = Utc::now();
        let entry = Entry::expiring("v", Duration::from_secs(60), now);
        assert!(entry.is_live(now));
        assert!(!entry.is_live(now + chrono::Duration::seconds(61)));
        assert!(Entry::durable("v").is_live(now + chrono::Duration::days(3650)));
    }

    #[test]
    fn test_check_size() {
        assert!(check_size("k", "abc", 3).is_ok());
        let err = check_size("k", "あ", 2).unwrap_err();
        assert!(matches!(err, Error::StorageOverflow { size: 3, limit: 2, .. }));
    }
}
