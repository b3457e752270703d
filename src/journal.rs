//! Bounded operation journal.
//!
//! Long-running maintenance operations (pre-caching, repacking) leave a
//! human-readable trail that can be inspected later. The journal keeps at
//! most `capacity` bytes, measured like every other stored value, dropping
//! the oldest text first. It can mirror itself into a [`DurableStore`] key
//! after each entry.
//!
//! Recording never fails: storage errors are logged and otherwise ignored.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local};

use crate::feed::byte_len;
use crate::store::DurableStore;

/// Default journal capacity in bytes; fits one durable property.
pub const DEFAULT_CAPACITY: usize = 9_000;

/// Default durable store key of the journal.
pub const DEFAULT_JOURNAL_KEY: &str = "DEBUG_LOGS";

const TIMESTAMP_FORMAT: &str = "%m/%d %H:%M:%S";

/// A size-bounded, timestamped text log.
pub struct Journal {
    buffer: Mutex<String>,
    capacity: usize,
    sink: Option<(Arc<dyn DurableStore>, String)>,
}

impl Journal {
    /// Create an in-memory journal holding at most `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: Mutex::new(String::new()),
            capacity,
            sink: None,
        }
    }

    /// Mirror the journal into `store` under `key`.
    ///
    /// Existing contents of the key are loaded so that entries accumulate
    /// across runs.
    pub fn persisted(mut self, store: Arc<dyn DurableStore>, key: impl Into<String>) -> Self {
        let key = key.into();
        match store.get_property(&key) {
            Ok(Some(existing)) => {
                if let Ok(mut buffer) = self.buffer.lock() {
                    *buffer = existing;
                    keep_tail(&mut buffer, self.capacity);
                }
            }
            Ok(None) => {}
            Err(e) => log::debug!("Journal '{}' could not be loaded: {}", key, e),
        }
        self.sink = Some((store, key));
        self
    }

    /// Maximum number of bytes kept.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append a timestamped entry.
    pub fn record(&self, message: &str) {
        self.record_at(Local::now(), message);
    }

    /// Append an entry stamped with `at`.
    pub fn record_at(&self, at: DateTime<Local>, message: &str) {
        let line = format!("[{}] {}\n", at.format(TIMESTAMP_FORMAT), message);
        let snapshot = match self.buffer.lock() {
            Ok(mut buffer) => {
                buffer.push_str(&line);
                keep_tail(&mut buffer, self.capacity);
                buffer.clone()
            }
            Err(_) => return,
        };
        self.persist(Some(&snapshot));
    }

    /// Remove all entries, including the persisted copy.
    pub fn clear(&self) {
        if let Ok(mut buffer) = self.buffer.lock() {
            buffer.clear();
        }
        self.persist(None);
    }

    /// Current journal text, oldest entry first.
    pub fn contents(&self) -> String {
        self.buffer
            .lock()
            .map(|buffer| buffer.clone())
            .unwrap_or_default()
    }

    fn persist(&self, snapshot: Option<&str>) {
        let Some((store, key)) = &self.sink else {
            return;
        };
        let result = match snapshot {
            Some(text) => store.set_property(key, text),
            None => store.delete_property(key),
        };
        if let Err(e) = result {
            log::debug!("Journal '{}' not persisted: {}", key, e);
        }
    }
}

impl Default for Journal {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl std::fmt::Debug for Journal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Journal")
            .field("capacity", &self.capacity)
            .field("key", &self.sink.as_ref().map(|(_, key)| key))
            .finish()
    }
}

/// Drop leading characters until the text measures at most `capacity` bytes.
fn keep_tail(buffer: &mut String, capacity: usize) {
    let mut excess = byte_len(buffer).saturating_sub(capacity);
    if excess == 0 {
        return;
    }
    let mut cut = buffer.len();
    for (i, c) in buffer.char_indices() {
        if excess == 0 {
            cut = i;
            break;
        }
        excess = excess.saturating_sub(byte_len(c.encode_utf8(&mut [0; 4])));
    }
    buffer.drain(..cut);
}
