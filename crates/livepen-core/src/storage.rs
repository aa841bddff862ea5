//! String key/value storage abstraction consumed by the reactive stores.

use std::collections::BTreeMap;
use std::sync::Mutex;

/// Errors surfaced by storage implementations.
///
/// A missing field is never an error: `get_item` returns `Ok(None)` for it.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A stored payload is not valid base64.
    #[error("invalid base64 payload")]
    InvalidBase64,
    /// A decoded payload is not valid UTF-8.
    #[error("decoded payload is not valid UTF-8")]
    InvalidUtf8,
}

/// A named slot of string state.
///
/// Any backing store may implement this: the URL fragment codecs in
/// [`crate::fragment`], [`MemoryStorage`], or a host-provided browser storage
/// bridge.
pub trait KeyValueStorage: Send + Sync {
    /// Returns the value stored under `key`, or `Ok(None)` if absent.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory [`KeyValueStorage`], used by tests and by hosts without a URL.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
