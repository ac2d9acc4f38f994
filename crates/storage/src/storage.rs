use serde::{Serialize, de::DeserializeOwned};

use crate::{PersistedRecord, Result, StorageError};

/// Core trait for durable state storage.
///
/// A storage maps string keys to serialized documents. Implementations are
/// synchronous: state containers persist as part of every mutation and must
/// not suspend.
pub trait StateStorage: Send + Sync {
    /// Reads the raw document stored under `key`.
    ///
    /// Returns None if nothing has been stored under the key.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous document.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Removes the document stored under `key`. Removing a missing key is not an error.
    fn remove_item(&self, key: &str) -> Result<()>;
}

/// Extension trait providing typed access to persisted records.
pub trait StateStorageExt: StateStorage {
    /// Loads and deserializes the record stored under `key`.
    fn load_record<T: DeserializeOwned>(&self, key: &str) -> Result<Option<PersistedRecord<T>>> {
        match self.get_item(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Serializes and stores a record under `key`.
    fn save_record<T: Serialize>(&self, key: &str, record: &PersistedRecord<T>) -> Result<()> {
        let raw = serde_json::to_string(record)?;
        self.set_item(key, &raw)
    }
}

impl<T: StateStorage + ?Sized> StateStorageExt for T {}

/// Validates a record key.
///
/// Keys must be non-empty, start with an alphanumeric character, and contain
/// only ASCII alphanumerics, `-`, `_` and `.`, so that every backend can use
/// them as a file name.
pub fn validate_key(key: &str) -> Result<()> {
    let mut chars = key.chars();
    let valid_first = chars.next().is_some_and(|c| c.is_ascii_alphanumeric());
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));

    if valid_first && valid_rest {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}
