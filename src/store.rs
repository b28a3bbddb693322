// src/store.rs
// Key-value storage seam. The Spin store in production, an in-memory map in tests.

use spin_sdk::key_value::Store;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("key-value store unavailable")]
    Unavailable,
    #[error("key-value store write failed for {0}")]
    WriteFailed(String),
    #[error("key-value store delete failed for {0}")]
    DeleteFailed(String),
}

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;
    fn set(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;
    fn delete(&self, key: &str) -> Result<(), StoreError>;
}

impl KeyValueStore for Store {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Store::get(self, key).map_err(|_| StoreError::Unavailable)
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        Store::set(self, key, value).map_err(|_| StoreError::WriteFailed(key.to_string()))
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        Store::delete(self, key).map_err(|_| StoreError::DeleteFailed(key.to_string()))
    }
}

/// Stand-in used when the default store cannot be opened. Reads and writes all fail.
pub struct UnavailableStore;

impl KeyValueStore for UnavailableStore {
    fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Err(StoreError::Unavailable)
    }

    fn set(&self, _key: &str, _value: &[u8]) -> Result<(), StoreError> {
        Err(StoreError::Unavailable)
    }

    fn delete(&self, _key: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable)
    }
}

/// Opens the component's default store, or the stand-in when the host has none.
pub fn open_default_store() -> Box<dyn KeyValueStore> {
    match Store::open_default() {
        Ok(store) => Box::new(store),
        Err(err) => {
            tracing::warn!(error = ?err, "default key-value store unavailable");
            Box::new(UnavailableStore)
        }
    }
}
