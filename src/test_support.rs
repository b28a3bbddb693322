use spin_sdk::http::{Method, Request, Response};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::config::RuntimeEnv;
use crate::store::{KeyValueStore, StoreError};

pub(crate) const TEST_ADMIN_KEY: &str = "test-admin-key";
pub(crate) const TEST_NONCE_SECRET: &str = "test-nonce-secret";
pub(crate) const TEST_NOW: u64 = 1_760_000_000;

#[derive(Default)]
pub(crate) struct InMemoryStore {
    map: Mutex<HashMap<String, Vec<u8>>>,
}

impl InMemoryStore {
    pub(crate) fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.map
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
            .cloned()
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let map = self
            .map
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(map.get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let mut map = self
            .map
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        map.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut map = self
            .map
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        map.remove(key);
        Ok(())
    }
}

/// A store whose every call fails.
pub(crate) struct BrokenStore;

impl KeyValueStore for BrokenStore {
    fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Err(StoreError::Unavailable)
    }

    fn set(&self, key: &str, _value: &[u8]) -> Result<(), StoreError> {
        Err(StoreError::WriteFailed(key.to_string()))
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        Err(StoreError::DeleteFailed(key.to_string()))
    }
}

pub(crate) fn test_env() -> RuntimeEnv {
    RuntimeEnv {
        admin_api_key: Some(TEST_ADMIN_KEY.to_string()),
        nonce_secret: Some(TEST_NONCE_SECRET.to_string()),
        ..RuntimeEnv::default()
    }
}

pub(crate) fn request_with_headers(path: &str, headers: &[(&str, &str)]) -> Request {
    request_with_method_and_headers(Method::Get, path, headers)
}

pub(crate) fn request_with_method_and_headers(
    method: Method,
    path: &str,
    headers: &[(&str, &str)],
) -> Request {
    let mut builder = Request::builder();
    builder.method(method).uri(path);
    for (key, value) in headers {
        builder.header(*key, *value);
    }
    builder.build()
}

pub(crate) fn request_with_body(path: &str, headers: &[(&str, &str)], body: &[u8]) -> Request {
    let mut builder = Request::builder();
    builder.method(Method::Post).uri(path);
    for (key, value) in headers {
        builder.header(*key, *value);
    }
    builder.body(body.to_vec());
    builder.build()
}

pub(crate) fn header_value(resp: &Response, name: &str) -> Option<String> {
    resp.headers()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .and_then(|(_, value)| value.as_str().map(str::to_string))
}

pub(crate) fn body_text(resp: &Response) -> String {
    String::from_utf8_lossy(resp.body()).to_string()
}
