//! `window.localStorage` backend.
//! Persistent across page reloads, synchronous, string values only.

use wasm_bindgen::JsValue;
use web_sys::Storage;

use chat_core::ports::StoragePort;
use chat_types::{ChatError, Result};

pub struct LocalStorage {
    storage: Storage,
}

impl LocalStorage {
    /// Open the window's `localStorage`. Fails outside a browser window or
    /// when storage access is blocked.
    pub fn open() -> Result<Self> {
        let window = web_sys::window()
            .ok_or_else(|| ChatError::Persistence("No window object".to_string()))?;

        let storage = window
            .local_storage()
            .map_err(|e| ChatError::Persistence(describe(&e)))?
            .ok_or_else(|| ChatError::Persistence("localStorage not available".to_string()))?;

        Ok(Self { storage })
    }
}

impl StoragePort for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.storage
            .get_item(key)
            .map_err(|e| ChatError::Persistence(describe(&e)))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        // throws QuotaExceededError when full
        self.storage
            .set_item(key, value)
            .map_err(|e| ChatError::Persistence(describe(&e)))
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.storage
            .remove_item(key)
            .map_err(|e| ChatError::Persistence(describe(&e)))
    }

    fn list_keys(&self, prefix: &str) -> Result<Vec<String>> {
        let len = self
            .storage
            .length()
            .map_err(|e| ChatError::Persistence(describe(&e)))?;

        let mut keys = Vec::new();
        for i in 0..len {
            if let Ok(Some(key)) = self.storage.key(i) {
                if key.starts_with(prefix) {
                    keys.push(key);
                }
            }
        }
        Ok(keys)
    }

    fn backend_name(&self) -> &str {
        "localstorage"
    }
}

/// Render a thrown JS value for an error message.
pub(crate) fn describe(value: &JsValue) -> String {
    if let Some(s) = value.as_string() {
        return s;
    }
    js_sys::JSON::stringify(value)
        .ok()
        .and_then(|s| s.as_string())
        .filter(|s| s != "{}")
        .unwrap_or_else(|| format!("{:?}", value))
}
