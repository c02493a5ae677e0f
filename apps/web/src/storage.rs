use prayer_core::{KeyValueStore, PersistenceError};
use wasm_bindgen::JsValue;
use web_sys::Storage;

/// `window.localStorage` behind the core's key-value seam.
pub struct LocalStore {
    storage: Storage,
}

impl LocalStore {
    /// `None` when the page has no localStorage (private mode, sandboxed frame).
    pub fn open() -> Option<Self> {
        web_sys::window()
            .and_then(|window| window.local_storage().ok())
            .flatten()
            .map(|storage| Self { storage })
    }
}

fn unavailable(err: &JsValue) -> PersistenceError {
    PersistenceError::Unavailable(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        self.storage.get_item(key).map_err(|e| unavailable(&e))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.storage.set_item(key, value).map_err(|e| unavailable(&e))
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistenceError> {
        self.storage.remove_item(key).map_err(|e| unavailable(&e))
    }

    fn keys(&self) -> Result<Vec<String>, PersistenceError> {
        let len = self.storage.length().map_err(|e| unavailable(&e))?;
        let mut keys = Vec::new();
        for index in 0..len {
            if let Some(key) = self.storage.key(index).map_err(|e| unavailable(&e))? {
                keys.push(key);
            }
        }
        Ok(keys)
    }
}
