//! `window.localStorage` as a [`KeyValueStore`].

use fotoconvierto_core::{KeyValueStore, StorageError};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// Browser local storage handle for `save` / `restore`.
#[wasm_bindgen]
pub struct LocalStorageStore {
    storage: web_sys::Storage,
}

#[wasm_bindgen]
impl LocalStorageStore {
    /// Open `window.localStorage`.
    ///
    /// # Errors
    ///
    /// Throws when there is no window or storage is disabled.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<LocalStorageStore, JsValue> {
        let storage = web_sys::window()
            .ok_or_else(|| js_sys::Error::new("No window available"))?
            .local_storage()
            .map_err(|e| js_sys::Error::new(&describe(&e)))?
            .ok_or_else(|| js_sys::Error::new("localStorage is disabled"))?;
        Ok(Self { storage })
    }
}

impl KeyValueStore for LocalStorageStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage.get_item(key).map_err(storage_error)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage.set_item(key, value).map_err(storage_error)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.storage.remove_item(key).map_err(storage_error)
    }
}

fn storage_error(err: JsValue) -> StorageError {
    match err.dyn_ref::<web_sys::DomException>() {
        Some(dom) if dom.name() == "QuotaExceededError" => StorageError::QuotaExceeded,
        _ => StorageError::Unavailable(describe(&err)),
    }
}

fn describe(err: &JsValue) -> String {
    if let Some(dom) = err.dyn_ref::<web_sys::DomException>() {
        return format!("{}: {}", dom.name(), dom.message());
    }
    err.as_string().unwrap_or_else(|| format!("{:?}", err))
}
