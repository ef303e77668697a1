//! Browser LocalStorage store

use web_sys::Storage;

use super::kv::{Completion, KeyValueStore};
use crate::error::StoreError;

/// Key-value store over `window.localStorage`
///
/// LocalStorage itself is synchronous; completions are deferred to the
/// microtask queue so callers see the same ordering as any async store.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorageStore;

fn storage() -> Result<Storage, StoreError> {
    web_sys::window()
        .ok_or(StoreError::Unavailable)?
        .local_storage()
        .map_err(|e| StoreError::Browser(format!("{:?}", e)))?
        .ok_or(StoreError::Unavailable)
}

fn browser_error(e: wasm_bindgen::JsValue) -> StoreError {
    StoreError::Browser(format!("{:?}", e))
}

impl KeyValueStore for LocalStorageStore {
    fn get_item(&self, key: &str, done: Completion<Option<String>>) {
        let key = key.to_string();
        wasm_bindgen_futures::spawn_local(async move {
            done(storage().and_then(|s| s.get_item(&key).map_err(browser_error)));
        });
    }

    fn set_item(&self, key: &str, value: String, done: Completion<()>) {
        let key = key.to_string();
        wasm_bindgen_futures::spawn_local(async move {
            done(storage().and_then(|s| s.set_item(&key, &value).map_err(browser_error)));
        });
    }

    fn remove_item(&self, key: &str, done: Completion<()>) {
        let key = key.to_string();
        wasm_bindgen_futures::spawn_local(async move {
            done(storage().and_then(|s| s.remove_item(&key).map_err(browser_error)));
        });
    }
}
