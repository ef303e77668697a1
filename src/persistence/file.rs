//! File-backed store for native builds

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use super::kv::{Completion, KeyValueStore};
use crate::error::StoreError;

/// Stores each key as `<dir>/<key>.json`
///
/// Operations complete before the call returns.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str, done: Completion<Option<String>>) {
        let result = match fs::read_to_string(self.path_for(key)) {
            Ok(json) => Ok(Some(json)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(e)),
        };
        done(result);
    }

    fn set_item(&self, key: &str, value: String, done: Completion<()>) {
        let result = fs::create_dir_all(&self.dir)
            .and_then(|_| fs::write(self.path_for(key), value))
            .map_err(StoreError::from);
        done(result);
    }

    fn remove_item(&self, key: &str, done: Completion<()>) {
        let result = match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io(e)),
        };
        done(result);
    }
}
