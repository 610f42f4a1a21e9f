// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JSON-file-backed store.
//!
//! The whole map is rewritten on every change through a temp file and a
//! rename, so a crash never leaves a half-written session behind. Separate
//! processes sharing one file are not coordinated.

use super::KeyValueStore;
use crate::error::AppError;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Key-value store persisted as a flat JSON object.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>, AppError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(AppError::Storage(format!(
                    "failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        if text.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        match serde_json::from_str(&text) {
            Ok(map) => Ok(map),
            Err(e) => {
                // A corrupt file behaves like empty storage: the session
                // store then asks for a fresh login.
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Session file is not a JSON object, ignoring"
                );
                Ok(BTreeMap::new())
            }
        }
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::Storage(format!("failed to create {}: {}", parent.display(), e))
            })?;
        }

        let body = serde_json::to_string_pretty(map)
            .map_err(|e| AppError::Storage(format!("failed to encode session: {}", e)))?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body)
            .map_err(|e| AppError::Storage(format!("failed to write {}: {}", tmp.display(), e)))?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            AppError::Storage(format!("failed to replace {}: {}", self.path.display(), e))
        })
    }

    fn modify<F>(&self, f: F) -> Result<(), AppError>
    where
        F: FnOnce(&mut BTreeMap<String, String>) -> bool,
    {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| AppError::Storage("file store lock poisoned".to_string()))?;
        let mut map = self.read_map()?;
        if f(&mut map) {
            self.write_map(&map)?;
        }
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.read_map()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.modify(|map| {
            map.insert(key.to_string(), value.to_string());
            true
        })
    }

    fn remove(&self, key: &str) -> Result<(), AppError> {
        self.modify(|map| map.remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("point-rewards-{}-{}", name, std::process::id()))
            .join("session.json")
    }

    #[test]
    fn test_set_get_remove_persists_across_instances() {
        let path = temp_path("file-store");
        let _ = fs::remove_file(&path);

        let store = FileStore::new(&path);
        assert_eq!(store.get("admin_token").unwrap(), None);

        store.set("admin_token", "abc").unwrap();
        store.set("admin_user", "{}").unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get("admin_token").unwrap().as_deref(), Some("abc"));

        reopened.remove("admin_token").unwrap();
        assert_eq!(store.get("admin_token").unwrap(), None);
        assert_eq!(store.get("admin_user").unwrap().as_deref(), Some("{}"));

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_corrupt_file_reads_as_empty() {
        let path = temp_path("corrupt-store");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "not json").unwrap();

        let store = FileStore::new(&path);
        assert_eq!(store.get("anything").unwrap(), None);
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
