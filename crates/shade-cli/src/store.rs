//! A preference store backed by a JSON file.

use serde_json::{Map, Value};
use shade::{PreferenceStore, StorageError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Keeps preferences in a JSON object, e.g. `{"theme": "dark"}`.
///
/// A missing or empty file reads as an empty store. The file is rewritten
/// in full on every change, preserving keys it does not touch whatever their
/// type. A non-string value under a requested key is a read error.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self, key: &str) -> Result<Map<String, Value>, StorageError> {
        let read_error = |reason: String| StorageError::Read {
            key: key.to_string(),
            reason,
        };
        match fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(Map::new()),
            Ok(text) => serde_json::from_str(&text).map_err(|err| read_error(err.to_string())),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Map::new()),
            Err(err) => Err(read_error(err.to_string())),
        }
    }

    fn write_entries(
        &self,
        key: &str,
        entries: &Map<String, Value>,
    ) -> Result<(), StorageError> {
        let write_error = |reason: String| StorageError::Write {
            key: key.to_string(),
            reason,
        };
        let mut text =
            serde_json::to_string_pretty(entries).map_err(|err| write_error(err.to_string()))?;
        text.push('\n');
        fs::write(&self.path, text).map_err(|err| write_error(err.to_string()))
    }
}

impl PreferenceStore for JsonFileStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self.read_entries(key)?.remove(key) {
            None => Ok(None),
            Some(Value::String(value)) => Ok(Some(value)),
            Some(other) => Err(StorageError::Read {
                key: key.to_string(),
                reason: format!("expected a string, found {other}"),
            }),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.read_entries(key)?;
        entries.insert(key.to_string(), Value::String(value.to_string()));
        self.write_entries(key, &entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.read_entries(key)?;
        if entries.remove(key).is_some() {
            self.write_entries(key, &entries)?;
        }
        Ok(())
    }
}
