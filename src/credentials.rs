//! Durable store for the single Google API key.
//!
//! The key lives under a fixed field of a whole-file JSON document. Absence
//! or corruption of the file reads as "no credential" rather than an error;
//! writes go through an internal mutex so concurrent saves cannot
//! interleave.
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::{json, Value};

use crate::error::AppResult;

const API_KEY_FIELD: &str = "google_api_key";

pub struct CredentialStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl CredentialStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        CredentialStore { path: path.as_ref().to_path_buf(), write_lock: Mutex::new(()) }
    }

    /// Read the stored API key. Missing file, unreadable file, corrupt JSON,
    /// and a missing field all yield `None`.
    pub fn load(&self) -> Option<String> {
        let raw = fs::read_to_string(&self.path).ok()?;
        let doc: Value = serde_json::from_str(&raw).ok()?;
        doc.get(API_KEY_FIELD)
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(String::from)
    }

    /// Overwrite the stored API key, preserving any other fields in the
    /// document. The file is fsynced before this returns.
    pub fn save(&self, api_key: &str) -> AppResult<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

        let mut doc = fs::read_to_string(&self.path)
            .ok()
            .and_then(|raw| serde_json::from_str::<Value>(&raw).ok())
            .filter(Value::is_object)
            .unwrap_or_else(|| json!({}));
        doc[API_KEY_FIELD] = Value::String(api_key.to_string());

        let mut file = File::create(&self.path)?;
        file.write_all(serde_json::to_string_pretty(&doc)?.as_bytes())?;
        file.sync_all()?;
        tracing::debug!("Persisted API key to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_reads_as_none() {
        let dir = tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("Comflyapi.json"));
        assert_eq!(store.load(), None);
    }

    #[test]
    fn corrupt_file_reads_as_none() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Comflyapi.json");
        fs::write(&path, "not json {{{").unwrap();
        let store = CredentialStore::new(&path);
        assert_eq!(store.load(), None);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("Comflyapi.json"));
        store.save("AIza-test-key").unwrap();
        assert_eq!(store.load(), Some("AIza-test-key".to_string()));
    }

    #[test]
    fn repeated_save_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("Comflyapi.json"));
        store.save("AIza-test-key").unwrap();
        let first = fs::read_to_string(dir.path().join("Comflyapi.json")).unwrap();
        store.save("AIza-test-key").unwrap();
        let second = fs::read_to_string(dir.path().join("Comflyapi.json")).unwrap();
        assert_eq!(first, second);
        assert_eq!(store.load(), Some("AIza-test-key".to_string()));
    }

    #[test]
    fn save_preserves_other_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Comflyapi.json");
        fs::write(&path, r#"{"other_setting": true}"#).unwrap();
        let store = CredentialStore::new(&path);
        store.save("AIza-test-key").unwrap();

        let doc: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(doc["other_setting"], true);
        assert_eq!(doc["google_api_key"], "AIza-test-key");
    }
}
