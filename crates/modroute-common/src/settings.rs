//! Persisted settings holding the ordered list of enabled extensions
//!
//! The list is stored highest priority first. The resolver only ever reads it,
//! apart from clearing it after a fatal route failure.

use anyhow::{Context, anyhow};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// Dotted key of the enabled-extension list inside the settings document
pub const ENABLED_EXTENSIONS_KEY: &str = "localData.settings.modListEnabled";

/// Key-value settings store as seen by the resolver
pub trait SettingsStore: Send + Sync {
    /// Enabled extension identifiers, highest priority first
    fn enabled_extensions(&self) -> crate::Result<Vec<String>>;

    /// Replace the enabled extension list
    fn set_enabled_extensions(&self, ids: &[String]) -> crate::Result<()>;

    /// Disable every extension
    fn clear_enabled_extensions(&self) -> crate::Result<()> {
        self.set_enabled_extensions(&[])
    }
}

/// Settings store backed by a JSON document on disk
///
/// Keys are dotted paths into nested objects, so unrelated settings sharing the
/// document survive every write.
#[derive(Debug, Clone)]
pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_document(&self) -> crate::Result<Value> {
        if !self.path.exists() {
            return Ok(Value::Object(Map::new()));
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read settings: {:?}", self.path))?;
        if content.trim().is_empty() {
            return Ok(Value::Object(Map::new()));
        }
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings: {:?}", self.path))
    }

    fn save_document(&self, document: &Value) -> crate::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create settings directory")?;
        }
        let content =
            serde_json::to_string_pretty(document).context("Failed to serialize settings")?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write settings: {:?}", self.path))
    }

    /// Read an arbitrary dotted key
    pub fn get(&self, key: &str) -> crate::Result<Option<Value>> {
        let document = self.load_document()?;
        Ok(lookup(&document, key).cloned())
    }

    /// Write an arbitrary dotted key, creating intermediate objects
    pub fn set(&self, key: &str, value: Value) -> crate::Result<()> {
        let mut document = self.load_document()?;
        let mut node = &mut document;
        let mut parts = key.split('.').peekable();
        while let Some(part) = parts.next() {
            let object = node
                .as_object_mut()
                .ok_or_else(|| anyhow!("Settings key {} crosses a non-object value", key))?;
            if parts.peek().is_none() {
                object.insert(part.to_string(), value);
                break;
            }
            node = object
                .entry(part.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
        }
        self.save_document(&document)
    }
}

fn lookup<'a>(document: &'a Value, key: &str) -> Option<&'a Value> {
    key.split('.')
        .try_fold(document, |node, part| node.as_object()?.get(part))
}

impl SettingsStore for JsonSettingsStore {
    fn enabled_extensions(&self) -> crate::Result<Vec<String>> {
        match self.get(ENABLED_EXTENSIONS_KEY)? {
            Some(value) => serde_json::from_value(value)
                .with_context(|| format!("{} must be a list of strings", ENABLED_EXTENSIONS_KEY)),
            None => Ok(Vec::new()),
        }
    }

    fn set_enabled_extensions(&self, ids: &[String]) -> crate::Result<()> {
        debug!("Writing enabled extensions {:?} to {:?}", ids, self.path);
        self.set(ENABLED_EXTENSIONS_KEY, serde_json::to_value(ids)?)
    }
}

/// In-memory settings store (for testing and embedding)
#[derive(Debug, Clone, Default)]
pub struct MemorySettingsStore {
    enabled: Arc<Mutex<Vec<String>>>,
}

impl MemorySettingsStore {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            enabled: Arc::new(Mutex::new(ids.into_iter().map(Into::into).collect())),
        }
    }
}

impl SettingsStore for MemorySettingsStore {
    fn enabled_extensions(&self) -> crate::Result<Vec<String>> {
        Ok(self
            .enabled
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn set_enabled_extensions(&self, ids: &[String]) -> crate::Result<()> {
        *self.enabled.lock().unwrap_or_else(PoisonError::into_inner) = ids.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_reads_empty() {
        let temp = tempdir().unwrap();
        let store = JsonSettingsStore::new(temp.path().join("settings.json"));
        assert!(store.enabled_extensions().unwrap().is_empty());
    }

    #[test]
    fn test_roundtrip_preserves_other_keys() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("settings.json");
        std::fs::write(
            &path,
            json!({ "localData": { "assetDir": "/games/x", "settings": { "theme": "dark" } } })
                .to_string(),
        )
        .unwrap();

        let store = JsonSettingsStore::new(&path);
        store
            .set_enabled_extensions(&["hq-music".to_string(), "retcon.toml".to_string()])
            .unwrap();

        assert_eq!(
            store.enabled_extensions().unwrap(),
            vec!["hq-music".to_string(), "retcon.toml".to_string()]
        );
        assert_eq!(
            store.get("localData.settings.theme").unwrap(),
            Some(json!("dark"))
        );
        assert_eq!(store.get("localData.assetDir").unwrap(), Some(json!("/games/x")));

        store.clear_enabled_extensions().unwrap();
        assert!(store.enabled_extensions().unwrap().is_empty());
    }

    #[test]
    fn test_wrong_type_is_an_error() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("settings.json");
        std::fs::write(
            &path,
            json!({ "localData": { "settings": { "modListEnabled": "oops" } } }).to_string(),
        )
        .unwrap();

        assert!(JsonSettingsStore::new(&path).enabled_extensions().is_err());
    }

    #[test]
    fn test_memory_store() {
        let store = MemorySettingsStore::new(["a", "b"]);
        let shared = store.clone();
        assert_eq!(store.enabled_extensions().unwrap(), vec!["a", "b"]);
        shared.clear_enabled_extensions().unwrap();
        assert!(store.enabled_extensions().unwrap().is_empty());
    }
}
