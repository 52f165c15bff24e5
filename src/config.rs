use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "teleprompt";
const STORE_FILE: &str = "store.json";

pub fn config_root() -> Result<PathBuf> {
    if let Ok(override_dir) = env::var("TELEPROMPT_CONFIG_DIR") {
        return Ok(PathBuf::from(override_dir));
    }

    let base = dirs::config_dir().context("no config directory for this platform")?;
    Ok(base.join(APP_DIR))
}

pub fn store_path() -> Result<PathBuf> {
    Ok(config_root()?.join(STORE_FILE))
}

pub fn ensure_dir(root: &Path) -> Result<()> {
    fs::create_dir_all(root).with_context(|| format!("failed to create {}", root.display()))
}

/// String-keyed persistence medium.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Value>>;
    fn set(&mut self, key: &str, value: Value) -> Result<()>;
}

/// Key-value store backed by a single JSON object on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(store_path()?))
    }

    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }

        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read store file {}", self.path.display()))?;
        let entries: Map<String, Value> = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse store file {}", self.path.display()))?;
        Ok(entries)
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        // A corrupt file is replaced rather than blocking every later write.
        let mut entries = self.read_all().unwrap_or_default();
        entries.insert(key.to_string(), value);

        if let Some(parent) = self.path.parent() {
            ensure_dir(parent)?;
        }
        let json = serde_json::to_string_pretty(&entries)?;
        fs::write(&self.path, json)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        Ok(())
    }
}

/// In-memory store. `fail_reads`/`fail_writes` simulate a broken medium.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    pub entries: Map<String, Value>,
    pub fail_reads: bool,
    pub fail_writes: bool,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        if self.fail_reads {
            anyhow::bail!("memory store read failure");
        }
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        if self.fail_writes {
            anyhow::bail!("memory store write failure");
        }
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn file_store_round_trips_under_a_key() {
        let dir = tempdir().expect("tempdir");
        let mut store = JsonFileStore::new(dir.path().join("nested").join(STORE_FILE));

        assert_eq!(store.get("settings").expect("get"), None);
        store.set("settings", json!({"fontSize": 40})).expect("set");
        store.set("other", json!(1)).expect("set other");

        let loaded = store.get("settings").expect("get").expect("present");
        assert_eq!(loaded["fontSize"], 40);
        assert_eq!(store.get("other").expect("get"), Some(json!(1)));
    }

    #[test]
    fn corrupt_file_fails_reads_but_not_writes() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join(STORE_FILE);
        fs::write(&path, "{not json").expect("write");
        let mut store = JsonFileStore::new(path);

        assert!(store.get("settings").is_err());
        store.set("settings", json!({"autoStart": false})).expect("set");
        assert!(store.get("settings").expect("get").is_some());
    }

    #[test]
    fn config_root_honours_override() {
        let dir = tempdir().expect("tempdir");
        unsafe {
            env::set_var("TELEPROMPT_CONFIG_DIR", dir.path().to_string_lossy().as_ref());
        }

        assert_eq!(config_root().expect("root"), dir.path());
        assert_eq!(store_path().expect("path"), dir.path().join(STORE_FILE));
    }
}
