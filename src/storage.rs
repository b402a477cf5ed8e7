// ============================================================================
// STORAGE - Durable key/value persistence
// ============================================================================
//
// Every value is a string. Callers encode structured values as JSON before
// storing them, the same way a browser's localStorage is used.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

const APP_NAME: &str = "fluencyflow";
const STORE_FILE: &str = "storage.json";
const MAX_FILE_SIZE: u64 = 50 * 1024 * 1024; // 50 MB max per file

pub fn get_data_dir() -> Result<PathBuf> {
    if let Some(data_home) = dirs::data_dir() {
        Ok(data_home.join(APP_NAME))
    } else {
        Err(anyhow::anyhow!("Could not determine data directory"))
    }
}

pub fn default_store_path() -> Result<PathBuf> {
    Ok(get_data_dir()?.join(STORE_FILE))
}

/// Key `{purpose}-{language}`.
pub fn storage_key(purpose: &str, language: &str) -> String {
    format!("{}-{}", purpose, language)
}

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;

    /// Write several keys as one update.
    fn set_many(&mut self, entries: Vec<(String, String)>) -> Result<()> {
        for (key, value) in entries {
            self.set(&key, value)?;
        }
        Ok(())
    }

    /// Pick up writes made by other sessions sharing the same backing storage.
    fn reload(&mut self) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// JSON object on disk. Re-read before each write so that concurrently open
/// sessions do not drop each other's keys.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }
        let entries = read_entries(&path)?;
        debug!(path = %path.display(), keys = entries.len(), "opened store");
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        let serialized = serde_json::to_vec_pretty(&self.entries)?;

        if serialized.len() > MAX_FILE_SIZE as usize {
            return Err(anyhow::anyhow!(
                "Serialized store exceeds maximum size limit"
            ));
        }

        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, serialized)
            .with_context(|| format!("writing {}", temp_path.display()))?;
        fs::rename(&temp_path, &self.path)
            .with_context(|| format!("replacing {}", self.path.display()))?;
        Ok(())
    }
}

fn read_entries(path: &Path) -> Result<BTreeMap<String, String>> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }

    let metadata = fs::metadata(path)?;
    if metadata.len() > MAX_FILE_SIZE {
        return Err(anyhow::anyhow!(
            "Store file exceeds maximum size limit - possible corruption"
        ));
    }

    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    if data.iter().all(u8::is_ascii_whitespace) {
        return Ok(BTreeMap::new());
    }
    serde_json::from_slice(&data).map_err(|e| {
        anyhow::anyhow!("Failed to parse {} (file may be corrupted): {}", path.display(), e)
    })
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        if let Err(e) = self.reload() {
            warn!("store reload before write failed: {e:#}");
        }
        self.entries.insert(key.to_string(), value);
        self.flush()
    }

    fn set_many(&mut self, entries: Vec<(String, String)>) -> Result<()> {
        if let Err(e) = self.reload() {
            warn!("store reload before write failed: {e:#}");
        }
        self.entries.extend(entries);
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if let Err(e) = self.reload() {
            warn!("store reload before write failed: {e:#}");
        }
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }

    fn reload(&mut self) -> Result<()> {
        self.entries = read_entries(&self.path)?;
        Ok(())
    }
}

/// Read a JSON-encoded value, falling back to `T::default()` when the key is
/// missing or holds something unparseable.
pub fn load_json_or_default<T>(store: &dyn KeyValueStore, key: &str) -> T
where
    T: for<'de> serde::Deserialize<'de> + Default,
{
    match store.get(key) {
        Some(raw) => match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to parse stored {}: {}. Using defaults.", key, e);
                T::default()
            }
        },
        None => T::default(),
    }
}
