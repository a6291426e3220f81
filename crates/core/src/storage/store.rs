use std::collections::BTreeMap;
#[cfg(not(target_arch = "wasm32"))]
use std::path::{Path, PathBuf};

use crate::errors::CoreError;

/// Browser-style `localStorage` quota (5 MiB).
pub const STORAGE_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// String key/value persistence with `localStorage` semantics: whole
/// values are read and replaced, there are no partial updates.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), CoreError>;

    /// Returns `true` if the key existed.
    fn remove(&mut self, key: &str) -> Result<bool, CoreError>;

    /// All keys, sorted.
    fn keys(&self) -> Result<Vec<String>, CoreError>;

    /// Approximate footprint: key and value lengths in bytes.
    fn bytes_used(&self) -> Result<usize, CoreError> {
        let mut total = 0;
        for key in self.keys()? {
            total += key.len() + self.get(&key)?.map_or(0, |v| v.len());
        }
        Ok(total)
    }
}

/// In-memory store. Used by tests and by hosts that persist elsewhere.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), CoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool, CoreError> {
        Ok(self.entries.remove(key).is_some())
    }

    fn keys(&self) -> Result<Vec<String>, CoreError> {
        Ok(self.entries.keys().cloned().collect())
    }

    fn bytes_used(&self) -> Result<usize, CoreError> {
        Ok(self.entries.iter().map(|(k, v)| k.len() + v.len()).sum())
    }
}

/// One `<key>.json` file per key inside a directory (native only).
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileStore {
    /// Open (and create if needed) a store rooted at `dir`.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, CoreError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, CoreError> {
        // Keys become file names; keep them to a safe alphabet.
        if key.is_empty()
            || !key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(CoreError::Storage(format!("Invalid storage key '{key}'")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), CoreError> {
        let path = self.path_for(key)?;
        // Write-then-rename so a crash never leaves half a value behind.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool, CoreError> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self) -> Result<Vec<String>, CoreError> {
        let mut keys = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                keys.push(stem.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }
}
