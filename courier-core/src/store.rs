//! Process-wide key-value storage for the bearer token.
//!
//! The token is written by a login flow outside this crate, read on every
//! authenticated request, and cleared when the server issues an auth challenge.

use crate::error::{CourierError, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, RwLock};
use tracing::debug;

/// Fixed key the bearer token lives under.
pub const TOKEN_KEY: &str = "access_token";

/// Minimal string key-value store.
pub trait TokenStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;

    /// Stored bearer token, if any.
    fn token(&self) -> Result<Option<String>> {
        self.get(TOKEN_KEY)
    }

    fn set_token(&self, token: &str) -> Result<()> {
        self.set(TOKEN_KEY, token)
    }

    fn clear_token(&self) -> Result<()> {
        self.remove(TOKEN_KEY)
    }
}

/// In-process store; contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a token.
    pub fn with_token(token: impl Into<String>) -> Self {
        let store = Self::new();
        if let Ok(mut entries) = store.entries.write() {
            entries.insert(TOKEN_KEY.to_string(), token.into());
        }
        store
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| CourierError::Store("memory store poisoned".into()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| CourierError::Store("memory store poisoned".into()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| CourierError::Store("memory store poisoned".into()))?;
        entries.remove(key);
        Ok(())
    }
}

/// 基于 JSON 文件的存储：每次读写都直接落盘，跨进程共享同一份 token。
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileTokenStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    /// Store under the user's data directory (`<data dir>/courier/store.json`).
    pub fn default_location() -> Result<Self> {
        let dir = dirs_next::data_dir()
            .ok_or_else(|| CourierError::Store("no data directory for this platform".into()))?;
        Ok(Self::new(dir.join("courier").join("store.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let data = std::fs::read(&self.path)?;
        if data.is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_slice(&data)?)
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        // rename over the old file so readers never observe a truncated store
        let data = serde_json::to_vec_pretty(entries)?;
        let staging = self.path.with_extension("json.tmp");
        std::fs::write(&staging, data)?;
        std::fs::rename(&staging, &self.path)?;
        debug!(path = %self.path.display(), "token store written");
        Ok(())
    }

    fn guard(&self) -> Result<MutexGuard<'_, ()>> {
        self.lock
            .lock()
            .map_err(|_| CourierError::Store("file store lock poisoned".into()))
    }

    fn update(&self, f: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<()> {
        let _guard = self.guard()?;
        let mut entries = self.load()?;
        f(&mut entries);
        self.save(&entries)
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.guard()?;
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }
        self.update(|entries| {
            entries.remove(key);
        })
    }
}
