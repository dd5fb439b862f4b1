//! Wallet configuration and active-wallet pointer storage.
//!
//! [`WalletConfig`] locates the data directory and carries the Argon2
//! cost used for new records. The active wallet pointer lives outside
//! the wallet store, behind the [`ConfigStore`] trait:
//! [`FileConfigStore`] keeps it in `config.json`, and
//! [`MemoryConfigStore`] keeps it in process memory.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde_json::{Map, Value};
use sigil_core::error::ConfigError;
use sigil_core::traits::ConfigStore;

use crate::encryption::KdfParams;

/// Environment variable overriding the data directory.
pub const HOME_ENV: &str = "SIGIL_HOME";

/// Key under which the active wallet name is stored in `config.json`.
pub const ACTIVE_WALLET_KEY: &str = "activeWallet";

/// Configuration for a wallet manager instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletConfig {
    /// Root directory for wallet records and `config.json`.
    pub data_dir: PathBuf,
    /// Argon2id cost for newly written records and keystores.
    pub kdf: KdfParams,
}

impl Default for WalletConfig {
    fn default() -> Self {
        let data_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".sigil");

        Self {
            data_dir,
            kdf: KdfParams::default(),
        }
    }
}

impl WalletConfig {
    /// Defaults, with the data directory taken from `SIGIL_HOME` when set.
    pub fn from_env() -> Self {
        match std::env::var_os(HOME_ENV) {
            Some(dir) if !dir.is_empty() => Self::with_data_dir(dir),
            _ => Self::default(),
        }
    }

    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Directory holding one JSON record per wallet.
    pub fn wallets_dir(&self) -> PathBuf {
        self.data_dir.join("wallets")
    }

    /// Shared settings file holding the active wallet pointer.
    pub fn config_path(&self) -> PathBuf {
        self.data_dir.join("config.json")
    }
}

/// Active pointer persisted in a JSON settings file.
///
/// Only `activeWallet` is touched; other keys in the file are preserved
/// on every write.
#[derive(Debug)]
pub struct FileConfigStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Map<String, Value>, ConfigError> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(self.io_error(e)),
        };
        if data.iter().all(u8::is_ascii_whitespace) {
            return Ok(Map::new());
        }
        match serde_json::from_slice(&data) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(ConfigError::Parse(format!(
                "{}: expected a JSON object",
                self.path.display()
            ))),
            Err(e) => Err(ConfigError::Parse(format!("{}: {e}", self.path.display()))),
        }
    }

    fn write(&self, map: &Map<String, Value>) -> Result<(), ConfigError> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir).map_err(|e| self.io_error(e))?;
        let json =
            serde_json::to_vec_pretty(map).map_err(|e| ConfigError::Parse(e.to_string()))?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| self.io_error(e))?;
        tmp.write_all(&json).map_err(|e| self.io_error(e))?;
        tmp.as_file().sync_all().map_err(|e| self.io_error(e))?;
        tmp.persist(&self.path).map_err(|e| self.io_error(e.error))?;
        Ok(())
    }

    fn io_error(&self, e: io::Error) -> ConfigError {
        ConfigError::Io(format!("{}: {e}", self.path.display()))
    }
}

impl ConfigStore for FileConfigStore {
    fn get_active_wallet(&self) -> Result<Option<String>, ConfigError> {
        let _guard = self.lock.lock();
        Ok(self
            .read()?
            .get(ACTIVE_WALLET_KEY)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string))
    }

    fn set_active_wallet(&self, name: &str) -> Result<(), ConfigError> {
        let _guard = self.lock.lock();
        let mut map = self.read()?;
        map.insert(ACTIVE_WALLET_KEY.to_string(), Value::String(name.to_string()));
        self.write(&map)
    }

    fn clear_active_wallet(&self) -> Result<(), ConfigError> {
        let _guard = self.lock.lock();
        let mut map = self.read()?;
        if map.remove(ACTIVE_WALLET_KEY).is_some() {
            self.write(&map)?;
        }
        Ok(())
    }
}

/// In-process active pointer.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    active: Mutex<Option<String>>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigStore for MemoryConfigStore {
    fn get_active_wallet(&self) -> Result<Option<String>, ConfigError> {
        Ok(self.active.lock().clone())
    }

    fn set_active_wallet(&self, name: &str) -> Result<(), ConfigError> {
        *self.active.lock() = Some(name.to_string());
        Ok(())
    }

    fn clear_active_wallet(&self) -> Result<(), ConfigError> {
        *self.active.lock() = None;
        Ok(())
    }
}
