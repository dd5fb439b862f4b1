//! File-per-wallet record store.
//!
//! Records live as `<dir>/<name>.json`. New records are written to a temp
//! file in the same directory and moved into place with a no-clobber
//! rename, so a racing create of the same name fails instead of
//! overwriting and an interrupted write never leaves a truncated file
//! under a wallet's real name.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::WalletError;
use crate::record::{WalletRecord, validate_name};

/// File extension of wallet records.
pub const RECORD_EXTENSION: &str = "json";

/// Directory of wallet record files.
#[derive(Debug, Clone)]
pub struct WalletStore {
    dir: PathBuf,
}

impl WalletStore {
    /// Open a store rooted at `dir`. The directory is created lazily on
    /// first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the record file for `name`.
    pub fn record_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.{RECORD_EXTENSION}"))
    }

    pub fn exists(&self, name: &str) -> bool {
        validate_name(name).is_ok() && self.record_path(name).is_file()
    }

    /// Persist a new record. Fails if one with the same name exists.
    pub fn save(&self, record: &WalletRecord) -> Result<(), WalletError> {
        validate_name(&record.name)?;
        fs::create_dir_all(&self.dir).map_err(|e| io_error(&self.dir, e))?;

        let path = self.record_path(&record.name);
        if path.exists() {
            return Err(WalletError::WalletAlreadyExists(record.name.clone()));
        }

        let json = serde_json::to_vec_pretty(record)
            .map_err(|e| WalletError::Serialization(e.to_string()))?;

        let mut tmp = tempfile::Builder::new()
            .prefix(".tmp-")
            .suffix(".partial")
            .tempfile_in(&self.dir)
            .map_err(|e| io_error(&self.dir, e))?;
        restrict_permissions(tmp.as_file()).map_err(|e| io_error(tmp.path(), e))?;
        tmp.write_all(&json).map_err(|e| io_error(tmp.path(), e))?;
        tmp.as_file().sync_all().map_err(|e| io_error(tmp.path(), e))?;

        tmp.persist_noclobber(&path).map_err(|e| {
            if e.error.kind() == io::ErrorKind::AlreadyExists {
                WalletError::WalletAlreadyExists(record.name.clone())
            } else {
                io_error(&path, e.error)
            }
        })?;
        debug!(path = %path.display(), "wrote wallet record");
        Ok(())
    }

    /// Load the record stored under `name`.
    pub fn load(&self, name: &str) -> Result<WalletRecord, WalletError> {
        validate_name(name)?;
        let path = self.record_path(name);
        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(WalletError::WalletNotFound(name.to_string()));
            }
            Err(e) => return Err(io_error(&path, e)),
        };
        let record: WalletRecord = serde_json::from_slice(&data)
            .map_err(|e| WalletError::corrupted(name, format!("invalid JSON: {e}")))?;
        record.check(name)?;
        Ok(record)
    }

    /// All readable records, sorted by creation time then name.
    ///
    /// Malformed files are logged and skipped rather than failing the
    /// whole listing. A missing directory is an empty store.
    pub fn list(&self) -> Result<Vec<WalletRecord>, WalletError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error(&self.dir, e)),
        };

        let mut records = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| io_error(&self.dir, e))?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                warn!(path = %path.display(), "skipping wallet file with non-UTF-8 name");
                continue;
            };
            if validate_name(name).is_err() {
                continue;
            }
            match self.load(name) {
                Ok(record) => records.push(record),
                Err(e) => warn!(wallet = name, error = %e, "skipping unreadable wallet record"),
            }
        }
        records.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(records)
    }

    /// Delete the record file. Authorization is the caller's job.
    pub fn remove(&self, name: &str) -> Result<(), WalletError> {
        validate_name(name)?;
        let path = self.record_path(name);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "removed wallet record");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(WalletError::WalletNotFound(name.to_string()))
            }
            Err(e) => Err(io_error(&path, e)),
        }
    }
}

fn io_error(path: &Path, e: io::Error) -> WalletError {
    WalletError::Io(format!("{}: {e}", path.display()))
}

#[cfg(unix)]
fn restrict_permissions(file: &fs::File) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_file: &fs::File) -> io::Result<()> {
    Ok(())
}
