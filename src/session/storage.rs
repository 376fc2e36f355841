//! Persistence for the signed-in credential.
//!
//! The file store keeps `<data_dir>/credential.json` with 0600 permissions.
//! Tokens are never logged.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use parking_lot::Mutex;
use thiserror::Error;

use super::Credential;

pub const CREDENTIAL_FILE: &str = "credential.json";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Credential file I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Credential serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StorageError>;

pub trait CredentialStorage: Send + Sync {
    /// Returns the stored credential, or `None` when nothing usable is stored.
    fn load(&self) -> Result<Option<Credential>>;

    fn save(&self, credential: &Credential) -> Result<()>;

    fn clear(&self) -> Result<()>;
}

pub struct FileCredentialStorage {
    path: PathBuf,
}

impl FileCredentialStorage {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(CREDENTIAL_FILE),
        }
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl CredentialStorage for FileCredentialStorage {
    fn load(&self) -> Result<Option<Credential>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;

        // A torn or hand-edited file must never yield half a credential.
        match serde_json::from_str::<Credential>(&contents) {
            Ok(credential) if credential.is_complete() => Ok(Some(credential)),
            Ok(_) => {
                warn!("⚠️ Stored credential has an empty token, treating as signed out");
                Ok(None)
            }
            Err(e) => {
                warn!(
                    "⚠️ Ignoring unreadable credential file {}: {}",
                    self.path.display(),
                    e
                );
                Ok(None)
            }
        }
    }

    fn save(&self, credential: &Credential) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let contents = serde_json::to_string_pretty(credential)?;

        // Write to a sibling file first so readers never observe a partial write.
        let staging = self.path.with_extension("json.tmp");
        {
            let mut options = OpenOptions::new();
            options.write(true).create(true).truncate(true);
            #[cfg(unix)]
            {
                use std::os::unix::fs::OpenOptionsExt;
                options.mode(0o600);
            }
            let mut file = options.open(&staging).map_err(|e| self.io_error(e))?;
            file.write_all(contents.as_bytes())
                .map_err(|e| self.io_error(e))?;
        }
        fs::rename(&staging, &self.path).map_err(|e| self.io_error(e))?;

        debug!("💾 Credential saved to {}", self.path.display());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

/// In-process storage, mostly for tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryCredentialStorage {
    slot: Mutex<Option<Credential>>,
}

impl MemoryCredentialStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(credential: Credential) -> Self {
        Self {
            slot: Mutex::new(Some(credential)),
        }
    }
}

impl CredentialStorage for MemoryCredentialStorage {
    fn load(&self) -> Result<Option<Credential>> {
        Ok(self.slot.lock().clone())
    }

    fn save(&self, credential: &Credential) -> Result<()> {
        *self.slot.lock() = Some(credential.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.slot.lock() = None;
        Ok(())
    }
}
