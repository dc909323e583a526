//! Key-value slots the cart payload is persisted in.
//!
//! A slot holds one opaque string. [`CartStore`](crate::CartStore) owns the
//! format; a slot only has to read and replace the whole value.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use thiserror::Error;

/// Errors raised by a storage slot.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed (permissions, disk full, ...).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The slot cannot be used at all (disabled, poisoned lock, quota).
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// A single persistent key-value slot.
pub trait CartStorage {
    /// Read the stored payload, or `None` if nothing has been stored yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the slot cannot be read.
    fn read(&self) -> Result<Option<String>, StorageError>;

    /// Replace the stored payload.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the slot cannot be written.
    fn write(&self, payload: &str) -> Result<(), StorageError>;
}

// =============================================================================
// MemoryStorage
// =============================================================================

/// In-memory slot.
///
/// Clones share the same slot, so a test can keep a handle and inspect what
/// the store wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryStorage {
    /// Create an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a slot pre-filled with a payload.
    #[must_use]
    pub fn with_payload(payload: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(payload.into()))),
        }
    }

    /// Current contents of the slot.
    #[must_use]
    pub fn contents(&self) -> Option<String> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }
}

impl CartStorage for MemoryStorage {
    fn read(&self) -> Result<Option<String>, StorageError> {
        let slot = self
            .slot
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Ok(slot.clone())
    }

    fn write(&self, payload: &str) -> Result<(), StorageError> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        *slot = Some(payload.to_owned());
        Ok(())
    }
}

// =============================================================================
// FileStorage
// =============================================================================

/// Slot backed by a single file.
///
/// Writes go to a sibling temp file that is renamed over the target, so a
/// reader never sees a half-written payload.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Create a slot stored at `path`. The file and its parent directories are
    /// created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl CartStorage for FileStorage {
    fn read(&self) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(payload) => Ok(Some(payload)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, payload: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let temp = self.temp_path();
        std::fs::write(&temp, payload)?;
        std::fs::rename(&temp, &self.path)?;
        Ok(())
    }
}
