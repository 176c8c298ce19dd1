//! Byte stores backing the draw history
//!
//! The history is written as one JSON document under a fixed name. Stores only
//! move bytes; decoding and recovery live with the history buffer.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

use crate::error::{Result, WingoError};

/// Byte-oriented store holding a single document
pub trait ByteStore: Send + Sync {
    /// Human-readable location, used in logs
    fn describe(&self) -> String;

    /// Read the stored document, `None` when nothing has been written yet
    fn load(&self) -> Result<Option<Vec<u8>>>;

    /// Replace the stored document
    fn save(&self, bytes: &[u8]) -> Result<()>;
}

/// Store backed by a file on disk
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl ByteStore for FileStore {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<Option<Vec<u8>>> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(WingoError::Persistence(format!(
                "failed to read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    fn save(&self, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        // Write-then-rename so a crash never leaves a half-written document
        let tmp = self.temp_path();
        std::fs::write(&tmp, bytes).map_err(|e| {
            WingoError::Persistence(format!("failed to write {}: {}", tmp.display(), e))
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|e| {
            WingoError::Persistence(format!(
                "failed to move {} into place: {}",
                tmp.display(),
                e
            ))
        })?;

        debug!(path = %self.path.display(), bytes = bytes.len(), "history saved");
        Ok(())
    }
}

/// In-process store, used by tests and one-shot commands
#[derive(Debug, Default)]
pub struct MemoryStore {
    bytes: Mutex<Option<Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: Mutex::new(Some(bytes.into())),
        }
    }

    pub fn contents(&self) -> Option<Vec<u8>> {
        self.bytes.lock().ok().and_then(|b| b.clone())
    }
}

impl ByteStore for MemoryStore {
    fn describe(&self) -> String {
        "memory".to_string()
    }

    fn load(&self) -> Result<Option<Vec<u8>>> {
        let guard = self
            .bytes
            .lock()
            .map_err(|_| WingoError::Persistence("memory store poisoned".to_string()))?;
        Ok(guard.clone())
    }

    fn save(&self, bytes: &[u8]) -> Result<()> {
        let mut guard = self
            .bytes
            .lock()
            .map_err(|_| WingoError::Persistence("memory store poisoned".to_string()))?;
        *guard = Some(bytes.to_vec());
        Ok(())
    }
}
