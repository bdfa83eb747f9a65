//! The active Notion database ID, cached in memory and mirrored to a file so
//! a database created under the configured page survives restarts.

use parking_lot::RwLock;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub struct DatabaseIdStore {
    path: PathBuf,
    current: RwLock<Option<String>>,
}

impl DatabaseIdStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            current: RwLock::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn current(&self) -> Option<String> {
        self.current.read().clone()
    }

    /// ID stored on disk, if the file exists and is not blank.
    pub fn read_file(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let id = contents.trim();
                Ok((!id.is_empty()).then(|| id.to_string()))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Make `id` the active database ID without touching the file.
    pub fn set(&self, id: &str) {
        *self.current.write() = Some(id.to_string());
    }

    /// Make `id` the active database ID and write it to disk.
    pub fn persist(&self, id: &str) -> io::Result<()> {
        self.set(id);
        fs::write(&self.path, id)?;
        log::info!("Saved database ID: {}...", short_id(id));
        Ok(())
    }

    /// Forget the active ID and remove the file.
    pub fn clear(&self) {
        *self.current.write() = None;
        match fs::remove_file(&self.path) {
            Ok(()) => log::info!("Removed stale database ID file {}", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("Failed to remove {}: {}", self.path.display(), e),
        }
    }
}

/// First 8 characters of an ID, for logs and API responses.
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}
