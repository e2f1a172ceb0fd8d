//! Directory-backed slot storage, one JSON file per key.

use super::{BackendError, BackendResult, StorageBackend};
use log::debug;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const SLOT_FILE_EXTENSION: &str = "json";

/// Stores slot `key` in `<root>/<key>.json`.
///
/// Writes land in a sibling temp file first and are renamed into place.
#[derive(Debug, Clone)]
pub struct FileBackend {
    root: PathBuf,
}

impl FileBackend {
    /// The directory is created lazily on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the file that holds `key`.
    pub fn slot_path(&self, key: &str) -> BackendResult<PathBuf> {
        if !is_valid_key(key) {
            return Err(BackendError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(format!("{key}.{SLOT_FILE_EXTENSION}")))
    }
}

impl StorageBackend for FileBackend {
    fn read(&self, key: &str) -> BackendResult<Option<Vec<u8>>> {
        let path = self.slot_path(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&self, key: &str, value: &[u8]) -> BackendResult<()> {
        let path = self.slot_path(key)?;
        fs::create_dir_all(&self.root)?;

        let staging = self.root.join(format!(".{key}.{SLOT_FILE_EXTENSION}.tmp"));
        fs::write(&staging, value)?;
        if let Err(err) = fs::rename(&staging, &path) {
            let _ = fs::remove_file(&staging);
            return Err(err.into());
        }

        debug!(
            "event=slot_write module=storage backend=file key={} bytes={}",
            key,
            value.len()
        );
        Ok(())
    }
}

fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-'))
}
