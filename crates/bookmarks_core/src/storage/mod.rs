//! Durable key-value slot backends.
//!
//! # Responsibility
//! - Define the byte-level read/write contract the store persists through.
//! - Provide in-memory, file and SQLite implementations.
//!
//! # Invariants
//! - A write replaces the whole slot value or fails; callers never observe a
//!   partially written slot.
//! - Reading a slot that was never written yields `Ok(None)`, not an error.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod file;
mod memory;
mod sqlite;

pub use file::FileBackend;
pub use memory::MemoryBackend;
pub use sqlite::{SqliteBackend, SLOT_SCHEMA_VERSION};

pub type BackendResult<T> = Result<T, BackendError>;

/// Failure reported by a storage backend.
#[derive(Debug)]
pub enum BackendError {
    Io(std::io::Error),
    Db(rusqlite::Error),
    /// The SQLite file was written by a newer slot schema.
    UnsupportedSchemaVersion { found: u32, supported: u32 },
    /// The write would grow the backend past its byte capacity.
    QuotaExceeded { requested: usize, capacity: usize },
    /// The slot key cannot be represented by this backend.
    InvalidKey(String),
}

impl Display for BackendError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::QuotaExceeded {
                requested,
                capacity,
            } => write!(
                f,
                "storage quota exceeded: {requested} bytes requested, capacity is {capacity}"
            ),
            Self::UnsupportedSchemaVersion { found, supported } => write!(
                f,
                "slot schema version {found} is newer than supported {supported}"
            ),
            Self::InvalidKey(key) => write!(f, "invalid storage key `{key}`"),
        }
    }
}

impl Error for BackendError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::QuotaExceeded { .. }
            | Self::UnsupportedSchemaVersion { .. }
            | Self::InvalidKey(_) => None,
        }
    }
}

impl From<std::io::Error> for BackendError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<rusqlite::Error> for BackendError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(value)
    }
}

/// Byte-oriented durable slot storage.
///
/// Implementations take `&self`; single-process callers own the only handle,
/// and shared handles (`&B`) behave as independent writers racing on the same
/// slot, last write wins.
pub trait StorageBackend {
    /// Reads the current value of `key`, or `None` when the slot is empty.
    fn read(&self, key: &str) -> BackendResult<Option<Vec<u8>>>;
    /// Replaces the value of `key` with `value`.
    fn write(&self, key: &str, value: &[u8]) -> BackendResult<()>;
}

impl<B: StorageBackend + ?Sized> StorageBackend for &B {
    fn read(&self, key: &str) -> BackendResult<Option<Vec<u8>>> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &[u8]) -> BackendResult<()> {
        (**self).write(key, value)
    }
}
