//! Core bookmark persistence for the bookmark manager.
//! This crate owns the bookmark record shape and the store contract.

pub mod logging;
pub mod model;
pub mod storage;
pub mod store;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::bookmark::{Bookmark, BookmarkDraft, BookmarkId, Icon};
pub use storage::{
    BackendError, BackendResult, FileBackend, MemoryBackend, SqliteBackend, StorageBackend,
    SLOT_SCHEMA_VERSION,
};
pub use store::{BookmarkStore, StoreError, StoreResult, STORAGE_KEY};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
