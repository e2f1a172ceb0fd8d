//! Bookmark store: authoritative in-memory collection mirrored to one slot.
//!
//! # Responsibility
//! - Own the ordered bookmark collection and the `ready` flag.
//! - Mirror every mutation to the durable slot as one serialized snapshot.
//! - Report load/write failures as typed results instead of hiding them.
//!
//! # Invariants
//! - Every mutation builds a complete new snapshot; that snapshot becomes the
//!   in-memory state and is the exact value written to the slot.
//! - A failed write does not roll back the in-memory snapshot, so memory and
//!   slot may diverge until the next successful write.
//! - A corrupt slot is never overwritten by `load`.
//! - Appends keep insertion order; updates keep position.

use crate::model::bookmark::{Bookmark, BookmarkDraft, BookmarkId};
use crate::storage::{BackendError, BackendResult, StorageBackend};
use log::{error, info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Slot key bookmarks are stored under unless overridden.
pub const STORAGE_KEY: &str = "personalBookmarks";

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure surfaced by store operations.
///
/// None of these leave the store unusable; callers may ignore them and keep
/// working with the in-memory collection.
#[derive(Debug)]
pub enum StoreError {
    /// Slot content could not be parsed; the collection was reset to empty.
    LoadCorrupted(serde_json::Error),
    /// Backend failed to read the slot; the collection was reset to empty.
    ReadFailed(BackendError),
    /// Backend rejected the write; the in-memory change is kept.
    WriteFailed(BackendError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LoadCorrupted(err) => write!(f, "stored bookmarks are corrupted: {err}"),
            Self::ReadFailed(err) => write!(f, "failed to read stored bookmarks: {err}"),
            Self::WriteFailed(err) => write!(f, "failed to save bookmarks: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::LoadCorrupted(err) => Some(err),
            Self::ReadFailed(err) | Self::WriteFailed(err) => Some(err),
        }
    }
}

/// Bookmark collection persisted through an injected backend.
pub struct BookmarkStore<B: StorageBackend> {
    backend: B,
    key: String,
    bookmarks: Vec<Bookmark>,
    ready: bool,
}

impl<B: StorageBackend> BookmarkStore<B> {
    /// Creates an unloaded store over `backend` using [`STORAGE_KEY`].
    pub fn new(backend: B) -> Self {
        Self::with_key(backend, STORAGE_KEY)
    }

    pub fn with_key(backend: B, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
            bookmarks: Vec::new(),
            ready: false,
        }
    }

    /// Creates a store and loads it, returning the load outcome alongside.
    ///
    /// The store is ready even when the outcome is an error.
    pub fn open(backend: B) -> (Self, StoreResult<usize>) {
        let mut store = Self::new(backend);
        let outcome = store.load();
        (store, outcome)
    }

    /// Replaces the in-memory collection with the slot content.
    ///
    /// Returns the number of loaded bookmarks. An empty slot loads as an
    /// empty collection. On any failure the collection is empty. `ready` is
    /// set in every case.
    pub fn load(&mut self) -> StoreResult<usize> {
        let outcome = self.read_snapshot();
        self.ready = true;

        match outcome {
            Ok(bookmarks) => {
                let count = bookmarks.len();
                warn_on_duplicate_ids(&bookmarks);
                self.bookmarks = bookmarks;
                info!(
                    "event=store_load module=store status=ok key={} count={}",
                    self.key, count
                );
                Ok(count)
            }
            Err(err) => {
                self.bookmarks.clear();
                error!(
                    "event=store_load module=store status=error key={} error={}",
                    self.key, err
                );
                Err(err)
            }
        }
    }

    /// Appends a new bookmark with a freshly generated id and persists.
    ///
    /// The returned id is also reachable through [`Self::bookmarks`] when the
    /// write fails, since the in-memory append is kept.
    pub fn add(&mut self, draft: BookmarkDraft) -> StoreResult<BookmarkId> {
        let id = self.fresh_id();
        let mut snapshot = self.bookmarks.clone();
        snapshot.push(Bookmark::from_draft(id.clone(), draft));
        self.commit(snapshot, "add")?;
        Ok(id)
    }

    /// Replaces the bookmark whose id matches `bookmark.id`.
    ///
    /// Returns whether a record matched. An unmatched id leaves the
    /// collection unchanged but still re-persists it.
    pub fn update(&mut self, bookmark: Bookmark) -> StoreResult<bool> {
        let mut matched = false;
        let snapshot = self
            .bookmarks
            .iter()
            .map(|existing| {
                if existing.id == bookmark.id {
                    matched = true;
                    bookmark.clone()
                } else {
                    existing.clone()
                }
            })
            .collect();
        self.commit(snapshot, "update")?;
        Ok(matched)
    }

    /// Removes the bookmark with `id`, keeping the others in order.
    ///
    /// Returns whether a record matched. An unmatched id leaves the
    /// collection unchanged but still re-persists it.
    pub fn delete(&mut self, id: &BookmarkId) -> StoreResult<bool> {
        let snapshot: Vec<Bookmark> = self
            .bookmarks
            .iter()
            .filter(|existing| &existing.id != id)
            .cloned()
            .collect();
        let matched = snapshot.len() != self.bookmarks.len();
        self.commit(snapshot, "delete")?;
        Ok(matched)
    }

    pub fn bookmarks(&self) -> &[Bookmark] {
        &self.bookmarks
    }

    pub fn get(&self, id: &BookmarkId) -> Option<&Bookmark> {
        self.bookmarks.iter().find(|bookmark| &bookmark.id == id)
    }

    pub fn len(&self) -> usize {
        self.bookmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookmarks.is_empty()
    }

    /// False until the first [`Self::load`] completed.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn storage_key(&self) -> &str {
        &self.key
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn read_snapshot(&self) -> StoreResult<Vec<Bookmark>> {
        let bytes = self
            .backend
            .read(&self.key)
            .map_err(StoreError::ReadFailed)?;
        match bytes {
            Some(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Vec::new()),
            Some(bytes) => serde_json::from_slice(&bytes).map_err(StoreError::LoadCorrupted),
            None => Ok(Vec::new()),
        }
    }

    /// Adopts `snapshot` as in-memory state, then writes it to the slot.
    fn commit(&mut self, snapshot: Vec<Bookmark>, op: &'static str) -> StoreResult<()> {
        let encoded = encode_snapshot(&snapshot);
        self.bookmarks = snapshot;

        let written = encoded.and_then(|bytes| {
            self.backend.write(&self.key, &bytes)?;
            Ok(bytes.len())
        });
        match written {
            Ok(bytes) => {
                info!(
                    "event=store_persist module=store status=ok op={} key={} count={} bytes={}",
                    op,
                    self.key,
                    self.bookmarks.len(),
                    bytes
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=store_persist module=store status=error op={} key={} error={}",
                    op, self.key, err
                );
                Err(StoreError::WriteFailed(err))
            }
        }
    }

    fn fresh_id(&self) -> BookmarkId {
        loop {
            let id = BookmarkId::generate();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }
}

/// Serializes a snapshot into the durable slot format.
///
/// Encoding failures surface as write failures: nothing reaches the slot.
fn encode_snapshot(bookmarks: &[Bookmark]) -> BackendResult<Vec<u8>> {
    serde_json::to_vec(bookmarks).map_err(|err| BackendError::Io(err.into()))
}

fn warn_on_duplicate_ids(bookmarks: &[Bookmark]) {
    let mut seen = HashSet::with_capacity(bookmarks.len());
    for bookmark in bookmarks {
        if !seen.insert(&bookmark.id) {
            warn!(
                "event=store_load module=store status=warn duplicate_id={}",
                bookmark.id
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{encode_snapshot, BookmarkStore, StoreError, STORAGE_KEY};
    use crate::model::bookmark::{Bookmark, BookmarkDraft, BookmarkId};
    use crate::storage::{MemoryBackend, StorageBackend};

    #[test]
    fn new_store_is_not_ready_until_loaded() {
        let mut store = BookmarkStore::new(MemoryBackend::new());
        assert!(!store.is_ready());
        assert_eq!(store.load().unwrap(), 0);
        assert!(store.is_ready());
        assert_eq!(store.storage_key(), STORAGE_KEY);
    }

    #[test]
    fn write_failure_keeps_in_memory_change() {
        let mut store = BookmarkStore::new(MemoryBackend::with_capacity(4));
        store.load().unwrap();

        let err = store
            .add(BookmarkDraft::new("Example", "https://example.com"))
            .unwrap_err();
        assert!(matches!(err, StoreError::WriteFailed(_)));
        assert_eq!(store.len(), 1);
        assert_eq!(store.backend().read(STORAGE_KEY).unwrap(), None);
    }

    #[test]
    fn encoded_snapshot_is_the_durable_json_array() {
        let bookmarks = vec![Bookmark::from_draft(
            BookmarkId::from("a"),
            BookmarkDraft::new("A", "https://a.example"),
        )];

        let bytes = encode_snapshot(&bookmarks).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            r#"[{"id":"a","name":"A","url1":"https://a.example"}]"#
        );
        assert_eq!(encode_snapshot(&[]).unwrap(), b"[]");
    }
}
