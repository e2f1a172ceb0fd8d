//! In-process slot storage with an optional byte quota.

use super::{BackendError, BackendResult, StorageBackend};
use std::cell::RefCell;
use std::collections::HashMap;

/// Volatile backend holding slots in a map.
///
/// With a capacity set, the sum of all slot value sizes may not exceed it,
/// which mirrors browser storage quotas.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    slots: RefCell<HashMap<String, Vec<u8>>>,
    capacity: Option<usize>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend that rejects writes growing it past `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: RefCell::default(),
            capacity: Some(capacity),
        }
    }

    /// Seeds a slot directly, bypassing the quota.
    pub fn insert_raw(&self, key: impl Into<String>, value: impl Into<Vec<u8>>) {
        self.slots.borrow_mut().insert(key.into(), value.into());
    }

    /// Total bytes currently stored across slots.
    pub fn used_bytes(&self) -> usize {
        self.slots.borrow().values().map(Vec::len).sum()
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self, key: &str) -> BackendResult<Option<Vec<u8>>> {
        Ok(self.slots.borrow().get(key).cloned())
    }

    fn write(&self, key: &str, value: &[u8]) -> BackendResult<()> {
        let mut slots = self.slots.borrow_mut();
        if let Some(capacity) = self.capacity {
            let current = slots.get(key).map_or(0, Vec::len);
            let used: usize = slots.values().map(Vec::len).sum();
            let requested = used - current + value.len();
            if requested > capacity {
                return Err(BackendError::QuotaExceeded {
                    requested,
                    capacity,
                });
            }
        }
        slots.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryBackend;
    use crate::storage::{BackendError, StorageBackend};

    #[test]
    fn missing_slot_reads_as_none() {
        let backend = MemoryBackend::new();
        assert_eq!(backend.read("absent").unwrap(), None);
    }

    #[test]
    fn quota_counts_replaced_slot_once() {
        let backend = MemoryBackend::with_capacity(8);
        backend.write("slot", b"12345678").unwrap();
        backend.write("slot", b"abcdefgh").unwrap();
        assert_eq!(backend.used_bytes(), 8);

        let err = backend.write("other", b"x").unwrap_err();
        assert!(matches!(
            err,
            BackendError::QuotaExceeded {
                requested: 9,
                capacity: 8
            }
        ));
        assert_eq!(backend.read("slot").unwrap().as_deref(), Some(&b"abcdefgh"[..]));
    }
}
