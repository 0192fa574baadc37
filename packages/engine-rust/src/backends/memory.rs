//! In-process [`StorageBackend`] backed by [`DashMap`].
//!
//! Durable for the lifetime of the process only. The default choice for
//! tests and for embeddings that want the full engine contract (events,
//! session semantics, expiry) without touching the filesystem.

use dashmap::DashMap;

use crate::backend::StorageBackend;

/// Process-lifetime string store over [`DashMap`].
///
/// Concurrent reads and writes need no external locking, so one
/// `MemoryBackend` can back many engines at once, each under its own
/// store key.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    blobs: DashMap<String, String>,
}

impl MemoryBackend {
    /// Creates a new, empty `MemoryBackend`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of store keys currently holding a blob.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    /// Whether no blob is stored at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.blobs.get(key).map(|blob| blob.clone()))
    }

    fn write(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.blobs.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
