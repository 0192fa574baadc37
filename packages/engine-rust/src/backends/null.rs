//! No-op [`StorageBackend`] implementation.
//!
//! [`NullBackend`] discards all writes and reads nothing, forcing an engine
//! into pure in-memory operation. Useful for ephemeral stores and for tests
//! that only care about the event stream.

use crate::backend::StorageBackend;

/// No-op backend: every write succeeds without effect, every read is empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBackend;

impl StorageBackend for NullBackend {
    fn read(&self, _key: &str) -> anyhow::Result<Option<String>> {
        Ok(None)
    }

    fn write(&self, _key: &str, _value: &str) -> anyhow::Result<()> {
        Ok(())
    }
}
