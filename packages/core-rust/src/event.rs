//! Lifecycle events emitted by the storage engine.
//!
//! Every operation on the engine produces events in a fixed order (load-path
//! events at construction, then `save` before `set`/`remove`/`clear` for
//! each mutation). The serialized shape mirrors the TypeScript client's
//! `{ code, modifiedKeys?, payload? }` events: a camelCase `code` tag plus
//! camelCase payload fields.

use serde::{Deserialize, Serialize};

use crate::row::Row;
use crate::types::Value;

/// One engine lifecycle event.
///
/// Reactive consumers usually ignore everything except
/// [`modified_keys`](StorageEvent::modified_keys) and re-read values through
/// the engine; the payloads exist for logging and diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum StorageEvent {
    /// The durable backing store failed on read or write; the engine
    /// continues with degraded persistence.
    Warning {
        /// Human-readable description of the failure.
        message: String,
    },
    /// The stored blob was unparseable or not a sequence at load; the
    /// engine fell back to an empty row set.
    LoadError {
        /// Human-readable description of the corruption.
        message: String,
    },
    /// Emitted exactly once after the construction-time load attempt.
    Load {
        /// The row set the engine starts with (recovered or empty).
        rows: Vec<Row>,
    },
    /// Emitted after every `get`, hit or miss.
    Get {
        /// The key that was looked up.
        key: String,
        /// The resolved value; `None` on miss or read-time expiry.
        value: Option<Value>,
    },
    /// Emitted after every persistence attempt during set/remove/clear.
    Save {
        /// The full new row set, in-memory rows included.
        rows: Vec<Row>,
    },
    /// Emitted after a `set` completes (always after its `Save`).
    Set {
        /// The freshly written row.
        row: Row,
    },
    /// Emitted after a `remove` completes (always after its `Save`).
    Remove {
        /// The removed key.
        key: String,
    },
    /// Emitted after a `clear` completes (always after its `Save`).
    Clear {
        /// Echo of the session flag the clear ran with.
        in_session: bool,
        /// Keys of the removed rows, in their original row order.
        removed_keys: Vec<String>,
    },
}

impl StorageEvent {
    /// The wire code of this event (`warning`, `loadError`, `load`, `get`,
    /// `save`, `set`, `remove`, `clear`).
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Warning { .. } => "warning",
            Self::LoadError { .. } => "loadError",
            Self::Load { .. } => "load",
            Self::Get { .. } => "get",
            Self::Save { .. } => "save",
            Self::Set { .. } => "set",
            Self::Remove { .. } => "remove",
            Self::Clear { .. } => "clear",
        }
    }

    /// Keys touched by the mutation this event reports.
    ///
    /// Non-empty only for `Set`, `Remove`, and `Clear`: the events a
    /// reactive binding filters on before re-reading values.
    #[must_use]
    pub fn modified_keys(&self) -> &[String] {
        match self {
            Self::Set { row } => std::slice::from_ref(&row.key),
            Self::Remove { key } => std::slice::from_ref(key),
            Self::Clear { removed_keys, .. } => removed_keys,
            _ => &[],
        }
    }
}
