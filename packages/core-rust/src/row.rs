//! Row model for the storage engine.
//!
//! A [`Row`] is one logical stored entry: key, value, creation timestamp,
//! and the persistence modifiers. [`RowSet`] is the engine's in-memory
//! collection of live rows: ordered by insertion, at most one row per key.
//!
//! The serialized shape matches the TypeScript client's `Row`: camelCase
//! fields, modifiers present only when set.

use serde::{Deserialize, Serialize};

use crate::types::Value;

fn is_false(flag: &bool) -> bool {
    !*flag
}

/// Persistence modifiers for a row, all unset by default.
///
/// Applied merge-with-defaults by `set`: only explicitly truthy flags and a
/// strictly positive `expires` make it onto the written row.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RowOptions {
    /// Row is eligible for session-scoped clearing (`clear` with the
    /// session flag).
    pub in_session: bool,
    /// Row is never written to the durable backing store; it disappears
    /// with the engine instance.
    pub in_memory: bool,
    /// Seconds after creation until reads treat the row as absent.
    pub expires: Option<f64>,
}

impl RowOptions {
    /// Modifiers for a session-scoped row.
    #[must_use]
    pub fn session() -> Self {
        Self {
            in_session: true,
            ..Self::default()
        }
    }

    /// Modifiers for an in-memory-only row.
    #[must_use]
    pub fn memory() -> Self {
        Self {
            in_memory: true,
            ..Self::default()
        }
    }

    /// Modifiers for a row expiring `seconds` after creation.
    #[must_use]
    pub fn expiring(seconds: f64) -> Self {
        Self {
            expires: Some(seconds),
            ..Self::default()
        }
    }
}

/// One logical stored entry.
///
/// `created_at` is stamped at write time and never mutated afterward; expiry
/// is a read-time computation against it, not a stored deadline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    /// Key of the entry, unique among live rows.
    pub key: String,
    /// Opaque payload chosen by the owning application.
    pub value: Value,
    /// Creation timestamp, milliseconds since the Unix epoch.
    pub created_at: i64,
    /// Eligible for session-scoped clearing.
    #[serde(default, skip_serializing_if = "is_false")]
    pub in_session: bool,
    /// Never persisted to the durable backing store.
    #[serde(default, skip_serializing_if = "is_false")]
    pub in_memory: bool,
    /// Seconds after `created_at` until reads treat the row as absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<f64>,
}

impl Row {
    /// Builds a row from a key, value, creation time, and modifiers.
    ///
    /// Only explicitly-set modifiers are recorded: `expires` is kept only
    /// when strictly positive, mirroring the client contract.
    #[must_use]
    pub fn new(key: impl Into<String>, value: Value, created_at: i64, options: RowOptions) -> Self {
        Self {
            key: key.into(),
            value,
            created_at,
            in_session: options.in_session,
            in_memory: options.in_memory,
            expires: options.expires.filter(|seconds| *seconds > 0.0),
        }
    }
}

/// Ordered, key-unique collection of live rows.
///
/// Order is insertion order; a write to an existing key removes the old row
/// and appends the replacement at the tail. Lookup is by key equality only;
/// order carries no meaning for `find`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowSet {
    rows: Vec<Row>,
}

impl RowSet {
    /// Creates an empty row set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live rows, expired ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the set holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Finds the row with the given key.
    #[must_use]
    pub fn find(&self, key: &str) -> Option<&Row> {
        self.rows.iter().find(|row| row.key == key)
    }

    /// Returns a new set without the row matching `key` (row order kept).
    #[must_use]
    pub fn excluding(&self, key: &str) -> Self {
        Self {
            rows: self
                .rows
                .iter()
                .filter(|row| row.key != key)
                .cloned()
                .collect(),
        }
    }

    /// Returns a new set with `row` written: any previous row under the same
    /// key is dropped and the new row is appended at the tail.
    #[must_use]
    pub fn with_row(&self, row: Row) -> Self {
        let mut next = self.excluding(&row.key);
        next.rows.push(row);
        next
    }

    /// Rows eligible for durable persistence (`in_memory` excluded), in order.
    #[must_use]
    pub fn durable_rows(&self) -> Vec<&Row> {
        self.rows.iter().filter(|row| !row.in_memory).collect()
    }

    /// Splits the set for a clear operation.
    ///
    /// With `session_only` false every row is removed; with it true only
    /// rows carrying the `in_session` modifier are. Returns the retained set
    /// and the removed keys in their original row order.
    #[must_use]
    pub fn split_cleared(&self, session_only: bool) -> (Self, Vec<String>) {
        let mut retained = Vec::new();
        let mut removed_keys = Vec::new();
        for row in &self.rows {
            if !session_only || row.in_session {
                removed_keys.push(row.key.clone());
            } else {
                retained.push(row.clone());
            }
        }
        (Self { rows: retained }, removed_keys)
    }

    /// Iterates the rows in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    /// Clones the rows out as a plain vector.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Row> {
        self.rows.clone()
    }
}

impl From<Vec<Row>> for RowSet {
    fn from(rows: Vec<Row>) -> Self {
        // Last write wins when the input carries duplicate keys, matching
        // the engine's own replace-then-append behavior.
        let mut set = Self::new();
        for row in rows {
            set = set.with_row(row);
        }
        set
    }
}

impl<'a> IntoIterator for &'a RowSet {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn row(key: &str) -> Row {
        Row::new(key, Value::from(key), 1_000, RowOptions::default())
    }

    #[test]
    fn with_row_replaces_existing_key_and_appends_at_tail() {
        let set = RowSet::new()
            .with_row(row("a"))
            .with_row(row("b"))
            .with_row(row("a"));

        let keys: Vec<&str> = set.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn excluding_removes_only_the_matching_key() {
        let set = RowSet::new().with_row(row("a")).with_row(row("b"));
        let without = set.excluding("a");
        assert!(without.find("a").is_none());
        assert!(without.find("b").is_some());

        // Unknown keys are a no-op.
        assert_eq!(set.excluding("missing").len(), 2);
    }

    #[test]
    fn durable_rows_skips_in_memory_rows() {
        let set = RowSet::new()
            .with_row(row("a"))
            .with_row(Row::new("b", Value::Null, 0, RowOptions::memory()));

        let durable: Vec<&str> = set.durable_rows().iter().map(|r| r.key.as_str()).collect();
        assert_eq!(durable, vec!["a"]);
    }

    #[test]
    fn split_cleared_full_reset_collects_every_key() {
        let set = RowSet::new().with_row(row("a")).with_row(row("b"));
        let (retained, removed) = set.split_cleared(false);
        assert!(retained.is_empty());
        assert_eq!(removed, vec!["a", "b"]);
    }

    #[test]
    fn split_cleared_session_only_retains_non_session_rows() {
        let set = RowSet::new()
            .with_row(row("key1"))
            .with_row(Row::new("key2", Value::Null, 0, RowOptions::session()))
            .with_row(Row::new("key3", Value::Null, 0, RowOptions::memory()));

        let (retained, removed) = set.split_cleared(true);
        let kept: Vec<&str> = retained.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(kept, vec!["key1", "key3"]);
        assert_eq!(removed, vec!["key2"]);
    }

    #[test]
    fn row_serializes_without_unset_modifiers() {
        let plain = Row::new("k", Value::from("v"), 5, RowOptions::default());
        let text = serde_json::to_string(&plain).unwrap();
        assert!(!text.contains("inSession"));
        assert!(!text.contains("inMemory"));
        assert!(!text.contains("expires"));
        assert!(text.contains("\"createdAt\":5"));
    }

    #[test]
    fn row_serializes_set_modifiers_camel_case() {
        let options = RowOptions {
            in_session: true,
            in_memory: true,
            expires: Some(10.0),
        };
        let text = serde_json::to_string(&Row::new("k", Value::Null, 0, options)).unwrap();
        assert!(text.contains("\"inSession\":true"));
        assert!(text.contains("\"inMemory\":true"));
        assert!(text.contains("\"expires\":10.0"));
    }

    #[test]
    fn non_positive_expires_is_dropped_at_row_construction() {
        let zero = Row::new("k", Value::Null, 0, RowOptions::expiring(0.0));
        assert_eq!(zero.expires, None);

        let negative = Row::new("k", Value::Null, 0, RowOptions::expiring(-5.0));
        assert_eq!(negative.expires, None);

        let positive = Row::new("k", Value::Null, 0, RowOptions::expiring(5.0));
        assert_eq!(positive.expires, Some(5.0));
    }

    #[test]
    fn row_set_round_trips_as_a_plain_json_array() {
        let set = RowSet::new().with_row(row("a")).with_row(row("b"));
        let text = serde_json::to_string(&set).unwrap();
        assert!(text.starts_with('['));

        let back: RowSet = serde_json::from_str(&text).unwrap();
        assert_eq!(back, set);
    }

    proptest! {
        /// Any write sequence leaves the set key-unique with the latest
        /// write for each key at or after every earlier survivor.
        #[test]
        fn writes_keep_keys_unique(keys in proptest::collection::vec("[a-d]", 0..32)) {
            let mut set = RowSet::new();
            for key in &keys {
                set = set.with_row(Row::new(
                    key.clone(),
                    Value::Null,
                    0,
                    RowOptions::default(),
                ));
            }

            let mut seen = std::collections::HashSet::new();
            for r in set.iter() {
                prop_assert!(seen.insert(r.key.clone()), "duplicate key {}", r.key);
            }

            let distinct: std::collections::HashSet<_> = keys.iter().cloned().collect();
            prop_assert_eq!(set.len(), distinct.len());
        }
    }
}
