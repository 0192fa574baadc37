//! The storage engine.
//!
//! [`Store`] owns the authoritative in-memory row set for its lifetime. At
//! construction it loads the row set from the backing store, tolerating and
//! reporting corruption; every mutation produces a new row set, persists the
//! durable subset, and emits events in a fixed order (`save` before the
//! operation's own event). Expiry is computed at read time and never removes
//! anything.
//!
//! Failures never reach the caller: backing-store trouble becomes a
//! `warning` event, corrupt stored data becomes a `loadError` event, and the
//! engine carries on with whatever rows it has.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rowstash_core::{ClockSource, Row, RowOptions, RowSet, StorageEvent, Value};

use crate::backend::StorageBackend;
use crate::factory::StoreFactory;
use crate::subscription::{EventListener, SubscriberRegistry, Subscription};

/// Options for [`Store::clear`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClearOptions {
    /// Remove only rows written with the session modifier; everything else
    /// is retained. Defaults to `false` (full reset).
    pub in_session: bool,
}

impl ClearOptions {
    /// Options for a session-scoped clear.
    #[must_use]
    pub fn session() -> Self {
        Self { in_session: true }
    }
}

/// Why the construction-time load fell back to the empty row set.
///
/// Each variant maps to exactly one event code: `Unavailable` to `warning`,
/// the other two to `loadError`.
#[derive(Debug, thiserror::Error)]
pub(crate) enum LoadFailure {
    /// The backing store could not be read at all.
    #[error("storage backend unavailable: {0:#}")]
    Unavailable(anyhow::Error),
    /// The stored blob was not parseable.
    #[error("unexpected data in backing store: {0}")]
    Corrupted(#[from] serde_json::Error),
    /// The stored blob parsed, but not to a sequence of rows.
    #[error("unexpected data in backing store: not a sequence")]
    NotASequence,
}

/// Client-side key/value store with tiered persistence and an event stream.
///
/// One `Store` instance corresponds to one key in the backing store and owns
/// one in-memory row set. All operations are synchronous and run to
/// completion; interior locks make the store shareable behind `Arc`, but no
/// atomicity is promised across operations for concurrent mutators; that
/// discipline belongs to the embedding application.
pub struct Store {
    key: String,
    backend: Arc<dyn StorageBackend>,
    clock: Arc<dyn ClockSource>,
    listener: Option<EventListener>,
    rows: RwLock<RowSet>,
    subscribers: Arc<Mutex<SubscriberRegistry>>,
}

impl Store {
    /// Opens a store under `key` with default wiring (system clock, no
    /// constructor listener). Use [`StoreFactory`] to customize.
    ///
    /// Construction never fails; load-path trouble surfaces as `warning` /
    /// `loadError` events followed by the one `load` event.
    #[must_use]
    pub fn open(key: impl Into<String>, backend: Arc<dyn StorageBackend>) -> Self {
        StoreFactory::new(backend).open(key)
    }

    /// Assembles a store and runs the load protocol. Factory-internal.
    pub(crate) fn assemble(
        key: String,
        backend: Arc<dyn StorageBackend>,
        clock: Arc<dyn ClockSource>,
        listener: Option<EventListener>,
    ) -> Self {
        let store = Self {
            key,
            backend,
            clock,
            listener,
            rows: RwLock::new(RowSet::new()),
            subscribers: Arc::new(Mutex::new(SubscriberRegistry::default())),
        };
        store.load_initial();
        store
    }

    /// The backing-store key this engine persists under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    // --- Reads ---

    /// Looks up the value stored under `key`.
    ///
    /// A row past its expiry window is treated as absent without being
    /// removed: the boundary is strict, so a row read exactly `expires`
    /// seconds after creation is still returned. Emits a `get` event after
    /// resolving, hit and miss alike. Does not mutate state.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        let now = self.clock.now_millis();
        let value = {
            let rows = self.rows.read();
            rows.find(key).and_then(|row| match row.expires {
                Some(expires) => {
                    // Millisecond deltas are far below 2^52, so the cast is exact.
                    #[allow(clippy::cast_precision_loss)]
                    let elapsed_seconds = (now - row.created_at) as f64 / 1000.0;
                    (elapsed_seconds <= expires).then(|| row.value.clone())
                }
                None => Some(row.value.clone()),
            })
        };

        self.emit(&StorageEvent::Get {
            key: key.to_string(),
            value: value.clone(),
        });
        value
    }

    /// The full current in-memory row set: durable-origin and
    /// in-memory-only rows alike, in insertion order.
    ///
    /// No event is emitted and no expiry filtering is applied; expired
    /// rows stay visible here until removed or cleared.
    #[must_use]
    pub fn get_all(&self) -> Vec<Row> {
        self.rows.read().to_vec()
    }

    // --- Mutations ---

    /// Writes `value` under `key`, replacing any existing row.
    ///
    /// The new row is stamped with the current clock time and appended at
    /// the tail; only explicitly-set modifiers are recorded. Emits `save`
    /// (after persisting the durable subset) and then `set`.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>, options: RowOptions) {
        let row = Row::new(key, value.into(), self.clock.now_millis(), options);
        let new_rows = self.rows.read().with_row(row.clone());
        self.save(new_rows);
        self.emit(&StorageEvent::Set { row });
    }

    /// Removes the row under `key`, if any.
    ///
    /// Persists and emits `save` then `remove` even when the key was
    /// absent.
    pub fn remove(&self, key: &str) {
        let new_rows = self.rows.read().excluding(key);
        self.save(new_rows);
        self.emit(&StorageEvent::Remove {
            key: key.to_string(),
        });
    }

    /// Removes all rows, or only session-scoped ones.
    ///
    /// With default options every row goes; with
    /// [`ClearOptions::session`] only rows carrying the `in_session`
    /// modifier are removed. Emits `save` then `clear` carrying the removed
    /// keys in their original row order.
    pub fn clear(&self, options: ClearOptions) {
        let (retained, removed_keys) = self.rows.read().split_cleared(options.in_session);
        self.save(retained);
        self.emit(&StorageEvent::Clear {
            in_session: options.in_session,
            removed_keys,
        });
    }

    // --- Subscriptions ---

    /// Registers `callback` for every event emitted after this call.
    ///
    /// Callbacks run in registration order, always after the constructor
    /// listener. The returned handle removes exactly this callback;
    /// dropping it without calling unsubscribe leaves the subscription
    /// active.
    pub fn subscribe(
        &self,
        callback: impl Fn(&StorageEvent) + Send + Sync + 'static,
    ) -> Subscription {
        let id = self.subscribers.lock().add(Arc::new(callback));
        Subscription::new(id, Arc::downgrade(&self.subscribers))
    }

    // --- Internals ---

    /// Runs the construction-time load protocol.
    fn load_initial(&self) {
        let blob = match self.backend.read(&self.key) {
            Ok(blob) => blob,
            Err(err) => {
                let failure = LoadFailure::Unavailable(err);
                tracing::warn!(store_key = %self.key, error = %failure, "backing store read failed");
                self.emit(&StorageEvent::Warning {
                    message: failure.to_string(),
                });
                None
            }
        };

        let rows = match Self::parse_rows(blob.as_deref()) {
            Ok(rows) => rows,
            Err(failure) => {
                tracing::warn!(store_key = %self.key, error = %failure, "discarding stored rows");
                self.emit(&StorageEvent::LoadError {
                    message: failure.to_string(),
                });
                RowSet::new()
            }
        };

        tracing::debug!(store_key = %self.key, rows = rows.len(), "row set loaded");
        *self.rows.write() = rows.clone();
        self.emit(&StorageEvent::Load {
            rows: rows.to_vec(),
        });
    }

    /// Parses a stored blob into a row set.
    ///
    /// An absent or empty blob is a valid empty store, not corruption.
    fn parse_rows(blob: Option<&str>) -> Result<RowSet, LoadFailure> {
        let raw = match blob {
            Some(raw) if !raw.is_empty() => raw,
            _ => return Ok(RowSet::new()),
        };

        let parsed: serde_json::Value = serde_json::from_str(raw)?;
        if !parsed.is_array() {
            return Err(LoadFailure::NotASequence);
        }
        let rows: Vec<Row> = serde_json::from_value(parsed)?;
        Ok(RowSet::from(rows))
    }

    /// Persists the durable subset of `new_rows`, swaps the in-memory row
    /// set, and emits `save`.
    ///
    /// A write failure emits a `warning` but does not roll back the
    /// in-memory update: the engine degrades to in-memory-only behavior.
    fn save(&self, new_rows: RowSet) {
        match serde_json::to_string(&new_rows.durable_rows()) {
            Ok(serialized) => {
                if let Err(err) = self.backend.write(&self.key, &serialized) {
                    let message = format!("storage backend unavailable: {err:#}");
                    tracing::warn!(store_key = %self.key, error = %message, "backing store write failed; keeping in-memory rows");
                    self.emit(&StorageEvent::Warning { message });
                }
            }
            Err(err) => {
                let message = format!("could not serialize rows: {err}");
                tracing::warn!(store_key = %self.key, error = %message, "row serialization failed");
                self.emit(&StorageEvent::Warning { message });
            }
        }

        tracing::debug!(store_key = %self.key, rows = new_rows.len(), "row set saved");
        *self.rows.write() = new_rows.clone();
        self.emit(&StorageEvent::Save {
            rows: new_rows.to_vec(),
        });
    }

    /// Delivers an event: constructor listener first, then a snapshot of
    /// the dynamic subscribers in registration order.
    ///
    /// No lock is held while callbacks run, so they may re-enter the engine
    /// or unsubscribe without affecting the event being delivered.
    fn emit(&self, event: &StorageEvent) {
        if let Some(listener) = &self.listener {
            listener(event);
        }
        let snapshot = self.subscribers.lock().snapshot();
        for subscriber in snapshot {
            subscriber(event);
        }
    }
}
