//! Factory for opening fully-wired [`Store`] instances.
//!
//! [`StoreFactory`] is the dependency injection point: it holds the shared
//! [`StorageBackend`], the [`ClockSource`], and an optional constructor
//! listener, and each [`open()`](StoreFactory::open) call produces a new
//! engine under its own backing-store key. Engines opened from one factory
//! share the backend but own independent row sets and subscriber lists.

use std::sync::Arc;

use rowstash_core::{ClockSource, StorageEvent, SystemClock};

use crate::backend::StorageBackend;
use crate::store::Store;
use crate::subscription::EventListener;

/// Factory for opening [`Store`] instances against a shared backend.
///
/// Defaults: [`SystemClock`] and no constructor listener.
pub struct StoreFactory {
    backend: Arc<dyn StorageBackend>,
    clock: Arc<dyn ClockSource>,
    listener: Option<EventListener>,
}

impl StoreFactory {
    /// Creates a factory over `backend` with default wiring.
    #[must_use]
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            backend,
            clock: Arc::new(SystemClock),
            listener: None,
        }
    }

    /// Replaces the clock used to stamp rows and compute expiry.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn ClockSource>) -> Self {
        self.clock = clock;
        self
    }

    /// Installs the constructor listener.
    ///
    /// The listener receives every event of every engine this factory
    /// opens, always before that engine's dynamic subscribers, including
    /// the load-path events, which no dynamic subscriber can observe.
    #[must_use]
    pub fn with_listener(
        mut self,
        listener: impl Fn(&StorageEvent) + Send + Sync + 'static,
    ) -> Self {
        self.listener = Some(Arc::new(listener));
        self
    }

    /// Opens an engine persisted under `key`, running the load protocol.
    ///
    /// Never fails; load-path trouble is reported through events only.
    #[must_use]
    pub fn open(&self, key: impl Into<String>) -> Store {
        Store::assemble(
            key.into(),
            Arc::clone(&self.backend),
            Arc::clone(&self.clock),
            self.listener.clone(),
        )
    }
}
