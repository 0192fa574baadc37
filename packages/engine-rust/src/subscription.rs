//! Subscriber registry and unsubscribe handles.
//!
//! The engine fans every [`StorageEvent`] out to an ordered list of
//! callbacks, the way a composite observer fans out mutation notifications.
//! Emission walks a snapshot of the list taken under the lock and invokes
//! the callbacks after releasing it, so a callback may unsubscribe (itself
//! or others) or re-enter the engine without affecting delivery of the
//! event currently being dispatched.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use rowstash_core::StorageEvent;

/// Callback invoked with every event emitted after its registration.
pub type EventListener = Arc<dyn Fn(&StorageEvent) + Send + Sync>;

/// Ordered set of subscriber callbacks, keyed by registration id.
#[derive(Default)]
pub(crate) struct SubscriberRegistry {
    next_id: u64,
    entries: Vec<(u64, EventListener)>,
}

impl SubscriberRegistry {
    /// Registers a callback at the tail of the list, returning its id.
    pub(crate) fn add(&mut self, listener: EventListener) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    /// Removes the callback registered under `id`. Unknown ids are a no-op.
    pub(crate) fn remove(&mut self, id: u64) {
        self.entries.retain(|(entry_id, _)| *entry_id != id);
    }

    /// Clones the callback list in registration order.
    pub(crate) fn snapshot(&self) -> Vec<EventListener> {
        self.entries
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Handle returned by `Store::subscribe`.
///
/// [`unsubscribe`](Subscription::unsubscribe) removes exactly the callback
/// this handle was created for; calling it more than once is a no-op.
/// Dropping the handle does NOT unsubscribe: a subscription with a
/// discarded handle stays active for the engine's lifetime, matching the
/// TypeScript client where the returned unsubscribe closure is ignorable.
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<SubscriberRegistry>>,
}

impl Subscription {
    pub(crate) fn new(id: u64, registry: Weak<Mutex<SubscriberRegistry>>) -> Self {
        Self { id, registry }
    }

    /// Removes this subscription's callback from the engine.
    ///
    /// Safe to call during event dispatch: the event being delivered was
    /// snapshotted beforehand and still reaches every callback it was
    /// snapshotted with.
    pub fn unsubscribe(&self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.lock().remove(self.id);
        }
    }
}
