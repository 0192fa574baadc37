//! Value watching on top of the subscribe/get contract.
//!
//! [`watch_values`] is the engine-side half of a reactive binding: it
//! subscribes to a store, filters events by the watched keys, re-reads the
//! current values, and hands them to a change callback. A UI adapter only
//! has to map that callback onto its own re-render mechanism.

use std::sync::Arc;

use rowstash_core::Value;

use crate::store::Store;
use crate::subscription::Subscription;

/// Invokes `on_change` with the current values of `keys` (in the given
/// order) whenever a mutation event touches any of them.
///
/// Only `set`/`remove`/`clear` events carry modified keys, so reads and
/// persistence events never trigger the callback. Values are re-read
/// through [`Store::get`], which means expiry applies and the callback can
/// observe `None` for a watched key that was cleared, removed, or expired.
///
/// The callback holds only a weak reference to the store: watching does
/// not keep the engine alive, and the subscription dies with it.
///
/// Initial values are not delivered; read them through [`Store::get`] at
/// attach time, the same way a UI binding reads them on first render.
pub fn watch_values(
    store: &Arc<Store>,
    keys: impl IntoIterator<Item = impl Into<String>>,
    on_change: impl Fn(&[Option<Value>]) + Send + Sync + 'static,
) -> Subscription {
    let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
    let weak = Arc::downgrade(store);

    store.subscribe(move |event| {
        let touched = event
            .modified_keys()
            .iter()
            .any(|modified| keys.contains(modified));
        if !touched {
            return;
        }
        if let Some(store) = weak.upgrade() {
            let values: Vec<Option<Value>> = keys.iter().map(|key| store.get(key)).collect();
            on_change(&values);
        }
    })
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;
    use rowstash_core::{ClockSource, ManualClock, RowOptions};

    use super::*;
    use crate::backends::MemoryBackend;
    use crate::factory::StoreFactory;
    use crate::store::ClearOptions;

    type Snapshots = Arc<Mutex<Vec<Vec<Option<Value>>>>>;

    fn collector() -> (Snapshots, impl Fn(&[Option<Value>]) + Send + Sync + 'static) {
        let snapshots: Snapshots = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&snapshots);
        (snapshots, move |values: &[Option<Value>]| {
            sink.lock().push(values.to_vec());
        })
    }

    #[test]
    fn fires_with_current_values_when_a_watched_key_changes() {
        let store = Arc::new(Store::open("app.storage", Arc::new(MemoryBackend::new())));
        let (snapshots, on_change) = collector();
        let _watch = watch_values(&store, ["name", "count"], on_change);

        store.set("name", "ada", RowOptions::default());

        assert_eq!(
            *snapshots.lock(),
            vec![vec![Some(Value::from("ada")), None]]
        );
    }

    #[test]
    fn ignores_unwatched_keys_and_non_mutation_events() {
        let store = Arc::new(Store::open("app.storage", Arc::new(MemoryBackend::new())));
        let (snapshots, on_change) = collector();
        let _watch = watch_values(&store, ["watched"], on_change);

        store.set("other", "x", RowOptions::default());
        let _ = store.get("watched");

        assert!(snapshots.lock().is_empty());
    }

    #[test]
    fn clear_reports_watched_keys_as_absent() {
        let store = Arc::new(Store::open("app.storage", Arc::new(MemoryBackend::new())));
        store.set("name", "ada", RowOptions::default());

        let (snapshots, on_change) = collector();
        let _watch = watch_values(&store, ["name"], on_change);

        store.clear(ClearOptions::default());

        assert_eq!(*snapshots.lock(), vec![vec![None]]);
    }

    #[test]
    fn remove_of_a_watched_key_fires_once() {
        let store = Arc::new(Store::open("app.storage", Arc::new(MemoryBackend::new())));
        store.set("name", "ada", RowOptions::default());

        let (snapshots, on_change) = collector();
        let _watch = watch_values(&store, ["name"], on_change);

        store.remove("name");
        store.remove("unwatched");

        assert_eq!(*snapshots.lock(), vec![vec![None]]);
    }

    #[test]
    fn expired_watched_values_are_observed_as_absent() {
        let clock = Arc::new(ManualClock::new(0));
        let store = Arc::new(
            StoreFactory::new(Arc::new(MemoryBackend::new()))
                .with_clock(Arc::clone(&clock) as Arc<dyn ClockSource>)
                .open("app.storage"),
        );
        store.set("timed", "v", RowOptions::expiring(10.0));

        let (snapshots, on_change) = collector();
        let _watch = watch_values(&store, ["timed"], on_change);

        clock.set(20_000);
        // Any mutation touching the watched key re-reads through expiry.
        store.set("timed", "v2", RowOptions::expiring(10.0));
        store.remove("timed");

        let seen = snapshots.lock();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], vec![Some(Value::from("v2"))]);
        assert_eq!(seen[1], vec![None]);
    }

    #[test]
    fn unsubscribing_stops_deliveries() {
        let store = Arc::new(Store::open("app.storage", Arc::new(MemoryBackend::new())));
        let (snapshots, on_change) = collector();
        let watch = watch_values(&store, ["name"], on_change);

        store.set("name", "first", RowOptions::default());
        watch.unsubscribe();
        store.set("name", "second", RowOptions::default());

        assert_eq!(snapshots.lock().len(), 1);
    }

    #[test]
    fn watching_does_not_keep_the_store_alive() {
        let store = Arc::new(Store::open("app.storage", Arc::new(MemoryBackend::new())));
        let (_snapshots, on_change) = collector();
        let _watch = watch_values(&store, ["name"], on_change);

        let weak = Arc::downgrade(&store);
        drop(store);
        assert!(weak.upgrade().is_none());
    }
}
