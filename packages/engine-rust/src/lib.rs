//! Rowstash Engine — client-side key/value persistence with tiered storage.
//!
//! Provides the storage engine and its collaborators:
//!
//! - [`Store`]: the engine. Owns the in-memory row set, runs the
//!   load/save/mutate protocol, computes expiry at read time, and emits the
//!   ordered event stream
//! - [`StorageBackend`]: the minimal durable-store capability the engine
//!   persists through, with [`backends`] providing memory, file, and no-op
//!   implementations
//! - [`StoreFactory`]: dependency injection for backend, clock, and the
//!   constructor listener
//! - [`Subscription`] / [`watch_values`]: the change-notification contract
//!   reactive bindings build on

pub mod backend;
pub mod backends;
pub mod factory;
pub mod store;
pub mod subscription;
pub mod watch;

pub use backend::StorageBackend;
pub use backends::{FileBackend, MemoryBackend, NullBackend};
pub use factory::StoreFactory;
pub use store::{ClearOptions, Store};
pub use subscription::{EventListener, Subscription};
pub use watch::watch_values;

// The shared vocabulary crate, re-exported for embedders that only want one
// dependency edge.
pub use rowstash_core as core;
