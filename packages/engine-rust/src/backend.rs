//! Durable backing-store capability consumed by the engine.
//!
//! Defines [`StorageBackend`], the minimal seam over whatever durable
//! key-value facility the platform offers (a browser's local storage, a
//! config directory, an app container). The engine reads one string blob at
//! construction and writes one on every mutation; it never assumes the
//! backend is available and converts every failure into a `warning` or
//! `loadError` event instead of propagating it.

/// Minimal durable key-value capability.
///
/// Both operations are synchronous and fallible: real backends fail for
/// mundane reasons (quota, disabled API, missing directory, read-only
/// mounts). Implementations report those failures through the `Result`; the
/// engine decides what they mean.
///
/// Used as `Arc<dyn StorageBackend>` so one backend can serve many engines.
pub trait StorageBackend: Send + Sync {
    /// Reads the blob stored under `key`, or `None` if nothing is stored.
    fn read(&self, key: &str) -> anyhow::Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous blob.
    fn write(&self, key: &str, value: &str) -> anyhow::Result<()>;
}
