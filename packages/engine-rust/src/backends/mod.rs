//! Bundled [`StorageBackend`](crate::StorageBackend) implementations.

mod file;
mod memory;
mod null;

pub use file::FileBackend;
pub use memory::MemoryBackend;
pub use null::NullBackend;
