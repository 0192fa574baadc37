//! Filesystem [`StorageBackend`] implementation.
//!
//! [`FileBackend`] keeps one file per store key under a root directory,
//! the closest native analog of a browser's local storage. Writes go
//! through a temp file in the same directory followed by a rename, so a
//! crash mid-write never truncates the previously stored blob.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::backend::StorageBackend;

/// Durable backend storing each key's blob as a file under a root directory.
///
/// Store keys are sanitized into filenames: characters outside
/// `[A-Za-z0-9._-]` map to `-`. Two keys that sanitize to the same name
/// share a file; picking collision-free store keys is the embedder's
/// responsibility.
#[derive(Debug, Clone)]
pub struct FileBackend {
    root: PathBuf,
}

impl FileBackend {
    /// Creates a backend rooted at `root`. The directory is created lazily
    /// on the first write, so constructing against a read-only or missing
    /// path is not itself an error.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory blobs are stored under.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn blob_path(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '-'
                }
            })
            .collect();
        self.root.join(format!("{name}.json"))
    }
}

impl StorageBackend for FileBackend {
    fn read(&self, key: &str) -> anyhow::Result<Option<String>> {
        let path = self.blob_path(key);
        match fs::read_to_string(&path) {
            Ok(blob) => Ok(Some(blob)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err).with_context(|| format!("reading {}", path.display())),
        }
    }

    fn write(&self, key: &str, value: &str) -> anyhow::Result<()> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("creating {}", self.root.display()))?;

        let path = self.blob_path(key);
        // Temp file in the same directory so the rename stays on one filesystem.
        let temp_path = path.with_extension(format!("json.tmp.{}", std::process::id()));
        if let Err(err) = fs::write(&temp_path, value) {
            let _ = fs::remove_file(&temp_path);
            return Err(err).with_context(|| format!("writing {}", temp_path.display()));
        }
        fs::rename(&temp_path, &path)
            .with_context(|| format!("replacing {}", path.display()))?;
        Ok(())
    }
}
