//! Read-only file/config store used to assemble the project context.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::{CoreError, Result};

/// Key-path lookups for rule documents, cache files and JSON config.
///
/// `read_text` returns `Ok(None)` when the resource does not exist; other
/// failures are errors and are handled by the loader.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Fails when the store as a whole cannot be reached.
    async fn check_available(&self) -> Result<()>;

    /// Reads a resource as text.
    async fn read_text(&self, relative: &Path) -> Result<Option<String>>;
}

/// File store backed by a directory on disk.
#[derive(Debug, Clone)]
pub struct FsFileStore {
    root: PathBuf,
}

impl FsFileStore {
    /// Creates a store reading below `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl FileStore for FsFileStore {
    async fn check_available(&self) -> Result<()> {
        match tokio::fs::metadata(&self.root).await {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(CoreError::StoreUnavailable(format!(
                "{} is not a directory",
                self.root.display()
            ))),
            Err(e) => Err(CoreError::StoreUnavailable(format!(
                "{}: {}",
                self.root.display(),
                e
            ))),
        }
    }

    async fn read_text(&self, relative: &Path) -> Result<Option<String>> {
        let path = self.root.join(relative);
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(CoreError::Read { path, source }),
        }
    }
}
