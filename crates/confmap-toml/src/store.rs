//! File-system seam for the provider's file operations.
//!
//! Providers never call `std::fs` directly; they go through a [`FileStore`]
//! so that save/load behavior (parent directories, unchanged-content skips)
//! can be tested against a mock.

use std::io;
use std::path::Path;

/// The few file operations a provider needs.  Handles are opened and closed
/// inside each call.
#[cfg_attr(test, mockall::automock)]
pub trait FileStore: Send + Sync {
    fn exists(&self, path: &Path) -> bool;

    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Replaces the file's contents, creating the file if needed.
    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    fn create_dir_all(&self, path: &Path) -> io::Result<()>;
}

/// [`FileStore`] backed by the local file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileStore;

impl FileStore for LocalFileStore {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        std::fs::write(path, contents)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }
}
