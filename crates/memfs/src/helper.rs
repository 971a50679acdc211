//! Convenience client over any [`FileSystem`].
//!
//! [`FsHelper`] wraps the handful of calls test code makes most: recursive
//! `mkdir`, `ls` that returns joined paths, text reads and writes. It works
//! the same over [`InMemoryFs`](crate::InMemoryFs) and
//! [`HostFs`](crate::HostFs).

use serde::Serialize;
use std::sync::Arc;

use crate::error::Result;
use crate::fs::{DirEntry, Encoding, FileSystem, MkdirOptions, ReadDirOptions, RmOptions};
use crate::path;

/// Flattened view of an entry's metadata, timestamps in epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatSummary {
    /// Last path segment
    pub name: String,
    /// True for directories
    pub dir: bool,
    /// Content size in bytes
    pub size: u64,
    /// Creation time
    pub ctime: u64,
    /// Last modification time
    pub mtime: u64,
    /// Last read time
    pub atime: u64,
}

/// Common filesystem operations with simplified signatures.
///
/// # Example
///
/// ```rust
/// use memfs::{FsHelper, InMemoryFs};
/// use std::sync::Arc;
///
/// # tokio_test::block_on(async {
/// let helper = FsHelper::new(Arc::new(InMemoryFs::new()));
/// helper.mkdir("out/logs").await?;
/// helper.write("out/logs/run.txt", "ok").await?;
///
/// assert_eq!(helper.ls("out", true).await?, vec!["logs", "logs/run.txt"]);
/// assert_eq!(helper.read_text("out/logs/run.txt").await?, "ok");
/// # Ok::<(), memfs::Error>(())
/// # }).unwrap();
/// ```
#[derive(Clone)]
pub struct FsHelper {
    fs: Arc<dyn FileSystem>,
}

impl FsHelper {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Underlying filesystem.
    pub fn fs(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    /// Describe the entry at `path`.
    pub async fn stat(&self, path: &str) -> Result<StatSummary> {
        let meta = self.fs.stat(path).await?;
        Ok(StatSummary {
            name: path::basename(path),
            dir: meta.is_dir(),
            size: meta.size,
            ctime: meta.created_ms(),
            mtime: meta.modified_ms(),
            atime: meta.accessed_ms(),
        })
    }

    /// Create `path` and any missing parents.
    pub async fn mkdir(&self, path: &str) -> Result<()> {
        self.fs.mkdir(path, MkdirOptions::recursive()).await
    }

    /// True if `path` resolves; any failure counts as absent.
    pub async fn exists(&self, path: &str) -> bool {
        self.fs.stat(path).await.is_ok()
    }

    /// True if `path` resolves to a directory.
    pub async fn is_dir(&self, path: &str) -> bool {
        self.fs
            .stat(path)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false)
    }

    /// Paths of the entries under `path`: `parent_path/name` for each one.
    pub async fn ls(&self, path: &str, recursive: bool) -> Result<Vec<String>> {
        let entries = self.fs.read_dir(path, ReadDirOptions { recursive }).await?;
        Ok(entries.iter().map(DirEntry::path).collect())
    }

    /// Remove `path`; see [`RmOptions`] for what each flag tolerates.
    pub async fn rm(&self, path: &str, options: RmOptions) -> Result<()> {
        self.fs.rm(path, options).await
    }

    /// Rename or move an entry.
    pub async fn mv(&self, from: &str, to: &str) -> Result<()> {
        self.fs.rename(from, to).await
    }

    /// Create or overwrite a file with text or bytes.
    pub async fn write(&self, path: &str, data: impl AsRef<[u8]>) -> Result<()> {
        self.fs.write_file(path, data.as_ref()).await
    }

    /// Read a file as UTF-8 text.
    pub async fn read_text(&self, path: &str) -> Result<String> {
        self.fs.read_file(path, Encoding::Utf8).await?.into_text()
    }

    /// Read a file as raw bytes.
    pub async fn read_bytes(&self, path: &str) -> Result<Vec<u8>> {
        Ok(self.fs.read_file(path, Encoding::Binary).await?.into_bytes())
    }
}
