//! Host-directory filesystem.
//!
//! [`HostFs`] exposes a directory of the real filesystem through the same
//! [`FileSystem`] trait as [`InMemoryFs`](super::InMemoryFs), so a suite of
//! tests can run once against memory and once against disk.
//!
//! Paths are normalized before they are joined onto the root, and `..` is
//! clamped there, so no call reaches outside the root directory. Symlinks
//! inside the root are followed by the host as usual.
//!
//! The host's own rules are tightened where they diverge from the in-memory
//! store:
//!
//! | Operation | Check |
//! |-----------|-------|
//! | `rename` | An occupied destination is removed first, whatever its type |
//! | `rename` | The root, or a directory into its own subtree, is rejected |
//! | `mkdir -p` | A file anywhere on the path fails with "not a directory" |
//! | `read_dir` | Entries come back sorted by name |
//! | `rm -r .` | Empties the root directory but keeps it |

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

use super::traits::{
    Content, DirEntry, Encoding, FileSystem, FileType, Metadata, MkdirOptions, ReadDirOptions,
    RmOptions,
};
use crate::error::{Error, Result};
use crate::logging_impl::{fs_debug, fs_trace, LogConfig};
use crate::path;

/// Suffix source for staging names used by `rename`.
static STAGING_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Filesystem rooted at a host directory.
///
/// # Example
///
/// ```rust,no_run
/// use memfs::{FileSystem, HostFs, ReadDirOptions};
///
/// # tokio_test::block_on(async {
/// let fs = HostFs::new("/tmp/fixtures");
/// for entry in fs.read_dir(".", ReadDirOptions::recursive()).await? {
///     println!("{}", entry.path());
/// }
/// # Ok::<(), memfs::Error>(())
/// # }).unwrap();
/// ```
pub struct HostFs {
    root: PathBuf,
    log_config: LogConfig,
}

impl HostFs {
    /// Expose `root`. The directory is not created or checked here.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            log_config: LogConfig::default(),
        }
    }

    /// Replace the logging configuration.
    pub fn with_log_config(mut self, log_config: LogConfig) -> Self {
        self.log_config = log_config;
        self
    }

    /// Host directory backing `.`.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Host path for a normalized relative path.
    fn host_path(&self, normalized: &str) -> PathBuf {
        path::segments(normalized).fold(self.root.clone(), |acc, seg| acc.join(seg))
    }

    async fn metadata_of(&self, normalized: &str) -> Result<std::fs::Metadata> {
        tokio::fs::metadata(self.host_path(normalized))
            .await
            .map_err(|e| Error::from_io(e, normalized))
    }

    async fn file_type_of(&self, normalized: &str) -> Result<Option<FileType>> {
        match tokio::fs::metadata(self.host_path(normalized)).await {
            Ok(meta) if meta.is_dir() => Ok(Some(FileType::Directory)),
            Ok(_) => Ok(Some(FileType::File)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::from_io(e, normalized)),
        }
    }

    /// Entries of one directory, sorted by name.
    async fn entries(&self, normalized: &str) -> Result<Vec<(String, FileType)>> {
        let mut reader = tokio::fs::read_dir(self.host_path(normalized))
            .await
            .map_err(|e| Error::from_io(e, normalized))?;

        let mut entries = Vec::new();
        while let Some(entry) = reader
            .next_entry()
            .await
            .map_err(|e| Error::from_io(e, normalized))?
        {
            let name = entry.file_name().to_string_lossy().into_owned();
            let file_type = match entry.file_type().await {
                Ok(ft) if ft.is_dir() => FileType::Directory,
                Ok(ft) if ft.is_symlink() => {
                    let target = path::join(normalized, &name);
                    self.file_type_of(&target).await?.unwrap_or(FileType::File)
                }
                Ok(_) => FileType::File,
                Err(e) => return Err(Error::from_io(e, normalized)),
            };
            entries.push((name, file_type));
        }
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(entries)
    }

    async fn move_entry(&self, from: &str, to: &str) -> Result<()> {
        tokio::fs::rename(self.host_path(from), self.host_path(to))
            .await
            .map_err(|e| Error::from_io(e, from))
    }

    /// Unused sibling of `normalized` to park an entry during a rename.
    fn staging_path(&self, normalized: &str) -> String {
        let parent = path::dirname(normalized);
        loop {
            let id = STAGING_COUNTER.fetch_add(1, Ordering::Relaxed);
            let candidate = path::join(
                &parent,
                &format!(".memfs-rename-{}-{}", std::process::id(), id),
            );
            if !self.host_path(&candidate).exists() {
                return candidate;
            }
        }
    }

    async fn remove_entry(&self, normalized: &str, file_type: FileType) -> Result<()> {
        let host = self.host_path(normalized);
        let result = match file_type {
            FileType::Directory => tokio::fs::remove_dir_all(&host).await,
            FileType::File => tokio::fs::remove_file(&host).await,
        };
        result.map_err(|e| Error::from_io(e, normalized))
    }

    async fn remove(&self, normalized: &str, options: RmOptions) -> Result<()> {
        let meta = self.metadata_of(normalized).await?;
        if !meta.is_dir() {
            return self.remove_entry(normalized, FileType::File).await;
        }

        let populated = !self.entries(normalized).await?.is_empty();
        match (options.recursive, options.force) {
            (false, false) if populated => Err(Error::NotEmpty(normalized.to_string())),
            (false, true) if populated => Ok(()),
            (true, _) if normalized == "." => {
                for (name, file_type) in self.entries(normalized).await? {
                    self.remove_entry(&name, file_type).await?;
                }
                Ok(())
            }
            (true, _) => self.remove_entry(normalized, FileType::Directory).await,
            (false, _) if normalized == "." => Ok(()),
            (false, _) => tokio::fs::remove_dir(self.host_path(normalized))
                .await
                .map_err(|e| Error::from_io(e, normalized)),
        }
    }
}

fn timestamp(time: io::Result<SystemTime>, fallback: SystemTime) -> SystemTime {
    time.unwrap_or(fallback)
}

#[async_trait]
impl FileSystem for HostFs {
    async fn stat(&self, path: &str) -> Result<Metadata> {
        let path = path::normalize(path);
        let meta = self.metadata_of(&path).await?;

        let modified = timestamp(meta.modified(), SystemTime::UNIX_EPOCH);
        let file_type = if meta.is_dir() {
            FileType::Directory
        } else {
            FileType::File
        };
        Ok(Metadata {
            name: path::basename(&path),
            file_type,
            size: if meta.is_dir() { 0 } else { meta.len() },
            created: timestamp(meta.created(), modified),
            modified,
            accessed: timestamp(meta.accessed(), modified),
        })
    }

    async fn mkdir(&self, path: &str, options: MkdirOptions) -> Result<()> {
        let path = path::normalize(path);
        fs_debug!("mkdir {} (host)", self.log_config.format_path(&path));

        if !options.recursive {
            return tokio::fs::create_dir(self.host_path(&path))
                .await
                .map_err(|e| Error::from_io(e, &path));
        }

        let mut walked = String::from(".");
        for segment in path::segments(&path) {
            walked = path::join(&walked, segment);
            match self.file_type_of(&walked).await? {
                Some(FileType::Directory) => continue,
                Some(FileType::File) => return Err(Error::NotADirectory(walked)),
                None => tokio::fs::create_dir(self.host_path(&walked))
                    .await
                    .map_err(|e| Error::from_io(e, &walked))?,
            }
        }
        Ok(())
    }

    async fn read_dir(&self, path: &str, options: ReadDirOptions) -> Result<Vec<DirEntry>> {
        let path = path::normalize(path);
        if !self.metadata_of(&path).await?.is_dir() {
            return Err(Error::NotADirectory(path));
        }

        if !options.recursive {
            let entries = self.entries(&path).await?;
            return Ok(entries
                .into_iter()
                .map(|(name, file_type)| DirEntry {
                    name,
                    parent_path: path.clone(),
                    file_type,
                })
                .collect());
        }

        // Pre-order walk: each frame is a directory relative to the listing
        // root plus its remaining entries, reversed so `pop` yields name order.
        let mut out = Vec::new();
        let mut first = self.entries(&path).await?;
        first.reverse();
        let mut stack = vec![(String::from("."), first)];

        while let Some((parent, mut pending)) = stack.pop() {
            let Some((name, file_type)) = pending.pop() else {
                continue;
            };
            let child = path::join(&parent, &name);
            out.push(DirEntry {
                name,
                parent_path: parent.clone(),
                file_type,
            });
            stack.push((parent, pending));

            if file_type.is_dir() {
                let mut nested = self.entries(&path::join(&path, &child)).await?;
                nested.reverse();
                stack.push((child, nested));
            }
        }
        Ok(out)
    }

    async fn rename(&self, from: &str, to: &str) -> Result<()> {
        let from = path::normalize(from);
        let to = path::normalize(to);

        if from == "." || to == "." {
            return Err(Error::InvalidOperation("cannot rename the root".to_string()));
        }
        let source = self.metadata_of(&from).await?;
        let parent = path::dirname(&to);
        if !self.metadata_of(&parent).await?.is_dir() {
            return Err(Error::NotADirectory(parent));
        }
        if from == to {
            return Ok(());
        }
        if source.is_dir() && to.starts_with(&format!("{}/", from)) {
            return Err(Error::InvalidOperation(format!(
                "cannot move {} into itself",
                from
            )));
        }

        fs_debug!(
            "rename {} -> {} (host)",
            self.log_config.format_path(&from),
            self.log_config.format_path(&to)
        );
        let Some(occupant) = self.file_type_of(&to).await? else {
            return self.move_entry(&from, &to).await;
        };
        fs_debug!("rename replaced {} (host)", self.log_config.format_path(&to));
        let staging = self.staging_path(&to);

        if from.starts_with(&format!("{}/", to)) {
            // the source lives inside the occupant: lift it out first
            self.move_entry(&from, &staging).await?;
            if let Err(err) = self.remove_entry(&to, occupant).await {
                if let Err(undo) = self.move_entry(&staging, &from).await {
                    fs_trace!("rename rollback failed: {}", undo);
                }
                return Err(err);
            }
            return self.move_entry(&staging, &to).await;
        }

        self.move_entry(&to, &staging).await?;
        if let Err(err) = self.move_entry(&from, &to).await {
            if let Err(undo) = self.move_entry(&staging, &to).await {
                fs_trace!("rename rollback failed: {}", undo);
            }
            return Err(err);
        }
        self.remove_entry(&staging, occupant).await
    }

    async fn write_file(&self, path: &str, content: &[u8]) -> Result<()> {
        let path = path::normalize(path);
        if self.file_type_of(&path).await? == Some(FileType::Directory) {
            return Err(Error::IsADirectory(path));
        }

        fs_debug!(
            "write_file {} {} (host)",
            self.log_config.format_path(&path),
            self.log_config.format_content(content)
        );
        tokio::fs::write(self.host_path(&path), content)
            .await
            .map_err(|e| Error::from_io(e, &path))
    }

    async fn read_file(&self, path: &str, encoding: Encoding) -> Result<Content> {
        let path = path::normalize(path);
        if self.file_type_of(&path).await? == Some(FileType::Directory) {
            return Err(Error::IsADirectory(path));
        }
        let bytes = tokio::fs::read(self.host_path(&path))
            .await
            .map_err(|e| Error::from_io(e, &path))?;
        Content::decode(bytes, encoding, &path)
    }

    async fn rm(&self, path: &str, options: RmOptions) -> Result<()> {
        let path = path::normalize(path);
        fs_debug!(
            "rm {} recursive={} force={} (host)",
            self.log_config.format_path(&path),
            options.recursive,
            options.force
        );

        let result = self.remove(&path, options).await;
        if let Err(err) = &result {
            fs_trace!("rm {}: {} (host)", self.log_config.format_path(&path), err);
        }
        options.settle(result)
    }
}
