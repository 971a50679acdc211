//! Filesystem trait definitions

use async_trait::async_trait;
use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{Error, ErrorKind, Result};
use crate::path;

/// Async filesystem trait.
///
/// Implemented by [`InMemoryFs`](super::InMemoryFs) and
/// [`HostFs`](super::HostFs); code written against `dyn FileSystem` can swap
/// one for the other. Paths are `/`-separated strings relative to the
/// implementation's root, which is spelled `.`.
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Get metadata for a file or directory.
    async fn stat(&self, path: &str) -> Result<Metadata>;

    /// Create a directory.
    async fn mkdir(&self, path: &str, options: MkdirOptions) -> Result<()>;

    /// List directory entries.
    async fn read_dir(&self, path: &str, options: ReadDirOptions) -> Result<Vec<DirEntry>>;

    /// Rename/move a file or directory.
    async fn rename(&self, from: &str, to: &str) -> Result<()>;

    /// Create or overwrite a file.
    async fn write_file(&self, path: &str, content: &[u8]) -> Result<()>;

    /// Read a file's contents.
    async fn read_file(&self, path: &str, encoding: Encoding) -> Result<Content>;

    /// Remove a file or directory.
    async fn rm(&self, path: &str, options: RmOptions) -> Result<()>;

    /// Check if a path exists.
    async fn exists(&self, path: &str) -> Result<bool> {
        match self.stat(path).await {
            Ok(_) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err),
        }
    }
}

/// Options for [`FileSystem::mkdir`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MkdirOptions {
    /// Create missing parents and accept an existing directory.
    pub recursive: bool,
}

impl MkdirOptions {
    /// `mkdir -p` semantics.
    pub fn recursive() -> Self {
        Self { recursive: true }
    }
}

/// Options for [`FileSystem::read_dir`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadDirOptions {
    /// List the whole subtree in pre-order instead of immediate children.
    pub recursive: bool,
}

impl ReadDirOptions {
    /// Pre-order listing of the whole subtree.
    pub fn recursive() -> Self {
        Self { recursive: true }
    }
}

/// Options for [`FileSystem::rm`].
///
/// | recursive | force | file or empty dir | non-empty dir |
/// |-----------|-------|-------------------|---------------|
/// | false | false | removed | `NotEmpty` |
/// | false | true | removed | left in place |
/// | true | any | removed | removed with its subtree |
///
/// `force` ignores a missing path. `recursive` ignores every failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RmOptions {
    pub recursive: bool,
    pub force: bool,
}

impl RmOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Apply the error suppression rules to the outcome of a removal.
    pub(crate) fn settle(self, result: Result<()>) -> Result<()> {
        match result {
            Ok(()) => Ok(()),
            Err(_) if self.recursive => Ok(()),
            Err(Error::NotFound(_)) if self.force => Ok(()),
            Err(err) => Err(err),
        }
    }
}

/// How [`FileSystem::read_file`] returns content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Encoding {
    /// Raw bytes.
    #[default]
    Binary,
    /// UTF-8 decoded text.
    Utf8,
}

/// File content as returned by [`FileSystem::read_file`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Bytes(Vec<u8>),
    Text(String),
}

impl Content {
    /// Decode raw bytes according to `encoding`.
    pub fn decode(bytes: Vec<u8>, encoding: Encoding, path: &str) -> Result<Self> {
        match encoding {
            Encoding::Binary => Ok(Content::Bytes(bytes)),
            Encoding::Utf8 => String::from_utf8(bytes)
                .map(Content::Text)
                .map_err(|e| Error::InvalidData(format!("{}: {}", path, e))),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Content::Bytes(bytes) => bytes,
            Content::Text(text) => text.as_bytes(),
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Content::Bytes(bytes) => bytes,
            Content::Text(text) => text.into_bytes(),
        }
    }

    /// Text form; raw bytes are decoded as UTF-8.
    pub fn into_text(self) -> Result<String> {
        match self {
            Content::Text(text) => Ok(text),
            Content::Bytes(bytes) => {
                String::from_utf8(bytes).map_err(|e| Error::InvalidData(e.to_string()))
            }
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// File metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Metadata {
    /// Entry name (last path segment, `.` for the root)
    pub name: String,
    /// File type
    pub file_type: FileType,
    /// Content size in bytes, 0 for directories
    pub size: u64,
    /// Creation time
    pub created: SystemTime,
    /// Last content modification time
    pub modified: SystemTime,
    /// Last content read time
    pub accessed: SystemTime,
}

impl Metadata {
    pub fn is_dir(&self) -> bool {
        self.file_type.is_dir()
    }

    pub fn is_file(&self) -> bool {
        self.file_type.is_file()
    }

    /// Creation time in milliseconds since the Unix epoch.
    pub fn created_ms(&self) -> u64 {
        epoch_millis(self.created)
    }

    /// Modification time in milliseconds since the Unix epoch.
    pub fn modified_ms(&self) -> u64 {
        epoch_millis(self.modified)
    }

    /// Access time in milliseconds since the Unix epoch.
    pub fn accessed_ms(&self) -> u64 {
        epoch_millis(self.accessed)
    }
}

fn epoch_millis(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// File type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// Regular file
    File,
    /// Directory
    Directory,
}

impl FileType {
    /// Check if this is a file.
    pub fn is_file(&self) -> bool {
        matches!(self, FileType::File)
    }

    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, FileType::Directory)
    }
}

/// Directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirEntry {
    /// Entry name (not full path)
    pub name: String,
    /// Path of the containing directory, relative to the listing root
    pub parent_path: String,
    /// Entry type
    pub file_type: FileType,
}

impl DirEntry {
    pub fn is_dir(&self) -> bool {
        self.file_type.is_dir()
    }

    /// `parent_path` joined with `name`.
    pub fn path(&self) -> String {
        path::join(&self.parent_path, &self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rm_settle_rules() {
        let missing = || Err(Error::NotFound("x".into()));
        let not_empty = || Err(Error::NotEmpty("x".into()));

        assert!(RmOptions::new().settle(missing()).is_err());
        assert!(RmOptions::new().force(true).settle(missing()).is_ok());
        assert!(RmOptions::new().recursive(true).settle(missing()).is_ok());
        assert!(RmOptions::new().force(true).settle(not_empty()).is_err());
        assert!(RmOptions::new().recursive(true).settle(not_empty()).is_ok());
    }

    #[test]
    fn test_content_decode() {
        let text = Content::decode("test-ééé".as_bytes().to_vec(), Encoding::Utf8, "f").unwrap();
        assert_eq!(text, Content::Text("test-ééé".to_string()));

        let err = Content::decode(vec![0xff, 0xfe], Encoding::Utf8, "f").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);

        let raw = Content::decode(vec![0xff], Encoding::Binary, "f").unwrap();
        assert_eq!(raw.as_bytes(), &[0xff]);
    }

    #[test]
    fn test_dir_entry_path() {
        let top = DirEntry {
            name: "pim".into(),
            parent_path: ".".into(),
            file_type: FileType::Directory,
        };
        assert_eq!(top.path(), "pim");

        let nested = DirEntry {
            name: "test1".into(),
            parent_path: "pim/poush".into(),
            file_type: FileType::File,
        };
        assert_eq!(nested.path(), "pim/poush/test1");
        assert!(!nested.is_dir());
    }

    #[test]
    fn test_epoch_millis() {
        let t = UNIX_EPOCH + std::time::Duration::from_millis(1500);
        assert_eq!(epoch_millis(t), 1500);
        assert_eq!(epoch_millis(UNIX_EPOCH), 0);
    }

    #[test]
    fn test_file_type_serializes_lowercase() {
        let json = serde_json::to_string(&FileType::Directory).unwrap();
        assert_eq!(json, "\"directory\"");
    }
}
