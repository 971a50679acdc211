//! Error types for memfs
//!
//! Every filesystem operation reports failures through [`Error`], with the
//! following design goals:
//! - One variant per failure class a caller may want to branch on
//! - The offending (normalized) path is carried in the message
//! - Host I/O errors are folded onto the same classes where they match

use crate::fs::FsLimitExceeded;
use thiserror::Error;

/// Result type alias using memfs's Error.
pub type Result<T> = std::result::Result<T, Error>;

/// memfs error types.
#[derive(Error, Debug)]
pub enum Error {
    /// A path segment does not resolve.
    #[error("no such file or directory: {0}")]
    NotFound(String),

    /// A directory operation was attempted on a file, or a file was used as
    /// an intermediate path segment.
    #[error("not a directory: {0}")]
    NotADirectory(String),

    /// A file-content operation was attempted on a directory.
    #[error("is a directory: {0}")]
    IsADirectory(String),

    /// Non-recursive removal of a populated directory.
    #[error("directory not empty: {0}")]
    NotEmpty(String),

    /// Non-recursive creation over an existing entry.
    #[error("file exists: {0}")]
    AlreadyExists(String),

    /// Structural misuse: content access on a directory, children access on
    /// a file, moving a directory into itself, renaming the root.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// Content could not be decoded with the requested encoding.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// A configured filesystem limit would be exceeded.
    #[error("filesystem limit exceeded: {0}")]
    LimitExceeded(#[from] FsLimitExceeded),

    /// Host I/O error with no closer match.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Copyable classification of an [`Error`], for matching without borrowing
/// the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    NotADirectory,
    IsADirectory,
    NotEmpty,
    AlreadyExists,
    InvalidOperation,
    InvalidData,
    LimitExceeded,
    Io,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::NotADirectory(_) => ErrorKind::NotADirectory,
            Error::IsADirectory(_) => ErrorKind::IsADirectory,
            Error::NotEmpty(_) => ErrorKind::NotEmpty,
            Error::AlreadyExists(_) => ErrorKind::AlreadyExists,
            Error::InvalidOperation(_) => ErrorKind::InvalidOperation,
            Error::InvalidData(_) => ErrorKind::InvalidData,
            Error::LimitExceeded(_) => ErrorKind::LimitExceeded,
            Error::Io(_) => ErrorKind::Io,
        }
    }

    /// Map a host I/O error for `path` onto the closest typed variant.
    pub fn from_io(err: std::io::Error, path: &str) -> Self {
        use std::io::ErrorKind as Io;

        let path = path.to_string();
        match err.kind() {
            Io::NotFound => Error::NotFound(path),
            Io::NotADirectory => Error::NotADirectory(path),
            Io::IsADirectory => Error::IsADirectory(path),
            Io::DirectoryNotEmpty => Error::NotEmpty(path),
            Io::AlreadyExists => Error::AlreadyExists(path),
            Io::InvalidData => Error::InvalidData(format!("{}: {}", path, err)),
            _ => Error::Io(err),
        }
    }
}
