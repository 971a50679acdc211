//! memfs - In-memory filesystem test double
//!
//! A tree of files and directories held in memory, driven through the same
//! async [`FileSystem`] trait as a host directory ([`HostFs`]). Tests set up
//! fixtures, run the code under test, then assert on the whole tree with
//! [`InMemoryFs::file_map`].
//!
//! # Example
//!
//! ```rust
//! use memfs::{Encoding, FileSystem, InMemoryFs, MkdirOptions, ReadDirOptions};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let fs = InMemoryFs::new();
//!     fs.mkdir("from", MkdirOptions::recursive()).await?;
//!     fs.mkdir("to", MkdirOptions::recursive()).await?;
//!     fs.write_file("from/test.dat", "test-ééé".as_bytes()).await?;
//!
//!     fs.rename("from/test.dat", "to/renamed.dat").await?;
//!     assert_eq!(fs.file_map(), vec!["./from", "./to", "./to/renamed.dat"]);
//!
//!     let text = fs.read_file("to/renamed.dat", Encoding::Utf8).await?;
//!     assert_eq!(text.into_text()?, "test-ééé");
//!
//!     let entries = fs.read_dir(".", ReadDirOptions::recursive()).await?;
//!     assert_eq!(entries.len(), 3);
//!     Ok(())
//! }
//! ```
//!
//! # Logging
//!
//! With the default `logging` feature, every mutation emits a `tracing`
//! event on the `memfs::fs` target. See [`LogConfig`] for what they contain.

mod error;
mod fs;
mod helper;
mod logging_impl;
pub mod path;

pub use async_trait::async_trait;
pub use error::{Error, ErrorKind, Result};
#[cfg(not(target_arch = "wasm32"))]
pub use fs::HostFs;
pub use fs::{
    Content, DirEntry, Encoding, FileSystem, FileType, FsLimitExceeded, FsLimits, FsUsage,
    InMemoryFs, Metadata, MkdirOptions, ReadDirOptions, RmOptions, DEFAULT_MAX_FILENAME_LENGTH,
    DEFAULT_MAX_FILE_SIZE, DEFAULT_MAX_NODE_COUNT, DEFAULT_MAX_PATH_DEPTH, DEFAULT_MAX_TOTAL_BYTES,
};
pub use helper::{FsHelper, StatSummary};
pub use logging_impl::{sanitize_for_log, LogConfig};
