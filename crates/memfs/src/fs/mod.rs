//! Filesystem implementations for memfs
//!
//! Provides an async filesystem trait and implementations:
//! - `InMemoryFs`: tree of nodes held in memory, with resource limits
//! - `HostFs`: a directory of the real filesystem behind the same trait

#[cfg(not(target_arch = "wasm32"))]
mod host;
mod limits;
mod memory;
mod node;
mod traits;
mod tree;

#[cfg(not(target_arch = "wasm32"))]
pub use host::HostFs;
pub use limits::{
    FsLimitExceeded, FsLimits, FsUsage, DEFAULT_MAX_FILENAME_LENGTH, DEFAULT_MAX_FILE_SIZE,
    DEFAULT_MAX_NODE_COUNT, DEFAULT_MAX_PATH_DEPTH, DEFAULT_MAX_TOTAL_BYTES,
};
pub use memory::InMemoryFs;
pub use traits::{
    Content, DirEntry, Encoding, FileSystem, FileType, Metadata, MkdirOptions, ReadDirOptions,
    RmOptions,
};
