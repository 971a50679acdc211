//! Resource limits for the in-memory store.
//!
//! These limits keep a test double from growing without bound when the code
//! under test misbehaves (runaway loops writing files, unbounded nesting).
//! Every limit is checked before the tree is mutated, so a rejected call
//! leaves the store untouched.

use thiserror::Error;

use crate::path;

/// Default content budget across all files: 100MB
pub const DEFAULT_MAX_TOTAL_BYTES: u64 = 100_000_000;

/// Default content budget for one file: 10MB
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10_000_000;

/// Default number of entries below the root: 10,000
pub const DEFAULT_MAX_NODE_COUNT: u64 = 10_000;

/// Default number of segments in a path: 100
pub const DEFAULT_MAX_PATH_DEPTH: usize = 100;

/// Default length of one segment: 255 bytes
pub const DEFAULT_MAX_FILENAME_LENGTH: usize = 255;

/// Resource limits for an [`InMemoryFs`](super::InMemoryFs).
///
/// # Example
///
/// ```rust
/// use memfs::{FsLimits, InMemoryFs};
///
/// let limits = FsLimits::new()
///     .max_file_size(1_000_000)
///     .max_node_count(500);
///
/// let fs = InMemoryFs::with_limits(limits);
/// assert_eq!(fs.limits().max_node_count, 500);
/// ```
///
/// | Limit | Default |
/// |-------|---------|
/// | `max_total_bytes` | 100MB |
/// | `max_file_size` | 10MB |
/// | `max_node_count` | 10,000 |
/// | `max_path_depth` | 100 |
/// | `max_filename_length` | 255 |
/// | `strict_names` | `true` |
///
/// [`InMemoryFs::new`](super::InMemoryFs::new) uses [`FsLimits::unlimited`],
/// so these bounds only apply when passed to
/// [`InMemoryFs::with_limits`](super::InMemoryFs::with_limits).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsLimits {
    /// Bytes held by all files together.
    pub max_total_bytes: u64,
    /// Bytes held by any one file.
    pub max_file_size: u64,
    /// Files and directories below the root.
    pub max_node_count: u64,
    /// Segments in a normalized path.
    pub max_path_depth: usize,
    /// Bytes in one segment.
    pub max_filename_length: usize,
    /// Also reject control characters and bidi overrides in names.
    /// `/` and NUL are rejected either way.
    pub strict_names: bool,
}

impl Default for FsLimits {
    fn default() -> Self {
        Self {
            max_total_bytes: DEFAULT_MAX_TOTAL_BYTES,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_node_count: DEFAULT_MAX_NODE_COUNT,
            max_path_depth: DEFAULT_MAX_PATH_DEPTH,
            max_filename_length: DEFAULT_MAX_FILENAME_LENGTH,
            strict_names: true,
        }
    }
}

impl FsLimits {
    pub fn new() -> Self {
        Self::default()
    }

    /// No bounds at all. Names are only refused for `/` and NUL, the two
    /// bytes no POSIX filename can hold.
    pub fn unlimited() -> Self {
        Self {
            max_total_bytes: u64::MAX,
            max_file_size: u64::MAX,
            max_node_count: u64::MAX,
            max_path_depth: usize::MAX,
            max_filename_length: usize::MAX,
            strict_names: false,
        }
    }

    pub fn max_total_bytes(self, max_total_bytes: u64) -> Self {
        Self {
            max_total_bytes,
            ..self
        }
    }

    pub fn max_file_size(self, max_file_size: u64) -> Self {
        Self {
            max_file_size,
            ..self
        }
    }

    pub fn max_node_count(self, max_node_count: u64) -> Self {
        Self {
            max_node_count,
            ..self
        }
    }

    pub fn max_path_depth(self, max_path_depth: usize) -> Self {
        Self {
            max_path_depth,
            ..self
        }
    }

    pub fn max_filename_length(self, max_filename_length: usize) -> Self {
        Self {
            max_filename_length,
            ..self
        }
    }

    pub fn strict_names(self, strict_names: bool) -> Self {
        Self {
            strict_names,
            ..self
        }
    }

    /// Check every segment of a normalized path, then its depth.
    pub fn check_path(&self, path: &str) -> Result<(), FsLimitExceeded> {
        let mut depth = 0;
        for segment in path::segments(path) {
            self.check_name(segment)?;
            depth += 1;
        }
        if depth > self.max_path_depth {
            return Err(FsLimitExceeded::PathTooDeep {
                depth,
                limit: self.max_path_depth,
            });
        }
        Ok(())
    }

    /// Check one segment about to become a node name.
    pub fn check_name(&self, name: &str) -> Result<(), FsLimitExceeded> {
        if name.len() > self.max_filename_length {
            return Err(FsLimitExceeded::NameTooLong {
                name: name.to_string(),
                limit: self.max_filename_length,
            });
        }
        let unsafe_char: fn(char) -> bool = if self.strict_names {
            is_unsafe_name_char
        } else {
            is_unrepresentable_name_char
        };
        match name.chars().find(|c| unsafe_char(*c)) {
            Some(bad) => Err(FsLimitExceeded::UnsafeName {
                name: name.to_string(),
                character: format!("U+{:04X}", bad as u32),
            }),
            None => Ok(()),
        }
    }

    /// Check that storing `size` bytes in place of `replaced` bytes fits both
    /// the per-file and the total budget.
    pub fn check_write(
        &self,
        usage: &FsUsage,
        replaced: u64,
        size: u64,
    ) -> Result<(), FsLimitExceeded> {
        if size > self.max_file_size {
            return Err(FsLimitExceeded::FileSize {
                size,
                limit: self.max_file_size,
            });
        }
        let total = usage
            .total_bytes
            .saturating_sub(replaced)
            .saturating_add(size);
        if total > self.max_total_bytes {
            return Err(FsLimitExceeded::TotalBytes {
                total,
                limit: self.max_total_bytes,
            });
        }
        Ok(())
    }

    /// Check that one more node fits.
    pub fn check_new_node(&self, usage: &FsUsage) -> Result<(), FsLimitExceeded> {
        if usage.node_count() >= self.max_node_count {
            return Err(FsLimitExceeded::NodeCount {
                limit: self.max_node_count,
            });
        }
        Ok(())
    }
}

/// Path separator and NUL.
fn is_unrepresentable_name_char(c: char) -> bool {
    matches!(c, '/' | '\u{0}')
}

/// Separator, ASCII and C1 controls, bidi embeddings and isolates.
fn is_unsafe_name_char(c: char) -> bool {
    matches!(c, '/' | '\u{0}'..='\u{1F}' | '\u{7F}'..='\u{9F}')
        || matches!(c, '\u{202A}'..='\u{202E}' | '\u{2066}'..='\u{2069}')
}

/// A call rejected because it would break an [`FsLimits`] bound.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FsLimitExceeded {
    #[error("store would hold {total} bytes, limit is {limit}")]
    TotalBytes { total: u64, limit: u64 },

    #[error("file of {size} bytes exceeds the {limit} byte limit")]
    FileSize { size: u64, limit: u64 },

    #[error("store already holds {limit} entries")]
    NodeCount { limit: u64 },

    #[error("path has {depth} segments, limit is {limit}")]
    PathTooDeep { depth: usize, limit: usize },

    #[error("name '{name}' is longer than {limit} bytes")]
    NameTooLong { name: String, limit: usize },

    #[error("name '{name}' contains {character}")]
    UnsafeName { name: String, character: String },
}

/// Snapshot of what a store currently holds; the root is not counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FsUsage {
    pub total_bytes: u64,
    pub file_count: u64,
    pub dir_count: u64,
}

impl FsUsage {
    pub fn new(total_bytes: u64, file_count: u64, dir_count: u64) -> Self {
        Self {
            total_bytes,
            file_count,
            dir_count,
        }
    }

    /// Files plus directories.
    pub fn node_count(&self) -> u64 {
        self.file_count + self.dir_count
    }
}
