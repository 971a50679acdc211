//! Logging infrastructure for memfs
//!
//! Structured events go through the `tracing` crate when the `logging`
//! feature is enabled (it is by default). Every mutating operation emits a
//! `debug` event on the `memfs::fs` target; errors swallowed by `rm` emit
//! `trace` events.
//!
//! # Content in logs
//!
//! File contents are never logged unless explicitly enabled through
//! [`LogConfig::unsafe_log_file_contents`]; by default only their size is
//! reported. Paths are escaped so a crafted name cannot forge log lines.

/// Emit a `debug` event on the `memfs::fs` target.
macro_rules! fs_debug {
    ($($arg:tt)+) => {
        #[cfg(feature = "logging")]
        tracing::debug!(target: "memfs::fs", $($arg)+);
        #[cfg(not(feature = "logging"))]
        let _ = format_args!($($arg)+);
    };
}

/// Emit a `trace` event on the `memfs::fs` target.
macro_rules! fs_trace {
    ($($arg:tt)+) => {
        #[cfg(feature = "logging")]
        tracing::trace!(target: "memfs::fs", $($arg)+);
        #[cfg(not(feature = "logging"))]
        let _ = format_args!($($arg)+);
    };
}

pub(crate) use {fs_debug, fs_trace};

/// Default cap on a logged path or content preview, in bytes.
pub const DEFAULT_MAX_VALUE_LENGTH: usize = 200;

/// What filesystem events are allowed to carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Put a preview of written content into events instead of its size.
    pub log_file_contents: bool,
    /// Longer values are cut at a char boundary and marked.
    pub max_value_length: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_file_contents: false,
            max_value_length: DEFAULT_MAX_VALUE_LENGTH,
        }
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Include file contents in write events.
    ///
    /// # Warning
    ///
    /// Test fixtures can hold credentials or other sensitive data.
    pub fn unsafe_log_file_contents(self) -> Self {
        Self {
            log_file_contents: true,
            ..self
        }
    }

    pub fn max_value_length(self, max_value_length: usize) -> Self {
        Self {
            max_value_length,
            ..self
        }
    }

    /// Escaped, length-capped form of `path`.
    pub fn format_path(&self, path: &str) -> String {
        self.cap(sanitize_for_log(path))
    }

    /// `[content: N bytes]`, or an escaped preview when content logging is on.
    pub fn format_content(&self, content: &[u8]) -> String {
        if self.log_file_contents {
            self.cap(sanitize_for_log(&String::from_utf8_lossy(content)))
        } else {
            format!("[content: {} bytes]", content.len())
        }
    }

    fn cap(&self, mut value: String) -> String {
        if value.len() <= self.max_value_length {
            return value;
        }
        let cut = (0..=self.max_value_length)
            .rev()
            .find(|i| value.is_char_boundary(*i))
            .unwrap_or(0);
        let dropped = value.len() - cut;
        value.truncate(cut);
        value.push_str(&format!("...[truncated {} bytes]", dropped));
        value
    }
}

/// Escape line breaks and tabs, drop every other control character.
pub fn sanitize_for_log(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}
