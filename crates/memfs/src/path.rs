//! POSIX-style path string primitives.
//!
//! All paths handled by memfs are `/`-separated strings relative to a fixed
//! root. The root itself is spelled `.`. A leading `/` is accepted and means
//! the same root, and `..` never climbs above it.

/// Iterate over the meaningful segments of `path` (skips empty and `.`).
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty() && *s != ".")
}

/// Normalize a path: collapse repeated separators and `.` segments, resolve
/// `..` lexically (clamped at the root), drop leading and trailing `/`.
/// The empty result is `.`.
pub fn normalize(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for segment in segments(path) {
        if segment == ".." {
            parts.pop();
        } else {
            parts.push(segment);
        }
    }

    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

/// Join `child` onto `base` and normalize the result.
pub fn join(base: &str, child: &str) -> String {
    normalize(&format!("{}/{}", base, child))
}

/// Parent of `path`, `.` when `path` has a single segment or is the root.
pub fn dirname(path: &str) -> String {
    let normalized = normalize(path);
    match normalized.rfind('/') {
        Some(idx) => normalized[..idx].to_string(),
        None => ".".to_string(),
    }
}

/// Last segment of `path`, `.` for the root.
pub fn basename(path: &str) -> String {
    let normalized = normalize(path);
    match normalized.rfind('/') {
        Some(idx) => normalized[idx + 1..].to_string(),
        None => normalized,
    }
}
