//! Path safety checks for plan steps.
//!
//! Every path-bearing step must name a location beneath the project root.
//! Unsafe paths are a hard validation failure and are rejected before any
//! ignore rule is consulted.

use crate::error::PathViolation;

/// Validate a step path and return its normalized, root-relative form.
///
/// Normalization drops `.` segments, a leading `./`, duplicate separators and
/// a trailing separator, so `./src//lib/` becomes `src/lib`.
pub fn check_path(path: &str) -> Result<String, PathViolation> {
    if path.trim().is_empty() {
        return Err(PathViolation::Empty);
    }
    if path.contains('\0') {
        return Err(PathViolation::NulByte);
    }
    if path.contains('\\') {
        return Err(PathViolation::Backslash);
    }
    if path.starts_with('/') || has_drive_prefix(path) {
        return Err(PathViolation::Absolute);
    }

    let mut segments = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return Err(PathViolation::Traversal),
            other => segments.push(other),
        }
    }

    // "." or "./" resolve to the root itself, which no step may target.
    if segments.is_empty() {
        return Err(PathViolation::Empty);
    }

    Ok(segments.join("/"))
}

/// True when the path is safe to hand to the ignore filter.
pub fn is_safe_path(path: &str) -> bool {
    check_path(path).is_ok()
}

fn has_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Parent directory of a normalized path, if it has one.
pub fn parent_dir(path: &str) -> Option<&str> {
    path.rsplit_once('/').map(|(parent, _)| parent)
}

/// Final segment of a normalized path.
pub fn file_name(path: &str) -> &str {
    path.rsplit_once('/').map(|(_, name)| name).unwrap_or(path)
}

/// Whether `ancestor` is a strict ancestor directory of `path`.
pub fn is_ancestor(ancestor: &str, path: &str) -> bool {
    path.len() > ancestor.len()
        && path.starts_with(ancestor)
        && path.as_bytes()[ancestor.len()] == b'/'
}
