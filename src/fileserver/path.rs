//! URL path canonicalization
//!
//! Everything here is lexical: no function touches the filesystem.

use std::borrow::Cow;

/// Prepend `/` when the raw URL path lacks it
pub fn with_leading_slash(path: &str) -> Cow<'_, str> {
    if path.starts_with('/') {
        Cow::Borrowed(path)
    } else {
        Cow::Owned(format!("/{path}"))
    }
}

/// Shortest absolute form of `path`
///
/// Collapses repeated separators and `.` segments, resolves `..` against the
/// preceding segment (`..` at the root stays at the root) and drops any
/// trailing slash. The result always starts with `/`.
///
/// # Examples
/// ```
/// use rust_fileserver::fileserver::path::clean;
/// assert_eq!(clean("/a//b/./../c/"), "/a/c");
/// assert_eq!(clean("/../.."), "/");
/// ```
pub fn clean(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    format!("/{}", segments.join("/"))
}

/// Last element of `path`, ignoring trailing slashes
///
/// Returns `/` for the root and `.` for an empty path.
pub fn base_name(path: &str) -> &str {
    if path.is_empty() {
        return ".";
    }
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return "/";
    }
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

/// Validation applied to a cleaned path before it reaches the filesystem
///
/// Some filesystem drivers read a path such as `/C:/Windows` as a native
/// absolute path and step outside the served root. The guard is picked per
/// target with [`PathGuard::platform`] and can be swapped on the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathGuard {
    /// Accept every cleaned path
    Permissive,
    /// Reject drive-prefixed (`/C:/x`, `/C:x`) and UNC-style (`/\\host\share`) paths
    RejectDriveAbsolute,
}

impl PathGuard {
    /// Guard matching the target platform's path rules
    pub const fn platform() -> Self {
        if cfg!(windows) {
            Self::RejectDriveAbsolute
        } else {
            Self::Permissive
        }
    }

    /// Whether `clean_path` may be opened
    pub fn allows(self, clean_path: &str) -> bool {
        match self {
            Self::Permissive => true,
            Self::RejectDriveAbsolute => {
                !is_native_absolute(clean_path.strip_prefix('/').unwrap_or(clean_path))
            }
        }
    }
}

impl Default for PathGuard {
    fn default() -> Self {
        Self::platform()
    }
}

fn is_native_absolute(rest: &str) -> bool {
    let is_sep = |c: u8| c == b'/' || c == b'\\';
    match rest.as_bytes() {
        // A drive prefix, with or without a separator after it
        [drive, b':', ..] => drive.is_ascii_alphabetic(),
        [first, second, ..] => is_sep(*first) && is_sep(*second),
        _ => false,
    }
}
