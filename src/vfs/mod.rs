//! Virtual filesystem module
//!
//! Abstracts the storage the file server reads from. Paths handed to a
//! [`FileSystem`] are always canonical, absolute and `/`-separated; the
//! backend decides how they map onto real storage.

mod mem;
mod os;

pub use mem::{Fault, MemFile, MemFs};
pub use os::{OsFile, OsFs};

use async_trait::async_trait;
use std::io;
use std::path::PathBuf;
use std::time::SystemTime;
use tokio::io::{AsyncRead, AsyncSeek};

/// Opaque identity of a filesystem entry
///
/// Two `FileInfo`s with equal ids denote the same underlying entry, no
/// matter which path was used to reach it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FileId {
    /// Device and inode number (Unix hosts)
    Inode { dev: u64, ino: u64 },
    /// Canonicalized host path (hosts without inode numbers)
    Canonical(PathBuf),
    /// Node number inside an in-memory tree
    Node(u64),
}

/// Metadata returned by [`VirtualFile::stat`]
#[derive(Debug, Clone)]
pub struct FileInfo {
    /// Display name (last path component, `/` for the root)
    pub name: String,
    pub modified: Option<SystemTime>,
    pub is_dir: bool,
    /// Size in bytes (0 for directories)
    pub len: u64,
    pub id: FileId,
}

/// An opened entry
///
/// Reading and seeking go through the tokio I/O traits; closing happens on drop.
#[async_trait]
pub trait VirtualFile: AsyncRead + AsyncSeek + Unpin + Send + Sync {
    async fn stat(&self) -> io::Result<FileInfo>;
}

/// A root that request paths are resolved against
#[async_trait]
pub trait FileSystem: Send + Sync {
    type File: VirtualFile + 'static;

    /// Open the entry at `path` (canonical, starts with `/`)
    async fn open(&self, path: &str) -> io::Result<Self::File>;

    /// Whether two stat results denote the same underlying entry
    fn same_file(&self, a: &FileInfo, b: &FileInfo) -> bool {
        a.id == b.id
    }
}

/// Last path component used as display name
pub(crate) fn display_name(path: &str) -> String {
    match path.trim_end_matches('/').rsplit('/').next() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => "/".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("/"), "/");
        assert_eq!(display_name("/docs"), "docs");
        assert_eq!(display_name("/docs/index.html"), "index.html");
    }
}
