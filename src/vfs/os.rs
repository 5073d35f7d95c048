//! Host directory backend

use super::{display_name, FileId, FileInfo, FileSystem, VirtualFile};
use async_trait::async_trait;
use std::io::{self, SeekFrom};
use std::path::{Component, Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::fs;
use tokio::io::{AsyncRead, AsyncSeek, ReadBuf};

/// Serves a directory of the host filesystem
#[derive(Debug, Clone)]
pub struct OsFs {
    root: PathBuf,
}

impl OsFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn host_path(&self, path: &str) -> io::Result<PathBuf> {
        // Request paths never carry a native separator other than '/'
        if std::path::MAIN_SEPARATOR != '/' && path.contains(std::path::MAIN_SEPARATOR) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                "invalid character in file path",
            ));
        }
        let relative = Path::new(path.trim_start_matches('/'));
        // Only plain names may be joined onto the root
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                "path escapes the served directory",
            ));
        }
        Ok(self.root.join(relative))
    }
}

/// Handle opened by [`OsFs`]
#[derive(Debug)]
pub enum OsFile {
    File {
        file: fs::File,
        path: PathBuf,
        name: String,
    },
    /// Directories are tracked by path; reading one is an error
    Dir { path: PathBuf, name: String },
}

/// Fold "a parent is a file" and unrepresentable names (NUL bytes) into `NotFound`
fn map_open_error(err: io::Error) -> io::Error {
    match err.kind() {
        io::ErrorKind::NotADirectory | io::ErrorKind::InvalidInput => {
            io::Error::new(io::ErrorKind::NotFound, err)
        }
        _ => err,
    }
}

#[async_trait]
impl FileSystem for OsFs {
    type File = OsFile;

    async fn open(&self, path: &str) -> io::Result<OsFile> {
        let host_path = self.host_path(path)?;
        let name = display_name(path);
        let meta = fs::metadata(&host_path).await.map_err(map_open_error)?;
        if meta.is_dir() {
            return Ok(OsFile::Dir {
                path: host_path,
                name,
            });
        }
        let file = fs::File::open(&host_path).await.map_err(map_open_error)?;
        Ok(OsFile::File {
            file,
            path: host_path,
            name,
        })
    }
}

#[cfg(unix)]
async fn file_id(_path: &Path, meta: &std::fs::Metadata) -> io::Result<FileId> {
    use std::os::unix::fs::MetadataExt;
    Ok(FileId::Inode {
        dev: meta.dev(),
        ino: meta.ino(),
    })
}

#[cfg(not(unix))]
async fn file_id(path: &Path, _meta: &std::fs::Metadata) -> io::Result<FileId> {
    fs::canonicalize(path).await.map(FileId::Canonical)
}

#[async_trait]
impl VirtualFile for OsFile {
    async fn stat(&self) -> io::Result<FileInfo> {
        let (meta, path, name) = match self {
            Self::File { file, path, name } => (file.metadata().await?, path, name),
            Self::Dir { path, name } => (fs::metadata(path).await?, path, name),
        };
        Ok(FileInfo {
            name: name.clone(),
            modified: meta.modified().ok(),
            is_dir: meta.is_dir(),
            len: if meta.is_dir() { 0 } else { meta.len() },
            id: file_id(path, &meta).await?,
        })
    }
}

impl AsyncRead for OsFile {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::File { file, .. } => Pin::new(file).poll_read(cx, buf),
            Self::Dir { .. } => Poll::Ready(Err(io::Error::other("is a directory"))),
        }
    }
}

impl AsyncSeek for OsFile {
    fn start_seek(self: Pin<&mut Self>, position: SeekFrom) -> io::Result<()> {
        match self.get_mut() {
            Self::File { file, .. } => Pin::new(file).start_seek(position),
            Self::Dir { .. } => Ok(()),
        }
    }

    fn poll_complete(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<u64>> {
        match self.get_mut() {
            Self::File { file, .. } => Pin::new(file).poll_complete(cx),
            Self::Dir { .. } => Poll::Ready(Ok(0)),
        }
    }
}
