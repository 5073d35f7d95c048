//! In-memory backend
//!
//! A fixed tree built up front and read-only afterwards. Aliases share the
//! node of their target (hard-link semantics), and faults can be planted
//! on a path to make `open` or `stat` fail with a chosen error kind.

use super::{display_name, FileId, FileInfo, FileSystem, VirtualFile};
use async_trait::async_trait;
use hyper::body::Bytes;
use std::collections::HashMap;
use std::io::{self, Cursor, SeekFrom};
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::io::{AsyncRead, AsyncSeek, ReadBuf};

/// Failure planted on a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// `open` fails with this kind
    Open(io::ErrorKind),
    /// `open` succeeds, `stat` fails with this kind
    Stat(io::ErrorKind),
}

#[derive(Debug, Clone)]
enum Node {
    File { id: u64, data: Bytes },
    Dir { id: u64 },
    Fault(Fault),
}

#[derive(Debug)]
pub struct MemFs {
    nodes: HashMap<String, Node>,
    next_id: u64,
    modified: SystemTime,
}

impl Default for MemFs {
    fn default() -> Self {
        Self::new()
    }
}

/// Keys are absolute and carry no trailing slash (except the root)
fn normalize(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    format!("/{trimmed}")
}

impl MemFs {
    pub fn new() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert("/".to_string(), Node::Dir { id: 0 });
        Self {
            nodes,
            next_id: 1,
            modified: UNIX_EPOCH + Duration::from_secs(1_700_000_000),
        }
    }

    /// Modification time reported for every entry
    #[must_use]
    pub const fn with_modified(mut self, modified: SystemTime) -> Self {
        self.modified = modified;
        self
    }

    fn alloc_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn ensure_parents(&mut self, path: &str) {
        let mut prefix = String::new();
        let parents: Vec<&str> = path.trim_matches('/').split('/').collect();
        for segment in &parents[..parents.len().saturating_sub(1)] {
            prefix.push('/');
            prefix.push_str(segment);
            if !self.nodes.contains_key(&prefix) {
                let id = self.alloc_id();
                self.nodes.insert(prefix.clone(), Node::Dir { id });
            }
        }
    }

    pub fn insert_file(&mut self, path: &str, data: impl Into<Bytes>) -> &mut Self {
        let key = normalize(path);
        self.ensure_parents(&key);
        let id = self.alloc_id();
        self.nodes.insert(
            key,
            Node::File {
                id,
                data: data.into(),
            },
        );
        self
    }

    pub fn insert_dir(&mut self, path: &str) -> &mut Self {
        let key = normalize(path);
        self.ensure_parents(&key);
        let id = self.alloc_id();
        self.nodes.insert(key, Node::Dir { id });
        self
    }

    /// Make `alias` refer to the same entry as `target`
    ///
    /// Does nothing when `target` does not exist.
    pub fn link(&mut self, alias: &str, target: &str) -> &mut Self {
        if let Some(node) = self.nodes.get(&normalize(target)).cloned() {
            let key = normalize(alias);
            self.ensure_parents(&key);
            self.nodes.insert(key, node);
        }
        self
    }

    pub fn insert_fault(&mut self, path: &str, fault: Fault) -> &mut Self {
        let key = normalize(path);
        self.ensure_parents(&key);
        self.nodes.insert(key, Node::Fault(fault));
        self
    }
}

/// Handle opened by [`MemFs`]
#[derive(Debug)]
pub struct MemFile {
    node: Node,
    name: String,
    modified: SystemTime,
    cursor: Cursor<Bytes>,
}

#[async_trait]
impl FileSystem for MemFs {
    type File = MemFile;

    async fn open(&self, path: &str) -> io::Result<MemFile> {
        let node = self
            .nodes
            .get(&normalize(path))
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such entry"))?;
        if let Node::Fault(Fault::Open(kind)) = node {
            return Err(io::Error::new(kind, "open failed"));
        }
        let data = match &node {
            Node::File { data, .. } => data.clone(),
            _ => Bytes::new(),
        };
        Ok(MemFile {
            node,
            name: display_name(path),
            modified: self.modified,
            cursor: Cursor::new(data),
        })
    }
}

#[async_trait]
impl VirtualFile for MemFile {
    async fn stat(&self) -> io::Result<FileInfo> {
        let (id, is_dir, len) = match &self.node {
            Node::File { id, data } => (*id, false, data.len() as u64),
            Node::Dir { id } => (*id, true, 0),
            Node::Fault(Fault::Stat(kind) | Fault::Open(kind)) => {
                return Err(io::Error::new(*kind, "stat failed"));
            }
        };
        Ok(FileInfo {
            name: self.name.clone(),
            modified: Some(self.modified),
            is_dir,
            len,
            id: FileId::Node(id),
        })
    }
}

impl AsyncRead for MemFile {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().cursor).poll_read(cx, buf)
    }
}

impl AsyncSeek for MemFile {
    fn start_seek(self: Pin<&mut Self>, position: SeekFrom) -> io::Result<()> {
        Pin::new(&mut self.get_mut().cursor).start_seek(position)
    }

    fn poll_complete(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<u64>> {
        Pin::new(&mut self.get_mut().cursor).poll_complete(cx)
    }
}
