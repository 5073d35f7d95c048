//! Directory index resolution

use crate::vfs::{FileInfo, FileSystem, VirtualFile};

/// Index candidates tried for a directory, highest priority first
pub const DEFAULT_INDEX_PAGES: [&str; 6] = [
    "index.html",
    "index.htm",
    "index.txt",
    "default.html",
    "default.htm",
    "default.txt",
];

pub fn default_index_pages() -> Vec<String> {
    DEFAULT_INDEX_PAGES.iter().map(ToString::to_string).collect()
}

/// Index file that replaced a directory
pub struct IndexMatch<T> {
    pub path: String,
    pub file: T,
    pub info: FileInfo,
}

/// Try `pages` in order under directory `dir`
///
/// The first candidate that both opens and stats wins, whatever its type;
/// later candidates are not tried. Candidates that fail are closed and skipped.
pub async fn find_index<F: FileSystem>(
    fs: &F,
    dir: &str,
    pages: &[String],
) -> Option<IndexMatch<F::File>> {
    let base = dir.trim_end_matches('/');
    for page in pages {
        let path = format!("{base}/{page}");
        let Ok(file) = fs.open(&path).await else {
            continue;
        };
        if let Ok(info) = file.stat().await {
            return Some(IndexMatch { path, file, info });
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::{Fault, MemFs};
    use std::io;

    fn pages() -> Vec<String> {
        default_index_pages()
    }

    #[tokio::test]
    async fn test_priority_order() {
        let mut fs = MemFs::new();
        fs.insert_file("/docs/index.htm", "htm")
            .insert_file("/docs/index.html", "html")
            .insert_file("/docs/default.txt", "txt");

        let found = find_index(&fs, "/docs", &pages()).await.unwrap();
        assert_eq!(found.path, "/docs/index.html");
        assert_eq!(found.info.name, "index.html");
    }

    #[tokio::test]
    async fn test_root_directory() {
        let mut fs = MemFs::new();
        fs.insert_file("/default.htm", "home");

        let found = find_index(&fs, "/", &pages()).await.unwrap();
        assert_eq!(found.path, "/default.htm");
    }

    #[tokio::test]
    async fn test_no_candidate() {
        let mut fs = MemFs::new();
        fs.insert_file("/docs/readme.md", "readme");

        assert!(find_index(&fs, "/docs", &pages()).await.is_none());
    }

    #[tokio::test]
    async fn test_failing_candidates_are_skipped() {
        let mut fs = MemFs::new();
        fs.insert_fault("/docs/index.html", Fault::Open(io::ErrorKind::PermissionDenied))
            .insert_fault("/docs/index.htm", Fault::Stat(io::ErrorKind::Other))
            .insert_file("/docs/index.txt", "plain");

        let found = find_index(&fs, "/docs/", &pages()).await.unwrap();
        assert_eq!(found.path, "/docs/index.txt");
    }

    #[tokio::test]
    async fn test_directory_candidate_stops_search() {
        let mut fs = MemFs::new();
        fs.insert_dir("/docs/index.html")
            .insert_file("/docs/index.htm", "htm");

        let found = find_index(&fs, "/docs", &pages()).await.unwrap();
        assert_eq!(found.path, "/docs/index.html");
        assert!(found.info.is_dir);
    }

    #[tokio::test]
    async fn test_custom_pages() {
        let mut fs = MemFs::new();
        fs.insert_file("/docs/index.html", "html")
            .insert_file("/docs/home.xhtml", "xhtml");

        let custom = vec!["home.xhtml".to_string()];
        let found = find_index(&fs, "/docs", &custom).await.unwrap();
        assert_eq!(found.path, "/docs/home.xhtml");
    }
}
