//! File server module
//!
//! Resolves a request path against a [`FileSystem`] and serves the result.
//!
//! Pipeline, per request:
//! 1. canonicalize the URL path and run the [`PathGuard`]
//! 2. open and stat the entry ([`ServeError`] maps failures)
//! 3. redirect directories without / files with a trailing slash
//! 4. substitute the first index page for a directory
//! 5. reject directories that are left and entries on the hide list
//! 6. hand the file to [`http::serve_content`]

pub mod error;
pub mod hidden;
pub mod index;
pub mod path;
pub mod redirect;

pub use error::ServeError;
pub use index::{default_index_pages, DEFAULT_INDEX_PAGES};
pub use path::PathGuard;

use crate::http::{self, RequestContext, ResponseBody};
use crate::vfs::{FileInfo, FileSystem, VirtualFile};
use hyper::{Response, StatusCode};
use std::time::Duration;

/// Default `Retry-After` hint when the filesystem cannot open files
pub const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(5);

/// Outcome of a successful resolution
#[derive(Debug)]
pub enum Resolved<T> {
    /// Permanent redirect to this `Location`
    Redirect(String),
    File(ResolvedFile<T>),
}

/// File chosen to answer a request
#[derive(Debug)]
pub struct ResolvedFile<T> {
    /// Canonical path of the file inside the root
    pub path: String,
    pub file: T,
    pub info: FileInfo,
}

/// Static file handler over a virtual filesystem root
///
/// Immutable once built; share it between connections behind an `Arc`.
#[derive(Debug)]
pub struct FileServer<F> {
    root: F,
    hide: Vec<String>,
    index_pages: Vec<String>,
    guard: PathGuard,
    retry_after: Duration,
}

impl<F: FileSystem> FileServer<F> {
    /// Serve `root`, answering 404 for anything identical to an entry of `hide`
    ///
    /// Hide entries are paths relative to the root.
    pub fn new<I, S>(root: F, hide: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let hide = hide
            .into_iter()
            .map(|p| path::clean(&path::with_leading_slash(p.as_ref())))
            .collect();
        Self {
            root,
            hide,
            index_pages: default_index_pages(),
            guard: PathGuard::platform(),
            retry_after: DEFAULT_RETRY_AFTER,
        }
    }

    /// Replace the index candidates, highest priority first
    #[must_use]
    pub fn with_index_pages(mut self, pages: Vec<String>) -> Self {
        self.index_pages = pages;
        self
    }

    #[must_use]
    pub const fn with_path_guard(mut self, guard: PathGuard) -> Self {
        self.guard = guard;
        self
    }

    #[must_use]
    pub const fn with_retry_after(mut self, retry_after: Duration) -> Self {
        self.retry_after = retry_after;
        self
    }

    pub const fn root(&self) -> &F {
        &self.root
    }

    pub fn hide_list(&self) -> &[String] {
        &self.hide
    }

    pub fn index_pages(&self) -> &[String] {
        &self.index_pages
    }

    /// Serve the request described by `ctx`
    ///
    /// Redirects and file content come back as `Ok`; every failure is a
    /// [`ServeError`] carrying the status code to answer with.
    pub async fn serve(
        &self,
        ctx: &RequestContext<'_>,
    ) -> Result<Response<ResponseBody>, ServeError> {
        match self.resolve(ctx.path, ctx.query).await? {
            Resolved::Redirect(location) => Ok(http::build_redirect_response_with_code(
                &location,
                StatusCode::MOVED_PERMANENTLY,
            )),
            Resolved::File(found) => Ok(http::serve_content(ctx, &found.info, found.file).await),
        }
    }

    /// Run the resolution pipeline without producing a response
    pub async fn resolve(
        &self,
        url_path: &str,
        query: Option<&str>,
    ) -> Result<Resolved<F::File>, ServeError> {
        let url_path = path::with_leading_slash(url_path);
        let mut name = path::clean(&url_path);
        if !self.guard.allows(&name) {
            tracing::debug!(path = %name, "path rejected by guard");
            return Err(ServeError::NotFound);
        }

        let mut file = self
            .root
            .open(&name)
            .await
            .map_err(|e| ServeError::from_open(e, self.retry_after))?;
        let mut info = file.stat().await.map_err(ServeError::from_stat)?;

        if let Some(location) = redirect::canonical_redirect(&url_path, info.is_dir, query) {
            return Ok(Resolved::Redirect(location));
        }

        if info.is_dir {
            if let Some(found) = index::find_index(&self.root, &name, &self.index_pages).await {
                tracing::debug!(dir = %name, index = %found.path, "serving index page");
                name = found.path;
                file = found.file;
                info = found.info;
            }
        }

        if info.is_dir {
            return Err(ServeError::NotFound);
        }

        if hidden::is_hidden(&self.root, &self.hide, &info).await {
            return Err(ServeError::NotFound);
        }

        Ok(Resolved::File(ResolvedFile {
            path: name,
            file,
            info,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::{Fault, MemFs};
    use http_body_util::BodyExt;
    use std::io;

    fn site() -> MemFs {
        let mut fs = MemFs::new();
        fs.insert_file("/index.html", "home")
            .insert_file("/about", "about page")
            .insert_file("/docs/index.html", "docs html")
            .insert_file("/docs/index.htm", "docs htm")
            .insert_file("/docs/guide.txt", "guide")
            .insert_dir("/empty")
            .insert_file("/.env", "SECRET=1")
            .insert_file("/config/app.toml", "key = 1")
            .link("/public/app.toml", "/config/app.toml")
            .insert_fault("/locked.txt", Fault::Open(io::ErrorKind::PermissionDenied))
            .insert_fault("/busy.txt", Fault::Open(io::ErrorKind::Other))
            .insert_fault("/flaky.txt", Fault::Stat(io::ErrorKind::Other))
            .insert_fault("/private.txt", Fault::Stat(io::ErrorKind::PermissionDenied));
        fs
    }

    fn server(hide: &[&str]) -> FileServer<MemFs> {
        FileServer::new(site(), hide.iter().copied())
    }

    type Served = Result<Response<ResponseBody>, ServeError>;

    async fn get(server: &FileServer<MemFs>, path: &str) -> Served {
        let (path, query) = match path.split_once('?') {
            Some((p, q)) => (p, Some(q)),
            None => (path, None),
        };
        let mut ctx = RequestContext::new(path);
        ctx.query = query;
        server.serve(&ctx).await
    }

    async fn body(resp: Response<ResponseBody>) -> String {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn status(result: &Served) -> StatusCode {
        match result {
            Ok(resp) => resp.status(),
            Err(e) => e.status(),
        }
    }

    #[tokio::test]
    async fn test_serves_file() {
        let resp = get(&server(&[]), "/docs/guide.txt").await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body(resp).await, "guide");
    }

    #[tokio::test]
    async fn test_missing_leading_slash_is_prepended() {
        let resolved = server(&[]).resolve("docs/guide.txt", None).await.unwrap();
        let Resolved::File(found) = resolved else {
            panic!("expected a file");
        };
        assert_eq!(found.path, "/docs/guide.txt");
    }

    #[tokio::test]
    async fn test_dot_segments_are_resolved_lexically() {
        let server = server(&[]);
        let resp = get(&server, "/docs/../docs/./guide.txt").await.unwrap();
        assert_eq!(body(resp).await, "guide");

        let resp = get(&server, "/../../docs//guide.txt").await.unwrap();
        assert_eq!(body(resp).await, "guide");
    }

    #[tokio::test]
    async fn test_directory_redirects_to_slash() {
        let resp = get(&server(&[]), "/docs?lang=en").await.unwrap();
        assert_eq!(resp.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(resp.headers()["location"], "/docs/?lang=en");
    }

    #[tokio::test]
    async fn test_file_redirects_without_slash() {
        let resp = get(&server(&[]), "/about/?x=1").await.unwrap();
        assert_eq!(resp.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(resp.headers()["location"], "/about?x=1");
    }

    #[tokio::test]
    async fn test_redirect_uses_stat_before_index_substitution() {
        // The index file is a regular file, yet the slash policy follows the directory
        let resolved = server(&[]).resolve("/docs", None).await.unwrap();
        assert!(matches!(resolved, Resolved::Redirect(ref l) if l == "/docs/"));
    }

    #[tokio::test]
    async fn test_index_priority() {
        let resp = get(&server(&[]), "/docs/").await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body(resp).await, "docs html");

        let resp = get(&server(&[]), "/").await.unwrap();
        assert_eq!(body(resp).await, "home");
    }

    #[tokio::test]
    async fn test_custom_index_pages() {
        let server = server(&[]).with_index_pages(vec!["index.htm".to_string()]);
        let resp = get(&server, "/docs/").await.unwrap();
        assert_eq!(body(resp).await, "docs htm");
    }

    #[tokio::test]
    async fn test_directory_without_index_is_not_found() {
        let result = get(&server(&[]), "/empty/").await;
        assert!(matches!(result, Err(ServeError::NotFound)));
    }

    #[tokio::test]
    async fn test_directory_index_that_is_a_directory_is_not_found() {
        let mut fs = MemFs::new();
        fs.insert_dir("/site/index.html")
            .insert_file("/site/index.htm", "never chosen");
        let server = FileServer::new(fs, Vec::<String>::new());

        let result = get(&server, "/site/").await;
        assert!(matches!(result, Err(ServeError::NotFound)));
    }

    #[tokio::test]
    async fn test_hidden_file() {
        assert_eq!(status(&get(&server(&[]), "/.env").await), StatusCode::OK);

        let result = get(&server(&[".env"]), "/.env").await;
        assert!(matches!(result, Err(ServeError::NotFound)));
        assert!(result.unwrap_err().diagnostic().is_none());
    }

    #[tokio::test]
    async fn test_hidden_by_identity() {
        let via_config = server(&["/config/app.toml"]);
        assert_eq!(status(&get(&via_config, "/public/app.toml").await), StatusCode::NOT_FOUND);
        assert_eq!(status(&get(&via_config, "/config/app.toml").await), StatusCode::NOT_FOUND);

        let via_public = server(&["public/app.toml"]);
        assert_eq!(status(&get(&via_public, "/config/app.toml").await), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_hidden_index_page() {
        let result = get(&server(&["/docs/index.html"]), "/docs/").await;
        assert!(matches!(result, Err(ServeError::NotFound)));
    }

    #[tokio::test]
    async fn test_bad_hide_entries_are_ignored() {
        let server = server(&["/nope", "/locked.txt", "/flaky.txt"]);
        assert_eq!(status(&get(&server, "/docs/guide.txt").await), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_not_found() {
        let result = get(&server(&[]), "/missing.txt").await;
        assert!(matches!(result, Err(ServeError::NotFound)));
    }

    #[tokio::test]
    async fn test_permission_denied_on_open() {
        let err = get(&server(&[]), "/locked.txt").await.unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        assert!(err.diagnostic().is_some());
    }

    #[tokio::test]
    async fn test_permission_denied_on_stat() {
        let err = get(&server(&[]), "/private.txt").await.unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_exhaustion_on_open_is_503() {
        let server = server(&[]).with_retry_after(Duration::from_secs(12));
        let err = get(&server, "/busy.txt").await.unwrap_err();
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(err.diagnostic().is_some());

        let resp = err.to_response();
        assert_eq!(resp.headers()["retry-after"], "12");
    }

    #[tokio::test]
    async fn test_stat_failure_is_500() {
        let err = get(&server(&[]), "/flaky.txt").await.unwrap_err();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.diagnostic().is_some());
        assert!(err.retry_after().is_none());
    }

    #[tokio::test]
    async fn test_drive_letter_guard() {
        let mut fs = MemFs::new();
        fs.insert_file("/C:/secret.txt", "x");
        fs.insert_file("/C:secret.txt", "x");
        let guarded = FileServer::new(fs, Vec::<String>::new())
            .with_path_guard(PathGuard::RejectDriveAbsolute);
        for path in ["/C:/secret.txt", "/C:secret.txt"] {
            assert!(matches!(get(&guarded, path).await, Err(ServeError::NotFound)), "{path}");
        }

        let mut fs = MemFs::new();
        fs.insert_file("/C:/secret.txt", "x");
        let open = FileServer::new(fs, Vec::<String>::new()).with_path_guard(PathGuard::Permissive);
        assert_eq!(status(&get(&open, "/C:/secret.txt").await), StatusCode::OK);
    }

    #[test]
    fn test_hide_list_is_normalized() {
        let server = server(&["secret.txt", "/a/../b//c.txt"]);
        assert_eq!(server.hide_list(), ["/secret.txt", "/b/c.txt"]);
        assert_eq!(server.index_pages(), DEFAULT_INDEX_PAGES);
    }
}
