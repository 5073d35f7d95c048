//! Content streaming
//!
//! Turns an opened file into a response: conditional GET, single byte
//! ranges, MIME inference and HEAD handling. The body is streamed from the
//! file in chunks. A failed seek becomes a 500 here; a file that ends
//! before its advertised length fails the body stream.

use super::range::{self, ByteRange};
use super::request::RequestContext;
use super::response::{self, ResponseBody};
use super::{cache, mime};
use crate::vfs::FileInfo;
use futures_util::TryStreamExt;
use http_body_util::{BodyExt, StreamBody};
use hyper::body::Frame;
use hyper::Response;
use std::io::{self, SeekFrom};
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt, ReadBuf};
use tokio_util::io::ReaderStream;

/// Read size per body frame
const CHUNK_SIZE: usize = 64 * 1024;

/// Serve `source`, described by `info`, for the request in `ctx`
pub async fn serve_content<R>(
    ctx: &RequestContext<'_>,
    info: &FileInfo,
    source: R,
) -> Response<ResponseBody>
where
    R: AsyncRead + AsyncSeek + Unpin + Send + Sync + 'static,
{
    let etag = cache::generate_etag(info.len, info.modified);
    let last_modified = info.modified.map(cache::http_date);

    // If-None-Match takes precedence over If-Modified-Since
    let not_modified = match ctx.if_none_match.as_deref() {
        Some(_) => cache::check_etag_match(ctx.if_none_match.as_deref(), &etag),
        None => cache::not_modified_since(ctx.if_modified_since.as_deref(), info.modified),
    };
    if not_modified {
        return response::build_304_response(&etag, last_modified.as_deref());
    }

    let content_type = mime::content_type_for(&info.name);
    let partial = match range::parse_range_header(ctx.range_header.as_deref(), info.len) {
        ByteRange::Partial(r) => Some(r),
        ByteRange::Unsatisfiable => return response::build_416_response(info.len),
        ByteRange::Whole => None,
    };
    let (start, span) = partial
        .as_ref()
        .map_or((0, info.len), |r| (*r.start(), ByteRange::span(r)));

    let body = if ctx.is_head {
        response::empty_body()
    } else {
        match stream_span(source, start, span).await {
            Ok(body) => body,
            Err(e) => {
                tracing::error!(name = %info.name, error = %e, "failed to position file");
                return response::build_500_response();
            }
        }
    };

    match partial {
        Some(r) => response::build_partial_response(
            body,
            content_type,
            &etag,
            last_modified.as_deref(),
            &r,
            info.len,
        ),
        None => response::build_file_response(
            body,
            content_type,
            &etag,
            last_modified.as_deref(),
            info.len,
        ),
    }
}

/// Body streaming `len` bytes starting at `start`
async fn stream_span<R>(mut source: R, start: u64, len: u64) -> io::Result<ResponseBody>
where
    R: AsyncRead + AsyncSeek + Unpin + Send + Sync + 'static,
{
    if start > 0 {
        source.seek(SeekFrom::Start(start)).await?;
    }
    let reader = ExactLen {
        inner: source.take(len),
        remaining: len,
    };
    let frames = ReaderStream::with_capacity(reader, CHUNK_SIZE).map_ok(Frame::data);
    Ok(StreamBody::new(frames).boxed())
}

/// Reader that fails with `UnexpectedEof` when the inner reader ends early
struct ExactLen<R> {
    inner: R,
    remaining: u64,
}

impl<R: AsyncRead + Unpin> AsyncRead for ExactLen<R> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let before = buf.filled().len();
        ready!(Pin::new(&mut this.inner).poll_read(cx, buf))?;
        let read = (buf.filled().len() - before) as u64;
        if read == 0 && this.remaining > 0 && buf.remaining() > 0 {
            return Poll::Ready(Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "file shorter than its metadata",
            )));
        }
        this.remaining = this.remaining.saturating_sub(read);
        Poll::Ready(Ok(()))
    }
}
