//! HTTP response building module
//!
//! Provides builders for the responses the file server emits. Bodies of
//! error responses are the fixed status text only.

use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Empty, Full};
use hyper::body::Bytes;
use hyper::header::{
    ACCEPT_RANGES, ALLOW, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, ETAG, LAST_MODIFIED,
    LOCATION, RETRY_AFTER,
};
use hyper::http::response::Builder;
use hyper::{Response, StatusCode};
use std::io;
use std::ops::RangeInclusive;

const ALLOWED_METHODS: &str = "GET, HEAD, OPTIONS";

/// Body of every response: buffered for status pages, streamed for files
pub type ResponseBody = BoxBody<Bytes, io::Error>;

/// Body holding `data` in one frame
pub fn full_body(data: impl Into<Bytes>) -> ResponseBody {
    Full::new(data.into()).map_err(|never| match never {}).boxed()
}

pub fn empty_body() -> ResponseBody {
    Empty::new().map_err(|never| match never {}).boxed()
}

/// Finish a builder, falling back to an empty response with the same status
fn finish(builder: Builder, status: StatusCode, body: ResponseBody) -> Response<ResponseBody> {
    builder.body(body).unwrap_or_else(|e| {
        tracing::error!(status = status.as_u16(), error = %e, "failed to build response");
        let mut fallback = Response::new(empty_body());
        *fallback.status_mut() = status;
        fallback
    })
}

/// Plain-text response whose body is the status line, e.g. `404 Not Found`
fn build_status_response(status: StatusCode) -> (Builder, ResponseBody) {
    let text = format!(
        "{} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or_default()
    );
    let builder = Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(CONTENT_LENGTH, text.len());
    (builder, full_body(text))
}

fn build_plain_response(status: StatusCode) -> Response<ResponseBody> {
    let (builder, body) = build_status_response(status);
    finish(builder, status, body)
}

/// Build 304 Not Modified response
pub fn build_304_response(etag: &str, last_modified: Option<&str>) -> Response<ResponseBody> {
    let mut builder = Response::builder()
        .status(StatusCode::NOT_MODIFIED)
        .header(ETAG, etag);
    if let Some(last_modified) = last_modified {
        builder = builder.header(LAST_MODIFIED, last_modified);
    }
    finish(builder, StatusCode::NOT_MODIFIED, empty_body())
}

/// Build 400 Bad Request response
pub fn build_400_response() -> Response<ResponseBody> {
    build_plain_response(StatusCode::BAD_REQUEST)
}

/// Build 403 Forbidden response
pub fn build_403_response() -> Response<ResponseBody> {
    build_plain_response(StatusCode::FORBIDDEN)
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<ResponseBody> {
    build_plain_response(StatusCode::NOT_FOUND)
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<ResponseBody> {
    let (builder, body) = build_status_response(StatusCode::METHOD_NOT_ALLOWED);
    finish(
        builder.header(ALLOW, ALLOWED_METHODS),
        StatusCode::METHOD_NOT_ALLOWED,
        body,
    )
}

/// Build OPTIONS response
pub fn build_options_response() -> Response<ResponseBody> {
    let builder = Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header(ALLOW, ALLOWED_METHODS);
    finish(builder, StatusCode::NO_CONTENT, empty_body())
}

/// Build 416 Range Not Satisfiable response
pub fn build_416_response(file_size: u64) -> Response<ResponseBody> {
    let status = StatusCode::RANGE_NOT_SATISFIABLE;
    let (builder, body) = build_status_response(status);
    finish(
        builder.header(CONTENT_RANGE, format!("bytes */{file_size}")),
        status,
        body,
    )
}

/// Build 500 Internal Server Error response
pub fn build_500_response() -> Response<ResponseBody> {
    build_plain_response(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Build 503 Service Unavailable response with a `Retry-After` hint in seconds
pub fn build_503_response(retry_after_secs: u64) -> Response<ResponseBody> {
    let status = StatusCode::SERVICE_UNAVAILABLE;
    let (builder, body) = build_status_response(status);
    finish(builder.header(RETRY_AFTER, retry_after_secs), status, body)
}

/// Build redirect response with the given status code
pub fn build_redirect_response_with_code(
    location: &str,
    status: StatusCode,
) -> Response<ResponseBody> {
    let body = format!(
        "<a href=\"{}\">{}</a>.\n",
        escape_html(location),
        status.canonical_reason().unwrap_or("Redirect")
    );
    let builder = Response::builder()
        .status(status)
        .header(LOCATION, location)
        .header(CONTENT_TYPE, "text/html; charset=utf-8")
        .header(CONTENT_LENGTH, body.len());
    finish(builder, status, full_body(body))
}

/// Build 200 OK response for a whole file
///
/// `content_length` is the size of the file; for HEAD requests `data` is empty.
pub fn build_file_response(
    data: ResponseBody,
    content_type: &str,
    etag: &str,
    last_modified: Option<&str>,
    content_length: u64,
) -> Response<ResponseBody> {
    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, content_type)
        .header(CONTENT_LENGTH, content_length)
        .header(ACCEPT_RANGES, "bytes")
        .header(ETAG, etag);
    if let Some(last_modified) = last_modified {
        builder = builder.header(LAST_MODIFIED, last_modified);
    }
    finish(builder, StatusCode::OK, data)
}

/// Build 206 Partial Content response
pub fn build_partial_response(
    data: ResponseBody,
    content_type: &str,
    etag: &str,
    last_modified: Option<&str>,
    range: &RangeInclusive<u64>,
    total_size: u64,
) -> Response<ResponseBody> {
    let (start, end) = (*range.start(), *range.end());
    let mut builder = Response::builder()
        .status(StatusCode::PARTIAL_CONTENT)
        .header(CONTENT_TYPE, content_type)
        .header(CONTENT_LENGTH, end - start + 1)
        .header(CONTENT_RANGE, format!("bytes {start}-{end}/{total_size}"))
        .header(ACCEPT_RANGES, "bytes")
        .header(ETAG, etag);
    if let Some(last_modified) = last_modified {
        builder = builder.header(LAST_MODIFIED, last_modified);
    }
    finish(builder, StatusCode::PARTIAL_CONTENT, data)
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
