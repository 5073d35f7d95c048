//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, path
//! decoding, dispatch to the file server and access logging.

use crate::config::AppState;
use crate::fileserver::{FileServer, ServeError};
use crate::http::{self, RequestContext, ResponseBody};
use crate::logger::{self, AccessLogEntry};
use crate::vfs::FileSystem;
use hyper::body::Body;
use hyper::header::{HeaderName, CONTENT_LENGTH, REFERER, USER_AGENT};
use hyper::{Method, Request, Response, StatusCode, Version};
use percent_encoding::percent_decode_str;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<ResponseBody>, Infallible> {
    let started = Instant::now();
    let response = dispatch(&req, &state.file_server).await;

    let logging = &state.config.logging;
    if logging.access_log {
        let entry = access_entry(&req, &response, peer_addr, started);
        logger::log_access(&entry, &logging.access_log_format);
    }
    Ok(response)
}

/// Answer `req` from `server`
pub async fn dispatch<F, B>(
    req: &Request<B>,
    server: &FileServer<F>,
) -> Response<ResponseBody>
where
    F: FileSystem,
{
    if let Some(resp) = check_http_method(req.method()) {
        return resp;
    }

    let raw_path = req.uri().path();
    let Ok(path) = percent_decode_str(raw_path).decode_utf8() else {
        tracing::debug!(path = raw_path, "request path is not valid UTF-8");
        return http::build_400_response();
    };

    let ctx = RequestContext::from_request(req, &path);
    match server.serve(&ctx).await {
        Ok(resp) => resp,
        Err(err) => {
            log_serve_error(&path, &err);
            err.to_response()
        }
    }
}

/// Check HTTP method and return appropriate response for non-GET/HEAD methods
fn check_http_method(method: &Method) -> Option<Response<ResponseBody>> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(http::build_options_response()),
        _ => {
            tracing::debug!(%method, "method not allowed");
            Some(http::build_405_response())
        }
    }
}

fn log_serve_error(path: &str, err: &ServeError) {
    let status = err.status().as_u16();
    let Some(source) = err.diagnostic() else {
        return;
    };
    if err.status() == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!(path, status, error = %source, "{err}");
    } else {
        tracing::warn!(path, status, error = %source, "{err}");
    }
}

fn access_entry<B>(
    req: &Request<B>,
    resp: &Response<ResponseBody>,
    peer_addr: SocketAddr,
    started: Instant,
) -> AccessLogEntry {
    let header = |name: HeaderName| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = version_label(req.version()).to_string();
    entry.status = resp.status().as_u16();
    entry.body_bytes = resp
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .or_else(|| resp.body().size_hint().exact())
        .unwrap_or(0);
    entry.referer = header(REFERER);
    entry.user_agent = header(USER_AGENT);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    entry
}

fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
