//! Mapping of filesystem outcomes to HTTP status codes

use crate::http::{self, ResponseBody};
use hyper::{Response, StatusCode};
use std::io;
use std::time::Duration;
use thiserror::Error;

/// Why a request could not be served
///
/// Every variant but `NotFound` carries the underlying error for logging.
/// `NotFound` covers missing entries, hidden entries and directories
/// without an index alike.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("not found")]
    NotFound,

    #[error("permission denied: {0}")]
    PermissionDenied(#[source] io::Error),

    /// Opening failed for another reason, typically descriptor exhaustion
    #[error("file system unavailable: {source}")]
    Unavailable {
        #[source]
        source: io::Error,
        retry_after: Duration,
    },

    /// Stat failed after a successful open
    #[error("stat failed: {0}")]
    Internal(#[source] io::Error),
}

impl ServeError {
    /// Classify a failed `open`
    pub fn from_open(err: io::Error, retry_after: Duration) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound,
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(err),
            _ => Self::Unavailable {
                source: err,
                retry_after,
            },
        }
    }

    /// Classify a failed `stat` on an opened handle
    pub fn from_stat(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound,
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(err),
            _ => Self::Internal(err),
        }
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::PermissionDenied(_) => StatusCode::FORBIDDEN,
            Self::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Underlying error worth logging, if any
    pub const fn diagnostic(&self) -> Option<&io::Error> {
        match self {
            Self::NotFound => None,
            Self::PermissionDenied(err)
            | Self::Internal(err)
            | Self::Unavailable { source: err, .. } => Some(err),
        }
    }

    pub const fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::Unavailable { retry_after, .. } => Some(*retry_after),
            _ => None,
        }
    }

    /// Client-facing response: status text only, plus `Retry-After` for 503
    pub fn to_response(&self) -> Response<ResponseBody> {
        match self {
            Self::NotFound => http::build_404_response(),
            Self::PermissionDenied(_) => http::build_403_response(),
            Self::Unavailable { retry_after, .. } => {
                // Rounded up to whole seconds
                let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
                http::build_503_response(secs)
            }
            Self::Internal(_) => http::build_500_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RETRY: Duration = Duration::from_secs(5);

    #[test]
    fn test_open_mapping() {
        let err = ServeError::from_open(io::ErrorKind::NotFound.into(), RETRY);
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert!(err.diagnostic().is_none());

        let err = ServeError::from_open(io::ErrorKind::PermissionDenied.into(), RETRY);
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        assert!(err.diagnostic().is_some());

        let err = ServeError::from_open(io::Error::other("too many open files"), RETRY);
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.retry_after(), Some(RETRY));
        assert!(err.diagnostic().is_some());
    }

    #[test]
    fn test_stat_mapping() {
        assert_eq!(
            ServeError::from_stat(io::ErrorKind::NotFound.into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServeError::from_stat(io::ErrorKind::PermissionDenied.into()).status(),
            StatusCode::FORBIDDEN
        );
        let err = ServeError::from_stat(io::Error::other("io failure"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.retry_after().is_none());
        assert!(err.diagnostic().is_some());
    }

    #[test]
    fn test_source_chain() {
        use std::error::Error as _;
        let err = ServeError::from_stat(io::Error::other("disk gone"));
        assert_eq!(err.source().unwrap().to_string(), "disk gone");
        assert!(ServeError::NotFound.source().is_none());
    }

    #[test]
    fn test_to_response() {
        let err = ServeError::from_open(io::Error::other("emfile"), RETRY);
        let resp = err.to_response();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(resp.headers().get("Retry-After").unwrap(), "5");

        let resp = ServeError::NotFound.to_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert!(resp.headers().get("Retry-After").is_none());
    }

    #[test]
    fn test_retry_after_rounds_up() {
        let header = |delay: Duration| {
            let err = ServeError::from_open(io::Error::other("busy"), delay);
            let resp = err.to_response();
            assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
            resp.headers()["retry-after"].to_str().unwrap().to_string()
        };
        assert_eq!(header(Duration::from_millis(500)), "1");
        assert_eq!(header(Duration::from_millis(2_001)), "3");
        assert_eq!(header(Duration::from_secs(5)), "5");
    }
}
