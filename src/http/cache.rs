//! HTTP cache validation module
//!
//! Provides `ETag` generation and conditional request handling.

use chrono::{DateTime, Utc};
use std::time::{SystemTime, UNIX_EPOCH};

fn unix_secs(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH).map_or(0, |d| d.as_secs())
}

/// Generate a weak `ETag` from size and modification time
///
/// Cheap to compute without reading the content, e.g. `W/"6553f100-1f"`.
pub fn generate_etag(len: u64, modified: Option<SystemTime>) -> String {
    let secs = modified.map_or(0, unix_secs);
    format!("W/\"{secs:x}-{len:x}\"")
}

/// Check if client's `If-None-Match` header matches the server's `ETag`
///
/// Supports:
/// - Single `ETag`: `"abc123"`
/// - Multiple `ETags`: `"abc123", "def456"`
/// - Wildcard: `*`
///
/// Comparison is weak: a `W/` prefix on either side is ignored.
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    let opaque = |tag: &str| tag.trim().trim_start_matches("W/").to_string();
    let ours = opaque(etag);
    if_none_match.is_some_and(|client_etag| {
        client_etag
            .split(',')
            .any(|e| e.trim() == "*" || opaque(e) == ours)
    })
}

/// Format a timestamp as an HTTP-date (`Sun, 06 Nov 1994 08:49:37 GMT`)
pub fn http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time)
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}

/// Whether `modified` is not newer than the client's `If-Modified-Since`
///
/// Compared at one-second granularity; unparsable dates never match.
pub fn not_modified_since(if_modified_since: Option<&str>, modified: Option<SystemTime>) -> bool {
    let (Some(header), Some(modified)) = (if_modified_since, modified) else {
        return false;
    };
    DateTime::parse_from_rfc2822(header.trim()).is_ok_and(|since| {
        i64::try_from(unix_secs(modified)).is_ok_and(|secs| secs <= since.timestamp())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn at(secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(secs)
    }

    #[test]
    fn test_generate_etag() {
        let etag = generate_etag(31, Some(at(0x6553_f100)));
        assert_eq!(etag, "W/\"6553f100-1f\"");
        assert_eq!(generate_etag(0, None), "W/\"0-0\"");
    }

    #[test]
    fn test_etag_difference() {
        assert_ne!(generate_etag(1, Some(at(10))), generate_etag(2, Some(at(10))));
        assert_ne!(generate_etag(1, Some(at(10))), generate_etag(1, Some(at(11))));
    }

    #[test]
    fn test_check_etag_match() {
        let etag = "W/\"abc123\"";
        assert!(check_etag_match(Some("W/\"abc123\""), etag));
        assert!(check_etag_match(Some("\"abc123\""), etag));
        assert!(check_etag_match(Some("\"xyz\", W/\"abc123\""), etag));
        assert!(check_etag_match(Some("*"), etag));
        assert!(!check_etag_match(Some("\"different\""), etag));
        assert!(!check_etag_match(None, etag));
    }

    #[test]
    fn test_http_date() {
        assert_eq!(http_date(at(784_111_777)), "Sun, 06 Nov 1994 08:49:37 GMT");
    }

    #[test]
    fn test_not_modified_since() {
        let header = Some("Sun, 06 Nov 1994 08:49:37 GMT");
        assert!(not_modified_since(header, Some(at(784_111_777))));
        assert!(not_modified_since(header, Some(at(784_111_700))));
        assert!(!not_modified_since(header, Some(at(784_111_778))));
        assert!(!not_modified_since(Some("yesterday"), Some(at(1))));
        assert!(!not_modified_since(None, Some(at(1))));
        assert!(!not_modified_since(header, None));
    }
}
