//! Byte range selection
//!
//! Only a single `bytes=` range is honoured. Malformed headers, other units
//! and multi-range requests fall back to the whole representation.

use std::ops::RangeInclusive;

/// Part of a representation selected by a `Range` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ByteRange {
    /// No usable range: send everything with 200
    Whole,
    /// Inclusive byte offsets to send with 206
    Partial(RangeInclusive<u64>),
    /// Syntactically valid but outside the representation: 416
    Unsatisfiable,
}

impl ByteRange {
    /// Number of bytes a partial range covers
    pub fn span(range: &RangeInclusive<u64>) -> u64 {
        range.end() - range.start() + 1
    }
}

/// Select the byte range requested for a representation of `len` bytes
///
/// # Examples
/// ```
/// use rust_fileserver::http::range::{parse_range_header, ByteRange};
///
/// assert_eq!(parse_range_header(Some("bytes=0-99"), 1000), ByteRange::Partial(0..=99));
/// assert_eq!(parse_range_header(Some("bytes=-10"), 1000), ByteRange::Partial(990..=999));
/// assert_eq!(parse_range_header(None, 1000), ByteRange::Whole);
/// ```
pub fn parse_range_header(header: Option<&str>, len: u64) -> ByteRange {
    let Some(set) = header.and_then(|h| h.trim().strip_prefix("bytes=")) else {
        return ByteRange::Whole;
    };
    if set.contains(',') {
        return ByteRange::Whole;
    }
    set.split_once('-')
        .and_then(|(first, last)| select(first.trim(), last.trim(), len))
        .unwrap_or(ByteRange::Whole)
}

/// `None` when either bound does not parse
fn select(first: &str, last: &str, len: u64) -> Option<ByteRange> {
    if first.is_empty() {
        // "-N": the final N bytes
        let suffix: u64 = last.parse().ok()?;
        if suffix == 0 || len == 0 {
            return Some(ByteRange::Unsatisfiable);
        }
        return Some(ByteRange::Partial(len - suffix.min(len)..=len - 1));
    }

    let start: u64 = first.parse().ok()?;
    let last: Option<u64> = if last.is_empty() {
        None
    } else {
        Some(last.parse().ok()?)
    };
    if start >= len {
        return Some(ByteRange::Unsatisfiable);
    }
    let end = last.map_or(len - 1, |e| e.min(len - 1));
    if end < start {
        return Some(ByteRange::Unsatisfiable);
    }
    Some(ByteRange::Partial(start..=end))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(header: &str, len: u64) -> ByteRange {
        parse_range_header(Some(header), len)
    }

    #[test]
    fn test_bounded_and_open_ranges() {
        assert_eq!(parse("bytes=0-9", 100), ByteRange::Partial(0..=9));
        assert_eq!(parse("bytes=50-", 100), ByteRange::Partial(50..=99));
        assert_eq!(parse(" bytes= 10 - 19 ", 100), ByteRange::Partial(10..=19));
    }

    #[test]
    fn test_end_is_clamped() {
        assert_eq!(parse("bytes=90-500", 100), ByteRange::Partial(90..=99));
    }

    #[test]
    fn test_suffix() {
        assert_eq!(parse("bytes=-20", 100), ByteRange::Partial(80..=99));
        assert_eq!(parse("bytes=-500", 100), ByteRange::Partial(0..=99));
    }

    #[test]
    fn test_unsatisfiable() {
        assert_eq!(parse("bytes=200-", 100), ByteRange::Unsatisfiable);
        assert_eq!(parse("bytes=100-100", 100), ByteRange::Unsatisfiable);
        assert_eq!(parse("bytes=20-10", 100), ByteRange::Unsatisfiable);
        assert_eq!(parse("bytes=-0", 100), ByteRange::Unsatisfiable);
        assert_eq!(parse("bytes=-5", 0), ByteRange::Unsatisfiable);
        assert_eq!(parse("bytes=0-", 0), ByteRange::Unsatisfiable);
    }

    #[test]
    fn test_ignored_headers_mean_whole() {
        assert_eq!(parse_range_header(None, 100), ByteRange::Whole);
        for header in ["items=0-9", "bytes=a-b", "bytes=0-x", "bytes=5", "bytes=0-9,20-29"] {
            assert_eq!(parse(header, 100), ByteRange::Whole, "{header}");
        }
    }

    #[test]
    fn test_span() {
        assert_eq!(ByteRange::span(&(10..=19)), 10);
        assert_eq!(ByteRange::span(&(0..=0)), 1);
    }
}
