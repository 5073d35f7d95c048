//! Trailing-slash redirect policy
//!
//! Directories are addressed with a trailing slash, files without one.

use super::path::{base_name, clean};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// Characters escaped when a decoded path goes back into a `Location` header
const PATH_ESCAPE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Decide whether the request must be redirected
///
/// `url_path` is the request path as received (leading slash ensured),
/// `is_dir` comes from the stat of the entry it named, before any index
/// substitution. Returns the `Location` value, with the raw query string
/// re-attached, when a redirect is required.
pub fn canonical_redirect(url_path: &str, is_dir: bool, query: Option<&str>) -> Option<String> {
    let target = match (is_dir, url_path.ends_with('/')) {
        (true, false) => format!("{}/", base_name(url_path)),
        (false, true) => format!("../{}", base_name(url_path)),
        _ => return None,
    };
    Some(location(url_path, &target, query))
}

/// Resolve `target` against the directory of `url_path`
fn location(url_path: &str, target: &str, query: Option<&str>) -> String {
    let dir_end = url_path.rfind('/').map_or(0, |i| i + 1);
    let mut resolved = clean(&format!("/{}{target}", &url_path[..dir_end]));
    if target.ends_with('/') && !resolved.ends_with('/') {
        resolved.push('/');
    }

    let mut location = utf8_percent_encode(&resolved, PATH_ESCAPE).to_string();
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        location.push('?');
        location.push_str(query);
    }
    location
}
