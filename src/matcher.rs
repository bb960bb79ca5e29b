//! Pattern-to-path matching.
//!
//! A route pattern is a `/`-delimited sequence of literal segments and named
//! parameter segments prefixed with `:`, e.g. `/users/:id`. Matching is a
//! pure function of pattern and path with no side effects, so the router and
//! the tests call the same code.

use std::collections::HashMap;

use percent_encoding::percent_decode_str;

/// Matches `path` against `pattern`, returning the bound parameters on
/// success.
///
/// Both strings are split on `/` with empty segments discarded, so leading
/// and trailing slashes are insignificant. The segment counts must agree;
/// there are no optional or wildcard segments. A `:name` segment binds the
/// percent-decoded path segment under `name`; a literal segment must be equal
/// byte-for-byte, case-sensitive.
///
/// ```
/// use tsuji::match_path;
///
/// let params = match_path("/users/:id", "/users/42").unwrap();
/// assert_eq!(params.get("id").map(String::as_str), Some("42"));
///
/// assert!(match_path("/users/:id", "/users").is_none());
/// assert!(match_path("/users", "/users/").unwrap().is_empty());
/// ```
pub fn match_path(pattern: &str, path: &str) -> Option<HashMap<String, String>> {
    let pattern_segments: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
    let path_segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    if pattern_segments.len() != path_segments.len() {
        return None;
    }

    let mut params = HashMap::new();
    for (pattern_segment, path_segment) in pattern_segments.iter().zip(&path_segments) {
        if let Some(name) = pattern_segment.strip_prefix(':') {
            let value = percent_decode_str(path_segment).decode_utf8_lossy().into_owned();
            params.insert(name.to_owned(), value);
        } else if pattern_segment != path_segment {
            return None;
        }
    }

    Some(params)
}
