//! Escape-aware boundary search between service root and resource path.
//!
//! # Responsibilities
//! - Locate where an unescaped resource path begins inside an escaped URI
//! - Never re-escape the resource path; only unescape candidate tails
//!
//! # Design Decisions
//! - Fast path: plain suffix comparison when nothing in the tail was escaped
//! - Slow path walks backward over `/` and `%2F` separators, so the first
//!   match found is the rightmost (longest prefix) split
//! - Pure function; no logging, no allocation on the fast path

use percent_encoding::percent_decode_str;
use thiserror::Error;

/// Escaped form of a `/` embedded in a segment.
pub const ESCAPED_SLASH: &str = "%2F";

/// Errors raised when the URI and resource path are inconsistent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoundaryError {
    /// Resource path is not shorter than the URI by at least one separator.
    #[error("request URI '{uri}' is too short to contain resource path '{path}'")]
    MalformedInput { uri: String, path: String },

    /// No separator exists at which the unescaped tail equals the resource path.
    #[error("resource path '{path}' not found at the end of request URI '{uri}'")]
    BoundaryNotFound { uri: String, path: String },
}

impl BoundaryError {
    fn malformed(uri: &str, path: &str) -> Self {
        Self::MalformedInput {
            uri: uri.to_string(),
            path: path.to_string(),
        }
    }

    fn not_found(uri: &str, path: &str) -> Self {
        Self::BoundaryNotFound {
            uri: uri.to_string(),
            path: path.to_string(),
        }
    }
}

/// Returns the escaped prefix of `uri` whose unescaped remainder is exactly
/// `resource_path`.
///
/// The returned prefix ends with the separator that introduces the resource
/// path: a literal `/`, or the full three characters of an escaped slash.
///
/// ```
/// use odata_router::routing::boundary::resolve;
///
/// let root = resolve("http://localhost/odata/Caf%C3%A9", "Café").unwrap();
/// assert_eq!(root, "http://localhost/odata/");
/// ```
pub fn resolve<'a>(uri: &'a str, resource_path: &str) -> Result<&'a str, BoundaryError> {
    let mut end = match uri.len().checked_sub(resource_path.len() + 1) {
        Some(end) if end > 0 => end,
        _ => return Err(BoundaryError::malformed(uri, resource_path)),
    };

    if let (Some(start), Some(tail)) = (uri.get(..=end), uri.get(end + 1..)) {
        if tail == resource_path {
            return Ok(start);
        }
    }

    let bytes = uri.as_bytes();
    loop {
        let window = &bytes[..end];
        let slash = window.iter().rposition(|&b| b == b'/');
        let escaped = rfind_escaped_slash(window);

        end = match (slash, escaped) {
            (Some(slash), Some(escaped)) if slash > escaped => slash,
            (Some(slash), None) => slash,
            (_, Some(escaped)) => escaped + 2,
            (None, None) => return Err(BoundaryError::not_found(uri, resource_path)),
        };

        // `end` sits on an ASCII byte, so both slices fall on char boundaries.
        let (start, tail) = uri.split_at(end + 1);
        if unescaped_eq(tail, resource_path) {
            return Ok(start);
        }

        if end == 0 {
            return Err(BoundaryError::not_found(uri, resource_path));
        }
    }
}

/// Returns true if `s` ends with an escaped slash in any hex-digit case.
pub fn ends_with_escaped_slash(s: &str) -> bool {
    s.len() >= ESCAPED_SLASH.len()
        && s.as_bytes()[s.len() - ESCAPED_SLASH.len()..].eq_ignore_ascii_case(ESCAPED_SLASH.as_bytes())
}

/// Position of the last `%2F` token lying entirely within `window`.
fn rfind_escaped_slash(window: &[u8]) -> Option<usize> {
    window
        .windows(ESCAPED_SLASH.len())
        .rposition(|token| token.eq_ignore_ascii_case(ESCAPED_SLASH.as_bytes()))
}

fn unescaped_eq(escaped: &str, expected: &str) -> bool {
    percent_decode_str(escaped)
        .decode_utf8()
        .map(|decoded| decoded == expected)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unescaped_tail_takes_fast_path() {
        for (root, tail) in [
            ("http://host/odata", "Items"),
            ("http://host/odata", "Items(1)"),
            ("http://host/a/b/c", "Products"),
            ("/svc", "$metadata"),
        ] {
            let uri = format!("{}/{}", root, tail);
            assert_eq!(resolve(&uri, tail).unwrap(), format!("{}/", root));
        }
    }

    #[test]
    fn test_multi_segment_tail() {
        assert_eq!(
            resolve("http://host/odata/Customers(1)/Orders", "Customers(1)/Orders").unwrap(),
            "http://host/odata/"
        );
    }

    #[test]
    fn test_unicode_escapes_in_function_argument() {
        let uri = "http://localhost/odata/FunctionCall(p0='Chinese%E8%A5%BF%E9%9B%85%E5%9B%BEChars')";
        assert_eq!(
            resolve(uri, "FunctionCall(p0='Chinese西雅图Chars')").unwrap(),
            "http://localhost/odata/"
        );
    }

    #[test]
    fn test_escaped_slash_inside_resource_path() {
        assert_eq!(
            resolve("/odata/Items('a%2Fb')", "Items('a/b')").unwrap(),
            "/odata/"
        );
        assert_eq!(resolve("/odata/%2Fabc", "/abc").unwrap(), "/odata/");
    }

    #[test]
    fn test_escaped_slash_as_separator() {
        assert_eq!(resolve("/svc%2FCaf%C3%A9", "Café").unwrap(), "/svc%2F");
        // Unescaped tail of equal length hits the fast path.
        assert_eq!(resolve("/svc%2FItems", "Items").unwrap(), "/svc%2F");
    }

    #[test]
    fn test_escaped_slash_is_case_insensitive() {
        assert_eq!(resolve("/svc%2fCaf%C3%A9", "Café").unwrap(), "/svc%2f");
        assert_eq!(resolve("/svc%2FCaf%c3%a9", "Café").unwrap(), "/svc%2F");
    }

    #[test]
    fn test_unnecessary_escaping_and_hex_case() {
        assert_eq!(resolve("http://host/odata/%49tems", "Items").unwrap(), "http://host/odata/");
        assert_eq!(resolve("http://host/odata/a%2ab", "a*b").unwrap(), "http://host/odata/");
    }

    #[test]
    fn test_rightmost_split_wins() {
        assert_eq!(resolve("/%61/%61", "a").unwrap(), "/%61/");
        // The escaped slash sits closer to the end than any literal slash.
        assert_eq!(resolve("/x/%61%2F%61", "a").unwrap(), "/x/%61%2F");
        assert_eq!(resolve("/%61/%61/%61", "a").unwrap(), "/%61/%61/");
        assert_eq!(resolve("/%61/%61/%61", "a/a").unwrap(), "/%61/");
    }

    #[test]
    fn test_empty_resource_path_returns_whole_uri() {
        assert_eq!(resolve("http://host/odata/", "").unwrap(), "http://host/odata/");
        assert_eq!(resolve("http://host/odata", "").unwrap(), "http://host/odata");
    }

    #[test]
    fn test_resource_path_too_long() {
        let err = resolve("http://host/o", "http://host/o").unwrap_err();
        assert_eq!(
            err,
            BoundaryError::MalformedInput {
                uri: "http://host/o".into(),
                path: "http://host/o".into(),
            }
        );
        assert!(matches!(resolve("/a", "a"), Err(BoundaryError::MalformedInput { .. })));
        assert!(matches!(resolve("", ""), Err(BoundaryError::MalformedInput { .. })));
    }

    #[test]
    fn test_resource_path_absent() {
        let err = resolve("http://host/odata/Items", "NotThere").unwrap_err();
        assert_eq!(
            err,
            BoundaryError::BoundaryNotFound {
                uri: "http://host/odata/Items".into(),
                path: "NotThere".into(),
            }
        );
    }

    #[test]
    fn test_no_separator_anywhere() {
        assert!(matches!(
            resolve("abcdef%41", "xyzA"),
            Err(BoundaryError::BoundaryNotFound { .. })
        ));
    }

    #[test]
    fn test_invalid_utf8_tail_never_matches() {
        assert!(matches!(
            resolve("/odata/%FF%FE", "\u{FFFD}\u{FFFD}"),
            Err(BoundaryError::BoundaryNotFound { .. })
        ));
    }

    #[test]
    fn test_ends_with_escaped_slash() {
        assert!(ends_with_escaped_slash("http://host/svc%2F"));
        assert!(ends_with_escaped_slash("http://host/svc%2f"));
        assert!(!ends_with_escaped_slash("http://host/svc/"));
        assert!(!ends_with_escaped_slash("2F"));
    }
}
