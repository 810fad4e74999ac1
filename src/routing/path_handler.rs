//! Path handler strategy.
//!
//! A path handler receives the escaped service root and the escaped
//! path+query remainder and turns them into structured path metadata, or
//! rejects the request. Resource semantics (entity sets, keys, navigation)
//! belong to implementations; the default handler only splits segments.

use percent_encoding::percent_decode_str;
use serde::Serialize;
use thiserror::Error;

/// Errors returned by a path handler. All of them mean "route does not match".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathParseError {
    #[error("segment '{0}' is not valid UTF-8 after unescaping")]
    InvalidEncoding(String),

    #[error("empty segment at position {0}")]
    EmptySegment(usize),

    #[error("{0}")]
    Rejected(String),
}

/// Structured metadata for a resolved resource path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ODataPath {
    /// Service root, always ending in a literal `/`.
    pub service_root: String,
    /// Unescaped path segments. Escaped slashes stay inside their segment.
    pub segments: Vec<String>,
    /// Decoded query options in request order.
    pub query: Vec<(String, String)>,
    /// Escaped path+query as received.
    pub raw: String,
}

/// Parses an escaped resource path relative to a service root.
pub trait PathHandler: Send + Sync + std::fmt::Debug {
    fn parse(&self, service_root: &str, path_and_query: &str) -> Result<ODataPath, PathParseError>;
}

/// Splits the escaped path on literal `/` and unescapes each segment.
#[derive(Debug, Clone, Default)]
pub struct DefaultPathHandler {
    allow_empty_segments: bool,
}

impl DefaultPathHandler {
    pub fn new(allow_empty_segments: bool) -> Self {
        Self { allow_empty_segments }
    }
}

impl PathHandler for DefaultPathHandler {
    fn parse(&self, service_root: &str, path_and_query: &str) -> Result<ODataPath, PathParseError> {
        let (path, query) = match path_and_query.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (path_and_query, None),
        };

        let mut segments = Vec::new();
        if !path.is_empty() {
            let last = path.split('/').count() - 1;
            for (position, raw) in path.split('/').enumerate() {
                if raw.is_empty() {
                    // A single trailing '/' is tolerated.
                    if (position > 0 && position == last) || self.allow_empty_segments {
                        continue;
                    }
                    return Err(PathParseError::EmptySegment(position));
                }
                let segment = percent_decode_str(raw)
                    .decode_utf8()
                    .map_err(|_| PathParseError::InvalidEncoding(raw.to_string()))?;
                segments.push(segment.into_owned());
            }
        }

        let query: Vec<(String, String)> = query
            .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();

        let mut service_root = service_root.to_string();
        if !service_root.ends_with('/') {
            service_root.push('/');
        }

        Ok(ODataPath {
            service_root,
            segments,
            query,
            raw: path_and_query.to_string(),
        })
    }
}
