//! Request pre-matching.
//!
//! # Responsibilities
//! - Match host (exact match, case-insensitive, port ignored)
//! - Match route prefix against the unescaped path, segment-aware
//! - Combine conditions with AND semantics
//!
//! # Design Decisions
//! - Prefixes are configured in unescaped form, so the path is unescaped first
//! - Empty prefix = matches every path
//! - `/odata` matches `/odata` and `/odata/...`, never `/odatax`

use axum::body::Body;
use axum::http::{header, Request};
use percent_encoding::percent_decode_str;

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches(&self, req: &Request<Body>) -> bool;
}

/// Host and optional port of the request: URI authority first, then the
/// Host header. Userinfo is never part of the result.
pub(crate) fn request_authority(req: &Request<Body>) -> Option<String> {
    if let Some(authority) = req.uri().authority() {
        return Some(match authority.port() {
            Some(port) => format!("{}:{}", authority.host(), port),
            None => authority.host().to_string(),
        });
    }
    let host = req.headers().get(header::HOST)?.to_str().ok()?;
    Some(host.rsplit_once('@').map_or(host, |(_, host)| host).to_string())
}

/// Matches the request host.
#[derive(Debug, Clone)]
pub struct HostMatcher {
    expected_host: String,
}

impl HostMatcher {
    /// The host is normalized to lowercase for case-insensitive matching.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            expected_host: host.into().to_lowercase(),
        }
    }
}

impl Matcher for HostMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        request_authority(req)
            .map(|authority| {
                let authority = authority.as_str();
                let host = authority.rsplit_once(':').map_or(authority, |(host, port)| {
                    if port.chars().all(|c| c.is_ascii_digit()) { host } else { authority }
                });
                host.eq_ignore_ascii_case(&self.expected_host)
            })
            .unwrap_or(false)
    }
}

/// Matches the unescaped route prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into().trim_matches('/').to_string(),
        }
    }

    /// Returns the unescaped resource path following the prefix, if the
    /// unescaped `path` lies under it.
    pub fn capture(&self, path: &str) -> Option<String> {
        let decoded = percent_decode_str(path).decode_utf8().ok()?;
        let decoded: &str = &decoded;
        let rest = decoded.strip_prefix('/').unwrap_or(decoded);

        if self.prefix.is_empty() {
            return Some(rest.to_string());
        }

        let tail = rest.strip_prefix(self.prefix.as_str())?;
        if tail.is_empty() {
            Some(String::new())
        } else {
            tail.strip_prefix('/').map(str::to_string)
        }
    }
}

impl Matcher for PathPrefixMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        self.capture(req.uri().path()).is_some()
    }
}

/// Combines multiple matchers with AND semantics.
#[derive(Debug)]
pub struct AndMatcher {
    matchers: Vec<Box<dyn Matcher>>,
}

impl AndMatcher {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }
}

impl Matcher for AndMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        self.matchers.iter().all(|m| m.matches(req))
    }
}
