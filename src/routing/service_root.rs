//! Service root composition.
//!
//! # Responsibilities
//! - Build the escaped request left part (`scheme://authority/path`)
//! - Split it into escaped service root and escaped path+query
//! - Trim a trailing escaped slash from the service root
//!
//! # Design Decisions
//! - The query string is never inspected; it is reattached verbatim
//! - The service document (empty resource path) skips the boundary search

use crate::routing::boundary::{self, BoundaryError, ESCAPED_SLASH};

/// Escaped service root and the escaped remainder of the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRootSplit {
    /// Escaped prefix preceding the resource path.
    pub service_root: String,
    /// Escaped resource path, followed by `?query` when the request had one.
    pub path_and_query: String,
}

/// Builds the escaped left part of a request URI, without query or fragment.
pub fn request_left_part(scheme: &str, authority: &str, path: &str) -> String {
    let mut left = String::with_capacity(scheme.len() + authority.len() + path.len() + 4);
    left.push_str(scheme);
    left.push_str("://");
    left.push_str(authority);
    if !path.starts_with('/') {
        left.push('/');
    }
    left.push_str(path);
    left
}

/// Splits `left_part` at the point where the unescaped `resource_path` begins.
pub fn split_service_root(
    left_part: &str,
    resource_path: &str,
    query: Option<&str>,
) -> Result<ServiceRootSplit, BoundaryError> {
    let root = if resource_path.is_empty() {
        left_part
    } else {
        boundary::resolve(left_part, resource_path)?
    };

    let mut path_and_query = left_part[root.len()..].to_string();
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        path_and_query.push('?');
        path_and_query.push_str(query);
    }

    // The path handler appends a literal '/' to the root.
    let service_root = if boundary::ends_with_escaped_slash(root) {
        &root[..root.len() - ESCAPED_SLASH.len()]
    } else {
        root
    };

    Ok(ServiceRootSplit {
        service_root: service_root.to_string(),
        path_and_query,
    })
}
