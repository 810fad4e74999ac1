//! OData route constraint.
//!
//! # Responsibilities
//! - Capture the unescaped resource path below the route prefix
//! - Compose the escaped service root and path+query for the request
//! - Run the path handler and report an explicit match result
//!
//! # Design Decisions
//! - Resolver and handler failures become `RouteMatch::NotMatched`
//! - The resolved context is returned by value, never stashed on the request

use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use serde::Serialize;

use crate::routing::matcher::{request_authority, PathPrefixMatcher};
use crate::routing::path_handler::{ODataPath, PathHandler};
use crate::routing::service_root::{request_left_part, split_service_root};

/// Everything downstream components need about a matched request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ODataRouteContext {
    /// Name of the matched route.
    pub route_name: String,
    /// Escaped service root, without a trailing escaped slash.
    pub service_root: String,
    /// Escaped resource path plus query, as handed to the path handler.
    pub path_and_query: String,
    /// Structured path produced by the path handler.
    pub path: ODataPath,
}

/// Outcome of evaluating a request against a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteMatch {
    Matched(ODataRouteContext),
    NotMatched,
}

impl RouteMatch {
    pub fn is_matched(&self) -> bool {
        matches!(self, RouteMatch::Matched(_))
    }
}

/// Resolves the service root and resource path of requests below a prefix.
#[derive(Debug, Clone)]
pub struct ODataRouteConstraint {
    route_name: String,
    prefix: PathPrefixMatcher,
    handler: Arc<dyn PathHandler>,
}

impl ODataRouteConstraint {
    pub fn new(
        route_name: impl Into<String>,
        route_prefix: impl Into<String>,
        handler: Arc<dyn PathHandler>,
    ) -> Self {
        Self {
            route_name: route_name.into(),
            prefix: PathPrefixMatcher::new(route_prefix),
            handler,
        }
    }

    pub fn route_name(&self) -> &str {
        &self.route_name
    }

    /// Evaluates the request. Requests without a host never match.
    pub fn match_request(&self, req: &Request<Body>) -> RouteMatch {
        let uri = req.uri();

        let Some(resource_path) = self.prefix.capture(uri.path()) else {
            return RouteMatch::NotMatched;
        };

        let Some(authority) = request_authority(req) else {
            tracing::debug!(route = %self.route_name, "Request has no host");
            return RouteMatch::NotMatched;
        };

        let scheme = uri.scheme_str().unwrap_or("http");
        let left_part = request_left_part(scheme, &authority, uri.path());

        let split = match split_service_root(&left_part, &resource_path, uri.query()) {
            Ok(split) => split,
            Err(e) => {
                tracing::debug!(route = %self.route_name, error = %e, "Service root not resolved");
                return RouteMatch::NotMatched;
            }
        };

        match self.handler.parse(&split.service_root, &split.path_and_query) {
            Ok(path) => RouteMatch::Matched(ODataRouteContext {
                route_name: self.route_name.clone(),
                service_root: split.service_root,
                path_and_query: split.path_and_query,
                path,
            }),
            Err(e) => {
                tracing::debug!(route = %self.route_name, error = %e, "Path handler rejected request");
                RouteMatch::NotMatched
            }
        }
    }
}
