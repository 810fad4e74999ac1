//! Route lookup.
//!
//! # Responsibilities
//! - Store compiled OData routes
//! - Look up the route matching a request
//! - Return the resolved context or explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Routes ordered by descending priority; ties keep config order
//! - First route whose matchers pass and whose constraint resolves wins
//! - The prefix is checked only by the constraint, which captures the path

use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;

use crate::config::{PathHandlerConfig, RouteConfig};
use crate::routing::constraint::{ODataRouteConstraint, RouteMatch};
use crate::routing::matcher::{AndMatcher, HostMatcher, Matcher};
use crate::routing::path_handler::{DefaultPathHandler, PathHandler};

/// A route compiled from configuration.
#[derive(Debug)]
pub struct CompiledRoute {
    pub name: String,
    pub priority: u32,
    matcher: AndMatcher,
    constraint: ODataRouteConstraint,
}

/// Immutable route table.
#[derive(Debug, Default)]
pub struct Router {
    routes: Vec<CompiledRoute>,
}

impl Router {
    /// Compile routes using the default path handler.
    pub fn from_config(routes: Vec<RouteConfig>, handler_config: &PathHandlerConfig) -> Self {
        let handler = Arc::new(DefaultPathHandler::new(handler_config.allow_empty_segments));
        Self::with_handler(routes, handler)
    }

    /// Compile routes sharing a custom path handler.
    pub fn with_handler(mut routes: Vec<RouteConfig>, handler: Arc<dyn PathHandler>) -> Self {
        // Stable sort keeps config order among equal priorities.
        routes.sort_by(|a, b| b.priority.cmp(&a.priority));

        let routes = routes
            .into_iter()
            .map(|route| {
                let mut matchers: Vec<Box<dyn Matcher>> = Vec::new();
                if let Some(host) = &route.host {
                    matchers.push(Box::new(HostMatcher::new(host.clone())));
                }

                CompiledRoute {
                    constraint: ODataRouteConstraint::new(
                        route.name.clone(),
                        route.route_prefix,
                        handler.clone(),
                    ),
                    matcher: AndMatcher::new(matchers),
                    name: route.name,
                    priority: route.priority,
                }
            })
            .collect();

        Self { routes }
    }

    /// Find the first route that resolves the request.
    pub fn match_request(&self, req: &Request<Body>) -> RouteMatch {
        for route in &self.routes {
            if !route.matcher.matches(req) {
                continue;
            }
            if let RouteMatch::Matched(ctx) = route.constraint.match_request(req) {
                return RouteMatch::Matched(ctx);
            }
            tracing::trace!(route = %route.name, "Route prefix matched but path did not resolve");
        }
        RouteMatch::NotMatched
    }

    pub fn routes(&self) -> &[CompiledRoute] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(name: &str, prefix: &str, host: Option<&str>, priority: u32) -> RouteConfig {
        RouteConfig {
            name: name.into(),
            route_prefix: prefix.into(),
            host: host.map(Into::into),
            priority,
        }
    }

    fn request(uri: &str, host: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header("Host", host)
            .body(Body::default())
            .unwrap()
    }

    fn matched_name(router: &Router, req: &Request<Body>) -> Option<String> {
        match router.match_request(req) {
            RouteMatch::Matched(ctx) => Some(ctx.route_name),
            RouteMatch::NotMatched => None,
        }
    }

    #[test]
    fn test_priority_order() {
        let router = Router::from_config(
            vec![
                route("catch-all", "", None, 0),
                route("v4", "odata/v4", None, 10),
            ],
            &PathHandlerConfig::default(),
        );

        assert_eq!(router.routes()[0].name, "v4");
        assert_eq!(
            matched_name(&router, &request("/odata/v4/Items", "localhost")),
            Some("v4".into())
        );
        assert_eq!(
            matched_name(&router, &request("/odata/v3/Items", "localhost")),
            Some("catch-all".into())
        );
    }

    #[test]
    fn test_host_restriction() {
        let router = Router::from_config(
            vec![route("tenant", "odata", Some("tenant.example.com"), 0)],
            &PathHandlerConfig::default(),
        );

        assert!(router.match_request(&request("/odata/Items", "tenant.example.com")).is_matched());
        assert!(!router.match_request(&request("/odata/Items", "other.example.com")).is_matched());
    }

    #[test]
    fn test_falls_through_to_next_route() {
        let router = Router::from_config(
            vec![
                route("strict", "odata", None, 5),
                route("fallback", "", None, 0),
            ],
            &PathHandlerConfig::default(),
        );

        // Both routes reject the empty interior segment.
        assert_eq!(matched_name(&router, &request("/odata/a//b", "localhost")), None);
        assert_eq!(
            matched_name(&router, &request("/odata/Items", "localhost")),
            Some("strict".into())
        );
        assert_eq!(
            matched_name(&router, &request("/Items", "localhost")),
            Some("fallback".into())
        );
    }

    #[test]
    fn test_lenient_handler() {
        let router = Router::from_config(
            vec![route("odata", "odata", None, 0)],
            &PathHandlerConfig { allow_empty_segments: true },
        );
        assert!(router.match_request(&request("/odata/a//b", "localhost")).is_matched());
    }

    #[test]
    fn test_prefix_left_to_constraint() {
        let router = Router::from_config(
            vec![route("tenant", "odata", Some("tenant.example.com"), 0)],
            &PathHandlerConfig::default(),
        );
        let outside = request("/images/logo.png", "tenant.example.com");

        // Pre-matching only looks at the host.
        assert!(router.routes()[0].matcher.matches(&outside));
        assert!(!router.routes()[0].matcher.matches(&request("/odata/Items", "other.example.com")));
        assert!(!router.match_request(&outside).is_matched());
    }

    #[test]
    fn test_empty_router() {
        let router = Router::default();
        assert!(router.is_empty());
        assert!(!router.match_request(&request("/odata", "localhost")).is_matched());
    }
}
