//! Response construction.
//!
//! # Responsibilities
//! - Render a resolved route context as JSON
//! - Map no-match to 404 Not Found
//!
//! # Design Decisions
//! - Escaped strings are returned exactly as resolved, never re-encoded

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::routing::{ODataRouteContext, RouteMatch};

/// A single decoded query option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOption {
    pub name: String,
    pub value: String,
}

/// JSON body returned for a resolved request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub route: String,
    pub service_root: String,
    pub path_and_query: String,
    pub segments: Vec<String>,
    pub query: Vec<QueryOption>,
}

impl From<ODataRouteContext> for Resolution {
    fn from(ctx: ODataRouteContext) -> Self {
        Self {
            route: ctx.route_name,
            service_root: ctx.path.service_root,
            path_and_query: ctx.path_and_query,
            segments: ctx.path.segments,
            query: ctx
                .path
                .query
                .into_iter()
                .map(|(name, value)| QueryOption { name, value })
                .collect(),
        }
    }
}

impl IntoResponse for RouteMatch {
    fn into_response(self) -> Response {
        match self {
            RouteMatch::Matched(ctx) => Json(Resolution::from(ctx)).into_response(),
            RouteMatch::NotMatched => (StatusCode::NOT_FOUND, "No matching OData route").into_response(),
        }
    }
}
