//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (host, escaped path, query)
//!     → router.rs (ordered route lookup)
//!     → matcher.rs (host + unescaped prefix conditions)
//!     → constraint.rs (capture unescaped resource path)
//!         → service_root.rs (escaped left part, query reattachment)
//!             → boundary.rs (escaped split point)
//!         → path_handler.rs (structured path)
//!     → Return: RouteMatch::Matched(context) or RouteMatch::NotMatched
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - The escaped URI is cut, never re-escaped
//! - Resolution failures are ordinary no-match results

pub mod boundary;
pub mod constraint;
pub mod matcher;
pub mod path_handler;
pub mod router;
pub mod service_root;

pub use boundary::{resolve, BoundaryError};
pub use constraint::{ODataRouteConstraint, ODataRouteContext, RouteMatch};
pub use path_handler::{DefaultPathHandler, ODataPath, PathHandler, PathParseError};
pub use router::Router;
pub use service_root::{request_left_part, split_service_root, ServiceRootSplit};
