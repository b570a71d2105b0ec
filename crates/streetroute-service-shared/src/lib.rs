//! Shared infrastructure for the streetroute HTTP service.
//!
//! - [`AppState`]: the route resolver built from the loaded street graph
//! - [`health`]: liveness/readiness probe handlers
//! - [`ProblemDetails`]: RFC 9457 error responses
//! - [`ServiceResponse`]: wrapper for successful responses
//! - [`metrics`], [`logging`], [`middleware`]: observability
//! - [`ServiceConfig`]: environment-driven configuration
//!
//! Handlers stay thin: all routing logic lives in `streetroute-lib`.
//!
//! # Testing Support
//!
//! The [`test_utils`] module provides a synthetic graph and shared state for
//! handler tests. Enable the `test-utils` feature to access it from dependent
//! crates.

#![deny(warnings)]

mod config;
mod health;
pub mod logging;
pub mod metrics;
pub mod middleware;
mod problem;
mod request;
mod response;
mod state;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::{ServiceConfig, DEFAULT_METRICS_PATH, DEFAULT_PLACE, DEFAULT_PORT};
pub use health::{health_live, health_ready, HealthStatus};
pub use logging::{init_logging, LogFormat};
pub use metrics::{
    init_metrics, metrics_handler, record_route_calculated, record_route_failed,
    record_route_length, record_route_nodes, MetricsError,
};
pub use middleware::{extract_or_generate_request_id, MetricsLayer, RequestId};
pub use problem::{
    from_lib_error, ProblemDetails, ProblemKind, PROBLEM_INTERNAL_ERROR, PROBLEM_INVALID_REQUEST,
    PROBLEM_ROUTE_NOT_FOUND,
};
pub use request::{RouteQuery, Validate};
pub use response::ServiceResponse;
pub use state::{AppState, AppStateError};
