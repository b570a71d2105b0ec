//! RFC 9457 problem documents for route API failures.
//!
//! See <https://www.rfc-editor.org/rfc/rfc9457.html>.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use streetroute_lib::Error as LibError;

pub const PROBLEM_ROUTE_NOT_FOUND: &str = "/problems/route-not-found";
pub const PROBLEM_INVALID_REQUEST: &str = "/problems/invalid-request";
pub const PROBLEM_INTERNAL_ERROR: &str = "/problems/internal-error";

const PROBLEM_CONTENT_TYPE: &str = "application/problem+json";

/// The failure classes a route request can end in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProblemKind {
    /// Missing or malformed query parameters (400).
    InvalidRequest,
    /// The snapped endpoints are not connected (404).
    RouteNotFound,
    /// Anything else (500).
    Internal,
}

impl ProblemKind {
    pub fn type_uri(self) -> &'static str {
        match self {
            ProblemKind::InvalidRequest => PROBLEM_INVALID_REQUEST,
            ProblemKind::RouteNotFound => PROBLEM_ROUTE_NOT_FOUND,
            ProblemKind::Internal => PROBLEM_INTERNAL_ERROR,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ProblemKind::InvalidRequest => "Invalid Request",
            ProblemKind::RouteNotFound => "Route Not Found",
            ProblemKind::Internal => "Internal Error",
        }
    }

    pub fn status(self) -> StatusCode {
        match self {
            ProblemKind::InvalidRequest => StatusCode::BAD_REQUEST,
            ProblemKind::RouteNotFound => StatusCode::NOT_FOUND,
            ProblemKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Problem document returned for every failed API request.
///
/// ```
/// use streetroute_service_shared::{ProblemDetails, PROBLEM_ROUTE_NOT_FOUND};
///
/// let problem = ProblemDetails::route_not_found("node 6 cannot reach node 1", "req-1");
/// assert_eq!(problem.type_uri, PROBLEM_ROUTE_NOT_FOUND);
/// assert_eq!(problem.status, 404);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub type_uri: String,
    pub title: String,
    pub status: u16,
    /// Human-readable message for this occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Request id of the failed request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
}

impl ProblemDetails {
    pub fn of(kind: ProblemKind, detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self {
            type_uri: kind.type_uri().to_string(),
            title: kind.title().to_string(),
            status: kind.status().as_u16(),
            detail: Some(detail.into()),
            instance: Some(request_id.into()),
        }
    }

    pub fn bad_request(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::of(ProblemKind::InvalidRequest, detail, request_id)
    }

    pub fn route_not_found(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::of(ProblemKind::RouteNotFound, detail, request_id)
    }

    pub fn internal_error(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::of(ProblemKind::Internal, detail, request_id)
    }

    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl std::fmt::Display for ProblemDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{}: {}", self.title, detail),
            None => f.write_str(&self.title),
        }
    }
}

impl std::error::Error for ProblemDetails {}

impl IntoResponse for ProblemDetails {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            [(header::CONTENT_TYPE, PROBLEM_CONTENT_TYPE)],
            Json(self),
        )
            .into_response()
    }
}

/// Map a routing error onto the problem document the client sees.
///
/// Only [`LibError::NoPathFound`] is a 404. Every other error is a 500 that
/// carries the error message as its detail.
pub fn from_lib_error(error: &LibError, request_id: &str) -> ProblemDetails {
    match error {
        LibError::NoPathFound { start, goal } => ProblemDetails::route_not_found(
            format!(
                "No route could be found between node {} and node {}",
                start, goal
            ),
            request_id,
        ),
        _ => ProblemDetails::internal_error(error.to_string(), request_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_statuses() {
        assert_eq!(ProblemKind::InvalidRequest.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ProblemKind::RouteNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ProblemKind::Internal.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn serializes_rfc_field_names() {
        let problem = ProblemDetails::bad_request("The 'end_lon' query parameter is required", "req-7");
        let json: serde_json::Value = serde_json::to_value(&problem).unwrap();

        assert_eq!(json["type"], PROBLEM_INVALID_REQUEST);
        assert_eq!(json["title"], "Invalid Request");
        assert_eq!(json["status"], 400);
        assert_eq!(json["instance"], "req-7");
        assert!(json.get("type_uri").is_none());
    }

    #[test]
    fn no_path_becomes_404() {
        let problem = from_lib_error(&LibError::NoPathFound { start: 1, goal: 2 }, "req-route");
        assert_eq!(problem.type_uri, PROBLEM_ROUTE_NOT_FOUND);
        assert_eq!(problem.status, 404);
        assert_eq!(
            problem.detail.as_deref(),
            Some("No route could be found between node 1 and node 2")
        );
    }

    #[test]
    fn other_errors_become_500_with_message() {
        let error = LibError::UnknownNode { id: 77 };
        let problem = from_lib_error(&error, "req-internal");
        assert_eq!(problem.type_uri, PROBLEM_INTERNAL_ERROR);
        assert_eq!(problem.status, 500);
        assert_eq!(problem.detail, Some(error.to_string()));
    }

    #[test]
    fn response_uses_problem_content_type() {
        let response = ProblemDetails::route_not_found("unreachable", "req").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            PROBLEM_CONTENT_TYPE
        );
    }
}
