//! Successful JSON responses.

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Body of a successful API response, the counterpart of
/// [`ProblemDetails`](crate::ProblemDetails).
///
/// Serializes as the payload itself.
///
/// ```
/// use streetroute_service_shared::ServiceResponse;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct RouteBody {
///     nodes: usize,
///     length_m: f64,
/// }
///
/// let response = ServiceResponse::new(RouteBody { nodes: 5, length_m: 412.7 });
/// assert_eq!(
///     serde_json::to_string(&response).unwrap(),
///     r#"{"nodes":5,"length_m":412.7}"#
/// );
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceResponse<T> {
    pub data: T,
}

impl<T> ServiceResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }

    pub fn into_inner(self) -> T {
        self.data
    }
}

impl<T> From<T> for ServiceResponse<T> {
    fn from(data: T) -> Self {
        Self::new(data)
    }
}

impl<T: Serialize> IntoResponse for ServiceResponse<T> {
    fn into_response(self) -> Response {
        Json(self.data).into_response()
    }
}
