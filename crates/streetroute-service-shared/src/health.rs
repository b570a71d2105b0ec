//! Liveness and readiness probes.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::AppState;

/// Health status response for liveness and readiness probes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Status indicator: "ok" or "not_ready: <reason>".
    pub status: String,

    pub service: String,

    pub version: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,

    /// Number of graph nodes loaded (readiness only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nodes_loaded: Option<usize>,
}

impl HealthStatus {
    pub fn alive(service: &str, version: &str) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            version: version.to_string(),
            place: None,
            nodes_loaded: None,
        }
    }

    pub fn ready(service: &str, version: &str, place: &str, nodes: usize) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            version: version.to_string(),
            place: Some(place.to_string()),
            nodes_loaded: Some(nodes),
        }
    }

    pub fn not_ready(service: &str, version: &str, reason: &str) -> Self {
        Self {
            status: format!("not_ready: {}", reason),
            service: service.to_string(),
            version: version.to_string(),
            place: None,
            nodes_loaded: None,
        }
    }
}

/// Liveness probe handler.
///
/// ```text
/// GET /health/live
/// {"status":"ok","service":"streetroute-service-shared","version":"0.1.0"}
/// ```
pub async fn health_live() -> impl IntoResponse {
    let status = HealthStatus::alive(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    (StatusCode::OK, Json(status))
}

/// Readiness probe handler. Reports the loaded place and node count.
pub async fn health_ready(State(state): State<AppState>) -> Response {
    let service = env!("CARGO_PKG_NAME");
    let version = env!("CARGO_PKG_VERSION");

    let nodes = state.node_count();
    if nodes == 0 {
        let status = HealthStatus::not_ready(service, version, "no graph nodes loaded");
        return (StatusCode::SERVICE_UNAVAILABLE, Json(status)).into_response();
    }

    let status = HealthStatus::ready(service, version, state.resolver().place(), nodes);
    (StatusCode::OK, Json(status)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_status_ready() {
        let status = HealthStatus::ready("svc", "1.0.0", "Puno, Peru", 5000);
        assert_eq!(status.status, "ok");
        assert_eq!(status.nodes_loaded, Some(5000));
        assert_eq!(status.place.as_deref(), Some("Puno, Peru"));
    }

    #[test]
    fn test_health_status_not_ready() {
        let status = HealthStatus::not_ready("svc", "1.0.0", "no data");
        assert!(status.status.starts_with("not_ready:"));
    }

    #[test]
    fn test_health_status_serialization_skips_empty() {
        let status = HealthStatus::alive("svc", "0.1.0");
        let json = serde_json::to_string(&status).unwrap();
        assert!(json.contains("\"status\":\"ok\""));
        assert!(!json.contains("nodes_loaded"));
        assert!(!json.contains("place"));
    }
}
