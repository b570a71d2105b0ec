//! streetroute HTTP service.
//!
//! Serves the map page and answers shortest-route queries over the street
//! graph of one place.
//!
//! # Endpoints
//!
//! - `GET /api/map` - Map center and place name
//! - `GET /api/route?start_lat=..&start_lon=..&end_lat=..&end_lon=..` - Shortest route
//! - `GET /` and `GET /static/*` - Frontend assets
//! - `GET /metrics` - Prometheus metrics endpoint
//! - `GET /health/live`, `GET /health/ready` - Probes
//!
//! # Configuration
//!
//! - `STREETROUTE_PLACE` - Place to route in (default: `Puno, Peru`)
//! - `STREETROUTE_DATA_DIR` - Graph cache directory
//! - `STREETROUTE_STATIC_DIR` - Static asset directory (default: `static`)
//! - `RUST_LOG` - Log level (default: info)
//! - `LOG_FORMAT` - Log format: json (default) or text
//! - `SERVICE_PORT` - HTTP port (default: 8080)
//! - `METRICS_ENABLED` - `false` disables the Prometheus recorder
//! - `METRICS_PATH` - Metrics route (default: `/metrics`)

use std::net::SocketAddr;
use std::path::Path;

use axum::{
    Router,
    extract::{Query, State, rejection::QueryRejection},
    http::HeaderMap,
    response::IntoResponse,
    routing::get,
};
use serde::Serialize;
use tower_http::services::{ServeDir, ServeFile};
use tracing::{error, info};

use streetroute_lib::{MapConfig, Route};
use streetroute_service_shared::{
    AppState, MetricsLayer, ProblemDetails, RouteQuery,
    ServiceConfig, ServiceResponse, Validate, extract_or_generate_request_id, from_lib_error,
    health_live, health_ready, init_logging, init_metrics, metrics_handler,
    record_route_calculated, record_route_failed, record_route_length, record_route_nodes,
};

const SERVICE: &str = "streetroute";

/// Body of `GET /api/map`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MapResponse {
    /// `[lat, lon]`
    map_center: [f64; 2],
    place_name: String,
}

impl From<&MapConfig> for MapResponse {
    fn from(config: &MapConfig) -> Self {
        Self {
            map_center: config.center.to_lat_lon(),
            place_name: config.place_name.clone(),
        }
    }
}

/// Body of a successful `GET /api/route`.
#[derive(Debug, Serialize)]
struct RouteResponse {
    /// `[lat, lon]` pairs from start node to end node.
    route: Vec<[f64; 2]>,
    nodes: usize,
    length_m: f64,
}

impl From<&Route> for RouteResponse {
    fn from(route: &Route) -> Self {
        Self {
            route: route.coordinates.iter().map(|c| c.to_lat_lon()).collect(),
            nodes: route.nodes.len(),
            length_m: route.length_m,
        }
    }
}

/// HTTP response - either success or RFC 9457 error.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Response {
    Success(ServiceResponse<RouteResponse>),
    Error(ProblemDetails),
}

impl IntoResponse for Response {
    fn into_response(self) -> axum::response::Response {
        match self {
            Response::Success(data) => data.into_response(),
            Response::Error(problem) => problem.into_response(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServiceConfig::from_env();
    init_logging(config.log_format);

    if config.metrics_enabled {
        if let Err(e) = init_metrics() {
            tracing::warn!(error = %e, "continuing without metrics");
        }
    }

    info!(
        place = %config.place,
        static_dir = %config.static_dir.display(),
        port = config.port,
        metrics_enabled = config.metrics_enabled,
        "starting streetroute service"
    );

    // Graph acquisition does blocking file and network IO.
    let load_config = config.clone();
    let state = tokio::task::spawn_blocking(move || AppState::load(&load_config))
        .await?
        .map_err(|e| {
            error!(error = %e, place = %config.place, "failed to load application state");
            e
        })?;

    info!(nodes = state.node_count(), "application state loaded");

    let app = app(state, &config.static_dir, &config.metrics_path);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(addr = %addr, "listening on");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the router over a loaded state.
fn app(state: AppState, static_dir: &Path, metrics_path: &str) -> Router {
    Router::new()
        .route("/api/map", get(map_handler))
        .route("/api/route", get(route_handler))
        .route(metrics_path, get(metrics_handler))
        .route("/health/live", get(health_live))
        .route("/health/ready", get(health_ready))
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(MetricsLayer)
        .with_state(state)
}

/// Handle GET /api/map requests.
async fn map_handler(State(state): State<AppState>) -> ServiceResponse<MapResponse> {
    ServiceResponse::new(MapResponse::from(state.resolver().map_config()))
}

/// Handle GET /api/route requests.
async fn route_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<RouteQuery>, QueryRejection>,
) -> Response {
    let request_id = extract_or_generate_request_id(&headers).to_string();

    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => {
            record_route_failed("validation_error", SERVICE);
            return Response::Error(ProblemDetails::bad_request(
                rejection.body_text(),
                request_id,
            ));
        }
    };

    if let Err(problem) = query.validate(&request_id) {
        record_route_failed("validation_error", SERVICE);
        return Response::Error(*problem);
    }

    let (Some(start), Some(end)) = (query.start(), query.end()) else {
        record_route_failed("validation_error", SERVICE);
        return Response::Error(ProblemDetails::bad_request(
            "Both endpoints are required",
            request_id,
        ));
    };

    info!(
        request_id = %request_id,
        start_lat = start.lat,
        start_lon = start.lon,
        end_lat = end.lat,
        end_lon = end.lon,
        "handling route request"
    );

    let route = match state.resolver().resolve(start, end) {
        Ok(route) => route,
        Err(e) if e.is_no_path() => {
            info!(request_id = %request_id, error = %e, "no route between endpoints");
            record_route_failed("no_path", SERVICE);
            return Response::Error(from_lib_error(&e, &request_id));
        }
        Err(e) => {
            error!(request_id = %request_id, error = %e, "route computation failed");
            record_route_failed("internal", SERVICE);
            return Response::Error(from_lib_error(&e, &request_id));
        }
    };

    record_route_calculated(SERVICE);
    record_route_nodes(route.nodes.len());
    record_route_length(route.length_m);

    info!(
        request_id = %request_id,
        nodes = route.nodes.len(),
        length_m = route.length_m,
        start_snap_m = route.start_snap_m,
        end_snap_m = route.end_snap_m,
        "route computed successfully"
    );

    Response::Success(ServiceResponse::new(RouteResponse::from(&route)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::Value;
    use std::path::PathBuf;
    use streetroute_service_shared::test_utils::{TEST_PLACE, test_state};

    fn static_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("static")
    }

    fn server() -> TestServer {
        TestServer::new(app(test_state(), &static_dir(), "/metrics")).unwrap()
    }

    async fn route(server: &TestServer, params: &[(&str, &str)]) -> axum_test::TestResponse {
        let mut request = server.get("/api/route");
        for (key, value) in params {
            request = request.add_query_param(key, value);
        }
        request.await
    }

    #[tokio::test]
    async fn map_returns_center_and_place() {
        let response = server().get("/api/map").await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["placeName"], TEST_PLACE);
        let center = body["mapCenter"].as_array().unwrap();
        assert_eq!(center.len(), 2);
        let lat = center[0].as_f64().unwrap();
        let lon = center[1].as_f64().unwrap();
        assert!((-15.8400..=-15.8300).contains(&lat));
        assert!((-70.0200..=-70.0090).contains(&lon));
    }

    #[tokio::test]
    async fn route_follows_streets() {
        let server = server();
        let response = route(
            &server,
            &[
                ("start_lat", "-15.8391"),
                ("start_lon", "-70.0201"),
                ("end_lat", "-15.8401"),
                ("end_lon", "-70.0179"),
            ],
        )
        .await;
        response.assert_status_ok();

        let body: Value = response.json();
        let coords: Vec<[f64; 2]> = serde_json::from_value(body["route"].clone()).unwrap();
        // 4-1-2-3 and 4-5-2-3 both total 325 m, so only the ends are fixed.
        assert_eq!(coords.first(), Some(&[-15.8390, -70.0200]));
        assert_eq!(coords.last(), Some(&[-15.8400, -70.0180]));
        assert_eq!(body["nodes"], 4);
        assert_eq!(body["length_m"].as_f64(), Some(325.0));
    }

    #[tokio::test]
    async fn same_point_returns_single_coordinate() {
        let server = server();
        let response = route(
            &server,
            &[
                ("start_lat", "-15.8400"),
                ("start_lon", "-70.0200"),
                ("end_lat", "-15.8400"),
                ("end_lon", "-70.0200"),
            ],
        )
        .await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["route"], serde_json::json!([[-15.84, -70.02]]));
        assert_eq!(body["length_m"].as_f64(), Some(0.0));
    }

    #[tokio::test]
    async fn one_way_street_blocks_return_trip() {
        let server = server();
        let response = route(
            &server,
            &[
                ("start_lat", "-15.8400"),
                ("start_lon", "-70.0180"),
                ("end_lat", "-15.8400"),
                ("end_lon", "-70.0200"),
            ],
        )
        .await;
        response.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(
            response.header("content-type").to_str().unwrap(),
            "application/problem+json"
        );

        let body: Value = response.json();
        assert_eq!(body["type"], "/problems/route-not-found");
        assert!(body["detail"].as_str().unwrap().contains("No route"));
    }

    #[tokio::test]
    async fn disconnected_component_is_not_found() {
        let server = server();
        let response = route(
            &server,
            &[
                ("start_lat", "-15.8400"),
                ("start_lon", "-70.0200"),
                ("end_lat", "-15.8300"),
                ("end_lon", "-70.0100"),
            ],
        )
        .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn missing_parameter_is_bad_request() {
        let server = server();
        let response = route(
            &server,
            &[
                ("start_lat", "-15.84"),
                ("start_lon", "-70.02"),
                ("end_lat", "-15.83"),
            ],
        )
        .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let body: Value = response.json();
        assert_eq!(body["type"], "/problems/invalid-request");
        assert!(body["detail"].as_str().unwrap().contains("end_lon"));
    }

    #[tokio::test]
    async fn non_numeric_parameter_is_bad_request() {
        let server = server();
        let response = route(
            &server,
            &[
                ("start_lat", "north"),
                ("start_lon", "-70.02"),
                ("end_lat", "-15.83"),
                ("end_lon", "-70.01"),
            ],
        )
        .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["status"], 400);
    }

    #[tokio::test]
    async fn non_finite_parameter_is_bad_request() {
        let server = server();
        let response = route(
            &server,
            &[
                ("start_lat", "NaN"),
                ("start_lon", "-70.02"),
                ("end_lat", "-15.83"),
                ("end_lon", "-70.01"),
            ],
        )
        .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn request_id_is_echoed_into_problem() {
        let server = server();
        let response = server
            .get("/api/route")
            .add_header("x-request-id", "abc-123")
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.header("x-request-id").to_str().unwrap(), "abc-123");

        let body: Value = response.json();
        assert_eq!(body["instance"], "abc-123");
    }

    #[tokio::test]
    async fn index_and_static_assets_are_served() {
        let server = server();

        let index = server.get("/").await;
        index.assert_status_ok();
        assert!(index.text().contains("<div id=\"map\">"));

        let script = server.get("/static/main.js").await;
        script.assert_status_ok();
        assert!(script.text().contains("/api/route"));
    }

    #[tokio::test]
    async fn health_probes_report_ready() {
        let server = server();
        server.get("/health/live").await.assert_status_ok();

        let ready = server.get("/health/ready").await;
        ready.assert_status_ok();
        let body: Value = ready.json();
        assert_eq!(body["nodes_loaded"], 7);
        assert_eq!(body["place"], TEST_PLACE);
    }

    #[tokio::test]
    async fn metrics_route_follows_configured_path() {
        let server = TestServer::new(app(test_state(), &static_dir(), "/internal/metrics")).unwrap();

        // No recorder is installed in this binary.
        let response = server.get("/internal/metrics").await;
        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
        server.get("/metrics").await.assert_status_not_found();
    }
}
