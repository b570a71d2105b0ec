//! Application state for the HTTP service.
//!
//! Holds the route resolver built from the loaded street graph. The graph is
//! loaded once before the listener is bound and never mutated afterwards.

use std::path::Path;
use std::sync::Arc;

use streetroute_lib::{
    CachedGraphProvider, Error as LibError, GraphProvider, GraphSource, OverpassSource,
    RoadGraph, RouteResolver,
};

use crate::config::ServiceConfig;

/// Error during application state initialization.
#[derive(Debug)]
pub enum AppStateError {
    /// No data directory could be resolved for the graph cache.
    DataDir(LibError),

    /// Failed to load or fetch the street graph.
    GraphLoad(LibError),

    /// The graph could not be indexed for routing (for example, it is empty).
    Index(LibError),
}

impl std::fmt::Display for AppStateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DataDir(e) => write!(f, "failed to resolve data directory: {}", e),
            Self::GraphLoad(e) => write!(f, "failed to load street graph: {}", e),
            Self::Index(e) => write!(f, "failed to prepare street graph for routing: {}", e),
        }
    }
}

impl std::error::Error for AppStateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::DataDir(e) | Self::GraphLoad(e) | Self::Index(e) => Some(e),
        }
    }
}

impl From<LibError> for AppStateError {
    fn from(err: LibError) -> Self {
        Self::GraphLoad(err)
    }
}

/// Shared application state for all axum handlers.
///
/// This struct is cheaply cloneable (using `Arc` internally) and should be
/// shared via axum's `State` extractor.
///
/// # Example
///
/// ```ignore
/// use axum::{Router, routing::get, extract::State};
/// use streetroute_service_shared::AppState;
///
/// async fn handler(State(state): State<AppState>) {
///     let config = state.resolver().map_config();
///     // ... use config
/// }
///
/// let state = AppState::load(&ServiceConfig::from_env()).unwrap();
/// let app = Router::new()
///     .route("/api/map", get(handler))
///     .with_state(state);
/// ```
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    resolver: RouteResolver,
}

impl AppState {
    /// Load (or download and cache) the graph for the configured place.
    ///
    /// This blocks on file and network IO; call it from
    /// `tokio::task::spawn_blocking` inside an async runtime.
    pub fn load(config: &ServiceConfig) -> Result<Self, AppStateError> {
        let data_dir = streetroute_lib::default_data_dir(config.data_dir.as_deref())
            .map_err(AppStateError::DataDir)?;
        Self::load_with_source(&config.place, &data_dir, OverpassSource::from_env())
    }

    /// Load state through a specific graph source, caching under `data_dir`.
    pub fn load_with_source<S: GraphSource>(
        place: &str,
        data_dir: &Path,
        source: S,
    ) -> Result<Self, AppStateError> {
        tracing::info!(place, data_dir = %data_dir.display(), "loading street graph");
        let provider = CachedGraphProvider::new(source, data_dir);
        let graph = provider.load_or_fetch(place)?;
        Self::from_graph(place, graph)
    }

    /// Create application state from an already loaded graph.
    ///
    /// This is useful for testing with small synthetic graphs.
    pub fn from_graph(place: &str, graph: RoadGraph) -> Result<Self, AppStateError> {
        let resolver = RouteResolver::new(place, graph).map_err(AppStateError::Index)?;
        Ok(Self {
            inner: Arc::new(AppStateInner { resolver }),
        })
    }

    /// Access the route resolver.
    pub fn resolver(&self) -> &RouteResolver {
        &self.inner.resolver
    }

    /// Number of nodes in the loaded graph.
    pub fn node_count(&self) -> usize {
        self.inner.resolver.graph().node_count()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("place", &self.inner.resolver.place())
            .field("node_count", &self.node_count())
            .field("edge_count", &self.inner.resolver.graph().edge_count())
            .finish()
    }
}
