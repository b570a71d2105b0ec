//! Test fixtures for handler testing with a small synthetic street graph.
//!
//! ```text
//!   4 ---- 5          9 ---- 10   (separate component)
//!   |      |
//!   1 ---- 2 ---> 3   (2 -> 3 is one-way)
//! ```

use std::sync::OnceLock;

use streetroute_lib::{GraphBuilder, RoadGraph};

use crate::state::AppState;

/// Place name used by the synthetic state.
pub const TEST_PLACE: &str = "Puno, Peru";

/// Node positions of the synthetic graph as `(id, lat, lon)`.
pub const TEST_NODES: [(i64, f64, f64); 7] = [
    (1, -15.8400, -70.0200),
    (2, -15.8400, -70.0190),
    (3, -15.8400, -70.0180),
    (4, -15.8390, -70.0200),
    (5, -15.8390, -70.0190),
    (9, -15.8300, -70.0100),
    (10, -15.8300, -70.0090),
];

static TEST_STATE: OnceLock<AppState> = OnceLock::new();

/// Build the synthetic graph shown in the module docs.
pub fn test_graph() -> RoadGraph {
    let mut builder = GraphBuilder::new();
    for (id, lat, lon) in TEST_NODES {
        builder = builder.node(id, lat, lon);
    }
    builder
        .two_way(1, 2, 107.0)
        .two_way(1, 4, 111.0)
        .two_way(4, 5, 107.0)
        .two_way(5, 2, 111.0)
        .edge(2, 3, 107.0)
        .two_way(9, 10, 107.0)
        .build()
        .unwrap_or_else(|e| panic!("synthetic test graph is invalid: {}", e))
}

/// Shared state over [`test_graph`], built once per test binary.
pub fn test_state() -> AppState {
    TEST_STATE
        .get_or_init(|| {
            AppState::from_graph(TEST_PLACE, test_graph())
                .unwrap_or_else(|e| panic!("failed to build test state: {}", e))
        })
        .clone()
}
