//! streetroute library entry points.
//!
//! This crate exposes helpers to obtain a drivable street graph for a named
//! place (from a local snapshot or from OpenStreetMap), index it for
//! nearest-node queries, and compute shortest routes over it. Higher-level
//! consumers (CLI, HTTP service) should only depend on the functions exported
//! here instead of reimplementing behavior.
//!

#![deny(warnings)]

pub mod coord;
pub mod dataset;
pub mod error;
pub mod graph;
pub mod osm;
pub mod path;
pub mod routing;
pub mod snapshot;
pub mod spatial;

pub use coord::{haversine_distance, Coordinate, LocalProjection};
pub use dataset::{
    default_data_dir, snapshot_path, CachedGraphProvider, GraphProvider, GraphSource,
};
pub use error::{Error, Result};
pub use graph::{GraphBuilder, GraphEdge, GraphNode, NodeId, RoadEdge, RoadGraph};
pub use osm::{OsmElement, OverpassResponse, OverpassSource};
pub use path::{find_route_dijkstra, path_length, ShortestPath};
pub use routing::{MapConfig, Route, RouteResolver};
pub use spatial::{NodeLocator, Snap};
