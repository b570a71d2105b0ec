//! Route resolution: snap both endpoints, search, map nodes back to positions.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::coord::Coordinate;
use crate::error::{Error, Result};
use crate::graph::{NodeId, RoadGraph};
use crate::path::find_route_dijkstra;
use crate::spatial::NodeLocator;

/// Initial map view for clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapConfig {
    pub center: Coordinate,
    pub place_name: String,
}

/// A resolved route between two snapped nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    pub start_node: NodeId,
    pub end_node: NodeId,
    pub nodes: Vec<NodeId>,
    /// Node positions in route order, one per entry of `nodes`.
    pub coordinates: Vec<Coordinate>,
    pub length_m: f64,
    /// Distance from the requested start to the snapped start node.
    pub start_snap_m: f64,
    pub end_snap_m: f64,
}

impl Route {
    /// Number of edges traversed.
    pub fn hop_count(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }
}

/// Answers route and map-config queries over one immutable graph.
#[derive(Debug)]
pub struct RouteResolver {
    place: String,
    graph: Arc<RoadGraph>,
    locator: NodeLocator,
    map_config: MapConfig,
}

impl RouteResolver {
    /// Index `graph` for routing.
    ///
    /// Fails with [`Error::EmptyGraph`] when the graph has no nodes.
    pub fn new(place: impl Into<String>, graph: impl Into<Arc<RoadGraph>>) -> Result<Self> {
        let place = place.into();
        let graph = graph.into();
        let locator = NodeLocator::build(&place, &graph)?;
        let center = centroid(&graph, &locator);

        info!(
            place = %place,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            center_lat = center.lat,
            center_lon = center.lon,
            "route resolver ready"
        );

        Ok(Self {
            map_config: MapConfig {
                center,
                place_name: place.clone(),
            },
            place,
            graph,
            locator,
        })
    }

    pub fn place(&self) -> &str {
        &self.place
    }

    pub fn graph(&self) -> &RoadGraph {
        &self.graph
    }

    pub fn map_config(&self) -> &MapConfig {
        &self.map_config
    }

    /// Compute the shortest route between the nodes nearest to `start` and `end`.
    ///
    /// Returns [`Error::NoPathFound`] when the snapped nodes are not connected.
    /// Every other error indicates a fault.
    pub fn resolve(&self, start: Coordinate, end: Coordinate) -> Result<Route> {
        let start = start.validated()?;
        let end = end.validated()?;

        let start_snap = self.locator.nearest(&start);
        let end_snap = self.locator.nearest(&end);
        debug!(
            start_node = start_snap.node,
            start_snap_m = start_snap.distance,
            end_node = end_snap.node,
            end_snap_m = end_snap.distance,
            "snapped route endpoints"
        );

        let path = find_route_dijkstra(&self.graph, start_snap.node, end_snap.node)?;
        let coordinates = self.coordinates_of(&path.nodes)?;

        Ok(Route {
            start_node: start_snap.node,
            end_node: end_snap.node,
            nodes: path.nodes,
            coordinates,
            length_m: path.length,
            start_snap_m: start_snap.distance,
            end_snap_m: end_snap.distance,
        })
    }

    /// Positions of `nodes`, in order.
    pub fn coordinates_of(&self, nodes: &[NodeId]) -> Result<Vec<Coordinate>> {
        nodes
            .iter()
            .map(|&id| self.graph.position(id).ok_or(Error::UnknownNode { id }))
            .collect()
    }
}

/// Centroid of the distinct node positions, averaged in the projected plane.
fn centroid(graph: &RoadGraph, locator: &NodeLocator) -> Coordinate {
    let projection = locator.projection();
    let mut seen = HashSet::new();
    let mut sum = [0.0, 0.0];
    let mut count = 0usize;

    for node in graph.nodes() {
        let key = (node.position.lat.to_bits(), node.position.lon.to_bits());
        if !seen.insert(key) {
            continue;
        }
        let [x, y] = projection.project(&node.position);
        sum[0] += x;
        sum[1] += y;
        count += 1;
    }

    if count == 0 {
        return projection.origin();
    }
    projection.unproject([sum[0] / count as f64, sum[1] / count as f64])
}
