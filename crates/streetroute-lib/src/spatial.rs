//! KD-tree index for snapping arbitrary coordinates to the closest graph node.
//!
//! Node positions are projected with a [`LocalProjection`] centred on the graph
//! so the tree works in planar metres. Each query is projected the same way and
//! answered with the single nearest node.
//!
//! # Example
//!
//! ```
//! use streetroute_lib::{Coordinate, GraphBuilder, NodeLocator};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let graph = GraphBuilder::new()
//!     .node(1, -15.840, -70.020)
//!     .node(2, -15.830, -70.020)
//!     .build()?;
//! let locator = NodeLocator::build("Puno, Peru", &graph)?;
//!
//! let snap = locator.nearest(&Coordinate::new(-15.8301, -70.0201));
//! assert_eq!(snap.node, 2);
//! # Ok(())
//! # }
//! ```

use std::collections::HashSet;

use kiddo::float::kdtree::KdTree;
use kiddo::SquaredEuclidean;
use tracing::debug;

use crate::coord::{Coordinate, LocalProjection};
use crate::error::{Error, Result};
use crate::graph::{NodeId, RoadGraph};

/// KD-tree bucket size (kiddo default).
const BUCKET_SIZE: usize = 32;

/// Result of snapping a coordinate to the graph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snap {
    pub node: NodeId,
    /// Planar distance between the query and the node in metres.
    pub distance: f64,
}

/// Nearest-node index over a road graph.
pub struct NodeLocator {
    /// KD-tree over projected positions. Items index into `ids`.
    tree: KdTree<f64, usize, 2, BUCKET_SIZE, u32>,
    ids: Vec<NodeId>,
    projection: LocalProjection,
}

impl NodeLocator {
    /// Build the index for every node of `graph`.
    ///
    /// Fails with [`Error::EmptyGraph`] when the graph has no nodes, so an
    /// unusable graph is rejected at startup instead of on each request.
    pub fn build(place: &str, graph: &RoadGraph) -> Result<Self> {
        if graph.is_empty() {
            return Err(Error::EmptyGraph {
                place: place.to_string(),
            });
        }

        let mut nodes: Vec<_> = graph.nodes().collect();
        nodes.sort_unstable_by_key(|node| node.id);

        let projection = LocalProjection::centred_on(nodes.iter().map(|node| &node.position));

        // kiddo rejects more than BUCKET_SIZE items at one point, so coincident
        // nodes share a single entry held by the lowest id.
        let mut tree: KdTree<f64, usize, 2, BUCKET_SIZE, u32> = KdTree::new();
        let mut seen = HashSet::with_capacity(nodes.len());
        let mut ids = Vec::with_capacity(nodes.len());
        for node in &nodes {
            let point = projection.project(&node.position);
            if !seen.insert((point[0].to_bits(), point[1].to_bits())) {
                continue;
            }
            tree.add(&point, ids.len());
            ids.push(node.id);
        }

        debug!(
            node_count = nodes.len(),
            distinct_positions = ids.len(),
            origin_lat = projection.origin().lat,
            origin_lon = projection.origin().lon,
            "built node locator"
        );

        Ok(Self {
            tree,
            ids,
            projection,
        })
    }

    /// Number of indexed positions. Coincident nodes count once.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Always false: construction rejects empty graphs.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn projection(&self) -> &LocalProjection {
        &self.projection
    }

    /// Find the node closest to `coord`.
    pub fn nearest(&self, coord: &Coordinate) -> Snap {
        let query = self.projection.project(coord);
        let neighbour = self.tree.nearest_one::<SquaredEuclidean>(&query);
        Snap {
            node: self.ids[neighbour.item],
            distance: neighbour.distance.sqrt(),
        }
    }
}

impl std::fmt::Debug for NodeLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeLocator")
            .field("node_count", &self.ids.len())
            .field("origin", &self.projection.origin())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;

    fn grid() -> RoadGraph {
        // 3x3 grid with roughly 100 m spacing.
        let mut builder = GraphBuilder::new();
        for row in 0..3 {
            for col in 0..3 {
                let id = row * 3 + col;
                builder = builder.node(id, -15.84 + row as f64 * 0.0009, -70.02 + col as f64 * 0.0009);
            }
        }
        builder.build().unwrap()
    }

    fn brute_force(graph: &RoadGraph, projection: &LocalProjection, coord: &Coordinate) -> f64 {
        let q = projection.project(coord);
        graph
            .nodes()
            .map(|node| {
                let p = projection.project(&node.position);
                ((p[0] - q[0]).powi(2) + (p[1] - q[1]).powi(2)).sqrt()
            })
            .fold(f64::INFINITY, f64::min)
    }

    #[test]
    fn empty_graph_is_rejected() {
        let err = NodeLocator::build("Nowhere", &RoadGraph::default()).unwrap_err();
        assert!(matches!(err, Error::EmptyGraph { .. }));
    }

    #[test]
    fn exact_position_snaps_with_zero_distance() {
        let graph = grid();
        let locator = NodeLocator::build("grid", &graph).unwrap();
        let position = graph.position(4).unwrap();
        let snap = locator.nearest(&position);
        assert_eq!(snap.node, 4);
        assert!(snap.distance < 1e-6);
    }

    #[test]
    fn matches_brute_force_search() {
        let graph = grid();
        let locator = NodeLocator::build("grid", &graph).unwrap();
        let queries = [
            Coordinate::new(-15.8395, -70.0195),
            Coordinate::new(-15.8380, -70.0185),
            Coordinate::new(-15.9000, -70.1000),
            Coordinate::new(-15.8000, -69.9000),
        ];
        for query in queries {
            let snap = locator.nearest(&query);
            let expected = brute_force(&graph, locator.projection(), &query);
            assert!((snap.distance - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn many_coincident_nodes_share_one_entry() {
        let mut builder = GraphBuilder::new();
        for id in 0..(BUCKET_SIZE as i64 + 8) {
            builder = builder.node(id, -15.84, -70.02);
        }
        let graph = builder.node(100, -15.83, -70.02).build().unwrap();

        let locator = NodeLocator::build("stacked", &graph).unwrap();
        assert_eq!(locator.len(), 2);

        let snap = locator.nearest(&Coordinate::new(-15.8401, -70.0201));
        assert_eq!(snap.node, 0);
        assert_eq!(locator.nearest(&Coordinate::new(-15.83, -70.02)).node, 100);
    }

    #[test]
    fn far_away_query_still_snaps() {
        let graph = grid();
        let locator = NodeLocator::build("grid", &graph).unwrap();
        let snap = locator.nearest(&Coordinate::new(-15.0, -70.02));
        // Due north of the north-west corner.
        assert_eq!(snap.node, 6);
    }
}
