use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::coord::Coordinate;
use crate::error::{Error, Result};

/// Identifier of a street graph node (the OpenStreetMap node id).
pub type NodeId = i64;

/// Node with its geographic position, as stored in snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: NodeId,
    pub position: Coordinate,
}

/// Directed edge with its physical length in metres, as stored in snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub from: NodeId,
    pub to: NodeId,
    pub length: f64,
}

/// Outgoing edge within the adjacency list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoadEdge {
    pub target: NodeId,
    pub length: f64,
}

/// Directed, weighted street graph with node positions.
///
/// Construction validates the graph invariants: positions are finite, every
/// edge connects existing nodes, and every edge length is finite and
/// non-negative. The graph is never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct RoadGraph {
    positions: HashMap<NodeId, Coordinate>,
    adjacency: HashMap<NodeId, Vec<RoadEdge>>,
    edge_count: usize,
}

impl RoadGraph {
    /// Build a graph from nodes and directed edges.
    ///
    /// A node id supplied twice keeps the last position.
    pub fn from_parts(
        nodes: impl IntoIterator<Item = GraphNode>,
        edges: impl IntoIterator<Item = GraphEdge>,
    ) -> Result<Self> {
        let mut positions = HashMap::new();
        for node in nodes {
            let position = node.position.validated()?;
            positions.insert(node.id, position);
        }

        let mut adjacency: HashMap<NodeId, Vec<RoadEdge>> = HashMap::new();
        let mut edge_count = 0;
        for edge in edges {
            if !(edge.length.is_finite() && edge.length >= 0.0) {
                return Err(Error::InvalidEdgeWeight {
                    from: edge.from,
                    to: edge.to,
                    length: edge.length,
                });
            }
            for endpoint in [edge.from, edge.to] {
                if !positions.contains_key(&endpoint) {
                    return Err(Error::DanglingEdge {
                        from: edge.from,
                        to: edge.to,
                        missing: endpoint,
                    });
                }
            }

            adjacency.entry(edge.from).or_default().push(RoadEdge {
                target: edge.to,
                length: edge.length,
            });
            edge_count += 1;
        }

        Ok(Self {
            positions,
            adjacency,
            edge_count,
        })
    }

    pub fn node_count(&self) -> usize {
        self.positions.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.positions.contains_key(&node)
    }

    /// Position of a node, if it is part of the graph.
    pub fn position(&self, node: NodeId) -> Option<Coordinate> {
        self.positions.get(&node).copied()
    }

    /// Return the outgoing edges for a given node identifier.
    pub fn neighbours(&self, node: NodeId) -> &[RoadEdge] {
        self.adjacency
            .get(&node)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Length of the shortest direct edge `from -> to`, if any.
    pub fn edge_length(&self, from: NodeId, to: NodeId) -> Option<f64> {
        self.neighbours(from)
            .iter()
            .filter(|edge| edge.target == to)
            .map(|edge| edge.length)
            .min_by(f64::total_cmp)
    }

    /// Iterate over all nodes in unspecified order.
    pub fn nodes(&self) -> impl Iterator<Item = GraphNode> + '_ {
        self.positions
            .iter()
            .map(|(&id, &position)| GraphNode { id, position })
    }

    /// Iterate over all directed edges in unspecified order.
    pub fn edges(&self) -> impl Iterator<Item = GraphEdge> + '_ {
        self.adjacency.iter().flat_map(|(&from, edges)| {
            edges.iter().map(move |edge| GraphEdge {
                from,
                to: edge.target,
                length: edge.length,
            })
        })
    }

    /// Keep only the largest weakly connected component.
    ///
    /// Edge direction is ignored when grouping nodes, so one-way streets still
    /// join the component they belong to.
    pub fn largest_component(&self) -> RoadGraph {
        let mut undirected: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        for edge in self.edges() {
            undirected.entry(edge.from).or_default().push(edge.to);
            undirected.entry(edge.to).or_default().push(edge.from);
        }

        let mut component_of: HashMap<NodeId, usize> = HashMap::new();
        let mut sizes: Vec<usize> = Vec::new();

        let mut ids: Vec<NodeId> = self.positions.keys().copied().collect();
        ids.sort_unstable();

        for &seed in &ids {
            if component_of.contains_key(&seed) {
                continue;
            }
            let component = sizes.len();
            let mut size = 0;
            let mut queue = VecDeque::from([seed]);
            component_of.insert(seed, component);
            while let Some(current) = queue.pop_front() {
                size += 1;
                for &next in undirected.get(&current).map(Vec::as_slice).unwrap_or(&[]) {
                    if component_of.contains_key(&next) {
                        continue;
                    }
                    component_of.insert(next, component);
                    queue.push_back(next);
                }
            }
            sizes.push(size);
        }

        let Some(largest) = sizes
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(&a.0)))
            .map(|(index, _)| index)
        else {
            return RoadGraph::default();
        };

        let positions: HashMap<NodeId, Coordinate> = self
            .positions
            .iter()
            .filter(|(id, _)| component_of.get(id) == Some(&largest))
            .map(|(&id, &position)| (id, position))
            .collect();

        let mut edge_count = 0;
        let adjacency: HashMap<NodeId, Vec<RoadEdge>> = self
            .adjacency
            .iter()
            .filter(|(from, _)| positions.contains_key(from))
            .map(|(&from, edges)| {
                edge_count += edges.len();
                (from, edges.clone())
            })
            .collect();

        RoadGraph {
            positions,
            adjacency,
            edge_count,
        }
    }
}

/// Fluent helper for assembling small graphs by hand.
///
/// ```
/// use streetroute_lib::GraphBuilder;
///
/// let graph = GraphBuilder::new()
///     .node(1, 0.0, 0.0)
///     .node(2, 0.0, 1.0)
///     .two_way(1, 2, 1.0)
///     .build()
///     .unwrap();
/// assert_eq!(graph.edge_count(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(mut self, id: NodeId, lat: f64, lon: f64) -> Self {
        self.nodes.push(GraphNode {
            id,
            position: Coordinate::new(lat, lon),
        });
        self
    }

    /// Add a directed edge.
    pub fn edge(mut self, from: NodeId, to: NodeId, length: f64) -> Self {
        self.edges.push(GraphEdge { from, to, length });
        self
    }

    /// Add edges in both directions with the same length.
    pub fn two_way(self, a: NodeId, b: NodeId, length: f64) -> Self {
        self.edge(a, b, length).edge(b, a, length)
    }

    pub fn build(self) -> Result<RoadGraph> {
        RoadGraph::from_parts(self.nodes, self.edges)
    }
}
