use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::error::{Error, Result};
use crate::graph::{NodeId, RoadGraph};

/// Lowest-cost node sequence between two nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortestPath {
    pub nodes: Vec<NodeId>,
    /// Summed edge length in metres.
    pub length: f64,
}

/// Run Dijkstra's algorithm from `start` until `goal` is settled.
///
/// Returns [`Error::NoPathFound`] when `goal` is unreachable and
/// [`Error::UnknownNode`] when either endpoint is not part of the graph.
pub fn find_route_dijkstra(graph: &RoadGraph, start: NodeId, goal: NodeId) -> Result<ShortestPath> {
    for node in [start, goal] {
        if !graph.contains(node) {
            return Err(Error::UnknownNode { id: node });
        }
    }

    if start == goal {
        return Ok(ShortestPath {
            nodes: vec![start],
            length: 0.0,
        });
    }

    let mut distances: HashMap<NodeId, f64> = HashMap::new();
    let mut parents: HashMap<NodeId, Option<NodeId>> = HashMap::new();
    let mut queue = BinaryHeap::new();

    distances.insert(start, 0.0);
    parents.insert(start, None);
    queue.push(QueueEntry::new(start, 0.0));

    while let Some(entry) = queue.pop() {
        let current_distance = match distances.get(&entry.node) {
            Some(distance) if *distance < entry.cost.0 => continue,
            Some(distance) => *distance,
            None => continue,
        };

        if entry.node == goal {
            return Ok(ShortestPath {
                nodes: reconstruct_path(&parents, start, goal),
                length: current_distance,
            });
        }

        for edge in graph.neighbours(entry.node) {
            let next_cost = current_distance + edge.length;
            if next_cost < *distances.get(&edge.target).unwrap_or(&f64::INFINITY) {
                distances.insert(edge.target, next_cost);
                parents.insert(edge.target, Some(entry.node));
                queue.push(QueueEntry::new(edge.target, next_cost));
            }
        }
    }

    Err(Error::NoPathFound { start, goal })
}

/// Sum the edge lengths along a node sequence.
///
/// Returns `None` if two consecutive nodes are not joined by an edge. Parallel
/// edges contribute their shortest length.
pub fn path_length(graph: &RoadGraph, nodes: &[NodeId]) -> Option<f64> {
    nodes
        .windows(2)
        .map(|pair| graph.edge_length(pair[0], pair[1]))
        .sum()
}

fn reconstruct_path(
    parents: &HashMap<NodeId, Option<NodeId>>,
    start: NodeId,
    goal: NodeId,
) -> Vec<NodeId> {
    let mut path = Vec::new();
    let mut current = Some(goal);
    while let Some(node) = current {
        path.push(node);
        if node == start {
            break;
        }
        current = parents.get(&node).copied().flatten();
    }
    path.reverse();
    path
}

#[derive(Copy, Clone, Debug, Default)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct QueueEntry {
    node: NodeId,
    cost: FloatOrd,
}

impl QueueEntry {
    fn new(node: NodeId, cost: f64) -> Self {
        Self {
            node,
            cost: FloatOrd(cost),
        }
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap becomes a min-heap by cost.
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
