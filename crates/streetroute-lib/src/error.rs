use std::path::PathBuf;

use thiserror::Error;

use crate::graph::NodeId;

/// Convenient result alias for the streetroute library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Raised when no route connects the two snapped nodes.
    #[error("no route found between node {start} and node {goal}")]
    NoPathFound { start: NodeId, goal: NodeId },

    /// Raised when a node identifier is not part of the loaded graph.
    #[error("node {id} is not part of the road graph")]
    UnknownNode { id: NodeId },

    /// Raised when a latitude/longitude pair is not finite.
    #[error("coordinate ({lat}, {lon}) is not a finite position")]
    InvalidCoordinate { lat: f64, lon: f64 },

    /// Raised when an edge length is negative or not finite.
    #[error("edge {from} -> {to} has invalid length {length}")]
    InvalidEdgeWeight {
        from: NodeId,
        to: NodeId,
        length: f64,
    },

    /// Raised when an edge references a node that was never added.
    #[error("edge {from} -> {to} references missing node {missing}")]
    DanglingEdge {
        from: NodeId,
        to: NodeId,
        missing: NodeId,
    },

    /// Raised when a graph without nodes would be used for routing.
    #[error("road graph for {place} contains no nodes")]
    EmptyGraph { place: String },

    /// No suitable project directories could be resolved for this platform.
    #[error("failed to resolve project directories for the graph cache")]
    ProjectDirsUnavailable,

    /// Raised when the geocoder returned no usable area for a place name.
    #[error("place '{place}' could not be resolved to an OpenStreetMap area")]
    PlaceNotFound { place: String },

    /// Raised when an OpenStreetMap endpoint answered with an unexpected payload.
    #[error("unexpected response from {endpoint}: {message}")]
    OsmResponse { endpoint: String, message: String },

    /// Raised when serializing a graph snapshot fails.
    #[error("failed to serialize graph snapshot: {message}")]
    SnapshotSerialize { message: String },

    /// Raised when loading a graph snapshot from a file fails.
    #[error("failed to load graph snapshot from {path}: {message}")]
    SnapshotLoad { path: PathBuf, message: String },

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for HTTP client errors.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Wrapper for JSON decoding errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error is the expected "endpoints are not connected" outcome
    /// rather than a fault.
    pub fn is_no_path(&self) -> bool {
        matches!(self, Error::NoPathFound { .. })
    }
}
