//! Binary snapshots of a road graph for fast startup without network access.
//!
//! # Serialization Format
//!
//! ```text
//! Header (24 bytes):
//!   - Magic: b"SRGS" (4 bytes)
//!   - Version: u8 (1 byte)
//!   - Flags: u8 (1 byte) - reserved, always 0
//!   - Node count: u32 LE (4 bytes)
//!   - Edge count: u32 LE (4 bytes)
//!   - Reserved: 10 bytes
//!
//! Body:
//!   - postcard-serialized SnapshotBody (place, nodes, edges)
//!   - zstd compressed
//!
//! Footer (32 bytes):
//!   - SHA-256 checksum of compressed body
//! ```
//!
//! Nodes and edges are written in sorted order so the same graph always
//! produces the same bytes.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::graph::{GraphEdge, GraphNode, RoadGraph};

/// Magic bytes identifying a graph snapshot file.
const SNAPSHOT_MAGIC: &[u8; 4] = b"SRGS";

/// Current snapshot format version.
const SNAPSHOT_VERSION: u8 = 1;

/// Header size in bytes.
const HEADER_SIZE: usize = 24;

/// Checksum size in bytes (SHA-256).
const CHECKSUM_SIZE: usize = 32;

/// zstd compression level (balanced speed/ratio).
const COMPRESSION_LEVEL: i32 = 3;

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotBody {
    place: String,
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
}

/// A graph read back from disk together with the place it was built for.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub place: String,
    pub graph: RoadGraph,
}

/// Write `graph` to `path`.
///
/// The file is written to a temporary sibling and renamed into place, so a
/// crash never leaves a truncated snapshot behind.
pub fn save(path: &Path, place: &str, graph: &RoadGraph) -> Result<()> {
    info!(
        path = %path.display(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "saving graph snapshot"
    );

    let mut nodes: Vec<GraphNode> = graph.nodes().collect();
    nodes.sort_unstable_by_key(|node| node.id);
    let mut edges: Vec<GraphEdge> = graph.edges().collect();
    edges.sort_by(|a, b| {
        (a.from, a.to)
            .cmp(&(b.from, b.to))
            .then_with(|| a.length.total_cmp(&b.length))
    });

    let body = SnapshotBody {
        place: place.to_string(),
        nodes,
        edges,
    };

    let serialized = postcard::to_allocvec(&body).map_err(|e| Error::SnapshotSerialize {
        message: format!("postcard serialization failed: {}", e),
    })?;

    let compressed = zstd::encode_all(serialized.as_slice(), COMPRESSION_LEVEL).map_err(|e| {
        Error::SnapshotSerialize {
            message: format!("zstd compression failed: {}", e),
        }
    })?;

    let checksum = Sha256::digest(&compressed);

    let mut header = [0u8; HEADER_SIZE];
    header[0..4].copy_from_slice(SNAPSHOT_MAGIC);
    header[4] = SNAPSHOT_VERSION;
    header[6..10].copy_from_slice(&count_field(body.nodes.len())?.to_le_bytes());
    header[10..14].copy_from_slice(&count_field(body.edges.len())?.to_le_bytes());

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut file = NamedTempFile::new_in(parent)?;
    file.write_all(&header)?;
    file.write_all(&compressed)?;
    file.write_all(&checksum)?;
    file.flush()?;
    file.persist(path).map_err(|e| Error::Io(e.error))?;

    info!(
        file_size = HEADER_SIZE + compressed.len() + CHECKSUM_SIZE,
        compressed_size = compressed.len(),
        "graph snapshot saved"
    );

    Ok(())
}

/// Read a snapshot from `path`, verifying header and checksum.
pub fn load(path: &Path) -> Result<Snapshot> {
    debug!(path = %path.display(), "loading graph snapshot");

    let load_error = |message: String| Error::SnapshotLoad {
        path: path.to_path_buf(),
        message,
    };

    let bytes = fs::read(path).map_err(|e| load_error(format!("failed to read file: {}", e)))?;
    if bytes.len() < HEADER_SIZE + CHECKSUM_SIZE {
        return Err(load_error(format!(
            "file too short ({} bytes)",
            bytes.len()
        )));
    }

    let (header, rest) = bytes.split_at(HEADER_SIZE);
    if &header[0..4] != SNAPSHOT_MAGIC {
        return Err(load_error("invalid magic bytes".to_string()));
    }

    let version = header[4];
    if version != SNAPSHOT_VERSION {
        return Err(load_error(format!(
            "unsupported version {} (expected {})",
            version, SNAPSHOT_VERSION
        )));
    }

    let node_count = read_u32(&header[6..10]);
    let edge_count = read_u32(&header[10..14]);

    let (compressed, stored_checksum) = rest.split_at(rest.len() - CHECKSUM_SIZE);
    let computed_checksum = Sha256::digest(compressed);
    if computed_checksum.as_slice() != stored_checksum {
        return Err(load_error(
            "checksum mismatch - file may be corrupted".to_string(),
        ));
    }

    let decompressed = zstd::decode_all(compressed)
        .map_err(|e| load_error(format!("zstd decompression failed: {}", e)))?;

    let body: SnapshotBody = postcard::from_bytes(&decompressed)
        .map_err(|e| load_error(format!("postcard deserialization failed: {}", e)))?;

    if body.nodes.len() != node_count as usize || body.edges.len() != edge_count as usize {
        warn!(
            expected_nodes = node_count,
            actual_nodes = body.nodes.len(),
            expected_edges = edge_count,
            actual_edges = body.edges.len(),
            "count mismatch in graph snapshot"
        );
    }

    let graph = RoadGraph::from_parts(body.nodes, body.edges)?;

    info!(
        place = %body.place,
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "loaded graph snapshot"
    );

    Ok(Snapshot {
        place: body.place,
        graph,
    })
}

fn count_field(count: usize) -> Result<u32> {
    u32::try_from(count).map_err(|_| Error::SnapshotSerialize {
        message: format!("element count {} does not fit the header", count),
    })
}

fn read_u32(bytes: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(bytes);
    u32::from_le_bytes(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;
    use tempfile::tempdir;

    fn sample() -> RoadGraph {
        GraphBuilder::new()
            .node(1, -15.84, -70.02)
            .node(2, -15.83, -70.02)
            .node(3, -15.83, -70.01)
            .two_way(1, 2, 1112.0)
            .edge(2, 3, 1070.5)
            .build()
            .unwrap()
    }

    #[test]
    fn header_layout() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sample.graph.bin");
        save(&path, "Sample", &sample()).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[0..4], SNAPSHOT_MAGIC);
        assert_eq!(bytes[4], SNAPSHOT_VERSION);
        assert_eq!(read_u32(&bytes[6..10]), 3);
        assert_eq!(read_u32(&bytes[10..14]), 3);
    }

    #[test]
    fn same_graph_same_bytes() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.bin");
        let b = dir.path().join("b.bin");
        save(&a, "Sample", &sample()).unwrap();
        save(&b, "Sample", &sample()).unwrap();
        assert_eq!(fs::read(a).unwrap(), fs::read(b).unwrap());
    }

    #[test]
    fn truncated_file_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("short.bin");
        fs::write(&path, b"SRGS").unwrap();
        let err = load(&path).unwrap_err();
        assert!(err.to_string().contains("too short"));
    }

    #[test]
    fn wrong_version_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("v.bin");
        save(&path, "Sample", &sample()).unwrap();
        let mut bytes = fs::read(&path).unwrap();
        bytes[4] = 99;
        fs::write(&path, bytes).unwrap();
        let err = load(&path).unwrap_err();
        assert!(err.to_string().contains("unsupported version 99"));
    }
}
