//! Download command handler: make sure the graph snapshot for a place exists.

use std::path::Path;

use anyhow::Result;

use streetroute_cli::output::{DownloadOutput, OutputFormat};
use streetroute_lib::snapshot_path;

use super::load_graph;

/// Ensure the snapshot is on disk and report where it lives.
pub fn handle_download(data_dir: &Path, place: &str, format: OutputFormat) -> Result<()> {
    let graph = load_graph(data_dir, place)?;
    let output = DownloadOutput::new(
        place,
        &snapshot_path(data_dir, place),
        graph.node_count(),
        graph.edge_count(),
    );
    format.render_download(&output)
}
