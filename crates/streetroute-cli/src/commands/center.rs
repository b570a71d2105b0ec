use std::path::Path;

use anyhow::{Context, Result};

use streetroute_cli::output::{CenterOutput, OutputFormat};
use streetroute_lib::RouteResolver;

use super::load_graph;

pub fn handle_center(data_dir: &Path, place: &str, format: OutputFormat) -> Result<()> {
    let graph = load_graph(data_dir, place)?;
    let resolver =
        RouteResolver::new(place, graph).context("failed to index the road graph")?;
    format.render_center(&CenterOutput::from(resolver.map_config()))
}
