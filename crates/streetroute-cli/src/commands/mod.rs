// One module per subcommand. main.rs parses arguments and dispatches here.

pub mod center;
pub mod download;
pub mod route;

use std::path::Path;

use anyhow::{Context, Result};
use streetroute_lib::{CachedGraphProvider, GraphProvider, OverpassSource, RoadGraph};

/// Load the graph for `place` from the snapshot cache, fetching it on a miss.
pub(crate) fn load_graph(data_dir: &Path, place: &str) -> Result<RoadGraph> {
    let provider = CachedGraphProvider::new(OverpassSource::from_env(), data_dir);
    provider
        .load_or_fetch(place)
        .with_context(|| format!("failed to load the road graph for '{}'", place))
}
