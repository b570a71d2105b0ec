use std::env;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::graph::RoadGraph;
use crate::snapshot;

/// Environment variable overriding the graph cache directory.
pub const DATA_DIR_ENV: &str = "STREETROUTE_DATA_DIR";

/// Suffix appended to the place-derived snapshot filename.
const SNAPSHOT_SUFFIX: &str = ".graph.bin";

/// Builds a fresh road graph for a place, typically from a remote service.
pub trait GraphSource {
    fn fetch(&self, place: &str) -> Result<RoadGraph>;
}

/// Supplies the road graph for a place, however it is obtained.
pub trait GraphProvider {
    fn load_or_fetch(&self, place: &str) -> Result<RoadGraph>;
}

impl<S: GraphSource + ?Sized> GraphSource for &S {
    fn fetch(&self, place: &str) -> Result<RoadGraph> {
        (**self).fetch(place)
    }
}

/// Snapshot file for `place` inside `dir`.
///
/// `"Puno, Peru"` becomes `Puno_Peru.graph.bin`.
pub fn snapshot_path(dir: &Path, place: &str) -> PathBuf {
    dir.join(format!("{}{}", place.replace(", ", "_"), SNAPSHOT_SUFFIX))
}

/// Resolve the graph cache directory.
///
/// The resolution order is:
/// 1. Explicit `explicit` argument when provided.
/// 2. `STREETROUTE_DATA_DIR` environment variable.
/// 3. Platform-specific project data directory.
pub fn default_data_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir.to_path_buf());
    }

    if let Some(env_dir) = env::var_os(DATA_DIR_ENV) {
        return Ok(PathBuf::from(env_dir));
    }

    let dirs = ProjectDirs::from("org", "streetroute", "streetroute")
        .ok_or(Error::ProjectDirsUnavailable)?;
    Ok(dirs.data_dir().to_path_buf())
}

/// Cache-aside provider: serve the on-disk snapshot when there is one,
/// otherwise fetch from `source` and persist the result.
#[derive(Debug, Clone)]
pub struct CachedGraphProvider<S> {
    source: S,
    data_dir: PathBuf,
}

impl<S: GraphSource> CachedGraphProvider<S> {
    pub fn new(source: S, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            source,
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn snapshot_path(&self, place: &str) -> PathBuf {
        snapshot_path(&self.data_dir, place)
    }

    fn fetch_and_store(&self, place: &str, path: &Path) -> Result<RoadGraph> {
        info!(place, "fetching road graph");
        let graph = self.source.fetch(place)?;
        ensure_not_empty(place, &graph)?;
        snapshot::save(path, place, &graph)?;
        Ok(graph)
    }
}

impl<S: GraphSource> GraphProvider for CachedGraphProvider<S> {
    fn load_or_fetch(&self, place: &str) -> Result<RoadGraph> {
        let path = self.snapshot_path(place);

        if !path.exists() {
            return self.fetch_and_store(place, &path);
        }

        match snapshot::load(&path) {
            Ok(snapshot) => {
                if snapshot.place != place {
                    warn!(
                        expected = place,
                        found = %snapshot.place,
                        path = %path.display(),
                        "snapshot was written for a different place name"
                    );
                }
                ensure_not_empty(place, &snapshot.graph)?;
                Ok(snapshot.graph)
            }
            Err(e) => {
                warn!(
                    error = %e,
                    path = %path.display(),
                    "failed to load graph snapshot, will fetch again"
                );
                self.fetch_and_store(place, &path)
            }
        }
    }
}

fn ensure_not_empty(place: &str, graph: &RoadGraph) -> Result<()> {
    if graph.is_empty() {
        return Err(Error::EmptyGraph {
            place: place.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_name_follows_place() {
        let path = snapshot_path(Path::new("/tmp/cache"), "Puno, Peru");
        assert_eq!(path, PathBuf::from("/tmp/cache/Puno_Peru.graph.bin"));
    }

    #[test]
    fn explicit_dir_wins() {
        let dir = default_data_dir(Some(Path::new("/srv/graphs"))).unwrap();
        assert_eq!(dir, PathBuf::from("/srv/graphs"));
    }
}
