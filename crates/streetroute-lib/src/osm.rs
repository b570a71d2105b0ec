//! Drivable street graphs from OpenStreetMap.
//!
//! A place name is geocoded with Nominatim, the matching administrative area is
//! queried through Overpass for every way that passes the drive filter, and the
//! returned ways are expanded into directed edges between consecutive nodes.
//!
//! Tests and offline runs can point `STREETROUTE_GRAPH_SOURCE` at a saved
//! Overpass JSON document to skip the network entirely.

use std::collections::{HashMap, HashSet};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::coord::{haversine_distance, Coordinate};
use crate::dataset::GraphSource;
use crate::error::{Error, Result};
use crate::graph::{GraphEdge, GraphNode, NodeId, RoadGraph};

const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/search";
const OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";

const NOMINATIM_URL_ENV: &str = "STREETROUTE_NOMINATIM_URL";
const OVERPASS_URL_ENV: &str = "STREETROUTE_OVERPASS_URL";
/// Path to a local Overpass JSON file used instead of the network.
pub const GRAPH_SOURCE_ENV: &str = "STREETROUTE_GRAPH_SOURCE";

/// Overpass area ids are offset from the underlying relation/way id.
const RELATION_AREA_OFFSET: i64 = 3_600_000_000;
const WAY_AREA_OFFSET: i64 = 2_400_000_000;

/// Ways usable by private motor vehicles.
const DRIVE_FILTER: &str = concat!(
    r#"["highway"]["area"!~"yes"]"#,
    r#"["highway"!~"abandoned|bridleway|bus_guideway|construction|corridor|cycleway|elevator|"#,
    r#"escalator|footway|no|path|pedestrian|planned|platform|proposed|raceway|razed|service|"#,
    r#"steps|track"]"#,
    r#"["motor_vehicle"!~"no"]["motorcar"!~"no"]"#,
    r#"["service"!~"alley|driveway|emergency_access|parking|parking_aisle|private"]"#,
    r#"["access"!~"private"]"#,
);

/// Top-level Overpass JSON document.
#[derive(Debug, Clone, Deserialize)]
pub struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<OsmElement>,
}

/// One element of an Overpass response. Relations and anything else are ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OsmElement {
    Node {
        id: NodeId,
        lat: f64,
        lon: f64,
    },
    Way {
        id: i64,
        #[serde(default)]
        nodes: Vec<NodeId>,
        #[serde(default)]
        tags: HashMap<String, String>,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    osm_type: String,
    osm_id: i64,
}

/// Which directions of a way can be driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Both,
    Forward,
    Reverse,
}

fn direction_of(tags: &HashMap<String, String>) -> Direction {
    match tags.get("oneway").map(String::as_str) {
        Some("yes" | "true" | "1") => return Direction::Forward,
        Some("-1" | "reverse") => return Direction::Reverse,
        _ => {}
    }
    if tags.get("junction").map(String::as_str) == Some("roundabout") {
        return Direction::Forward;
    }
    Direction::Both
}

/// Build a routable graph from an Overpass response.
///
/// Each pair of consecutive way nodes becomes an edge weighted by its
/// great-circle length. Ways referencing nodes missing from the response skip
/// those segments. Only the largest weakly connected component is kept.
pub fn build_drive_graph(response: &OverpassResponse) -> Result<RoadGraph> {
    let mut positions: HashMap<NodeId, Coordinate> = HashMap::new();
    for element in &response.elements {
        if let OsmElement::Node { id, lat, lon } = element {
            positions.insert(*id, Coordinate::new(*lat, *lon));
        }
    }

    let mut used: HashSet<NodeId> = HashSet::new();
    let mut edges = Vec::new();
    let mut way_count = 0usize;

    for element in &response.elements {
        let OsmElement::Way { nodes, tags, .. } = element else {
            continue;
        };
        let direction = direction_of(tags);
        way_count += 1;

        for pair in nodes.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let (Some(pa), Some(pb)) = (positions.get(&a), positions.get(&b)) else {
                continue;
            };
            let length = haversine_distance(pa, pb);

            if direction != Direction::Reverse {
                edges.push(GraphEdge { from: a, to: b, length });
            }
            if direction != Direction::Forward {
                edges.push(GraphEdge { from: b, to: a, length });
            }
            used.insert(a);
            used.insert(b);
        }
    }

    let nodes = positions
        .into_iter()
        .filter(|(id, _)| used.contains(id))
        .map(|(id, position)| GraphNode { id, position });
    let graph = RoadGraph::from_parts(nodes, edges)?;
    let kept = graph.largest_component();

    info!(
        ways = way_count,
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        kept_nodes = kept.node_count(),
        kept_edges = kept.edge_count(),
        "built drive graph from OSM data"
    );

    Ok(kept)
}

/// [`GraphSource`] backed by Nominatim and Overpass.
#[derive(Debug, Clone)]
pub struct OverpassSource {
    nominatim_url: String,
    overpass_url: String,
    local_source: Option<PathBuf>,
}

impl Default for OverpassSource {
    fn default() -> Self {
        Self::from_env()
    }
}

impl OverpassSource {
    /// Public endpoints, overridable through environment variables.
    pub fn from_env() -> Self {
        Self {
            nominatim_url: env::var(NOMINATIM_URL_ENV).unwrap_or_else(|_| NOMINATIM_URL.into()),
            overpass_url: env::var(OVERPASS_URL_ENV).unwrap_or_else(|_| OVERPASS_URL.into()),
            local_source: env::var_os(GRAPH_SOURCE_ENV).map(PathBuf::from),
        }
    }

    /// Read a saved Overpass JSON document instead of querying the network.
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            nominatim_url: NOMINATIM_URL.into(),
            overpass_url: OVERPASS_URL.into(),
            local_source: Some(path.into()),
        }
    }

    fn area_id(&self, client: &Client, place: &str) -> Result<i64> {
        debug!(place, url = %self.nominatim_url, "geocoding place");
        let results: Vec<GeocodeResult> = client
            .get(&self.nominatim_url)
            .query(&[("q", place), ("format", "json"), ("limit", "5")])
            .send()?
            .error_for_status()?
            .json()?;

        results
            .iter()
            .find_map(|result| match result.osm_type.as_str() {
                "relation" => Some(RELATION_AREA_OFFSET + result.osm_id),
                "way" => Some(WAY_AREA_OFFSET + result.osm_id),
                _ => None,
            })
            .ok_or_else(|| Error::PlaceNotFound {
                place: place.to_string(),
            })
    }

    fn download(&self, place: &str) -> Result<OverpassResponse> {
        let client = build_client()?;
        let area = self.area_id(&client, place)?;
        let query = overpass_query(area);
        debug!(area, %query, "querying Overpass");

        let response = client
            .post(&self.overpass_url)
            .form(&[("data", query.as_str())])
            .send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::OsmResponse {
                endpoint: self.overpass_url.clone(),
                message: format!("status {}", status),
            });
        }
        Ok(response.json()?)
    }
}

impl GraphSource for OverpassSource {
    fn fetch(&self, place: &str) -> Result<RoadGraph> {
        let response = match &self.local_source {
            Some(path) => read_local(path)?,
            None => self.download(place)?,
        };
        info!(place, elements = response.elements.len(), "received OSM elements");
        build_drive_graph(&response)
    }
}

fn read_local(path: &Path) -> Result<OverpassResponse> {
    info!(path = %path.display(), "using local OSM data");
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn overpass_query(area: i64) -> String {
    format!(
        "[out:json][timeout:180];area(id:{area})->.searchArea;\
         (way{DRIVE_FILTER}(area.searchArea););(._;>;);out body;"
    )
}

fn build_client() -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(180))
        .user_agent(concat!("streetroute-lib/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(Error::Http)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn oneway_tags() {
        assert_eq!(direction_of(&tags(&[])), Direction::Both);
        assert_eq!(direction_of(&tags(&[("oneway", "yes")])), Direction::Forward);
        assert_eq!(direction_of(&tags(&[("oneway", "1")])), Direction::Forward);
        assert_eq!(direction_of(&tags(&[("oneway", "-1")])), Direction::Reverse);
        assert_eq!(direction_of(&tags(&[("oneway", "no")])), Direction::Both);
        assert_eq!(
            direction_of(&tags(&[("junction", "roundabout")])),
            Direction::Forward
        );
        assert_eq!(
            direction_of(&tags(&[("junction", "roundabout"), ("oneway", "no")])),
            Direction::Forward
        );
    }

    #[test]
    fn unknown_element_types_are_ignored() {
        let json = r#"{"elements":[
            {"type":"relation","id":1,"members":[]},
            {"type":"node","id":5,"lat":1.0,"lon":2.0}
        ]}"#;
        let response: OverpassResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(response.elements[0], OsmElement::Other));
        assert!(matches!(response.elements[1], OsmElement::Node { id: 5, .. }));
    }

    #[test]
    fn query_targets_area() {
        let query = overpass_query(RELATION_AREA_OFFSET + 42);
        assert!(query.contains("area(id:3600000042)"));
        assert!(query.contains(r#"["motorcar"!~"no"]"#));
        assert!(query.starts_with("[out:json]"));
    }
}
