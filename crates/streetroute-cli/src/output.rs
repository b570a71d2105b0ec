//! Output formatting for CLI results.
//!
//! Every subcommand builds a serializable output struct and hands it to
//! [`OutputFormat`], which prints either a short human-readable summary or
//! the struct as pretty JSON.

use std::io::{self, Write};
use std::path::Path;

use clap::ValueEnum;
use serde::Serialize;

use streetroute_lib::{MapConfig, NodeId, Route};

/// How results are written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Result of the `download` subcommand.
#[derive(Debug, Clone, Serialize)]
pub struct DownloadOutput {
    pub place: String,
    pub snapshot_path: String,
    pub nodes: usize,
    pub edges: usize,
}

impl DownloadOutput {
    pub fn new(place: &str, snapshot_path: &Path, nodes: usize, edges: usize) -> Self {
        Self {
            place: place.to_string(),
            snapshot_path: snapshot_path.display().to_string(),
            nodes,
            edges,
        }
    }
}

/// Result of the `route` subcommand.
#[derive(Debug, Clone, Serialize)]
pub struct RouteOutput {
    pub place: String,
    pub start_node: NodeId,
    pub end_node: NodeId,
    pub length_m: f64,
    pub nodes: Vec<NodeId>,
    /// `[lat, lon]` pairs in route order.
    pub coordinates: Vec<[f64; 2]>,
}

impl RouteOutput {
    pub fn new(place: &str, route: &Route) -> Self {
        Self {
            place: place.to_string(),
            start_node: route.start_node,
            end_node: route.end_node,
            length_m: route.length_m,
            nodes: route.nodes.clone(),
            coordinates: route.coordinates.iter().map(|c| c.to_lat_lon()).collect(),
        }
    }

    pub fn hop_count(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }
}

/// Result of the `center` subcommand.
#[derive(Debug, Clone, Serialize)]
pub struct CenterOutput {
    pub place_name: String,
    pub map_center: [f64; 2],
}

impl From<&MapConfig> for CenterOutput {
    fn from(config: &MapConfig) -> Self {
        Self {
            place_name: config.place_name.clone(),
            map_center: config.center.to_lat_lon(),
        }
    }
}

impl OutputFormat {
    pub fn render_download(self, output: &DownloadOutput) -> anyhow::Result<()> {
        self.render_to(&mut io::stdout().lock(), output, write_download_text)
    }

    pub fn render_route(self, output: &RouteOutput) -> anyhow::Result<()> {
        self.render_to(&mut io::stdout().lock(), output, write_route_text)
    }

    pub fn render_center(self, output: &CenterOutput) -> anyhow::Result<()> {
        self.render_to(&mut io::stdout().lock(), output, write_center_text)
    }

    fn render_to<W, T, F>(self, out: &mut W, value: &T, text: F) -> anyhow::Result<()>
    where
        W: Write,
        T: Serialize,
        F: FnOnce(&mut W, &T) -> io::Result<()>,
    {
        match self {
            OutputFormat::Text => text(out, value)?,
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut *out, value)?;
                writeln!(out)?;
            }
        }
        Ok(())
    }
}

fn write_download_text<W: Write>(out: &mut W, output: &DownloadOutput) -> io::Result<()> {
    writeln!(
        out,
        "Graph for {} available at {}",
        output.place, output.snapshot_path
    )?;
    writeln!(out, "  nodes: {}", output.nodes)?;
    writeln!(out, "  edges: {}", output.edges)
}

fn write_route_text<W: Write>(out: &mut W, output: &RouteOutput) -> io::Result<()> {
    writeln!(
        out,
        "Route from node {} to node {} ({}, {} hops):",
        output.start_node,
        output.end_node,
        format_length(output.length_m),
        output.hop_count()
    )?;
    for (node, [lat, lon]) in output.nodes.iter().zip(&output.coordinates) {
        writeln!(out, "- {} ({:.6}, {:.6})", node, lat, lon)?;
    }
    Ok(())
}

fn write_center_text<W: Write>(out: &mut W, output: &CenterOutput) -> io::Result<()> {
    let [lat, lon] = output.map_center;
    writeln!(out, "{}: {:.6}, {:.6}", output.place_name, lat, lon)
}

/// Metres below one kilometre, kilometres with two decimals above.
fn format_length(metres: f64) -> String {
    if metres < 1000.0 {
        format!("{:.0} m", metres)
    } else {
        format!("{:.2} km", metres / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use streetroute_lib::Coordinate;

    fn render<T: Serialize>(
        format: OutputFormat,
        value: &T,
        text: fn(&mut Vec<u8>, &T) -> io::Result<()>,
    ) -> String {
        let mut buf = Vec::new();
        format.render_to(&mut buf, value, text).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn sample_route() -> RouteOutput {
        RouteOutput {
            place: "Puno, Peru".into(),
            start_node: 1,
            end_node: 6,
            length_m: 1234.5,
            nodes: vec![1, 2, 6],
            coordinates: vec![[-15.84, -70.02], [-15.84, -70.019], [-15.841, -70.018]],
        }
    }

    #[test]
    fn lengths_switch_to_kilometres() {
        assert_eq!(format_length(325.4), "325 m");
        assert_eq!(format_length(1234.5), "1.23 km");
    }

    #[test]
    fn route_text_lists_each_node() {
        let text = render(OutputFormat::Text, &sample_route(), write_route_text);
        assert!(text.starts_with("Route from node 1 to node 6 (1.23 km, 2 hops):"));
        assert!(text.contains("- 2 (-15.840000, -70.019000)"));
        assert_eq!(text.lines().count(), 4);
    }

    #[test]
    fn json_output_is_the_struct() {
        let json = render(OutputFormat::Json, &sample_route(), write_route_text);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["nodes"], serde_json::json!([1, 2, 6]));
        assert_eq!(value["coordinates"][2][1], -70.018);
    }

    #[test]
    fn center_from_map_config() {
        let config = MapConfig {
            center: Coordinate::new(-15.8402, -70.0219),
            place_name: "Puno, Peru".into(),
        };
        let output = CenterOutput::from(&config);
        let text = render(OutputFormat::Text, &output, write_center_text);
        assert_eq!(text, "Puno, Peru: -15.840200, -70.021900\n");
    }
}
