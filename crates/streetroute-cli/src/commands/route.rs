//! Route command handler.

use std::path::Path;

use anyhow::{bail, Context, Result};

use streetroute_cli::output::{OutputFormat, RouteOutput};
use streetroute_lib::{Coordinate, RouteResolver};

use super::load_graph;

/// Arguments for the route subcommand after parsing.
#[derive(Debug, Clone, Copy)]
pub struct RouteCommandArgs {
    pub from: Coordinate,
    pub to: Coordinate,
}

/// Parse a `LAT,LON` pair such as `-15.8402,-70.0219`.
pub fn parse_coordinate(value: &str) -> std::result::Result<Coordinate, String> {
    let (lat, lon) = value
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LON but got '{}'", value))?;
    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|_| format!("invalid latitude '{}'", lat.trim()))?;
    let lon: f64 = lon
        .trim()
        .parse()
        .map_err(|_| format!("invalid longitude '{}'", lon.trim()))?;
    Coordinate::new(lat, lon)
        .validated()
        .map_err(|e| e.to_string())
}

pub fn handle_route(
    data_dir: &Path,
    place: &str,
    args: RouteCommandArgs,
    format: OutputFormat,
) -> Result<()> {
    let graph = load_graph(data_dir, place)?;
    let resolver =
        RouteResolver::new(place, graph).context("failed to index the road graph")?;

    let route = match resolver.resolve(args.from, args.to) {
        Ok(route) => route,
        Err(e) if e.is_no_path() => bail!(
            "No drivable route between the selected points ({}). \
             One-way streets may block this direction; try swapping --from and --to.",
            e
        ),
        Err(e) => return Err(e).context("route calculation failed"),
    };

    format.render_route(&RouteOutput::new(place, &route))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_negative_pairs() {
        let coord = parse_coordinate("-15.8402, -70.0219").unwrap();
        assert_eq!(coord, Coordinate::new(-15.8402, -70.0219));
    }

    #[test]
    fn rejects_malformed_pairs() {
        assert!(parse_coordinate("-15.8402").unwrap_err().contains("LAT,LON"));
        assert!(parse_coordinate("north,-70")
            .unwrap_err()
            .contains("invalid latitude"));
        assert!(parse_coordinate("NaN,-70").is_err());
    }
}
