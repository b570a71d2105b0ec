mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use streetroute_cli::output::OutputFormat;
use streetroute_lib::{default_data_dir, Coordinate};

use commands::route::{parse_coordinate, RouteCommandArgs};

#[derive(Parser, Debug)]
#[command(author, version, about = "streetroute graph and routing utilities")]
struct Cli {
    /// Override the graph cache directory (defaults to STREETROUTE_DATA_DIR,
    /// then the platform data directory).
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Place name to build the street graph for.
    #[arg(long, global = true, default_value = "Puno, Peru")]
    place: String,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ensure the graph snapshot for the place exists and report its location.
    Download,
    /// Compute the shortest drivable route between two coordinates.
    Route {
        /// Start position as LAT,LON.
        #[arg(long = "from", value_parser = parse_coordinate, allow_hyphen_values = true)]
        from: Coordinate,
        /// Destination position as LAT,LON.
        #[arg(long = "to", value_parser = parse_coordinate, allow_hyphen_values = true)]
        to: Coordinate,
    },
    /// Print the initial map view for the place.
    Center,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let data_dir = default_data_dir(cli.data_dir.as_deref())
        .context("failed to resolve the graph cache directory")?;

    match cli.command {
        Command::Download => commands::download::handle_download(&data_dir, &cli.place, cli.format),
        Command::Route { from, to } => commands::route::handle_route(
            &data_dir,
            &cli.place,
            RouteCommandArgs { from, to },
            cli.format,
        ),
        Command::Center => commands::center::handle_center(&data_dir, &cli.place, cli.format),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
