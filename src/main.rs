//! # ROV Transect
//!
//! Survey telemetry processing for ROV transect dives.
//!
//! `convert` turns a recorded `.tlog` into a per-second track CSV; `map`
//! renders one or more exported CSVs as a Leaflet HTML map; `waypoints`
//! decimates an exported CSV into a QGC WPL 110 mission file.

use anyhow::Result;
use clap::Parser;
use tracing::info;

use rov_transect::args::{Cli, Command, ConvertArgs, MapArgs, Mode, TrackSource, WaypointArgs};
use rov_transect::config::Config;
use rov_transect::position::PositionMode;
use rov_transect::tlog::{TimeBound, TlogReader};
use rov_transect::waypoint::{CoordinateSource, WaypointOptions};
use rov_transect::{aggregate, coverage, export, map, position, waypoint};

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("rov-transect v{} starting", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    match cli.command {
        Command::Convert(args) => run_convert(&args, &config),
        Command::Map(args) => run_map(&args, &config),
        Command::Waypoints(args) => run_waypoints(&args),
    }
}

/// Run the .tlog to CSV pipeline: decode, aggregate, estimate, export
fn run_convert(args: &ConvertArgs, config: &Config) -> Result<()> {
    let bound = TimeBound {
        start: args.start,
        end: args.end,
    };

    let reader = TlogReader::open(&args.input, bound)?;
    let mut track = aggregate::aggregate(reader);
    if track.is_empty() {
        return Err(rov_transect::error::TransectError::EmptyTrack.into());
    }
    info!("aggregated track spans {} seconds", track.len());

    let mode = match args.mode {
        Mode::Fused => PositionMode::Fused,
        Mode::Unfused => PositionMode::Unfused {
            origin: args.origin_lat.zip(args.origin_lon),
        },
    };
    position::estimate(&mut track, mode, &config.projection, &config.reckoning)?;

    coverage::apply(&mut track, &config.camera);

    let output = args.output_path();
    export::write_csv(&track, &output)?;
    info!("conversion complete: {}", output.display());
    Ok(())
}

/// Render exported CSVs as a Leaflet map
fn run_map(args: &MapArgs, config: &Config) -> Result<()> {
    map::render(&args.inputs, &args.output, &config.map)?;
    info!("map written to {}", args.output.display());
    Ok(())
}

/// Decimate a track CSV into a QGC WPL 110 waypoint file
fn run_waypoints(args: &WaypointArgs) -> Result<()> {
    let options = WaypointOptions {
        source: match args.source {
            TrackSource::Gps => CoordinateSource::Gps,
            TrackSource::Fused => CoordinateSource::Fused,
            TrackSource::Derived => CoordinateSource::Derived,
        },
        stride: args.stride,
        altitude: args.altitude,
        frame: args.frame,
    };

    let output = args.output_path();
    waypoint::write_wpl(&args.input, &output, &options)?;
    info!("waypoints written to {}", output.display());
    Ok(())
}
