//! # Command-Line Interface
//!
//! Argument definitions for the `rov-transect` binary. Per-run options
//! (paths, mode, time bounds, origin override) live here; tuning values
//! live in the TOML configuration file.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};

/// Survey telemetry processing for ROV transect dives
#[derive(Debug, Parser)]
#[command(name = "rov-transect", version, about)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Convert a .tlog telemetry file into a per-second track CSV
    Convert(ConvertArgs),

    /// Render exported track CSVs as a Leaflet HTML map
    Map(MapArgs),

    /// Decimate a track CSV into a QGC WPL 110 waypoint file
    Waypoints(WaypointArgs),
}

#[derive(Debug, clap::Args)]
pub struct ConvertArgs {
    /// Input .tlog file
    pub input: PathBuf,

    /// Output CSV path (defaults to the input path with a .csv extension)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Position estimation mode
    #[arg(short, long, value_enum, default_value_t = Mode::Fused)]
    pub mode: Mode,

    /// Only process samples at or after this instant
    /// (RFC 3339 or "YYYY-MM-DD HH:MM:SS" UTC)
    #[arg(long, value_parser = parse_instant)]
    pub start: Option<DateTime<Utc>>,

    /// Only process samples before this instant
    #[arg(long, value_parser = parse_instant)]
    pub end: Option<DateTime<Utc>>,

    /// Dead-reckoning origin latitude, used when the log has no usable fix
    #[arg(long, requires = "origin_lon", allow_negative_numbers = true)]
    pub origin_lat: Option<f64>,

    /// Dead-reckoning origin longitude
    #[arg(long, requires = "origin_lat", allow_negative_numbers = true)]
    pub origin_lon: Option<f64>,
}

#[derive(Debug, clap::Args)]
pub struct MapArgs {
    /// Exported track CSV files, one set of polylines each
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output HTML path
    #[arg(short, long, default_value = "transect_map.html")]
    pub output: PathBuf,
}

#[derive(Debug, clap::Args)]
pub struct WaypointArgs {
    /// Exported track CSV
    pub input: PathBuf,

    /// Output waypoint path (defaults to the input path with a .txt extension)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Coordinate columns to trace
    #[arg(short, long, value_enum, default_value_t = TrackSource::Derived)]
    pub source: TrackSource,

    /// One waypoint per this many track points
    #[arg(long, default_value_t = 10)]
    pub stride: usize,

    /// Waypoint altitude in meters
    #[arg(long, default_value_t = -1.0, allow_negative_numbers = true)]
    pub altitude: f64,

    /// MAVLink coordinate frame number
    #[arg(long, default_value_t = 3)]
    pub frame: u8,
}

impl WaypointArgs {
    /// Output path, defaulting to the input with a `.txt` extension
    pub fn output_path(&self) -> PathBuf {
        match &self.output {
            Some(path) => path.clone(),
            None => self.input.with_extension("txt"),
        }
    }
}

/// Which coordinate columns of an exported CSV to read
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TrackSource {
    /// Raw GPS fix
    Gps,

    /// Fused (EKF) estimate
    Fused,

    /// Derived position estimate
    Derived,
}

/// How the per-epoch position estimate is produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Pass through the autopilot's fused (EKF) position
    Fused,

    /// Dead-reckon from local-frame displacement and compass heading
    Unfused,
}

impl ConvertArgs {
    /// Output path, defaulting to the input with a `.csv` extension
    pub fn output_path(&self) -> PathBuf {
        match &self.output {
            Some(path) => path.clone(),
            None => self.input.with_extension("csv"),
        }
    }
}

/// Parse a CLI timestamp: RFC 3339, or a plain `YYYY-MM-DD HH:MM:SS`
/// interpreted as UTC
pub fn parse_instant(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(s) {
        return Ok(instant.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(naive.and_utc());
    }
    Err(format!(
        "'{}' is not RFC 3339 or \"YYYY-MM-DD HH:MM:SS\"",
        s
    ))
}
