//! # Waypoint Exporter
//!
//! Decimates an exported track CSV into a QGC WPL 110 waypoint file, the
//! plain-text mission format ground stations import to retrace a surveyed
//! transect. One waypoint per `stride` usable coordinate rows, each a
//! MAV_CMD_NAV_WAYPOINT (command 16) line.
//!
//! Reference: <https://mavlink.io/en/file_formats/>

use std::io::Write as _;
use std::path::Path;

use tracing::info;

use crate::error::{Result, TransectError};
use crate::map::parse_point;

/// Which coordinate columns of the track CSV feed the waypoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateSource {
    /// Raw GPS fix columns
    Gps,

    /// Fused (EKF) estimate columns
    Fused,

    /// Derived (passthrough or dead-reckoned) columns
    Derived,
}

impl CoordinateSource {
    fn columns(&self) -> (&'static str, &'static str) {
        match self {
            CoordinateSource::Gps => ("latitude", "longitude"),
            CoordinateSource::Fused => ("fused_lat", "fused_lon"),
            CoordinateSource::Derived => ("derived_lat", "derived_lon"),
        }
    }
}

/// Waypoint generation options
#[derive(Debug, Clone, Copy)]
pub struct WaypointOptions {
    /// Coordinate columns to read
    pub source: CoordinateSource,

    /// Emit one waypoint per this many usable coordinate rows
    pub stride: usize,

    /// Waypoint altitude in meters (negative-down; −1.0 keeps the vehicle
    /// just below the surface)
    pub altitude: f64,

    /// MAVLink coordinate frame (3 = global relative-altitude)
    pub frame: u8,
}

impl Default for WaypointOptions {
    fn default() -> Self {
        Self {
            source: CoordinateSource::Derived,
            stride: 10,
            altitude: -1.0,
            frame: 3,
        }
    }
}

/// Convert a track CSV at `input` into a QGC WPL 110 file at `output`
///
/// # Errors
///
/// Returns `TransectError::Csv`/`Io` if the input cannot be read, and
/// `TransectError::EmptyTrack` when the chosen columns yield no usable
/// coordinate. The output is written atomically; nothing is written on
/// error.
pub fn write_wpl<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    options: &WaypointOptions,
) -> Result<()> {
    let input = input.as_ref();
    let output = output.as_ref();

    let mut reader = csv::Reader::from_path(input)?;
    let headers = reader.headers()?.clone();
    let (lat_name, lon_name) = options.source.columns();
    let lat_col = headers.iter().position(|h| h == lat_name);
    let lon_col = headers.iter().position(|h| h == lon_name);

    let mut points: Vec<(f64, f64)> = Vec::new();
    if let (Some(lat_col), Some(lon_col)) = (lat_col, lon_col) {
        for record in reader.records() {
            let record = record?;
            if let Some(point) = parse_point(record.get(lat_col), record.get(lon_col)) {
                points.push(point);
            }
        }
    }

    if points.is_empty() {
        return Err(TransectError::EmptyTrack);
    }

    let stride = options.stride.max(1);
    let mut body = String::from("QGC WPL 110\n");
    for (seq, (lat, lon)) in points.iter().step_by(stride).enumerate() {
        // Column order: seq, current, frame, command, param1-4, lat, lon,
        // alt, autocontinue. The first waypoint is marked current.
        let current = u8::from(seq == 0);
        body.push_str(&format!(
            "{}\t{}\t{}\t16\t0\t0\t0\t0\t{}\t{}\t{}\t1\n",
            seq, current, options.frame, lat, lon, options.altitude
        ));
    }

    write_atomic(output, body.as_bytes())?;

    info!(
        "wrote {} waypoints ({} track points, stride {}) to {}",
        points.len().div_ceil(stride),
        points.len(),
        stride,
        output.display()
    );
    Ok(())
}

fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let mut tmp = match dir {
        Some(dir) => tempfile::NamedTempFile::new_in(dir)?,
        None => tempfile::NamedTempFile::new_in(".")?,
    };
    tmp.write_all(contents)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
