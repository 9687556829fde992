//! # Track Exporter
//!
//! Writes a [`Track`] as a CSV file with a fixed column set. Unset channels
//! serialize as empty cells. The write is atomic: rows go to a temporary
//! file in the destination directory and the file is renamed into place only
//! after every row is out, so a crash or error mid-export never leaves a
//! partial file behind.

use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::error::{Result, TransectError};
use crate::track::{EpochRecord, Track};

/// One CSV row; field order is the column order
#[derive(Debug, Serialize)]
struct Row<'a> {
    timestamp: String,
    date: String,
    time: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    fused_lat: Option<f64>,
    fused_lon: Option<f64>,
    local_x: Option<f64>,
    local_y: Option<f64>,
    derived_lat: Option<f64>,
    derived_lon: Option<f64>,
    altitude: Option<f64>,
    depth: Option<f64>,
    depth_source: Option<&'a str>,
    heading: Option<f64>,
    ground_speed: Option<f64>,
    width: Option<f64>,
    area_m2: Option<f64>,
}

impl<'a> From<&'a EpochRecord> for Row<'a> {
    fn from(r: &'a EpochRecord) -> Self {
        Self {
            timestamp: r.epoch.to_rfc3339(),
            date: r.epoch.format("%Y-%m-%d").to_string(),
            time: r.epoch.format("%H:%M:%S").to_string(),
            latitude: r.gps_lat,
            longitude: r.gps_lon,
            fused_lat: r.fused_lat,
            fused_lon: r.fused_lon,
            local_x: r.local_x,
            local_y: r.local_y,
            derived_lat: r.derived_lat,
            derived_lon: r.derived_lon,
            altitude: r.altitude,
            depth: r.depth,
            depth_source: r.depth_source.map(|s| s.label()),
            heading: r.heading,
            ground_speed: r.ground_speed,
            width: r.width,
            area_m2: r.area_m2,
        }
    }
}

/// Write `track` to `path` as CSV
///
/// # Errors
///
/// Returns `TransectError::EmptyTrack` before touching the filesystem when
/// the track holds no records, `TransectError::Io` on filesystem failures,
/// and `TransectError::Csv` on serialization failures. On any error the
/// destination path is left untouched.
pub fn write_csv<P: AsRef<Path>>(track: &Track, path: P) -> Result<()> {
    if track.is_empty() {
        return Err(TransectError::EmptyTrack);
    }

    let path = path.as_ref();
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let tmp = match dir {
        Some(dir) => tempfile::NamedTempFile::new_in(dir)?,
        None => tempfile::NamedTempFile::new_in(".")?,
    };

    let mut writer = csv::Writer::from_writer(tmp);
    for record in &track.records {
        writer.serialize(Row::from(record))?;
    }

    let tmp = writer.into_inner().map_err(|e| e.into_error())?;
    tmp.persist(path).map_err(|e| e.error)?;

    info!("wrote {} records to {}", track.len(), path.display());
    Ok(())
}
