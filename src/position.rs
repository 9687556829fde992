//! # Position Estimator
//!
//! Fills the `derived_lat`/`derived_lon` fields of a track in one of two
//! mutually exclusive modes, selected once at run start:
//!
//! - **Fused**: the autopilot's fused global estimate is trusted; the
//!   per-epoch fused means are forwarded as-is.
//! - **Unfused**: no trustworthy global estimate exists; position is
//!   dead-reckoned from per-epoch local-frame displacement, rotated by the
//!   compass heading and projected onto latitude/longitude with a flat-Earth
//!   approximation. The result accumulates sensor drift by construction;
//!   nothing here corrects it.

use tracing::{debug, info};

use crate::config::{ProjectionConfig, ReckoningConfig};
use crate::error::{Result, TransectError};
use crate::track::Track;

/// Position estimation mode for one run
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PositionMode {
    /// Forward the fused global estimate
    Fused,

    /// Dead-reckon from local displacement, optionally seeded with a
    /// configured origin when the log carries no fix at all
    Unfused {
        /// Fallback origin (latitude, longitude) in degrees
        origin: Option<(f64, f64)>,
    },
}

/// Fill the derived position fields of `track` according to `mode`
///
/// # Errors
///
/// - `EmptyTrack` when the track holds no records at all
/// - `MissingFusedPosition` in fused mode when no epoch carries a fused fix
/// - `MissingOrigin` in unfused mode when no GPS fix, no fused fix, and no
///   configured origin exists to seed the reckoning
pub fn estimate(
    track: &mut Track,
    mode: PositionMode,
    projection: &ProjectionConfig,
    reckoning: &ReckoningConfig,
) -> Result<()> {
    if track.is_empty() {
        return Err(TransectError::EmptyTrack);
    }
    match mode {
        PositionMode::Fused => forward_fused(track),
        PositionMode::Unfused { origin } => {
            dead_reckon(track, origin, projection, reckoning)
        }
    }
}

/// Fused mode: copy the per-epoch fused means into the derived fields
fn forward_fused(track: &mut Track) -> Result<()> {
    let mut any = false;
    for record in &mut track.records {
        if let (Some(lat), Some(lon)) = (record.fused_lat, record.fused_lon) {
            record.derived_lat = Some(lat);
            record.derived_lon = Some(lon);
            any = true;
        }
    }
    if !any {
        return Err(TransectError::MissingFusedPosition);
    }
    info!("fused mode: forwarded fused position estimates");
    Ok(())
}

/// Index and coordinates of the seed fix for dead reckoning:
/// first GPS fix, else first fused fix, else the configured origin
fn find_seed(
    track: &Track,
    origin: Option<(f64, f64)>,
) -> Result<(usize, f64, f64)> {
    for (i, record) in track.records.iter().enumerate() {
        if let (Some(lat), Some(lon)) = (record.gps_lat, record.gps_lon) {
            return Ok((i, lat, lon));
        }
    }
    for (i, record) in track.records.iter().enumerate() {
        if let (Some(lat), Some(lon)) = (record.fused_lat, record.fused_lon) {
            debug!("no GPS fix in track, seeding from fused estimate");
            return Ok((i, lat, lon));
        }
    }
    if let Some((lat, lon)) = origin {
        debug!("no fix in track, seeding from configured origin");
        return Ok((0, lat, lon));
    }
    Err(TransectError::MissingOrigin)
}

/// Unfused mode: integrate local-frame displacement into a running position
///
/// Per epoch with local samples: the displacement delta is the difference of
/// the epoch-mean local x/y from the previous such epoch, rotated from the
/// body frame into north/east by the epoch's compass heading, then converted
/// to a latitude/longitude delta with the flat-Earth scaling from
/// `projection`. Steps below `min_step_m` are jitter and do not move the
/// position; steps above `jump_threshold_m` indicate a local-origin reset
/// and re-seed from the epoch's own fix when one exists.
fn dead_reckon(
    track: &mut Track,
    origin: Option<(f64, f64)>,
    projection: &ProjectionConfig,
    reckoning: &ReckoningConfig,
) -> Result<()> {
    let (seed_idx, seed_lat, seed_lon) = find_seed(track, origin)?;

    let mut lat = seed_lat;
    let mut lon = seed_lon;
    let mut prev_xy: Option<(f64, f64)> = None;
    let mut last_heading_deg: f64 = 0.0;
    let mut jumps: u32 = 0;

    for record in &mut track.records[seed_idx..] {
        if let Some(h) = record.heading {
            last_heading_deg = h;
        }

        if let (Some(x), Some(y)) = (record.local_x, record.local_y) {
            if let Some((px, py)) = prev_xy {
                let dx = x - px;
                let dy = y - py;
                let step = (dx * dx + dy * dy).sqrt();

                if step > reckoning.jump_threshold_m {
                    // Local-frame origin reset: re-seed instead of
                    // integrating a kilometer-scale phantom step
                    jumps += 1;
                    if let (Some(glat), Some(glon)) = (record.gps_lat, record.gps_lon) {
                        lat = glat;
                        lon = glon;
                    } else if let (Some(flat), Some(flon)) =
                        (record.fused_lat, record.fused_lon)
                    {
                        lat = flat;
                        lon = flon;
                    } else {
                        // No fix to re-seed from; integrate and accept the
                        // jump rather than fabricate a position
                        let (north, east) = body_to_ned(dx, dy, last_heading_deg);
                        advance(&mut lat, &mut lon, north, east, projection);
                    }
                } else if step >= reckoning.min_step_m {
                    let (north, east) = body_to_ned(dx, dy, last_heading_deg);
                    advance(&mut lat, &mut lon, north, east, projection);
                }
                // step < min_step_m: jitter, hold position
            }
            prev_xy = Some((x, y));
            record.derived_lat = Some(lat);
            record.derived_lon = Some(lon);
        } else {
            // No displacement sample this second; position holds
            record.derived_lat = Some(lat);
            record.derived_lon = Some(lon);
        }
    }

    info!(
        "dead reckoning seeded at ({:.6}, {:.6}), {} origin-reset jumps",
        seed_lat, seed_lon, jumps
    );
    Ok(())
}

/// Rotate a body-frame displacement into north/east components using a
/// compass heading (degrees, 0 = north, clockwise positive)
fn body_to_ned(dx: f64, dy: f64, heading_deg: f64) -> (f64, f64) {
    let h = heading_deg.to_radians();
    let (sin_h, cos_h) = h.sin_cos();
    let north = dx * cos_h - dy * sin_h;
    let east = dx * sin_h + dy * cos_h;
    (north, east)
}

/// Accumulate a metric north/east displacement into a running lat/lon using
/// the flat-Earth scaling: meters-per-degree latitude is constant, longitude
/// shrinks with cos(latitude). A documented approximation, accurate to well
/// under jitter scale over transect-length tracks.
fn advance(
    lat: &mut f64,
    lon: &mut f64,
    north_m: f64,
    east_m: f64,
    projection: &ProjectionConfig,
) {
    let mpd = projection.meters_per_degree_lat;
    *lat += north_m / mpd;
    *lon += east_m / (mpd * lat.to_radians().cos());
}
