//! # Ground Coverage Estimator
//!
//! Computes the seafloor footprint imaged by the survey camera from the
//! rangefinder altitude and the camera geometry. Pinhole model over a flat
//! bottom: the imaged width grows linearly with altitude, the height follows
//! from the frame aspect ratio.

use tracing::debug;

use crate::config::CameraConfig;
use crate::track::Track;

/// Imaged footprint at one altitude
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Footprint {
    /// Ground width in meters (across the horizontal field of view)
    pub width: f64,

    /// Ground area in square meters
    pub area_m2: f64,
}

/// Footprint at `altitude` meters above the bottom for the given camera
///
/// Returns `None` for nonpositive or non-finite altitudes; a rangefinder
/// reading at or below zero carries no usable geometry.
pub fn footprint(camera: &CameraConfig, altitude: f64) -> Option<Footprint> {
    if !altitude.is_finite() || altitude <= 0.0 {
        return None;
    }

    let half_fov = (camera.fov_horizontal_deg / 2.0).to_radians();
    let width = 2.0 * altitude * half_fov.tan();
    let height = width / camera.aspect_ratio;

    Some(Footprint {
        width,
        area_m2: width * height,
    })
}

/// Fill the coverage columns of every record that has an altitude
///
/// Records without a rangefinder reading keep their coverage fields unset.
pub fn apply(track: &mut Track, camera: &CameraConfig) {
    let mut covered = 0usize;
    for record in &mut track.records {
        if let Some(fp) = record.altitude.and_then(|alt| footprint(camera, alt)) {
            record.width = Some(fp.width);
            record.area_m2 = Some(fp.area_m2);
            covered += 1;
        }
    }
    debug!(
        "coverage estimated for {} of {} records",
        covered,
        track.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::EpochRecord;
    use chrono::{TimeZone, Utc};

    fn camera(fov_deg: f64, aspect: f64) -> CameraConfig {
        CameraConfig {
            fov_horizontal_deg: fov_deg,
            aspect_ratio: aspect,
        }
    }

    #[test]
    fn test_footprint_at_ninety_degrees() {
        // tan(45 deg) = 1, so width is exactly twice the altitude
        let fp = footprint(&camera(90.0, 4.0 / 3.0), 10.0).unwrap();
        assert!((fp.width - 20.0).abs() < 1e-9);
        assert!((fp.area_m2 - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_width_scales_linearly_with_altitude() {
        let cam = camera(80.0, 4.0 / 3.0);
        let one = footprint(&cam, 1.0).unwrap();
        let five = footprint(&cam, 5.0).unwrap();
        assert!((five.width - 5.0 * one.width).abs() < 1e-9);
        assert!((five.area_m2 - 25.0 * one.area_m2).abs() < 1e-6);
    }

    #[test]
    fn test_nonpositive_altitude_has_no_footprint() {
        let cam = camera(80.0, 4.0 / 3.0);
        assert_eq!(footprint(&cam, 0.0), None);
        assert_eq!(footprint(&cam, -2.0), None);
        assert_eq!(footprint(&cam, f64::NAN), None);
    }

    #[test]
    fn test_apply_fills_only_records_with_altitude() {
        let epoch = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let mut with_alt = EpochRecord::new(epoch);
        with_alt.altitude = Some(10.0);
        let without_alt = EpochRecord::new(epoch + chrono::Duration::seconds(1));

        let mut track = Track {
            records: vec![with_alt, without_alt],
        };
        apply(&mut track, &camera(90.0, 4.0 / 3.0));

        assert!((track.records[0].width.unwrap() - 20.0).abs() < 1e-9);
        assert!((track.records[0].area_m2.unwrap() - 300.0).abs() < 1e-9);
        assert_eq!(track.records[1].width, None);
        assert_eq!(track.records[1].area_m2, None);
    }
}
