//! # Epoch Aggregator
//!
//! Buckets the sample stream into whole UTC seconds and averages each
//! numeric channel within its second. One [`EpochRecord`] per second that
//! saw at least one sample; empty seconds are omitted, never interpolated.
//!
//! The accumulate-by-key shape: a `BTreeMap` from epoch second to per-channel
//! (sum, count) accumulators, finalized once into means and discarded.

use std::collections::BTreeMap;

use chrono::{TimeZone, Utc};
use tracing::info;

use crate::mavlink::protocol::MavMessage;
use crate::tlog::TelemetrySample;
use crate::track::{DepthSource, EpochRecord, Track};

/// Depth rule: prefer the VFR altitude only when it reads clearly underwater
const VFR_DEPTH_THRESHOLD_M: f64 = -0.5;

/// Running mean for one channel within one epoch
#[derive(Debug, Clone, Copy, Default)]
struct ChannelAccum {
    sum: f64,
    count: u32,
}

impl ChannelAccum {
    fn add(&mut self, value: f64) {
        if value.is_finite() {
            self.sum += value;
            self.count += 1;
        }
    }

    fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as f64)
        }
    }
}

/// Per-epoch accumulator set, one slot per channel
#[derive(Debug, Clone, Copy, Default)]
struct EpochAccum {
    gps_lat: ChannelAccum,
    gps_lon: ChannelAccum,
    fused_lat: ChannelAccum,
    fused_lon: ChannelAccum,
    local_x: ChannelAccum,
    local_y: ChannelAccum,
    local_z: ChannelAccum,
    vfr_alt: ChannelAccum,
    altitude: ChannelAccum,
    heading: ChannelAccum,
    ground_speed: ChannelAccum,
}

impl EpochAccum {
    fn add(&mut self, message: &MavMessage) {
        match message {
            MavMessage::GpsRawInt(fix) => {
                // A (0, 0) fix is the receiver's "no fix yet" placeholder
                if fix.latitude != 0.0 || fix.longitude != 0.0 {
                    self.gps_lat.add(fix.latitude);
                    self.gps_lon.add(fix.longitude);
                }
            }
            MavMessage::GlobalPositionInt(fix) => {
                if fix.latitude != 0.0 || fix.longitude != 0.0 {
                    self.fused_lat.add(fix.latitude);
                    self.fused_lon.add(fix.longitude);
                }
            }
            MavMessage::Attitude(att) => {
                self.heading.add(compass_degrees(att.yaw as f64));
            }
            MavMessage::LocalPositionNed(ned) => {
                self.local_x.add(ned.x as f64);
                self.local_y.add(ned.y as f64);
                self.local_z.add(ned.z as f64);
            }
            MavMessage::VfrHud(hud) => {
                self.vfr_alt.add(hud.alt as f64);
                self.ground_speed.add(hud.groundspeed as f64);
            }
            MavMessage::Rangefinder(range) => {
                self.altitude.add(range.distance as f64);
            }
        }
    }

    fn finalize(&self, epoch_secs: i64) -> EpochRecord {
        let mut record = EpochRecord::new(
            Utc.timestamp_opt(epoch_secs, 0)
                .single()
                .expect("epoch seconds from a valid sample timestamp"),
        );

        record.gps_lat = self.gps_lat.mean();
        record.gps_lon = self.gps_lon.mean();
        record.fused_lat = self.fused_lat.mean();
        record.fused_lon = self.fused_lon.mean();
        record.local_x = self.local_x.mean();
        record.local_y = self.local_y.mean();
        record.local_z = self.local_z.mean();
        record.vfr_alt = self.vfr_alt.mean();
        record.altitude = self.altitude.mean();
        record.heading = self.heading.mean();
        record.ground_speed = self.ground_speed.mean();

        // Depth (negative-down): prefer VFR altitude when clearly underwater,
        // else negate the NED down component. A VFR reading at or above the
        // threshold with no NED sample leaves depth unset.
        match (record.vfr_alt, record.local_z) {
            (Some(vfr), _) if vfr < VFR_DEPTH_THRESHOLD_M => {
                record.depth = Some(vfr);
                record.depth_source = Some(DepthSource::Vfr);
            }
            (_, Some(z)) => {
                record.depth = Some(-z);
                record.depth_source = Some(DepthSource::Ned);
            }
            _ => {}
        }

        record
    }
}

/// Normalize a yaw angle in radians to a 0-360 compass bearing
/// (0 = north, clockwise positive)
fn compass_degrees(yaw_rad: f64) -> f64 {
    (yaw_rad.to_degrees() + 360.0) % 360.0
}

/// Aggregate a sample stream into a per-second [`Track`]
///
/// Epoch boundaries align to whole wall-clock seconds of the sample
/// timestamps, not to pipeline start. Output order follows the epoch key,
/// so epochs are strictly increasing and never duplicated even if the input
/// interleaves across second boundaries.
pub fn aggregate<I>(samples: I) -> Track
where
    I: IntoIterator<Item = TelemetrySample>,
{
    let mut buckets: BTreeMap<i64, EpochAccum> = BTreeMap::new();
    let mut sample_count: u64 = 0;

    for sample in samples {
        let key = sample.time.timestamp();
        buckets.entry(key).or_default().add(&sample.message);
        sample_count += 1;
    }

    let records: Vec<EpochRecord> = buckets
        .iter()
        .map(|(&secs, accum)| accum.finalize(secs))
        .collect();

    info!(
        "aggregated {} samples into {} epoch records",
        sample_count,
        records.len()
    );

    Track { records }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mavlink::protocol::*;
    use chrono::{DateTime, Duration};

    fn t(secs: i64, millis: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap() + Duration::milliseconds(millis)
    }

    fn gps(secs: i64, millis: i64, lat: f64, lon: f64) -> TelemetrySample {
        TelemetrySample {
            time: t(secs, millis),
            message: MavMessage::GpsRawInt(GpsFix {
                latitude: lat,
                longitude: lon,
                fix_type: 3,
                satellites: 10,
            }),
        }
    }

    fn range(secs: i64, millis: i64, distance: f32) -> TelemetrySample {
        TelemetrySample {
            time: t(secs, millis),
            message: MavMessage::Rangefinder(Rangefinder {
                distance,
                voltage: 0.0,
            }),
        }
    }

    const E: i64 = 1_700_000_000;

    #[test]
    fn test_epochs_unique_and_strictly_increasing() {
        let samples = vec![
            range(E, 100, 1.0),
            range(E + 2, 0, 2.0),
            range(E, 900, 3.0),
            range(E + 1, 500, 4.0),
            range(E + 2, 999, 5.0),
        ];
        let track = aggregate(samples);

        let epochs: Vec<i64> = track.records.iter().map(|r| r.epoch.timestamp()).collect();
        assert_eq!(epochs, vec![E, E + 1, E + 2]);
        assert!(epochs.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_channel_means() {
        let samples = vec![range(E, 100, 1.0), range(E, 500, 2.0), range(E, 900, 6.0)];
        let track = aggregate(samples);
        assert_eq!(track.records.len(), 1);
        assert_eq!(track.records[0].altitude, Some(3.0));
    }

    #[test]
    fn test_absent_channels_stay_unset() {
        let track = aggregate(vec![range(E, 0, 2.0)]);
        let record = &track.records[0];
        assert_eq!(record.altitude, Some(2.0));
        assert_eq!(record.gps_lat, None);
        assert_eq!(record.gps_lon, None);
        assert_eq!(record.heading, None);
        assert_eq!(record.depth, None);
    }

    #[test]
    fn test_empty_seconds_omitted() {
        let track = aggregate(vec![range(E, 0, 1.0), range(E + 10, 0, 1.0)]);
        assert_eq!(track.records.len(), 2);
        assert_eq!(track.records[1].epoch.timestamp(), E + 10);
    }

    #[test]
    fn test_zero_gps_placeholder_ignored() {
        let track = aggregate(vec![gps(E, 0, 0.0, 0.0), gps(E, 500, 47.6, -122.3)]);
        let record = &track.records[0];
        assert_eq!(record.gps_lat, Some(47.6));
        assert_eq!(record.gps_lon, Some(-122.3));
    }

    #[test]
    fn test_heading_normalized_to_compass() {
        // yaw of -pi/2 radians is a 270 degree compass bearing
        let samples = vec![TelemetrySample {
            time: t(E, 0),
            message: MavMessage::Attitude(Attitude {
                roll: 0.0,
                pitch: 0.0,
                yaw: -std::f32::consts::FRAC_PI_2,
            }),
        }];
        let track = aggregate(samples);
        let heading = track.records[0].heading.unwrap();
        assert!((heading - 270.0).abs() < 1e-4);
    }

    #[test]
    fn test_depth_prefers_vfr_when_underwater() {
        let samples = vec![
            TelemetrySample {
                time: t(E, 0),
                message: MavMessage::VfrHud(VfrHud {
                    groundspeed: 0.5,
                    alt: -8.2,
                    climb: 0.0,
                    heading: 0,
                }),
            },
            TelemetrySample {
                time: t(E, 100),
                message: MavMessage::LocalPositionNed(LocalPosition {
                    x: 0.0,
                    y: 0.0,
                    z: 7.0,
                }),
            },
        ];
        let record = aggregate(samples).records.remove(0);
        assert!((record.depth.unwrap() - (-8.2)).abs() < 1e-5);
        assert_eq!(record.depth_source, Some(DepthSource::Vfr));
    }

    #[test]
    fn test_depth_falls_back_to_ned() {
        // VFR altitude near the surface is untrustworthy; use -NED z
        let samples = vec![
            TelemetrySample {
                time: t(E, 0),
                message: MavMessage::VfrHud(VfrHud {
                    groundspeed: 0.5,
                    alt: -0.1,
                    climb: 0.0,
                    heading: 0,
                }),
            },
            TelemetrySample {
                time: t(E, 100),
                message: MavMessage::LocalPositionNed(LocalPosition {
                    x: 0.0,
                    y: 0.0,
                    z: 6.5,
                }),
            },
        ];
        let record = aggregate(samples).records.remove(0);
        assert!((record.depth.unwrap() - (-6.5)).abs() < 1e-5);
        assert_eq!(record.depth_source, Some(DepthSource::Ned));
    }

    #[test]
    fn test_surface_vfr_without_ned_leaves_depth_unset() {
        // A near-surface VFR reading is untrustworthy; with no NED sample to
        // fall back on, the epoch gets no depth at all
        let samples = vec![TelemetrySample {
            time: t(E, 0),
            message: MavMessage::VfrHud(VfrHud {
                groundspeed: 0.5,
                alt: -0.1,
                climb: 0.0,
                heading: 0,
            }),
        }];
        let record = aggregate(samples).records.remove(0);
        assert!((record.vfr_alt.unwrap() - (-0.1)).abs() < 1e-6);
        assert_eq!(record.depth, None);
        assert_eq!(record.depth_source, None);
    }

    #[test]
    fn test_empty_input_produces_empty_track() {
        let track = aggregate(Vec::new());
        assert!(track.is_empty());
    }
}
