//! # Telemetry Log Reader
//!
//! Reads a recorded `.tlog` container: a concatenation of records, each an
//! 8-byte big-endian microsecond wall-clock timestamp followed by one
//! MAVLink frame.
//!
//! The reader is a lazy pull iterator, restartable per invocation (each
//! `open` re-reads the file). Per-frame failures are absorbed here: a bad
//! checksum or garbage byte is logged and the reader resyncs on the next
//! plausible record; they never surface to the pipeline. Only an unreadable
//! container (cannot open, shorter than one record) is a fatal error.

use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use tracing::{debug, info, warn};

use crate::error::{Result, TransectError};
use crate::mavlink::decoder::{decode_frame, FrameOutcome};
use crate::mavlink::protocol::MavMessage;

/// Smallest possible record: timestamp + empty-payload v1 frame
const MIN_RECORD_LEN: usize = 8 + 6 + 2;

/// One decoded, timestamped telemetry message
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetrySample {
    /// Wall-clock capture time from the container record
    pub time: DateTime<Utc>,

    /// The decoded message
    pub message: MavMessage,
}

/// Optional `[start, end)` wall-clock bound on the samples a run consumes
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeBound {
    /// Inclusive lower bound
    pub start: Option<DateTime<Utc>>,

    /// Exclusive upper bound
    pub end: Option<DateTime<Utc>>,
}

impl TimeBound {
    /// True when `time` falls inside the bound
    pub fn contains(&self, time: DateTime<Utc>) -> bool {
        if let Some(start) = self.start {
            if time < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if time >= end {
                return false;
            }
        }
        true
    }

    /// Validate that start precedes end when both are present
    pub fn validate(&self) -> Result<()> {
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start >= end {
                return Err(TransectError::InvalidTimeBound(format!(
                    "start {} is not before end {}",
                    start, end
                )));
            }
        }
        Ok(())
    }
}

/// Lazy iterator over the survey messages in one `.tlog` file
pub struct TlogReader {
    data: Vec<u8>,
    pos: usize,
    bound: TimeBound,
    decoded: u64,
    skipped_frames: u64,
    resync_bytes: u64,
    resync_regions: u64,
    in_resync: bool,
}

impl TlogReader {
    /// Open a telemetry log and position the reader at its first record
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the `.tlog` file
    /// * `bound` - Wall-clock bound; samples outside it are dropped
    ///
    /// # Errors
    ///
    /// Returns `TransectError::Io` if the file cannot be read, or
    /// `TransectError::Decode` if it is too short to hold a single record.
    pub fn open<P: AsRef<Path>>(path: P, bound: TimeBound) -> Result<Self> {
        bound.validate()?;

        let data = std::fs::read(&path)?;
        if data.len() < MIN_RECORD_LEN {
            return Err(TransectError::Decode(format!(
                "{}: {} bytes is too short for a telemetry log",
                path.as_ref().display(),
                data.len()
            )));
        }

        info!(
            "opened telemetry log {} ({} bytes)",
            path.as_ref().display(),
            data.len()
        );

        Ok(Self {
            data,
            pos: 0,
            bound,
            decoded: 0,
            skipped_frames: 0,
            resync_bytes: 0,
            resync_regions: 0,
            in_resync: false,
        })
    }

    /// Number of survey messages decoded so far
    pub fn decoded(&self) -> u64 {
        self.decoded
    }

    /// Number of frames skipped so far (unknown ids, bad checksums, garbage)
    pub fn skipped(&self) -> u64 {
        self.skipped_frames
    }

    /// Number of distinct corrupt regions the reader has resynced past
    pub fn resync_regions(&self) -> u64 {
        self.resync_regions
    }

    /// Convert a container timestamp (microseconds since the Unix epoch) to
    /// UTC; records with nonpositive timestamps are dropped upstream
    fn micros_to_utc(micros: u64) -> Option<DateTime<Utc>> {
        let secs = (micros / 1_000_000) as i64;
        let nanos = ((micros % 1_000_000) * 1_000) as u32;
        Utc.timestamp_opt(secs, nanos).single()
    }
}

impl Iterator for TlogReader {
    type Item = TelemetrySample;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.pos + MIN_RECORD_LEN > self.data.len() {
                if self.pos < self.data.len() {
                    debug!(
                        "dropping {} trailing bytes (truncated final record)",
                        self.data.len() - self.pos
                    );
                }
                if self.resync_bytes > 0 || self.skipped_frames > 0 {
                    debug!(
                        "log exhausted: {} messages, {} frames skipped, {} bytes resynced",
                        self.decoded, self.skipped_frames, self.resync_bytes
                    );
                }
                return None;
            }

            let ts_bytes: [u8; 8] = self.data[self.pos..self.pos + 8].try_into().ok()?;
            let micros = u64::from_be_bytes(ts_bytes);
            let frame_start = self.pos + 8;

            match decode_frame(&self.data[frame_start..]) {
                Ok(FrameOutcome::Message { message, consumed }) => {
                    self.pos = frame_start + consumed;
                    self.decoded += 1;
                    self.in_resync = false;

                    if micros == 0 {
                        // Seen at the head of some logs before the clock is set
                        self.skipped_frames += 1;
                        continue;
                    }
                    let Some(time) = Self::micros_to_utc(micros) else {
                        self.skipped_frames += 1;
                        continue;
                    };
                    if !self.bound.contains(time) {
                        continue;
                    }

                    return Some(TelemetrySample { time, message });
                }
                Ok(FrameOutcome::Skipped { consumed, .. }) => {
                    self.pos = frame_start + consumed;
                    self.skipped_frames += 1;
                    self.in_resync = false;
                }
                Err(e) => {
                    // Resync one byte at a time until a record parses again;
                    // one warning per corrupt region, not per byte
                    if !self.in_resync {
                        warn!("skipping unparseable frame: {}", e);
                        self.in_resync = true;
                        self.resync_regions += 1;
                    }
                    self.pos += 1;
                    self.resync_bytes += 1;
                    self.skipped_frames += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mavlink::protocol::*;
    use crate::mavlink::testframes::*;
    use std::io::Write;

    const T0: u64 = 1_700_000_000_000_000; // 2023-11-14T22:13:20Z in micros

    fn write_log(records: &[Vec<u8>]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for record in records {
            file.write_all(record).unwrap();
        }
        file.flush().unwrap();
        file
    }

    fn sample_log() -> Vec<Vec<u8>> {
        vec![
            tlog_record(
                T0,
                &encode_v1(
                    MSG_ID_GPS_RAW_INT,
                    &gps_raw_int_payload(47.60, -122.33, 3, 10),
                ),
            ),
            tlog_record(
                T0 + 500_000,
                &encode_v1(MSG_ID_RANGEFINDER, &rangefinder_payload(1.5, 0.0)),
            ),
            tlog_record(
                T0 + 1_500_000,
                &encode_v1(
                    MSG_ID_LOCAL_POSITION_NED,
                    &local_position_payload(1.0, 2.0, 3.0),
                ),
            ),
        ]
    }

    #[test]
    fn test_reads_samples_in_order() {
        let file = write_log(&sample_log());
        let reader = TlogReader::open(file.path(), TimeBound::default()).unwrap();
        let samples: Vec<_> = reader.collect();

        assert_eq!(samples.len(), 3);
        assert!(samples.windows(2).all(|w| w[0].time <= w[1].time));
        assert!(matches!(samples[0].message, MavMessage::GpsRawInt(_)));
        assert!(matches!(samples[2].message, MavMessage::LocalPositionNed(_)));
    }

    #[test]
    fn test_restartable_per_invocation() {
        let file = write_log(&sample_log());
        let first: Vec<_> = TlogReader::open(file.path(), TimeBound::default())
            .unwrap()
            .collect();
        let second: Vec<_> = TlogReader::open(file.path(), TimeBound::default())
            .unwrap()
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_time_bound_is_half_open() {
        let file = write_log(&sample_log());
        let start = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let end = Utc.timestamp_opt(1_700_000_001, 0).unwrap();
        let bound = TimeBound {
            start: Some(start),
            end: Some(end),
        };

        let samples: Vec<_> = TlogReader::open(file.path(), bound).unwrap().collect();
        // First two records fall in [T0, T0+1s); the third is at T0+1.5s
        assert_eq!(samples.len(), 2);
        for s in &samples {
            assert!(s.time >= start && s.time < end);
        }
    }

    #[test]
    fn test_inverted_bound_rejected() {
        let file = write_log(&sample_log());
        let bound = TimeBound {
            start: Some(Utc.timestamp_opt(1_700_000_010, 0).unwrap()),
            end: Some(Utc.timestamp_opt(1_700_000_000, 0).unwrap()),
        };
        assert!(matches!(
            TlogReader::open(file.path(), bound),
            Err(TransectError::InvalidTimeBound(_))
        ));
    }

    #[test]
    fn test_garbage_between_records_is_skipped() {
        let mut records = sample_log();
        records.insert(1, vec![0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x42]);
        let file = write_log(&records);

        let samples: Vec<_> = TlogReader::open(file.path(), TimeBound::default())
            .unwrap()
            .collect();
        assert_eq!(samples.len(), 3);
    }

    #[test]
    fn test_corrupt_checksum_skips_only_that_record() {
        let mut records = sample_log();
        let len = records[1].len();
        records[1][len - 1] ^= 0xFF; // corrupt the rangefinder frame checksum
        let file = write_log(&records);

        let samples: Vec<_> = TlogReader::open(file.path(), TimeBound::default())
            .unwrap()
            .collect();
        assert_eq!(samples.len(), 2);
        assert!(matches!(samples[0].message, MavMessage::GpsRawInt(_)));
        assert!(matches!(samples[1].message, MavMessage::LocalPositionNed(_)));
    }

    #[test]
    fn test_each_corrupt_region_counted_separately() {
        // Two garbage runs separated by a clean record are two resync
        // regions, each reported on entry
        let mut records = sample_log();
        records.insert(1, vec![0xDE, 0xAD, 0xBE, 0xEF]);
        records.insert(3, vec![0x13, 0x37, 0x00]);
        let file = write_log(&records);

        let mut reader = TlogReader::open(file.path(), TimeBound::default()).unwrap();
        let samples: Vec<_> = reader.by_ref().collect();
        assert_eq!(samples.len(), 3);
        assert_eq!(reader.resync_regions(), 2);
    }

    #[test]
    fn test_truncated_tail_is_not_fatal() {
        let mut records = sample_log();
        let last = records.pop().unwrap();
        records.push(last[..last.len() - 5].to_vec());
        let file = write_log(&records);

        let samples: Vec<_> = TlogReader::open(file.path(), TimeBound::default())
            .unwrap()
            .collect();
        assert_eq!(samples.len(), 2);
    }

    #[test]
    fn test_unknown_message_ids_skipped() {
        let mut records = sample_log();
        records.insert(0, tlog_record(T0, &encode_v1(0, &[0u8; 9]))); // HEARTBEAT
        let file = write_log(&records);

        let reader = TlogReader::open(file.path(), TimeBound::default()).unwrap();
        let samples: Vec<_> = reader.collect();
        assert_eq!(samples.len(), 3);
    }

    #[test]
    fn test_zero_timestamp_records_dropped() {
        let mut records = sample_log();
        records.insert(
            0,
            tlog_record(0, &encode_v1(MSG_ID_RANGEFINDER, &rangefinder_payload(9.0, 0.0))),
        );
        let file = write_log(&records);

        let samples: Vec<_> = TlogReader::open(file.path(), TimeBound::default())
            .unwrap()
            .collect();
        assert_eq!(samples.len(), 3);
    }

    #[test]
    fn test_short_file_is_fatal() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0u8; 4]).unwrap();
        file.flush().unwrap();
        assert!(matches!(
            TlogReader::open(file.path(), TimeBound::default()),
            Err(TransectError::Decode(_))
        ));
    }

    #[test]
    fn test_missing_file_is_fatal() {
        assert!(matches!(
            TlogReader::open("/nonexistent/file.tlog", TimeBound::default()),
            Err(TransectError::Io(_))
        ));
    }
}
