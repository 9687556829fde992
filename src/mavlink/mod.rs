//! # MAVLink Frame Codec
//!
//! Minimal MAVLink v1/v2 decode support for the survey messages an ROV
//! telemetry log carries. This is not a dialect-complete implementation:
//! only the six message kinds the transect pipeline consumes are typed, and
//! everything else is skipped by id.

pub mod crc;
pub mod decoder;
pub mod protocol;

#[cfg(test)]
pub mod testframes;
