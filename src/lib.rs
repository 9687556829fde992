//! # ROV Transect Library
//!
//! Survey telemetry processing for ROV transect dives.
//!
//! This library turns recorded `.tlog` telemetry into a per-second survey
//! track: it decodes the MAVLink stream, averages each channel over whole
//! UTC seconds, estimates a position per second (fused passthrough or dead
//! reckoning), sizes the camera's seafloor footprint, and exports the track
//! as CSV. A separate visualizer renders exported tracks as a Leaflet map.

pub mod aggregate;
pub mod args;
pub mod config;
pub mod coverage;
pub mod error;
pub mod export;
pub mod map;
pub mod mavlink;
pub mod position;
pub mod tlog;
pub mod track;
pub mod waypoint;
