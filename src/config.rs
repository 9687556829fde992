//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Every field has a default, so a missing file or an empty table is a valid
//! configuration; a config file only needs the values it overrides.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::Result;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub camera: CameraConfig,

    #[serde(default)]
    pub projection: ProjectionConfig,

    #[serde(default)]
    pub reckoning: ReckoningConfig,

    #[serde(default)]
    pub map: MapConfig,
}

/// Survey camera geometry, used for imaged-footprint estimation
#[derive(Debug, Deserialize, Clone)]
pub struct CameraConfig {
    /// Horizontal field of view in degrees
    #[serde(default = "default_fov_horizontal_deg")]
    pub fov_horizontal_deg: f64,

    /// Frame aspect ratio (width / height)
    #[serde(default = "default_aspect_ratio")]
    pub aspect_ratio: f64,
}

/// Flat-Earth projection constants for dead reckoning
#[derive(Debug, Deserialize, Clone)]
pub struct ProjectionConfig {
    /// Meters per degree of latitude; longitude is scaled by cos(latitude).
    /// This is an explicit approximation, not a geodesic.
    #[serde(default = "default_meters_per_degree_lat")]
    pub meters_per_degree_lat: f64,
}

/// Dead-reckoning guards
#[derive(Debug, Deserialize, Clone)]
pub struct ReckoningConfig {
    /// Steps shorter than this are sensor jitter and do not move the position
    #[serde(default = "default_min_step_m")]
    pub min_step_m: f64,

    /// Steps longer than this indicate a local-frame origin reset
    #[serde(default = "default_jump_threshold_m")]
    pub jump_threshold_m: f64,
}

/// Map rendering options
#[derive(Debug, Deserialize, Clone)]
pub struct MapConfig {
    /// Initial zoom level
    #[serde(default = "default_zoom")]
    pub zoom: u8,

    /// Initial map center latitude; derived from the tracks when unset
    #[serde(default)]
    pub center_lat: Option<f64>,

    /// Initial map center longitude; derived from the tracks when unset
    #[serde(default)]
    pub center_lon: Option<f64>,
}

// Default value functions
fn default_fov_horizontal_deg() -> f64 { 80.0 }
fn default_aspect_ratio() -> f64 { 4.0 / 3.0 }

fn default_meters_per_degree_lat() -> f64 { 111_320.0 }

fn default_min_step_m() -> f64 { 0.02 }
fn default_jump_threshold_m() -> f64 { 5.0 }

fn default_zoom() -> u8 { 15 }

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_horizontal_deg: default_fov_horizontal_deg(),
            aspect_ratio: default_aspect_ratio(),
        }
    }
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            meters_per_degree_lat: default_meters_per_degree_lat(),
        }
    }
}

impl Default for ReckoningConfig {
    fn default() -> Self {
        Self {
            min_step_m: default_min_step_m(),
            jump_threshold_m: default_jump_threshold_m(),
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            zoom: default_zoom(),
            center_lat: None,
            center_lon: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        if !(self.camera.fov_horizontal_deg > 0.0 && self.camera.fov_horizontal_deg < 180.0) {
            return Err(crate::error::TransectError::Config(toml::de::Error::custom(
                "camera fov_horizontal_deg must be in (0, 180)",
            )));
        }

        if !(self.camera.aspect_ratio > 0.0) {
            return Err(crate::error::TransectError::Config(toml::de::Error::custom(
                "camera aspect_ratio must be positive",
            )));
        }

        if !(self.projection.meters_per_degree_lat > 0.0) {
            return Err(crate::error::TransectError::Config(toml::de::Error::custom(
                "projection meters_per_degree_lat must be positive",
            )));
        }

        if self.reckoning.min_step_m < 0.0 {
            return Err(crate::error::TransectError::Config(toml::de::Error::custom(
                "reckoning min_step_m must not be negative",
            )));
        }

        if self.reckoning.jump_threshold_m <= self.reckoning.min_step_m {
            return Err(crate::error::TransectError::Config(toml::de::Error::custom(
                "reckoning jump_threshold_m must exceed min_step_m",
            )));
        }

        if self.map.zoom == 0 || self.map.zoom > 19 {
            return Err(crate::error::TransectError::Config(toml::de::Error::custom(
                "map zoom must be between 1 and 19",
            )));
        }

        if self.map.center_lat.is_some() != self.map.center_lon.is_some() {
            return Err(crate::error::TransectError::Config(toml::de::Error::custom(
                "map center_lat and center_lon must be set together",
            )));
        }

        Ok(())
    }
}
