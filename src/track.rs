//! # Survey Track Data Model
//!
//! The unit of output is the [`EpochRecord`]: one calendar second of survey
//! time with the per-channel means observed during that second. A [`Track`]
//! is the ordered record sequence for one processing run.
//!
//! Fields are `Option`al on purpose: a channel with no sample in a given
//! second stays unset. Nothing here interpolates or zero-fills.

use chrono::{DateTime, Utc};

/// Which channel supplied the depth value for an epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthSource {
    /// VFR_HUD altitude (preferred when clearly underwater)
    Vfr,

    /// Negated LOCAL_POSITION_NED down component
    Ned,
}

impl DepthSource {
    /// Column label used on export
    pub fn label(&self) -> &'static str {
        match self {
            DepthSource::Vfr => "vfr_alt",
            DepthSource::Ned => "ned_z",
        }
    }
}

/// One second of aggregated survey telemetry
#[derive(Debug, Clone, PartialEq)]
pub struct EpochRecord {
    /// Epoch start (whole UTC second)
    pub epoch: DateTime<Utc>,

    /// Mean raw GPS fix
    pub gps_lat: Option<f64>,
    /// Mean raw GPS fix
    pub gps_lon: Option<f64>,

    /// Mean fused (EKF) position estimate
    pub fused_lat: Option<f64>,
    /// Mean fused (EKF) position estimate
    pub fused_lon: Option<f64>,

    /// Mean local-frame north position in meters
    pub local_x: Option<f64>,
    /// Mean local-frame east position in meters
    pub local_y: Option<f64>,
    /// Mean local-frame down position in meters (positive down)
    pub local_z: Option<f64>,

    /// Mean VFR_HUD altitude (negative-down underwater)
    pub vfr_alt: Option<f64>,

    /// Mean rangefinder altitude above the seafloor in meters
    pub altitude: Option<f64>,

    /// Mean compass heading in degrees (0 = north, clockwise)
    pub heading: Option<f64>,

    /// Mean ground speed in m/s
    pub ground_speed: Option<f64>,

    /// Depth in meters, negative-down, chosen per [`DepthSource`]
    pub depth: Option<f64>,
    /// Which channel `depth` came from
    pub depth_source: Option<DepthSource>,

    /// Position estimate for this epoch: fused passthrough in fused mode,
    /// dead-reckoned in unfused mode
    pub derived_lat: Option<f64>,
    /// See `derived_lat`
    pub derived_lon: Option<f64>,

    /// Imaged ground width in meters, from altitude and camera FOV
    pub width: Option<f64>,
    /// Imaged ground area in square meters
    pub area_m2: Option<f64>,
}

impl EpochRecord {
    /// Empty record for one whole second
    pub fn new(epoch: DateTime<Utc>) -> Self {
        Self {
            epoch,
            gps_lat: None,
            gps_lon: None,
            fused_lat: None,
            fused_lon: None,
            local_x: None,
            local_y: None,
            local_z: None,
            vfr_alt: None,
            altitude: None,
            heading: None,
            ground_speed: None,
            depth: None,
            depth_source: None,
            derived_lat: None,
            derived_lon: None,
            width: None,
            area_m2: None,
        }
    }
}

/// Ordered per-second record sequence for one survey session
#[derive(Debug, Clone, Default)]
pub struct Track {
    /// Records in strictly increasing epoch order
    pub records: Vec<EpochRecord>,
}

impl Track {
    /// Number of populated seconds
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the track holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
