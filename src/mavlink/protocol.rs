//! # MAVLink Protocol Constants and Types
//!
//! Definitions for the subset of MAVLink common messages an ROV survey log
//! carries. Only the six message kinds the transect pipeline consumes are
//! typed here; everything else is skipped by id at the decoder.

/// MAVLink v1 frame magic byte
pub const MAVLINK_V1_MAGIC: u8 = 0xFE;

/// MAVLink v2 frame magic byte
pub const MAVLINK_V2_MAGIC: u8 = 0xFD;

/// MAVLink v1 header length (magic, len, seq, sysid, compid, msgid)
pub const MAVLINK_V1_HEADER_LEN: usize = 6;

/// MAVLink v2 header length (magic, len, incompat, compat, seq, sysid,
/// compid, msgid[3])
pub const MAVLINK_V2_HEADER_LEN: usize = 10;

/// Checksum length (little-endian u16 after the payload)
pub const MAVLINK_CHECKSUM_LEN: usize = 2;

/// MAVLink v2 signature length when the signed incompat flag is set
pub const MAVLINK_V2_SIGNATURE_LEN: usize = 13;

/// Incompat flag bit marking a signed v2 frame
pub const MAVLINK_IFLAG_SIGNED: u8 = 0x01;

/// GPS_RAW_INT message id (raw satellite fix)
pub const MSG_ID_GPS_RAW_INT: u32 = 24;

/// ATTITUDE message id (roll/pitch/yaw)
pub const MSG_ID_ATTITUDE: u32 = 30;

/// LOCAL_POSITION_NED message id (fused local-frame position, fed by the DVL)
pub const MSG_ID_LOCAL_POSITION_NED: u32 = 32;

/// GLOBAL_POSITION_INT message id (fused global position estimate)
pub const MSG_ID_GLOBAL_POSITION_INT: u32 = 33;

/// VFR_HUD message id (speed, altitude, climb)
pub const MSG_ID_VFR_HUD: u32 = 74;

/// RANGEFINDER message id (distance to seafloor)
pub const MSG_ID_RANGEFINDER: u32 = 173;

/// GPS_RAW_INT payload size
pub const GPS_RAW_INT_PAYLOAD_SIZE: usize = 30;

/// ATTITUDE payload size
pub const ATTITUDE_PAYLOAD_SIZE: usize = 28;

/// LOCAL_POSITION_NED payload size
pub const LOCAL_POSITION_NED_PAYLOAD_SIZE: usize = 28;

/// GLOBAL_POSITION_INT payload size
pub const GLOBAL_POSITION_INT_PAYLOAD_SIZE: usize = 28;

/// VFR_HUD payload size
pub const VFR_HUD_PAYLOAD_SIZE: usize = 20;

/// RANGEFINDER payload size
pub const RANGEFINDER_PAYLOAD_SIZE: usize = 8;

/// CRC_EXTRA seed for a message id, or `None` for ids this decoder skips
pub fn crc_extra_for(msg_id: u32) -> Option<u8> {
    match msg_id {
        MSG_ID_GPS_RAW_INT => Some(24),
        MSG_ID_ATTITUDE => Some(39),
        MSG_ID_LOCAL_POSITION_NED => Some(185),
        MSG_ID_GLOBAL_POSITION_INT => Some(104),
        MSG_ID_VFR_HUD => Some(20),
        MSG_ID_RANGEFINDER => Some(83),
        _ => None,
    }
}

/// Raw satellite fix (GPS_RAW_INT)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsFix {
    /// Latitude in degrees
    pub latitude: f64,

    /// Longitude in degrees
    pub longitude: f64,

    /// GPS fix type (0-1: no fix, 2: 2D, 3: 3D)
    pub fix_type: u8,

    /// Number of visible satellites
    pub satellites: u8,
}

/// Vehicle attitude in radians (ATTITUDE)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attitude {
    /// Roll angle in radians
    pub roll: f32,

    /// Pitch angle in radians
    pub pitch: f32,

    /// Yaw angle in radians (-pi..pi, 0 = north)
    pub yaw: f32,
}

/// Local-frame position in meters (LOCAL_POSITION_NED)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalPosition {
    /// North position in meters
    pub x: f32,

    /// East position in meters
    pub y: f32,

    /// Down position in meters (positive down)
    pub z: f32,
}

/// Fused global position estimate (GLOBAL_POSITION_INT)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusedFix {
    /// Latitude in degrees
    pub latitude: f64,

    /// Longitude in degrees
    pub longitude: f64,
}

/// HUD state (VFR_HUD)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VfrHud {
    /// Ground speed in m/s
    pub groundspeed: f32,

    /// Altitude (MSL frame; negative-down underwater)
    pub alt: f32,

    /// Climb rate in m/s
    pub climb: f32,

    /// Compass heading in degrees (0-360)
    pub heading: i16,
}

/// Distance to the seafloor in meters (RANGEFINDER)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rangefinder {
    /// Measured distance in meters
    pub distance: f32,

    /// Raw sensor voltage
    pub voltage: f32,
}

/// One decoded survey-relevant message
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MavMessage {
    /// Raw satellite fix
    GpsRawInt(GpsFix),

    /// Vehicle attitude
    Attitude(Attitude),

    /// Local-frame (DVL-fed) position
    LocalPositionNed(LocalPosition),

    /// Fused global position estimate
    GlobalPositionInt(FusedFix),

    /// Speed and altitude HUD state
    VfrHud(VfrHud),

    /// Seafloor rangefinder distance
    Rangefinder(Rangefinder),
}
