//! Test-only frame and payload builders.
//!
//! The toolkit never transmits, so encoding lives with the tests: these
//! builders produce wire-exact frames for decoder and reader tests.

use super::crc::x25_crc;
use super::protocol::*;

/// Encode a MAVLink v1 frame around a full-size payload
pub fn encode_v1(msg_id: u32, payload: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(MAVLINK_V1_HEADER_LEN + payload.len() + 2);
    frame.push(MAVLINK_V1_MAGIC);
    frame.push(payload.len() as u8);
    frame.push(0); // seq
    frame.push(1); // sysid
    frame.push(1); // compid
    frame.push(msg_id as u8);
    frame.extend_from_slice(payload);

    let extra = crc_extra_for(msg_id).unwrap_or(0);
    let crc = x25_crc(&frame[1..], extra);
    frame.extend_from_slice(&crc.to_le_bytes());
    frame
}

/// Encode a MAVLink v2 frame, trimming trailing payload zeros as v2 senders do
pub fn encode_v2(msg_id: u32, payload: &[u8]) -> Vec<u8> {
    let mut trimmed = payload.len();
    while trimmed > 1 && payload[trimmed - 1] == 0 {
        trimmed -= 1;
    }
    let payload = &payload[..trimmed];

    let mut frame = Vec::with_capacity(MAVLINK_V2_HEADER_LEN + payload.len() + 2);
    frame.push(MAVLINK_V2_MAGIC);
    frame.push(payload.len() as u8);
    frame.push(0); // incompat flags
    frame.push(0); // compat flags
    frame.push(0); // seq
    frame.push(1); // sysid
    frame.push(1); // compid
    let id = msg_id.to_le_bytes();
    frame.extend_from_slice(&id[..3]);
    frame.extend_from_slice(payload);

    let extra = crc_extra_for(msg_id).unwrap_or(0);
    let crc = x25_crc(&frame[1..], extra);
    frame.extend_from_slice(&crc.to_le_bytes());
    frame
}

/// One tlog container record: 8-byte big-endian microsecond timestamp + frame
pub fn tlog_record(ts_micros: u64, frame: &[u8]) -> Vec<u8> {
    let mut record = Vec::with_capacity(8 + frame.len());
    record.extend_from_slice(&ts_micros.to_be_bytes());
    record.extend_from_slice(frame);
    record
}

/// Build a GPS_RAW_INT payload from engineering units
pub fn gps_raw_int_payload(lat: f64, lon: f64, fix_type: u8, satellites: u8) -> Vec<u8> {
    let mut p = Vec::with_capacity(GPS_RAW_INT_PAYLOAD_SIZE);
    p.extend_from_slice(&0u64.to_le_bytes()); // time_usec
    p.extend_from_slice(&((lat * 1e7).round() as i32).to_le_bytes());
    p.extend_from_slice(&((lon * 1e7).round() as i32).to_le_bytes());
    p.extend_from_slice(&0i32.to_le_bytes()); // alt
    p.extend_from_slice(&0u16.to_le_bytes()); // eph
    p.extend_from_slice(&0u16.to_le_bytes()); // epv
    p.extend_from_slice(&0u16.to_le_bytes()); // vel
    p.extend_from_slice(&0u16.to_le_bytes()); // cog
    p.push(fix_type);
    p.push(satellites);
    p
}

/// Build an ATTITUDE payload (angles in radians)
pub fn attitude_payload(roll: f32, pitch: f32, yaw: f32) -> Vec<u8> {
    let mut p = Vec::with_capacity(ATTITUDE_PAYLOAD_SIZE);
    p.extend_from_slice(&0u32.to_le_bytes()); // time_boot_ms
    p.extend_from_slice(&roll.to_le_bytes());
    p.extend_from_slice(&pitch.to_le_bytes());
    p.extend_from_slice(&yaw.to_le_bytes());
    p.extend_from_slice(&0f32.to_le_bytes()); // rollspeed
    p.extend_from_slice(&0f32.to_le_bytes()); // pitchspeed
    p.extend_from_slice(&0f32.to_le_bytes()); // yawspeed
    p
}

/// Build a LOCAL_POSITION_NED payload (meters)
pub fn local_position_payload(x: f32, y: f32, z: f32) -> Vec<u8> {
    let mut p = Vec::with_capacity(LOCAL_POSITION_NED_PAYLOAD_SIZE);
    p.extend_from_slice(&0u32.to_le_bytes()); // time_boot_ms
    p.extend_from_slice(&x.to_le_bytes());
    p.extend_from_slice(&y.to_le_bytes());
    p.extend_from_slice(&z.to_le_bytes());
    p.extend_from_slice(&0f32.to_le_bytes()); // vx
    p.extend_from_slice(&0f32.to_le_bytes()); // vy
    p.extend_from_slice(&0f32.to_le_bytes()); // vz
    p
}

/// Build a GLOBAL_POSITION_INT payload (degrees)
pub fn global_position_payload(lat: f64, lon: f64) -> Vec<u8> {
    let mut p = Vec::with_capacity(GLOBAL_POSITION_INT_PAYLOAD_SIZE);
    p.extend_from_slice(&0u32.to_le_bytes()); // time_boot_ms
    p.extend_from_slice(&((lat * 1e7).round() as i32).to_le_bytes());
    p.extend_from_slice(&((lon * 1e7).round() as i32).to_le_bytes());
    p.extend_from_slice(&0i32.to_le_bytes()); // alt
    p.extend_from_slice(&0i32.to_le_bytes()); // relative_alt
    p.extend_from_slice(&0i16.to_le_bytes()); // vx
    p.extend_from_slice(&0i16.to_le_bytes()); // vy
    p.extend_from_slice(&0i16.to_le_bytes()); // vz
    p.extend_from_slice(&0u16.to_le_bytes()); // hdg
    p
}

/// Build a VFR_HUD payload
pub fn vfr_hud_payload(groundspeed: f32, alt: f32, heading: i16) -> Vec<u8> {
    let mut p = Vec::with_capacity(VFR_HUD_PAYLOAD_SIZE);
    p.extend_from_slice(&0f32.to_le_bytes()); // airspeed
    p.extend_from_slice(&groundspeed.to_le_bytes());
    p.extend_from_slice(&alt.to_le_bytes());
    p.extend_from_slice(&0f32.to_le_bytes()); // climb
    p.extend_from_slice(&heading.to_le_bytes());
    p.extend_from_slice(&0u16.to_le_bytes()); // throttle
    p
}

/// Build a RANGEFINDER payload
pub fn rangefinder_payload(distance: f32, voltage: f32) -> Vec<u8> {
    let mut p = Vec::with_capacity(RANGEFINDER_PAYLOAD_SIZE);
    p.extend_from_slice(&distance.to_le_bytes());
    p.extend_from_slice(&voltage.to_le_bytes());
    p
}
