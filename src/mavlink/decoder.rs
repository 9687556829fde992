//! # MAVLink Frame Decoder
//!
//! Decodes MAVLink v1/v2 frames and extracts the survey messages
//! (GPS_RAW_INT, ATTITUDE, LOCAL_POSITION_NED, GLOBAL_POSITION_INT,
//! VFR_HUD, RANGEFINDER).

use bytes::Buf;

use super::crc::x25_crc;
use super::protocol::*;
use crate::error::{Result, TransectError};

/// Outcome of decoding one frame from a byte slice
#[derive(Debug, Clone)]
pub enum FrameOutcome {
    /// A survey-relevant message was decoded
    Message {
        /// The decoded message
        message: MavMessage,
        /// Total frame size in bytes, including magic and checksum
        consumed: usize,
    },

    /// A structurally valid frame carrying a message id the pipeline does
    /// not consume; skipped by length
    Skipped {
        /// The unconsumed message id
        msg_id: u32,
        /// Total frame size in bytes
        consumed: usize,
    },
}

/// Decode one MAVLink frame from the start of `buf`
///
/// # Arguments
///
/// * `buf` - Byte slice starting at a supposed magic byte; may extend past
///   the end of the frame
///
/// # Returns
///
/// * `Result<FrameOutcome>` - Decoded message (or length-skip for unknown
///   ids), or error if the frame is invalid
///
/// # Errors
///
/// Returns error if:
/// - The first byte is not a MAVLink magic byte
/// - The slice ends before the frame does
/// - The checksum does not match
///
/// Unknown message ids are not an error: their CRC_EXTRA seed is unknown so
/// the checksum cannot be verified, and the frame is skipped by its declared
/// length, which is how reference MAVLink parsers handle ids outside their
/// dialect.
pub fn decode_frame(buf: &[u8]) -> Result<FrameOutcome> {
    if buf.is_empty() {
        return Err(TransectError::Decode("empty frame".to_string()));
    }

    let (header_len, msg_id, payload_len, trailer_len) = match buf[0] {
        MAVLINK_V1_MAGIC => {
            if buf.len() < MAVLINK_V1_HEADER_LEN {
                return Err(TransectError::Decode("v1 header truncated".to_string()));
            }
            (
                MAVLINK_V1_HEADER_LEN,
                buf[5] as u32,
                buf[1] as usize,
                MAVLINK_CHECKSUM_LEN,
            )
        }
        MAVLINK_V2_MAGIC => {
            if buf.len() < MAVLINK_V2_HEADER_LEN {
                return Err(TransectError::Decode("v2 header truncated".to_string()));
            }
            let msg_id = u32::from_le_bytes([buf[7], buf[8], buf[9], 0]);
            let mut trailer = MAVLINK_CHECKSUM_LEN;
            if buf[2] & MAVLINK_IFLAG_SIGNED != 0 {
                trailer += MAVLINK_V2_SIGNATURE_LEN;
            }
            (MAVLINK_V2_HEADER_LEN, msg_id, buf[1] as usize, trailer)
        }
        other => {
            return Err(TransectError::Decode(format!(
                "invalid magic byte: 0x{:02X}",
                other
            )));
        }
    };

    let total = header_len + payload_len + trailer_len;
    if buf.len() < total {
        return Err(TransectError::Decode(format!(
            "frame truncated: expected {} bytes, got {}",
            total,
            buf.len()
        )));
    }

    let crc_extra = match crc_extra_for(msg_id) {
        Some(extra) => extra,
        None => {
            return Ok(FrameOutcome::Skipped {
                msg_id,
                consumed: total,
            });
        }
    };

    // Checksum covers everything between the magic byte and the checksum
    // itself, then folds in the per-message CRC_EXTRA seed
    let crc_end = header_len + payload_len;
    let calculated = x25_crc(&buf[1..crc_end], crc_extra);
    let received = u16::from_le_bytes([buf[crc_end], buf[crc_end + 1]]);

    if calculated != received {
        return Err(TransectError::Decode(format!(
            "checksum mismatch on msg {}: expected 0x{:04X}, got 0x{:04X}",
            msg_id, calculated, received
        )));
    }

    let payload = &buf[header_len..header_len + payload_len];
    let message = decode_message(msg_id, payload)?;

    Ok(FrameOutcome::Message {
        message,
        consumed: total,
    })
}

/// Decode a known message payload into its typed form
///
/// MAVLink v2 strips trailing zero bytes from payloads, so the payload is
/// zero-extended to the message's full wire size before field extraction.
fn decode_message(msg_id: u32, payload: &[u8]) -> Result<MavMessage> {
    Ok(match msg_id {
        MSG_ID_GPS_RAW_INT => {
            MavMessage::GpsRawInt(decode_gps_raw_int(&zero_extend(
                payload,
                GPS_RAW_INT_PAYLOAD_SIZE,
            )))
        }
        MSG_ID_ATTITUDE => {
            MavMessage::Attitude(decode_attitude(&zero_extend(payload, ATTITUDE_PAYLOAD_SIZE)))
        }
        MSG_ID_LOCAL_POSITION_NED => MavMessage::LocalPositionNed(decode_local_position_ned(
            &zero_extend(payload, LOCAL_POSITION_NED_PAYLOAD_SIZE),
        )),
        MSG_ID_GLOBAL_POSITION_INT => MavMessage::GlobalPositionInt(decode_global_position_int(
            &zero_extend(payload, GLOBAL_POSITION_INT_PAYLOAD_SIZE),
        )),
        MSG_ID_VFR_HUD => {
            MavMessage::VfrHud(decode_vfr_hud(&zero_extend(payload, VFR_HUD_PAYLOAD_SIZE)))
        }
        MSG_ID_RANGEFINDER => MavMessage::Rangefinder(decode_rangefinder(&zero_extend(
            payload,
            RANGEFINDER_PAYLOAD_SIZE,
        ))),
        other => {
            return Err(TransectError::Decode(format!(
                "no decoder for message id {}",
                other
            )));
        }
    })
}

/// Pad a (possibly v2-truncated) payload with zeros to its full wire size
fn zero_extend(payload: &[u8], size: usize) -> Vec<u8> {
    let mut full = vec![0u8; size];
    let n = payload.len().min(size);
    full[..n].copy_from_slice(&payload[..n]);
    full
}

/// Decode GPS_RAW_INT payload (raw fix, degrees × 10^7)
fn decode_gps_raw_int(payload: &[u8]) -> GpsFix {
    let mut buf = payload;

    // time_usec: not used, the tlog container timestamp wins
    let _ = buf.get_u64_le();

    let latitude = buf.get_i32_le() as f64 / 10_000_000.0;
    let longitude = buf.get_i32_le() as f64 / 10_000_000.0;

    // alt, eph, epv, vel, cog
    let _ = buf.get_i32_le();
    let _ = buf.get_u16_le();
    let _ = buf.get_u16_le();
    let _ = buf.get_u16_le();
    let _ = buf.get_u16_le();

    let fix_type = buf.get_u8();
    let satellites = buf.get_u8();

    GpsFix {
        latitude,
        longitude,
        fix_type,
        satellites,
    }
}

/// Decode ATTITUDE payload (radians)
fn decode_attitude(payload: &[u8]) -> Attitude {
    let mut buf = payload;

    let _time_boot_ms = buf.get_u32_le();
    let roll = buf.get_f32_le();
    let pitch = buf.get_f32_le();
    let yaw = buf.get_f32_le();

    Attitude { roll, pitch, yaw }
}

/// Decode LOCAL_POSITION_NED payload (meters, NED frame)
fn decode_local_position_ned(payload: &[u8]) -> LocalPosition {
    let mut buf = payload;

    let _time_boot_ms = buf.get_u32_le();
    let x = buf.get_f32_le();
    let y = buf.get_f32_le();
    let z = buf.get_f32_le();

    LocalPosition { x, y, z }
}

/// Decode GLOBAL_POSITION_INT payload (fused estimate, degrees × 10^7)
fn decode_global_position_int(payload: &[u8]) -> FusedFix {
    let mut buf = payload;

    let _time_boot_ms = buf.get_u32_le();
    let latitude = buf.get_i32_le() as f64 / 10_000_000.0;
    let longitude = buf.get_i32_le() as f64 / 10_000_000.0;

    FusedFix {
        latitude,
        longitude,
    }
}

/// Decode VFR_HUD payload
fn decode_vfr_hud(payload: &[u8]) -> VfrHud {
    let mut buf = payload;

    let _airspeed = buf.get_f32_le();
    let groundspeed = buf.get_f32_le();
    let alt = buf.get_f32_le();
    let climb = buf.get_f32_le();
    let heading = buf.get_i16_le();

    VfrHud {
        groundspeed,
        alt,
        climb,
        heading,
    }
}

/// Decode RANGEFINDER payload (meters above seafloor)
fn decode_rangefinder(payload: &[u8]) -> Rangefinder {
    let mut buf = payload;

    let distance = buf.get_f32_le();
    let voltage = buf.get_f32_le();

    Rangefinder { distance, voltage }
}
