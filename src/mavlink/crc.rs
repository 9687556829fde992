//! # X.25 Checksum Implementation
//!
//! CRC-16/MCRF4XX checksum calculation for MAVLink frames.
//!
//! **Polynomial**: 0x1021 (reflected: 0x8408)
//! **Initial Value**: 0xFFFF, no final XOR
//!
//! MAVLink seeds the running checksum with a per-message CRC_EXTRA byte so
//! that a payload-layout mismatch between sender and receiver fails the
//! checksum instead of decoding garbage.

/// Reflected CRC-16 polynomial (X.25)
const CRC16_POLY: u16 = 0x8408;

/// Precomputed CRC16 lookup table for fast calculation
const CRC16_TABLE: [u16; 256] = generate_crc16_table();

/// Generate CRC16 lookup table at compile time
const fn generate_crc16_table() -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut i = 0;

    while i < 256 {
        let mut crc = i as u16;
        let mut j = 0;

        while j < 8 {
            if (crc & 0x0001) != 0 {
                crc = (crc >> 1) ^ CRC16_POLY;
            } else {
                crc >>= 1;
            }
            j += 1;
        }

        table[i] = crc;
        i += 1;
    }

    table
}

/// Calculate the X.25 checksum of a byte slice using the lookup table (fast)
///
/// # Arguments
///
/// * `data` - Bytes covered by the checksum (header after the magic byte,
///   plus payload)
/// * `crc_extra` - Per-message CRC_EXTRA byte appended to the covered bytes
///
/// # Returns
///
/// * `u16` - Calculated checksum (transmitted little-endian on the wire)
pub fn x25_crc(data: &[u8], crc_extra: u8) -> u16 {
    let mut crc: u16 = 0xFFFF;

    for &byte in data {
        crc = (crc >> 8) ^ CRC16_TABLE[((crc ^ byte as u16) & 0xFF) as usize];
    }
    crc = (crc >> 8) ^ CRC16_TABLE[((crc ^ crc_extra as u16) & 0xFF) as usize];

    crc
}

/// Accumulate one byte into a running X.25 checksum (slow, for verification)
///
/// This is the bit-twiddling form from the MAVLink reference implementation.
/// Used primarily for testing the lookup table implementation.
#[allow(dead_code)]
fn x25_accumulate(byte: u8, crc: u16) -> u16 {
    let mut tmp = byte ^ (crc & 0xFF) as u8;
    tmp ^= tmp << 4;
    (crc >> 8) ^ ((tmp as u16) << 8) ^ ((tmp as u16) << 3) ^ ((tmp as u16) >> 4)
}
