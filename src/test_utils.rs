//! Test utilities for building FreeD packets by hand
//!
//! These builders assemble packets byte by byte, independently of the codec,
//! so unit tests and benchmarks can check the codec against a second source of
//! truth.

#![cfg(any(test, feature = "benchmark"))]

use crate::codec::D1_PACKET_SIZE;
use crate::types::Sample;

/// Signed 24-bit big-endian field with 15 fractional bits (angles).
pub fn enc24_15(value: f64) -> [u8; 3] {
    be24((value * 32768.0) as i32)
}

/// Signed 24-bit big-endian field with 6 fractional bits (positions).
pub fn enc24_6(value: f64) -> [u8; 3] {
    be24((value * 64.0) as i32)
}

/// Unsigned 24-bit big-endian field.
pub fn enc24(value: u32) -> [u8; 3] {
    be24(value as i32)
}

fn be24(raw: i32) -> [u8; 3] {
    [(raw >> 16) as u8, (raw >> 8) as u8, raw as u8]
}

/// Assemble a D1 packet from pre-encoded fields. The checksum byte is left at 0.
pub fn packet_from_fields(
    id: u8,
    angles: [[u8; 3]; 3],
    position: [[u8; 3]; 3],
    lens: [[u8; 3]; 2],
    spare: [u8; 2],
) -> [u8; D1_PACKET_SIZE] {
    let mut packet = [0u8; D1_PACKET_SIZE];
    packet[0] = 0xD1;
    packet[1] = id;

    let fields = angles.iter().chain(position.iter()).chain(lens.iter());
    for (index, field) in fields.enumerate() {
        let offset = 2 + index * 3;
        packet[offset..offset + 3].copy_from_slice(field);
    }

    packet[26] = spare[0];
    packet[27] = spare[1];
    packet
}

/// A representative camera sample with every field populated.
pub fn camera_sample(id: u8) -> Sample {
    Sample {
        id,
        pan: 45.5,
        tilt: -12.25,
        roll: 0.75,
        x: 1250.0,
        y: -340.5,
        z: 1800.25,
        zoom: 0x00_4000,
        focus: 0x00_1A2B,
        spare: [0x01, 0x02],
    }
}

/// Encoded packet for [`camera_sample`].
pub fn camera_packet(id: u8) -> [u8; D1_PACKET_SIZE] {
    let sample = camera_sample(id);
    packet_from_fields(
        id,
        [enc24_15(sample.pan), enc24_15(sample.tilt), enc24_15(sample.roll)],
        [enc24_6(sample.x), enc24_6(sample.y), enc24_6(sample.z)],
        [enc24(sample.zoom), enc24(sample.focus)],
        sample.spare,
    )
}
