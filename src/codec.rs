//! FreeD D1 packet codec
//!
//! Pure encode/decode of the fixed 29-byte D1 frame. All multi-byte fields are
//! big-endian 24-bit integers:
//!
//! | bytes | field | encoding |
//! |---|---|---|
//! | 0 | marker | `0xD1` |
//! | 1 | id | raw byte |
//! | 2-10 | pan, tilt, roll | signed 24-bit, degrees x 32768 |
//! | 11-19 | x, y, z | signed 24-bit, units x 64 |
//! | 20-25 | zoom, focus | unsigned 24-bit |
//! | 26-27 | spare | opaque |
//! | 28 | checksum | written as 0, never validated |
//!
//! Signed fields carry their sign in bit 23 and are sign-extended explicitly
//! before scaling.

use crate::error::{DecodeError, EncodeError};
use crate::types::Sample;

/// Size of a D1 packet in bytes.
pub const D1_PACKET_SIZE: usize = 29;

/// First byte of every D1 packet.
pub const D1_MARKER: u8 = 0xD1;

/// Fixed-point scale of pan/tilt/roll (15 fractional bits).
pub const ANGLE_SCALE: f64 = 32768.0;

/// Fixed-point scale of x/y/z (6 fractional bits).
pub const POSITION_SCALE: f64 = 64.0;

const SIGN_BIT: i32 = 0x0080_0000;
const LOW_24: i32 = 0x00FF_FFFF;

// Field offsets
const ID: usize = 1;
const PAN: usize = 2;
const TILT: usize = 5;
const ROLL: usize = 8;
const X: usize = 11;
const Y: usize = 14;
const Z: usize = 17;
const ZOOM: usize = 20;
const FOCUS: usize = 23;
const SPARE: usize = 26;
const CHECKSUM: usize = 28;

/// Decode one D1 packet.
///
/// Rejects any buffer whose length is not exactly [`D1_PACKET_SIZE`] and any
/// buffer not starting with [`D1_MARKER`]. The checksum byte is ignored.
pub fn decode(buf: &[u8]) -> Result<Sample, DecodeError> {
    let packet: &[u8; D1_PACKET_SIZE] = buf
        .try_into()
        .map_err(|_| DecodeError::Length { expected: D1_PACKET_SIZE, found: buf.len() })?;

    if packet[0] != D1_MARKER {
        return Err(DecodeError::Marker { found: packet[0] });
    }

    Ok(Sample {
        id: packet[ID],
        pan: read_fixed(packet, PAN, ANGLE_SCALE),
        tilt: read_fixed(packet, TILT, ANGLE_SCALE),
        roll: read_fixed(packet, ROLL, ANGLE_SCALE),
        x: read_fixed(packet, X, POSITION_SCALE),
        y: read_fixed(packet, Y, POSITION_SCALE),
        z: read_fixed(packet, Z, POSITION_SCALE),
        zoom: read_u24(packet, ZOOM),
        focus: read_u24(packet, FOCUS),
        spare: [packet[SPARE], packet[SPARE + 1]],
    })
}

/// Encode `sample` into the first [`D1_PACKET_SIZE`] bytes of `buf`.
///
/// Fixed-point fields are truncated toward zero and wrapped to 24 bits; zoom and
/// focus keep their low 24 bits. Nothing is written when `buf` is too small.
pub fn encode(sample: &Sample, buf: &mut [u8]) -> Result<(), EncodeError> {
    let available = buf.len();
    let packet: &mut [u8; D1_PACKET_SIZE] = buf
        .get_mut(..D1_PACKET_SIZE)
        .and_then(|head| head.try_into().ok())
        .ok_or(EncodeError::BufferTooSmall { required: D1_PACKET_SIZE, available })?;

    packet[0] = D1_MARKER;
    packet[ID] = sample.id;

    write_fixed(packet, PAN, sample.pan, ANGLE_SCALE);
    write_fixed(packet, TILT, sample.tilt, ANGLE_SCALE);
    write_fixed(packet, ROLL, sample.roll, ANGLE_SCALE);

    write_fixed(packet, X, sample.x, POSITION_SCALE);
    write_fixed(packet, Y, sample.y, POSITION_SCALE);
    write_fixed(packet, Z, sample.z, POSITION_SCALE);

    write_u24(packet, ZOOM, sample.zoom);
    write_u24(packet, FOCUS, sample.focus);

    packet[SPARE] = sample.spare[0];
    packet[SPARE + 1] = sample.spare[1];

    packet[CHECKSUM] = 0;

    Ok(())
}

/// Encode `sample` into a fresh packet array.
pub fn to_bytes(sample: &Sample) -> [u8; D1_PACKET_SIZE] {
    let mut packet = [0u8; D1_PACKET_SIZE];
    // A full-size array can never be too small
    let _ = encode(sample, &mut packet);
    packet
}

fn read_u24(packet: &[u8; D1_PACKET_SIZE], offset: usize) -> u32 {
    u32::from_be_bytes([0, packet[offset], packet[offset + 1], packet[offset + 2]])
}

/// Read a 24-bit two's-complement field, sign-extended to `i32`.
fn read_i24(packet: &[u8; D1_PACKET_SIZE], offset: usize) -> i32 {
    let raw = read_u24(packet, offset) as i32;
    if raw & SIGN_BIT != 0 { raw | !LOW_24 } else { raw }
}

fn read_fixed(packet: &[u8; D1_PACKET_SIZE], offset: usize, scale: f64) -> f64 {
    read_i24(packet, offset) as f64 / scale
}

fn write_u24(packet: &mut [u8; D1_PACKET_SIZE], offset: usize, value: u32) {
    let [_, b0, b1, b2] = value.to_be_bytes();
    packet[offset..offset + 3].copy_from_slice(&[b0, b1, b2]);
}

fn write_fixed(packet: &mut [u8; D1_PACKET_SIZE], offset: usize, value: f64, scale: f64) {
    let raw = (value * scale) as i32;
    write_u24(packet, offset, (raw & LOW_24) as u32);
}
