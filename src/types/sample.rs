//! Decoded FreeD D1 sample

/// One decoded D1 frame: camera pose plus lens encoder values.
///
/// Angles are in degrees and positions in wire units (typically millimetres).
/// A `Sample` is only produced by [`crate::codec::decode`] on the receive path and
/// is copied by value in and out of the [`crate::SampleStore`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Sample {
    /// Device identifier (one byte on the wire)
    pub id: u8,

    /// Pan angle in degrees
    pub pan: f64,
    /// Tilt angle in degrees
    pub tilt: f64,
    /// Roll angle in degrees
    pub roll: f64,

    pub x: f64,
    pub y: f64,
    /// Height
    pub z: f64,

    /// Raw zoom encoder value (unsigned 24-bit)
    pub zoom: u32,
    /// Raw focus encoder value (unsigned 24-bit)
    pub focus: u32,

    /// Spare / user-defined bytes, passed through untouched
    pub spare: [u8; 2],
}

impl Sample {
    /// Create a sample for `id` with every other field zeroed.
    pub fn new(id: u8) -> Self {
        Self { id, ..Self::default() }
    }
}
