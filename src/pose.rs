//! Sample to transform conversion
//!
//! Pan, tilt and roll are treated as yaw (about Z), pitch (about Y) and roll
//! (about X). The consumer's world frame uses the opposite rotation sense, so the
//! exposed orientation is the conjugate of that quaternion. No renormalisation
//! is applied.

use glam::{DQuat, DVec3};

use crate::types::{Sample, Transform};

/// Wire position units per scene unit (millimetres to centimetres).
pub const POSITION_DIVISOR: f64 = 10.0;

/// Convert a decoded sample into a consumer-facing [`Transform`].
pub fn convert(sample: &Sample) -> Transform {
    let position = DVec3::new(sample.x, sample.y, sample.z) / POSITION_DIVISOR;

    let orientation = quat_from_euler(
        sample.pan.to_radians(),
        sample.tilt.to_radians(),
        sample.roll.to_radians(),
    )
    .conjugate();

    Transform::new(position, orientation)
}

/// Half-angle Euler composition, equal to `Rz(yaw) * Ry(pitch) * Rx(roll)` (radians).
pub fn quat_from_euler(yaw: f64, pitch: f64, roll: f64) -> DQuat {
    let (sin_yaw, cos_yaw) = (yaw / 2.0).sin_cos();
    let (sin_pitch, cos_pitch) = (pitch / 2.0).sin_cos();
    let (sin_roll, cos_roll) = (roll / 2.0).sin_cos();

    DQuat::from_xyzw(
        sin_roll * cos_pitch * cos_yaw - cos_roll * sin_pitch * sin_yaw,
        cos_roll * sin_pitch * cos_yaw + sin_roll * cos_pitch * sin_yaw,
        cos_roll * cos_pitch * sin_yaw - sin_roll * sin_pitch * cos_yaw,
        cos_roll * cos_pitch * cos_yaw + sin_roll * sin_pitch * sin_yaw,
    )
}

impl From<&Sample> for Transform {
    fn from(sample: &Sample) -> Self {
        convert(sample)
    }
}
