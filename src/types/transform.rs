//! Consumer-facing pose

use glam::{DQuat, DVec3};

/// Position + orientation delivered to a [`crate::Sink`].
///
/// Computed fresh on every publish tick and never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Position in scene units
    pub position: DVec3,
    /// Orientation in the consumer's world frame
    pub orientation: DQuat,
}

impl Transform {
    pub const IDENTITY: Self = Self { position: DVec3::ZERO, orientation: DQuat::IDENTITY };

    pub fn new(position: DVec3, orientation: DQuat) -> Self {
        Self { position, orientation }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}
