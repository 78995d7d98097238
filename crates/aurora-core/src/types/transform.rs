//! Engine transform record

use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};

/// Reserved fourth component of an engine position
pub const POSITION_PADDING: f64 = 0.0;
/// Reserved fourth component of an engine scale
pub const SCALE_PADDING: f64 = 1.0;

/// Engine-space position, rotation and scale in the engine's 4-wide layout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineTransform {
    /// `[x, y, z, 0.0]`
    pub position: [f64; 4],
    /// Quaternion `[x, y, z, w]`
    pub rotation: [f64; 4],
    /// `[x, y, z, 1.0]`
    pub scale: [f64; 4],
}

impl Default for EngineTransform {
    fn default() -> Self {
        Self::new(DVec3::ZERO, DQuat::IDENTITY, DVec3::ONE)
    }
}

impl EngineTransform {
    pub fn new(translation: DVec3, rotation: DQuat, scale: DVec3) -> Self {
        Self {
            position: [translation.x, translation.y, translation.z, POSITION_PADDING],
            rotation: [rotation.x, rotation.y, rotation.z, rotation.w],
            scale: [scale.x, scale.y, scale.z, SCALE_PADDING],
        }
    }

    /// Get position as DVec3
    pub fn translation(&self) -> DVec3 {
        DVec3::new(self.position[0], self.position[1], self.position[2])
    }

    /// Get rotation as DQuat
    pub fn quat(&self) -> DQuat {
        DQuat::from_xyzw(
            self.rotation[0],
            self.rotation[1],
            self.rotation[2],
            self.rotation[3],
        )
    }

    /// Get scale as DVec3
    pub fn scale3(&self) -> DVec3 {
        DVec3::new(self.scale[0], self.scale[1], self.scale[2])
    }
}
