//! Change of basis between the authoring and engine conventions
//!
//! The authoring tool is right-handed with +Y forward and +Z up. The engine
//! loads meshes with -Z forward, +Y up and then converts to left-handed by
//! flipping Z. A pure axis remap cannot change handedness, so the basis is the
//! axis remap followed by a reflection of the Z axis.

use glam::{DMat3, DMat4, DVec3};
use serde::{Deserialize, Serialize};

use crate::error::BasisError;
use crate::types::Axis;

/// Reflection applied after the axis remap to switch handedness
pub const HANDEDNESS_FLIP: DMat4 = DMat4::from_cols(
    glam::DVec4::X,
    glam::DVec4::Y,
    glam::DVec4::NEG_Z,
    glam::DVec4::W,
);

/// Forward/up axis pair naming a coordinate convention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisConvention {
    pub forward: Axis,
    pub up: Axis,
}

impl AxisConvention {
    /// Authoring tool convention (+Y forward, +Z up)
    pub const AUTHORING: AxisConvention = AxisConvention {
        forward: Axis::Y,
        up: Axis::Z,
    };

    /// Engine mesh convention (-Z forward, +Y up)
    pub const ENGINE: AxisConvention = AxisConvention {
        forward: Axis::NegZ,
        up: Axis::Y,
    };

    pub fn new(forward: Axis, up: Axis) -> Self {
        Self { forward, up }
    }

    /// Right-handed frame (forward, up, forward x up) as matrix columns
    fn frame(&self) -> Result<DMat3, BasisError> {
        if self.forward.is_collinear(self.up) {
            return Err(BasisError::SameAxis {
                forward: self.forward.to_string(),
                up: self.up.to_string(),
            });
        }
        let forward = self.forward.unit();
        let up = self.up.unit();
        Ok(DMat3::from_cols(forward, up, forward.cross(up)))
    }
}

/// Change-of-basis matrix and its inverse
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BasisConverter {
    matrix: DMat4,
    inverse: DMat4,
}

impl Default for BasisConverter {
    fn default() -> Self {
        Self::from_matrix(HANDEDNESS_FLIP * axis_remap_unchecked())
    }
}

fn axis_remap_unchecked() -> DMat4 {
    // Y-forward/Z-up to -Z-forward/Y-up: x -> x, y -> -z, z -> y
    DMat4::from_cols(
        glam::DVec4::X,
        glam::DVec4::NEG_Z,
        glam::DVec4::Y,
        glam::DVec4::W,
    )
}

/// Build the basis for converting `from` axes to `to` axes, with the
/// handedness flip applied
pub fn compute_basis(
    from_forward: Axis,
    from_up: Axis,
    to_forward: Axis,
    to_up: Axis,
) -> Result<BasisConverter, BasisError> {
    BasisConverter::new(
        AxisConvention::new(from_forward, from_up),
        AxisConvention::new(to_forward, to_up),
        true,
    )
}

/// Proper rotation mapping the `from` frame onto the `to` frame
pub fn axis_remap(from: AxisConvention, to: AxisConvention) -> Result<DMat4, BasisError> {
    let from_frame = from.frame()?;
    let to_frame = to.frame()?;
    if from == to {
        return Ok(DMat4::IDENTITY);
    }
    // Frames are orthonormal, so the inverse is the transpose
    Ok(DMat4::from_mat3(to_frame * from_frame.transpose()))
}

impl BasisConverter {
    /// Build a converter; `flip_handedness` appends the Z reflection
    pub fn new(
        from: AxisConvention,
        to: AxisConvention,
        flip_handedness: bool,
    ) -> Result<Self, BasisError> {
        let remap = axis_remap(from, to)?;
        let matrix = if flip_handedness {
            HANDEDNESS_FLIP * remap
        } else {
            remap
        };
        Ok(Self::from_matrix(matrix))
    }

    /// Converter that leaves coordinates unchanged
    pub fn identity() -> Self {
        Self::from_matrix(DMat4::IDENTITY)
    }

    fn from_matrix(matrix: DMat4) -> Self {
        Self {
            matrix,
            inverse: matrix.inverse(),
        }
    }

    /// The change-of-basis matrix B
    pub fn matrix(&self) -> DMat4 {
        self.matrix
    }

    /// The inverse B⁻¹
    pub fn inverse(&self) -> DMat4 {
        self.inverse
    }

    /// Convert an authoring-space transform: B · M · B⁻¹
    pub fn to_engine(&self, local: DMat4) -> DMat4 {
        self.matrix * local * self.inverse
    }

    /// Convert an engine-space transform back: B⁻¹ · M · B
    pub fn from_engine(&self, engine: DMat4) -> DMat4 {
        self.inverse * engine * self.matrix
    }

    /// Convert an authoring-space point
    pub fn transform_point(&self, point: DVec3) -> DVec3 {
        self.matrix.transform_point3(point)
    }

    /// True if the basis mirrors geometry (triangle winding must be reversed)
    pub fn is_reflection(&self) -> bool {
        self.matrix.determinant() < 0.0
    }
}
