//! Engine-space transform encoding

use glam::{DMat4, DQuat, DVec3};

use crate::basis::BasisConverter;
use crate::types::EngineTransform;

/// Relative tolerance used for the uniform-scale check
const UNIFORM_SCALE_EPSILON: f64 = 1e-6;

/// Splits engine-space matrices into position/rotation/scale records
#[derive(Debug, Clone, Copy, Default)]
pub struct TransformCodec;

impl TransformCodec {
    /// Decompose an engine-space matrix.
    ///
    /// The rotation is left in whichever hemisphere the decomposition yields;
    /// the engine treats q and -q as the same orientation. A singular matrix
    /// (zero scale on some axis) has no defined rotation and gets the identity.
    pub fn decompose(matrix: DMat4) -> EngineTransform {
        let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
        if rotation.is_finite() {
            return EngineTransform::new(translation, rotation, scale);
        }

        tracing::warn!("Singular transform with scale {:?}, using identity rotation", scale);
        EngineTransform::new(translation, DQuat::IDENTITY, scale)
    }

    /// Rebuild the matrix of a decomposed transform
    pub fn compose(transform: &EngineTransform) -> DMat4 {
        DMat4::from_scale_rotation_translation(
            transform.scale3(),
            transform.quat(),
            transform.translation(),
        )
    }

    /// Convert an authoring-space local matrix and decompose it
    pub fn encode(basis: &BasisConverter, local: DMat4) -> EngineTransform {
        Self::decompose(basis.to_engine(local))
    }

    /// Inverse of [`TransformCodec::encode`]
    pub fn decode(basis: &BasisConverter, transform: &EngineTransform) -> DMat4 {
        basis.from_engine(Self::compose(transform))
    }
}

/// True if all three scale components are equal within tolerance
pub fn is_uniform_scale(scale: DVec3) -> bool {
    let max = scale.abs().max_element();
    let min = scale.abs().min_element();
    max - min <= UNIFORM_SCALE_EPSILON * max.max(1.0)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use glam::DQuat;

    use super::*;
    use crate::types::{POSITION_PADDING, SCALE_PADDING};

    fn sample_matrices() -> Vec<DMat4> {
        vec![
            DMat4::IDENTITY,
            DMat4::from_translation(DVec3::new(0.0, 1.0, 0.0)),
            DMat4::from_scale_rotation_translation(
                DVec3::new(2.0, 0.5, 3.0),
                DQuat::from_euler(glam::EulerRot::XYZ, 0.3, -1.2, 2.5),
                DVec3::new(-4.0, 12.5, 0.25),
            ),
            DMat4::from_scale_rotation_translation(
                DVec3::splat(0.01),
                DQuat::from_axis_angle(DVec3::new(1.0, 1.0, 0.0).normalize(), 3.0),
                DVec3::new(250.0, -75.0, 10.0),
            ),
            DMat4::from_rotation_z(std::f64::consts::PI),
        ]
    }

    #[test]
    fn test_padding_components() {
        let t = TransformCodec::decompose(DMat4::from_translation(DVec3::new(1.0, 2.0, 3.0)));
        assert_eq!(t.position, [1.0, 2.0, 3.0, POSITION_PADDING]);
        assert_eq!(t.scale, [1.0, 1.0, 1.0, SCALE_PADDING]);
        assert_abs_diff_eq!(t.rotation[3].abs(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_round_trip_through_basis() {
        let basis = BasisConverter::default();
        for m in sample_matrices() {
            let encoded = TransformCodec::encode(&basis, m);
            let decoded = TransformCodec::decode(&basis, &encoded);
            assert!(decoded.abs_diff_eq(m, 1e-5), "{m:?} -> {decoded:?}");
        }
    }

    #[test]
    fn test_rotation_is_unit_quaternion() {
        let basis = BasisConverter::default();
        for m in sample_matrices() {
            let q = TransformCodec::encode(&basis, m).quat();
            assert_abs_diff_eq!(q.length(), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_translation_follows_basis() {
        let basis = BasisConverter::default();
        let t = TransformCodec::encode(&basis, DMat4::from_translation(DVec3::new(1.0, 2.0, 3.0)));
        assert_abs_diff_eq!(t.position[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(t.position[1], 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(t.position[2], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_scale_keeps_translation_and_scale() {
        let m = DMat4::from_scale_rotation_translation(
            DVec3::new(0.0, 2.0, 1.0),
            DQuat::from_rotation_y(0.7),
            DVec3::new(3.0, -1.0, 4.0),
        );
        let t = TransformCodec::decompose(m);

        assert_eq!(t.rotation, [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(t.position, [3.0, -1.0, 4.0, POSITION_PADDING]);
        assert_abs_diff_eq!(t.scale[0], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(t.scale[1], 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(t.scale[2], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_uniform_scale() {
        assert!(is_uniform_scale(DVec3::splat(2.0)));
        assert!(is_uniform_scale(DVec3::new(-1.0, 1.0, 1.0)));
        assert!(!is_uniform_scale(DVec3::new(1.0, 2.0, 1.0)));
    }
}
