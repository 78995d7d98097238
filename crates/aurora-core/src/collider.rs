//! Collider markers and bounding volume derivation
//!
//! A marker is an authored node that only describes a bounding volume for
//! the nearest exportable ancestor (its owner). Markers are flagged either
//! with the `ae_collider` attribute or by a name prefix.

use glam::{DMat3, DMat4, DVec3};

use crate::attributes::{AttributeBag, NodeAttribute};
use crate::basis::BasisConverter;
use crate::codec::{TransformCodec, is_uniform_scale};
use crate::document::{BoundingBox, BoundingFrustum, BoundingOrientedBox, ColliderComponent};
use crate::scene::{AuthoredScene, LocalBounds, NodeId, SceneNode};

/// Bounding volume subtype of a marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColliderKind {
    Box,
    OrientedBox,
    Frustum,
}

/// Name prefixes that mark a node as a collider (compared case-insensitively)
pub const COLLIDER_PREFIXES: [(ColliderKind, &str); 3] = [
    (ColliderKind::Box, "COL_BOX_"),
    (ColliderKind::OrientedBox, "COL_OBB_"),
    (ColliderKind::Frustum, "COL_FRUSTUM_"),
];

impl ColliderKind {
    /// Parse the `ae_collider_type` attribute value
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "box" | "aabb" => Some(ColliderKind::Box),
            "obb" | "oriented_box" | "orientedbox" => Some(ColliderKind::OrientedBox),
            "frustum" => Some(ColliderKind::Frustum),
            _ => None,
        }
    }

    /// Subtype implied by a name prefix
    pub fn from_name_prefix(name: &str) -> Option<Self> {
        let upper = name.to_uppercase();
        COLLIDER_PREFIXES
            .iter()
            .find(|(_, prefix)| upper.starts_with(prefix))
            .map(|(kind, _)| *kind)
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            ColliderKind::Box => "box",
            ColliderKind::OrientedBox => "obb",
            ColliderKind::Frustum => "frustum",
        }
    }
}

/// True if the node is a collider marker (explicit attribute or name prefix)
pub fn is_collider_marker(node: &SceneNode) -> bool {
    node.attributes
        .get_bool(NodeAttribute::Collider.key())
        .unwrap_or(false)
        || ColliderKind::from_name_prefix(&node.name).is_some()
}

/// Resolve a marker's subtype. An explicit `ae_collider_type` wins over the
/// name prefix, even when its value is not recognized.
pub fn collider_kind(node: &SceneNode) -> Option<ColliderKind> {
    match node
        .attributes
        .get_string(NodeAttribute::ColliderType.key())
    {
        Some(value) => ColliderKind::parse(&value),
        None => ColliderKind::from_name_prefix(&node.name),
    }
}

/// Frustum shape parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrustumParams {
    pub right_slope: f64,
    pub left_slope: f64,
    pub top_slope: f64,
    pub bottom_slope: f64,
    pub near: f64,
    pub far: f64,
}

impl Default for FrustumParams {
    fn default() -> Self {
        Self {
            right_slope: 1.0,
            left_slope: -1.0,
            top_slope: 1.0,
            bottom_slope: -1.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl FrustumParams {
    pub fn from_attributes(attributes: &AttributeBag) -> Self {
        let d = Self::default();
        Self {
            right_slope: attributes.f64_or(NodeAttribute::RightSlope.key(), d.right_slope),
            left_slope: attributes.f64_or(NodeAttribute::LeftSlope.key(), d.left_slope),
            top_slope: attributes.f64_or(NodeAttribute::TopSlope.key(), d.top_slope),
            bottom_slope: attributes.f64_or(NodeAttribute::BottomSlope.key(), d.bottom_slope),
            near: attributes.f64_or(NodeAttribute::Near.key(), d.near),
            far: attributes.f64_or(NodeAttribute::Far.key(), d.far),
        }
    }
}

/// Builds collider components for owners from their markers
pub struct ColliderBuilder<'a> {
    scene: &'a AuthoredScene,
    basis: &'a BasisConverter,
}

impl<'a> ColliderBuilder<'a> {
    pub fn new(scene: &'a AuthoredScene, basis: &'a BasisConverter) -> Self {
        Self { scene, basis }
    }

    /// Build the collider component of `owner`. Returns `None` when no marker
    /// contributes a volume.
    pub fn build(&self, owner: NodeId, markers: &[NodeId]) -> Option<ColliderComponent> {
        if markers.is_empty() {
            return None;
        }

        let owner_world = self.scene.world_matrix(owner);
        let owner_world_inv = owner_world.inverse();
        if owner_world.determinant() == 0.0 || !owner_world_inv.is_finite() {
            tracing::warn!(
                "Owner '{}' has a singular transform, skipping its colliders",
                self.scene[owner].name
            );
            return None;
        }

        let mut component = ColliderComponent::default();

        for &marker in markers {
            self.add_marker(&mut component, owner_world_inv, marker);
        }

        if component.is_empty() {
            tracing::debug!(
                "No collider volumes resolved for '{}'",
                self.scene[owner].name
            );
            return None;
        }

        Some(component)
    }

    fn add_marker(&self, component: &mut ColliderComponent, owner_world_inv: DMat4, marker: NodeId) {
        let node = &self.scene[marker];

        let Some(kind) = collider_kind(node) else {
            tracing::warn!("Collider '{}' has no recognized subtype, skipping", node.name);
            return;
        };

        let relative = owner_world_inv * self.scene.world_matrix(marker);
        let relative_engine = self.basis.to_engine(relative);
        let decomposed = TransformCodec::decompose(relative_engine);

        let bounds = self.engine_local_bounds(node);
        if bounds.is_degenerate() {
            tracing::warn!("Collider '{}' has degenerate bounds", node.name);
        }

        let scale = decomposed.scale3();
        let extents = (bounds.extents * scale.abs()).to_array();
        let center = relative_engine.transform_point3(bounds.center).to_array();

        match kind {
            ColliderKind::Box => {
                if !is_uniform_scale(scale) {
                    tracing::warn!(
                        "Box collider '{}' has non-uniform scale {:?}",
                        node.name,
                        scale
                    );
                }
                component.bounding_boxes.push(BoundingBox { center, extents });
            }
            ColliderKind::OrientedBox => {
                component.bounding_oriented_boxes.push(BoundingOrientedBox {
                    center,
                    extents,
                    orientation: decomposed.rotation,
                });
            }
            ColliderKind::Frustum => {
                let params = FrustumParams::from_attributes(&node.attributes);
                let p = decomposed.position;
                component.bounding_frustums.push(BoundingFrustum {
                    origin: [p[0], p[1], p[2]],
                    orientation: decomposed.rotation,
                    right_slope: params.right_slope,
                    left_slope: params.left_slope,
                    top_slope: params.top_slope,
                    bottom_slope: params.bottom_slope,
                    near: params.near,
                    far: params.far,
                });
            }
        }
    }

    /// Marker bounds expressed along engine axes; unit box without geometry
    fn engine_local_bounds(&self, node: &SceneNode) -> LocalBounds {
        let bounds = node.local_bounds().unwrap_or(LocalBounds::UNIT);
        let basis = DMat3::from_mat4(self.basis.matrix());
        let abs_basis = DMat3::from_cols(basis.x_axis.abs(), basis.y_axis.abs(), basis.z_axis.abs());
        LocalBounds {
            center: basis * bounds.center,
            extents: abs_basis * bounds.extents,
        }
    }
}

/// Volume count helper for logging
pub fn describe(component: &ColliderComponent) -> String {
    format!(
        "{} box, {} obb, {} frustum",
        component.bounding_boxes.len(),
        component.bounding_oriented_boxes.len(),
        component.bounding_frustums.len()
    )
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use glam::DQuat;

    use super::*;
    use crate::attributes::AttributeValue;
    use crate::scene::MeshData;

    fn cube(half: f32) -> MeshData {
        MeshData {
            vertices: vec![[-half, -half, -half], [half, half, half], [half, -half, half]],
            indices: vec![0, 1, 2],
            materials: Vec::new(),
        }
    }

    #[test]
    fn test_marker_detection() {
        assert!(is_collider_marker(&SceneNode::new("COL_BOX_Wall")));
        assert!(is_collider_marker(&SceneNode::new("col_obb_door")));
        assert!(!is_collider_marker(&SceneNode::new("Wall")));

        let flagged = SceneNode::new("Trigger")
            .with_attributes(AttributeBag::new().with("ae_collider", AttributeValue::Bool(true)));
        assert!(is_collider_marker(&flagged));
        assert_eq!(collider_kind(&flagged), None);
    }

    #[test]
    fn test_explicit_type_wins_over_prefix() {
        let node = SceneNode::new("COL_BOX_Cam").with_attributes(
            AttributeBag::new().with("ae_collider_type", AttributeValue::Text("Frustum".into())),
        );
        assert_eq!(collider_kind(&node), Some(ColliderKind::Frustum));

        let unknown = SceneNode::new("COL_BOX_Ball").with_attributes(
            AttributeBag::new().with("ae_collider_type", AttributeValue::Text("sphere".into())),
        );
        assert_eq!(collider_kind(&unknown), None);
    }

    #[test]
    fn test_box_from_translated_unit_cube() {
        let mut scene = AuthoredScene::new("test");
        let owner = scene.add_node(SceneNode::mesh("Wall", cube(1.0)));
        let marker = scene
            .add_child(
                owner,
                SceneNode::mesh("COL_BOX_Wall", cube(1.0)).with_translation(DVec3::new(0.0, 1.0, 0.0)),
            )
            .unwrap();

        let basis = BasisConverter::default();
        let component = ColliderBuilder::new(&scene, &basis).build(owner, &[marker]).unwrap();

        assert_eq!(component.bounding_boxes.len(), 1);
        let b = &component.bounding_boxes[0];
        assert_abs_diff_eq!(b.center[0], 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(b.center[1], 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(b.center[2], 1.0, epsilon = 1e-9);
        assert_eq!(b.extents, [1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_negative_scale_still_enlarges_box() {
        let mut scene = AuthoredScene::new("test");
        let owner = scene.add_node(SceneNode::new("Owner"));
        let marker = scene
            .add_child(
                owner,
                SceneNode::new("COL_BOX_Flip").with_matrix(DMat4::from_scale(DVec3::new(-2.0, 2.0, 2.0))),
            )
            .unwrap();

        let basis = BasisConverter::default();
        let component = ColliderBuilder::new(&scene, &basis).build(owner, &[marker]).unwrap();
        for e in component.bounding_boxes[0].extents {
            assert_abs_diff_eq!(e, 2.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_extents_follow_engine_axes() {
        let mut scene = AuthoredScene::new("test");
        let owner = scene.add_node(SceneNode::new("Owner"));
        let tall = MeshData {
            vertices: vec![[-1.0, -1.0, -3.0], [1.0, 1.0, 3.0]],
            indices: vec![0, 1, 0],
            materials: Vec::new(),
        };
        let marker = scene
            .add_child(owner, SceneNode::mesh("COL_OBB_Pillar", tall))
            .unwrap();

        let basis = BasisConverter::default();
        let component = ColliderBuilder::new(&scene, &basis).build(owner, &[marker]).unwrap();
        let obb = &component.bounding_oriented_boxes[0];
        // Authored Z (up) becomes engine Y
        assert_abs_diff_eq!(obb.extents[1], 3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(obb.extents[2], 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(obb.orientation[3].abs(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_frustum_defaults_and_overrides() {
        let mut scene = AuthoredScene::new("test");
        let owner = scene.add_node(SceneNode::new("Camera"));
        let marker = scene
            .add_child(
                owner,
                SceneNode::new("COL_FRUSTUM_View")
                    .with_matrix(DMat4::from_rotation_translation(
                        DQuat::from_rotation_z(0.5),
                        DVec3::new(1.0, 2.0, 3.0),
                    ))
                    .with_attributes(AttributeBag::new().with("ae_far", AttributeValue::Int(50))),
            )
            .unwrap();

        let basis = BasisConverter::default();
        let component = ColliderBuilder::new(&scene, &basis).build(owner, &[marker]).unwrap();
        let f = &component.bounding_frustums[0];
        assert_abs_diff_eq!(f.origin[0], 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(f.origin[1], 3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(f.origin[2], 2.0, epsilon = 1e-9);
        assert_eq!(f.near, 0.1);
        assert_eq!(f.far, 50.0);
        assert_eq!(f.left_slope, -1.0);
    }

    #[test]
    fn test_unresolved_markers_yield_none() {
        let mut scene = AuthoredScene::new("test");
        let owner = scene.add_node(SceneNode::new("Owner"));
        let marker = scene
            .add_child(
                owner,
                SceneNode::new("Blocker").with_attributes(
                    AttributeBag::new().with("ae_collider", AttributeValue::Bool(true)),
                ),
            )
            .unwrap();

        let basis = BasisConverter::default();
        let builder = ColliderBuilder::new(&scene, &basis);
        assert!(builder.build(owner, &[marker]).is_none());
        assert!(builder.build(owner, &[]).is_none());
    }

    #[test]
    fn test_singular_owner_skips_colliders() {
        let mut scene = AuthoredScene::new("test");
        let owner = scene.add_node(
            SceneNode::new("Collapsed").with_matrix(DMat4::from_scale(DVec3::new(0.0, 1.0, 1.0))),
        );
        let marker = scene.add_child(owner, SceneNode::new("COL_BOX_C")).unwrap();

        let basis = BasisConverter::default();
        assert!(ColliderBuilder::new(&scene, &basis).build(owner, &[marker]).is_none());
    }

    #[test]
    fn test_flat_marker_gives_finite_box() {
        let mut scene = AuthoredScene::new("test");
        let owner = scene.add_node(SceneNode::new("Floor"));
        let marker = scene
            .add_child(
                owner,
                SceneNode::new("COL_OBB_Flat").with_matrix(DMat4::from_scale(DVec3::new(2.0, 2.0, 0.0))),
            )
            .unwrap();

        let basis = BasisConverter::default();
        let component = ColliderBuilder::new(&scene, &basis).build(owner, &[marker]).unwrap();
        let obb = &component.bounding_oriented_boxes[0];
        assert!(obb.center.iter().chain(&obb.extents).chain(&obb.orientation).all(|v| v.is_finite()));
        assert_eq!(obb.orientation, [0.0, 0.0, 0.0, 1.0]);
        assert_abs_diff_eq!(obb.extents[1], 0.0, epsilon = 1e-12);
    }
}
