//! World transform calculations for AuthoredScene

use glam::DMat4;

use super::{AuthoredScene, NodeId};

impl AuthoredScene {
    /// Get the world transform of a node
    pub fn world_matrix(&self, id: NodeId) -> DMat4 {
        // Build transform chain from node to root
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let Some(node) = self.node(node_id) else {
                break;
            };
            chain.push(node.local_matrix);
            current = node.parent;
        }

        // Apply transforms from root to node
        chain
            .into_iter()
            .rev()
            .fold(DMat4::IDENTITY, |acc, local| acc * local)
    }

    /// Transform of `id` relative to `ancestor` (world when `ancestor` is None)
    pub fn relative_matrix(&self, ancestor: Option<NodeId>, id: NodeId) -> DMat4 {
        match ancestor {
            Some(a) if self.node(id).and_then(|n| n.parent) == Some(a) => {
                self[id].local_matrix
            }
            Some(a) => self.world_matrix(a).inverse() * self.world_matrix(id),
            None => self.world_matrix(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::{DQuat, DVec3};

    use super::*;
    use crate::scene::SceneNode;

    #[test]
    fn test_world_matrix_composes_parent_first() {
        let mut scene = AuthoredScene::new("test");
        let root = scene.add_node(
            SceneNode::new("Root").with_matrix(DMat4::from_rotation_z(std::f64::consts::FRAC_PI_2)),
        );
        let child = scene
            .add_child(root, SceneNode::new("Child").with_translation(DVec3::X))
            .unwrap();

        let world = scene.world_matrix(child);
        let origin = world.transform_point3(DVec3::ZERO);
        assert!(origin.abs_diff_eq(DVec3::Y, 1e-12));
    }

    #[test]
    fn test_relative_matrix_skips_intermediate_nodes() {
        let mut scene = AuthoredScene::new("test");
        let root = scene.add_node(SceneNode::new("Root").with_translation(DVec3::new(5.0, 0.0, 0.0)));
        let mid = scene
            .add_child(
                root,
                SceneNode::new("Mid").with_matrix(DMat4::from_scale_rotation_translation(
                    DVec3::splat(2.0),
                    DQuat::IDENTITY,
                    DVec3::new(0.0, 1.0, 0.0),
                )),
            )
            .unwrap();
        let leaf = scene
            .add_child(mid, SceneNode::new("Leaf").with_translation(DVec3::new(0.0, 0.0, 1.0)))
            .unwrap();

        let relative = scene.relative_matrix(Some(root), leaf);
        let expected = scene[mid].local_matrix * scene[leaf].local_matrix;
        assert!(relative.abs_diff_eq(expected, 1e-12));
        assert_eq!(scene.relative_matrix(Some(mid), leaf), scene[leaf].local_matrix);
    }
}
