//! STL mesh exporter

use std::path::{Path, PathBuf};

use aurora_core::{AuthoredScene, BasisConverter, ExportError, MeshExporter, NodeId};
use glam::Vec3;

/// Writes mesh nodes as binary STL in engine space.
///
/// Vertices stay in node-local coordinates (the node transform is carried by
/// the scene document) but are converted to engine axes. When the basis is a
/// reflection the triangle winding is reversed so faces keep pointing out.
#[derive(Debug, Clone)]
pub struct StlMeshExporter {
    basis: BasisConverter,
    written: Vec<PathBuf>,
}

impl StlMeshExporter {
    pub fn new(basis: BasisConverter) -> Self {
        Self {
            basis,
            written: Vec::new(),
        }
    }

    /// Files written so far
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn triangles(&self, scene: &AuthoredScene, node: NodeId) -> Result<Vec<stl_io::Triangle>, String> {
        let mesh = scene[node]
            .mesh
            .as_ref()
            .ok_or_else(|| "node has no mesh data".to_string())?;

        let vertices: Vec<Vec3> = mesh
            .vertices
            .iter()
            .map(|v| self.basis.transform_point(Vec3::from(*v).as_dvec3()).as_vec3())
            .collect();

        let flip = self.basis.is_reflection();
        let mut triangles = Vec::with_capacity(mesh.face_count());
        for chunk in mesh.indices.chunks_exact(3) {
            let mut idx = [chunk[0] as usize, chunk[1] as usize, chunk[2] as usize];
            if flip {
                idx.swap(1, 2);
            }
            let [v0, v1, v2] = idx.map(|i| vertices.get(i).copied());
            let (Some(v0), Some(v1), Some(v2)) = (v0, v1, v2) else {
                return Err(format!("triangle index out of range ({:?})", chunk));
            };

            // Calculate normal from vertices
            let cross = (v1 - v0).cross(v2 - v0);
            let normal = if cross.length_squared() > 0.0 {
                cross.normalize()
            } else {
                Vec3::Y
            };

            triangles.push(stl_io::Triangle {
                normal: stl_io::Normal::new(normal.to_array()),
                vertices: [
                    stl_io::Vertex::new(v0.to_array()),
                    stl_io::Vertex::new(v1.to_array()),
                    stl_io::Vertex::new(v2.to_array()),
                ],
            });
        }

        Ok(triangles)
    }
}

impl MeshExporter for StlMeshExporter {
    fn file_extension(&self) -> &str {
        "stl"
    }

    fn export(
        &mut self,
        scene: &AuthoredScene,
        node: NodeId,
        destination: &Path,
    ) -> Result<PathBuf, ExportError> {
        let name = &scene[node].name;
        let mesh_error = |reason: String| ExportError::MeshExport {
            node: name.clone(),
            reason,
        };

        let triangles = self.triangles(scene, node).map_err(mesh_error)?;

        let mut file = std::fs::File::create(destination)
            .map_err(|e| mesh_error(format!("{}: {}", destination.display(), e)))?;
        stl_io::write_stl(&mut file, triangles.iter()).map_err(|e| mesh_error(e.to_string()))?;

        tracing::debug!(
            "Wrote {} triangles for '{}' to {:?}",
            triangles.len(),
            name,
            destination
        );
        self.written.push(destination.to_path_buf());
        Ok(destination.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use std::io::BufReader;

    use approx::assert_abs_diff_eq;
    use aurora_core::{MeshData, SceneNode};

    use super::*;

    fn quad_scene() -> (AuthoredScene, NodeId) {
        let mut scene = AuthoredScene::new("test");
        let id = scene.add_node(SceneNode::mesh(
            "Floor",
            MeshData {
                vertices: vec![
                    [0.0, 0.0, 0.0],
                    [1.0, 0.0, 0.0],
                    [1.0, 1.0, 0.0],
                    [0.0, 1.0, 0.0],
                ],
                indices: vec![0, 1, 2, 0, 2, 3],
                materials: Vec::new(),
            },
        ));
        (scene, id)
    }

    fn read_back(path: &Path) -> stl_io::IndexedMesh {
        let file = std::fs::File::open(path).unwrap();
        stl_io::read_stl(&mut BufReader::new(file)).unwrap()
    }

    #[test]
    fn test_writes_all_triangles() {
        let dir = tempfile::tempdir().unwrap();
        let (scene, id) = quad_scene();
        let mut exporter = StlMeshExporter::new(BasisConverter::default());

        let path = exporter.export(&scene, id, &dir.path().join("Floor.stl")).unwrap();
        let mesh = read_back(&path);
        assert_eq!(mesh.faces.len(), 2);
        assert_eq!(exporter.written(), &[path]);
    }

    #[test]
    fn test_up_facing_floor_stays_up_facing() {
        let dir = tempfile::tempdir().unwrap();
        let (scene, id) = quad_scene();
        let mut exporter = StlMeshExporter::new(BasisConverter::default());

        // Counter-clockwise in authoring space faces +Z, which is engine +Y
        let path = exporter.export(&scene, id, &dir.path().join("Floor.stl")).unwrap();
        let mesh = read_back(&path);
        for face in &mesh.faces {
            assert_abs_diff_eq!(face.normal[1], 1.0, epsilon = 1e-6);
        }
        for v in &mesh.vertices {
            assert_abs_diff_eq!(v[1], 0.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_missing_mesh_data_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut scene = AuthoredScene::new("test");
        let id = scene.add_node(SceneNode::new("Empty"));
        let mut exporter = StlMeshExporter::new(BasisConverter::default());

        let result = exporter.export(&scene, id, &dir.path().join("Empty.stl"));
        assert!(matches!(result, Err(ExportError::MeshExport { .. })));
        assert!(exporter.written().is_empty());
    }

    #[test]
    fn test_bad_index_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut scene = AuthoredScene::new("test");
        let id = scene.add_node(SceneNode::mesh(
            "Broken",
            MeshData {
                vertices: vec![[0.0, 0.0, 0.0]],
                indices: vec![0, 1, 2],
                materials: Vec::new(),
            },
        ));
        let mut exporter = StlMeshExporter::new(BasisConverter::default());
        assert!(exporter.export(&scene, id, &dir.path().join("Broken.stl")).is_err());
    }
}
