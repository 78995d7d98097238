//! Authored hierarchy traversal
//!
//! The walker visits the authored forest once to classify nodes and resolve
//! collider ownership, then builds the game object tree from the exportable
//! nodes only. Non-exportable nodes between two exportable ones are skipped
//! and the child's transform is taken relative to the exportable ancestor.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use crate::attributes::{DEFAULT_OBJECT_TYPE, ModelSettings, NodeAttribute};
use crate::basis::BasisConverter;
use crate::codec::TransformCodec;
use crate::collider::{ColliderBuilder, describe, is_collider_marker};
use crate::document::{Component, GameObjectRecord, ModelComponent};
use crate::exporter::{MeshExporter, model_reference};
use crate::naming::AssetNamer;
use crate::scene::{AuthoredScene, NodeId, NodeKind, SceneNode};

/// Default exportability rule: visible and not a collider marker
pub fn default_is_exportable(node: &SceneNode) -> bool {
    !node.hidden && !is_collider_marker(node)
}

/// Role of a visited node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    /// Becomes a game object
    Exportable,
    /// Contributes a bounding volume to its owner
    Marker,
    /// Neither (hidden, or rejected by the predicate)
    Skipped,
}

impl NodeRole {
    pub fn display_name(&self) -> &'static str {
        match self {
            NodeRole::Exportable => "export",
            NodeRole::Marker => "collider",
            NodeRole::Skipped => "skip",
        }
    }
}

/// Result of the classification pass
#[derive(Debug, Clone, Default)]
pub struct Classification {
    /// Visited nodes in depth-first authored order
    visited: Vec<(NodeId, NodeRole)>,
    roles: BTreeMap<NodeId, NodeRole>,
    /// Owner -> markers, markers in visit order
    owners: BTreeMap<NodeId, Vec<NodeId>>,
    /// Exportable node -> exportable descendants that become its children
    record_children: BTreeMap<NodeId, Vec<NodeId>>,
    output_roots: Vec<NodeId>,
    orphans: Vec<NodeId>,
}

impl Classification {
    pub fn role(&self, id: NodeId) -> Option<NodeRole> {
        self.roles.get(&id).copied()
    }

    /// Visited nodes with their roles, depth-first
    pub fn visited(&self) -> &[(NodeId, NodeRole)] {
        &self.visited
    }

    /// Markers owned by `owner`
    pub fn markers_of(&self, owner: NodeId) -> &[NodeId] {
        self.owners.get(&owner).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Owner of a marker, if it has one
    pub fn owner_of(&self, marker: NodeId) -> Option<NodeId> {
        self.owners
            .iter()
            .find(|(_, markers)| markers.contains(&marker))
            .map(|(owner, _)| *owner)
    }

    /// Exportable nodes without an exportable ancestor
    pub fn output_roots(&self) -> &[NodeId] {
        &self.output_roots
    }

    fn record_children(&self, id: NodeId) -> &[NodeId] {
        self.record_children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Markers without an exportable ancestor
    pub fn orphans(&self) -> &[NodeId] {
        &self.orphans
    }

    pub fn exportable_count(&self) -> usize {
        self.count(NodeRole::Exportable)
    }

    pub fn marker_count(&self) -> usize {
        self.count(NodeRole::Marker)
    }

    fn count(&self, role: NodeRole) -> usize {
        self.visited.iter().filter(|(_, r)| *r == role).count()
    }
}

/// Where model files go and what their references are relative to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPaths {
    /// Directory receiving the exported model files
    pub model_dir: PathBuf,
    /// Root the engine resolves model references against
    pub model_root: PathBuf,
}

impl ModelPaths {
    pub fn new(model_dir: impl Into<PathBuf>, model_root: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
            model_root: model_root.into(),
        }
    }
}

/// Counters collected during a traversal
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraversalReport {
    pub records: usize,
    pub exported_meshes: usize,
    /// Mesh nodes without faces
    pub skipped_meshes: usize,
    pub failed_meshes: usize,
    pub orphan_markers: usize,
    /// Total bounding volumes written
    pub collider_volumes: usize,
}

/// Output of [`SceneGraphWalker::traverse`]
#[derive(Debug, Clone, Default)]
pub struct Traversal {
    pub records: Vec<GameObjectRecord>,
    /// Nodes whose model file was written, in export order
    pub exported: Vec<NodeId>,
    pub report: TraversalReport,
}

type ExportPredicate<'a> = Box<dyn Fn(&SceneNode) -> bool + 'a>;

/// Builds the game object forest of an authored scene
pub struct SceneGraphWalker<'a> {
    scene: &'a AuthoredScene,
    basis: BasisConverter,
    is_exportable: ExportPredicate<'a>,
}

impl<'a> SceneGraphWalker<'a> {
    pub fn new(scene: &'a AuthoredScene, basis: BasisConverter) -> Self {
        Self {
            scene,
            basis,
            is_exportable: Box::new(default_is_exportable),
        }
    }

    /// Replace the exportability rule. Hidden nodes and collider markers are
    /// never exported regardless of the predicate.
    pub fn with_predicate(mut self, predicate: impl Fn(&SceneNode) -> bool + 'a) -> Self {
        self.is_exportable = Box::new(predicate);
        self
    }

    pub fn basis(&self) -> &BasisConverter {
        &self.basis
    }

    fn role_of(&self, node: &SceneNode) -> NodeRole {
        if node.hidden {
            NodeRole::Skipped
        } else if is_collider_marker(node) {
            NodeRole::Marker
        } else if (self.is_exportable)(node) {
            NodeRole::Exportable
        } else {
            NodeRole::Skipped
        }
    }

    /// Classify every node below `roots` and resolve marker ownership
    pub fn classify(&self, roots: &[NodeId]) -> Classification {
        let mut out = Classification::default();
        let mut seen = HashSet::new();
        for &root in roots {
            self.visit(root, None, &mut seen, &mut out);
        }
        out
    }

    fn visit(
        &self,
        id: NodeId,
        nearest: Option<NodeId>,
        seen: &mut HashSet<NodeId>,
        out: &mut Classification,
    ) {
        let Some(node) = self.scene.node(id) else {
            tracing::warn!("Node {:?} does not exist, skipping", id);
            return;
        };
        if !seen.insert(id) {
            return;
        }

        let role = self.role_of(node);
        out.visited.push((id, role));
        out.roles.insert(id, role);

        let mut nearest_for_children = nearest;
        match role {
            NodeRole::Exportable => {
                match nearest {
                    Some(parent) => out.record_children.entry(parent).or_default().push(id),
                    None => out.output_roots.push(id),
                }
                nearest_for_children = Some(id);
            }
            NodeRole::Marker => match nearest {
                Some(owner) => out.owners.entry(owner).or_default().push(id),
                None => {
                    tracing::debug!("Collider '{}' has no exportable owner, dropped", node.name);
                    out.orphans.push(id);
                }
            },
            NodeRole::Skipped => {}
        }

        for &child in &node.children {
            self.visit(child, nearest_for_children, seen, out);
        }
    }

    /// Build the game object forest below `roots`.
    ///
    /// Mesh nodes with faces are handed to `exporter` in depth-first order;
    /// identifiers come from `namer`, so the same input always yields the same
    /// file names.
    pub fn traverse<E: MeshExporter + ?Sized>(
        &self,
        roots: &[NodeId],
        namer: &mut AssetNamer,
        exporter: &mut E,
        paths: &ModelPaths,
    ) -> Traversal {
        let classification = self.classify(roots);

        let mut pass = Pass {
            walker: self,
            classification: &classification,
            colliders: ColliderBuilder::new(self.scene, &self.basis),
            namer,
            exporter,
            paths,
            exported: Vec::new(),
            report: TraversalReport {
                orphan_markers: classification.orphans().len(),
                ..Default::default()
            },
        };

        let records = classification
            .output_roots()
            .iter()
            .map(|&root| pass.build_record(root, None))
            .collect();

        Traversal {
            records,
            exported: pass.exported,
            report: pass.report,
        }
    }
}

/// State of one traverse call
struct Pass<'p, 'a, E: ?Sized> {
    walker: &'p SceneGraphWalker<'a>,
    classification: &'p Classification,
    colliders: ColliderBuilder<'p>,
    namer: &'p mut AssetNamer,
    exporter: &'p mut E,
    paths: &'p ModelPaths,
    exported: Vec<NodeId>,
    report: TraversalReport,
}

impl<E: MeshExporter + ?Sized> Pass<'_, '_, E> {
    fn build_record(&mut self, id: NodeId, parent: Option<NodeId>) -> GameObjectRecord {
        let scene = self.walker.scene;
        let node = &scene[id];

        let local = scene.relative_matrix(parent, id);
        let transform = TransformCodec::encode(&self.walker.basis, local);
        let object_type = node
            .attributes
            .string_or(NodeAttribute::ObjectType.key(), DEFAULT_OBJECT_TYPE);

        let mut record = GameObjectRecord::new(&node.name, object_type, transform);
        self.report.records += 1;

        if node.kind == NodeKind::Mesh {
            if node.has_geometry() {
                if let Some(model) = self.export_model(id, node) {
                    record.components.push(Component::ModelComponent(model));
                }
            } else {
                tracing::warn!("Skip empty mesh: {}", node.name);
                self.report.skipped_meshes += 1;
            }
        }

        let markers = self.classification.markers_of(id);
        if let Some(collider) = self.colliders.build(id, markers) {
            tracing::debug!("Collider for '{}': {}", node.name, describe(&collider));
            self.report.collider_volumes += collider.len();
            record.components.push(Component::ColliderComponent(collider));
        }

        let children = self.classification.record_children(id).to_vec();
        for child in children {
            let child_record = self.build_record(child, Some(id));
            record.children.push(child_record);
        }

        record
    }

    fn export_model(&mut self, id: NodeId, node: &SceneNode) -> Option<ModelComponent> {
        let file_name = self
            .namer
            .assign_file(&node.name, self.exporter.file_extension());
        let destination = self.paths.model_dir.join(&file_name);

        match self.exporter.export(self.walker.scene, id, &destination) {
            Ok(written) => {
                let reference = model_reference(&written, &self.paths.model_root);
                tracing::debug!("Exported '{}' -> {}", node.name, reference);
                self.report.exported_meshes += 1;
                self.exported.push(id);
                let settings = ModelSettings::from_attributes(&node.attributes);
                Some(ModelComponent::new(reference, &settings))
            }
            Err(e) => {
                tracing::warn!("Failed to export mesh '{}': {}", node.name, e);
                self.report.failed_meshes += 1;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use glam::DVec3;

    use super::*;
    use crate::attributes::{AttributeBag, AttributeValue};
    use crate::error::ExportError;
    use crate::scene::MeshData;

    #[derive(Default)]
    struct RecordingExporter {
        written: Vec<PathBuf>,
        fail_on: Option<String>,
    }

    impl MeshExporter for RecordingExporter {
        fn file_extension(&self) -> &str {
            "stl"
        }

        fn export(
            &mut self,
            scene: &AuthoredScene,
            node: NodeId,
            destination: &Path,
        ) -> Result<PathBuf, ExportError> {
            if self.fail_on.as_deref() == Some(scene[node].name.as_str()) {
                return Err(ExportError::MeshExport {
                    node: scene[node].name.clone(),
                    reason: "disk full".to_string(),
                });
            }
            self.written.push(destination.to_path_buf());
            Ok(destination.to_path_buf())
        }
    }

    fn triangle() -> MeshData {
        MeshData {
            vertices: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            indices: vec![0, 1, 2],
            materials: Vec::new(),
        }
    }

    fn paths() -> ModelPaths {
        ModelPaths::new("/project/Model/Level", "/project/Model")
    }

    fn run(scene: &AuthoredScene, exporter: &mut RecordingExporter) -> Traversal {
        let mut namer = AssetNamer::new();
        SceneGraphWalker::new(scene, BasisConverter::default()).traverse(
            &scene.root_nodes(),
            &mut namer,
            exporter,
            &paths(),
        )
    }

    #[test]
    fn test_marker_owned_by_nearest_exportable_ancestor() {
        let mut scene = AuthoredScene::new("test");
        let building = scene.add_node(SceneNode::new("Building"));
        let hidden = scene
            .add_child(building, SceneNode::new("Group").with_hidden(true))
            .unwrap();
        let inner = scene.add_child(hidden, SceneNode::new("Inner").with_hidden(true)).unwrap();
        let marker = scene.add_child(inner, SceneNode::new("COL_BOX_Building")).unwrap();

        let walker = SceneGraphWalker::new(&scene, BasisConverter::default());
        let classification = walker.classify(&scene.root_nodes());

        assert_eq!(classification.owner_of(marker), Some(building));
        assert_eq!(classification.markers_of(building), &[marker]);
        assert_eq!(classification.role(hidden), Some(NodeRole::Skipped));
    }

    #[test]
    fn test_orphan_marker_is_dropped() {
        let mut scene = AuthoredScene::new("test");
        let marker = scene.add_node(SceneNode::new("COL_OBB_Floating"));
        scene.add_node(SceneNode::mesh("Floor", triangle()));

        let mut exporter = RecordingExporter::default();
        let traversal = run(&scene, &mut exporter);

        assert_eq!(traversal.records.len(), 1);
        assert_eq!(traversal.report.orphan_markers, 1);
        assert!(traversal.records[0].collider().is_none());
        let walker = SceneGraphWalker::new(&scene, BasisConverter::default());
        assert_eq!(walker.classify(&scene.root_nodes()).orphans(), &[marker]);
    }

    #[test]
    fn test_child_transform_skips_hidden_intermediate() {
        let mut scene = AuthoredScene::new("test");
        let root = scene.add_node(SceneNode::new("Root").with_translation(DVec3::new(5.0, 0.0, 0.0)));
        let hidden = scene
            .add_child(
                root,
                SceneNode::new("Pivot")
                    .with_hidden(true)
                    .with_translation(DVec3::new(0.0, 0.0, 2.0)),
            )
            .unwrap();
        scene
            .add_child(hidden, SceneNode::new("Lamp").with_translation(DVec3::new(0.0, 1.0, 0.0)))
            .unwrap();

        let mut exporter = RecordingExporter::default();
        let traversal = run(&scene, &mut exporter);

        assert_eq!(traversal.records.len(), 1);
        let lamp = &traversal.records[0].children[0];
        assert_eq!(lamp.name, "Lamp");
        // Authored (0, 1, 2) relative to Root, engine axes swap y and z
        assert_abs_diff_eq!(lamp.position[0], 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(lamp.position[1], 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(lamp.position[2], 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_exportable_under_hidden_root_becomes_root() {
        let mut scene = AuthoredScene::new("test");
        let hidden = scene.add_node(
            SceneNode::new("Disabled")
                .with_hidden(true)
                .with_matrix(glam::DMat4::from_scale_rotation_translation(
                    DVec3::splat(2.0),
                    glam::DQuat::IDENTITY,
                    DVec3::new(3.0, 0.0, 0.0),
                )),
        );
        scene
            .add_child(hidden, SceneNode::new("Survivor").with_translation(DVec3::new(0.0, 1.0, 0.0)))
            .unwrap();

        let mut exporter = RecordingExporter::default();
        let traversal = run(&scene, &mut exporter);
        assert_eq!(traversal.records.len(), 1);
        let survivor = &traversal.records[0];
        assert_eq!(survivor.name, "Survivor");

        // World position authored (3, 2, 0), engine (3, 0, 2)
        assert_abs_diff_eq!(survivor.position[0], 3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(survivor.position[1], 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(survivor.position[2], 2.0, epsilon = 1e-9);
        for s in &survivor.scale[..3] {
            assert_abs_diff_eq!(*s, 2.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_empty_mesh_keeps_record_without_model() {
        let mut scene = AuthoredScene::new("test");
        scene.add_node(SceneNode::mesh("Ghost", MeshData::default()));

        let mut exporter = RecordingExporter::default();
        let traversal = run(&scene, &mut exporter);

        assert_eq!(traversal.records.len(), 1);
        assert!(traversal.records[0].components.is_empty());
        assert_eq!(traversal.report.skipped_meshes, 1);
        assert!(exporter.written.is_empty());
    }

    #[test]
    fn test_failed_export_omits_model_component() {
        let mut scene = AuthoredScene::new("test");
        scene.add_node(SceneNode::mesh("Broken", triangle()));
        let fine = scene.add_node(SceneNode::mesh("Fine", triangle()));

        let mut exporter = RecordingExporter {
            fail_on: Some("Broken".to_string()),
            ..Default::default()
        };
        let traversal = run(&scene, &mut exporter);

        assert!(traversal.records[0].model().is_none());
        assert_eq!(
            traversal.records[1].model().map(|m| m.model_file_name.as_str()),
            Some("Level/Fine.stl")
        );
        assert_eq!(traversal.report.failed_meshes, 1);
        assert_eq!(traversal.report.exported_meshes, 1);
        assert_eq!(traversal.exported, [fine]);
    }

    #[test]
    fn test_object_type_and_shader_overrides() {
        let mut scene = AuthoredScene::new("test");
        scene.add_node(SceneNode::mesh("Door", triangle()).with_attributes(
            AttributeBag::new()
                .with("ae_type", AttributeValue::Text("DoorObject".into()))
                .with("ae_ps", AttributeValue::Text("PSDoor.hlsl".into()))
                .with("ae_blend", AttributeValue::Int(2)),
        ));

        let mut exporter = RecordingExporter::default();
        let traversal = run(&scene, &mut exporter);

        let door = &traversal.records[0];
        assert_eq!(door.object_type, "DoorObject");
        let model = door.model().unwrap();
        assert_eq!(model.ps_shader_name, "PSDoor.hlsl");
        assert_eq!(model.vs_shader_name, "VSModel.hlsl");
        assert_eq!(model.blend_state, 2);
        assert_eq!(model.raster_state, 1);
    }

    #[test]
    fn test_custom_predicate() {
        let mut scene = AuthoredScene::new("test");
        scene.add_node(SceneNode::new("Keep"));
        scene.add_node(SceneNode::new("Editor_Only"));

        let walker = SceneGraphWalker::new(&scene, BasisConverter::default())
            .with_predicate(|n| !n.name.starts_with("Editor_"));
        let mut namer = AssetNamer::new();
        let mut exporter = RecordingExporter::default();
        let traversal = walker.traverse(&scene.root_nodes(), &mut namer, &mut exporter, &paths());

        assert_eq!(traversal.records.len(), 1);
        assert_eq!(traversal.records[0].name, "Keep");
    }
}
