//! End-to-end export of one authored scene

use std::path::{Path, PathBuf};

use aurora_core::{
    AssetNamer, AuthoredScene, BasisError, ExportError, ModelPaths, SceneDocument,
    SceneGraphWalker, SceneSerializer, TraversalReport, sanitize_name,
};

use crate::config::{ConfigError, ExportConfig};
use crate::snapshot::SnapshotError;
use crate::stl::StlMeshExporter;
use crate::textures::{TextureCollector, TextureReport};

/// Errors that abort an export run
#[derive(Debug, Clone, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("Invalid axis configuration: {0}")]
    Basis(#[from] BasisError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

/// Outcome of a successful export
#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub scene_name: String,
    pub document_path: PathBuf,
    pub model_dir: PathBuf,
    pub object_count: usize,
    pub traversal: TraversalReport,
    pub textures: Option<TextureReport>,
}

/// Scene name used in output paths: the configured one, else the snapshot's
pub fn resolve_scene_name(config: &ExportConfig, scene: &AuthoredScene) -> String {
    let name = if config.paths.scene_name.is_empty() {
        &scene.name
    } else {
        &config.paths.scene_name
    };
    sanitize_name(name)
}

fn ensure_dir(path: &Path) -> Result<(), ExportError> {
    std::fs::create_dir_all(path).map_err(|e| ExportError::create_directory(path, e))
}

/// Export `scene` according to `config`.
///
/// Relative texture paths resolve against `source_root` (normally the
/// snapshot's directory). Directory creation and document writing failures
/// abort the run; per-node and per-texture problems are logged and skipped.
pub fn run_export(
    scene: &AuthoredScene,
    config: &ExportConfig,
    source_root: &Path,
) -> Result<ExportSummary, PipelineError> {
    let basis = config.axes.basis()?;
    let scene_name = resolve_scene_name(config, scene);

    let paths = ModelPaths::new(
        config.paths.model_output_dir(&scene_name),
        config.paths.model_root(),
    );
    let document_path = config.paths.scene_document_path(&scene_name);
    let texture_dir = config.paths.texture_output_dir(&scene_name);

    ensure_dir(&paths.model_dir)?;
    if let Some(parent) = document_path.parent() {
        ensure_dir(parent)?;
    }
    if config.scene.collect_textures {
        ensure_dir(&texture_dir)?;
    }

    let roots = scene.root_nodes();
    let walker = SceneGraphWalker::new(scene, basis);
    let mut namer = AssetNamer::new();
    let mut exporter = StlMeshExporter::new(basis);
    let traversal = walker.traverse(&roots, &mut namer, &mut exporter, &paths);

    tracing::info!(
        "Exported {} meshes ({} skipped, {} failed), {} collider volumes, {} orphan colliders",
        traversal.report.exported_meshes,
        traversal.report.skipped_meshes,
        traversal.report.failed_meshes,
        traversal.report.collider_volumes,
        traversal.report.orphan_markers
    );

    let textures = if config.scene.collect_textures {
        let mut collector = TextureCollector::new(source_root, &texture_dir);
        let report = collector
            .collect(scene, traversal.exported.iter().copied())
            .clone();
        if report.placed() > 0 {
            tracing::info!("Moved {} textures to {:?}", report.placed(), texture_dir);
        }
        Some(report)
    } else {
        None
    };

    let settings = config.scene.settings_for(&scene.attributes);
    let document = SceneDocument::new(&settings, traversal.records);
    SceneSerializer::write(&document, &document_path)?;

    tracing::info!("Aurora export done: {:?}", document_path);
    Ok(ExportSummary {
        scene_name,
        document_path,
        model_dir: paths.model_dir,
        object_count: document.object_count(),
        traversal: traversal.report,
        textures,
    })
}
