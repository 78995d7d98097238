//! Texture relocation into the engine texture directory

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use aurora_core::{AuthoredScene, ExportError, NodeId, TextureRef};

/// File extensions treated as images when copying from disk
pub const IMAGE_EXTENSIONS: [&str; 8] = ["png", "jpg", "jpeg", "tga", "dds", "bmp", "tif", "tiff"];

/// What happened to one texture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    Copied,
    Unpacked,
    Missing,
    Unsupported,
}

/// Counters for one collection run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextureReport {
    pub copied: usize,
    pub unpacked: usize,
    pub missing: usize,
    pub unsupported: usize,
    pub failed: usize,
}

impl TextureReport {
    /// Number of files written to the target directory
    pub fn placed(&self) -> usize {
        self.copied + self.unpacked
    }
}

/// Copies or unpacks the textures of exported meshes.
///
/// Packed images are written from their embedded bytes, external images are
/// copied from disk (relative paths resolve against `source_root`). Each
/// image name is handled once per collector.
#[derive(Debug, Clone)]
pub struct TextureCollector {
    source_root: PathBuf,
    target_dir: PathBuf,
    processed: BTreeSet<String>,
    report: TextureReport,
}

impl TextureCollector {
    pub fn new(source_root: impl Into<PathBuf>, target_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            target_dir: target_dir.into(),
            processed: BTreeSet::new(),
            report: TextureReport::default(),
        }
    }

    /// Collect the textures referenced by the materials of `nodes`
    pub fn collect(
        &mut self,
        scene: &AuthoredScene,
        nodes: impl IntoIterator<Item = NodeId>,
    ) -> &TextureReport {
        for id in nodes {
            let Some(mesh) = scene.node(id).and_then(|n| n.mesh.as_ref()) else {
                continue;
            };
            for texture in mesh.materials.iter().flat_map(|m| &m.textures) {
                self.collect_one(texture);
            }
        }
        &self.report
    }

    pub fn report(&self) -> &TextureReport {
        &self.report
    }

    fn collect_one(&mut self, texture: &TextureRef) {
        if !self.processed.insert(texture.name.clone()) {
            return;
        }

        match self.place(texture) {
            Ok(Placement::Copied) => self.report.copied += 1,
            Ok(Placement::Unpacked) => self.report.unpacked += 1,
            Ok(Placement::Missing) => self.report.missing += 1,
            Ok(Placement::Unsupported) => self.report.unsupported += 1,
            Err(e) => {
                tracing::warn!("Texture save failed [{}]: {}", texture.name, e);
                self.report.failed += 1;
            }
        }
    }

    fn place(&self, texture: &TextureRef) -> Result<Placement, ExportError> {
        let file_name = texture.file_name();
        let destination = self.target_dir.join(&file_name);

        if let Some(bytes) = &texture.packed {
            std::fs::write(&destination, bytes)
                .map_err(|e| ExportError::Io(format!("{}: {}", destination.display(), e)))?;
            tracing::debug!("Unpacked texture {}", file_name);
            return Ok(Placement::Unpacked);
        }

        let Some(source) = texture.file_path.as_deref() else {
            tracing::warn!("Texture '{}' has no file and is not packed", texture.name);
            return Ok(Placement::Missing);
        };

        if !is_image_file(&file_name) {
            tracing::warn!("Texture '{}' is not a supported image: {}", texture.name, source);
            return Ok(Placement::Unsupported);
        }

        let source = self.resolve(source);
        if !source.is_file() {
            tracing::warn!("Missing texture file: {:?}", source);
            return Ok(Placement::Missing);
        }

        std::fs::copy(&source, &destination)
            .map_err(|e| ExportError::Io(format!("{}: {}", source.display(), e)))?;
        tracing::debug!("Copied texture {}", file_name);
        Ok(Placement::Copied)
    }

    fn resolve(&self, source: &str) -> PathBuf {
        let path = Path::new(source);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.source_root.join(path)
        }
    }
}

/// True if the file name has one of [`IMAGE_EXTENSIONS`]
pub fn is_image_file(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}
