//! Mesh export collaborator

use std::path::{Path, PathBuf};

use crate::error::ExportError;
use crate::scene::{AuthoredScene, NodeId};

/// Writes the geometry of one mesh node to a file.
///
/// Called once per mesh-bearing node, synchronously. The returned path is the
/// file actually written, which the walker turns into the model reference.
pub trait MeshExporter {
    /// Extension of written files, without the dot
    fn file_extension(&self) -> &str;

    /// Export `node` to `destination` and return the written path
    fn export(
        &mut self,
        scene: &AuthoredScene,
        node: NodeId,
        destination: &Path,
    ) -> Result<PathBuf, ExportError>;
}

impl<E: MeshExporter + ?Sized> MeshExporter for &mut E {
    fn file_extension(&self) -> &str {
        (**self).file_extension()
    }

    fn export(
        &mut self,
        scene: &AuthoredScene,
        node: NodeId,
        destination: &Path,
    ) -> Result<PathBuf, ExportError> {
        (**self).export(scene, node, destination)
    }
}

/// Engine-relative model reference for a written file.
///
/// The path is made relative to `model_root` when it lies below it, otherwise
/// only the file name is kept. Separators are always forward slashes.
pub fn model_reference(written: &Path, model_root: &Path) -> String {
    let relative = match written.strip_prefix(model_root) {
        Ok(rel) => rel.to_path_buf(),
        Err(_) => written
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| written.to_path_buf()),
    };

    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
