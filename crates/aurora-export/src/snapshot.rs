//! Authored scene snapshot loading
//!
//! A snapshot is the serialized `AuthoredScene` captured from the authoring
//! tool. RON and JSON are accepted, chosen by file extension.

use std::path::Path;

use aurora_core::{AuthoredScene, SceneError};

/// Snapshot errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum SnapshotError {
    #[error("Failed to read snapshot '{path}': {reason}")]
    Io { path: String, reason: String },

    #[error("Unsupported snapshot format: {0} (expected .ron or .json)")]
    UnsupportedFormat(String),

    #[error("Failed to parse snapshot '{path}': {reason}")]
    Parse { path: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("Invalid scene hierarchy: {0}")]
    Scene(#[from] SceneError),
}

/// On-disk snapshot encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Ron,
    Json,
}

impl SnapshotFormat {
    /// Detect the format from the file extension
    pub fn from_path(path: &Path) -> Result<Self, SnapshotError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "ron" => Ok(SnapshotFormat::Ron),
            "json" => Ok(SnapshotFormat::Json),
            _ => Err(SnapshotError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Load and validate a snapshot.
///
/// Missing parent links are filled in from the children lists and an empty
/// scene name is replaced by the file stem.
pub fn load_snapshot(path: &Path) -> Result<AuthoredScene, SnapshotError> {
    let format = SnapshotFormat::from_path(path)?;
    let content = std::fs::read_to_string(path).map_err(|e| SnapshotError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let parse_error = |reason: String| SnapshotError::Parse {
        path: path.display().to_string(),
        reason,
    };
    let mut scene: AuthoredScene = match format {
        SnapshotFormat::Ron => ron::from_str(&content).map_err(|e| parse_error(e.to_string()))?,
        SnapshotFormat::Json => {
            serde_json::from_str(&content).map_err(|e| parse_error(e.to_string()))?
        }
    };

    if scene.name.is_empty() {
        scene.name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unnamed")
            .to_string();
    }

    scene.link_parents()?;
    scene.validate()?;

    tracing::info!(
        "Loaded snapshot '{}' ({} nodes) from {:?}",
        scene.name,
        scene.len(),
        path
    );
    Ok(scene)
}

/// Write a snapshot in the format implied by the extension
pub fn save_snapshot(scene: &AuthoredScene, path: &Path) -> Result<(), SnapshotError> {
    let content = match SnapshotFormat::from_path(path)? {
        SnapshotFormat::Ron => {
            ron::ser::to_string_pretty(scene, ron::ser::PrettyConfig::default())
                .map_err(|e| SnapshotError::Serialize(e.to_string()))?
        }
        SnapshotFormat::Json => serde_json::to_string_pretty(scene)
            .map_err(|e| SnapshotError::Serialize(e.to_string()))?,
    };

    std::fs::write(path, content).map_err(|e| SnapshotError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}
