//! Error types for scene export

use std::path::Path;

/// Errors that abort an export run or fail a single node's contribution
#[derive(Debug, Clone, thiserror::Error)]
pub enum ExportError {
    #[error("Failed to create directory '{path}': {reason}")]
    CreateDirectory { path: String, reason: String },

    #[error("Failed to write scene document '{path}': {reason}")]
    WriteDocument { path: String, reason: String },

    #[error("Failed to read scene document '{path}': {reason}")]
    ReadDocument { path: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("Mesh export failed for '{node}': {reason}")]
    MeshExport { node: String, reason: String },

    #[error("IO error: {0}")]
    Io(String),
}

impl ExportError {
    pub fn create_directory(path: &Path, err: impl ToString) -> Self {
        ExportError::CreateDirectory {
            path: path.display().to_string(),
            reason: err.to_string(),
        }
    }

    pub fn write_document(path: &Path, err: impl ToString) -> Self {
        ExportError::WriteDocument {
            path: path.display().to_string(),
            reason: err.to_string(),
        }
    }
}

/// Errors raised while building or querying an authored scene
#[derive(Debug, Clone, thiserror::Error)]
pub enum SceneError {
    #[error("Node not found: {0}")]
    NodeNotFound(usize),

    #[error("Node '{0}' already has a parent")]
    AlreadyHasParent(String),

    #[error("Parenting '{child}' under '{parent}' would create a cycle")]
    WouldCreateCycle { parent: String, child: String },

    #[error("Invalid hierarchy: {0}")]
    InvalidHierarchy(String),
}

/// Errors raised while building a change-of-basis matrix
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BasisError {
    #[error("Forward and up cannot share an axis ({forward} / {up})")]
    SameAxis { forward: String, up: String },

    #[error("Unknown axis: {0} (expected X, Y, Z, -X, -Y or -Z)")]
    UnknownAxis(String),
}
