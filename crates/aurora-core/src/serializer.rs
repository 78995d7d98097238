//! Scene document persistence

use std::path::Path;

use serde::Serialize;

use crate::document::SceneDocument;
use crate::error::ExportError;

/// Indentation of the written document
const INDENT: &[u8] = b"    ";

/// Assembles and writes scene documents
#[derive(Debug, Clone, Copy, Default)]
pub struct SceneSerializer;

impl SceneSerializer {
    /// Render the document as pretty JSON with 4-space indentation
    pub fn assemble(document: &SceneDocument) -> Result<String, ExportError> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(INDENT);
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        document
            .serialize(&mut ser)
            .map_err(|e| ExportError::Serialize(e.to_string()))?;
        String::from_utf8(buf).map_err(|e| ExportError::Serialize(e.to_string()))
    }

    /// Write the document to `path`, creating the parent directory.
    ///
    /// The content goes to a sibling temporary file first and is renamed over
    /// `path`, so readers never observe a partial document.
    pub fn write(document: &SceneDocument, path: &Path) -> Result<(), ExportError> {
        let content = Self::assemble(document)?;

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| ExportError::create_directory(parent, e))?;
        }

        let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
        tmp_name.push(".tmp");
        let tmp_path = path.with_file_name(tmp_name);

        std::fs::write(&tmp_path, content.as_bytes())
            .map_err(|e| ExportError::write_document(path, e))?;
        if let Err(e) = std::fs::rename(&tmp_path, path) {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(ExportError::write_document(path, e));
        }

        tracing::info!("Saved scene document to {:?}", path);
        Ok(())
    }

    /// Load a previously written document
    pub fn read(path: &Path) -> Result<SceneDocument, ExportError> {
        let content = std::fs::read_to_string(path).map_err(|e| ExportError::ReadDocument {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| ExportError::ReadDocument {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::SceneSettings;
    use crate::document::GameObjectRecord;
    use crate::types::EngineTransform;

    fn sample() -> SceneDocument {
        let mut root = GameObjectRecord::new("Room", "GameObjectBase", EngineTransform::default());
        root.children
            .push(GameObjectRecord::new("Chair", "GameObjectBase", EngineTransform::default()));
        SceneDocument::new(&SceneSettings::default(), vec![root])
    }

    #[test]
    fn test_assemble_uses_four_space_indent() {
        let json = SceneSerializer::assemble(&sample()).unwrap();
        assert!(json.starts_with("{\n    \"environmentMapFileName\": \"Skybox.dds\","));
        assert!(json.contains("\n        {\n            \"type\": \"GameObjectBase\","));
    }

    #[test]
    fn test_top_level_field_order() {
        let json = SceneSerializer::assemble(&sample()).unwrap();
        let env = json.find("environmentMapFileName").unwrap();
        let color = json.find("lightColor").unwrap();
        let dir = json.find("lightDirection").unwrap();
        let roots = json.find("rootGameObjects").unwrap();
        assert!(env < color && color < dir && dir < roots);
    }

    #[test]
    fn test_write_creates_parent_and_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Scene").join("Level.json");

        SceneSerializer::write(&sample(), &path).unwrap();
        assert!(path.exists());
        assert!(!dir.path().join("Scene").join("Level.json.tmp").exists());

        let back = SceneSerializer::read(&path).unwrap();
        assert_eq!(back, sample());
        assert_eq!(back.object_count(), 2);
    }

    #[test]
    fn test_write_overwrites_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Level.json");
        std::fs::write(&path, "stale").unwrap();

        SceneSerializer::write(&sample(), &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with('{'));
    }

    #[test]
    fn test_write_fails_when_parent_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("Scene");
        std::fs::write(&blocker, "not a directory").unwrap();

        let result = SceneSerializer::write(&sample(), &blocker.join("Level.json"));
        assert!(matches!(result, Err(ExportError::CreateDirectory { .. })));
    }

    #[test]
    fn test_read_missing_file() {
        let result = SceneSerializer::read(Path::new("/nonexistent/aurora/Level.json"));
        assert!(matches!(result, Err(ExportError::ReadDocument { .. })));
    }
}
