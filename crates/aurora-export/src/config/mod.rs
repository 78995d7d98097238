//! Export configuration module
//!
//! Output locations, axis conventions and scene-level defaults. Stored as RON
//! in the OS configuration directory unless a file is given explicitly.

mod manager;

pub use manager::{ConfigError, ConfigManager};

use std::path::PathBuf;

use aurora_core::{
    AttributeBag, AxisConvention, BasisConverter, BasisError, DEFAULT_ENVIRONMENT_MAP,
    DEFAULT_LIGHT_COLOR, DEFAULT_LIGHT_DIRECTION, SceneAttribute, SceneSettings,
};
use serde::{Deserialize, Serialize};

/// Current configuration format version
pub const CONFIG_VERSION: u32 = 1;

/// Output locations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PathConfig {
    /// Engine project root all other paths are relative to
    pub project_root: PathBuf,
    /// Scene name; empty means the snapshot's own name
    pub scene_name: String,
    /// Model root below the project root
    pub model_dir: String,
    /// Scene document directory below the project root
    pub scene_dir: String,
    /// Texture root below the project root
    pub texture_dir: String,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            scene_name: String::new(),
            model_dir: "Model".to_string(),
            scene_dir: "Scene".to_string(),
            texture_dir: "Texture".to_string(),
        }
    }
}

impl PathConfig {
    /// Root that model references are relative to (`<root>/Model`)
    pub fn model_root(&self) -> PathBuf {
        self.project_root.join(&self.model_dir)
    }

    /// Directory receiving this scene's model files (`<root>/Model/<scene>`)
    pub fn model_output_dir(&self, scene_name: &str) -> PathBuf {
        self.model_root().join(scene_name)
    }

    /// Scene document path (`<root>/Scene/<scene>.json`)
    pub fn scene_document_path(&self, scene_name: &str) -> PathBuf {
        self.project_root
            .join(&self.scene_dir)
            .join(format!("{}.json", scene_name))
    }

    /// Directory receiving this scene's textures (`<root>/Texture/<scene>`)
    pub fn texture_output_dir(&self, scene_name: &str) -> PathBuf {
        self.project_root.join(&self.texture_dir).join(scene_name)
    }
}

/// Coordinate conventions on both sides of the export
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AxisConfig {
    pub authoring: AxisConvention,
    pub engine: AxisConvention,
    /// Reflect Z after the remap (right-handed to left-handed)
    pub flip_handedness: bool,
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            authoring: AxisConvention::AUTHORING,
            engine: AxisConvention::ENGINE,
            flip_handedness: true,
        }
    }
}

impl AxisConfig {
    /// Build the change of basis for these conventions
    pub fn basis(&self) -> Result<BasisConverter, BasisError> {
        BasisConverter::new(self.authoring, self.engine, self.flip_handedness)
    }
}

/// Scene-level defaults used when the snapshot does not override them
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    pub environment_map: String,
    pub light_color: [f64; 4],
    pub light_direction: [f64; 4],
    /// Copy or unpack referenced textures into the texture directory
    pub collect_textures: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            environment_map: DEFAULT_ENVIRONMENT_MAP.to_string(),
            light_color: DEFAULT_LIGHT_COLOR,
            light_direction: DEFAULT_LIGHT_DIRECTION,
            collect_textures: true,
        }
    }
}

impl SceneConfig {
    /// Resolve scene settings: snapshot attributes win over these defaults
    pub fn settings_for(&self, attributes: &AttributeBag) -> SceneSettings {
        SceneSettings {
            environment_map: attributes
                .string_or(SceneAttribute::EnvironmentMap.key(), &self.environment_map),
            light_color: attributes.vec4_or(SceneAttribute::LightColor.key(), self.light_color),
            light_direction: attributes
                .vec4_or(SceneAttribute::LightDirection.key(), self.light_direction),
        }
    }
}

/// Complete export configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportConfig {
    /// Configuration format version
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub paths: PathConfig,
    #[serde(default)]
    pub axes: AxisConfig,
    #[serde(default)]
    pub scene: SceneConfig,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportConfig {
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            paths: PathConfig::default(),
            axes: AxisConfig::default(),
            scene: SceneConfig::default(),
        }
    }
}
