//! Scene document records
//!
//! Field declaration order is the persisted field order. Readers of the
//! scene file may stream-parse it, so do not reorder fields.

use serde::{Deserialize, Serialize};

use crate::attributes::{ModelSettings, SceneSettings};
use crate::types::EngineTransform;

/// Root of the persisted scene file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDocument {
    pub environment_map_file_name: String,
    pub light_color: [f64; 4],
    pub light_direction: [f64; 4],
    pub root_game_objects: Vec<GameObjectRecord>,
}

impl SceneDocument {
    pub fn new(settings: &SceneSettings, root_game_objects: Vec<GameObjectRecord>) -> Self {
        Self {
            environment_map_file_name: settings.environment_map.clone(),
            light_color: settings.light_color,
            light_direction: settings.light_direction,
            root_game_objects,
        }
    }

    /// Total number of game objects in the tree
    pub fn object_count(&self) -> usize {
        self.root_game_objects.iter().map(GameObjectRecord::subtree_len).sum()
    }

    /// Find the first game object with the given name (depth-first)
    pub fn find(&self, name: &str) -> Option<&GameObjectRecord> {
        self.root_game_objects.iter().find_map(|go| go.find(name))
    }
}

/// One game object of the output tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameObjectRecord {
    #[serde(rename = "type")]
    pub object_type: String,
    pub name: String,
    pub position: [f64; 4],
    pub rotation: [f64; 4],
    pub scale: [f64; 4],
    pub components: Vec<Component>,
    #[serde(rename = "childGameObjects")]
    pub children: Vec<GameObjectRecord>,
}

impl GameObjectRecord {
    pub fn new(
        name: impl Into<String>,
        object_type: impl Into<String>,
        transform: EngineTransform,
    ) -> Self {
        Self {
            object_type: object_type.into(),
            name: name.into(),
            position: transform.position,
            rotation: transform.rotation,
            scale: transform.scale,
            components: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Transform stored in this record
    pub fn transform(&self) -> EngineTransform {
        EngineTransform {
            position: self.position,
            rotation: self.rotation,
            scale: self.scale,
        }
    }

    pub fn model(&self) -> Option<&ModelComponent> {
        self.components.iter().find_map(|c| match c {
            Component::ModelComponent(m) => Some(m),
            _ => None,
        })
    }

    pub fn collider(&self) -> Option<&ColliderComponent> {
        self.components.iter().find_map(|c| match c {
            Component::ColliderComponent(col) => Some(col),
            _ => None,
        })
    }

    fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Self::subtree_len).sum::<usize>()
    }

    fn find(&self, name: &str) -> Option<&GameObjectRecord> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }
}

/// Component attached to a game object, tagged by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Component {
    ModelComponent(ModelComponent),
    ColliderComponent(ColliderComponent),
}

/// Renderable model reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelComponent {
    pub vs_shader_name: String,
    pub ps_shader_name: String,
    /// Path relative to the engine model root, forward slashes
    pub model_file_name: String,
    pub material_factor_data: MaterialFactorData,
    pub blend_state: i64,
    pub raster_state: i64,
}

impl ModelComponent {
    pub fn new(model_file_name: impl Into<String>, settings: &ModelSettings) -> Self {
        Self {
            vs_shader_name: settings.vs_shader.clone(),
            ps_shader_name: settings.ps_shader.clone(),
            model_file_name: model_file_name.into(),
            material_factor_data: MaterialFactorData::default(),
            blend_state: settings.blend_state,
            raster_state: settings.raster_state,
        }
    }
}

/// PBR material multipliers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialFactorData {
    pub base_color_factor: [f64; 4],
    pub ambient_occlusion_factor: f64,
    pub roughness_factor: f64,
    pub metallic_factor: f64,
    pub normal_scale: f64,
    pub emission_factor: [f64; 4],
}

impl Default for MaterialFactorData {
    fn default() -> Self {
        Self {
            base_color_factor: [1.0, 1.0, 1.0, 1.0],
            ambient_occlusion_factor: 1.0,
            roughness_factor: 1.0,
            metallic_factor: 1.0,
            normal_scale: 1.0,
            emission_factor: [1.0, 1.0, 1.0, 1.0],
        }
    }
}

/// Bounding volumes of a game object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColliderComponent {
    pub bounding_boxes: Vec<BoundingBox>,
    pub bounding_oriented_boxes: Vec<BoundingOrientedBox>,
    pub bounding_frustums: Vec<BoundingFrustum>,
}

impl ColliderComponent {
    /// Total number of volumes across all kinds
    pub fn len(&self) -> usize {
        self.bounding_boxes.len() + self.bounding_oriented_boxes.len() + self.bounding_frustums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub center: [f64; 3],
    pub extents: [f64; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingOrientedBox {
    pub center: [f64; 3],
    pub extents: [f64; 3],
    /// Quaternion `[x, y, z, w]`
    pub orientation: [f64; 4],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingFrustum {
    pub origin: [f64; 3],
    pub orientation: [f64; 4],
    pub right_slope: f64,
    pub left_slope: f64,
    pub top_slope: f64,
    pub bottom_slope: f64,
    pub near: f64,
    pub far: f64,
}
