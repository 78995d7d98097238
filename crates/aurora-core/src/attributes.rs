//! Per-node attribute bag
//!
//! Authored nodes carry free-form custom properties. The exporter only reads
//! the keys listed in [`NodeAttribute`] and [`SceneAttribute`]; each has a
//! documented default used when the key is absent or holds a value of the
//! wrong type.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single custom property value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<f64>),
}

/// Key/value custom properties of an authored node or scene
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeBag(BTreeMap<String, AttributeValue>);

impl AttributeBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: AttributeValue) {
        self.0.insert(key.into(), value);
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: AttributeValue) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AttributeValue)> {
        self.0.iter()
    }

    /// Truthiness of a value (non-zero numbers, non-empty text and lists)
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).map(|value| match value {
            AttributeValue::Bool(b) => *b,
            AttributeValue::Int(i) => *i != 0,
            AttributeValue::Float(f) => *f != 0.0,
            AttributeValue::Text(s) => !s.is_empty(),
            AttributeValue::List(l) => !l.is_empty(),
        })
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        match self.get(key)? {
            AttributeValue::Float(f) => Some(*f),
            AttributeValue::Int(i) => Some(*i as f64),
            AttributeValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            AttributeValue::Text(s) => s.trim().parse().ok(),
            AttributeValue::List(_) => None,
        }
    }

    /// Integer value; floats truncate toward zero
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        match self.get(key)? {
            AttributeValue::Int(i) => Some(*i),
            AttributeValue::Float(f) => Some(f.trunc() as i64),
            AttributeValue::Bool(b) => Some(i64::from(*b)),
            AttributeValue::Text(s) => s.trim().parse().ok(),
            AttributeValue::List(_) => None,
        }
    }

    /// Text value; scalars are formatted
    pub fn get_string(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            AttributeValue::Text(s) => Some(s.clone()),
            AttributeValue::Int(i) => Some(i.to_string()),
            AttributeValue::Float(f) => Some(f.to_string()),
            AttributeValue::Bool(b) => Some(b.to_string()),
            AttributeValue::List(_) => None,
        }
    }

    /// Four-component float list
    pub fn get_vec4(&self, key: &str) -> Option<[f64; 4]> {
        match self.get(key)? {
            AttributeValue::List(l) if l.len() == 4 => Some([l[0], l[1], l[2], l[3]]),
            _ => None,
        }
    }

    /// Read a float, warning and falling back to `default` on a bad value
    pub fn f64_or(&self, key: &str, default: f64) -> f64 {
        read_or(self, key, default, Self::get_f64)
    }

    /// Read an integer, warning and falling back to `default` on a bad value
    pub fn i64_or(&self, key: &str, default: i64) -> i64 {
        read_or(self, key, default, Self::get_i64)
    }

    /// Read a string, warning and falling back to `default` on a bad value
    pub fn string_or(&self, key: &str, default: &str) -> String {
        read_or(self, key, default.to_string(), Self::get_string)
    }

    /// Read a 4-component list, warning and falling back to `default` on a bad value
    pub fn vec4_or(&self, key: &str, default: [f64; 4]) -> [f64; 4] {
        read_or(self, key, default, Self::get_vec4)
    }
}

fn read_or<T>(
    bag: &AttributeBag,
    key: &str,
    default: T,
    read: impl Fn(&AttributeBag, &str) -> Option<T>,
) -> T {
    if !bag.contains(key) {
        return default;
    }
    read(bag, key).unwrap_or_else(|| {
        tracing::warn!("Attribute '{}' has an unexpected value, using default", key);
        default
    })
}

impl FromIterator<(String, AttributeValue)> for AttributeBag {
    fn from_iter<I: IntoIterator<Item = (String, AttributeValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Recognized node attribute keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeAttribute {
    /// Game object type tag, default `GameObjectBase`
    ObjectType,
    /// Vertex shader, default `VSModel.hlsl`
    VertexShader,
    /// Pixel shader, default `PSModel.hlsl`
    PixelShader,
    /// Blend state index, default 0
    BlendState,
    /// Raster state index, default 1
    RasterState,
    /// Marks the node as a collider marker, default false
    Collider,
    /// Collider subtype (`box`, `obb`, `frustum`), default from name prefix
    ColliderType,
    /// Frustum right slope, default 1.0
    RightSlope,
    /// Frustum left slope, default -1.0
    LeftSlope,
    /// Frustum top slope, default 1.0
    TopSlope,
    /// Frustum bottom slope, default -1.0
    BottomSlope,
    /// Frustum near distance, default 0.1
    Near,
    /// Frustum far distance, default 1000.0
    Far,
}

impl NodeAttribute {
    /// Property key in the attribute bag
    pub fn key(&self) -> &'static str {
        match self {
            NodeAttribute::ObjectType => "ae_type",
            NodeAttribute::VertexShader => "ae_vs",
            NodeAttribute::PixelShader => "ae_ps",
            NodeAttribute::BlendState => "ae_blend",
            NodeAttribute::RasterState => "ae_raster",
            NodeAttribute::Collider => "ae_collider",
            NodeAttribute::ColliderType => "ae_collider_type",
            NodeAttribute::RightSlope => "ae_right_slope",
            NodeAttribute::LeftSlope => "ae_left_slope",
            NodeAttribute::TopSlope => "ae_top_slope",
            NodeAttribute::BottomSlope => "ae_bottom_slope",
            NodeAttribute::Near => "ae_near",
            NodeAttribute::Far => "ae_far",
        }
    }
}

/// Recognized scene-level attribute keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneAttribute {
    /// Environment map file, default `Skybox.dds`
    EnvironmentMap,
    /// Light color, default `[1, 1, 1, 1]`
    LightColor,
    /// Light direction, default `[0, -1, 0, 1]`
    LightDirection,
}

impl SceneAttribute {
    pub fn key(&self) -> &'static str {
        match self {
            SceneAttribute::EnvironmentMap => "ae_environment",
            SceneAttribute::LightColor => "ae_light_color",
            SceneAttribute::LightDirection => "ae_light_dir",
        }
    }
}

pub const DEFAULT_OBJECT_TYPE: &str = "GameObjectBase";
pub const DEFAULT_VS_SHADER: &str = "VSModel.hlsl";
pub const DEFAULT_PS_SHADER: &str = "PSModel.hlsl";
pub const DEFAULT_BLEND_STATE: i64 = 0;
pub const DEFAULT_RASTER_STATE: i64 = 1;
pub const DEFAULT_ENVIRONMENT_MAP: &str = "Skybox.dds";
pub const DEFAULT_LIGHT_COLOR: [f64; 4] = [1.0, 1.0, 1.0, 1.0];
pub const DEFAULT_LIGHT_DIRECTION: [f64; 4] = [0.0, -1.0, 0.0, 1.0];

/// Model-related settings read from a node's attributes
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    pub vs_shader: String,
    pub ps_shader: String,
    pub blend_state: i64,
    pub raster_state: i64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            vs_shader: DEFAULT_VS_SHADER.to_string(),
            ps_shader: DEFAULT_PS_SHADER.to_string(),
            blend_state: DEFAULT_BLEND_STATE,
            raster_state: DEFAULT_RASTER_STATE,
        }
    }
}

impl ModelSettings {
    pub fn from_attributes(attributes: &AttributeBag) -> Self {
        Self {
            vs_shader: attributes.string_or(NodeAttribute::VertexShader.key(), DEFAULT_VS_SHADER),
            ps_shader: attributes.string_or(NodeAttribute::PixelShader.key(), DEFAULT_PS_SHADER),
            blend_state: attributes.i64_or(NodeAttribute::BlendState.key(), DEFAULT_BLEND_STATE),
            raster_state: attributes
                .i64_or(NodeAttribute::RasterState.key(), DEFAULT_RASTER_STATE),
        }
    }
}

/// Environment and lighting defaults read from the scene's attributes
#[derive(Debug, Clone, PartialEq)]
pub struct SceneSettings {
    pub environment_map: String,
    pub light_color: [f64; 4],
    pub light_direction: [f64; 4],
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            environment_map: DEFAULT_ENVIRONMENT_MAP.to_string(),
            light_color: DEFAULT_LIGHT_COLOR,
            light_direction: DEFAULT_LIGHT_DIRECTION,
        }
    }
}

impl SceneSettings {
    pub fn from_attributes(attributes: &AttributeBag) -> Self {
        Self {
            environment_map: attributes
                .string_or(SceneAttribute::EnvironmentMap.key(), DEFAULT_ENVIRONMENT_MAP),
            light_color: attributes.vec4_or(SceneAttribute::LightColor.key(), DEFAULT_LIGHT_COLOR),
            light_direction: attributes
                .vec4_or(SceneAttribute::LightDirection.key(), DEFAULT_LIGHT_DIRECTION),
        }
    }
}
