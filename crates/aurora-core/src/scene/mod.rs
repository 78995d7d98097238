//! Authored scene snapshot
//!
//! Nodes live in an arena and refer to each other by [`NodeId`]. Parent links
//! are plain indices used for upward lookups; only `children` defines the
//! tree.

mod graph;
mod transforms;

use std::ops::Index;

use glam::{DMat4, DVec3};
use serde::{Deserialize, Serialize};

use crate::attributes::AttributeBag;
use crate::naming::sanitize_name;

/// Index of a node in an [`AuthoredScene`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

/// Authoring object type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum NodeKind {
    Mesh,
    #[default]
    Empty,
    Other,
}

impl NodeKind {
    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            NodeKind::Mesh => "MESH",
            NodeKind::Empty => "EMPTY",
            NodeKind::Other => "OTHER",
        }
    }
}

/// Image referenced by a material
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextureRef {
    /// Image datablock name
    pub name: String,
    /// Source file on disk, if any
    #[serde(default)]
    pub file_path: Option<String>,
    /// Image bytes embedded in the authoring file
    #[serde(default)]
    pub packed: Option<Vec<u8>>,
}

impl TextureRef {
    /// File name used in the texture directory: the source basename, else
    /// `<sanitized name>.png`. Never contains a path separator.
    pub fn file_name(&self) -> String {
        self.file_path
            .as_deref()
            .and_then(|p| p.rsplit(['/', '\\']).next())
            .filter(|name| !matches!(*name, "" | "." | ".."))
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}.png", sanitize_name(&self.name)))
    }
}

/// Material slot of a mesh
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialSlot {
    pub name: String,
    #[serde(default)]
    pub textures: Vec<TextureRef>,
}

/// Mesh geometry in node-local space
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshData {
    pub vertices: Vec<[f32; 3]>,
    /// Triangle indices (3 per face)
    #[serde(default)]
    pub indices: Vec<u32>,
    #[serde(default)]
    pub materials: Vec<MaterialSlot>,
}

impl MeshData {
    /// Get the number of triangles
    pub fn face_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Local axis-aligned bounds of the vertices
    pub fn bounds(&self) -> Option<LocalBounds> {
        if self.vertices.is_empty() {
            return None;
        }

        let mut min = DVec3::splat(f64::MAX);
        let mut max = DVec3::splat(f64::MIN);
        for v in &self.vertices {
            let p = DVec3::new(v[0] as f64, v[1] as f64, v[2] as f64);
            min = min.min(p);
            max = max.max(p);
        }

        Some(LocalBounds::from_min_max(min, max))
    }
}

/// Axis-aligned box given by center and half-size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalBounds {
    pub center: DVec3,
    pub extents: DVec3,
}

impl LocalBounds {
    /// Bounds used for markers without geometry
    pub const UNIT: LocalBounds = LocalBounds {
        center: DVec3::ZERO,
        extents: DVec3::ONE,
    };

    pub fn from_min_max(min: DVec3, max: DVec3) -> Self {
        Self {
            center: (min + max) * 0.5,
            extents: (max - min) * 0.5,
        }
    }

    /// True if any extent is zero
    pub fn is_degenerate(&self) -> bool {
        self.extents.min_element() <= f64::EPSILON
    }
}

/// A node of the authored hierarchy
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    pub name: String,
    #[serde(default)]
    pub kind: NodeKind,
    /// Hidden nodes are never exported
    #[serde(default)]
    pub hidden: bool,
    /// Transform relative to the authored parent
    #[serde(default)]
    pub local_matrix: DMat4,
    #[serde(default)]
    pub attributes: AttributeBag,
    #[serde(default)]
    pub mesh: Option<MeshData>,
    #[serde(default)]
    pub children: Vec<NodeId>,
    #[serde(default)]
    pub parent: Option<NodeId>,
}

impl SceneNode {
    /// Create an empty node
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Create a mesh node
    pub fn mesh(name: impl Into<String>, mesh: MeshData) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Mesh,
            mesh: Some(mesh),
            ..Default::default()
        }
    }

    /// Set the local transform
    pub fn with_matrix(mut self, local_matrix: DMat4) -> Self {
        self.local_matrix = local_matrix;
        self
    }

    /// Set the local transform from a translation
    pub fn with_translation(mut self, translation: DVec3) -> Self {
        self.local_matrix = DMat4::from_translation(translation);
        self
    }

    /// Replace the attribute bag
    pub fn with_attributes(mut self, attributes: AttributeBag) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Number of triangles, zero without geometry
    pub fn face_count(&self) -> usize {
        self.mesh.as_ref().map_or(0, MeshData::face_count)
    }

    /// True if this node carries renderable geometry
    pub fn has_geometry(&self) -> bool {
        self.kind == NodeKind::Mesh && self.face_count() > 0
    }

    /// Local bounds of the geometry, if any
    pub fn local_bounds(&self) -> Option<LocalBounds> {
        if self.kind != NodeKind::Mesh {
            return None;
        }
        self.mesh.as_ref().and_then(MeshData::bounds)
    }
}

/// Snapshot of the authoring tool's scene at export time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthoredScene {
    #[serde(default)]
    pub name: String,
    /// Scene-level custom properties (environment, lighting)
    #[serde(default)]
    pub attributes: AttributeBag,
    #[serde(default)]
    pub nodes: Vec<SceneNode>,
    /// Top-level nodes in authored order; derived from `nodes` when empty
    #[serde(default)]
    pub roots: Vec<NodeId>,
}

impl Index<NodeId> for AuthoredScene {
    type Output = SceneNode;

    fn index(&self, id: NodeId) -> &SceneNode {
        &self.nodes[id.0]
    }
}
