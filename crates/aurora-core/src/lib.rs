//! Aurora Exporter Core
//!
//! This crate converts an authored scene hierarchy into an Aurora engine
//! scene document:
//! - Basis: change of coordinates between authoring and engine conventions
//! - Codec: engine-space position/rotation/scale records
//! - Naming: unique, sanitized model file names
//! - Collider: bounding volumes derived from marker nodes
//! - Walker: traversal that builds the game object tree
//! - Serializer: the persisted scene document

pub mod attributes;
pub mod basis;
pub mod codec;
pub mod collider;
pub mod document;
pub mod error;
pub mod exporter;
pub mod naming;
pub mod scene;
pub mod serializer;
pub mod types;
pub mod walker;

pub use attributes::*;
pub use basis::*;
pub use codec::*;
pub use collider::*;
pub use document::*;
pub use error::*;
pub use exporter::*;
pub use naming::*;
pub use scene::*;
pub use serializer::*;
pub use types::*;
pub use walker::*;
