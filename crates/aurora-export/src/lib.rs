//! Aurora Scene Export
//!
//! Command line glue around `aurora-core`:
//! - Snapshot: loading authored scenes from RON or JSON
//! - Config: output locations and axis conventions
//! - Stl: the bundled mesh exporter
//! - Textures: copying and unpacking material images
//! - Pipeline: one full export run

pub mod cli;
pub mod commands;
pub mod config;
pub mod inspect;
pub mod pipeline;
pub mod snapshot;
pub mod stl;
pub mod textures;

pub use config::{ConfigError, ConfigManager, ExportConfig};
pub use pipeline::{ExportSummary, PipelineError, run_export};
pub use snapshot::{SnapshotError, load_snapshot, save_snapshot};
pub use stl::StlMeshExporter;
pub use textures::{TextureCollector, TextureReport};
