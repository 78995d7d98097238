//! Subcommand handlers

use std::path::{Path, PathBuf};

use crate::cli::Command;
use crate::config::{ConfigError, ConfigManager};
use crate::inspect::render_hierarchy;
use crate::pipeline::{PipelineError, run_export};
use crate::snapshot::load_snapshot;

/// Run one parsed subcommand
pub fn execute(command: Command) -> Result<(), PipelineError> {
    match command {
        Command::Export {
            scene,
            config,
            project_root,
            scene_name,
        } => export(&scene, config.as_deref(), project_root, scene_name),
        Command::Inspect { scene } => {
            let scene = load_snapshot(&scene)?;
            print!("{}", render_hierarchy(&scene));
            Ok(())
        }
        Command::InitConfig { config, force } => init_config(config, force),
    }
}

fn export(
    snapshot: &Path,
    config_path: Option<&Path>,
    project_root: Option<PathBuf>,
    scene_name: Option<String>,
) -> Result<(), PipelineError> {
    let mut config = ConfigManager::load(config_path)?.into_config();

    // Command line overrides are applied last
    if let Some(root) = project_root {
        config.paths.project_root = root;
    }
    if let Some(name) = scene_name {
        config.paths.scene_name = name;
    }

    let scene = load_snapshot(snapshot)?;
    let source_root = snapshot.parent().unwrap_or_else(|| Path::new("."));
    let summary = run_export(&scene, &config, source_root)?;

    println!(
        "Scene '{}': {} game objects, {} models -> {}",
        summary.scene_name,
        summary.object_count,
        summary.traversal.exported_meshes,
        summary.document_path.display()
    );
    Ok(())
}

fn init_config(path: Option<PathBuf>, force: bool) -> Result<(), PipelineError> {
    let path = path.unwrap_or_else(ConfigManager::default_config_path);
    if path.exists() && !force {
        return Err(ConfigError::Io(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        ))
        .into());
    }

    let manager = ConfigManager::with_defaults(&path);
    manager.save()?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}
