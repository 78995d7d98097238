//! Command line arguments

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "aurora-export")]
#[command(version)]
#[command(about = "Exports authored scene snapshots to Aurora engine scene files")]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Export a snapshot: models, textures and the scene document
    Export {
        /// Authored scene snapshot (.ron or .json)
        #[arg(long)]
        scene: PathBuf,
        /// Configuration file (defaults to the OS config directory)
        #[arg(long, env = "AURORA_EXPORT_CONFIG")]
        config: Option<PathBuf>,
        /// Engine project root, overrides the configuration
        #[arg(long, env = "AURORA_PROJECT_ROOT")]
        project_root: Option<PathBuf>,
        /// Scene name used in output paths, overrides the configuration
        #[arg(long)]
        scene_name: Option<String>,
    },
    /// Print the authored hierarchy and how each node would be exported
    Inspect {
        #[arg(long)]
        scene: PathBuf,
    },
    /// Write the default configuration file
    InitConfig {
        #[arg(long)]
        config: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
