//! Configuration manager for loading and saving the export configuration

use std::path::{Path, PathBuf};

use super::{CONFIG_VERSION, ExportConfig};

/// Configuration error types
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// IO error during file operations
    #[error("IO error: {0}")]
    Io(String),
    /// Error during serialization
    #[error("Serialization error: {0}")]
    Serialize(String),
    /// Error during deserialization
    #[error("Failed to parse config '{path}': {reason}")]
    Deserialize { path: String, reason: String },
    /// Explicitly requested file does not exist
    #[error("Config file not found: {0}")]
    NotFound(String),
}

/// Holds the active configuration and where it lives on disk
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: ExportConfig,
    config_path: PathBuf,
}

impl ConfigManager {
    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one the OS default location is
    /// used, falling back to defaults when no file is there.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path.display().to_string()));
                }
                Self::load_from_path(path)?
            }
            None => {
                let default_path = Self::default_config_path();
                if default_path.exists() {
                    Self::load_from_path(&default_path)?
                } else {
                    tracing::info!("No config file found, using defaults");
                    ExportConfig::new()
                }
            }
        };

        Ok(Self {
            config,
            config_path: path.map(Path::to_path_buf).unwrap_or_else(Self::default_config_path),
        })
    }

    /// Manager for `path` holding the default configuration
    pub fn with_defaults(path: impl Into<PathBuf>) -> Self {
        Self {
            config: ExportConfig::new(),
            config_path: path.into(),
        }
    }

    /// Get the OS-standard configuration directory
    fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("aurora-export")
    }

    /// Default configuration file path
    pub fn default_config_path() -> PathBuf {
        Self::config_dir().join("config.ron")
    }

    /// Load configuration from a file path
    pub fn load_from_path(path: &Path) -> Result<ExportConfig, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let config: ExportConfig = ron::from_str(&content).map_err(|e| ConfigError::Deserialize {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        if config.version > CONFIG_VERSION {
            tracing::warn!(
                "Config version {} is newer than supported version {}",
                config.version,
                CONFIG_VERSION
            );
        }

        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get a reference to the current configuration
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Get a mutable reference to the configuration
    pub fn config_mut(&mut self) -> &mut ExportConfig {
        &mut self.config
    }

    pub fn into_config(self) -> ExportConfig {
        self.config
    }

    /// Save the configuration to disk
    pub fn save(&self) -> Result<(), ConfigError> {
        // Ensure config directory exists
        if let Some(parent) = self.config_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io(e.to_string()))?;
        }

        let content = ron::ser::to_string_pretty(&self.config, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;

        std::fs::write(&self.config_path, &content).map_err(|e| ConfigError::Io(e.to_string()))?;

        tracing::info!("Saved config to {:?}", self.config_path);
        Ok(())
    }

    /// Get the config file path (for display purposes)
    pub fn config_file_path(&self) -> &Path {
        &self.config_path
    }
}
