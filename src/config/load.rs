use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::types::SpriteConfig;

/// A loaded configuration file with its associated directory.
///
/// Paths in the config are relative to the config file location,
/// so we need to track where the config was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The parsed configuration
    pub config: SpriteConfig,
    /// The directory containing the config file
    pub config_dir: PathBuf,
}

impl LoadedConfig {
    /// Load a config file from the given path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        let config: SpriteConfig = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;

        let config_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self { config, config_dir })
    }

    /// Source image path, resolved relative to the config file directory.
    pub fn resolve_source(&self) -> Option<PathBuf> {
        self.config
            .source
            .as_ref()
            .map(|source| self.config_dir.join(source))
    }

    /// Resolve the frames directory relative to the config file directory.
    pub fn resolve_output_dir(&self) -> PathBuf {
        self.config_dir.join(&self.config.output_dir)
    }

    /// Resolve the sheet path relative to the config file directory.
    pub fn resolve_sheet(&self) -> Option<PathBuf> {
        self.config
            .sheet
            .as_ref()
            .map(|sheet| self.config_dir.join(sheet))
    }
}
