use std::path::Path;

use anyhow::{Context, Result};

use super::types::SpriteConfig;

/// Write a config as pretty JSON, refusing to clobber an existing file
/// unless `overwrite` is set.
pub fn save_config(config: &SpriteConfig, path: &Path, overwrite: bool) -> Result<()> {
    if path.exists() && !overwrite {
        anyhow::bail!(
            "config file already exists: {} (use --force to overwrite)",
            path.display()
        );
    }

    let mut content =
        serde_json::to_string_pretty(config).context("failed to serialize config to JSON")?;
    content.push('\n');

    std::fs::write(path, content)
        .with_context(|| format!("failed to write config file: {}", path.display()))?;

    Ok(())
}

/// Express `path` relative to `base` for storing in a config file.
///
/// Paths outside `base` are kept as given.
pub fn make_relative(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .to_string_lossy()
        .into_owned()
}
