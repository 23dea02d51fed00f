//! Effective transform configuration for the indexer.

use anyhow::{Context, Result};
use stac_odc::{PathMode, TransformConfig};
use std::path::Path;

/// Settings given on the command line, applied last.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub default_grid: Option<String>,
    pub absolute: bool,
}

/// Build the configuration: YAML file (or defaults), then environment, then
/// command-line overrides.
pub fn load_config(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<TransformConfig> {
    let config = match path {
        Some(path) => TransformConfig::from_yaml(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => TransformConfig::default(),
    };

    let mut config = config
        .with_env_overrides()
        .context("Invalid STAC_ODC_* environment settings")?;

    if let Some(grid) = &overrides.default_grid {
        config.default_grid = grid.clone();
    }
    if overrides.absolute {
        config.path_mode = PathMode::Absolute;
    }

    config.validate()?;
    Ok(config)
}
