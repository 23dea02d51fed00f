//! Transform configuration.
//!
//! Defines the default grid, how asset paths are rendered, and the inputs
//! of the deterministic dataset id.

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{Result, TransformError};
use crate::grids::grid_key;

/// Grid key treated as `default` unless configured otherwise.
pub const DEFAULT_GRID: &str = "g10m";
/// Algorithm name fed into the dataset id.
pub const DEFAULT_ID_NAMESPACE: &str = "sentinel-2_stac_process";
/// Algorithm version fed into the dataset id.
pub const DEFAULT_ID_VERSION: &str = "1.0.0";

/// How measurement paths are written into the dataset document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathMode {
    /// File name only, resolved relative to the document location
    #[default]
    Relative,
    /// The asset href as given
    Absolute,
}

impl FromStr for PathMode {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "relative" => Ok(PathMode::Relative),
            "absolute" => Ok(PathMode::Absolute),
            other => Err(TransformError::InvalidConfig(format!(
                "unknown path mode '{}', expected 'relative' or 'absolute'",
                other
            ))),
        }
    }
}

impl fmt::Display for PathMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathMode::Relative => write!(f, "relative"),
            PathMode::Absolute => write!(f, "absolute"),
        }
    }
}

/// Settings shared by every transform invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Grid key whose grid is emitted as `default`
    pub default_grid: String,
    /// Measurement path rendering
    pub path_mode: PathMode,
    /// Algorithm name for the dataset id
    pub id_namespace: String,
    /// Algorithm version for the dataset id
    pub id_version: String,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            default_grid: DEFAULT_GRID.to_string(),
            path_mode: PathMode::default(),
            id_namespace: DEFAULT_ID_NAMESPACE.to_string(),
            id_version: DEFAULT_ID_VERSION.to_string(),
        }
    }
}

impl TransformConfig {
    /// Default configuration with absolute paths.
    pub fn absolute() -> Self {
        Self {
            path_mode: PathMode::Absolute,
            ..Self::default()
        }
    }

    /// Load configuration from a YAML file.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: TransformConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by `STAC_ODC_DEFAULT_GRID` and `STAC_ODC_PATH_MODE`.
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides()
    }

    /// Apply environment overrides on top of this configuration.
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(grid) = env::var("STAC_ODC_DEFAULT_GRID") {
            self.default_grid = grid;
        }
        if let Ok(mode) = env::var("STAC_ODC_PATH_MODE") {
            self.path_mode = mode.parse()?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Check the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        let spacing = self
            .default_grid
            .strip_prefix('g')
            .and_then(|rest| rest.strip_suffix('m'))
            .ok_or_else(|| {
                TransformError::InvalidConfig(format!(
                    "default grid '{}' must look like g<spacing>m",
                    self.default_grid
                ))
            })?;

        let spacing = spacing
            .parse::<f64>()
            .ok()
            .filter(|spacing| spacing.is_finite())
            .ok_or_else(|| {
                TransformError::InvalidConfig(format!(
                    "default grid '{}' has a non-numeric spacing",
                    self.default_grid
                ))
            })?;

        // Only keys in the form grid_key produces can ever match an asset.
        let canonical = grid_key(spacing);
        if canonical != self.default_grid {
            return Err(TransformError::InvalidConfig(format!(
                "default grid '{}' is not a canonical grid key, use '{}'",
                self.default_grid, canonical
            )));
        }

        if self.id_namespace.is_empty() {
            return Err(TransformError::InvalidConfig(
                "id_namespace must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
