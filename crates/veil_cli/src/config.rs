//! Veil configuration file handling

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use veil_core::{MaskConfig, MaskOptions, RainRule};
use veil_paint::Rect;

/// Top-level Veil configuration (veil.toml)
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VeilConfig {
    #[serde(default)]
    pub target: TargetConfig,
    #[serde(default)]
    pub mask: MaskOptions,
    /// Extra gesture-end drop rules, appended to `mask.rain`
    #[serde(default)]
    pub rain: Vec<RainRule>,
    /// Treat the mask image as cross-origin
    #[serde(default)]
    pub cross_origin: bool,
    /// Directory the file was loaded from, for resolving image paths
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

/// Bounds of the masked target in client coordinates
#[derive(Debug, Deserialize, Serialize)]
pub struct TargetConfig {
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default = "default_width")]
    pub width: f32,
    #[serde(default = "default_height")]
    pub height: f32,
}

fn default_width() -> f32 {
    200.0
}

fn default_height() -> f32 {
    100.0
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: default_width(),
            height: default_height(),
        }
    }
}

impl TargetConfig {
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

impl VeilConfig {
    /// Load configuration from a file, or from `veil.toml` inside a directory
    pub fn load(path: &Path) -> Result<Self> {
        let config_path = if path.is_dir() {
            path.join("veil.toml")
        } else {
            path.to_path_buf()
        };

        if !config_path.exists() {
            anyhow::bail!("No veil config found at {}", config_path.display());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let mut config: VeilConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;
        config.base_dir = config_path.parent().map(Path::to_path_buf);

        Ok(config)
    }

    /// Mask config with defaults filled in
    pub fn mask_config(&self) -> MaskConfig {
        let mut config = MaskConfig::from(self.mask.clone());
        config.rain.extend(self.rain.iter().cloned());
        config
    }

    /// Resolve an image source against the config directory
    pub fn resolve(&self, source: &str) -> PathBuf {
        match &self.base_dir {
            Some(dir) => dir.join(source),
            None => PathBuf::from(source),
        }
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}
