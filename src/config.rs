//! Compositor Configuration
//!
//! Canvas geometry and resampling come from one place, with a fixed fallback.

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_CANVAS_SIZE: u32 = 200;
pub const MAX_CANVAS_SIZE: u32 = 4096;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Canvas size must be between 1 and 4096, got {0}")]
    InvalidCanvasSize(u32),

    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Filter used when a component's size differs from the canvas.
/// Components are line art, so nearest-neighbor keeps stroke edges crisp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResampleFilter {
    #[default]
    Nearest,
    Bilinear,
}

impl ResampleFilter {
    pub fn filter_type(self) -> FilterType {
        match self {
            ResampleFilter::Nearest => FilterType::Nearest,
            ResampleFilter::Bilinear => FilterType::Triangle,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositorConfig {
    #[serde(default = "default_canvas_size")]
    pub canvas_size: u32,
    #[serde(default = "default_background")]
    pub background: [u8; 3],
    #[serde(default)]
    pub resample: ResampleFilter,
}

fn default_canvas_size() -> u32 { DEFAULT_CANVAS_SIZE }
fn default_background() -> [u8; 3] { [255, 255, 255] }

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            canvas_size: DEFAULT_CANVAS_SIZE,
            background: default_background(),
            resample: ResampleFilter::Nearest,
        }
    }
}

impl CompositorConfig {
    /// Create from user-provided values with validation
    pub fn from_user(canvas_size: u32, background: [u8; 3], resample: ResampleFilter) -> Result<Self, ConfigError> {
        let config = Self { canvas_size, background, resample };
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.canvas_size == 0 || self.canvas_size > MAX_CANVAS_SIZE {
            return Err(ConfigError::InvalidCanvasSize(self.canvas_size));
        }
        Ok(())
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.canvas_size, self.canvas_size)
    }
}
