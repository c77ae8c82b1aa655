//! Figure output settings.
//!
//! Loaded from a JSON file; every field is optional and falls back to the
//! defaults below.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Svg,
    Png,
}

impl OutputFormat {
    /// Guess the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("svg") => Some(OutputFormat::Svg),
            Some("png") => Some(OutputFormat::Png),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FigureConfig {
    pub width: u32,
    pub height: u32,
    pub font_family: String,
    /// Multiplier applied to every font size.
    pub font_scale: f64,
    pub format: OutputFormat,
    /// Background colour as `[r, g, b]`.
    pub background: [u8; 3],
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 800,
            font_family: "sans-serif".to_string(),
            font_scale: 1.0,
            format: OutputFormat::Svg,
            background: [255, 255, 255],
        }
    }
}

impl FigureConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Font size in pixels after scaling.
    pub fn font_px(&self, base: f64) -> f64 {
        base * self.font_scale
    }
}
