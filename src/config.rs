use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::EditorResult;

/// User-tunable editor settings.
///
/// Persisted by the app through eframe storage, and optionally loaded from a
/// JSON file at startup. Missing fields fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Brush diameter in canvas pixels for new strokes
    pub brush_size: f32,
    /// RGBA colour used to overlay the strokes of the current batch
    pub highlight_color: [u8; 4],
    /// Longest canvas side in non-HD mode
    pub preview_max_dimension: u32,
    /// Inserted before the extension of downloaded files
    pub download_suffix: String,
    /// Where the filesystem exporter writes downloads
    pub download_dir: PathBuf,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            brush_size: 40.0,
            highlight_color: [255, 0, 0, 128],
            preview_max_dimension: 720,
            download_suffix: "_cleanup".to_owned(),
            download_dir: PathBuf::from("."),
        }
    }
}

impl EditorConfig {
    /// Read a config from a JSON file
    pub fn load(path: impl AsRef<Path>) -> EditorResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Like [`EditorConfig::load`], but a missing file yields the defaults.
    /// A file that exists but does not parse is still an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> EditorResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }
}
