//! Tool settings.
//!
//! Persisted as TOML. Every field has a default, so partial files load.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use void_transform::TransformSpace;

/// Settings load/save errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Malformed TOML or wrong field types
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Settings could not be written out
    #[error("Serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Settings read by the tool modes and their states.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    /// Screen distance (px) a press must travel before the host reports a drag
    pub drag_threshold: f32,
    /// Depth of the box-pick frustum behind the near rectangle
    pub box_pick_depth: f32,
    /// Undo entries kept before the oldest are dropped
    pub undo_capacity: usize,
    /// Space used by the transform tools
    pub transform_space: TransformSpace,
    /// Log state transitions at info level
    pub log_state_transitions: bool,
    /// World offset applied to duplicated roots
    pub duplicate_offset: [f32; 3],
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            drag_threshold: 5.0,
            box_pick_depth: 1000.0,
            undo_capacity: 100,
            transform_space: TransformSpace::World,
            log_state_transitions: false,
            duplicate_offset: [0.0, 0.0, 0.0],
        }
    }
}

impl ToolSettings {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load settings from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let settings = Self::from_toml_str(&content)?;
        log::info!("Loaded tool settings from {:?}", path);
        Ok(settings)
    }

    /// Save settings to a file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, self.to_toml_string()?)?;
        log::info!("Saved tool settings to {:?}", path);
        Ok(())
    }

    /// Get the default settings path.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("void_tools");
            p.push("settings.toml");
            p
        })
    }

    /// Whether a press has travelled far enough to count as a drag.
    pub fn exceeds_drag_threshold(&self, start: glam::Vec2, current: glam::Vec2) -> bool {
        let d = (current - start).abs();
        d.x > self.drag_threshold || d.y > self.drag_threshold
    }
}
