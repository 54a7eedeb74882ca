use choreography::ScriptConfig;
use layers::LabelPlacementConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::input::Keymap;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid story config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_y_deg: f64,
    pub near: f64,
    pub far: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_deg: 50.0,
            near: 0.25,
            far: 2000.0,
        }
    }
}

/// Session tuning. Every field has a default, so `{}` is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoryConfig {
    /// Seconds without input before the session resets. `0` disables.
    pub idle_timeout_s: f64,
    /// Pick radius around each hotspot (world units).
    pub hotspot_radius: f64,
    pub transition_smooth_time_s: f64,
    /// Keep interactive transitions at the look-at height.
    pub level_flythrough: bool,
    pub script: ScriptConfig,
    pub camera: CameraConfig,
    pub label: LabelPlacementConfig,
    pub keymap: Keymap,
}

impl Default for StoryConfig {
    fn default() -> Self {
        Self {
            idle_timeout_s: 300.0,
            hotspot_radius: 2.0,
            transition_smooth_time_s: 0.6,
            level_flythrough: false,
            script: ScriptConfig::default(),
            camera: CameraConfig::default(),
            label: LabelPlacementConfig::default(),
            keymap: Keymap::default(),
        }
    }
}

impl StoryConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}
