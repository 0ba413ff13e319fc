//! Engine tunables, loaded once at startup from JSON.
//!
//! Every field has a default, so a partial file (or no file at all) works.

use serde::{Deserialize, Serialize};

/// Depth-overlay placement and visibility settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OverlayConfig {
    pub enabled: bool,
    /// Fraction of wall cells that receive a section, `[0, 1]`.
    pub density: f32,
    /// Overlays are drawn only for hits in `min_distance..=max_distance`.
    pub min_distance: f32,
    pub max_distance: f32,
    pub random_seed: u64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            density: 0.2,
            min_distance: 0.5,
            max_distance: 8.0,
            random_seed: 42,
        }
    }
}

impl OverlayConfig {
    #[inline]
    pub fn visible_at(&self, distance: f32) -> bool {
        self.enabled && distance >= self.min_distance && distance <= self.max_distance
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Horizontal field of view in degrees.
    pub fov_degrees: f32,
    /// Multiplier applied to `move_player` / `strafe_player` distances.
    pub move_speed: f32,
    /// Multiplier applied to `rotate_player` angles.
    pub rotation_speed: f32,
    /// Reach of the facing ray used by `interact`.
    pub interact_range: f32,
    pub depth_textures: OverlayConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            move_speed: 0.1,
            rotation_speed: 0.05,
            interact_range: 2.5,
            depth_textures: OverlayConfig::default(),
        }
    }
}

impl EngineConfig {
    #[inline]
    pub fn fov(&self) -> f32 {
        self.fov_degrees.to_radians()
    }
}
