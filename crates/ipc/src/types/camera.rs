//! Orbit camera framing limits.

use serde::{Deserialize, Serialize};

/// Distance and polar-angle limits for the orbit camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CameraLimits {
    pub min_distance: f32,
    pub max_distance: f32,
    /// Largest angle from straight up, in radians
    pub max_polar_angle: f32,
    /// Per-frame velocity decay; `None` stops immediately on release
    pub damping: Option<f32>,
}

impl Default for CameraLimits {
    fn default() -> Self {
        Self {
            min_distance: 2.0,
            max_distance: 10.0,
            max_polar_angle: std::f32::consts::PI / 2.2,
            damping: None,
        }
    }
}

impl CameraLimits {
    /// Unbounded framing used by pages without explicit limits
    pub fn free() -> Self {
        Self {
            min_distance: 0.5,
            max_distance: 50.0,
            max_polar_angle: std::f32::consts::PI,
            damping: None,
        }
    }
}
