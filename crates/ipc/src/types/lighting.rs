//! Lighting parameter set.

use serde::{Deserialize, Serialize};

use crate::params::HexColor;

/// Intensities, key color and key position of the studio light rig.
///
/// Intensities are in the panel's unitless scale; the scene converts them
/// to lux and lumens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LightingParams {
    pub ambient_intensity: f32,
    pub key_intensity: f32,
    pub key_color: HexColor,
    /// World position the key light shines from (towards the origin)
    pub key_position: [f32; 3],
    pub fill_intensity: f32,
    pub rim_intensity: f32,
}

impl Default for LightingParams {
    fn default() -> Self {
        Self {
            ambient_intensity: 0.4,
            key_intensity: 1.8,
            key_color: HexColor::WHITE,
            key_position: [8.0, 12.0, 6.0],
            fill_intensity: 0.8,
            rim_intensity: 0.6,
        }
    }
}
