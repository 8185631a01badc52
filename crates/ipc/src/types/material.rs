//! Material parameter set.

use serde::{Deserialize, Serialize};

/// Scalar coefficients applied to the PBR material of the previewed mesh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MaterialParams {
    /// Multiplies the roughness map
    pub roughness: f32,
    /// Multiplies the metalness map
    pub metalness: f32,
    /// Strength of the ambient occlusion map (0 disables it)
    pub ao_map_intensity: f32,
    /// How far the height map pushes vertices along their normals
    pub displacement_scale: f32,
    /// Constant offset added to every displaced vertex
    pub displacement_bias: f32,
    /// Strength of environment map reflections
    pub env_map_intensity: f32,
    /// Alpha cutoff; 0 means blended transparency
    pub alpha_test: f32,
    /// Strength of the normal map perturbation
    pub normal_scale: f32,
    /// UV tiling factor for every map
    pub texture_repeat: f32,
}

impl Default for MaterialParams {
    fn default() -> Self {
        Self {
            roughness: 0.3,
            metalness: 0.1,
            ao_map_intensity: 1.5,
            displacement_scale: 0.02,
            displacement_bias: 0.0,
            env_map_intensity: 0.8,
            alpha_test: 0.1,
            normal_scale: 1.0,
            texture_repeat: 1.0,
        }
    }
}
