//! Texture variant selection.

use serde::{Deserialize, Serialize};

/// Index into each page's alternative maps for the swappable slots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextureSelection {
    pub albedo: usize,
    pub normal: usize,
    pub displacement: usize,
}
