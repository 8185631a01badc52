//! Texture bundles: the ordered PBR maps a page loads at mount.
//!
//! A bundle is requested once through the asset server, polled each frame
//! until every map has loaded or one has failed, and dropped with the page.

use bevy::asset::{LoadState, RenderAssetUsages};
use bevy::image::{
    ImageAddressMode, ImageFilterMode, ImageLoaderSettings, ImageSampler, ImageSamplerDescriptor,
};
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use image::RgbaImage;
use swatch_ipc::TextureSelection;

use crate::texture_ops;

/// Role of one map within a bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    BaseColor,
    Normal,
    Roughness,
    Metallic,
    AmbientOcclusion,
    Height,
    Opacity,
    Specular,
}

impl TextureSlot {
    pub const ALL: [TextureSlot; 8] = [
        TextureSlot::BaseColor,
        TextureSlot::Normal,
        TextureSlot::Roughness,
        TextureSlot::Metallic,
        TextureSlot::AmbientOcclusion,
        TextureSlot::Height,
        TextureSlot::Opacity,
        TextureSlot::Specular,
    ];

    /// Color maps are sampled as sRGB, everything else as linear data
    pub fn is_srgb(self) -> bool {
        matches!(self, TextureSlot::BaseColor)
    }

    fn selected_variant(self, selection: &TextureSelection) -> usize {
        match self {
            TextureSlot::BaseColor => selection.albedo,
            TextureSlot::Normal => selection.normal,
            TextureSlot::Height => selection.displacement,
            _ => 0,
        }
    }
}

/// Errors raised while loading or decoding a bundle
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TextureLoadError {
    #[error("Failed to load texture {path}: {reason}")]
    Load { path: String, reason: String },

    #[error("Texture {path} cannot be read back for baking: {reason}")]
    Decode { path: String, reason: String },
}

impl TextureLoadError {
    pub fn path(&self) -> &str {
        match self {
            TextureLoadError::Load { path, .. } | TextureLoadError::Decode { path, .. } => path,
        }
    }

    pub fn reason(&self) -> &str {
        match self {
            TextureLoadError::Load { reason, .. } | TextureLoadError::Decode { reason, .. } => {
                reason
            }
        }
    }
}

/// Candidate paths for one slot. Slots with several variants are picked by
/// the texture selection parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureSource {
    pub slot: TextureSlot,
    pub variants: Vec<String>,
}

/// The fixed, ordered list of maps a page uses
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextureSet {
    sources: Vec<TextureSource>,
}

impl TextureSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, slot: TextureSlot, path: &str) -> Self {
        self.with_variants(slot, &[path])
    }

    pub fn with_variants(mut self, slot: TextureSlot, paths: &[&str]) -> Self {
        self.sources.push(TextureSource {
            slot,
            variants: paths.iter().map(|p| p.to_string()).collect(),
        });
        self
    }

    /// One entry per slot using `{prefix}{slot name}{suffix}`, the naming
    /// of exported material folders.
    pub fn material_folder(prefix: &str, suffix: &str, slots: &[TextureSlot]) -> Self {
        slots.iter().fold(Self::new(), |set, &slot| {
            let name = match slot {
                TextureSlot::BaseColor => "BaseColor",
                TextureSlot::Normal => "Normal",
                TextureSlot::Roughness => "Roughness",
                TextureSlot::Metallic => "Metallic",
                TextureSlot::AmbientOcclusion => "AmbientOcclusion",
                TextureSlot::Height => "Height",
                TextureSlot::Opacity => "Opacity",
                TextureSlot::Specular => "SpecularLevel",
            };
            set.with(slot, &format!("{prefix}{name}{suffix}"))
        })
    }

    pub fn sources(&self) -> &[TextureSource] {
        &self.sources
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Number of variants offered for a slot (0 if the slot is unused)
    pub fn variant_count(&self, slot: TextureSlot) -> usize {
        self.sources
            .iter()
            .find(|s| s.slot == slot)
            .map_or(0, |s| s.variants.len())
    }

    /// Concrete `(slot, path)` list for a selection, in declaration order.
    /// Out-of-range variant indices fall back to the last variant.
    pub fn resolve(&self, selection: &TextureSelection) -> Vec<(TextureSlot, String)> {
        self.sources
            .iter()
            .filter_map(|source| {
                let last = source.variants.len().checked_sub(1)?;
                let index = source.slot.selected_variant(selection).min(last);
                Some((source.slot, source.variants[index].clone()))
            })
            .collect()
    }
}

/// Repeat-wrapping trilinear sampler used for every preview map
pub fn repeat_trilinear() -> ImageSamplerDescriptor {
    ImageSamplerDescriptor {
        address_mode_u: ImageAddressMode::Repeat,
        address_mode_v: ImageAddressMode::Repeat,
        address_mode_w: ImageAddressMode::Repeat,
        mag_filter: ImageFilterMode::Linear,
        min_filter: ImageFilterMode::Linear,
        mipmap_filter: ImageFilterMode::Linear,
        ..default()
    }
}

#[derive(Debug, Clone)]
struct BundleEntry {
    slot: TextureSlot,
    path: String,
    handle: Handle<Image>,
}

/// Load progress of a bundle
#[derive(Debug, Clone, PartialEq)]
pub enum BundleStatus {
    Loading,
    Ready,
    Failed(TextureLoadError),
}

/// Handles for one resolved texture list
#[derive(Debug, Clone, Default)]
pub struct TextureBundle {
    entries: Vec<BundleEntry>,
}

impl TextureBundle {
    /// Request every map. Images stay readable on the CPU so they can be baked.
    pub fn load(asset_server: &AssetServer, paths: &[(TextureSlot, String)]) -> Self {
        let entries = paths
            .iter()
            .map(|(slot, path)| {
                let is_srgb = slot.is_srgb();
                let handle = asset_server.load_with_settings(
                    path.clone(),
                    move |settings: &mut ImageLoaderSettings| {
                        settings.is_srgb = is_srgb;
                        settings.sampler = ImageSampler::Descriptor(repeat_trilinear());
                        settings.asset_usage =
                            RenderAssetUsages::MAIN_WORLD | RenderAssetUsages::RENDER_WORLD;
                    },
                );
                BundleEntry {
                    slot: *slot,
                    path: path.clone(),
                    handle,
                }
            })
            .collect();
        Self { entries }
    }

    pub fn paths(&self) -> Vec<(TextureSlot, String)> {
        self.entries
            .iter()
            .map(|e| (e.slot, e.path.clone()))
            .collect()
    }

    /// Ready once every map has loaded; the first failure wins
    pub fn poll(&self, asset_server: &AssetServer) -> BundleStatus {
        let mut pending = false;
        for entry in &self.entries {
            match asset_server.get_load_state(entry.handle.id()) {
                Some(LoadState::Loaded) => {}
                Some(LoadState::Failed(err)) => {
                    return BundleStatus::Failed(TextureLoadError::Load {
                        path: entry.path.clone(),
                        reason: err.to_string(),
                    });
                }
                _ => pending = true,
            }
        }
        if pending {
            BundleStatus::Loading
        } else {
            BundleStatus::Ready
        }
    }

    /// CPU copies of every loaded map
    pub fn read_back(&self, images: &Assets<Image>) -> Result<SourceMaps, TextureLoadError> {
        let mut maps = SourceMaps::default();
        for entry in &self.entries {
            let image = images.get(&entry.handle).ok_or_else(|| TextureLoadError::Decode {
                path: entry.path.clone(),
                reason: "image is no longer loaded".to_string(),
            })?;
            let dynamic = image
                .clone()
                .try_into_dynamic()
                .map_err(|err| TextureLoadError::Decode {
                    path: entry.path.clone(),
                    reason: err.to_string(),
                })?;
            maps.insert(entry.slot, dynamic.to_rgba8());
        }
        Ok(maps)
    }
}

/// Decoded source maps kept on the CPU for re-baking
#[derive(Debug, Clone, Default)]
pub struct SourceMaps {
    maps: Vec<(TextureSlot, RgbaImage)>,
}

impl SourceMaps {
    pub fn insert(&mut self, slot: TextureSlot, image: RgbaImage) {
        self.maps.retain(|(s, _)| *s != slot);
        self.maps.push((slot, image));
    }

    pub fn get(&self, slot: TextureSlot) -> Option<&RgbaImage> {
        self.maps
            .iter()
            .find(|(s, _)| *s == slot)
            .map(|(_, image)| image)
    }
}

/// GPU image with a full mip chain and the preview sampler
pub fn mipmapped_image(rgba: &RgbaImage, srgb: bool) -> Image {
    let (width, height) = rgba.dimensions();
    let format = if srgb {
        TextureFormat::Rgba8UnormSrgb
    } else {
        TextureFormat::Rgba8Unorm
    };

    let mut image = Image::new(
        Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        rgba.as_raw().clone(),
        format,
        RenderAssetUsages::RENDER_WORLD,
    );

    let (data, levels) = texture_ops::build_mip_chain(rgba);
    image.data = Some(data);
    image.texture_descriptor.mip_level_count = levels;
    image.sampler = ImageSampler::Descriptor(repeat_trilinear());
    image
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flowers() -> TextureSet {
        TextureSet::new()
            .with_variants(TextureSlot::BaseColor, &["albedoOG.png", "AI_color.png"])
            .with_variants(TextureSlot::Normal, &["normalsColored.png", "normalsEmboss.png"])
            .with(TextureSlot::Roughness, "roughness.png")
            .with_variants(TextureSlot::Height, &["displacementGrayscale.png", "Blur.png"])
    }

    #[test]
    fn test_resolve_default_selection() {
        let resolved = flowers().resolve(&TextureSelection::default());
        assert_eq!(
            resolved,
            vec![
                (TextureSlot::BaseColor, "albedoOG.png".to_string()),
                (TextureSlot::Normal, "normalsColored.png".to_string()),
                (TextureSlot::Roughness, "roughness.png".to_string()),
                (TextureSlot::Height, "displacementGrayscale.png".to_string()),
            ]
        );
    }

    #[test]
    fn test_resolve_variants_and_clamp() {
        let selection = TextureSelection {
            albedo: 1,
            normal: 7,
            displacement: 1,
        };
        let resolved = flowers().resolve(&selection);
        assert_eq!(resolved[0].1, "AI_color.png");
        assert_eq!(resolved[1].1, "normalsEmboss.png");
        assert_eq!(resolved[3].1, "Blur.png");
    }

    #[test]
    fn test_material_folder_naming() {
        let set = TextureSet::material_folder(
            "window1_metallicSquare/",
            ".jpg",
            &[TextureSlot::BaseColor, TextureSlot::Specular],
        );
        let resolved = set.resolve(&TextureSelection::default());
        assert_eq!(resolved[0].1, "window1_metallicSquare/BaseColor.jpg");
        assert_eq!(resolved[1].1, "window1_metallicSquare/SpecularLevel.jpg");
    }

    #[test]
    fn test_variant_count() {
        let set = flowers();
        assert_eq!(set.variant_count(TextureSlot::BaseColor), 2);
        assert_eq!(set.variant_count(TextureSlot::Roughness), 1);
        assert_eq!(set.variant_count(TextureSlot::Opacity), 0);
    }

    #[test]
    fn test_only_base_color_is_srgb() {
        let srgb: Vec<_> = TextureSlot::ALL.into_iter().filter(|s| s.is_srgb()).collect();
        assert_eq!(srgb, vec![TextureSlot::BaseColor]);
    }

    #[test]
    fn test_mipmapped_image_levels() {
        let rgba = RgbaImage::from_pixel(16, 8, image::Rgba([10, 20, 30, 255]));
        let image = mipmapped_image(&rgba, true);
        assert_eq!(image.texture_descriptor.mip_level_count, 5);
        assert_eq!(image.texture_descriptor.format, TextureFormat::Rgba8UnormSrgb);
        assert_eq!(image.data.as_ref().map(Vec::len), Some((128 + 32 + 8 + 2 + 1) * 4));
    }

    #[test]
    fn test_source_maps_replace_slot() {
        let mut maps = SourceMaps::default();
        maps.insert(TextureSlot::Height, RgbaImage::new(1, 1));
        maps.insert(TextureSlot::Height, RgbaImage::new(2, 2));
        assert_eq!(maps.get(TextureSlot::Height).map(|i| i.width()), Some(2));
        assert!(maps.get(TextureSlot::Normal).is_none());
    }
}
