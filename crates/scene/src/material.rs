//! Subject material: texture bakes and store-driven scalars.
//!
//! The subject stays hidden until its whole texture bundle has loaded.
//! Derived maps are then baked on the CPU and re-baked when the parameter
//! they depend on changes.

use bevy::math::Affine2;
use bevy::pbr::UvChannel;
use bevy::prelude::*;
use swatch_ipc::{MaterialParams, SceneToPanel, TextureSelection};

use crate::presets::MaterialModel;
use crate::store::ParamStore;
use crate::texture_ops::{self, HeightField};
use crate::textures::{mipmapped_image, BundleStatus, SourceMaps, TextureBundle, TextureSet, TextureSlot};
use crate::{OutboundPanelMessages, PreviewSubject};

/// Rebakes are skipped for parameter changes smaller than this
const REBAKE_EPSILON: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceState {
    Loading,
    Ready,
    Failed,
}

/// A baked image and the parameter value it was baked with
#[derive(Debug, Clone)]
struct BakedImage {
    handle: Handle<Image>,
    baked_with: f32,
}

/// Material, texture bundle and derived maps of the mounted page's subject
#[derive(Resource)]
pub struct PreviewSurface {
    pub material: Handle<StandardMaterial>,
    model: MaterialModel,
    set: TextureSet,
    selection: TextureSelection,
    bundle: TextureBundle,
    state: SurfaceState,
    sources: Option<SourceMaps>,
    normal: Option<BakedImage>,
    occlusion: Option<BakedImage>,
    height: Option<HeightField>,
    height_revision: u32,
}

impl PreviewSurface {
    /// Start loading the bundle for `selection`
    pub fn new(
        material: Handle<StandardMaterial>,
        model: MaterialModel,
        set: TextureSet,
        selection: TextureSelection,
        asset_server: &AssetServer,
    ) -> Self {
        let bundle = TextureBundle::load(asset_server, &set.resolve(&selection));
        Self {
            material,
            model,
            set,
            selection,
            bundle,
            state: SurfaceState::Loading,
            sources: None,
            normal: None,
            occlusion: None,
            height: None,
            height_revision: 0,
        }
    }

    pub fn state(&self) -> SurfaceState {
        self.state
    }

    /// Height field for displacement, once textures are baked
    pub fn height(&self) -> Option<&HeightField> {
        self.height.as_ref()
    }

    /// Bumped whenever a new height field is installed
    pub fn height_revision(&self) -> u32 {
        self.height_revision
    }

    fn has_opacity(&self) -> bool {
        self.set.variant_count(TextureSlot::Opacity) > 0
    }

    /// Reload when the selection resolves to different files
    fn reselect(&mut self, selection: TextureSelection, asset_server: &AssetServer) -> bool {
        let next = self.set.resolve(&selection);
        self.selection = selection;
        if next == self.bundle.paths() {
            return false;
        }
        self.bundle = TextureBundle::load(asset_server, &next);
        self.state = SurfaceState::Loading;
        true
    }
}

/// Alpha handling for a material: cutout when `alpha_test` is positive,
/// blended when an opacity map is present, opaque otherwise
pub fn alpha_mode_for(alpha_test: f32, has_opacity: bool) -> AlphaMode {
    if alpha_test > 0.0 {
        AlphaMode::Mask(alpha_test)
    } else if has_opacity {
        AlphaMode::Blend
    } else {
        AlphaMode::Opaque
    }
}

/// Plugin baking and updating the subject material
pub struct SurfacePlugin;

impl Plugin for SurfacePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                reselect_textures,
                poll_surface_textures.after(reselect_textures),
                apply_material_params.after(poll_surface_textures),
            )
                .run_if(resource_exists::<PreviewSurface>),
        );
    }
}

fn set_subjects_visible(subjects: &mut Query<&mut Visibility, With<PreviewSubject>>, visible: bool) {
    for mut visibility in subjects.iter_mut() {
        *visibility = if visible {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
    }
}

fn reselect_textures(
    store: Res<ParamStore>,
    asset_server: Res<AssetServer>,
    mut surface: ResMut<PreviewSurface>,
    mut subjects: Query<&mut Visibility, With<PreviewSubject>>,
) {
    if !store.is_changed() || store.params().textures == surface.selection {
        return;
    }
    if surface.reselect(store.params().textures, &asset_server) {
        info!("Texture selection changed, reloading bundle");
        set_subjects_visible(&mut subjects, false);
    }
}

fn poll_surface_textures(
    asset_server: Res<AssetServer>,
    store: Res<ParamStore>,
    mut images: ResMut<Assets<Image>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut surface: ResMut<PreviewSurface>,
    mut outbound: ResMut<OutboundPanelMessages>,
    mut subjects: Query<&mut Visibility, With<PreviewSubject>>,
) {
    if surface.state != SurfaceState::Loading {
        return;
    }

    let loaded = match surface.bundle.poll(&asset_server) {
        BundleStatus::Loading => return,
        BundleStatus::Ready => surface.bundle.read_back(&images),
        BundleStatus::Failed(err) => Err(err),
    };

    let sources = match loaded {
        Ok(sources) => sources,
        Err(err) => {
            error!("{err}");
            outbound.send(SceneToPanel::TexturesFailed {
                path: err.path().to_string(),
                reason: err.reason().to_string(),
            });
            surface.state = SurfaceState::Failed;
            return;
        }
    };

    let params = store.params().material;
    bake_surface(&mut surface, sources, &params, &mut images, &mut materials);
    surface.state = SurfaceState::Ready;
    set_subjects_visible(&mut subjects, true);
    info!("Preview textures ready");
}

/// Bake every derived map from freshly loaded sources and bind them
fn bake_surface(
    surface: &mut PreviewSurface,
    sources: SourceMaps,
    params: &MaterialParams,
    images: &mut Assets<Image>,
    materials: &mut Assets<StandardMaterial>,
) {
    let opacity = sources.get(TextureSlot::Opacity);
    let base_color = sources
        .get(TextureSlot::BaseColor)
        .map(|color| images.add(mipmapped_image(&texture_ops::combine_base_alpha(color, opacity), true)));

    let metallic_roughness = texture_ops::pack_metallic_roughness(
        sources.get(TextureSlot::Roughness),
        sources.get(TextureSlot::Metallic),
    )
    .map(|packed| images.add(mipmapped_image(&packed, false)));

    let specular = sources
        .get(TextureSlot::Specular)
        .map(|level| images.add(mipmapped_image(&texture_ops::specular_from_level(level), false)));

    surface.normal = sources.get(TextureSlot::Normal).map(|normal| BakedImage {
        handle: images.add(mipmapped_image(
            &texture_ops::scale_normal_map(normal, params.normal_scale),
            false,
        )),
        baked_with: params.normal_scale,
    });

    surface.occlusion = sources.get(TextureSlot::AmbientOcclusion).map(|ao| BakedImage {
        handle: images.add(mipmapped_image(
            &texture_ops::apply_ao_intensity(ao, params.ao_map_intensity),
            false,
        )),
        baked_with: params.ao_map_intensity,
    });

    surface.height = sources.get(TextureSlot::Height).map(HeightField::from_image);
    surface.height_revision = surface.height_revision.wrapping_add(1);

    if let Some(mut material) = materials.get_mut(&surface.material) {
        material.base_color_texture = base_color;
        material.metallic_roughness_texture = metallic_roughness;
        material.specular_texture = specular;
        material.normal_map_texture = surface.normal.as_ref().map(|b| b.handle.clone());
        material.occlusion_texture = surface.occlusion.as_ref().map(|b| b.handle.clone());
        material.occlusion_channel = UvChannel::Uv1;
    }

    surface.sources = Some(sources);
}

/// Re-bake `baked` from `source` if `value` moved away from what it was baked with
fn rebake(
    baked: &mut Option<BakedImage>,
    source: Option<&image::RgbaImage>,
    value: f32,
    images: &mut Assets<Image>,
    bake: impl Fn(&image::RgbaImage, f32) -> image::RgbaImage,
) {
    let (Some(baked), Some(source)) = (baked.as_mut(), source) else {
        return;
    };
    if (baked.baked_with - value).abs() < REBAKE_EPSILON {
        return;
    }
    if let Some(mut image) = images.get_mut(&baked.handle) {
        *image = mipmapped_image(&bake(source, value), false);
    }
    baked.baked_with = value;
}

fn apply_material_params(
    store: Res<ParamStore>,
    mut surface: ResMut<PreviewSurface>,
    mut images: ResMut<Assets<Image>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    if surface.state != SurfaceState::Ready || !(store.is_changed() || surface.is_changed()) {
        return;
    }
    let params = store.params().material;

    let surface = &mut *surface;
    if let Some(sources) = &surface.sources {
        rebake(
            &mut surface.normal,
            sources.get(TextureSlot::Normal),
            params.normal_scale,
            &mut images,
            texture_ops::scale_normal_map,
        );
        rebake(
            &mut surface.occlusion,
            sources.get(TextureSlot::AmbientOcclusion),
            params.ao_map_intensity,
            &mut images,
            texture_ops::apply_ao_intensity,
        );
    }

    let alpha_mode = alpha_mode_for(params.alpha_test, surface.has_opacity());
    let Some(mut material) = materials.get_mut(&surface.material) else {
        return;
    };
    material.perceptual_roughness = params.roughness.clamp(0.0, 1.0);
    material.metallic = params.metalness.clamp(0.0, 1.0);
    material.alpha_mode = alpha_mode;
    material.uv_transform = Affine2::from_scale(Vec2::splat(params.texture_repeat.max(0.01)));
    if surface.model == MaterialModel::Physical {
        material.clearcoat = 1.0;
        material.clearcoat_perceptual_roughness = (params.roughness * 0.5).clamp(0.0, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alpha_mode_selection() {
        assert_eq!(alpha_mode_for(0.1, true), AlphaMode::Mask(0.1));
        assert_eq!(alpha_mode_for(0.1, false), AlphaMode::Mask(0.1));
        assert_eq!(alpha_mode_for(0.0, true), AlphaMode::Blend);
        assert_eq!(alpha_mode_for(0.0, false), AlphaMode::Opaque);
    }
}
