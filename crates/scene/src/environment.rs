//! Image-based environment lighting on the preview camera

use bevy::core_pipeline::Skybox;
use bevy::light::EnvironmentMapLight;
use bevy::prelude::*;

use crate::camera::MainCamera;
use crate::presets::EnvironmentSpec;
use crate::store::ParamStore;

/// Environment light intensity at an envMapIntensity of 1
pub const ENV_INTENSITY_PER_UNIT: f32 = 1_500.0;

/// Skybox brightness when the environment is shown as background
pub const SKYBOX_BRIGHTNESS: f32 = 1_000.0;

/// Environment light (and optional skybox) for a camera
pub fn environment_components(
    asset_server: &AssetServer,
    spec: &EnvironmentSpec,
    env_map_intensity: f32,
) -> (EnvironmentMapLight, Option<Skybox>) {
    let diffuse_map = asset_server.load(spec.preset.diffuse_path());
    let specular_map: Handle<Image> = asset_server.load(spec.preset.specular_path());

    let skybox = spec.background.then(|| Skybox {
        image: specular_map.clone(),
        brightness: SKYBOX_BRIGHTNESS,
        ..default()
    });

    let light = EnvironmentMapLight {
        diffuse_map,
        specular_map,
        intensity: env_map_intensity * ENV_INTENSITY_PER_UNIT,
        ..default()
    };
    (light, skybox)
}

pub struct EnvironmentPlugin;

impl Plugin for EnvironmentPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, update_environment_intensity);
    }
}

fn update_environment_intensity(
    store: Res<ParamStore>,
    mut query: Query<&mut EnvironmentMapLight, With<MainCamera>>,
) {
    if !store.is_changed() {
        return;
    }
    let intensity = store.params().material.env_map_intensity * ENV_INTENSITY_PER_UNIT;
    for mut light in query.iter_mut() {
        light.intensity = intensity;
    }
}
