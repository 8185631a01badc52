//! Store-driven page lighting: ambient, key, fill and rim lights plus the
//! fixed accent and point lights some pages add.

use std::f32::consts::PI;

use bevy::ecs::system::EntityCommands;
use bevy::light::{CascadeShadowConfigBuilder, GlobalAmbientLight};
use bevy::prelude::*;
use swatch_ipc::{HexColor, LightingParams};

use crate::presets::{DirectionalSpec, LightRig, PointSpec};
use crate::store::ParamStore;
use crate::PreviewEntity;

/// Illuminance in lux of a directional light at intensity 1
pub const LUX_PER_UNIT: f32 = 5_000.0;

/// Ambient brightness at intensity 1
pub const AMBIENT_PER_UNIT: f32 = 500.0;

/// Luminous power of a point light at intensity 1 (one candela, scaled
/// like the directional lights)
pub const LUMENS_PER_UNIT: f32 = 4.0 * PI * LUX_PER_UNIT;

/// Marker component for the store-driven key light
#[derive(Component)]
pub struct KeyLight;

/// Directional light whose intensity follows one store parameter
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaledLight {
    Fill,
    Rim,
}

impl ScaledLight {
    fn intensity(self, params: &LightingParams) -> f32 {
        match self {
            ScaledLight::Fill => params.fill_intensity,
            ScaledLight::Rim => params.rim_intensity,
        }
    }
}

pub fn to_color(color: HexColor) -> Color {
    let [r, g, b] = color.to_srgb_f32();
    Color::srgb(r, g, b)
}

/// Transform of a light placed at `position` shining toward the origin
pub fn aimed_at_origin(position: Vec3) -> Transform {
    if position.length_squared() < 1e-6 {
        return Transform::default().looking_to(Vec3::NEG_Y, Vec3::Z);
    }
    let up = if position.normalize().abs().y > 0.999 {
        Vec3::Z
    } else {
        Vec3::Y
    };
    Transform::from_translation(position).looking_at(Vec3::ZERO, up)
}

/// Plugin applying lighting parameters to the mounted page's lights
pub struct LightingPlugin;

impl Plugin for LightingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GlobalAmbientLight>()
            .add_systems(Update, update_lighting);
    }
}

/// Spawn the lights of a rig with the given starting parameters
pub fn spawn_light_rig(commands: &mut Commands, rig: &LightRig, params: &LightingParams) {
    if rig.key {
        let cascades = CascadeShadowConfigBuilder {
            first_cascade_far_bound: 5.0,
            maximum_distance: 25.0,
            ..default()
        }
        .build();

        commands.spawn((
            DirectionalLight {
                illuminance: params.key_intensity * LUX_PER_UNIT,
                color: to_color(params.key_color),
                shadows_enabled: true,
                ..default()
            },
            cascades,
            aimed_at_origin(Vec3::from_array(params.key_position)),
            KeyLight,
            PreviewEntity,
        ));
    }

    for (spec, role) in [(rig.fill, ScaledLight::Fill), (rig.rim, ScaledLight::Rim)] {
        if let Some(spec) = spec {
            spawn_directional(commands, &spec, role.intensity(params)).insert(role);
        }
    }

    for accent in &rig.accents {
        spawn_directional(commands, accent, accent.intensity);
    }

    if let Some(point) = &rig.point {
        spawn_point(commands, point);
    }
}

fn spawn_directional<'a>(
    commands: &'a mut Commands,
    spec: &DirectionalSpec,
    intensity: f32,
) -> EntityCommands<'a> {
    commands.spawn((
        DirectionalLight {
            illuminance: intensity * LUX_PER_UNIT,
            color: to_color(spec.color),
            ..default()
        },
        aimed_at_origin(spec.position),
        PreviewEntity,
    ))
}

fn spawn_point(commands: &mut Commands, spec: &PointSpec) {
    commands.spawn((
        PointLight {
            intensity: spec.intensity * LUMENS_PER_UNIT,
            color: to_color(spec.color),
            range: spec.range,
            ..default()
        },
        Transform::from_translation(spec.position),
        PreviewEntity,
    ));
}

/// Update lights when lighting parameters change
fn update_lighting(
    store: Res<ParamStore>,
    mut key_query: Query<(&mut DirectionalLight, &mut Transform), With<KeyLight>>,
    mut scaled_query: Query<(&mut DirectionalLight, &ScaledLight), Without<KeyLight>>,
    mut ambient_light: ResMut<GlobalAmbientLight>,
) {
    if !store.is_changed() {
        return;
    }
    let params = &store.params().lighting;

    for (mut light, mut transform) in key_query.iter_mut() {
        light.illuminance = params.key_intensity * LUX_PER_UNIT;
        light.color = to_color(params.key_color);
        *transform = aimed_at_origin(Vec3::from_array(params.key_position));
    }

    for (mut light, role) in scaled_query.iter_mut() {
        light.illuminance = role.intensity(params) * LUX_PER_UNIT;
    }

    ambient_light.color = Color::WHITE;
    ambient_light.brightness = params.ambient_intensity * AMBIENT_PER_UNIT;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_light_faces_origin() {
        let transform = aimed_at_origin(Vec3::new(8.0, 12.0, 6.0));
        let forward = transform.forward();
        let expected = -Vec3::new(8.0, 12.0, 6.0).normalize();
        assert!(forward.dot(expected) > 0.9999);
    }

    #[test]
    fn test_light_overhead_and_at_origin() {
        let overhead = aimed_at_origin(Vec3::new(0.0, 10.0, 0.0));
        assert!(overhead.forward().dot(Vec3::NEG_Y) > 0.9999);

        let degenerate = aimed_at_origin(Vec3::ZERO);
        assert!(degenerate.forward().dot(Vec3::NEG_Y) > 0.9999);
    }

    #[test]
    fn test_scaled_light_reads_its_param() {
        let params = LightingParams::default();
        assert_eq!(ScaledLight::Fill.intensity(&params), 0.8);
        assert_eq!(ScaledLight::Rim.intensity(&params), 0.6);
    }

    #[test]
    fn test_hex_to_color() {
        let color = to_color(HexColor::rgb(0xff, 0x00, 0x80)).to_srgba();
        assert!((color.red - 1.0).abs() < 1e-6);
        assert!((color.blue - 128.0 / 255.0).abs() < 1e-6);
    }
}
