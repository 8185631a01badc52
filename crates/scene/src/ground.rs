//! Ground surfaces under the subject

use bevy::light::NotShadowCaster;
use bevy::prelude::*;

use crate::lighting::to_color;
use crate::presets::{ContactShadowSpec, GroundSpec};
use crate::texture_ops::contact_shadow;
use crate::textures::mipmapped_image;
use crate::PreviewEntity;

/// Resolution of the generated contact shadow texture
const CONTACT_SHADOW_RESOLUTION: u32 = 256;

/// Lift of the contact shadow quad above the ground to avoid z-fighting
const CONTACT_SHADOW_LIFT: f32 = 0.01;

pub fn spawn_ground(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    images: &mut Assets<Image>,
    spec: &GroundSpec,
) {
    match *spec {
        GroundSpec::Plane {
            y,
            size,
            color,
            contact_shadow,
        } => {
            commands.spawn((
                Mesh3d(meshes.add(Plane3d::default().mesh().size(size, size))),
                MeshMaterial3d(materials.add(StandardMaterial {
                    base_color: to_color(color),
                    perceptual_roughness: 0.9,
                    metallic: 0.05,
                    ..default()
                })),
                Transform::from_xyz(0.0, y, 0.0),
                Name::new("Ground"),
                PreviewEntity,
            ));

            if let Some(shadow) = contact_shadow {
                spawn_contact_shadow(commands, meshes, materials, images, y, &shadow);
            }
        }
        GroundSpec::Slab { size, color } => {
            commands.spawn((
                Mesh3d(meshes.add(Cuboid::new(size.x, size.y, size.z))),
                MeshMaterial3d(materials.add(StandardMaterial {
                    base_color: to_color(color),
                    perceptual_roughness: 0.9,
                    metallic: 0.05,
                    ..default()
                })),
                Transform::from_xyz(0.0, -size.y / 2.0, 0.0),
                Name::new("Floor"),
                PreviewEntity,
            ));
        }
    }
}

/// Unlit quad with a radial falloff texture approximating contact shadows
fn spawn_contact_shadow(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    images: &mut Assets<Image>,
    ground_y: f32,
    spec: &ContactShadowSpec,
) {
    let texture = contact_shadow(CONTACT_SHADOW_RESOLUTION, spec.opacity, spec.blur);
    let image = images.add(mipmapped_image(&texture, true));

    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(spec.scale, spec.scale))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color_texture: Some(image),
            unlit: true,
            alpha_mode: AlphaMode::Blend,
            ..default()
        })),
        Transform::from_xyz(0.0, ground_y + CONTACT_SHADOW_LIFT, 0.0),
        NotShadowCaster,
        Name::new("Contact Shadow"),
        PreviewEntity,
    ));
}
