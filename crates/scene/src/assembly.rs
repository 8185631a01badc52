//! Mounting and unmounting preview pages.
//!
//! Entering a page state spawns its camera, lights, ground and subject and
//! resets the parameter store to the page defaults. Leaving it despawns
//! everything tagged [`PreviewEntity`].

use bevy::camera::ClearColorConfig;
use bevy::core_pipeline::tonemapping::Tonemapping;
use bevy::ecs::system::EntityCommands;
use bevy::prelude::*;

use crate::animation::IdleSpin;
use crate::camera::{MainCamera, OrbitCamera};
use crate::displacement::{HoverDisplacement, PendingMeshSetup};
use crate::environment::environment_components;
use crate::geometry::{rounded_box, subdivided_plane};
use crate::ground::spawn_ground;
use crate::lighting::spawn_light_rig;
use crate::material::PreviewSurface;
use crate::pages::PreviewPage;
use crate::presets::{CameraSpec, PagePreset, SubjectShape};
use crate::store::ParamStore;
use crate::{PreviewEntity, PreviewSubject};

/// Background of pages without a 3D scene
const PAGE_BACKGROUND: Color = Color::srgb(0.957, 0.965, 0.98);

/// The preset of the mounted page, absent on pages without a scene
#[derive(Resource, Debug, Clone)]
pub struct ActivePreset {
    pub page: PreviewPage,
    pub preset: PagePreset,
}

/// JSON parameter overrides applied over the defaults of every mounted page
#[derive(Resource, Debug, Clone)]
pub struct ParamOverrides(pub String);

pub struct PageAssemblyPlugin;

impl Plugin for PageAssemblyPlugin {
    fn build(&self, app: &mut App) {
        for page in PreviewPage::ALL {
            app.add_systems(OnEnter(page), mount_page)
                .add_systems(OnExit(page), unmount_page);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn mount_page(
    mut commands: Commands,
    page: Res<State<PreviewPage>>,
    overrides: Option<Res<ParamOverrides>>,
    asset_server: Res<AssetServer>,
    mut store: ResMut<ParamStore>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut images: ResMut<Assets<Image>>,
) {
    let page = *page.get();
    let Some(preset) = PagePreset::for_page(page) else {
        // Pages without a scene still need a camera to clear and draw UI
        commands.spawn((
            Camera2d,
            Camera {
                clear_color: ClearColorConfig::Custom(PAGE_BACKGROUND),
                ..default()
            },
            PreviewEntity,
        ));
        info!("Mounted {} (no scene)", page.label());
        return;
    };

    store.load_page(preset.defaults);
    if let Some(overrides) = overrides {
        match store.apply_overrides(&overrides.0) {
            Ok(changed) if !changed.is_empty() => {
                info!("Applied {} parameter overrides", changed.len());
            }
            Ok(_) => {}
            Err(err) => warn!("Ignoring parameter overrides: {err}"),
        }
    }
    let params = *store.params();

    let mut orbit = OrbitCamera::from_position(preset.camera.position, preset.camera.target);
    orbit.set_limits(&params.camera);
    spawn_camera(&mut commands, &asset_server, &preset, params.material.env_map_intensity)
        .insert(orbit);

    spawn_light_rig(&mut commands, &preset.lights, &params.lighting);

    if let Some(ground) = &preset.ground {
        spawn_ground(&mut commands, &mut meshes, &mut materials, &mut images, ground);
    }

    let mesh = match &preset.subject.shape {
        SubjectShape::RoundedBox {
            size,
            radius,
            smoothness,
        } => meshes.add(rounded_box(*size, *radius, *smoothness)),
        SubjectShape::Plane {
            width,
            height,
            columns,
            rows,
        } => meshes.add(subdivided_plane(*width, *height, *columns, *rows)),
        SubjectShape::Sphere {
            radius,
            sectors,
            stacks,
        } => meshes.add(
            Sphere::new(*radius)
                .mesh()
                .uv(*sectors, *stacks),
        ),
        SubjectShape::Model { path } => asset_server.load(*path),
    };

    let material = materials.add(StandardMaterial {
        perceptual_roughness: params.material.roughness,
        metallic: params.material.metalness,
        ..default()
    });

    for (index, position) in preset.subject.instances.iter().enumerate() {
        let transform = Transform::from_translation(*position);
        let mut subject = commands.spawn((
            Mesh3d(mesh.clone()),
            MeshMaterial3d(material.clone()),
            transform,
            Visibility::Hidden,
            Name::new(format!("{} subject {index}", page.label())),
            PreviewSubject,
            PreviewEntity,
            PendingMeshSetup,
        ));
        if preset.subject.idle_spin {
            subject.insert(IdleSpin {
                base: transform.rotation,
            });
        }
        if let Some(targets) = preset.subject.hover {
            subject.insert(HoverDisplacement::new(
                params.material.displacement_scale,
                targets,
            ));
        }
    }

    commands.insert_resource(PreviewSurface::new(
        material,
        preset.material_model,
        preset.textures.clone(),
        params.textures,
        &asset_server,
    ));

    info!(
        "Mounted {} ({} instance(s), {} texture slot(s))",
        page.label(),
        preset.subject.instances.len(),
        preset.textures.sources().len()
    );
    commands.insert_resource(ActivePreset { page, preset });
}

fn spawn_camera<'a>(
    commands: &'a mut Commands,
    asset_server: &AssetServer,
    preset: &PagePreset,
    env_map_intensity: f32,
) -> EntityCommands<'a> {
    let CameraSpec {
        position,
        target,
        fov_degrees,
        near,
        far,
    } = preset.camera;
    let (environment, skybox) =
        environment_components(asset_server, &preset.environment, env_map_intensity);

    let mut camera = commands.spawn((
        Camera3d::default(),
        Projection::from(PerspectiveProjection {
            fov: fov_degrees.to_radians(),
            near,
            far,
            ..default()
        }),
        Transform::from_translation(position).looking_at(target, Vec3::Y),
        Tonemapping::AcesFitted,
        environment,
        MainCamera,
        PreviewEntity,
    ));
    if let Some(skybox) = skybox {
        camera.insert(skybox);
    }
    camera
}

fn unmount_page(mut commands: Commands, entities: Query<Entity, With<PreviewEntity>>) {
    for entity in entities.iter() {
        commands.entity(entity).despawn();
    }
    commands.remove_resource::<PreviewSurface>();
    commands.remove_resource::<ActivePreset>();
}
