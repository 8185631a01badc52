//! CPU vertex displacement and the hover-driven displacement scale.
//!
//! Vertices move along their base normals by `height(uv) * scale + bias`.
//! The mesh is rewritten only when one of those inputs changes.

use bevy::picking::prelude::*;
use bevy::prelude::*;

use crate::geometry::{ensure_uv1, read_normals, read_positions, read_uvs};
use crate::material::PreviewSurface;
use crate::presets::HoverTargets;
use crate::store::ParamStore;
use crate::texture_ops::HeightField;

/// Blend factor of the per-frame approach toward the hover target
pub const HOVER_RATE: f32 = 0.1;

/// Distance at which the approach snaps onto the target
pub const HOVER_SNAP: f32 = 0.001;

/// One frame of the hover approach.
///
/// Not scaled by frame time: the approach is faster at higher frame rates.
pub fn approach(current: f32, target: f32) -> f32 {
    if (current - target).abs() < HOVER_SNAP {
        target
    } else {
        current + (target - current) * HOVER_RATE
    }
}

/// Displaced positions for every vertex
pub fn displace(
    base: &[[f32; 3]],
    normals: &[[f32; 3]],
    uvs: &[[f32; 2]],
    field: &HeightField,
    scale: f32,
    bias: f32,
    repeat: f32,
) -> Vec<[f32; 3]> {
    base.iter()
        .zip(normals)
        .zip(uvs)
        .map(|((p, n), uv)| {
            let offset = field.sample(uv[0] * repeat, uv[1] * repeat) * scale + bias;
            [p[0] + n[0] * offset, p[1] + n[1] * offset, p[2] + n[2] * offset]
        })
        .collect()
}

/// Subject whose mesh still needs its UV1 channel, tangents and base
/// snapshot. Setup works on a private copy so the source asset (possibly a
/// loaded model shared with a later mount) is never displaced.
#[derive(Component, Debug, Default)]
pub struct PendingMeshSetup;

#[derive(Debug, Clone, Copy, PartialEq)]
struct DisplacementInputs {
    scale: f32,
    bias: f32,
    repeat: f32,
    height_revision: u32,
}

/// Undisplaced vertex data of a subject mesh
#[derive(Component, Debug)]
pub struct DisplacementField {
    base_positions: Vec<[f32; 3]>,
    normals: Vec<[f32; 3]>,
    uvs: Vec<[f32; 2]>,
    applied: Option<DisplacementInputs>,
}

impl DisplacementField {
    pub fn from_mesh(mesh: &Mesh) -> Option<Self> {
        let base_positions = read_positions(mesh)?;
        let normals = read_normals(mesh)?;
        let uvs = read_uvs(mesh)?;
        if normals.len() != base_positions.len() || uvs.len() != base_positions.len() {
            return None;
        }
        Some(Self {
            base_positions,
            normals,
            uvs,
            applied: None,
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.base_positions.len()
    }
}

/// Displacement scale that eases toward a target while hovered
#[derive(Component, Debug, Clone, Copy)]
pub struct HoverDisplacement {
    pub current: f32,
    pub target: f32,
    pub targets: HoverTargets,
}

impl HoverDisplacement {
    pub fn new(initial: f32, targets: HoverTargets) -> Self {
        Self {
            current: initial,
            target: initial,
            targets,
        }
    }

    /// Advance one frame; returns whether the scale moved
    pub fn step(&mut self) -> bool {
        let next = approach(self.current, self.target);
        let moved = next != self.current;
        self.current = next;
        moved
    }
}

pub struct DisplacementPlugin;

impl Plugin for DisplacementPlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<MeshPickingPlugin>() {
            app.add_plugins(MeshPickingPlugin);
        }

        app.add_systems(
            Update,
            (
                prepare_subject_meshes,
                track_hover,
                step_hover.after(track_hover),
                apply_displacement
                    .after(prepare_subject_meshes)
                    .after(step_hover),
            ),
        );
    }
}

/// Finish meshes once their asset is available (OBJ models load late)
fn prepare_subject_meshes(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    pending: Query<(Entity, &Mesh3d), With<PendingMeshSetup>>,
) {
    for (entity, mesh3d) in pending.iter() {
        let Some(source) = meshes.get(&mesh3d.0) else {
            continue;
        };

        let mut mesh = source.clone();
        ensure_uv1(&mut mesh);
        if !mesh.contains_attribute(Mesh::ATTRIBUTE_TANGENT) {
            if let Err(err) = mesh.generate_tangents() {
                warn!("Could not generate tangents, normal map disabled: {err}");
            }
        }

        let field = DisplacementField::from_mesh(&mesh);
        let mut entity_commands = commands.entity(entity);
        entity_commands.remove::<PendingMeshSetup>();
        match field {
            Some(field) => {
                debug!("Displacement field captured: {} vertices", field.vertex_count());
                entity_commands.insert(field);
            }
            None => warn!("Subject mesh lacks positions, normals or UVs; not displaced"),
        }
        entity_commands.insert(Mesh3d(meshes.add(mesh)));
    }
}

fn track_hover(
    mut over_events: MessageReader<Pointer<Over>>,
    mut out_events: MessageReader<Pointer<Out>>,
    mut hovers: Query<&mut HoverDisplacement>,
) {
    for event in over_events.read() {
        if let Ok(mut hover) = hovers.get_mut(event.entity) {
            hover.target = hover.targets.over;
        }
    }
    for event in out_events.read() {
        if let Ok(mut hover) = hovers.get_mut(event.entity) {
            hover.target = hover.targets.out;
        }
    }
}

fn step_hover(mut hovers: Query<&mut HoverDisplacement>) {
    for mut hover in hovers.iter_mut() {
        if hover.current != hover.target {
            hover.step();
        }
    }
}

fn apply_displacement(
    store: Res<ParamStore>,
    surface: Option<Res<PreviewSurface>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut fields: Query<(&mut DisplacementField, &Mesh3d, Option<&HoverDisplacement>)>,
) {
    let Some(surface) = surface else {
        return;
    };
    let Some(height) = surface.height() else {
        return;
    };
    let material = store.params().material;

    for (mut field, mesh3d, hover) in fields.iter_mut() {
        let inputs = DisplacementInputs {
            scale: hover.map_or(material.displacement_scale, |h| h.current),
            bias: material.displacement_bias,
            repeat: material.texture_repeat,
            height_revision: surface.height_revision(),
        };
        if field.applied == Some(inputs) {
            continue;
        }

        let Some(mut mesh) = meshes.get_mut(&mesh3d.0) else {
            continue;
        };
        let positions = displace(
            &field.base_positions,
            &field.normals,
            &field.uvs,
            height,
            inputs.scale,
            inputs.bias,
            inputs.repeat,
        );
        mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
        field.applied = Some(inputs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    const TARGETS: HoverTargets = HoverTargets {
        over: 0.7,
        out: 0.001,
    };

    #[test]
    fn test_approach_moves_a_tenth() {
        assert!((approach(0.0, 1.0) - 0.1).abs() < 1e-6);
        assert_eq!(approach(0.7005, 0.7), 0.7);
    }

    #[test]
    fn test_hover_reaches_target_monotonically() {
        let mut hover = HoverDisplacement::new(0.03, TARGETS);
        hover.target = TARGETS.over;

        let mut previous = hover.current;
        let mut frames = 0;
        while hover.current != hover.target {
            hover.step();
            assert!(hover.current >= previous, "approach overshot backwards");
            assert!(hover.current <= TARGETS.over);
            previous = hover.current;
            frames += 1;
            assert!(frames < 200, "did not converge");
        }
        assert_eq!(hover.current, 0.7);
    }

    #[test]
    fn test_hover_out_settles_on_target() {
        let mut hover = HoverDisplacement::new(0.7, TARGETS);
        hover.target = TARGETS.out;
        for _ in 0..200 {
            hover.step();
        }
        assert_eq!(hover.current, 0.001);
        assert!(!hover.step());
    }

    #[test]
    fn test_displace_along_normals() {
        let field = HeightField::from_image(&RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 255])));
        let base = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]];
        let normals = [[0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
        let uvs = [[0.0, 0.0], [0.5, 0.5]];

        let out = displace(&base, &normals, &uvs, &field, 0.5, -0.1, 1.0);
        assert!((out[0][1] - 0.4).abs() < 1e-6);
        assert!((out[1][2] - 0.4).abs() < 1e-6);
        assert_eq!(out[1][0], 1.0);
    }

    #[test]
    fn test_zero_scale_keeps_base_positions() {
        let field = HeightField::from_image(&RgbaImage::from_pixel(1, 1, Rgba([90, 0, 0, 255])));
        let base = [[0.3, -0.2, 0.9]];
        let out = displace(&base, &[[0.0, 1.0, 0.0]], &[[0.2, 0.8]], &field, 0.0, 0.0, 3.0);
        assert_eq!(out, base.to_vec());
    }
}
