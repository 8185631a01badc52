//! Procedural preview meshes and vertex attribute helpers

use bevy::asset::RenderAssetUsages;
use bevy::mesh::{Indices, PrimitiveTopology, VertexAttributeValues};
use bevy::prelude::*;

/// Faces of a cube as (normal, u axis, v axis) with `u x v = normal`
const CUBE_FACES: [(Vec3, Vec3, Vec3); 6] = [
    (Vec3::X, Vec3::NEG_Z, Vec3::Y),
    (Vec3::NEG_X, Vec3::Z, Vec3::Y),
    (Vec3::Y, Vec3::X, Vec3::NEG_Z),
    (Vec3::NEG_Y, Vec3::X, Vec3::Z),
    (Vec3::Z, Vec3::X, Vec3::Y),
    (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
];

/// Coordinates along one cube axis from `-half` to `half`.
///
/// Each rounded band gets `smoothness` segments spaced evenly in angle so
/// the pulled vertices land evenly on the corner arc.
fn axis_stops(half: f32, radius: f32, smoothness: u32) -> Vec<f32> {
    if radius <= 0.0 || smoothness == 0 {
        return vec![-half, half];
    }
    let inner = half - radius;
    let mut stops = Vec::with_capacity(2 * smoothness as usize + 2);
    for k in 0..=smoothness {
        let theta = k as f32 / smoothness as f32 * std::f32::consts::FRAC_PI_2;
        stops.push(-inner - radius * theta.cos());
    }
    for k in (0..=smoothness).rev() {
        let theta = k as f32 / smoothness as f32 * std::f32::consts::FRAC_PI_2;
        stops.push(inner + radius * theta.cos());
    }
    stops
}

/// Box of the given size whose edges and corners are rounded by `radius`.
///
/// Every face is a grid whose vertices are pushed out onto a sphere of
/// `radius` around the nearest point of the inner box. Faces carry their
/// own [0, 1] UVs.
pub fn rounded_box(size: Vec3, radius: f32, smoothness: u32) -> Mesh {
    let half = size / 2.0;
    let radius = radius.clamp(0.0, half.min_element());
    let inner = half - Vec3::splat(radius);

    let mut positions: Vec<[f32; 3]> = Vec::new();
    let mut normals: Vec<[f32; 3]> = Vec::new();
    let mut uvs: Vec<[f32; 2]> = Vec::new();
    let mut indices: Vec<u32> = Vec::new();

    for (normal, u_axis, v_axis) in CUBE_FACES {
        let depth = normal.abs().dot(half);
        let u_half = u_axis.abs().dot(half);
        let v_half = v_axis.abs().dot(half);
        let u_stops = axis_stops(u_half, radius, smoothness);
        let v_stops = axis_stops(v_half, radius, smoothness);

        let base = positions.len() as u32;
        let columns = u_stops.len() as u32;

        for &b in &v_stops {
            for &a in &u_stops {
                let flat = normal * depth + u_axis * a + v_axis * b;
                let core = flat.clamp(-inner, inner);
                let offset = flat - core;
                let (position, vertex_normal) = match offset.try_normalize() {
                    Some(dir) if radius > 0.0 => (core + dir * radius, dir),
                    _ => (flat, normal),
                };

                positions.push(position.to_array());
                normals.push(vertex_normal.to_array());
                uvs.push([
                    (a + u_half) / (2.0 * u_half),
                    1.0 - (b + v_half) / (2.0 * v_half),
                ]);
            }
        }

        for row in 0..v_stops.len() as u32 - 1 {
            for col in 0..columns - 1 {
                let i0 = base + row * columns + col;
                let i1 = i0 + 1;
                let i2 = i0 + columns + 1;
                let i3 = i0 + columns;
                indices.extend_from_slice(&[i0, i1, i2, i0, i2, i3]);
            }
        }
    }

    build_mesh(positions, normals, uvs, indices)
}

/// Plane in the XY plane facing +Z, split into `columns` x `rows` quads
pub fn subdivided_plane(width: f32, height: f32, columns: u32, rows: u32) -> Mesh {
    let columns = columns.max(1);
    let rows = rows.max(1);
    let stride = columns + 1;

    let vertex_count = (stride * (rows + 1)) as usize;
    let mut positions = Vec::with_capacity(vertex_count);
    let mut uvs = Vec::with_capacity(vertex_count);
    for row in 0..=rows {
        let v = row as f32 / rows as f32;
        for col in 0..=columns {
            let u = col as f32 / columns as f32;
            positions.push([(u - 0.5) * width, (0.5 - v) * height, 0.0]);
            uvs.push([u, v]);
        }
    }
    let normals = vec![[0.0, 0.0, 1.0]; vertex_count];

    let mut indices = Vec::with_capacity((columns * rows * 6) as usize);
    for row in 0..rows {
        for col in 0..columns {
            let top_left = row * stride + col;
            let bottom_left = top_left + stride;
            indices.extend_from_slice(&[
                top_left,
                bottom_left,
                bottom_left + 1,
                top_left,
                bottom_left + 1,
                top_left + 1,
            ]);
        }
    }

    build_mesh(positions, normals, uvs, indices)
}

pub(crate) fn build_mesh(
    positions: Vec<[f32; 3]>,
    normals: Vec<[f32; 3]>,
    uvs: Vec<[f32; 2]>,
    indices: Vec<u32>,
) -> Mesh {
    Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
        .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, normals)
        .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, uvs)
        .with_inserted_indices(Indices::U32(indices))
}

/// Copy `UV_0` into `UV_1` if the mesh has no second channel.
///
/// Returns whether a channel was added. Occlusion maps sample `UV_1`.
pub fn ensure_uv1(mesh: &mut Mesh) -> bool {
    if mesh.contains_attribute(Mesh::ATTRIBUTE_UV_1) {
        return false;
    }
    let Some(uvs) = read_uvs(mesh) else {
        return false;
    };
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_1, uvs);
    true
}

pub fn read_positions(mesh: &Mesh) -> Option<Vec<[f32; 3]>> {
    match mesh.attribute(Mesh::ATTRIBUTE_POSITION)? {
        VertexAttributeValues::Float32x3(values) => Some(values.clone()),
        _ => None,
    }
}

pub fn read_normals(mesh: &Mesh) -> Option<Vec<[f32; 3]>> {
    match mesh.attribute(Mesh::ATTRIBUTE_NORMAL)? {
        VertexAttributeValues::Float32x3(values) => Some(values.clone()),
        _ => None,
    }
}

pub fn read_uvs(mesh: &Mesh) -> Option<Vec<[f32; 2]>> {
    match mesh.attribute(Mesh::ATTRIBUTE_UV_0)? {
        VertexAttributeValues::Float32x2(values) => Some(values.clone()),
        _ => None,
    }
}
