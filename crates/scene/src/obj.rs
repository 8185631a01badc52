//! Wavefront OBJ models as Bevy meshes.
//!
//! Streaming parser for `v`, `vt`, `vn` and `f`; other statements are
//! ignored. Polygon faces are triangulated with a fan, face corners are
//! deduplicated into one vertex per distinct `v/vt/vn` triple.

use std::collections::HashMap;

use bevy::asset::io::Reader;
use bevy::asset::{AssetLoader, LoadContext};
use bevy::prelude::*;
use bevy::reflect::TypePath;

use crate::geometry::build_mesh;

#[derive(Debug, thiserror::Error)]
pub enum ObjError {
    #[error("Could not read OBJ data: {0}")]
    Io(#[from] std::io::Error),

    #[error("OBJ line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("OBJ line {line}: index {index} out of range")]
    IndexOutOfRange { line: usize, index: i64 },

    #[error("OBJ contains no faces")]
    Empty,
}

/// Triangle mesh data parsed from an OBJ file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjMesh {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl ObjMesh {
    pub fn into_mesh(self) -> Mesh {
        build_mesh(self.positions, self.normals, self.uvs, self.indices)
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Indices of one face corner into the position, uv and normal lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Corner {
    position: usize,
    uv: Option<usize>,
    normal: Option<usize>,
}

fn parse_floats<const N: usize>(
    tokens: &mut std::str::SplitWhitespace<'_>,
    line: usize,
    min: usize,
) -> Result<[f32; N], ObjError> {
    let mut out = [0.0; N];
    let mut count = 0;
    for (slot, token) in out.iter_mut().zip(tokens) {
        *slot = token.parse().map_err(|_| ObjError::Parse {
            line,
            message: format!("invalid number '{token}'"),
        })?;
        count += 1;
    }
    if count < min {
        return Err(ObjError::Parse {
            line,
            message: format!("expected at least {min} values, found {count}"),
        });
    }
    Ok(out)
}

/// Resolve a 1-based (or negative, relative) OBJ index against `len` items
fn resolve_index(raw: &str, len: usize, line: usize) -> Result<usize, ObjError> {
    let index: i64 = raw.parse().map_err(|_| ObjError::Parse {
        line,
        message: format!("invalid index '{raw}'"),
    })?;
    let resolved = match index {
        i if i > 0 => i - 1,
        i if i < 0 => len as i64 + i,
        _ => return Err(ObjError::IndexOutOfRange { line, index }),
    };
    if resolved < 0 || resolved >= len as i64 {
        return Err(ObjError::IndexOutOfRange { line, index });
    }
    Ok(resolved as usize)
}

fn parse_corner(
    token: &str,
    counts: (usize, usize, usize),
    line: usize,
) -> Result<Corner, ObjError> {
    let mut parts = token.split('/');
    let position = resolve_index(parts.next().unwrap_or(""), counts.0, line)?;
    let uv = match parts.next() {
        Some(raw) if !raw.is_empty() => Some(resolve_index(raw, counts.1, line)?),
        _ => None,
    };
    let normal = match parts.next() {
        Some(raw) if !raw.is_empty() => Some(resolve_index(raw, counts.2, line)?),
        _ => None,
    };
    Ok(Corner {
        position,
        uv,
        normal,
    })
}

/// Parse OBJ text into a single indexed triangle mesh.
///
/// Corners without a normal get the area-weighted average of the faces
/// sharing their position. Missing UVs are zero. V is flipped so textures
/// sample top-down.
pub fn parse_obj(text: &str) -> Result<ObjMesh, ObjError> {
    let mut positions: Vec<[f32; 3]> = Vec::new();
    let mut uvs: Vec<[f32; 2]> = Vec::new();
    let mut normals: Vec<[f32; 3]> = Vec::new();
    let mut corners: Vec<Corner> = Vec::new();
    let mut triangles: Vec<[usize; 3]> = Vec::new();
    let mut corner_ids: HashMap<Corner, usize> = HashMap::new();

    for (line_index, raw_line) in text.lines().enumerate() {
        let line = line_index + 1;
        let content = raw_line.split('#').next().unwrap_or("").trim();
        if content.is_empty() {
            continue;
        }
        let mut tokens = content.split_whitespace();
        let Some(tag) = tokens.next() else {
            continue;
        };

        match tag {
            "v" => positions.push(parse_floats::<3>(&mut tokens, line, 3)?),
            "vt" => {
                let [u, v] = parse_floats::<2>(&mut tokens, line, 1)?;
                uvs.push([u, 1.0 - v]);
            }
            "vn" => normals.push(parse_floats::<3>(&mut tokens, line, 3)?),
            "f" => {
                let counts = (positions.len(), uvs.len(), normals.len());
                let face = tokens
                    .map(|token| {
                        let corner = parse_corner(token, counts, line)?;
                        let next_id = corner_ids.len();
                        let id = *corner_ids.entry(corner).or_insert_with(|| {
                            corners.push(corner);
                            next_id
                        });
                        Ok(id)
                    })
                    .collect::<Result<Vec<usize>, ObjError>>()?;

                if face.len() < 3 {
                    return Err(ObjError::Parse {
                        line,
                        message: format!("face has {} vertices", face.len()),
                    });
                }
                for i in 1..face.len() - 1 {
                    triangles.push([face[0], face[i], face[i + 1]]);
                }
            }
            _ => {}
        }
    }

    if triangles.is_empty() {
        return Err(ObjError::Empty);
    }

    let smoothed = if corners.iter().any(|c| c.normal.is_none()) {
        smooth_normals(&positions, &corners, &triangles)
    } else {
        Vec::new()
    };

    let mut mesh = ObjMesh::default();
    for corner in &corners {
        mesh.positions.push(positions[corner.position]);
        mesh.uvs.push(corner.uv.map_or([0.0, 0.0], |i| uvs[i]));
        mesh.normals.push(match corner.normal {
            Some(i) => normals[i],
            None => smoothed[corner.position],
        });
    }
    mesh.indices = triangles
        .iter()
        .flat_map(|tri| tri.iter().map(|&i| i as u32))
        .collect();

    tracing_summary(&mesh);
    Ok(mesh)
}

fn tracing_summary(mesh: &ObjMesh) {
    debug!(
        "Parsed OBJ: {} vertices, {} triangles",
        mesh.positions.len(),
        mesh.triangle_count()
    );
}

/// Per-position normals: sum of unnormalized face normals (area weighted)
fn smooth_normals(
    positions: &[[f32; 3]],
    corners: &[Corner],
    triangles: &[[usize; 3]],
) -> Vec<[f32; 3]> {
    let mut sums = vec![Vec3::ZERO; positions.len()];
    for tri in triangles {
        let [a, b, c] = tri.map(|id| corners[id].position);
        let pa = Vec3::from_array(positions[a]);
        let pb = Vec3::from_array(positions[b]);
        let pc = Vec3::from_array(positions[c]);
        let face = (pb - pa).cross(pc - pa);
        for index in [a, b, c] {
            sums[index] += face;
        }
    }
    sums.into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Y).to_array())
        .collect()
}

/// Loads `.obj` files as [`Mesh`] assets
#[derive(Default, TypePath)]
pub struct ObjLoader;

impl AssetLoader for ObjLoader {
    type Asset = Mesh;
    type Settings = ();
    type Error = ObjError;

    async fn load(
        &self,
        reader: &mut dyn Reader,
        _settings: &(),
        _load_context: &mut LoadContext<'_>,
    ) -> Result<Mesh, ObjError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).await?;
        let text = std::str::from_utf8(&bytes).map_err(|err| ObjError::Parse {
            line: 0,
            message: err.to_string(),
        })?;
        Ok(parse_obj(text)?.into_mesh())
    }

    fn extensions(&self) -> &[&str] {
        &["obj"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = "\
# unit quad
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
f 1/1/1 2/2/1 3/3/1 4/4/1
";

    #[test]
    fn test_quad_fan_triangulation() {
        let mesh = parse_obj(QUAD).unwrap();
        assert_eq!(mesh.positions.len(), 4);
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(mesh.normals[2], [0.0, 0.0, 1.0]);
        // V is flipped
        assert_eq!(mesh.uvs[0], [0.0, 1.0]);
        assert_eq!(mesh.uvs[2], [1.0, 0.0]);
    }

    #[test]
    fn test_shared_corners_are_deduplicated() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nv 1 1 0\nf 1 2 3\nf 3 2 4\n";
        let mesh = parse_obj(text).unwrap();
        assert_eq!(mesh.positions.len(), 4);
        assert_eq!(mesh.triangle_count(), 2);
    }

    #[test]
    fn test_negative_indices() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\n";
        let mesh = parse_obj(text).unwrap();
        assert_eq!(mesh.indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_missing_normals_are_computed() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        let mesh = parse_obj(text).unwrap();
        for n in &mesh.normals {
            assert!((Vec3::from_array(*n) - Vec3::Z).length() < 1e-6);
        }
        assert!(mesh.uvs.iter().all(|uv| *uv == [0.0, 0.0]));
    }

    #[test]
    fn test_position_normal_form() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 -1\nf 1//1 2//1 3//1\n";
        let mesh = parse_obj(text).unwrap();
        assert_eq!(mesh.normals[0], [0.0, 0.0, -1.0]);
    }

    #[test]
    fn test_errors() {
        assert!(matches!(parse_obj("v 0 0 0\n"), Err(ObjError::Empty)));
        assert!(matches!(
            parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 9\n"),
            Err(ObjError::IndexOutOfRange { line: 4, index: 9 })
        ));
        assert!(matches!(
            parse_obj("v 0 zero 0\n"),
            Err(ObjError::Parse { line: 1, .. })
        ));
        assert!(matches!(
            parse_obj("v 0 0 0\nv 1 0 0\nf 1 2\n"),
            Err(ObjError::Parse { line: 3, .. })
        ));
        assert!(matches!(
            parse_obj("v 0 0 0\nf 0 1 1\n"),
            Err(ObjError::IndexOutOfRange { index: 0, .. })
        ));
    }

    #[test]
    fn test_into_mesh_has_uv0() {
        let mesh = parse_obj(QUAD).unwrap().into_mesh();
        assert!(mesh.contains_attribute(Mesh::ATTRIBUTE_UV_0));
        assert_eq!(mesh.count_vertices(), 4);
    }
}
