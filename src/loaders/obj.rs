use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use glam::Vec3;
use log::debug;

use super::source::{MeshData, MeshLoadError};

/// Loads a Wavefront OBJ file
pub fn load_obj(path: impl AsRef<Path>) -> Result<MeshData, MeshLoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| MeshLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    parse_obj(BufReader::new(file), path)
}

/// Parses OBJ text into indexed triangles
///
/// Reads `v`, `vn` and `f` records; other records are ignored. Polygons are
/// fan-triangulated. Face vertices may be written `v`, `v/vt`, `v//vn` or
/// `v/vt/vn`, with negative indices counting back from the latest entry.
///
/// OBJ indexes normals independently of positions. Normals are kept only when
/// every position was given exactly one normal; otherwise `normals` is `None`
/// and the caller synthesizes smooth ones.
pub fn parse_obj<R: BufRead>(reader: R, path: &Path) -> Result<MeshData, MeshLoadError> {
    let mut positions: Vec<Vec3> = Vec::new();
    let mut normal_pool: Vec<Vec3> = Vec::new();
    let mut vertex_normals: Vec<Option<Vec3>> = Vec::new();
    let mut normals_consistent = true;
    let mut indices: Vec<u32> = Vec::new();

    for (line_index, line) in reader.lines().enumerate() {
        let line_number = line_index + 1;
        let line = line.map_err(|source| MeshLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let parse_error = |message: String| MeshLoadError::Parse {
            path: path.to_path_buf(),
            line: line_number,
            message,
        };

        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("v") => {
                positions.push(parse_vec3(parts).map_err(parse_error)?);
                vertex_normals.push(None);
            }
            Some("vn") => normal_pool.push(parse_vec3(parts).map_err(parse_error)?),
            Some("f") => {
                let corners = parts
                    .map(|chunk| parse_corner(chunk, positions.len(), normal_pool.len()))
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(parse_error)?;

                if corners.len() < 3 {
                    return Err(parse_error(format!(
                        "face has {} vertices, need at least 3",
                        corners.len()
                    )));
                }

                for &(vertex, normal) in &corners {
                    if let Some(normal) = normal {
                        let normal = normal_pool[normal];
                        let current = vertex_normals[vertex];
                        match current {
                            Some(existing) if existing != normal => normals_consistent = false,
                            _ => vertex_normals[vertex] = Some(normal),
                        }
                    }
                }

                for pair in corners[1..].windows(2) {
                    indices.extend([corners[0].0 as u32, pair[0].0 as u32, pair[1].0 as u32]);
                }
            }
            _ => {}
        }
    }

    if positions.is_empty() || indices.is_empty() {
        return Err(MeshLoadError::Empty {
            path: path.to_path_buf(),
        });
    }

    let normals = if normals_consistent {
        vertex_normals.into_iter().collect::<Option<Vec<_>>>()
    } else {
        debug!("{:?}: positions carry conflicting normals, discarding them", path);
        None
    };

    Ok(MeshData {
        positions,
        normals,
        indices,
    })
}

fn parse_vec3<'a>(mut parts: impl Iterator<Item = &'a str>) -> Result<Vec3, String> {
    let mut component = || -> Result<f32, String> {
        let token = parts.next().ok_or("expected 3 components")?;
        token
            .parse::<f32>()
            .map_err(|e| format!("invalid number '{}': {}", token, e))
    };

    Ok(Vec3::new(component()?, component()?, component()?))
}

/// Parses one face corner into (position index, optional normal index)
fn parse_corner(
    chunk: &str,
    position_count: usize,
    normal_count: usize,
) -> Result<(usize, Option<usize>), String> {
    let mut fields = chunk.split('/');
    let position = fields
        .next()
        .ok_or_else(|| format!("empty face vertex '{}'", chunk))?;
    let position = resolve_index(position, position_count)?;

    let _texcoord = fields.next();
    let normal = match fields.next() {
        Some(field) if !field.is_empty() => Some(resolve_index(field, normal_count)?),
        _ => None,
    };

    Ok((position, normal))
}

/// Converts a 1-based or negative relative OBJ index into a 0-based one
fn resolve_index(token: &str, count: usize) -> Result<usize, String> {
    let raw: i64 = token
        .parse()
        .map_err(|e| format!("invalid index '{}': {}", token, e))?;

    let resolved = match raw {
        0 => None,
        r if r > 0 => Some(r - 1),
        r => Some(count as i64 + r),
    };

    match resolved {
        Some(index) if index >= 0 && (index as usize) < count => Ok(index as usize),
        _ => Err(format!("index {} out of range for {} entries", raw, count)),
    }
}
