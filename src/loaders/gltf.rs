use std::path::Path;

use glam::{Mat3, Mat4, Vec3};
use log::debug;

use super::source::{MeshData, MeshLoadError};

/// Accumulates primitives from every glTF node into one indexed mesh
#[derive(Default)]
struct MeshBuilder {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    indices: Vec<u32>,
    /// Cleared as soon as one primitive arrives without normals
    all_have_normals: bool,
}

/// Loads a glTF/GLB file and flattens all of its triangle meshes
///
/// Node transforms are baked into positions (and normals, via the inverse
/// transpose). Normals are returned only if every primitive supplies them.
pub fn load_gltf_mesh(path: impl AsRef<Path>) -> Result<MeshData, MeshLoadError> {
    let path = path.as_ref();
    let (document, buffers, _images) = gltf::import(path).map_err(|source| MeshLoadError::Gltf {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(
        "glTF {:?}: {} scenes, {} nodes, {} meshes",
        path,
        document.scenes().count(),
        document.nodes().count(),
        document.meshes().count()
    );

    let mut builder = MeshBuilder {
        all_have_normals: true,
        ..Default::default()
    };

    for scene in document.scenes() {
        for node in scene.nodes() {
            process_node(&node, &buffers, &Mat4::IDENTITY, &mut builder, path)?;
        }
    }

    if builder.positions.is_empty() || builder.indices.is_empty() {
        return Err(MeshLoadError::Empty {
            path: path.to_path_buf(),
        });
    }

    Ok(MeshData {
        positions: builder.positions,
        normals: builder.all_have_normals.then_some(builder.normals),
        indices: builder.indices,
    })
}

/// Recursively walks glTF nodes, accumulating world transforms
fn process_node(
    node: &gltf::Node,
    buffers: &[gltf::buffer::Data],
    parent_transform: &Mat4,
    builder: &mut MeshBuilder,
    path: &Path,
) -> Result<(), MeshLoadError> {
    let local_transform = Mat4::from_cols_array_2d(&node.transform().matrix());
    let global_transform = *parent_transform * local_transform;

    if let Some(mesh) = node.mesh() {
        process_mesh(&mesh, buffers, &global_transform, builder, path)?;
    }

    for child in node.children() {
        process_node(&child, buffers, &global_transform, builder, path)?;
    }

    Ok(())
}

fn process_mesh(
    mesh: &gltf::Mesh,
    buffers: &[gltf::buffer::Data],
    transform: &Mat4,
    builder: &mut MeshBuilder,
    path: &Path,
) -> Result<(), MeshLoadError> {
    let normal_matrix = Mat3::from_mat4(*transform).inverse().transpose();

    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            debug!("Skipping non-triangle primitive in mesh {:?}", mesh.name());
            continue;
        }

        let reader =
            primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));

        let positions: Vec<Vec3> = reader
            .read_positions()
            .ok_or_else(|| MeshLoadError::Parse {
                path: path.to_path_buf(),
                line: 0,
                message: format!("mesh {:?} primitive has no positions", mesh.name()),
            })?
            .map(|p| transform.transform_point3(Vec3::from_array(p)))
            .collect();

        let base = builder.positions.len() as u32;

        let normals: Option<Vec<Vec3>> = reader.read_normals().map(|normals| {
            normals
                .map(|n| (normal_matrix * Vec3::from_array(n)).normalize_or_zero())
                .collect()
        });

        match normals {
            Some(normals) if normals.len() == positions.len() => builder.normals.extend(normals),
            _ => builder.all_have_normals = false,
        }

        match reader.read_indices() {
            Some(indices) => builder
                .indices
                .extend(indices.into_u32().map(|index| base + index)),
            // Non-indexed primitives are plain triangle lists
            None => builder
                .indices
                .extend((0..positions.len() as u32).map(|index| base + index)),
        }

        builder.positions.extend(positions);
    }

    Ok(())
}
