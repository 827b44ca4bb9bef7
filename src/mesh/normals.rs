use glam::Vec3;

/// Face normal of a triangle, oriented by the right-hand rule over its winding.
/// Returns None for zero-area triangles.
///
/// The test is scale-free: edges are divided by their largest component
/// before the cross product, so tiny and huge triangles both keep a normal.
pub fn face_normal(v0: Vec3, v1: Vec3, v2: Vec3) -> Option<Vec3> {
    let (e1, e2) = (v1 - v0, v2 - v0);

    let extent = e1.abs().max_element().max(e2.abs().max_element());
    if !(extent > 0.0 && extent.is_finite()) {
        return None;
    }

    let cross = (e1 / extent).cross(e2 / extent);
    let largest = cross.abs().max_element();
    if !(largest > 0.0) {
        return None;
    }

    (cross / largest).try_normalize()
}

/// Synthesizes per-vertex normals from an indexed triangle list
///
/// Each triangle adds its unit face normal to its three vertices (plain sum,
/// no area or angle weighting), then every accumulated normal is normalized.
///
/// Degenerate triangles and triangles with out-of-range indices contribute
/// nothing. A vertex that receives no contribution keeps `Vec3::ZERO`, which
/// is the sentinel for "no normal"; every other entry has unit length.
pub fn synthesize_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];

    for tri in indices.chunks_exact(3) {
        let (i0, i1, i2) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);

        let (Some(&v0), Some(&v1), Some(&v2)) =
            (positions.get(i0), positions.get(i1), positions.get(i2))
        else {
            continue;
        };

        if let Some(normal) = face_normal(v0, v1, v2) {
            normals[i0] += normal;
            normals[i1] += normal;
            normals[i2] += normal;
        }
    }

    // Opposing faces can cancel to zero; normalize_or_zero keeps those finite
    for normal in normals.iter_mut() {
        *normal = normal.normalize_or_zero();
    }

    normals
}
