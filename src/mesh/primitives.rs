use glam::Vec3;

use super::geometry::{Geometry, GeometryError};

/// Unit quad in the XY plane facing +Z, centered on the origin
pub fn quad() -> Result<Geometry, GeometryError> {
    let positions = [
        Vec3::new(-0.5, -0.5, 0.0),
        Vec3::new(0.5, -0.5, 0.0),
        Vec3::new(0.5, 0.5, 0.0),
        Vec3::new(-0.5, 0.5, 0.0),
    ];
    let normals = [Vec3::Z; 4];
    let indices = [0, 1, 2, 0, 2, 3];

    Geometry::assemble(&positions, Some(&normals[..]), &indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::normals::synthesize_normals;

    #[test]
    fn test_quad_shape() {
        let quad = quad().unwrap();
        assert_eq!(quad.vertex_count(), 4);
        assert_eq!(quad.triangle_count(), 2);
    }

    #[test]
    fn test_quad_normals_agree_with_winding() {
        let quad = quad().unwrap();
        let synthesized = synthesize_normals(quad.positions(), quad.indices());

        for (stored, derived) in quad.normals().iter().zip(synthesized) {
            assert!(stored.abs_diff_eq(derived, 1e-6));
        }
    }
}
