pub mod geometry;
pub mod normals;
pub mod primitives;

pub use geometry::{Geometry, GeometryError};
pub use normals::{face_normal, synthesize_normals};
