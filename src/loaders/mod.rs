pub mod gltf;
pub mod obj;
pub mod source;

pub use self::gltf::load_gltf_mesh;
pub use obj::{load_obj, parse_obj};
pub use source::{load_mesh_file, FileMeshSource, MeshData, MeshLoadError, MeshSource};
