use std::collections::HashMap;
use std::path::{Path, PathBuf};

use glam::Vec3;
use log::info;

use crate::model::Model;

/// Extensions tried, in order, when resolving a model to a file
const MESH_EXTENSIONS: [&str; 3] = ["obj", "gltf", "glb"];

/// Raw mesh arrays as read from a fixture, before validation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<Vec3>,
    /// Per-vertex normals, index-aligned with `positions` when present
    pub normals: Option<Vec<Vec3>>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn has_normals(&self) -> bool {
        self.normals.as_ref().is_some_and(|n| !n.is_empty())
    }
}

/// Failure to produce raw mesh data for a model
#[derive(Debug, thiserror::Error)]
pub enum MeshLoadError {
    #[error("no mesh file for '{model}' in {dir:?}")]
    NotFound { model: Model, dir: PathBuf },
    #[error("'{0}' is a built-in primitive and has no mesh file")]
    NotFileBacked(Model),
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path:?}:{line}: {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },
    #[error("failed to import glTF {path:?}: {source}")]
    Gltf {
        path: PathBuf,
        #[source]
        source: gltf::Error,
    },
    #[error("{path:?} contains no triangles")]
    Empty { path: PathBuf },
    #[error("unsupported mesh format {0:?}")]
    UnsupportedFormat(PathBuf),
}

/// Supplier of raw mesh data keyed by model
pub trait MeshSource {
    /// Load (or return cached) mesh data for a file-backed model
    fn load_mesh(&mut self, model: Model) -> Result<&MeshData, MeshLoadError>;
}

/// Mesh source reading fixtures from a directory, caching each parse
#[derive(Debug)]
pub struct FileMeshSource {
    models_dir: PathBuf,
    cache: HashMap<Model, MeshData>,
}

impl FileMeshSource {
    pub fn new(models_dir: impl Into<PathBuf>) -> Self {
        Self {
            models_dir: models_dir.into(),
            cache: HashMap::new(),
        }
    }

    pub fn models_dir(&self) -> &Path {
        &self.models_dir
    }

    /// Locates the fixture file for a model
    pub fn resolve(&self, model: Model) -> Result<PathBuf, MeshLoadError> {
        let stem = model
            .file_stem()
            .ok_or(MeshLoadError::NotFileBacked(model))?;

        MESH_EXTENSIONS
            .iter()
            .map(|ext| self.models_dir.join(format!("{}.{}", stem, ext)))
            .find(|path| path.is_file())
            .ok_or_else(|| MeshLoadError::NotFound {
                model,
                dir: self.models_dir.clone(),
            })
    }

    pub fn is_cached(&self, model: Model) -> bool {
        self.cache.contains_key(&model)
    }
}

impl MeshSource for FileMeshSource {
    fn load_mesh(&mut self, model: Model) -> Result<&MeshData, MeshLoadError> {
        if !self.cache.contains_key(&model) {
            let path = self.resolve(model)?;
            let data = load_mesh_file(&path)?;
            info!(
                "Loaded {} from {:?}: {} positions, {} normals, {} indices",
                model,
                path,
                data.positions.len(),
                data.normals.as_ref().map_or(0, Vec::len),
                data.indices.len()
            );
            self.cache.insert(model, data);
        }

        Ok(&self.cache[&model])
    }
}

/// Loads a mesh file, picking the reader from its extension
pub fn load_mesh_file(path: impl AsRef<Path>) -> Result<MeshData, MeshLoadError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("obj") => super::obj::load_obj(path),
        Some("gltf") | Some("glb") => super::gltf::load_gltf_mesh(path),
        _ => Err(MeshLoadError::UnsupportedFormat(path.to_path_buf())),
    }
}
