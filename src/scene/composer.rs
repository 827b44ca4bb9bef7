use glam::Vec3;
use log::info;

use super::graph::{Camera, Light, NodeHandle, RenderGraph, RenderNode, Transform};
use crate::loaders::{MeshLoadError, MeshSource};
use crate::mesh::{primitives, Geometry, GeometryError};
use crate::model::Model;
use crate::shading::{outline_variant, variant_for};
use crate::viewer::ViewerState;

/// Outline hull scale relative to the base mesh
pub const OUTLINE_SCALE_FACTOR: f32 = 0.96;

pub const CAMERA_POSITION: Vec3 = Vec3::new(0.0, 3.0, 10.0);
pub const CAMERA: Camera = Camera {
    fov_y_degrees: 45.0,
    near: 0.1,
    far: 100.0,
    target: Vec3::ZERO,
};

pub const AMBIENT_LIGHT: Light = Light::Ambient {
    color: Vec3::new(0.1, 0.1, 0.1),
};

pub const POINT_LIGHT_POSITION: Vec3 = Vec3::new(3.0, 3.0, 2.0);
pub const POINT_LIGHT: Light = Light::Point {
    diffuse: Vec3::new(2.0, 2.0, 2.0),
    specular: Vec3::new(0.7, 0.7, 0.7),
    attenuation: Vec3::new(1.0, 0.1, 0.02),
};

/// Why a rebuild was abandoned
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("failed to load mesh for '{model}': {source}")]
    MeshLoad {
        model: Model,
        #[source]
        source: MeshLoadError,
    },
    #[error("invalid geometry for '{model}': {source}")]
    InvalidGeometry {
        model: Model,
        #[source]
        source: GeometryError,
    },
}

/// A freshly built render graph plus handles to its animated nodes
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedScene {
    pub graph: RenderGraph,
    pub mesh: NodeHandle,
    pub outline: Option<NodeHandle>,
}

/// Builds a complete render graph for `state`
///
/// Holds no state between calls. All fallible work (loading, assembling)
/// happens before the graph is created, so an error leaves nothing behind
/// and the caller's current scene stays untouched.
///
/// The mesh and outline nodes come back unrotated; the caller re-applies the
/// current rotation.
pub fn compose(
    state: &ViewerState,
    source: &mut dyn MeshSource,
    generation: u64,
) -> Result<ComposedScene, SceneError> {
    let model = state.model;
    let invalid = |source| SceneError::InvalidGeometry { model, source };

    let (base_geometry, outline_geometry) = if model.is_primitive() {
        (primitives::quad().map_err(invalid)?, None)
    } else {
        let data = source
            .load_mesh(model)
            .map_err(|source| SceneError::MeshLoad { model, source })?;

        // Synthesis happens once; the outline gets an independent copy
        let base = Geometry::assemble(&data.positions, data.normals.as_deref(), &data.indices)
            .map_err(invalid)?;
        let outline = state.outline.then(|| base.clone());

        (base, outline)
    };

    info!(
        "Composing scene: model={}, shading={}, outline={}, {} vertices, {} triangles",
        model,
        state.mode,
        outline_geometry.is_some(),
        base_geometry.vertex_count(),
        base_geometry.triangle_count()
    );

    let mut graph = RenderGraph::new(generation);
    add_camera_and_lights(&mut graph);

    let base_scale = Vec3::splat(model.scale());

    let outline = outline_geometry.map(|geometry| {
        let (shader, material) = outline_variant();
        graph.add_to_root(
            RenderNode::new("outline")
                .with_geometry(geometry)
                .with_shading(shader, material)
                .with_transform(Transform {
                    scale: base_scale * OUTLINE_SCALE_FACTOR,
                    ..Transform::IDENTITY
                }),
        )
    });

    let (shader, material) = variant_for(state.mode);
    let mesh = graph.add_to_root(
        RenderNode::new("mesh")
            .with_geometry(base_geometry)
            .with_shading(shader, material)
            .with_transform(Transform {
                scale: base_scale,
                ..Transform::IDENTITY
            }),
    );

    Ok(ComposedScene {
        graph,
        mesh,
        outline,
    })
}

fn add_camera_and_lights(graph: &mut RenderGraph) {
    graph.add_to_root(
        RenderNode::new("camera")
            .with_transform(Transform::from_position(CAMERA_POSITION))
            .with_camera(CAMERA),
    );
    graph.add_to_root(RenderNode::new("ambient_light").with_light(AMBIENT_LIGHT));
    graph.add_to_root(
        RenderNode::new("point_light")
            .with_transform(Transform::from_position(POINT_LIGHT_POSITION))
            .with_light(POINT_LIGHT),
    );
}
