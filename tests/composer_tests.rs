use std::collections::HashMap;

use glam::Vec3;
use toon_viewer::loaders::{MeshData, MeshLoadError, MeshSource};
use toon_viewer::scene::OUTLINE_SCALE_FACTOR;
use toon_viewer::shading::Material;
use toon_viewer::{compose, Model, SceneError, ShaderVariant, ShadingMode, ViewerState};

/// Mock mesh source serving a fixed mesh per model
struct MockSource {
    meshes: HashMap<Model, MeshData>,
    loads: usize,
}

impl MockSource {
    fn tetrahedra() -> Self {
        let tetrahedron = MeshData {
            positions: vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z],
            normals: None,
            indices: vec![0, 2, 1, 0, 1, 3, 0, 3, 2, 1, 2, 3],
        };
        let meshes = [Model::Teapot, Model::Bunny]
            .into_iter()
            .map(|model| (model, tetrahedron.clone()))
            .collect();

        Self { meshes, loads: 0 }
    }
}

impl MeshSource for MockSource {
    fn load_mesh(&mut self, model: Model) -> Result<&MeshData, MeshLoadError> {
        self.loads += 1;
        self.meshes.get(&model).ok_or(MeshLoadError::NotFound {
            model,
            dir: "mock".into(),
        })
    }
}

fn state(model: Model, mode: ShadingMode, outline: bool) -> ViewerState {
    ViewerState {
        model,
        mode,
        outline,
        ..Default::default()
    }
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_bunny_outline_cel_scene() {
    let mut source = MockSource::tetrahedra();
    let scene = compose(&state(Model::Bunny, ShadingMode::Cel, true), &mut source, 0).unwrap();

    assert_eq!(scene.graph.mesh_node_count(), 2);

    let mesh = scene.graph.get(scene.mesh).unwrap();
    assert_eq!(mesh.shader, Some(ShaderVariant::Cel));
    assert_eq!(mesh.material, Some(Material::BASE));
    assert_eq!(mesh.transform.scale, Vec3::splat(7.0));

    let outline = scene.graph.get(scene.outline.unwrap()).unwrap();
    assert_eq!(outline.shader, Some(ShaderVariant::Silhouette));
    assert_eq!(outline.material, Some(Material::OUTLINE));
    assert!(outline.transform.scale.abs_diff_eq(Vec3::splat(6.72), 1e-5));
}

#[test]
fn test_quad_scene() {
    let mut source = MockSource::tetrahedra();

    for mode in ShadingMode::ALL {
        for outline in [false, true] {
            let scene = compose(&state(Model::Quad, mode, outline), &mut source, 0).unwrap();

            assert!(scene.outline.is_none());
            assert_eq!(scene.graph.mesh_node_count(), 1);

            let mesh = scene.graph.get(scene.mesh).unwrap();
            assert_eq!(mesh.transform.scale, Vec3::splat(2.0));
            assert_eq!(mesh.geometry.as_ref().unwrap().triangle_count(), 2);
        }
    }
    assert_eq!(source.loads, 0);
}

#[test]
fn test_outline_scale_is_fixed_fraction_of_base() {
    let mut source = MockSource::tetrahedra();

    for model in [Model::Teapot, Model::Bunny] {
        for mode in ShadingMode::ALL {
            let scene = compose(&state(model, mode, true), &mut source, 0).unwrap();
            let mesh = scene.graph.get(scene.mesh).unwrap();
            let outline = scene.graph.get(scene.outline.unwrap()).unwrap();

            assert_eq!(
                outline.transform.scale,
                mesh.transform.scale * OUTLINE_SCALE_FACTOR,
                "{} / {}",
                model,
                mode
            );
        }
    }
}

#[test]
fn test_no_outline_without_flag() {
    let mut source = MockSource::tetrahedra();
    let scene = compose(&state(Model::Teapot, ShadingMode::WarmCool, false), &mut source, 0).unwrap();

    assert!(scene.outline.is_none());
    assert_eq!(scene.graph.mesh_node_count(), 1);
    assert_eq!(
        scene.graph.get(scene.mesh).unwrap().transform.scale,
        Vec3::splat(0.7)
    );
}

#[test]
fn test_compose_is_idempotent() {
    let mut source = MockSource::tetrahedra();
    let request = state(Model::Bunny, ShadingMode::WarmCool, true);

    let first = compose(&request, &mut source, 3).unwrap();
    let second = compose(&request, &mut source, 3).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_mode_switch_only_changes_base_variant() {
    let mut source = MockSource::tetrahedra();
    let flat = compose(&state(Model::Bunny, ShadingMode::Flat, true), &mut source, 0).unwrap();
    let cel = compose(&state(Model::Bunny, ShadingMode::Cel, true), &mut source, 0).unwrap();

    assert_eq!(flat.graph.get(flat.mesh).unwrap().shader, Some(ShaderVariant::Flat));
    assert_eq!(cel.graph.get(cel.mesh).unwrap().shader, Some(ShaderVariant::Cel));
    assert_eq!(
        flat.graph.get(flat.outline.unwrap()),
        cel.graph.get(cel.outline.unwrap())
    );
}

#[test]
fn test_drawables_are_in_world_space() {
    let mut source = MockSource::tetrahedra();
    let scene = compose(&state(Model::Bunny, ShadingMode::Flat, true), &mut source, 0).unwrap();

    let drawables = scene.graph.drawables();
    assert_eq!(drawables.len(), 2);

    let mesh = drawables.iter().find(|d| d.handle == scene.mesh).unwrap();
    let tip = mesh.world.transform_point3(Vec3::X);
    assert!(tip.abs_diff_eq(Vec3::new(7.0, 0.0, 0.0), 1e-5));
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_missing_mesh_is_load_error() {
    let mut source = MockSource::tetrahedra();
    source.meshes.remove(&Model::Teapot);

    let result = compose(&state(Model::Teapot, ShadingMode::Flat, true), &mut source, 0);
    assert!(matches!(
        result,
        Err(SceneError::MeshLoad {
            model: Model::Teapot,
            ..
        })
    ));
}

#[test]
fn test_bad_indices_are_geometry_error() {
    let mut source = MockSource::tetrahedra();
    source.meshes.insert(
        Model::Bunny,
        MeshData {
            positions: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            normals: None,
            indices: vec![0, 1, 7],
        },
    );

    let result = compose(&state(Model::Bunny, ShadingMode::Flat, false), &mut source, 0);
    assert!(matches!(result, Err(SceneError::InvalidGeometry { .. })));
}

#[test]
fn test_normal_count_mismatch_is_geometry_error() {
    let mut source = MockSource::tetrahedra();
    source.meshes.insert(
        Model::Bunny,
        MeshData {
            positions: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            normals: Some(vec![Vec3::Z]),
            indices: vec![0, 1, 2],
        },
    );

    let result = compose(&state(Model::Bunny, ShadingMode::Flat, false), &mut source, 0);
    assert!(matches!(result, Err(SceneError::InvalidGeometry { .. })));
}
