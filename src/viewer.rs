use std::f32::consts::TAU;

use glam::Quat;
use log::{error, info};

use crate::core::{Button, Controller, EdgeDetector};
use crate::loaders::MeshSource;
use crate::model::Model;
use crate::scene::{compose, ComposedScene, RenderGraph, SceneError};
use crate::shading::ShadingMode;

/// Mesh spin about +Y, radians per second
pub const ROTATION_SPEED: f32 = 1.0;

/// Everything that decides what the scene looks like
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerState {
    pub model: Model,
    pub mode: ShadingMode,
    pub outline: bool,
    /// Seconds since start
    pub elapsed: f32,
    /// Accumulated spin, wrapped to [0, TAU)
    pub rotation_angle: f32,
}

impl Default for ViewerState {
    fn default() -> Self {
        Self {
            model: Model::Bunny,
            mode: ShadingMode::Flat,
            outline: false,
            elapsed: 0.0,
            rotation_angle: 0.0,
        }
    }
}

/// A discrete change requested by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerCommand {
    SetShading(ShadingMode),
    ToggleOutline,
    CycleModel,
}

impl ViewerCommand {
    /// Keys the viewer reacts to
    pub const KEYS: [Button; 5] = [
        Button::Digit1,
        Button::Digit2,
        Button::Digit3,
        Button::KeyO,
        Button::KeyM,
    ];

    pub fn for_button(button: Button) -> Option<Self> {
        match button {
            Button::Digit1 => Some(ViewerCommand::SetShading(ShadingMode::Flat)),
            Button::Digit2 => Some(ViewerCommand::SetShading(ShadingMode::WarmCool)),
            Button::Digit3 => Some(ViewerCommand::SetShading(ShadingMode::Cel)),
            Button::KeyO => Some(ViewerCommand::ToggleOutline),
            Button::KeyM => Some(ViewerCommand::CycleModel),
            Button::Escape => None,
        }
    }

    pub fn apply(&self, state: &mut ViewerState) {
        match *self {
            ViewerCommand::SetShading(mode) => state.mode = mode,
            ViewerCommand::ToggleOutline => state.outline = !state.outline,
            ViewerCommand::CycleModel => state.model = state.model.cycle(),
        }
    }
}

/// Owns the viewer state and the live scene built from it
///
/// Each frame polls input, rebuilds the scene when a command changed the
/// state, then advances the rotation. A rebuild that fails keeps both the
/// previous scene and the previous state.
pub struct ViewerController<S: MeshSource> {
    state: ViewerState,
    input: EdgeDetector,
    source: S,
    scene: Option<ComposedScene>,
    next_generation: u64,
}

impl<S: MeshSource> ViewerController<S> {
    /// Creates the controller and composes the initial scene
    ///
    /// The controller is returned even when the initial compose fails, along
    /// with the error; it then starts with no scene and a later successful
    /// command builds one.
    pub fn new(state: ViewerState, source: S) -> (Self, Option<SceneError>) {
        let mut viewer = Self {
            state,
            input: EdgeDetector::new(ViewerCommand::KEYS),
            source,
            scene: None,
            next_generation: 0,
        };
        let error = viewer.rebuild().err();
        (viewer, error)
    }

    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    pub fn scene(&self) -> Option<&ComposedScene> {
        self.scene.as_ref()
    }

    pub fn graph(&self) -> Option<&RenderGraph> {
        self.scene.as_ref().map(|scene| &scene.graph)
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// One frame: input, optional rebuild, rotation
    pub fn frame(&mut self, delta: f32, controller: &dyn Controller) {
        self.handle_input(controller);
        self.tick(delta);
    }

    /// Applies every newly pressed key, then rebuilds at most once
    ///
    /// Returns true if a rebuild was attempted and succeeded.
    pub fn handle_input(&mut self, controller: &dyn Controller) -> bool {
        let mut pending = self.state.clone();
        let mut needs_rebuild = false;

        self.input.poll(controller, |button| {
            if let Some(command) = ViewerCommand::for_button(button) {
                info!("{:?} -> {:?}", button, command);
                command.apply(&mut pending);
                needs_rebuild = true;
            }
        });

        needs_rebuild && self.commit(pending).is_ok()
    }

    /// Applies a single command immediately
    pub fn apply(&mut self, command: ViewerCommand) -> Result<(), SceneError> {
        let mut pending = self.state.clone();
        command.apply(&mut pending);
        self.commit(pending)
    }

    /// Recomposes the scene from the current state
    pub fn rebuild(&mut self) -> Result<(), SceneError> {
        self.commit(self.state.clone())
    }

    /// Advances time and spins the mesh (and outline) about +Y
    pub fn tick(&mut self, delta: f32) {
        self.state.elapsed += delta;

        let angle = ROTATION_SPEED * delta;
        self.state.rotation_angle = (self.state.rotation_angle + angle).rem_euclid(TAU);

        let Some(scene) = &mut self.scene else {
            return;
        };
        let Some(mesh) = scene.graph.get_mut(scene.mesh) else {
            return;
        };

        let rotation = (Quat::from_rotation_y(angle) * mesh.transform.rotation).normalize();
        mesh.transform.rotation = rotation;

        if let Some(outline) = scene.outline.and_then(|handle| scene.graph.get_mut(handle)) {
            outline.transform.rotation = rotation;
        }
    }

    /// Current orientation of the mesh node
    pub fn mesh_rotation(&self) -> Option<Quat> {
        let scene = self.scene.as_ref()?;
        scene
            .graph
            .get(scene.mesh)
            .map(|node| node.transform.rotation)
    }

    fn commit(&mut self, pending: ViewerState) -> Result<(), SceneError> {
        let mut scene = match compose(&pending, &mut self.source, self.next_generation) {
            Ok(scene) => scene,
            Err(e) => {
                error!("Rebuild failed, keeping previous scene: {}", e);
                return Err(e);
            }
        };

        let rotation = Quat::from_rotation_y(pending.rotation_angle);
        for handle in std::iter::once(scene.mesh).chain(scene.outline) {
            if let Some(node) = scene.graph.get_mut(handle) {
                node.transform.rotation = rotation;
            }
        }

        self.next_generation += 1;
        self.scene = Some(scene);
        self.state = pending;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loaders::{MeshData, MeshLoadError};
    use glam::Vec3;

    struct MockSource {
        data: MeshData,
        fail: bool,
    }

    impl MockSource {
        fn new() -> Self {
            Self {
                data: MeshData {
                    positions: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
                    normals: None,
                    indices: vec![0, 1, 2],
                },
                fail: false,
            }
        }
    }

    impl MeshSource for MockSource {
        fn load_mesh(&mut self, model: Model) -> Result<&MeshData, MeshLoadError> {
            if self.fail {
                return Err(MeshLoadError::NotFileBacked(model));
            }
            Ok(&self.data)
        }
    }

    struct MockController {
        pressed: Vec<Button>,
    }

    impl Controller for MockController {
        fn is_down(&self, button: Button) -> bool {
            self.pressed.contains(&button)
        }
    }

    fn keys(pressed: &[Button]) -> MockController {
        MockController {
            pressed: pressed.to_vec(),
        }
    }

    #[test]
    fn test_default_state() {
        let state = ViewerState::default();
        assert_eq!(state.model, Model::Bunny);
        assert_eq!(state.mode, ShadingMode::Flat);
        assert!(!state.outline);
    }

    #[test]
    fn test_command_mapping() {
        assert_eq!(
            ViewerCommand::for_button(Button::Digit2),
            Some(ViewerCommand::SetShading(ShadingMode::WarmCool))
        );
        assert_eq!(
            ViewerCommand::for_button(Button::KeyO),
            Some(ViewerCommand::ToggleOutline)
        );
        assert_eq!(ViewerCommand::for_button(Button::Escape), None);
    }

    #[test]
    fn test_cycle_model_command() {
        let mut state = ViewerState::default();
        ViewerCommand::CycleModel.apply(&mut state);
        assert_eq!(state.model, Model::Teapot);
        ViewerCommand::CycleModel.apply(&mut state);
        assert_eq!(state.model, Model::Bunny);
    }

    #[test]
    fn test_new_composes_initial_scene() {
        let (viewer, error) = ViewerController::new(ViewerState::default(), MockSource::new());
        assert!(error.is_none());
        assert!(viewer.scene().is_some());
        assert_eq!(viewer.mesh_rotation(), Some(Quat::IDENTITY));
    }

    #[test]
    fn test_initial_failure_leaves_no_scene() {
        let mut source = MockSource::new();
        source.fail = true;
        let (viewer, error) = ViewerController::new(ViewerState::default(), source);
        assert!(matches!(error, Some(SceneError::MeshLoad { model: Model::Bunny, .. })));
        assert!(viewer.scene().is_none());
        assert_eq!(viewer.mesh_rotation(), None);
    }

    #[test]
    fn test_key_press_rebuilds_once() {
        let (mut viewer, _) = ViewerController::new(ViewerState::default(), MockSource::new());
        let generation = viewer.graph().unwrap().generation();

        assert!(viewer.handle_input(&keys(&[Button::Digit3, Button::KeyO])));
        assert_eq!(viewer.state().mode, ShadingMode::Cel);
        assert!(viewer.state().outline);
        assert_eq!(viewer.graph().unwrap().generation(), generation + 1);

        // Held keys do nothing
        assert!(!viewer.handle_input(&keys(&[Button::Digit3, Button::KeyO])));
        assert_eq!(viewer.graph().unwrap().generation(), generation + 1);
    }

    #[test]
    fn test_tick_rotates_mesh_and_outline_together() {
        let state = ViewerState {
            outline: true,
            ..Default::default()
        };
        let (mut viewer, _) = ViewerController::new(state, MockSource::new());
        viewer.tick(0.5);

        let scene = viewer.scene().unwrap();
        let mesh = scene.graph.get(scene.mesh).unwrap();
        let outline = scene.graph.get(scene.outline.unwrap()).unwrap();

        assert!(mesh
            .transform
            .rotation
            .abs_diff_eq(Quat::from_rotation_y(0.5), 1e-6));
        assert_eq!(mesh.transform.rotation, outline.transform.rotation);
        assert!((viewer.state().elapsed - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_failed_rebuild_keeps_state_and_scene() {
        let (mut viewer, _) = ViewerController::new(ViewerState::default(), MockSource::new());
        let before_state = viewer.state().clone();
        let before_scene = viewer.scene().cloned();

        viewer.source_mut().fail = true;
        assert!(viewer.apply(ViewerCommand::CycleModel).is_err());

        assert_eq!(viewer.state(), &before_state);
        assert_eq!(viewer.scene().cloned(), before_scene);
    }

    #[test]
    fn test_rotation_angle_wraps() {
        let (mut viewer, _) = ViewerController::new(ViewerState::default(), MockSource::new());
        viewer.tick(TAU + 1.0);
        assert!((viewer.state().rotation_angle - 1.0).abs() < 1e-4);
    }
}
