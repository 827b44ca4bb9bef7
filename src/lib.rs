pub mod cli;
pub mod core;
pub mod hud;
pub mod loaders;
pub mod mesh;
pub mod model;
pub mod renderer;
pub mod scene;
pub mod shading;
pub mod types;
pub mod viewer;

pub use model::Model;
pub use scene::{compose, ComposedScene, SceneError};
pub use shading::{ShaderVariant, ShadingMode};
pub use viewer::{ViewerCommand, ViewerController, ViewerState};
