pub mod composer;
pub mod graph;

pub use composer::{compose, ComposedScene, SceneError, OUTLINE_SCALE_FACTOR};
pub use graph::{Camera, Drawable, Light, NodeHandle, RenderGraph, RenderNode, Transform};
