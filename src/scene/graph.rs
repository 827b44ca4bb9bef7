use glam::{Mat4, Quat, Vec3};

use crate::mesh::Geometry;
use crate::shading::{Material, ShaderVariant};

/// Reference to a node in one specific graph generation
///
/// Handles from a replaced graph never resolve against its successor, so a
/// caller holding a stale handle gets `None` instead of a wrong node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle {
    index: usize,
    generation: u64,
}

impl NodeHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Local transform: scale, then rotate, then translate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Perspective camera that always looks at `target`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub target: Vec3,
}

impl Camera {
    pub fn view_matrix(&self, eye: Vec3) -> Mat4 {
        Mat4::look_at_rh(eye, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_degrees.to_radians(), aspect, self.near, self.far)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    Ambient {
        color: Vec3,
    },
    /// Attenuation is (constant, linear, quadratic)
    Point {
        diffuse: Vec3,
        specular: Vec3,
        attenuation: Vec3,
    },
}

/// One node of the render graph
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderNode {
    pub name: String,
    pub transform: Transform,
    pub geometry: Option<Geometry>,
    pub material: Option<Material>,
    pub shader: Option<ShaderVariant>,
    pub camera: Option<Camera>,
    pub light: Option<Light>,
    parent: Option<usize>,
    children: Vec<usize>,
}

impl RenderNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    pub fn with_shading(mut self, shader: ShaderVariant, material: Material) -> Self {
        self.shader = Some(shader);
        self.material = Some(material);
        self
    }

    pub fn with_camera(mut self, camera: Camera) -> Self {
        self.camera = Some(camera);
        self
    }

    pub fn with_light(mut self, light: Light) -> Self {
        self.light = Some(light);
        self
    }

    /// A node is drawn when it carries both geometry and a shader
    pub fn is_drawable(&self) -> bool {
        self.geometry.is_some() && self.shader.is_some()
    }
}

/// Drawable node resolved to world space
#[derive(Debug, Clone, Copy)]
pub struct Drawable<'a> {
    pub handle: NodeHandle,
    pub node: &'a RenderNode,
    pub world: Mat4,
}

/// Arena-backed node tree; index 0 is the root
///
/// Nodes are never removed. A graph is built once per rebuild and replaced
/// as a whole.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderGraph {
    generation: u64,
    nodes: Vec<RenderNode>,
}

impl RenderGraph {
    pub fn new(generation: u64) -> Self {
        Self {
            generation,
            nodes: vec![RenderNode::new("root")],
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn root(&self) -> NodeHandle {
        self.handle(0)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn add_to_root(&mut self, node: RenderNode) -> NodeHandle {
        self.attach(0, node)
    }

    /// Adds `node` under `parent`; None if `parent` is from another generation
    pub fn add_child(&mut self, parent: NodeHandle, node: RenderNode) -> Option<NodeHandle> {
        let parent = self.resolve(parent)?;
        Some(self.attach(parent, node))
    }

    pub fn get(&self, handle: NodeHandle) -> Option<&RenderNode> {
        self.resolve(handle).map(|index| &self.nodes[index])
    }

    pub fn get_mut(&mut self, handle: NodeHandle) -> Option<&mut RenderNode> {
        self.resolve(handle).map(move |index| &mut self.nodes[index])
    }

    pub fn children(&self, handle: NodeHandle) -> Vec<NodeHandle> {
        self.resolve(handle)
            .map(|index| {
                self.nodes[index]
                    .children
                    .iter()
                    .map(|&child| self.handle(child))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn parent(&self, handle: NodeHandle) -> Option<NodeHandle> {
        let index = self.resolve(handle)?;
        self.nodes[index].parent.map(|parent| self.handle(parent))
    }

    /// Composed transform from the root down to `handle`
    pub fn world_matrix(&self, handle: NodeHandle) -> Option<Mat4> {
        let mut index = self.resolve(handle)?;
        let mut world = self.nodes[index].transform.matrix();

        while let Some(parent) = self.nodes[index].parent {
            world = self.nodes[parent].transform.matrix() * world;
            index = parent;
        }

        Some(world)
    }

    /// Drawable nodes in depth-first order
    pub fn drawables(&self) -> Vec<Drawable<'_>> {
        let mut out = Vec::new();
        self.collect_drawables(0, Mat4::IDENTITY, &mut out);
        out
    }

    /// Number of nodes carrying geometry
    pub fn mesh_node_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.geometry.is_some()).count()
    }

    /// First camera in the graph with its world-space eye position
    pub fn active_camera(&self) -> Option<(Vec3, &Camera)> {
        self.find_component(|node| node.camera.as_ref())
            .next()
            .map(|(world, camera)| (world.w_axis.truncate(), camera))
    }

    /// All lights with their world-space positions
    pub fn lights(&self) -> impl Iterator<Item = (Vec3, &Light)> + '_ {
        self.find_component(|node| node.light.as_ref())
            .map(|(world, light)| (world.w_axis.truncate(), light))
    }

    fn find_component<'a, T: 'a>(
        &'a self,
        pick: impl Fn(&'a RenderNode) -> Option<&'a T> + 'a,
    ) -> impl Iterator<Item = (Mat4, &'a T)> + 'a {
        (0..self.nodes.len()).filter_map(move |index| {
            let component = pick(&self.nodes[index])?;
            let world = self.world_matrix(self.handle(index))?;
            Some((world, component))
        })
    }

    fn collect_drawables<'a>(&'a self, index: usize, parent_world: Mat4, out: &mut Vec<Drawable<'a>>) {
        let node = &self.nodes[index];
        let world = parent_world * node.transform.matrix();

        if node.is_drawable() {
            out.push(Drawable {
                handle: self.handle(index),
                node,
                world,
            });
        }

        for &child in &node.children {
            self.collect_drawables(child, world, out);
        }
    }

    fn attach(&mut self, parent: usize, mut node: RenderNode) -> NodeHandle {
        let index = self.nodes.len();
        node.parent = Some(parent);
        node.children.clear();
        self.nodes.push(node);
        self.nodes[parent].children.push(index);
        self.handle(index)
    }

    fn resolve(&self, handle: NodeHandle) -> Option<usize> {
        (handle.generation == self.generation && handle.index < self.nodes.len())
            .then_some(handle.index)
    }

    fn handle(&self, index: usize) -> NodeHandle {
        NodeHandle {
            index,
            generation: self.generation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::primitives::quad;

    #[test]
    fn test_new_graph_has_only_root() {
        let graph = RenderGraph::new(3);
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.generation(), 3);
        assert_eq!(graph.get(graph.root()).unwrap().name, "root");
        assert!(graph.parent(graph.root()).is_none());
    }

    #[test]
    fn test_children_keep_insertion_order() {
        let mut graph = RenderGraph::new(0);
        let a = graph.add_to_root(RenderNode::new("a"));
        let b = graph.add_to_root(RenderNode::new("b"));

        assert_eq!(graph.children(graph.root()), vec![a, b]);
        assert_eq!(graph.parent(b), Some(graph.root()));
    }

    #[test]
    fn test_stale_handle_does_not_resolve() {
        let mut old = RenderGraph::new(1);
        let stale = old.add_to_root(RenderNode::new("mesh"));

        let mut new = RenderGraph::new(2);
        new.add_to_root(RenderNode::new("mesh"));

        assert!(new.get(stale).is_none());
        assert!(new.get_mut(stale).is_none());
        assert!(new.add_child(stale, RenderNode::new("x")).is_none());
        assert!(new.world_matrix(stale).is_none());
    }

    #[test]
    fn test_world_matrix_composes_parents() {
        let mut graph = RenderGraph::new(0);
        let parent = graph.add_to_root(
            RenderNode::new("parent").with_transform(Transform::from_position(Vec3::X)),
        );
        let child = graph
            .add_child(
                parent,
                RenderNode::new("child").with_transform(Transform::from_position(Vec3::Y)),
            )
            .unwrap();

        let world = graph.world_matrix(child).unwrap();
        assert!(world
            .transform_point3(Vec3::ZERO)
            .abs_diff_eq(Vec3::new(1.0, 1.0, 0.0), 1e-6));
    }

    #[test]
    fn test_drawables_require_geometry_and_shader() {
        let mut graph = RenderGraph::new(0);
        graph.add_to_root(RenderNode::new("bare").with_geometry(quad().unwrap()));
        let drawn = graph.add_to_root(
            RenderNode::new("drawn")
                .with_geometry(quad().unwrap())
                .with_shading(ShaderVariant::Flat, Material::BASE),
        );

        let drawables = graph.drawables();
        assert_eq!(drawables.len(), 1);
        assert_eq!(drawables[0].handle, drawn);
        assert_eq!(graph.mesh_node_count(), 2);
    }

    #[test]
    fn test_camera_and_lights_resolve_world_positions() {
        let mut graph = RenderGraph::new(0);
        graph.add_to_root(
            RenderNode::new("camera")
                .with_transform(Transform::from_position(Vec3::new(0.0, 3.0, 10.0)))
                .with_camera(Camera {
                    fov_y_degrees: 45.0,
                    near: 0.1,
                    far: 100.0,
                    target: Vec3::ZERO,
                }),
        );
        graph.add_to_root(
            RenderNode::new("light")
                .with_transform(Transform::from_position(Vec3::splat(3.0)))
                .with_light(Light::Ambient { color: Vec3::ONE }),
        );

        let (eye, _) = graph.active_camera().unwrap();
        assert_eq!(eye, Vec3::new(0.0, 3.0, 10.0));

        let lights: Vec<_> = graph.lights().collect();
        assert_eq!(lights.len(), 1);
        assert_eq!(lights[0].0, Vec3::splat(3.0));
    }

    #[test]
    fn test_transform_matrix_applies_scale_before_translation() {
        let transform = Transform {
            position: Vec3::X,
            rotation: Quat::IDENTITY,
            scale: Vec3::splat(2.0),
        };
        let p = transform.matrix().transform_point3(Vec3::Y);
        assert!(p.abs_diff_eq(Vec3::new(1.0, 2.0, 0.0), 1e-6));
    }
}
