use glam::{Mat4, Vec3};

use crate::mesh::Geometry;
use crate::scene::{Camera, Light};
use crate::shading::Material;

/// Interleaved vertex for the shading pipelines
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl GpuVertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GpuVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }

    /// Interleaves a geometry's positions and normals
    pub fn interleave(geometry: &Geometry) -> Vec<GpuVertex> {
        geometry
            .positions()
            .iter()
            .zip(geometry.normals())
            .map(|(position, normal)| GpuVertex {
                position: position.to_array(),
                normal: normal.to_array(),
            })
            .collect()
    }
}

/// Per-frame camera and lighting, bind group 0
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniform {
    pub view_proj: [[f32; 4]; 4],
    pub eye: [f32; 3],
    pub _pad0: f32,
    pub ambient: [f32; 3],
    pub _pad1: f32,
    pub light_position: [f32; 3],
    pub _pad2: f32,
    pub light_diffuse: [f32; 3],
    pub _pad3: f32,
    pub light_specular: [f32; 3],
    pub _pad4: f32,
    /// Constant, linear, quadratic
    pub light_attenuation: [f32; 3],
    pub _pad5: f32,
}

impl SceneUniform {
    /// Builds the uniform from a camera and the graph's lights
    ///
    /// Ambient colors add up. Only the first point light is used; with none,
    /// the diffuse and specular terms are zero.
    pub fn new<'a>(
        eye: Vec3,
        camera: &Camera,
        aspect: f32,
        lights: impl IntoIterator<Item = (Vec3, &'a Light)>,
    ) -> Self {
        let view_proj = camera.projection_matrix(aspect) * camera.view_matrix(eye);

        let mut uniform = Self {
            view_proj: view_proj.to_cols_array_2d(),
            eye: eye.to_array(),
            light_attenuation: [1.0, 0.0, 0.0],
            ..bytemuck::Zeroable::zeroed()
        };

        let mut ambient = Vec3::ZERO;
        let mut have_point = false;
        for (position, light) in lights {
            match *light {
                Light::Ambient { color } => ambient += color,
                Light::Point {
                    diffuse,
                    specular,
                    attenuation,
                } if !have_point => {
                    have_point = true;
                    uniform.light_position = position.to_array();
                    uniform.light_diffuse = diffuse.to_array();
                    uniform.light_specular = specular.to_array();
                    uniform.light_attenuation = attenuation.to_array();
                }
                Light::Point { .. } => {}
            }
        }
        uniform.ambient = ambient.to_array();

        uniform
    }
}

/// Per-node transform and material, bind group 1
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct NodeUniform {
    pub model: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    pub diffuse: [f32; 3],
    pub shininess: f32,
    pub specular: [f32; 3],
    /// World-space extrusion for the silhouette pass
    pub outline_width: f32,
}

impl NodeUniform {
    pub fn new(world: Mat4, material: &Material, outline_width: f32) -> Self {
        Self {
            model: world.to_cols_array_2d(),
            normal_matrix: world.inverse().transpose().to_cols_array_2d(),
            diffuse: material.diffuse.to_array(),
            shininess: material.shininess,
            specular: material.specular.to_array(),
            outline_width,
        }
    }
}
