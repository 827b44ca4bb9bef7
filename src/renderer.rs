use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;
use log::{debug, info};
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::hud::{Hud, HudStatus};
use crate::scene::{NodeHandle, RenderGraph};
use crate::shading::{Material, ShaderVariant};
use crate::types::{GpuVertex, NodeUniform, SceneUniform};

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// World-space distance the silhouette hull is pushed out along its normals
pub const OUTLINE_WIDTH: f32 = 0.08;

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.85,
    g: 0.85,
    b: 0.82,
    a: 1.0,
};

/// Buffers for one drawable node of the current graph
struct GpuMesh {
    handle: NodeHandle,
    shader: ShaderVariant,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// Rasterizes a [`RenderGraph`] with one pipeline per shader variant
pub struct Renderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    size: winit::dpi::PhysicalSize<u32>,
    depth_view: wgpu::TextureView,
    scene_buffer: wgpu::Buffer,
    scene_bind_group: wgpu::BindGroup,
    node_layout: wgpu::BindGroupLayout,
    pipelines: HashMap<ShaderVariant, wgpu::RenderPipeline>,
    meshes: Vec<GpuMesh>,
    uploaded_generation: Option<u64>,
    hud: Option<Hud>,
}

impl Renderer {
    pub async fn new(window: Arc<Window>, show_hud: bool) -> anyhow::Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("Failed to create surface")?;
        let adapter = Self::request_adapter(&instance, &surface).await?;
        let (device, queue) = Self::request_device(&adapter).await?;

        let surface_config = Self::create_surface_config(&surface, &adapter, size);
        surface.configure(&device, &surface_config);

        let depth_view = Self::create_depth_view(&device, size);

        let scene_layout = Self::uniform_layout(&device, "scene_bind_group_layout");
        let node_layout = Self::uniform_layout(&device, "node_bind_group_layout");

        let scene_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Scene Uniform"),
            size: std::mem::size_of::<SceneUniform>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &scene_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: scene_buffer.as_entire_binding(),
            }],
            label: Some("scene_bind_group"),
        });

        let pipelines =
            Self::create_pipelines(&device, &scene_layout, &node_layout, surface_config.format);

        let hud = show_hud.then(|| Hud::new(&device, surface_config.format, &window));

        info!(
            "Renderer initialized: {}x{}, {:?}, {} pipelines",
            size.width,
            size.height,
            surface_config.format,
            pipelines.len()
        );

        Ok(Self {
            device,
            queue,
            surface,
            surface_config,
            size,
            depth_view,
            scene_buffer,
            scene_bind_group,
            node_layout,
            pipelines,
            meshes: Vec::new(),
            uploaded_generation: None,
            hud,
        })
    }

    async fn request_adapter(
        instance: &wgpu::Instance,
        surface: &wgpu::Surface<'_>,
    ) -> anyhow::Result<wgpu::Adapter> {
        instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(surface),
                force_fallback_adapter: false,
            })
            .await
            .context("Failed to find appropriate adapter")
    }

    async fn request_device(adapter: &wgpu::Adapter) -> anyhow::Result<(wgpu::Device, wgpu::Queue)> {
        adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                experimental_features: Default::default(),
                trace: Default::default(),
            })
            .await
            .context("Failed to create device")
    }

    fn create_surface_config(
        surface: &wgpu::Surface,
        adapter: &wgpu::Adapter,
        size: winit::dpi::PhysicalSize<u32>,
    ) -> wgpu::SurfaceConfiguration {
        let surface_caps = surface.get_capabilities(adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);

        wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        }
    }

    fn create_depth_view(
        device: &wgpu::Device,
        size: winit::dpi::PhysicalSize<u32>,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: size.width.max(1),
                height: size.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    fn uniform_layout(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some(label),
        })
    }

    fn create_pipelines(
        device: &wgpu::Device,
        scene_layout: &wgpu::BindGroupLayout,
        node_layout: &wgpu::BindGroupLayout,
        surface_format: wgpu::TextureFormat,
    ) -> HashMap<ShaderVariant, wgpu::RenderPipeline> {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Shading Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/shading.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Shading Pipeline Layout"),
            bind_group_layouts: &[scene_layout, node_layout],
            push_constant_ranges: &[],
        });

        ShaderVariant::ALL
            .iter()
            .map(|&variant| {
                let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some(variant.fragment_entry()),
                    layout: Some(&pipeline_layout),
                    vertex: wgpu::VertexState {
                        module: &shader,
                        entry_point: Some(variant.vertex_entry()),
                        buffers: &[GpuVertex::layout()],
                        compilation_options: Default::default(),
                    },
                    fragment: Some(wgpu::FragmentState {
                        module: &shader,
                        entry_point: Some(variant.fragment_entry()),
                        targets: &[Some(wgpu::ColorTargetState {
                            format: surface_format,
                            blend: Some(wgpu::BlendState::REPLACE),
                            write_mask: wgpu::ColorWrites::ALL,
                        })],
                        compilation_options: Default::default(),
                    }),
                    primitive: wgpu::PrimitiveState {
                        topology: wgpu::PrimitiveTopology::TriangleList,
                        strip_index_format: None,
                        front_face: wgpu::FrontFace::Ccw,
                        // Inverted hull: only the back faces of the outline survive
                        cull_mode: Some(match variant.is_outline() {
                            true => wgpu::Face::Front,
                            false => wgpu::Face::Back,
                        }),
                        polygon_mode: wgpu::PolygonMode::Fill,
                        unclipped_depth: false,
                        conservative: false,
                    },
                    depth_stencil: Some(wgpu::DepthStencilState {
                        format: DEPTH_FORMAT,
                        depth_write_enabled: true,
                        depth_compare: wgpu::CompareFunction::Less,
                        stencil: wgpu::StencilState::default(),
                        bias: wgpu::DepthBiasState::default(),
                    }),
                    multisample: wgpu::MultisampleState {
                        count: 1,
                        mask: !0,
                        alpha_to_coverage_enabled: false,
                    },
                    multiview: None,
                    cache: None,
                });
                (variant, pipeline)
            })
            .collect()
    }

    pub fn size(&self) -> winit::dpi::PhysicalSize<u32> {
        self.size
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.size = new_size;
        self.surface_config.width = new_size.width;
        self.surface_config.height = new_size.height;
        self.surface.configure(&self.device, &self.surface_config);
        self.depth_view = Self::create_depth_view(&self.device, new_size);
    }

    /// Returns true if the HUD consumed the event
    pub fn handle_event(&mut self, window: &Window, event: &winit::event::WindowEvent) -> bool {
        match &mut self.hud {
            Some(hud) => hud.handle_event(window, event),
            None => false,
        }
    }

    /// Replaces GPU meshes when the graph is a new generation
    fn sync_meshes(&mut self, graph: &RenderGraph) {
        if self.uploaded_generation == Some(graph.generation()) {
            return;
        }

        self.meshes = graph
            .drawables()
            .into_iter()
            .filter_map(|drawable| {
                let node = drawable.node;
                let geometry = node.geometry.as_ref()?;
                let shader = node.shader?;

                let vertices = GpuVertex::interleave(geometry);
                let vertex_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Vertex Buffer"),
                    contents: bytemuck::cast_slice(&vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                });
                let index_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Index Buffer"),
                    contents: bytemuck::cast_slice(geometry.indices()),
                    usage: wgpu::BufferUsages::INDEX,
                });
                let uniform_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some("Node Uniform"),
                    size: std::mem::size_of::<NodeUniform>() as wgpu::BufferAddress,
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                });
                let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                    layout: &self.node_layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: uniform_buffer.as_entire_binding(),
                    }],
                    label: Some("node_bind_group"),
                });

                Some(GpuMesh {
                    handle: drawable.handle,
                    shader,
                    vertex_buffer,
                    index_buffer,
                    index_count: geometry.indices().len() as u32,
                    uniform_buffer,
                    bind_group,
                })
            })
            .collect();

        debug!(
            "Uploaded {} meshes for graph generation {}",
            self.meshes.len(),
            graph.generation()
        );
        self.uploaded_generation = Some(graph.generation());
    }

    /// Writes camera, light and per-node uniforms; false if the graph has no camera
    fn write_uniforms(&self, graph: &RenderGraph) -> bool {
        let Some((eye, camera)) = graph.active_camera() else {
            return false;
        };
        let aspect = self.size.width.max(1) as f32 / self.size.height.max(1) as f32;
        let scene = SceneUniform::new(eye, camera, aspect, graph.lights());
        self.queue
            .write_buffer(&self.scene_buffer, 0, bytemuck::cast_slice(&[scene]));

        for drawable in graph.drawables() {
            let Some(mesh) = self.meshes.iter().find(|mesh| mesh.handle == drawable.handle) else {
                continue;
            };
            let material = drawable.node.material.unwrap_or(Material::BASE);
            let width = match mesh.shader.is_outline() {
                true => OUTLINE_WIDTH,
                false => 0.0,
            };
            let uniform = NodeUniform::new(drawable.world, &material, width);
            self.queue
                .write_buffer(&mesh.uniform_buffer, 0, bytemuck::cast_slice(&[uniform]));
        }

        true
    }

    /// Draws the graph (if any) and the HUD (if enabled) into the next frame
    pub fn draw(
        &mut self,
        graph: Option<&RenderGraph>,
        window: &Window,
        status: &HudStatus<'_>,
    ) -> Result<(), wgpu::SurfaceError> {
        let has_camera = match graph {
            Some(graph) => {
                self.sync_meshes(graph);
                self.write_uniforms(graph)
            }
            None => false,
        };

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if has_camera {
                render_pass.set_bind_group(0, &self.scene_bind_group, &[]);
                for mesh in &self.meshes {
                    let Some(pipeline) = self.pipelines.get(&mesh.shader) else {
                        continue;
                    };
                    render_pass.set_pipeline(pipeline);
                    render_pass.set_bind_group(1, &mesh.bind_group, &[]);
                    render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                    render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    render_pass.draw_indexed(0..mesh.index_count, 0, 0..1);
                }
            }
        }

        if let Some(hud) = &mut self.hud {
            hud.render(
                &self.device,
                &self.queue,
                &mut encoder,
                &view,
                window,
                [self.size.width, self.size.height],
                status,
            );
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}
