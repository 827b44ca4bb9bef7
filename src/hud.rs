use winit::window::Window;

use crate::viewer::ViewerState;

const ACCENT: egui::Color32 = egui::Color32::from_rgb(74, 158, 255);

/// Values shown by the overlay for one frame
#[derive(Debug, Clone, Copy)]
pub struct HudStatus<'a> {
    pub fps: f32,
    pub state: &'a ViewerState,
    /// Mesh yaw in degrees, None while no scene is loaded
    pub yaw_degrees: Option<f32>,
}

impl HudStatus<'_> {
    /// Text lines for the status block
    pub fn lines(&self) -> Vec<String> {
        let yaw = match self.yaw_degrees {
            Some(yaw) => format!("{:.0}°", yaw),
            None => "-".to_string(),
        };
        vec![
            format!("Model: {}", self.state.model),
            format!("Shading: {}", self.state.mode),
            format!(
                "Outline: {}",
                if self.state.outline { "on" } else { "off" }
            ),
            format!("Yaw: {}", yaw),
        ]
    }
}

pub const KEY_LEGEND: [&str; 5] = [
    "1  flat",
    "2  warm-cool",
    "3  cel",
    "O  outline",
    "M  teapot / bunny",
];

/// egui overlay drawn on top of the scene
pub struct Hud {
    ctx: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
}

impl Hud {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat, window: &Window) -> Self {
        let ctx = egui::Context::default();
        let state = egui_winit::State::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let renderer = egui_wgpu::Renderer::new(device, format, egui_wgpu::RendererOptions::default());

        Self {
            ctx,
            state,
            renderer,
        }
    }

    /// Returns true if egui consumed the event
    pub fn handle_event(&mut self, window: &Window, event: &winit::event::WindowEvent) -> bool {
        self.state.on_window_event(window, event).consumed
    }

    #[allow(clippy::too_many_arguments)]
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        window: &Window,
        size_in_pixels: [u32; 2],
        status: &HudStatus<'_>,
    ) {
        let raw_input = self.state.take_egui_input(window);
        let full_output = self.ctx.run(raw_input, |ctx| {
            egui::Window::new("Status")
                .title_bar(false)
                .resizable(false)
                .fixed_pos(egui::pos2(10.0, 10.0))
                .frame(egui::Frame::NONE)
                .show(ctx, |ui| {
                    ui.label(
                        egui::RichText::new(format!("{:.0}", status.fps))
                            .size(32.0)
                            .color(ACCENT),
                    );
                    ui.label(egui::RichText::new("FPS").size(12.0).color(egui::Color32::GRAY));
                    ui.add_space(8.0);
                    for line in status.lines() {
                        ui.label(egui::RichText::new(line).size(14.0).color(egui::Color32::WHITE));
                    }
                    ui.add_space(8.0);
                    for key in KEY_LEGEND {
                        ui.label(egui::RichText::new(key).size(12.0).color(egui::Color32::GRAY));
                    }
                });
        });

        self.state
            .handle_platform_output(window, full_output.platform_output);

        let tris = self
            .ctx
            .tessellate(full_output.shapes, self.ctx.pixels_per_point());
        for (id, image_delta) in &full_output.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, image_delta);
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels,
            pixels_per_point: window.scale_factor() as f32,
        };

        self.renderer
            .update_buffers(device, queue, encoder, &tris, &screen_descriptor);

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            // SAFETY: egui-wgpu wants a 'static pass; the pass is dropped at the
            // end of this block, before the encoder is used again.
            let render_pass_static = unsafe {
                std::mem::transmute::<&mut wgpu::RenderPass<'_>, &mut wgpu::RenderPass<'static>>(
                    &mut render_pass,
                )
            };

            self.renderer
                .render(render_pass_static, &tris, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.renderer.free_texture(id);
        }
    }
}
