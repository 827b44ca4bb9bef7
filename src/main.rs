use std::sync::Arc;

use clap::Parser;
use glam::EulerRot;
use log::{debug, error, info, warn};
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use toon_viewer::cli::Cli;
use toon_viewer::core::{Clock, FpsCounter, WinitController};
use toon_viewer::hud::HudStatus;
use toon_viewer::loaders::FileMeshSource;
use toon_viewer::renderer::Renderer;
use toon_viewer::viewer::ViewerController;

const FPS_UPDATE_INTERVAL: f32 = 1.0;

// === Application ===

struct App {
    cli: Cli,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    viewer: ViewerController<FileMeshSource>,
    input: WinitController,
    clock: Clock,
    fps: FpsCounter,
}

impl App {
    fn new(cli: Cli) -> Self {
        let source = FileMeshSource::new(&cli.models_dir);
        let (viewer, startup_error) = ViewerController::new(cli.initial_state(), source);
        if let Some(e) = startup_error {
            warn!(
                "Starting without a scene ({}); press a shading or model key to retry",
                e
            );
        }

        Self {
            cli,
            window: None,
            renderer: None,
            viewer,
            input: WinitController::new(),
            clock: Clock::new(),
            fps: FpsCounter::new(FPS_UPDATE_INTERVAL),
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let delta = self.clock.tick();
        if let Some(fps) = self.fps.tick(delta) {
            debug!("FPS: {:.1}", fps);
        }

        self.viewer.frame(delta, &self.input);

        let (Some(renderer), Some(window)) = (&mut self.renderer, &self.window) else {
            return;
        };

        let yaw_degrees = self
            .viewer
            .mesh_rotation()
            .map(|rotation| rotation.to_euler(EulerRot::YXZ).0.to_degrees());
        let status = HudStatus {
            fps: self.fps.fps(),
            state: self.viewer.state(),
            yaw_degrees,
        };

        match renderer.draw(self.viewer.graph(), window, &status) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                renderer.resize(renderer.size())
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                error!("GPU out of memory, exiting");
                event_loop.exit();
            }
            Err(e) => warn!("Render error: {}", e),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match event_loop.create_window(
            Window::default_attributes()
                .with_title("Toon Viewer")
                .with_inner_size(winit::dpi::LogicalSize::new(self.cli.width, self.cli.height)),
        ) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let renderer = match pollster::block_on(Renderer::new(window.clone(), !self.cli.no_ui)) {
            Ok(r) => r,
            Err(e) => {
                error!("Failed to initialize renderer: {:#}", e);
                event_loop.exit();
                return;
            }
        };

        self.clock.reset();
        self.window = Some(window);
        self.renderer = Some(renderer);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // Let egui handle the event first
        if let (Some(renderer), Some(window)) = (&mut self.renderer, &self.window) {
            if renderer.handle_event(window, &event) {
                return;
            }
        }

        self.input.process_event(&event);

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(size);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    info!(
        "Toon Viewer - models from {:?}. Keys: 1/2/3 shading, O outline, M model, Escape quit",
        cli.models_dir
    );

    let event_loop = EventLoop::new()?;
    let mut app = App::new(cli);
    event_loop.run_app(&mut app)?;

    Ok(())
}
