use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

// Import from the library crate
use cat_viewer::{
    config::ViewerConfig,
    controller::{ViewerEvent, ViewerState},
    logging,
    model::AssetError,
    ui::{self, UiAction, UiState},
    view::{GpuContext, Renderer, UiFrame},
};

/// Everything that exists once the window is up.
struct Viewer {
    window: Arc<Window>,
    gpu: GpuContext,
    renderer: Renderer,
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    state: ViewerState,
    ui_state: UiState,
    config: ViewerConfig,
    last_frame_time: Instant,
}

impl Viewer {
    fn new(event_loop: &ActiveEventLoop, config: &ViewerConfig) -> anyhow::Result<Self> {
        let window_attributes = Window::default_attributes()
            .with_title("Cat")
            .with_inner_size(winit::dpi::PhysicalSize::new(config.window_width, config.window_height));
        let window = Arc::new(event_loop.create_window(window_attributes).context("creating window")?);

        let gpu = pollster::block_on(GpuContext::new(window.clone())).context("initializing graphics")?;
        let mut renderer = Renderer::new(&gpu, config).context("building shader programs")?;
        let mut state = ViewerState::new(renderer.program_count(), gpu.config.width, gpu.config.height);

        let model_path = config.default_model_path();
        let info = renderer
            .load_model(&model_path, state.texture_variant(), state.current_program())
            .with_context(|| format!("loading {}", model_path.display()))?;
        state.apply_loaded_model(&info);

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );

        tracing::info!("Viewer ready with {} programs", renderer.program_count());
        Ok(Self {
            window,
            gpu,
            renderer,
            egui_ctx,
            egui_state,
            state,
            ui_state: UiState::new(config),
            config: config.clone(),
            last_frame_time: Instant::now(),
        })
    }

    fn input(&mut self, event: &WindowEvent) {
        // First let egui process the event
        let egui_captured = self.egui_state.on_window_event(self.window.as_ref(), event).consumed;

        let Some(viewer_event) = ViewerEvent::from_window_event(event) else {
            return;
        };
        // Releases and cursor motion always reach the viewer so nothing stays held.
        let always = matches!(
            viewer_event,
            ViewerEvent::KeyUp(_)
                | ViewerEvent::MouseUp(_)
                | ViewerEvent::CursorMoved(_)
                | ViewerEvent::Resized { .. }
                | ViewerEvent::FocusLost
        );
        if always || !egui_captured {
            self.state.handle_event(&viewer_event);
        }
    }

    fn resize(&mut self, size: winit::dpi::PhysicalSize<u32>) {
        self.gpu.resize(size.width, size.height);
        self.renderer.resize(size.width, size.height);
    }

    fn reload_model(&mut self, path: &Path) {
        match self.renderer.load_model(path, self.state.texture_variant(), self.state.current_program()) {
            Ok(info) => {
                self.state.apply_loaded_model(&info);
                self.ui_state.status = None;
            }
            Err(e) => self.report_load_error(e),
        }
    }

    fn report_load_error(&mut self, error: AssetError) {
        tracing::error!("{}", error);
        self.ui_state.status = Some(error.to_string());
    }

    fn current_model_path(&self) -> PathBuf {
        self.renderer
            .model_info()
            .map(|info| info.path.clone())
            .unwrap_or_else(|| self.config.default_model_path())
    }

    fn apply(&mut self, action: UiAction) {
        match action {
            UiAction::CycleTexture => {
                let variant = self.state.cycle_texture();
                tracing::info!("Texture variant {}", variant.index() + 1);
                let path = self.current_model_path();
                self.reload_model(&path);
                self.state.reset_spin();
            }
            UiAction::SelectProgram(index) => {
                if self.state.select_program(index) {
                    self.renderer.rebind_model(index);
                }
            }
            UiAction::LoadModel(path) => self.reload_model(&path),
            UiAction::LoadTexture(path) => {
                match self.renderer.load_texture(&path, self.state.current_program()) {
                    Ok(()) => self.ui_state.status = None,
                    Err(e) => self.report_load_error(e),
                }
            }
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        let dt = (now - self.last_frame_time).as_secs_f32();
        self.last_frame_time = now;

        self.state.update(dt);

        let raw_input = self.egui_state.take_egui_input(&self.window);
        let program_names = self.renderer.program_names();
        let mut actions = Vec::new();
        let output = self.egui_ctx.run(raw_input, |ctx| {
            actions = ui::draw_viewer_ui(
                ctx,
                &mut self.ui_state,
                &mut self.state,
                self.renderer.model_info(),
                &program_names,
            );
        });
        self.egui_state.handle_platform_output(&self.window, output.platform_output);

        for action in actions {
            self.apply(action);
        }

        let primitives = self.egui_ctx.tessellate(output.shapes, output.pixels_per_point);
        let frame = UiFrame {
            primitives: &primitives,
            textures_delta: &output.textures_delta,
            pixels_per_point: output.pixels_per_point,
        };

        match self.renderer.draw_frame(&self.gpu, &self.state, frame) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => self.gpu.reconfigure(),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                tracing::error!("Out of GPU memory, exiting");
                self.renderer.terminate();
                event_loop.exit();
            }
            Err(e) => tracing::warn!("Dropped frame: {:?}", e),
        }
    }
}

struct App {
    config: ViewerConfig,
    viewer: Option<Viewer>,
    startup_error: Option<anyhow::Error>,
}

impl App {
    fn new(config: ViewerConfig) -> Self {
        Self { config, viewer: None, startup_error: None }
    }

    fn finish(self) -> anyhow::Result<()> {
        match self.startup_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.viewer.is_some() {
            return;
        }

        match Viewer::new(event_loop, &self.config) {
            Ok(viewer) => self.viewer = Some(viewer),
            Err(e) => {
                tracing::error!("Startup failed: {:#}", e);
                self.startup_error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(viewer) = self.viewer.as_mut() else {
            return;
        };
        if window_id != viewer.window.id() {
            return;
        }

        viewer.input(&event);
        match event {
            WindowEvent::CloseRequested => {
                viewer.renderer.terminate();
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => viewer.resize(physical_size),
            WindowEvent::RedrawRequested => viewer.redraw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(viewer) = &self.viewer {
            viewer.window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(viewer) = self.viewer.as_mut() {
            viewer.renderer.terminate();
        }
    }
}

fn main() -> anyhow::Result<()> {
    logging::init();

    let config = ViewerConfig::from_env();
    tracing::info!("Assets directory: {}", config.assets_dir().display());

    let event_loop = EventLoop::new().context("creating event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop.run_app(&mut app).context("running event loop")?;
    app.finish()
}
