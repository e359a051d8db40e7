mod panel;

use anyhow::{Result, anyhow};
use clap::Parser;
use egui::Context as EguiContext;
use geoview_common::ViewportSize;
use geoview_input::{Action, action_for_key};
use geoview_persist::{JsonFileStore, PreferenceStore};
use geoview_render_wgpu::WgpuBackend;
use geoview_viewer::Viewer;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::Key;
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "geoview-desktop", about = "Interactive 3D primitive viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Preference file
    #[arg(long, default_value = "./geoview_prefs.json")]
    prefs: PathBuf,

    /// Shape shown at startup
    #[arg(long, default_value = geoview_viewer::DEFAULT_SHAPE)]
    shape: String,

    /// Initial window width
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Initial window height
    #[arg(long, default_value_t = 720)]
    height: u32,
}

type DesktopViewer = Viewer<WgpuBackend, JsonFileStore>;

/// Per-window GPU state owned by the host. The device and queue live in
/// the backend.
struct Gpu {
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

struct GpuApp {
    prefs_path: PathBuf,
    shape: String,
    initial_size: PhysicalSize<u32>,
    window: Option<Arc<Window>>,
    gpu: Option<Gpu>,
    viewer: Option<DesktopViewer>,
    egui_ctx: EguiContext,
}

impl GpuApp {
    fn new(cli: Cli) -> Self {
        Self {
            prefs_path: cli.prefs,
            shape: cli.shape,
            initial_size: PhysicalSize::new(cli.width, cli.height),
            window: None,
            gpu: None,
            viewer: None,
            egui_ctx: EguiContext::default(),
        }
    }

    fn mount(&mut self, window: Arc<Window>) -> Result<()> {
        let (gpu, backend) = init_gpu(&window, &self.egui_ctx)?;
        let size = window.inner_size();
        let prefs = PreferenceStore::new(JsonFileStore::open(&self.prefs_path));
        let viewer = Viewer::mount(
            backend,
            ViewportSize::new(size.width, size.height),
            prefs,
            &self.shape,
        )?;
        self.gpu = Some(gpu);
        self.viewer = Some(viewer);
        window.request_redraw();
        Ok(())
    }

    /// Tear down the viewer and the surface. The current shape is kept so a
    /// later remount shows it again.
    fn unmount(&mut self) {
        if let Some(mut viewer) = self.viewer.take() {
            self.shape = viewer.state().active_shape_id().to_string();
            viewer.unmount();
        }
        self.gpu = None;
    }

    fn dispatch(&mut self, action: &Action) {
        if let Some(viewer) = &mut self.viewer {
            viewer.dispatch(action);
        }
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn redraw(&mut self) {
        let (Some(window), Some(gpu), Some(viewer)) =
            (self.window.clone(), self.gpu.as_mut(), self.viewer.as_mut())
        else {
            return;
        };
        let size = window.inner_size();
        if size.width == 0 || size.height == 0 {
            return;
        }

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface
                    .configure(viewer.session().backend().device(), &gpu.config);
                window.request_redraw();
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let keep_going = viewer.frame(&view);

        let raw_input = gpu.egui_winit.take_egui_input(&window);
        let mut actions = Vec::new();
        let state = viewer.state();
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            actions = panel::draw(ctx, state);
        });
        gpu.egui_winit
            .handle_platform_output(&window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.config.width, gpu.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        {
            let backend = viewer.session().backend();
            let (device, queue) = (backend.device(), backend.queue());
            for (id, image_delta) in &full_output.textures_delta.set {
                gpu.egui_renderer
                    .update_texture(device, queue, *id, image_delta);
            }
            let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
            gpu.egui_renderer.update_buffers(
                device,
                queue,
                &mut encoder,
                &paint_jobs,
                &screen_descriptor,
            );
            {
                let mut pass = encoder
                    .begin_render_pass(&wgpu::RenderPassDescriptor {
                        label: Some("egui_pass"),
                        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                            view: &view,
                            resolve_target: None,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Load,
                                store: wgpu::StoreOp::Store,
                            },
                        })],
                        depth_stencil_attachment: None,
                        ..Default::default()
                    })
                    .forget_lifetime();
                gpu.egui_renderer
                    .render(&mut pass, &paint_jobs, &screen_descriptor);
            }
            queue.submit(std::iter::once(encoder.finish()));
            for id in &full_output.textures_delta.free {
                gpu.egui_renderer.free_texture(id);
            }
        }

        output.present();

        for action in &actions {
            viewer.dispatch(action);
        }
        if keep_going {
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        self.unmount();

        let window = match &self.window {
            Some(window) => window.clone(),
            None => {
                let attrs = Window::default_attributes()
                    .with_title("Geometry Viewer")
                    .with_inner_size(self.initial_size);
                match event_loop.create_window(attrs) {
                    Ok(window) => {
                        let window = Arc::new(window);
                        self.window = Some(window.clone());
                        window
                    }
                    Err(e) => {
                        tracing::error!("failed to create window: {e}");
                        return;
                    }
                }
            }
        };

        if let Err(e) = self.mount(window) {
            tracing::error!("viewer not mounted: {e:#}");
        }
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        self.unmount();
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.unmount();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let (Some(gpu), Some(window)) = (&mut self.gpu, &self.window) {
            let response = gpu.egui_winit.on_window_event(window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let (Some(gpu), Some(viewer)) = (&mut self.gpu, &mut self.viewer) {
                    gpu.config.width = new_size.width.max(1);
                    gpu.config.height = new_size.height.max(1);
                    gpu.surface
                        .configure(viewer.session().backend().device(), &gpu.config);
                    viewer.resize(new_size.width, new_size.height);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Character(text),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                if let Some(c) = text.chars().next() {
                    let action = action_for_key(c);
                    if action != Action::Noop {
                        self.dispatch(&action);
                    }
                }
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }
}

fn init_gpu(window: &Arc<Window>, egui_ctx: &EguiContext) -> Result<(Gpu, WgpuBackend)> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    });
    let surface = instance.create_surface(window.clone())?;

    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::HighPerformance,
        compatible_surface: Some(&surface),
        force_fallback_adapter: false,
    }))
    .ok_or_else(|| anyhow!("no compatible GPU adapter"))?;

    let (device, queue) = pollster::block_on(adapter.request_device(
        &wgpu::DeviceDescriptor {
            label: Some("geoview_device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            memory_hints: Default::default(),
        },
        None,
    ))?;

    let size = window.inner_size();
    let caps = surface.get_capabilities(&adapter);
    let format = caps
        .formats
        .iter()
        .find(|f| f.is_srgb())
        .or(caps.formats.first())
        .copied()
        .ok_or_else(|| anyhow!("surface reports no texture formats"))?;
    let alpha_mode = caps
        .alpha_modes
        .first()
        .copied()
        .unwrap_or(wgpu::CompositeAlphaMode::Auto);

    let config = wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format,
        width: size.width.max(1),
        height: size.height.max(1),
        present_mode: wgpu::PresentMode::AutoVsync,
        alpha_mode,
        view_formats: vec![],
        desired_maximum_frame_latency: 2,
    };
    surface.configure(&device, &config);

    let egui_winit = egui_winit::State::new(
        egui_ctx.clone(),
        egui::ViewportId::ROOT,
        window.as_ref(),
        Some(window.scale_factor() as f32),
        None,
        None,
    );
    let egui_renderer = egui_wgpu::Renderer::new(&device, format, None, 1, false);

    tracing::info!(
        "GPU initialized with {} backend",
        adapter.get_info().backend.to_str()
    );

    let backend = WgpuBackend::new(
        device,
        queue,
        format,
        ViewportSize::new(size.width, size.height),
    );
    Ok((
        Gpu {
            surface,
            config,
            egui_winit,
            egui_renderer,
        },
        backend,
    ))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("geoview-desktop starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = GpuApp::new(cli);
    event_loop.run_app(&mut app)?;

    Ok(())
}
