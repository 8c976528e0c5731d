use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use egui::Context as EguiContext;
use glam::Vec2;
use tilescape_accel::AcceleratorStatus;
use tilescape_assets::{FsStore, MemoryStore, ResourceStore, TileAtlas};
use tilescape_common::Terrain;
use tilescape_input::{Action, PanCamera, pan_from_keys};
use tilescape_noise::BatchSampler;
use tilescape_render::FrameDriver;
use tilescape_render_wgpu::{QuadBatch, QuadRenderer};
use tilescape_stream::{FrameTimer, NoiseConfig, StreamStats, TileMapConfig};
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "tilescape-desktop", about = "Streaming procedural tile map viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML map configuration (overrides --preset)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Built-in map configuration
    #[arg(long, value_enum, default_value_t = Preset::Infinite)]
    preset: Preset,

    /// Asset root the sprite paths resolve against (solid swatches when absent)
    #[arg(long)]
    sprites: Option<PathBuf>,

    /// Never sample on the GPU
    #[arg(long)]
    cpu: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Preset {
    Infinite,
    Wave,
}

type Driver = FrameDriver<Box<dyn BatchSampler>, Terrain, QuadBatch>;

/// Everything that lives independently of the window and GPU surface.
struct AppState {
    config: TileMapConfig,
    driver: Driver,
    camera: PanCamera,
    accelerator: String,
    show_panel: bool,
    keys_held: HashSet<KeyCode>,
    last_frame: Instant,
    timer: FrameTimer,
    stats: StreamStats,
    drawn: usize,
    skipped: usize,
    anomalies: usize,
}

impl AppState {
    fn new(cli: &Cli) -> Result<Self> {
        let config = match &cli.config {
            Some(path) => TileMapConfig::from_yaml_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => match cli.preset {
                Preset::Infinite => TileMapConfig::infinite_map(),
                Preset::Wave => TileMapConfig::wave_map(),
            },
        };

        let status = if cli.cpu {
            AcceleratorStatus::Unavailable {
                reason: "disabled by --cpu".to_string(),
            }
        } else {
            tilescape_accel::probe()
        };
        let accelerator = status.describe();

        let sampler: Box<dyn BatchSampler> = match (status, config.noise) {
            (AcceleratorStatus::Available(acc), NoiseConfig::Wave { frequency }) => {
                Box::new(acc.into_wave_sampler(frequency))
            }
            _ => Box::new(config.cpu_sampler()?),
        };
        tracing::info!(backend = sampler.backend(), "sampler ready");

        let sources = config.sprite_sources()?;
        let store: Box<dyn ResourceStore> = match &cli.sprites {
            Some(root) => Box::new(FsStore::new(root)),
            None => Box::new(MemoryStore::swatches(
                sources.iter().map(|(t, id)| (id.as_str(), t.swatch())),
                config.tile_size.max(1.0) as u32,
            )?),
        };
        let atlas = TileAtlas::new(store, sources);
        let grid = config.build_grid(sampler)?;
        let driver = FrameDriver::new(grid, atlas, QuadBatch::new(config.tile_size));

        Ok(Self {
            camera: PanCamera::with_frame_speed(Vec2::ZERO, config.camera_speed),
            config,
            driver,
            accelerator,
            show_panel: true,
            keys_held: HashSet::new(),
            last_frame: Instant::now(),
            timer: FrameTimer::new(120),
            stats: StreamStats::default(),
            drawn: 0,
            skipped: 0,
            anomalies: 0,
        })
    }

    fn held(&self, keys: [KeyCode; 2]) -> bool {
        keys.iter().any(|k| self.keys_held.contains(k))
    }

    fn update(&mut self, dt: f32, viewport: Vec2) {
        let action = pan_from_keys(
            self.held([KeyCode::KeyW, KeyCode::ArrowUp]),
            self.held([KeyCode::KeyS, KeyCode::ArrowDown]),
            self.held([KeyCode::KeyA, KeyCode::ArrowLeft]),
            self.held([KeyCode::KeyD, KeyCode::ArrowRight]),
        );
        let speed_mult = if self.keys_held.contains(&KeyCode::ShiftLeft) {
            3.0
        } else {
            1.0
        };
        self.camera.apply(action, dt * speed_mult);

        match self.driver.frame(self.camera.position, viewport) {
            Ok(report) => {
                self.timer.record(report.stats.frame_time);
                self.drawn = report.drawn;
                self.skipped = report.skipped.len();
                self.anomalies = report.anomalies.len();
                self.stats = report.stats;
            }
            Err(err) => tracing::error!(error = %err, "frame failed"),
        }
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::ToggleCache => {
                let grid = self.driver.grid_mut();
                let enabled = !grid.cache_enabled();
                grid.set_cache_enabled(enabled);
                tracing::info!(enabled, "tile cache toggled");
            }
            Action::ToggleOverlay => self.show_panel = !self.show_panel,
            Action::Pan(_) | Action::Noop => {}
        }
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        if pressed {
            self.keys_held.insert(key);
        } else {
            self.keys_held.remove(&key);
        }

        if !pressed {
            return;
        }

        match key {
            KeyCode::KeyC => self.apply(Action::ToggleCache),
            KeyCode::F1 => self.apply(Action::ToggleOverlay),
            KeyCode::Home => self.camera.position = Vec2::ZERO,
            _ => {}
        }
    }

    fn draw_ui(&mut self, ctx: &EguiContext) {
        if !self.show_panel {
            return;
        }

        let grid = self.driver.grid();
        let mut cache = grid.cache_enabled();
        let backend = grid.sampler().backend().to_string();

        egui::SidePanel::left("stats")
            .default_width(260.0)
            .show(ctx, |ui| {
                ui.heading("Tilescape");
                ui.separator();
                ui.label(format!(
                    "Camera: ({:.1}, {:.1})",
                    self.camera.position.x, self.camera.position.y
                ));
                ui.label(format!("Tile size: {}", self.config.tile_size));
                ui.separator();

                ui.heading("Streaming");
                ui.label(format!("Visible cells: {}", self.stats.cells_visible));
                ui.label(format!("Drawn: {}  Skipped: {}", self.drawn, self.skipped));
                ui.label(format!(
                    "Hits: {}  Misses: {}",
                    self.stats.cache_hits, self.stats.cache_misses
                ));
                ui.label(format!(
                    "Cached: {}  Evicted: {}",
                    self.stats.cached_cells, self.stats.cache_evicted
                ));
                ui.label(format!("Hit rate: {:.1}%", self.stats.hit_rate() * 100.0));
                ui.label(format!("Anomalies: {}", self.anomalies));
                ui.checkbox(&mut cache, "Cache tiles (C)");
                ui.separator();

                ui.heading("Timing");
                ui.label(format!(
                    "Grid: avg {:?}  max {:?}",
                    self.timer.average(),
                    self.timer.max()
                ));
                ui.label(format!("Sampler: {backend}"));
                ui.label(format!("Accelerator: {}", self.accelerator));

                ui.separator();
                ui.small("F1: Toggle Panel | WASD/Arrows: Pan | Shift: Fast | Home: Origin");
            });

        if cache != self.driver.grid().cache_enabled() {
            self.apply(Action::ToggleCache);
        }
    }
}

/// Window, surface and GPU resources, created on `resumed`.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: QuadRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Gpu {
    fn new(
        event_loop: &ActiveEventLoop,
        egui_ctx: &EguiContext,
        size: PhysicalSize<u32>,
    ) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title("Tilescape")
            .with_inner_size(size);
        let window = Arc::new(event_loop.create_window(attrs)?);

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
        .context("no adapter can present to this window")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("tilescape_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or(surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = QuadRenderer::new(&device, surface_format, config.width, config.height);

        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    fn viewport(&self) -> Vec2 {
        Vec2::new(self.config.width as f32, self.config.height as f32)
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.config.width = size.width.max(1);
        self.config.height = size.height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.renderer.resize(self.config.width, self.config.height);
    }

    fn redraw(&mut self, state: &mut AppState, egui_ctx: &EguiContext) {
        let output = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
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

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("tile_encoder"),
            });
        self.renderer.render(
            &self.device,
            &self.queue,
            &view,
            &mut encoder,
            state.driver.renderer(),
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        let raw_input = self.egui_winit.take_egui_input(&self.window);
        let full_output = egui_ctx.run(raw_input, |ctx| {
            state.draw_ui(ctx);
        });
        self.egui_winit
            .handle_platform_output(&self.window, full_output.platform_output);

        let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
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
            self.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        output.present();
        self.window.request_redraw();
    }
}

struct App {
    state: AppState,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }

        let [w, h] = self.state.config.viewport;
        let size = PhysicalSize::new(w.max(1.0) as u32, h.max(1.0) as u32);
        match Gpu::new(event_loop, &self.egui_ctx, size) {
            Ok(gpu) => self.gpu = Some(gpu),
            Err(err) => {
                tracing::error!(error = %err, "failed to initialize window");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(gpu) = &mut self.gpu else {
            return;
        };

        let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
        if response.consumed {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                gpu.resize(new_size);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        ..
                    },
                ..
            } => {
                if key == KeyCode::Escape {
                    event_loop.exit();
                    return;
                }
                self.state
                    .handle_key(key, key_state == ElementState::Pressed);
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = (now - self.state.last_frame).as_secs_f32().min(0.1);
                self.state.last_frame = now;
                self.state.update(dt, gpu.viewport());
                gpu.redraw(&mut self.state, &self.egui_ctx);
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("tilescape-desktop starting");

    let state = AppState::new(&cli)?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App {
        state,
        gpu: None,
        egui_ctx: EguiContext::default(),
    };
    event_loop.run_app(&mut app)?;

    Ok(())
}
