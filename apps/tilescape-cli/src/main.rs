use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use glam::Vec2;
use serde::Serialize;
use tilescape_accel::AcceleratorStatus;
use tilescape_assets::{FsStore, MemoryStore, ResourceStore, TileAtlas};
use tilescape_common::Terrain;
use tilescape_input::{Action, PanCamera, REFERENCE_FPS};
use tilescape_noise::{BatchSampler, CpuSampler, FractalField, HeightmapParams};
use tilescape_render::{FrameDriver, TextRenderer};
use tilescape_stream::{Flythrough, FlythroughSettings, FrameTimer, NoiseConfig, TileMapConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tilescape-cli", about = "CLI tool for streaming procedural tile maps")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML map configuration (overrides --preset)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Built-in map configuration
    #[arg(long, global = true, value_enum, default_value_t = Preset::Infinite)]
    preset: Preset,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Preset {
    /// Fractal Perlin noise, 800x600
    Infinite,
    /// Analytic sin/cos wave, 100x60 tiles
    Wave,
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate info
    Info,
    /// Probe for a GPU accelerator
    Probe,
    /// Render one frame as text
    Map {
        /// Camera x in pixels
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        x: f32,
        /// Camera y in pixels
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        y: f32,
        /// Asset root the sprite paths resolve against (solid swatches when absent)
        #[arg(long)]
        sprites: Option<PathBuf>,
        /// Sample on the GPU when available
        #[arg(long)]
        gpu: bool,
    },
    /// Simulate a camera panning over the map
    Walk {
        /// Number of frames to simulate
        #[arg(short, long, default_value = "300")]
        frames: u32,
        /// Horizontal pan direction
        #[arg(long, default_value = "1", allow_hyphen_values = true)]
        dx: f32,
        /// Vertical pan direction (+ is down)
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        dy: f32,
        /// Disable per-cell caching
        #[arg(long)]
        no_cache: bool,
        /// Sample on the GPU when available
        #[arg(long)]
        gpu: bool,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Simulate the 3D terrain flythrough
    Terrain {
        /// Number of frames to simulate
        #[arg(short, long, default_value = "600")]
        frames: u32,
        /// Use the high-detail heightmap parameters
        #[arg(long)]
        detailed: bool,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct WalkSummary {
    backend: String,
    frames: u32,
    camera: [f32; 2],
    tiles_drawn: usize,
    cells_sampled: usize,
    cache_hits: usize,
    cache_evicted: usize,
    peak_cached_cells: usize,
    anomalies: usize,
    load_errors: usize,
    hit_rate: f64,
    avg_frame: Duration,
    max_frame: Duration,
}

#[derive(Serialize)]
struct TerrainSummary {
    frames: u32,
    regenerations: u64,
    terrain_offset: f64,
    vertices: usize,
    triangles: usize,
    min_height: f32,
    max_height: f32,
    last_generation: Duration,
}

fn load_config(cli: &Cli) -> anyhow::Result<TileMapConfig> {
    match &cli.config {
        Some(path) => TileMapConfig::from_yaml_file(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(match cli.preset {
            Preset::Infinite => TileMapConfig::infinite_map(),
            Preset::Wave => TileMapConfig::wave_map(),
        }),
    }
}

fn sampler(config: &TileMapConfig, gpu: bool) -> anyhow::Result<Box<dyn BatchSampler>> {
    if gpu {
        match config.noise {
            NoiseConfig::Wave { frequency } => match tilescape_accel::probe() {
                AcceleratorStatus::Available(acc) => {
                    return Ok(Box::new(acc.into_wave_sampler(frequency)));
                }
                AcceleratorStatus::Unavailable { reason } => {
                    tracing::warn!(%reason, "falling back to CPU sampling");
                }
            },
            NoiseConfig::Fractal(_) => {
                tracing::warn!("GPU sampling supports the wave field only, using CPU");
            }
        }
    }
    Ok(Box::new(config.cpu_sampler()?))
}

fn atlas(config: &TileMapConfig, sprites: Option<PathBuf>) -> anyhow::Result<TileAtlas<Terrain>> {
    let sources = config.sprite_sources()?;
    let store: Box<dyn ResourceStore> = match sprites {
        Some(root) => Box::new(FsStore::new(root)),
        None => Box::new(MemoryStore::swatches(
            sources.iter().map(|(t, id)| (id.as_str(), t.swatch())),
            8,
        )?),
    };
    Ok(TileAtlas::new(store, sources))
}

fn text_renderer(config: &TileMapConfig) -> anyhow::Result<TextRenderer> {
    let glyphs = config
        .sprite_sources()?
        .into_iter()
        .map(|(terrain, id)| (id, terrain.glyph()));
    Ok(TextRenderer::new(config.tile_size, config.viewport_size()).with_glyphs(glyphs))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&cli)?;

    match cli.command {
        Commands::Info => {
            println!("tilescape-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", tilescape_common::crate_info());
            println!("noise: {}", tilescape_noise::crate_info());
            println!("classify: {}", tilescape_classify::crate_info());
            println!("assets: {}", tilescape_assets::crate_info());
            println!("stream: {}", tilescape_stream::crate_info());
            println!("render: {}", tilescape_render::crate_info());
            println!("accel: {}", tilescape_accel::crate_info());
        }
        Commands::Probe => {
            let status = tilescape_accel::probe();
            println!("accelerator: {}", status.describe());
        }
        Commands::Map { x, y, sprites, gpu } => {
            let grid = config.build_grid(sampler(&config, gpu)?)?;
            let mut driver =
                FrameDriver::new(grid, atlas(&config, sprites)?, text_renderer(&config)?);
            let report = driver.frame(Vec2::new(x, y), config.viewport_size())?;

            println!("{}", driver.renderer().output());
            let (start, end) = (report.range.start, report.range.end);
            println!(
                "cells ({}, {})..({}, {}) drawn={} skipped={} anomalies={} in {:?}",
                start.x,
                start.y,
                end.x,
                end.y,
                report.drawn,
                report.skipped.len(),
                report.anomalies.len(),
                report.stats.frame_time,
            );
        }
        Commands::Walk {
            frames,
            dx,
            dy,
            no_cache,
            gpu,
            json,
        } => {
            let mut grid = config.build_grid(sampler(&config, gpu)?)?;
            grid.set_cache_enabled(!no_cache);
            let backend = grid.sampler().backend().to_string();
            let mut driver = FrameDriver::new(grid, atlas(&config, None)?, text_renderer(&config)?);

            let mut camera = PanCamera::with_frame_speed(Vec2::ZERO, config.camera_speed);
            let action = Action::Pan(Vec2::new(dx, dy).normalize_or_zero());
            let mut timer = FrameTimer::new(frames.max(1) as usize);
            let mut summary = WalkSummary {
                backend,
                frames,
                camera: [0.0; 2],
                tiles_drawn: 0,
                cells_sampled: 0,
                cache_hits: 0,
                cache_evicted: 0,
                peak_cached_cells: 0,
                anomalies: 0,
                load_errors: 0,
                hit_rate: 0.0,
                avg_frame: Duration::ZERO,
                max_frame: Duration::ZERO,
            };
            let mut visible = 0;

            for _ in 0..frames {
                camera.apply(action, 1.0 / REFERENCE_FPS);
                let report = driver.frame(camera.position, config.viewport_size())?;
                let stats = &report.stats;
                timer.record(stats.frame_time);
                visible += stats.cells_visible;
                summary.tiles_drawn += report.drawn;
                summary.cells_sampled += stats.cache_misses;
                summary.cache_hits += stats.cache_hits;
                summary.cache_evicted += stats.cache_evicted;
                summary.peak_cached_cells = summary.peak_cached_cells.max(stats.cached_cells);
                summary.anomalies += report.anomalies.len();
                summary.load_errors += report.load_errors.len();
            }

            summary.camera = camera.position.to_array();
            summary.hit_rate = if visible == 0 {
                0.0
            } else {
                summary.cache_hits as f64 / visible as f64
            };
            summary.avg_frame = timer.average();
            summary.max_frame = timer.max();

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("Walk: {} frames on {}", summary.frames, summary.backend);
                println!(
                    "Camera: ({:.1}, {:.1})",
                    summary.camera[0], summary.camera[1]
                );
                println!(
                    "Tiles drawn: {}, sampled: {}, cache hits: {} ({:.1}%)",
                    summary.tiles_drawn,
                    summary.cells_sampled,
                    summary.cache_hits,
                    summary.hit_rate * 100.0
                );
                println!(
                    "Evicted: {}, peak cache: {}, anomalies: {}, load errors: {}",
                    summary.cache_evicted,
                    summary.peak_cached_cells,
                    summary.anomalies,
                    summary.load_errors
                );
                println!(
                    "Frame time: avg {:?}, max {:?} ({:.0} fps)",
                    summary.avg_frame,
                    summary.max_frame,
                    timer.fps()
                );
            }
        }
        Commands::Terrain {
            frames,
            detailed,
            json,
        } => {
            let params = if detailed {
                HeightmapParams::detailed()
            } else {
                HeightmapParams::default()
            };
            let sampler = CpuSampler::new(FractalField::new(params.fractal_params())?);
            let mut fly = Flythrough::new(sampler, params, FlythroughSettings::default())?;
            for _ in 0..frames {
                fly.advance(1.0 / REFERENCE_FPS)?;
            }

            let summary = TerrainSummary {
                frames,
                regenerations: fly.regenerations(),
                terrain_offset: fly.terrain_offset(),
                vertices: fly.mesh().vertex_count(),
                triangles: fly.mesh().triangle_count(),
                min_height: fly.heightmap().min(),
                max_height: fly.heightmap().max(),
                last_generation: fly.last_generation(),
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!(
                    "Terrain: {} frames, {} regenerations, offset {}",
                    summary.frames, summary.regenerations, summary.terrain_offset
                );
                println!(
                    "Mesh: {} vertices, {} triangles",
                    summary.vertices, summary.triangles
                );
                println!(
                    "Heights: [{:.2}, {:.2}], last generation {:?}",
                    summary.min_height, summary.max_height, summary.last_generation
                );
            }
        }
    }

    Ok(())
}
