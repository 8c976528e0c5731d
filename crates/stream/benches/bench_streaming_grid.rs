use std::hint::black_box;
use std::time::Instant;

use glam::Vec2;
use tilescape_classify::ThresholdTable;
use tilescape_common::Terrain;
use tilescape_noise::{CpuSampler, FractalField, FractalParams};
use tilescape_stream::{GridSettings, StreamingGrid};

type Grid = StreamingGrid<CpuSampler<FractalField>, Terrain>;

fn make_grid(cache: bool) -> Grid {
    let field = FractalField::new(FractalParams::default()).expect("default params are valid");
    let settings = GridSettings {
        cache,
        ..GridSettings::default()
    };
    StreamingGrid::new(CpuSampler::new(field), ThresholdTable::terrain_default(), settings)
        .expect("default settings are valid")
}

fn bench_static_camera(cache: bool, iterations: usize) {
    let mut grid = make_grid(cache);
    let viewport = Vec2::new(800.0, 600.0);

    let start = Instant::now();
    for _ in 0..iterations {
        let tiles = grid.tiles_in_view(black_box(Vec2::ZERO), viewport).expect("frame");
        black_box(tiles.count());
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  static camera (cache={cache}, {iterations} frames): {per_iter:?}/frame, \
         total {elapsed:?}"
    );
}

fn bench_panning(cache: bool, speed: f32, iterations: usize) {
    let mut grid = make_grid(cache);
    let viewport = Vec2::new(800.0, 600.0);
    let mut camera = Vec2::ZERO;
    let mut sampled = 0;

    let start = Instant::now();
    for _ in 0..iterations {
        camera += Vec2::new(speed, speed * 0.5);
        let tiles = grid.tiles_in_view(black_box(camera), viewport).expect("frame");
        black_box(tiles.count());
        sampled += grid.stats().cache_misses;
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  panning (cache={cache}, {speed} px/frame, {iterations} frames): {per_iter:?}/frame, \
         {sampled} samples, total {elapsed:?}"
    );
}

fn main() {
    println!("=== Streaming Grid Benchmarks ===\n");

    println!("Static camera:");
    bench_static_camera(true, 200);
    bench_static_camera(false, 50);

    println!("\nPanning camera:");
    bench_panning(true, 5.0, 200);
    bench_panning(true, 32.0, 200);
    bench_panning(false, 5.0, 50);

    println!("\n=== Done ===");
}
