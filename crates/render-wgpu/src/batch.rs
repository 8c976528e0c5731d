use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use tilescape_assets::Asset;
use tilescape_render::TileRenderer;

/// Per-tile instance data uploaded to the GPU.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct QuadInstance {
    /// Top-left corner in screen pixels.
    pub offset: [f32; 2],
    pub size: [f32; 2],
    pub color: [f32; 4],
}

impl QuadInstance {
    /// The same quad with its colour converted from sRGB to linear.
    pub fn to_linear(self) -> Self {
        let [r, g, b, a] = self.color;
        Self {
            color: [srgb_to_linear(r), srgb_to_linear(g), srgb_to_linear(b), a],
            ..self
        }
    }
}

/// sRGB-encoded channel to linear.
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// CPU-side collection of one frame's tile quads.
///
/// Each drawn asset becomes a quad of the tile size filled with the asset's
/// mean colour, as stored in the asset (sRGB).
#[derive(Debug, Clone)]
pub struct QuadBatch {
    tile_size: f32,
    instances: Vec<QuadInstance>,
}

impl QuadBatch {
    pub fn new(tile_size: f32) -> Self {
        Self {
            tile_size,
            instances: Vec::new(),
        }
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    pub fn set_tile_size(&mut self, tile_size: f32) {
        self.tile_size = tile_size;
    }

    pub fn instances(&self) -> &[QuadInstance] {
        &self.instances
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn clear(&mut self) {
        self.instances.clear();
    }
}

impl TileRenderer for QuadBatch {
    fn begin_frame(&mut self) {
        self.clear();
    }

    fn draw(&mut self, asset: &Asset, position: Vec2) {
        self.instances.push(QuadInstance {
            offset: position.to_array(),
            size: [self.tile_size; 2],
            color: asset.mean_color(),
        });
    }
}

/// Screen pixel to normalized device coordinates (+y up).
pub fn pixel_to_ndc(pixel: Vec2, screen: Vec2) -> Vec2 {
    Vec2::new(pixel.x / screen.x * 2.0 - 1.0, 1.0 - pixel.y / screen.y * 2.0)
}
