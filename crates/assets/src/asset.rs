use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage};

/// A decoded tile image.
///
/// Pixels are tightly packed RGBA8, row-major. `mean_color` is the average
/// pixel in linear `[0, 1]` components, used by renderers that draw flat quads.
#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    key: String,
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    mean_color: [f32; 4],
}

impl Asset {
    /// Decode an encoded image (PNG) into an asset identified by `key`.
    pub fn decode(key: &str, bytes: &[u8]) -> Result<Self, image::ImageError> {
        let image = image::load_from_memory(bytes)?.to_rgba8();
        Ok(Self::from_rgba(key, image))
    }

    pub fn from_rgba(key: &str, image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        let pixels = image.into_raw();
        let mean_color = mean_color(&pixels);
        Self {
            key: key.to_string(),
            width,
            height,
            pixels,
            mean_color,
        }
    }

    /// Resource identifier this asset was loaded from.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn mean_color(&self) -> [f32; 4] {
        self.mean_color
    }
}

fn mean_color(pixels: &[u8]) -> [f32; 4] {
    let count = pixels.len() / 4;
    if count == 0 {
        return [0.0; 4];
    }
    let mut sums = [0u64; 4];
    for px in pixels.chunks_exact(4) {
        for (sum, &channel) in sums.iter_mut().zip(px) {
            *sum += channel as u64;
        }
    }
    sums.map(|s| s as f32 / (count as f32 * 255.0))
}

/// Encode a solid-colour square PNG, for palettes that have no sprite art.
pub fn encode_swatch(color: [u8; 4], size: u32) -> Result<Vec<u8>, image::ImageError> {
    let image = RgbaImage::from_pixel(size.max(1), size.max(1), Rgba(color));
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}
