use std::collections::HashMap;

use glam::{UVec2, Vec2};
use tilescape_assets::Asset;

/// Draw target for one frame of tiles.
///
/// The driver calls `begin_frame`, then `draw` once per visible tile in raster
/// order, then `end_frame`. Positions are screen-space pixels of the tile's
/// top-left corner and may be negative for partially visible tiles.
pub trait TileRenderer {
    fn begin_frame(&mut self) {}

    fn draw(&mut self, asset: &Asset, position: Vec2);

    fn end_frame(&mut self) {}
}

impl<R: TileRenderer + ?Sized> TileRenderer for &mut R {
    fn begin_frame(&mut self) {
        (**self).begin_frame();
    }

    fn draw(&mut self, asset: &Asset, position: Vec2) {
        (**self).draw(asset, position);
    }

    fn end_frame(&mut self) {
        (**self).end_frame();
    }
}

/// Character-grid renderer for terminals and tests.
///
/// Each draw writes the glyph registered for the asset's key into the
/// character cell under the tile's top-left corner. Unregistered keys draw
/// as `?`; draws that land outside the grid are dropped.
#[derive(Debug, Clone)]
pub struct TextRenderer {
    cell_size: f32,
    size: UVec2,
    glyphs: HashMap<String, char>,
    rows: Vec<Vec<char>>,
    draws: usize,
}

impl TextRenderer {
    /// A renderer covering `viewport` pixels at one character per `cell_size` pixels.
    pub fn new(cell_size: f32, viewport: Vec2) -> Self {
        let size = (viewport / cell_size).floor().max(Vec2::ZERO).as_uvec2();
        Self {
            cell_size,
            size,
            glyphs: HashMap::new(),
            rows: vec![vec![' '; size.x as usize]; size.y as usize],
            draws: 0,
        }
    }

    pub fn with_glyphs<K: Into<String>>(
        mut self,
        glyphs: impl IntoIterator<Item = (K, char)>,
    ) -> Self {
        self.glyphs
            .extend(glyphs.into_iter().map(|(key, glyph)| (key.into(), glyph)));
        self
    }

    /// Columns and rows of the character grid.
    pub fn size(&self) -> UVec2 {
        self.size
    }

    /// Draw calls received since the last `begin_frame`.
    pub fn draws(&self) -> usize {
        self.draws
    }

    pub fn glyph_at(&self, column: usize, row: usize) -> Option<char> {
        self.rows.get(row).and_then(|r| r.get(column)).copied()
    }

    /// The current frame, one line per row.
    pub fn output(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl TileRenderer for TextRenderer {
    fn begin_frame(&mut self) {
        for row in &mut self.rows {
            row.fill(' ');
        }
        self.draws = 0;
    }

    fn draw(&mut self, asset: &Asset, position: Vec2) {
        self.draws += 1;
        // Tiles straddling the left or top edge paint the first visible character.
        let cell = ((position + Vec2::splat(self.cell_size * 0.5)) / self.cell_size).floor();
        if cell.x < 0.0 || cell.y < 0.0 {
            return;
        }
        let (column, row) = (cell.x as usize, cell.y as usize);
        let glyph = self.glyphs.get(asset.key()).copied().unwrap_or('?');
        if let Some(slot) = self.rows.get_mut(row).and_then(|r| r.get_mut(column)) {
            *slot = glyph;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilescape_assets::encode_swatch;

    fn asset(key: &str) -> Asset {
        Asset::decode(key, &encode_swatch([0, 0, 0, 255], 1).unwrap()).unwrap()
    }

    #[test]
    fn grid_size_follows_viewport() {
        let renderer = TextRenderer::new(16.0, Vec2::new(800.0, 600.0));
        assert_eq!(renderer.size(), UVec2::new(50, 37));
        assert_eq!(renderer.output().lines().count(), 37);
    }

    #[test]
    fn draws_registered_glyphs() {
        let mut renderer =
            TextRenderer::new(16.0, Vec2::new(48.0, 16.0)).with_glyphs([("sea", '~')]);
        renderer.begin_frame();
        renderer.draw(&asset("sea"), Vec2::new(0.0, 0.0));
        renderer.draw(&asset("rock"), Vec2::new(32.0, 0.0));
        renderer.end_frame();

        assert_eq!(renderer.output(), "~ ?");
        assert_eq!(renderer.draws(), 2);
    }

    #[test]
    fn partially_visible_tiles_snap_to_nearest_cell() {
        let mut renderer = TextRenderer::new(16.0, Vec2::new(32.0, 16.0)).with_glyphs([("a", 'a')]);
        renderer.begin_frame();
        renderer.draw(&asset("a"), Vec2::new(-5.0, 0.0));
        assert_eq!(renderer.glyph_at(0, 0), Some('a'));

        renderer.begin_frame();
        renderer.draw(&asset("a"), Vec2::new(-12.0, 0.0));
        assert_eq!(renderer.glyph_at(0, 0), Some(' '));
    }

    #[test]
    fn off_screen_draws_are_dropped() {
        let mut renderer = TextRenderer::new(16.0, Vec2::new(16.0, 16.0));
        renderer.begin_frame();
        renderer.draw(&asset("a"), Vec2::new(64.0, 64.0));
        renderer.draw(&asset("a"), Vec2::new(-64.0, 0.0));
        assert_eq!(renderer.output(), " ");
        assert_eq!(renderer.draws(), 2);
    }

    #[test]
    fn begin_frame_clears_previous_frame() {
        let mut renderer = TextRenderer::new(16.0, Vec2::new(16.0, 16.0));
        renderer.begin_frame();
        renderer.draw(&asset("a"), Vec2::ZERO);
        renderer.begin_frame();
        assert_eq!(renderer.output(), " ");
        assert_eq!(renderer.draws(), 0);
    }
}
