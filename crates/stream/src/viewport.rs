use glam::Vec2;
use tilescape_common::{Cell, CellRange};

/// Maps a camera-relative viewport onto the grid of cells it covers.
///
/// The window starts at the cell under the camera's top-left corner and spans
/// the whole cells that fit in the viewport plus `margin` extra cells on the
/// far edge of each axis. A margin of at least 1 is required for any camera
/// that scrolls by sub-cell amounts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportWindow {
    pub cell_size: f32,
    pub margin: u32,
}

impl ViewportWindow {
    pub fn new(cell_size: f32, margin: u32) -> Self {
        Self { cell_size, margin }
    }

    /// `start = floor(camera / cell_size)`, `end = start + viewport / cell_size + margin`,
    /// with the cell count truncated to whole cells.
    ///
    /// Cameras beyond the addressable grid are pinned so the window keeps its
    /// full size against the last representable cells.
    pub fn visible_range(camera: Vec2, viewport: Vec2, cell_size: f32, margin: u32) -> CellRange {
        let start = (camera / cell_size).floor();
        let span = (viewport / cell_size).floor().max(Vec2::ZERO);
        let margin = i32::try_from(margin).unwrap_or(i32::MAX);
        let (x0, x1) = axis(start.x, span.x, margin);
        let (y0, y1) = axis(start.y, span.y, margin);
        CellRange::new(Cell::new(x0, y0), Cell::new(x1, y1))
    }

    pub fn range(&self, camera: Vec2, viewport: Vec2) -> CellRange {
        Self::visible_range(camera, viewport, self.cell_size, self.margin)
    }

    /// Screen position of a cell's top-left corner.
    pub fn cell_to_screen(&self, cell: Cell, camera: Vec2) -> Vec2 {
        cell.world_origin(self.cell_size) - camera
    }

    /// Cell under a screen-space point.
    pub fn screen_to_cell(&self, screen: Vec2, camera: Vec2) -> Cell {
        let world = ((screen + camera) / self.cell_size).floor();
        Cell::new(world.x as i32, world.y as i32)
    }
}

fn axis(start: f32, span: f32, margin: i32) -> (i32, i32) {
    let len = (span as i32).saturating_add(margin);
    let start = (start as i32).min(i32::MAX - len);
    (start, start + len)
}
