use glam::Vec2;
use serde::{Deserialize, Serialize};

/// A discrete grid cell addressed by integer coordinates.
///
/// Cells carry no state of their own; a cell's category is recomputed from
/// the noise field whenever it is needed.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Offset this cell by a signed delta, saturating at the edge of the grid.
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }

    /// Top-left corner of the cell in world units.
    pub fn world_origin(self, cell_size: f32) -> Vec2 {
        Vec2::new(self.x as f32 * cell_size, self.y as f32 * cell_size)
    }
}

/// Half-open rectangle of cells: `start` is inclusive, `end` exclusive on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRange {
    pub start: Cell,
    pub end: Cell,
}

impl CellRange {
    pub fn new(start: Cell, end: Cell) -> Self {
        Self { start, end }
    }

    pub fn width(&self) -> u32 {
        extent(self.start.x, self.end.x)
    }

    pub fn height(&self) -> u32 {
        extent(self.start.y, self.end.y)
    }

    /// Number of cells covered by the range.
    pub fn len(&self) -> usize {
        self.width() as usize * self.height() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.x >= self.start.x
            && cell.x < self.end.x
            && cell.y >= self.start.y
            && cell.y < self.end.y
    }

    /// Iterate the range in raster order: y ascending outer, x ascending inner.
    pub fn iter(&self) -> CellIter {
        CellIter {
            range: *self,
            next: if self.is_empty() { None } else { Some(self.start) },
        }
    }
}

fn extent(start: i32, end: i32) -> u32 {
    (i64::from(end) - i64::from(start)).clamp(0, i64::from(u32::MAX)) as u32
}

impl IntoIterator for CellRange {
    type Item = Cell;
    type IntoIter = CellIter;

    fn into_iter(self) -> CellIter {
        self.iter()
    }
}

/// Row-major iterator over a [`CellRange`].
#[derive(Debug, Clone)]
pub struct CellIter {
    range: CellRange,
    next: Option<Cell>,
}

impl Iterator for CellIter {
    type Item = Cell;

    fn next(&mut self) -> Option<Cell> {
        let current = self.next?;
        self.next = if current.x.saturating_add(1) < self.range.end.x {
            Some(current.offset(1, 0))
        } else if current.y.saturating_add(1) < self.range.end.y {
            Some(Cell::new(self.range.start.x, current.y + 1))
        } else {
            None
        };
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = match self.next {
            None => 0,
            Some(c) => {
                let full_rows = extent(c.y, self.range.end.y).saturating_sub(1) as usize;
                let in_row = extent(c.x, self.range.end.x) as usize;
                full_rows * self.range.width() as usize + in_row
            }
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for CellIter {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_world_origin_handles_negatives() {
        assert_eq!(Cell::new(-2, 3).world_origin(16.0), Vec2::new(-32.0, 48.0));
    }

    #[test]
    fn range_dimensions() {
        let range = CellRange::new(Cell::new(-1, 2), Cell::new(3, 5));
        assert_eq!(range.width(), 4);
        assert_eq!(range.height(), 3);
        assert_eq!(range.len(), 12);
        assert!(range.contains(Cell::new(-1, 2)));
        assert!(!range.contains(Cell::new(3, 2)));
        assert!(!range.contains(Cell::new(0, 5)));
    }

    #[test]
    fn inverted_range_is_empty() {
        let range = CellRange::new(Cell::new(5, 5), Cell::new(2, 9));
        assert!(range.is_empty());
        assert_eq!(range.iter().count(), 0);
    }

    #[test]
    fn iteration_is_row_major() {
        let range = CellRange::new(Cell::new(0, 0), Cell::new(2, 2));
        let cells: Vec<Cell> = range.iter().collect();
        assert_eq!(
            cells,
            vec![
                Cell::new(0, 0),
                Cell::new(1, 0),
                Cell::new(0, 1),
                Cell::new(1, 1),
            ]
        );
    }

    #[test]
    fn ranges_at_the_grid_edge_do_not_overflow() {
        let far = CellRange::new(
            Cell::new(i32::MAX - 2, i32::MIN),
            Cell::new(i32::MAX, i32::MIN + 2),
        );
        assert_eq!(far.width(), 2);
        assert_eq!(far.height(), 2);
        let cells: Vec<Cell> = far.iter().collect();
        assert_eq!(cells.len(), 4);
        assert_eq!(cells[3], Cell::new(i32::MAX - 1, i32::MIN + 1));

        let whole = CellRange::new(Cell::new(i32::MIN, 0), Cell::new(i32::MAX, 1));
        assert_eq!(whole.width(), u32::MAX);
        let corner = Cell::new(i32::MAX, i32::MIN);
        assert_eq!(corner.offset(5, -5), corner);
    }

    #[test]
    fn iterator_reports_exact_size() {
        let range = CellRange::new(Cell::new(-3, -2), Cell::new(4, 3));
        let mut iter = range.iter();
        assert_eq!(iter.len(), 35);
        iter.next();
        iter.next();
        assert_eq!(iter.len(), 33);
        assert_eq!(iter.count(), 33);
    }
}
