use std::collections::HashMap;
use std::hash::Hash;
use std::time::Instant;

use glam::{DVec2, Vec2};
use tilescape_classify::{ClassifyError, ThresholdTable};
use tilescape_common::{Cell, CellIter, CellRange, ScreenPosition};
use tilescape_noise::BatchSampler;

use crate::stats::StreamStats;
use crate::viewport::ViewportWindow;
use crate::GridError;

/// Tunables for a [`StreamingGrid`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSettings {
    /// Cell edge length in screen pixels.
    pub cell_size: f32,
    /// Extra cells fetched past the far edge of the viewport.
    pub margin: u32,
    /// Multiplier from cell coordinates to noise-space coordinates.
    pub sample_scale: f64,
    /// Memoize categories across frames.
    pub cache: bool,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            cell_size: 16.0,
            margin: 2,
            sample_scale: 0.05,
            cache: true,
        }
    }
}

impl GridSettings {
    pub fn validate(&self) -> Result<(), GridError> {
        if !self.cell_size.is_finite() || self.cell_size <= 0.0 {
            return Err(GridError::InvalidSettings(format!(
                "cell_size must be finite and positive, got {}",
                self.cell_size
            )));
        }
        if !self.sample_scale.is_finite() || self.sample_scale <= 0.0 {
            return Err(GridError::InvalidSettings(format!(
                "sample_scale must be finite and positive, got {}",
                self.sample_scale
            )));
        }
        Ok(())
    }
}

/// One drawable cell of a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tile<C> {
    pub cell: Cell,
    pub position: ScreenPosition,
    pub category: C,
}

/// A visible cell whose sample could not be classified.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellAnomaly {
    pub cell: Cell,
    pub error: ClassifyError,
}

/// Camera-relative streaming view over an unbounded procedural grid.
///
/// Each frame the grid computes the visible window, samples every cell it
/// does not already know in a single batch, and classifies the samples. With
/// caching on, categories are memoized per cell and entries outside the
/// current window are dropped before sampling, so the cache never holds more
/// than one window's worth of cells.
pub struct StreamingGrid<S, C> {
    sampler: S,
    table: ThresholdTable<C>,
    window: ViewportWindow,
    sample_scale: f64,
    cache: Option<HashMap<Cell, C>>,
    stats: StreamStats,
}

impl<S, C> StreamingGrid<S, C>
where
    S: BatchSampler,
    C: Copy + Eq + Hash,
{
    pub fn new(
        sampler: S,
        table: ThresholdTable<C>,
        settings: GridSettings,
    ) -> Result<Self, GridError> {
        settings.validate()?;
        Ok(Self {
            sampler,
            table,
            window: ViewportWindow::new(settings.cell_size, settings.margin),
            sample_scale: settings.sample_scale,
            cache: settings.cache.then(HashMap::new),
            stats: StreamStats::default(),
        })
    }

    /// Tiles visible from `camera` through a viewport of `viewport` pixels.
    ///
    /// The returned iterator yields tiles in raster order (y outer, x inner) and
    /// is consumed once. Cells whose sample was not finite are left out of the
    /// iteration and listed by [`TilesInView::anomalies`]; they are not cached.
    pub fn tiles_in_view(
        &mut self,
        camera: Vec2,
        viewport: Vec2,
    ) -> Result<TilesInView<C>, GridError> {
        let _span = tracing::info_span!("tiles_in_view").entered();
        let frame_start = Instant::now();

        let range = self.window.range(camera, viewport);

        let mut evicted = 0;
        if let Some(cache) = &mut self.cache {
            let before = cache.len();
            cache.retain(|cell, _| range.contains(*cell));
            evicted = before - cache.len();
            if evicted > 0 {
                tracing::debug!(evicted, retained = cache.len(), "evicted cells outside window");
            }
        }

        let mut slots: Vec<Option<C>> = Vec::with_capacity(range.len());
        let mut misses: Vec<(usize, Cell)> = Vec::new();
        for (index, cell) in range.iter().enumerate() {
            let cached = self.cache.as_ref().and_then(|c| c.get(&cell)).copied();
            if cached.is_none() {
                misses.push((index, cell));
            }
            slots.push(cached);
        }

        let points: Vec<DVec2> = misses
            .iter()
            .map(|(_, cell)| {
                DVec2::new(cell.x as f64 * self.sample_scale, cell.y as f64 * self.sample_scale)
            })
            .collect();
        let samples = if points.is_empty() {
            Vec::new()
        } else {
            self.sampler.sample_points(&points)?
        };
        if samples.len() != points.len() {
            return Err(GridError::SampleCountMismatch {
                expected: points.len(),
                actual: samples.len(),
            });
        }

        let mut anomalies = Vec::new();
        for (&(index, cell), value) in misses.iter().zip(samples) {
            match self.table.classify(value) {
                Ok(category) => {
                    slots[index] = Some(category);
                    if let Some(cache) = &mut self.cache {
                        cache.insert(cell, category);
                    }
                }
                Err(error) => {
                    tracing::warn!(?cell, %error, "unclassifiable sample");
                    anomalies.push(CellAnomaly { cell, error });
                }
            }
        }

        self.stats = StreamStats {
            cells_visible: range.len(),
            cache_hits: range.len() - misses.len(),
            cache_misses: misses.len(),
            cache_evicted: evicted,
            cached_cells: self.cached_cells(),
            anomalies: anomalies.len(),
            frame_time: frame_start.elapsed(),
        };

        tracing::trace!(
            visible = self.stats.cells_visible,
            hits = self.stats.cache_hits,
            misses = self.stats.cache_misses,
            "frame sampled"
        );

        Ok(TilesInView {
            range,
            cells: range.iter(),
            slots: slots.into_iter(),
            window: self.window,
            camera,
            anomalies,
        })
    }

    /// Turn memoization on or off. Disabling drops every cached entry.
    pub fn set_cache_enabled(&mut self, enabled: bool) {
        match (enabled, self.cache.is_some()) {
            (true, false) => self.cache = Some(HashMap::new()),
            (false, true) => self.cache = None,
            _ => {}
        }
    }

    pub fn cache_enabled(&self) -> bool {
        self.cache.is_some()
    }

    pub fn clear_cache(&mut self) {
        if let Some(cache) = &mut self.cache {
            cache.clear();
        }
    }

    pub fn cached_cells(&self) -> usize {
        self.cache.as_ref().map_or(0, HashMap::len)
    }

    pub fn is_cached(&self, cell: Cell) -> bool {
        self.cache.as_ref().is_some_and(|c| c.contains_key(&cell))
    }

    pub fn stats(&self) -> &StreamStats {
        &self.stats
    }

    pub fn window(&self) -> &ViewportWindow {
        &self.window
    }

    pub fn table(&self) -> &ThresholdTable<C> {
        &self.table
    }

    pub fn sampler(&self) -> &S {
        &self.sampler
    }
}

/// The tiles of one frame, in raster order.
///
/// Produced fresh by every [`StreamingGrid::tiles_in_view`] call and consumed once.
pub struct TilesInView<C> {
    range: CellRange,
    cells: CellIter,
    slots: std::vec::IntoIter<Option<C>>,
    window: ViewportWindow,
    camera: Vec2,
    anomalies: Vec<CellAnomaly>,
}

impl<C> TilesInView<C> {
    /// The window this frame covers.
    pub fn range(&self) -> CellRange {
        self.range
    }

    pub fn anomalies(&self) -> &[CellAnomaly] {
        &self.anomalies
    }

    pub fn take_anomalies(&mut self) -> Vec<CellAnomaly> {
        std::mem::take(&mut self.anomalies)
    }
}

impl<C: Copy> Iterator for TilesInView<C> {
    type Item = Tile<C>;

    fn next(&mut self) -> Option<Tile<C>> {
        loop {
            let cell = self.cells.next()?;
            let slot = self.slots.next()?;
            if let Some(category) = slot {
                return Some(Tile {
                    cell,
                    position: self.window.cell_to_screen(cell, self.camera),
                    category,
                });
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.slots.len()))
    }
}
