use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use glam::Vec2;
use tilescape_assets::{Asset, ResourceLoadError, TileAtlas};
use tilescape_common::{Cell, CellRange};
use tilescape_noise::BatchSampler;
use tilescape_stream::{CellAnomaly, GridError, StreamStats, StreamingGrid};

use crate::TileRenderer;

/// What happened while drawing one frame.
#[derive(Debug)]
pub struct FrameReport<C> {
    pub range: CellRange,
    /// Tiles handed to the renderer.
    pub drawn: usize,
    /// Visible cells not drawn because their category's asset failed to load.
    pub skipped: Vec<Cell>,
    /// One entry per category whose asset failed to load this frame.
    pub load_errors: Vec<ResourceLoadError<C>>,
    /// Visible cells whose sample could not be classified.
    pub anomalies: Vec<CellAnomaly>,
    pub stats: StreamStats,
}

impl<C> FrameReport<C> {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.load_errors.is_empty() && self.anomalies.is_empty()
    }
}

/// Frame loop: streaming grid, then atlas lookup, then one draw per tile.
///
/// Per-cell failures never abort a frame. A category whose asset fails to
/// load is attempted once per frame and its cells are skipped; cells with
/// unclassifiable samples are reported and left blank.
pub struct FrameDriver<S, C, R> {
    grid: StreamingGrid<S, C>,
    atlas: TileAtlas<C>,
    renderer: R,
    frames: u64,
}

impl<S, C, R> FrameDriver<S, C, R>
where
    S: BatchSampler,
    C: Copy + Eq + Hash + Debug,
    R: TileRenderer,
{
    pub fn new(grid: StreamingGrid<S, C>, atlas: TileAtlas<C>, renderer: R) -> Self {
        Self {
            grid,
            atlas,
            renderer,
            frames: 0,
        }
    }

    /// Draw the tiles visible from `camera` through `viewport`.
    ///
    /// Only sampler failures are returned as errors; nothing is drawn for that frame.
    pub fn frame(&mut self, camera: Vec2, viewport: Vec2) -> Result<FrameReport<C>, GridError> {
        let _span = tracing::info_span!("frame", index = self.frames).entered();
        let mut tiles = self.grid.tiles_in_view(camera, viewport)?;
        let range = tiles.range();
        let anomalies = tiles.take_anomalies();

        let mut assets: HashMap<C, Option<Arc<Asset>>> = HashMap::new();
        let mut load_errors = Vec::new();
        let mut skipped = Vec::new();
        let mut drawn = 0;

        self.renderer.begin_frame();
        for tile in tiles {
            let asset = match assets.entry(tile.category) {
                Entry::Occupied(entry) => entry.get().clone(),
                Entry::Vacant(entry) => {
                    let loaded = match self.atlas.get_asset(tile.category) {
                        Ok(asset) => Some(asset),
                        Err(err) => {
                            tracing::warn!(error = %err, "skipping category for this frame");
                            load_errors.push(err);
                            None
                        }
                    };
                    entry.insert(loaded).clone()
                }
            };
            match asset {
                Some(asset) => {
                    self.renderer.draw(&asset, tile.position);
                    drawn += 1;
                }
                None => skipped.push(tile.cell),
            }
        }
        self.renderer.end_frame();
        self.frames += 1;

        if !anomalies.is_empty() {
            tracing::warn!(count = anomalies.len(), "unclassifiable cells left blank");
        }

        Ok(FrameReport {
            range,
            drawn,
            skipped,
            load_errors,
            anomalies,
            stats: self.grid.stats().clone(),
        })
    }

    /// Frames drawn so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn grid(&self) -> &StreamingGrid<S, C> {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut StreamingGrid<S, C> {
        &mut self.grid
    }

    pub fn atlas(&self) -> &TileAtlas<C> {
        &self.atlas
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn into_parts(self) -> (StreamingGrid<S, C>, TileAtlas<C>, R) {
        (self.grid, self.atlas, self.renderer)
    }
}
