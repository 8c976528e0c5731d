//! Renderer boundary and frame-loop driver.
//!
//! # Invariants
//! - Renderers only receive assets and screen positions; they never see the grid.
//! - Per-cell failures (missing assets, unclassifiable samples) never abort a frame.

mod driver;
mod renderer;

pub use driver::{FrameDriver, FrameReport};
pub use renderer::{TextRenderer, TileRenderer};

pub fn crate_info() -> &'static str {
    "tilescape-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
