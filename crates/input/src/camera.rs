use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::Action;

/// Reference frame rate for per-frame speeds.
pub const REFERENCE_FPS: f32 = 60.0;

/// 2D camera whose position is the world-space pixel at the viewport's top-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PanCamera {
    pub position: Vec2,
    /// Pixels per second.
    pub speed: f32,
}

impl Default for PanCamera {
    fn default() -> Self {
        Self::with_frame_speed(Vec2::ZERO, 5.0)
    }
}

impl PanCamera {
    pub fn new(position: Vec2, speed: f32) -> Self {
        Self { position, speed }
    }

    /// A camera moving `pixels_per_frame` at [`REFERENCE_FPS`].
    pub fn with_frame_speed(position: Vec2, pixels_per_frame: f32) -> Self {
        Self::new(position, pixels_per_frame * REFERENCE_FPS)
    }

    /// Apply `action` over `dt` seconds. Returns `true` if the camera moved.
    pub fn apply(&mut self, action: Action, dt: f32) -> bool {
        match action {
            Action::Pan(direction) => {
                let delta = direction * self.speed * dt.max(0.0);
                self.position += delta;
                delta != Vec2::ZERO
            }
            Action::ToggleCache | Action::ToggleOverlay | Action::Noop => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_reference_frame_moves_frame_speed() {
        let mut camera = PanCamera::with_frame_speed(Vec2::ZERO, 5.0);
        assert!(camera.apply(Action::Pan(Vec2::X), 1.0 / REFERENCE_FPS));
        assert!((camera.position.x - 5.0).abs() < 1e-4);
        assert_eq!(camera.position.y, 0.0);
    }

    #[test]
    fn toggles_do_not_move() {
        let mut camera = PanCamera::default();
        assert!(!camera.apply(Action::ToggleCache, 1.0));
        assert!(!camera.apply(Action::ToggleOverlay, 1.0));
        assert!(!camera.apply(Action::Noop, 1.0));
        assert_eq!(camera.position, Vec2::ZERO);
    }

    #[test]
    fn negative_dt_is_ignored() {
        let mut camera = PanCamera::new(Vec2::new(3.0, 4.0), 100.0);
        assert!(!camera.apply(Action::Pan(Vec2::Y), -1.0));
        assert_eq!(camera.position, Vec2::new(3.0, 4.0));
    }

    #[test]
    fn camera_can_pan_into_negative_space() {
        let mut camera = PanCamera::new(Vec2::ZERO, 10.0);
        camera.apply(Action::Pan(Vec2::new(-1.0, -1.0)), 2.0);
        assert_eq!(camera.position, Vec2::new(-20.0, -20.0));
    }
}
