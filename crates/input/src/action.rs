use glam::Vec2;

/// A high-level action produced by any front end.
///
/// Front ends translate raw key events into actions; the camera and the
/// streaming grid consume actions, never raw input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Pan the camera along a screen-space direction (+y is down).
    Pan(Vec2),
    /// Turn per-cell category caching on or off.
    ToggleCache,
    /// Show or hide the stats overlay.
    ToggleOverlay,
    /// No-op (used for input mapping that hasn't been bound yet).
    Noop,
}

/// Panning action for the held direction keys, or `Noop` when they cancel out.
///
/// Diagonals are normalized so every direction pans at the same speed.
pub fn pan_from_keys(up: bool, down: bool, left: bool, right: bool) -> Action {
    let axis = |neg: bool, pos: bool| (pos as i8 - neg as i8) as f32;
    let direction = Vec2::new(axis(left, right), axis(up, down));
    if direction == Vec2::ZERO {
        Action::Noop
    } else {
        Action::Pan(direction.normalize())
    }
}
