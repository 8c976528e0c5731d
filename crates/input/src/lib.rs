//! Input: key state mapped to shared camera actions.
//!
//! # Invariants
//! - Desktop and CLI drive the camera through the same actions.
//! - The camera position is unbounded in every direction.

pub mod action;
pub mod camera;

pub use action::{Action, pan_from_keys};
pub use camera::{PanCamera, REFERENCE_FPS};
