//! Pointer input for a single frame (deterministic)
//!
//! The host translates its mouse/touch events into edge flags; the
//! simulation never polls a device itself.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Edge and level state of one button during a frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonState {
    /// Went down this frame
    pub pressed: bool,
    /// Is down this frame
    pub held: bool,
    /// Went up this frame
    pub released: bool,
}

impl ButtonState {
    pub fn press() -> Self {
        Self {
            pressed: true,
            held: true,
            released: false,
        }
    }

    pub fn hold() -> Self {
        Self {
            pressed: false,
            held: true,
            released: false,
        }
    }

    pub fn release() -> Self {
        Self {
            pressed: false,
            held: false,
            released: true,
        }
    }
}

/// Pointer commands for a single frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointerInput {
    /// Pointer position in world space
    pub position: Vec2,
    /// Select and drag (bodies teleport to the pointer, wall ends follow it)
    pub drag: ButtonState,
    /// Select and shoot on release
    pub shoot: ButtonState,
}

impl PointerInput {
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn any_pressed(&self) -> bool {
        self.drag.pressed || self.shoot.pressed
    }
}
