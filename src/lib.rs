//! Molecats - a molecule-bonding physics puzzle
//!
//! Core modules:
//! - `sim`: Deterministic simulation (sub-stepped circle physics, bonding, targets)
//! - `audio`: Bond feedback cues and clip pools
//! - `settings`: Data-driven tuning and preferences
//! - `error`: Crate error type

pub mod audio;
pub mod error;
pub mod settings;
pub mod sim;

pub use error::{Error, Result};
pub use settings::SimSettings;

use glam::Vec2;

/// Game configuration constants (defaults for [`SimSettings`])
pub mod consts {
    /// Outer simulation epochs per rendered frame
    pub const SIMULATION_UPDATES: u32 = 3;
    /// Inner iterations per epoch (hard cap against unresolvable stacks)
    pub const MAX_SIMULATION_STEPS: u32 = 15;

    /// Multiplier on drag distance when a body is shot
    pub const SHOOT_FORCE: f32 = 100.0;
    /// Speed ceiling after a boundary rescue, and the re-arm timeout speed
    pub const START_SPEED: f32 = 10.0;
    /// Squared speed below which velocity snaps to zero
    pub const REST_SPEED_SQ: f32 = 0.01;
    /// Squared speed above which drag kicks in
    pub const MAX_SPEED_SQ: f32 = 10_000.0;
    /// Velocity multiplier applied per frame above MAX_SPEED_SQ
    pub const DRAG: f32 = 0.98;
    /// Impulse factor between two bodies bonded to each other (they stick)
    pub const BONDED_DAMPING: f32 = 0.0;
    /// Maximum cosmetic spin, divided by body mass
    pub const MAX_ANGULAR_SPEED: f32 = 1.0;

    /// Thickness radius of the walls around the field
    pub const WALL_RADIUS: f32 = 20.0;
    /// Gap bonded bodies try to keep between their edges
    pub const BOND_SPACING: f32 = 10.0;
    /// Element table radii are multiplied by this at spawn
    pub const RADIUS_SCALE: f32 = 0.25;

    /// Default field size
    pub const FIELD_WIDTH: f32 = 1280.0;
    pub const FIELD_HEIGHT: f32 = 720.0;

    /// Lives per round (a failed bond costs one)
    pub const LIVES: u32 = 3;
    /// Round length in seconds
    pub const ROUND_TIME: f32 = 300.0;

    /// Guard for divisions by distances and speeds
    pub const EPSILON: f32 = 1.0e-6;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Unit vector pointing along angle `theta` (radians)
#[inline]
pub fn unit_from_angle(theta: f32) -> Vec2 {
    Vec2::new(theta.cos(), theta.sin())
}

/// Check whether a point lies strictly inside a circle
#[inline]
pub fn point_in_circle(center: Vec2, radius: f32, point: Vec2) -> bool {
    center.distance_squared(point) < radius * radius
}
