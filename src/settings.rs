//! Simulation settings and preferences
//!
//! Every tunable lives here so a round can be reconfigured from a JSON file
//! without touching the simulation code. Missing fields fall back to
//! [`crate::consts`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::Result;

/// Simulation tuning and player preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimSettings {
    // === Sub-stepping ===
    /// Outer epochs per frame
    pub simulation_updates: u32,
    /// Inner iteration cap per epoch
    pub max_simulation_steps: u32,

    // === Motion ===
    /// Force per unit of drag distance on a shoot gesture
    pub shoot_force: f32,
    /// Rescue speed ceiling and re-arm timeout speed
    pub start_speed: f32,
    /// Squared speed that snaps to rest
    pub rest_speed_sq: f32,
    /// Squared speed above which drag applies
    pub max_speed_sq: f32,
    /// Per-frame drag multiplier
    pub drag: f32,
    /// Impulse factor for contacts between bodies bonded to each other
    pub bonded_damping: f32,
    /// Cosmetic spin ceiling (divided by mass)
    pub max_angular_speed: f32,

    // === Arena ===
    pub field_width: f32,
    pub field_height: f32,
    /// Wall thickness radius
    pub wall_radius: f32,
    /// Multiplier on element table radii
    pub radius_scale: f32,
    /// Edge gap bonded bodies settle at
    pub bond_spacing: f32,

    // === Round ===
    pub lives: u32,
    /// Round length (seconds)
    pub round_time: f32,
    /// Remove an assembly once its target is complete
    pub clear_completed: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            simulation_updates: SIMULATION_UPDATES,
            max_simulation_steps: MAX_SIMULATION_STEPS,

            shoot_force: SHOOT_FORCE,
            start_speed: START_SPEED,
            rest_speed_sq: REST_SPEED_SQ,
            max_speed_sq: MAX_SPEED_SQ,
            drag: DRAG,
            bonded_damping: BONDED_DAMPING,
            max_angular_speed: MAX_ANGULAR_SPEED,

            field_width: FIELD_WIDTH,
            field_height: FIELD_HEIGHT,
            wall_radius: WALL_RADIUS,
            radius_scale: RADIUS_SCALE,
            bond_spacing: BOND_SPACING,

            lives: LIVES,
            round_time: ROUND_TIME,
            clear_completed: true,

            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }
}

impl SimSettings {
    /// Parse settings from JSON (missing fields use defaults)
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a file; a missing file yields defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Save settings as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path.as_ref(), self.to_json()?)?;
        log::info!("Settings saved");
        Ok(())
    }

    /// Number of epochs, never zero
    pub fn epochs(&self) -> u32 {
        self.simulation_updates.max(1)
    }
}
