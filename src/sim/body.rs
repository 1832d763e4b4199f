//! Circular bodies and the bonding capability carried by catoms

use std::collections::BTreeSet;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::Impactor;
use super::element::Element;
use crate::error::{Error, Result};
use crate::point_in_circle;

/// Stable body handle (never reused within a simulation)
pub type BodyId = u32;

/// Bonding state carried only by catoms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bonding {
    /// Element symbol, used to fill target formula slots
    pub symbol: String,
    /// Spring stiffness toward partners
    pub attraction: f32,
    /// Armed by a shoot gesture, cleared on bond or when the body slows down
    pub ready_to_combine: bool,
    /// Partners this body is bonded to (kept symmetric by the simulation)
    pub bonds: BTreeSet<BodyId>,
}

impl Bonding {
    pub fn new(symbol: impl Into<String>, attraction: f32) -> Self {
        Self {
            symbol: symbol.into(),
            attraction,
            ready_to_combine: false,
            bonds: BTreeSet::new(),
        }
    }
}

/// What a body can do beyond moving and colliding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BodyKind {
    Plain,
    Catom(Bonding),
}

/// A simulated circle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub id: BodyId,
    /// Authoritative position, written back at every epoch boundary
    pub position: Vec2,
    /// Working position during sub-stepping
    pub cached_position: Vec2,
    /// Position at the start of the current inner iteration
    pub old_position: Vec2,
    pub velocity: Vec2,
    /// Accumulated force, consumed by the next integration and then cleared
    pub acceleration: Vec2,
    radius: f32,
    mass: f32,
    /// Unconsumed share of the current epoch's time budget
    pub sim_time_remaining: f32,
    /// Cosmetic rotation (radians)
    pub rotation: f32,
    pub angular_velocity: f32,
    pub kind: BodyKind,
}

fn check_shape(radius: f32, mass: f32) -> Result<()> {
    if !(radius.is_finite() && radius > 0.0) {
        return Err(Error::InvalidRadius(radius));
    }
    if !(mass.is_finite() && mass > 0.0) {
        return Err(Error::InvalidMass(mass));
    }
    Ok(())
}

impl Body {
    /// Create a plain body at rest
    pub fn new(id: BodyId, pos: Vec2, radius: f32, mass: f32) -> Result<Self> {
        check_shape(radius, mass)?;
        Ok(Self {
            id,
            position: pos,
            cached_position: pos,
            old_position: pos,
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            radius,
            mass,
            sim_time_remaining: 0.0,
            rotation: 0.0,
            angular_velocity: 0.0,
            kind: BodyKind::Plain,
        })
    }

    /// Create a catom for the given element, radius scaled by `radius_scale`
    pub fn catom(id: BodyId, pos: Vec2, element: &Element, radius_scale: f32) -> Result<Self> {
        let mut body = Self::new(id, pos, element.radius * radius_scale, element.mass)?;
        body.kind = BodyKind::Catom(Bonding::new(element.symbol, element.attraction));
        Ok(body)
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    #[inline]
    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Accumulate a force for the next integration
    pub fn apply_force(&mut self, force: Vec2) {
        self.acceleration += force;
    }

    /// Teleport (used while dragging)
    pub fn place(&mut self, pos: Vec2) {
        self.position = pos;
        self.cached_position = pos;
        self.old_position = pos;
    }

    pub fn bonding(&self) -> Option<&Bonding> {
        match &self.kind {
            BodyKind::Catom(bonding) => Some(bonding),
            BodyKind::Plain => None,
        }
    }

    pub fn bonding_mut(&mut self) -> Option<&mut Bonding> {
        match &mut self.kind {
            BodyKind::Catom(bonding) => Some(bonding),
            BodyKind::Plain => None,
        }
    }

    pub fn symbol(&self) -> Option<&str> {
        self.bonding().map(|b| b.symbol.as_str())
    }

    pub fn is_ready(&self) -> bool {
        self.bonding().is_some_and(|b| b.ready_to_combine)
    }

    /// Arm or disarm; no-op on plain bodies
    pub fn set_ready(&mut self, ready: bool) {
        if let Some(bonding) = self.bonding_mut() {
            bonding.ready_to_combine = ready;
        }
    }

    pub fn is_bonded_to(&self, other: BodyId) -> bool {
        self.bonding().is_some_and(|b| b.bonds.contains(&other))
    }

    pub fn bond_count(&self) -> usize {
        self.bonding().map_or(0, |b| b.bonds.len())
    }

    /// Add a partner; returns false if already present or not bondable
    pub fn add_bond(&mut self, other: BodyId) -> bool {
        match self.bonding_mut() {
            Some(bonding) => bonding.bonds.insert(other),
            None => false,
        }
    }

    pub fn remove_bond(&mut self, other: BodyId) {
        if let Some(bonding) = self.bonding_mut() {
            bonding.bonds.remove(&other);
        }
    }

    /// Impulse view of this body at its working position
    pub fn impactor(&self) -> Impactor {
        Impactor {
            position: self.cached_position,
            velocity: self.velocity,
            mass: self.mass,
        }
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Point-in-circle test against the working position
    pub fn contains_point(&self, point: Vec2) -> bool {
        point_in_circle(self.cached_position, self.radius, point)
    }

    /// Strict overlap test against the working positions
    pub fn overlaps(&self, other: &Body) -> bool {
        let reach = self.radius + other.radius;
        self.cached_position.distance_squared(other.cached_position) < reach * reach
    }

    /// Roll a fresh cosmetic spin; lighter bodies spin faster
    pub fn randomize_spin<R: Rng>(&mut self, rng: &mut R, max_angular_speed: f32) {
        let mag = max_angular_speed / self.mass;
        self.angular_velocity = if mag > 0.0 {
            rng.random_range(-mag..=mag)
        } else {
            0.0
        };
    }
}
