//! Simulation state and round bookkeeping
//!
//! `Simulation` owns every body and wall of one round. Bodies live in a
//! vector sorted by id; removals are queued and only applied after the
//! physics of a frame has finished, so indices stay valid while the
//! collision loops run.

use std::collections::BTreeSet;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::body::{Body, BodyId};
use super::element::{ELEMENTS, Element};
use super::molecats::{Molecule, MoleculeQueue};
use super::segment::{LineSegment, SegmentEnd};
use crate::error::Result;
use crate::settings::SimSettings;
use crate::unit_from_angle;

/// How a round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundOutcome {
    /// The target queue ran out
    Completed,
    /// Too many failed bonds
    OutOfLives,
    /// The round timer expired
    TimeUp,
}

/// Current phase of the round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    Playing,
    Over(RoundOutcome),
}

/// Something the scene, UI or audio layer may want to react to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    /// Two catoms bonded; `consumed` is the symbol taken from the target
    BondFormed {
        a: BodyId,
        b: BodyId,
        consumed: Option<String>,
    },
    /// A bond attempt did not fit the current target
    BondFailed { a: BodyId, b: BodyId },
    /// The current target was assembled
    TargetCompleted { name: String, members: Vec<BodyId> },
    /// The current target was given up after a failed bond
    TargetForfeited { name: String, remaining: Molecule },
    BodyRemoved { id: BodyId },
    RoundOver { outcome: RoundOutcome },
}

/// What the pointer is holding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selection {
    Body(BodyId),
    Segment { index: usize, end: SegmentEnd },
}

/// One round of the bonding game
#[derive(Debug, Clone)]
pub struct Simulation {
    pub settings: SimSettings,
    /// Run seed for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
    /// Live bodies, sorted by id
    pub(crate) bodies: Vec<Body>,
    pub(crate) segments: Vec<LineSegment>,
    pub(crate) targets: MoleculeQueue,
    /// Bodies bonded toward the current target
    pub(crate) assembly: BTreeSet<BodyId>,
    /// Bodies whose symbol already counted toward the current target
    pub(crate) consumed: BTreeSet<BodyId>,
    pub(crate) pending_removal: BTreeSet<BodyId>,
    pub(crate) selection: Option<Selection>,
    pub(crate) lives: u32,
    pub(crate) score: u32,
    pub(crate) time_left: f32,
    pub(crate) phase: RoundPhase,
    /// Frames stepped so far
    pub(crate) frames: u64,
    pub(crate) events: Vec<SimEvent>,
    next_id: BodyId,
}

impl Simulation {
    /// Empty arena with the given targets (no bodies, no walls)
    pub fn new(seed: u64, settings: SimSettings, targets: MoleculeQueue) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            bodies: Vec::new(),
            segments: Vec::new(),
            targets,
            assembly: BTreeSet::new(),
            consumed: BTreeSet::new(),
            pending_removal: BTreeSet::new(),
            selection: None,
            lives: settings.lives,
            score: 0,
            time_left: settings.round_time,
            phase: RoundPhase::Playing,
            frames: 0,
            events: Vec::new(),
            next_id: 1,
            settings,
        }
    }

    /// Full round setup: shuffled targets, every catom the queue needs at a
    /// random spot, and walls around the field
    pub fn new_round(seed: u64, settings: SimSettings, targets: MoleculeQueue) -> Result<Self> {
        let mut sim = Self::new(seed, settings, targets);
        sim.targets.shuffle(&mut sim.rng);

        for element in &ELEMENTS {
            let count = sim.targets.catom_count(element.symbol);
            for _ in 0..count {
                sim.spawn_catom_random(element.symbol)?;
            }
        }
        sim.enclose_field()?;

        if sim.targets.is_empty() {
            log::warn!("Round {} started without targets", seed);
            sim.end_round(RoundOutcome::Completed);
            return Ok(sim);
        }

        log::info!(
            "Round {}: {} catoms, {} targets, first: {}",
            seed,
            sim.bodies.len(),
            sim.targets.len(),
            sim.targets
                .current()
                .map(|m| m.to_string())
                .unwrap_or_default()
        );
        Ok(sim)
    }

    /// Allocate a new body id
    fn next_body_id(&mut self) -> BodyId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Add a plain body at rest
    pub fn spawn_body(&mut self, pos: Vec2, radius: f32, mass: f32) -> Result<BodyId> {
        let id = self.next_body_id();
        let body = Body::new(id, pos, radius, mass)?;
        self.bodies.push(body);
        Ok(id)
    }

    /// Add a catom at rest
    pub fn spawn_catom(&mut self, symbol: &str, pos: Vec2) -> Result<BodyId> {
        let element = Element::lookup(symbol)?;
        let id = self.next_body_id();
        let body = Body::catom(id, pos, element, self.settings.radius_scale)?;
        self.bodies.push(body);
        Ok(id)
    }

    /// Add a catom somewhere in the field, drifting in a random direction
    pub fn spawn_catom_random(&mut self, symbol: &str) -> Result<BodyId> {
        let element = Element::lookup(symbol)?;
        let radius = element.radius * self.settings.radius_scale;
        let pos = self.random_field_point(radius);
        let id = self.spawn_catom(symbol, pos)?;

        let speed = self.settings.start_speed * self.settings.start_speed;
        let max_spin = self.settings.max_angular_speed;
        let direction = unit_from_angle(self.rng.random_range(0.0..std::f32::consts::TAU));
        if let Some(index) = self.index_of(id) {
            let body = &mut self.bodies[index];
            body.velocity = direction * speed;
            body.randomize_spin(&mut self.rng, max_spin);
        }
        Ok(id)
    }

    fn random_field_point(&mut self, margin: f32) -> Vec2 {
        let w = self.settings.field_width;
        let h = self.settings.field_height;
        let x = if w > 2.0 * margin {
            self.rng.random_range(margin..w - margin)
        } else {
            w / 2.0
        };
        let y = if h > 2.0 * margin {
            self.rng.random_range(margin..h - margin)
        } else {
            h / 2.0
        };
        Vec2::new(x, y)
    }

    /// Add a wall with the configured thickness
    pub fn add_wall(&mut self, start: Vec2, end: Vec2) -> Result<usize> {
        let segment = LineSegment::new(start, end, self.settings.wall_radius)?;
        Ok(self.add_segment(segment))
    }

    /// Add an already validated segment; returns its index
    pub fn add_segment(&mut self, segment: LineSegment) -> usize {
        self.segments.push(segment);
        self.segments.len() - 1
    }

    /// Four walls just outside the field edges
    pub fn enclose_field(&mut self) -> Result<()> {
        let w = self.settings.field_width;
        let h = self.settings.field_height;
        let r = self.settings.wall_radius;
        self.add_wall(Vec2::new(0.0, -r), Vec2::new(w, -r))?; // top
        self.add_wall(Vec2::new(-r, 0.0), Vec2::new(-r, h))?; // left
        self.add_wall(Vec2::new(0.0, h + r), Vec2::new(w, h + r))?; // bottom
        self.add_wall(Vec2::new(w + r, 0.0), Vec2::new(w + r, h))?; // right
        Ok(())
    }

    /// Position of a body in the live list
    pub(crate) fn index_of(&self, id: BodyId) -> Option<usize> {
        self.bodies.binary_search_by_key(&id, |b| b.id).ok()
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.index_of(id).map(|i| &self.bodies[i])
    }

    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.index_of(id).map(move |i| &mut self.bodies[i])
    }

    pub fn segments(&self) -> &[LineSegment] {
        &self.segments
    }

    pub fn targets(&self) -> &MoleculeQueue {
        &self.targets
    }

    /// The molecule currently being assembled (remaining counts)
    pub fn current_target(&self) -> Option<&Molecule> {
        self.targets.current()
    }

    /// Body under the pointer's control, for cue drawing
    pub fn selected_body(&self) -> Option<&Body> {
        match self.selection {
            Some(Selection::Body(id)) => self.body(id),
            _ => None,
        }
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    /// Members of the in-progress assembly
    pub fn assembly(&self) -> &BTreeSet<BodyId> {
        &self.assembly
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Seconds left on the round timer
    pub fn time_left(&self) -> f32 {
        self.time_left
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, RoundPhase::Over(_))
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Arm a catom as if it had been shot (no force applied)
    pub fn arm(&mut self, id: BodyId) {
        if let Some(body) = self.body_mut(id) {
            body.set_ready(true);
        }
    }

    /// Queue a body for removal at the end of the next step
    pub fn request_removal(&mut self, id: BodyId) {
        if self.index_of(id).is_some() {
            self.pending_removal.insert(id);
        }
    }

    pub fn is_pending_removal(&self, id: BodyId) -> bool {
        self.pending_removal.contains(&id)
    }

    /// Insert a symmetric bond; returns true if it was new
    pub(crate) fn bond(&mut self, a: BodyId, b: BodyId) -> bool {
        if a == b {
            return false;
        }
        let (Some(ia), Some(ib)) = (self.index_of(a), self.index_of(b)) else {
            return false;
        };
        if self.bodies[ia].bonding().is_none() || self.bodies[ib].bonding().is_none() {
            return false;
        }
        let added_a = self.bodies[ia].add_bond(b);
        let added_b = self.bodies[ib].add_bond(a);
        added_a || added_b
    }

    /// Apply queued removals: drop the bodies and scrub every reference
    pub(crate) fn flush_removals(&mut self) {
        if self.pending_removal.is_empty() {
            return;
        }
        let removed = std::mem::take(&mut self.pending_removal);

        self.bodies.retain(|b| !removed.contains(&b.id));
        for body in &mut self.bodies {
            for id in &removed {
                body.remove_bond(*id);
            }
        }
        for id in &removed {
            self.assembly.remove(id);
            self.consumed.remove(id);
            if self.selection == Some(Selection::Body(*id)) {
                self.selection = None;
            }
            self.events.push(SimEvent::BodyRemoved { id: *id });
        }
        log::debug!("Removed {} bodies, {} left", removed.len(), self.bodies.len());
    }

    /// End the round once; later calls are ignored
    pub(crate) fn end_round(&mut self, outcome: RoundOutcome) {
        if self.is_over() {
            return;
        }
        self.phase = RoundPhase::Over(outcome);
        self.selection = None;
        self.events.push(SimEvent::RoundOver { outcome });
        log::info!(
            "Round over: {:?} (score {}, lives {}, {} targets left)",
            outcome,
            self.score,
            self.lives,
            self.targets.len()
        );
    }
}

/// Two distinct mutable bodies out of one slice
pub(crate) fn pair_mut(bodies: &mut [Body], i: usize, j: usize) -> (&mut Body, &mut Body) {
    debug_assert_ne!(i, j);
    if i < j {
        let (left, right) = bodies.split_at_mut(j);
        (&mut left[i], &mut right[0])
    } else {
        let (left, right) = bodies.split_at_mut(i);
        (&mut right[0], &mut left[j])
    }
}
