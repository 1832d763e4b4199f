//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Sub-stepped epochs driven by the frame's dt
//! - Seeded RNG only
//! - Stable iteration order (by body ID)
//! - No rendering or platform dependencies

pub mod body;
pub mod collision;
pub mod element;
pub mod input;
pub mod molecats;
pub mod segment;
pub mod state;
pub mod tick;

pub use body::{Body, BodyId, BodyKind, Bonding};
pub use collision::{
    CollisionResult, Impactor, ProxyBody, ball_segment_collision, circle_collision,
    elastic_impulse,
};
pub use element::{ELEMENTS, Element};
pub use input::{ButtonState, PointerInput};
pub use molecats::{Molecule, MoleculeQueue};
pub use segment::{LineSegment, SegmentEnd};
pub use state::{RoundOutcome, RoundPhase, Selection, SimEvent, Simulation};
pub use tick::tick;
