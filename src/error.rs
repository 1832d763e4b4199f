//! Crate error type
//!
//! The step loop itself never fails; errors only come from construction
//! preconditions and from loading configuration.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("body radius must be positive and finite, got {0}")]
    InvalidRadius(f32),

    #[error("body mass must be positive and finite, got {0}")]
    InvalidMass(f32),

    #[error("unknown element symbol `{0}`")]
    UnknownElement(String),

    #[error("segment endpoints coincide at ({x}, {y})")]
    DegenerateSegment { x: f32, y: f32 },

    #[error("`{0}` has no atoms")]
    EmptyMolecule(String),

    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
