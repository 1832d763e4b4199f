//! Element descriptors for catoms
//!
//! Every catom kind differs only in a handful of constants, so they are
//! looked up from a static table keyed by symbol.

use crate::error::{Error, Result};

/// Physical constants for one kind of catom
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Element {
    pub symbol: &'static str,
    pub name: &'static str,
    /// Unscaled radius (multiplied by `SimSettings::radius_scale` at spawn)
    pub radius: f32,
    /// Atomic mass, used directly as body mass
    pub mass: f32,
    /// Spring stiffness toward bonded partners
    pub attraction: f32,
}

/// All elements that can appear in the arena
pub const ELEMENTS: [Element; 7] = [
    Element { symbol: "H", name: "hydrogen", radius: 53.0, mass: 1.00797, attraction: 30.0 },
    Element { symbol: "O", name: "oxygen", radius: 48.0, mass: 15.9994, attraction: 19.0 },
    Element { symbol: "N", name: "nitrogen", radius: 56.0, mass: 14.0067, attraction: 18.0 },
    Element { symbol: "C", name: "carbon", radius: 67.0, mass: 12.011, attraction: 15.0 },
    Element { symbol: "P", name: "phosphorus", radius: 98.0, mass: 30.97376, attraction: 27.0 },
    Element { symbol: "Ca", name: "calcium", radius: 175.0, mass: 40.08, attraction: 32.0 },
    Element { symbol: "Na", name: "sodium", radius: 190.0, mass: 22.98977, attraction: 23.0 },
];

impl Element {
    /// Look up an element by its symbol (case-sensitive: `Ca`, not `CA`)
    pub fn lookup(symbol: &str) -> Result<&'static Element> {
        ELEMENTS
            .iter()
            .find(|e| e.symbol == symbol)
            .ok_or_else(|| Error::UnknownElement(symbol.to_string()))
    }
}
