//! Target formulas ("molecats") the player has to assemble
//!
//! A round owns a queue of molecules. The front entry is the current target;
//! bonding consumes its symbol counts until it is empty, then it is popped.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::element::Element;
use crate::error::{Error, Result};

/// A molecule: symbol -> required count
///
/// Equality is multiset equality on the counts; the name is only a label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Molecule {
    pub name: String,
    pub counts: BTreeMap<String, u32>,
}

impl PartialEq for Molecule {
    fn eq(&self, other: &Self) -> bool {
        self.counts == other.counts
    }
}

impl Eq for Molecule {}

impl Molecule {
    /// Build from `(symbol, count)` pairs; zero counts are dropped and every
    /// symbol must be a known element
    pub fn new(name: impl Into<String>, atoms: &[(&str, u32)]) -> Result<Self> {
        let name = name.into();
        let mut counts = BTreeMap::new();
        for &(symbol, count) in atoms {
            Element::lookup(symbol)?;
            if count > 0 {
                *counts.entry(symbol.to_string()).or_insert(0) += count;
            }
        }
        if counts.is_empty() {
            return Err(Error::EmptyMolecule(name));
        }
        Ok(Self { name, counts })
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.counts.contains_key(symbol)
    }

    pub fn count(&self, symbol: &str) -> u32 {
        self.counts.get(symbol).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Take one atom of `symbol`; the entry disappears at zero.
    /// Returns false if the symbol was not required.
    pub fn consume(&mut self, symbol: &str) -> bool {
        match self.counts.get_mut(symbol) {
            Some(count) if *count > 1 => {
                *count -= 1;
                true
            }
            Some(_) => {
                self.counts.remove(symbol);
                true
            }
            None => false,
        }
    }

    /// Formula string, e.g. `H2O` (counts of one are omitted)
    pub fn formula(&self) -> String {
        self.counts
            .iter()
            .map(|(symbol, &count)| {
                if count == 1 {
                    symbol.clone()
                } else {
                    format!("{symbol}{count}")
                }
            })
            .collect()
    }

    fn checked(self) -> Result<Self> {
        for (symbol, &count) in &self.counts {
            Element::lookup(symbol)?;
            if count == 0 {
                return Err(Error::EmptyMolecule(self.name.clone()));
            }
        }
        if self.counts.is_empty() {
            return Err(Error::EmptyMolecule(self.name));
        }
        Ok(self)
    }
}

impl fmt::Display for Molecule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.formula())
    }
}

/// Ordered queue of targets, consumed front to back
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MoleculeQueue {
    molecules: VecDeque<Molecule>,
}

impl MoleculeQueue {
    pub fn new(molecules: impl IntoIterator<Item = Molecule>) -> Self {
        Self {
            molecules: molecules.into_iter().collect(),
        }
    }

    /// The built-in catalogue
    pub fn standard() -> Self {
        let catalogue: [(&str, &[(&str, u32)]); 9] = [
            ("Water", &[("H", 2), ("O", 1)]),
            ("Calcium oxide", &[("Ca", 1), ("O", 1)]),
            ("Baking soda", &[("Na", 1), ("H", 1), ("C", 1), ("O", 3)]),
            ("Carbon monoxide", &[("C", 1), ("O", 1)]),
            ("Phosphate", &[("P", 1), ("O", 4)]),
            ("Phosphoric acid", &[("H", 3), ("P", 1), ("O", 4)]),
            ("Dinitrogen trioxide", &[("N", 2), ("O", 3)]),
            ("Nitrogen dioxide", &[("N", 1), ("O", 2)]),
            ("Sodium nitrate", &[("Na", 1), ("N", 1), ("O", 3)]),
        ];
        Self::new(
            catalogue
                .iter()
                .filter_map(|(name, atoms)| Molecule::new(*name, atoms).ok()),
        )
    }

    /// Parse a non-empty JSON array of molecules, validating every symbol
    pub fn from_json(json: &str) -> Result<Self> {
        let molecules: Vec<Molecule> = serde_json::from_str(json)?;
        if molecules.is_empty() {
            return Err(Error::EmptyMolecule("target queue".to_string()));
        }
        let molecules = molecules
            .into_iter()
            .map(Molecule::checked)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(molecules))
    }

    pub fn len(&self) -> usize {
        self.molecules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.molecules.is_empty()
    }

    /// Current target
    pub fn current(&self) -> Option<&Molecule> {
        self.molecules.front()
    }

    pub fn current_mut(&mut self) -> Option<&mut Molecule> {
        self.molecules.front_mut()
    }

    /// Drop the current target (completed or forfeited)
    pub fn advance(&mut self) -> Option<Molecule> {
        self.molecules.pop_front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Molecule> {
        self.molecules.iter()
    }

    /// How many atoms of `symbol` the whole queue still needs
    pub fn catom_count(&self, symbol: &str) -> u32 {
        self.molecules.iter().map(|m| m.count(symbol)).sum()
    }

    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) {
        self.molecules.make_contiguous().shuffle(rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn water() -> Molecule {
        Molecule::new("Water", &[("H", 2), ("O", 1)]).unwrap()
    }

    #[test]
    fn test_rejects_unknown_and_empty() {
        assert!(matches!(Molecule::new("Bad", &[("Zz", 1)]), Err(Error::UnknownElement(_))));
        assert!(matches!(Molecule::new("Nothing", &[("H", 0)]), Err(Error::EmptyMolecule(_))));
    }

    #[test]
    fn test_consume_removes_at_zero() {
        let mut m = water();
        assert!(m.consume("H"));
        assert_eq!(m.count("H"), 1);
        assert!(m.consume("H"));
        assert!(!m.contains("H"));
        assert!(!m.consume("H"));
        assert!(m.consume("O"));
        assert!(m.is_empty());
    }

    #[test]
    fn test_equality_is_multiset() {
        let a = Molecule::new("Water", &[("H", 2), ("O", 1)]).unwrap();
        let b = Molecule::new("Dihydrogen monoxide", &[("O", 1), ("H", 1), ("H", 1)]).unwrap();
        assert_eq!(a, b);
        let c = Molecule::new("Hydroxyl", &[("O", 1), ("H", 1)]).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_formula() {
        assert_eq!(water().formula(), "H2O");
        let soda = Molecule::new("Baking soda", &[("Na", 1), ("H", 1), ("C", 1), ("O", 3)]).unwrap();
        assert_eq!(soda.formula(), "CHNaO3");
    }

    #[test]
    fn test_standard_catalogue_counts() {
        let queue = MoleculeQueue::standard();
        assert_eq!(queue.len(), 9);
        assert_eq!(queue.catom_count("H"), 2 + 1 + 3);
        assert_eq!(queue.catom_count("Ca"), 1);
        assert_eq!(queue.catom_count("O"), 1 + 1 + 3 + 1 + 4 + 4 + 3 + 2 + 3);
    }

    #[test]
    fn test_queue_advances_front_to_back() {
        let co = Molecule::new("Carbon monoxide", &[("C", 1), ("O", 1)]).unwrap();
        let mut queue = MoleculeQueue::new([water(), co.clone()]);
        assert_eq!(queue.current(), Some(&water()));
        queue.advance();
        assert_eq!(queue.current(), Some(&co));
        queue.advance();
        assert!(queue.current().is_none());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_shuffle_is_deterministic() {
        let mut a = MoleculeQueue::standard();
        let mut b = MoleculeQueue::standard();
        a.shuffle(&mut Pcg32::seed_from_u64(42));
        b.shuffle(&mut Pcg32::seed_from_u64(42));
        let names_a: Vec<_> = a.iter().map(|m| m.name.clone()).collect();
        let names_b: Vec<_> = b.iter().map(|m| m.name.clone()).collect();
        assert_eq!(names_a, names_b);
        assert_eq!(a.len(), 9);
    }

    #[test]
    fn test_from_json() {
        let queue = MoleculeQueue::from_json(
            r#"[{ "name": "Water", "counts": { "H": 2, "O": 1 } },
                { "name": "Salt-ish", "counts": { "Na": 1 } }]"#,
        )
        .unwrap();
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.current().map(|m| m.formula()), Some("H2O".to_string()));

        assert!(MoleculeQueue::from_json(r#"[{ "name": "X", "counts": { "Q": 1 } }]"#).is_err());
        assert!(MoleculeQueue::from_json(r#"[{ "name": "X", "counts": {} }]"#).is_err());
    }

    #[test]
    fn test_from_json_rejects_empty_queue() {
        assert!(matches!(MoleculeQueue::from_json("[]"), Err(Error::EmptyMolecule(_))));
    }
}
