use serde::Deserialize;

/// A tree species as seen by the habitat model: only its name and longevity matter.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Species {
    pub name: String,
    pub longevity: u32,
}

/// Ordered species table. The position of a species is its index in every
/// per-species vector (cohorts, reclass coefficients, forest-type membership).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpeciesDataset {
    species: Vec<Species>,
}

impl SpeciesDataset {
    pub fn new(species: Vec<Species>) -> Result<Self, String> {
        let mut errors = Vec::new();
        for (i, s) in species.iter().enumerate() {
            if s.name.trim().is_empty() {
                errors.push(format!("species #{} has an empty name", i + 1));
            }
            if s.longevity == 0 {
                errors.push(format!("species '{}' must have longevity > 0", s.name));
            }
            if species[..i].iter().any(|other| other.name == s.name) {
                errors.push(format!("species '{}' defined more than once", s.name));
            }
        }
        if errors.is_empty() {
            Ok(Self { species })
        } else {
            Err(errors.join("\n"))
        }
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Species> {
        self.species.get(index)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.species.iter().position(|s| s.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Species> {
        self.species.iter()
    }
}
