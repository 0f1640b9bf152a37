use serde::Deserialize;

/// Which cohort representation the succession model provides for the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CohortMode {
    /// Cohorts carry ages only; weights are cohort counts.
    AgeOnly,
    /// Cohorts carry ages and biomass; weights are biomass sums.
    Biomass,
}

/// A group of trees of one species sharing an age. `biomass` is ignored in
/// [`CohortMode::AgeOnly`] runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cohort {
    pub age: u32,
    pub biomass: u32,
}

impl Cohort {
    pub fn new(age: u32, biomass: u32) -> Self {
        Self { age, biomass }
    }

    pub fn age_only(age: u32) -> Self {
        Self { age, biomass: 0 }
    }
}

/// All cohorts at one site, grouped by species index.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SiteCohorts {
    by_species: Vec<Vec<Cohort>>,
}

impl SiteCohorts {
    pub fn new(species_count: usize) -> Self {
        Self {
            by_species: vec![Vec::new(); species_count],
        }
    }

    pub fn species_count(&self) -> usize {
        self.by_species.len()
    }

    /// Cohorts of one species, in stored order. Unknown species have none.
    pub fn species(&self, index: usize) -> &[Cohort] {
        self.by_species.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn push(&mut self, species: usize, cohort: Cohort) {
        if species >= self.by_species.len() {
            self.by_species.resize(species + 1, Vec::new());
        }
        self.by_species[species].push(cohort);
    }

    pub fn is_empty(&self) -> bool {
        self.by_species.iter().all(Vec::is_empty)
    }

    /// Species index paired with its cohorts, in species order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[Cohort])> {
        self.by_species
            .iter()
            .enumerate()
            .map(|(i, cohorts)| (i, cohorts.as_slice()))
    }

    pub fn max_age(&self, species: usize) -> u32 {
        self.species(species)
            .iter()
            .map(|c| c.age)
            .max()
            .unwrap_or(0)
    }

    pub fn total_biomass(&self, species: usize) -> u64 {
        self.species(species).iter().map(|c| c.biomass as u64).sum()
    }

    pub fn grow(&mut self, years: u32) {
        for cohort in self.by_species.iter_mut().flatten() {
            cohort.age = cohort.age.saturating_add(years);
        }
    }

    pub fn retain(&mut self, mut keep: impl FnMut(usize, &Cohort) -> bool) {
        for (species, cohorts) in self.by_species.iter_mut().enumerate() {
            cohorts.retain(|c| keep(species, c));
        }
    }
}
