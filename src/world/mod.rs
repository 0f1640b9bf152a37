pub mod cohort;
pub mod generation;
pub mod landscape;
pub mod signals;
pub mod species;

pub use cohort::{Cohort, CohortMode, SiteCohorts};
pub use landscape::{Landscape, Site};
pub use signals::{DisturbanceSignals, FireSignal, HarvestSignal};
pub use species::{Species, SpeciesDataset};

/// Everything the habitat engine reads from the host model for one step.
///
/// Passed explicitly into every call; the engine keeps no reference to it.
#[derive(Debug, Clone, Copy)]
pub struct StepContext<'a> {
    pub current_time: u32,
    pub species: &'a SpeciesDataset,
    pub landscape: &'a Landscape,
    pub signals: &'a DisturbanceSignals,
}

impl<'a> StepContext<'a> {
    pub fn new(
        current_time: u32,
        species: &'a SpeciesDataset,
        landscape: &'a Landscape,
        signals: &'a DisturbanceSignals,
    ) -> Self {
        Self {
            current_time,
            species,
            landscape,
            signals,
        }
    }

    pub fn cohort_mode(&self) -> CohortMode {
        self.landscape.cohort_mode()
    }
}
