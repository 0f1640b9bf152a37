pub mod habitat;
pub mod scenario;
pub mod suitability;

pub use habitat::HabitatConfig;
pub use scenario::{FireRegime, HarvestRegime, ScenarioConfig};
pub use suitability::{load_definition, load_definitions, SuitabilityFile};
