use serde::Serialize;

use crate::simulation::state::SiteStates;
use crate::world::landscape::Landscape;

/// Aggregate suitability of one definition after a step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuitabilityStatistics {
    pub wildlife_name: String,
    pub active_sites: u32,
    pub suitable_sites: u32,
    pub disturbed_sites: u32,
    pub mean_suitability: f64,
    pub max_suitability: f64,
}

/// Compute statistics over the active sites of `landscape`.
pub fn compute_statistics(
    wildlife_name: &str,
    landscape: &Landscape,
    states: &SiteStates,
) -> SuitabilityStatistics {
    let mut active = 0_u32;
    let mut suitable = 0_u32;
    let mut disturbed = 0_u32;
    let mut total = 0.0_f64;
    let mut max = 0.0_f64;

    for site in landscape.active_sites() {
        active += 1;
        let Some(state) = states.get(site.index) else {
            continue;
        };
        if state.suitability > 0.0 {
            suitable += 1;
        }
        if state.is_disturbed() {
            disturbed += 1;
        }
        total += state.suitability;
        max = max.max(state.suitability);
    }

    SuitabilityStatistics {
        wildlife_name: wildlife_name.to_string(),
        active_sites: active,
        suitable_sites: suitable,
        disturbed_sites: disturbed,
        mean_suitability: if active == 0 { 0.0 } else { total / active as f64 },
        max_suitability: max,
    }
}
