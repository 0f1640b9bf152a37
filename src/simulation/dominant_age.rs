use indexmap::IndexMap;

use crate::simulation::definition::ForestType;
use crate::world::cohort::{Cohort, CohortMode, SiteCohorts};

/// Dominant age of a site: the age with the greatest summed weight, where a
/// cohort weighs its biomass in biomass runs and 1 in age-only runs.
///
/// Species are visited in dataset order and cohorts in stored order. On equal
/// weights the age inserted first wins. A site without cohorts has age 0.
pub fn dominant_age(cohorts: &SiteCohorts, mode: CohortMode) -> u32 {
    select_dominant(cohorts.iter().flat_map(|(_, c)| c.iter()), mode)
}

/// Dominant age over the species that belong (+1) to `forest_type`.
pub fn dominant_age_in_forest_type(
    cohorts: &SiteCohorts,
    mode: CohortMode,
    forest_type: &ForestType,
) -> u32 {
    select_dominant(
        cohorts
            .iter()
            .filter(|(species, _)| forest_type.includes(*species))
            .flat_map(|(_, c)| c.iter()),
        mode,
    )
}

fn select_dominant<'a>(cohorts: impl Iterator<Item = &'a Cohort>, mode: CohortMode) -> u32 {
    let mut weights: IndexMap<u32, u64> = IndexMap::new();
    for cohort in cohorts {
        let weight = match mode {
            CohortMode::AgeOnly => 1,
            CohortMode::Biomass => cohort.biomass as u64,
        };
        *weights.entry(cohort.age).or_insert(0) += weight;
    }

    let mut dominant = 0;
    let mut max_weight = 0;
    for (&age, &weight) in &weights {
        if weight > max_weight {
            dominant = age;
            max_weight = weight;
        }
    }
    dominant
}
