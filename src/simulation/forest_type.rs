use crate::simulation::definition::ForestType;
use crate::world::cohort::{CohortMode, SiteCohorts};
use crate::world::species::SpeciesDataset;

/// Classify a site into one of `forest_types`.
///
/// Returns the 1-based index of the type with the greatest positive score,
/// or 0 when no type scores above zero. Equal scores keep the earlier type.
pub fn classify(
    forest_types: &[ForestType],
    cohorts: &SiteCohorts,
    species: &SpeciesDataset,
    mode: CohortMode,
    reclass_coefficients: &[f64],
) -> usize {
    let scores = scores(forest_types, cohorts, species, mode, reclass_coefficients);
    select(&scores)
}

/// Signed score of every forest type at a site.
///
/// A species contributes `membership × value × coefficient`, where value is
/// its oldest cohort age as a fraction of longevity (age-only runs) or its
/// total biomass (biomass runs).
pub fn scores(
    forest_types: &[ForestType],
    cohorts: &SiteCohorts,
    species: &SpeciesDataset,
    mode: CohortMode,
    reclass_coefficients: &[f64],
) -> Vec<f64> {
    let mut scores = vec![0.0; forest_types.len()];

    for (index, sp) in species.iter().enumerate() {
        let Some(value) = species_value(cohorts, index, sp.longevity, mode) else {
            continue;
        };
        let weighted = value * reclass_coefficients.get(index).copied().unwrap_or(0.0);

        for (score, ftype) in scores.iter_mut().zip(forest_types) {
            match ftype.membership(index) {
                1 => *score += weighted,
                -1 => *score -= weighted,
                _ => {}
            }
        }
    }

    scores
}

/// 1-based index of the strictly greatest positive score, 0 if none.
pub fn select(scores: &[f64]) -> usize {
    let mut selected = 0;
    let mut max = 0.0;
    for (i, &score) in scores.iter().enumerate() {
        if score > max {
            max = score;
            selected = i + 1;
        }
    }
    selected
}

fn species_value(
    cohorts: &SiteCohorts,
    species: usize,
    longevity: u32,
    mode: CohortMode,
) -> Option<f64> {
    match mode {
        CohortMode::AgeOnly => {
            let max_age = cohorts.max_age(species);
            if max_age == 0 || longevity == 0 {
                None
            } else {
                Some(max_age as f64 / longevity as f64)
            }
        }
        CohortMode::Biomass => Some(cohorts.total_biomass(species) as f64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::cohort::Cohort;
    use crate::world::species::Species;

    fn dataset() -> SpeciesDataset {
        SpeciesDataset::new(vec![
            Species {
                name: "querrubr".to_string(),
                longevity: 200,
            },
            Species {
                name: "pinubank".to_string(),
                longevity: 100,
            },
        ])
        .unwrap()
    }

    fn ftype(name: &str, membership: &[i8]) -> ForestType {
        ForestType {
            name: name.to_string(),
            membership: membership.to_vec(),
        }
    }

    fn site(biomass: [u32; 2]) -> SiteCohorts {
        let mut cohorts = SiteCohorts::new(2);
        for (i, b) in biomass.iter().enumerate() {
            if *b > 0 {
                cohorts.push(i, Cohort::new(30, *b));
            }
        }
        cohorts
    }

    #[test]
    fn no_cohorts_is_no_forest_type() {
        let types = [ftype("Oak", &[1, 0]), ftype("Pine", &[0, 1])];
        let cohorts = SiteCohorts::new(2);
        for mode in [CohortMode::AgeOnly, CohortMode::Biomass] {
            assert_eq!(classify(&types, &cohorts, &dataset(), mode, &[1.0, 1.0]), 0);
        }
    }

    #[test]
    fn biomass_picks_largest_score() {
        let types = [ftype("Oak", &[1, 0]), ftype("Pine", &[0, 1])];
        let cohorts = site([300, 500]);
        let result = classify(&types, &cohorts, &dataset(), CohortMode::Biomass, &[1.0, 1.0]);
        assert_eq!(result, 2);
    }

    #[test]
    fn coefficients_reweight_species() {
        let types = [ftype("Oak", &[1, 0]), ftype("Pine", &[0, 1])];
        let cohorts = site([300, 500]);
        let result = classify(&types, &cohorts, &dataset(), CohortMode::Biomass, &[1.0, 0.5]);
        assert_eq!(result, 1);
    }

    #[test]
    fn negative_membership_subtracts() {
        let types = [ftype("OakNoPine", &[1, -1])];
        let cohorts = site([300, 500]);
        let s = scores(&types, &cohorts, &dataset(), CohortMode::Biomass, &[1.0, 1.0]);
        assert_eq!(s, vec![-200.0]);
        assert_eq!(select(&s), 0);
    }

    #[test]
    fn age_only_uses_fraction_of_longevity() {
        // querrubr max age 100 / 200 = 0.5; pinubank max age 60 / 100 = 0.6.
        let mut cohorts = SiteCohorts::new(2);
        cohorts.push(0, Cohort::age_only(20));
        cohorts.push(0, Cohort::age_only(100));
        cohorts.push(1, Cohort::age_only(60));
        let types = [ftype("Oak", &[1, 0]), ftype("Pine", &[0, 1])];
        let s = scores(&types, &cohorts, &dataset(), CohortMode::AgeOnly, &[1.0, 1.0]);
        assert!((s[0] - 0.5).abs() < 1e-12);
        assert!((s[1] - 0.6).abs() < 1e-12);
        assert_eq!(select(&s), 2);
    }

    #[test]
    fn ties_keep_first_type() {
        let types = [ftype("Oak", &[1, 0]), ftype("Pine", &[0, 1])];
        let cohorts = site([400, 400]);
        let result = classify(&types, &cohorts, &dataset(), CohortMode::Biomass, &[1.0, 1.0]);
        assert_eq!(result, 1);
    }

    #[test]
    fn growing_species_raises_score_and_only_wins_by_overtaking() {
        let types = [ftype("Oak", &[1, 0]), ftype("Pine", &[0, 1])];
        let coeffs = [1.0, 1.0];
        let mut previous_score = f64::MIN;
        for oak in [100, 200, 400, 499, 500, 501, 800] {
            let cohorts = site([oak, 500]);
            let s = scores(&types, &cohorts, &dataset(), CohortMode::Biomass, &coeffs);
            assert!(s[0] > previous_score);
            previous_score = s[0];
            let expected = if s[0] >= s[1] { 1 } else { 2 };
            assert_eq!(select(&s), expected, "oak biomass {}", oak);
        }
    }
}
