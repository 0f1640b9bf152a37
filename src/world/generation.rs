use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::config::scenario::{FireRegime, HarvestRegime, ScenarioConfig};
use crate::world::cohort::{Cohort, CohortMode};
use crate::world::landscape::Landscape;
use crate::world::signals::DisturbanceSignals;
use crate::world::species::SpeciesDataset;
use crate::world::StepContext;

/// Cohorts younger than `severity * FIRE_AGE_PER_SEVERITY` die in a fire.
const FIRE_AGE_PER_SEVERITY: u32 = 20;
/// Harvests remove every cohort older than this.
const HARVEST_MAX_SURVIVING_AGE: u32 = 20;

/// A generated host landscape together with the stochastic models that
/// advance it between habitat steps.
#[derive(Debug, Clone)]
pub struct ScenarioWorld {
    pub species: SpeciesDataset,
    pub landscape: Landscape,
    pub signals: DisturbanceSignals,
    /// Seed actually used, for reproducing the run.
    pub seed: u64,
    fire: Option<FireRegime>,
    harvest: Option<HarvestRegime>,
    establishment_probability: f32,
    rng: ChaCha8Rng,
}

/// Per-step event counts from [`ScenarioWorld::advance`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdvanceSummary {
    pub fires: u32,
    pub harvests: u32,
    pub established: u32,
}

/// Build a landscape from scenario parameters.
///
/// If `config.seed` is 0, a random seed is chosen and stored in the result.
pub fn generate_scenario(config: &ScenarioConfig) -> Result<ScenarioWorld, String> {
    config.validate()?;
    let seed = if config.seed == 0 {
        rand::thread_rng().r#gen()
    } else {
        config.seed
    };
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let species = config.species_dataset()?;

    let mut landscape = Landscape::new(config.rows, config.cols, config.cohort_mode, species.len());
    for site in landscape.all_sites_mut() {
        site.active = rng.r#gen::<f32>() < config.active_fraction;
        if !site.active {
            continue;
        }
        let count = rng.gen_range(1..=config.max_initial_cohorts);
        for _ in 0..count {
            let index = rng.gen_range(0..species.len());
            if let Some(s) = species.get(index) {
                let cohort = initial_cohort(&mut rng, s.longevity, config.cohort_mode);
                site.cohorts.push(index, cohort);
            }
        }
    }

    let mut signals = DisturbanceSignals::none();
    if config.fire.is_some() {
        signals = signals.with_fire(landscape.site_count());
    }
    if config.harvest.is_some() {
        signals = signals.with_harvest(landscape.site_count());
    }

    info!(
        seed,
        rows = config.rows,
        cols = config.cols,
        active_sites = landscape.active_count(),
        species = species.len(),
        fire = signals.has_fire(),
        harvest = signals.has_harvest(),
        "Generated scenario landscape"
    );

    Ok(ScenarioWorld {
        species,
        landscape,
        signals,
        seed,
        fire: config.fire.clone(),
        harvest: config.harvest.clone(),
        establishment_probability: config.establishment_probability,
        rng,
    })
}

/// Ages in multiples of ten, capped at longevity.
fn initial_cohort(rng: &mut impl Rng, longevity: u32, mode: CohortMode) -> Cohort {
    let age = (rng.gen_range(1..=longevity.div_ceil(10)) * 10).min(longevity);
    match mode {
        CohortMode::AgeOnly => Cohort::age_only(age),
        CohortMode::Biomass => Cohort::new(age, rng.gen_range(50..=500)),
    }
}

impl ScenarioWorld {
    pub fn context(&self, current_time: u32) -> StepContext<'_> {
        StepContext::new(current_time, &self.species, &self.landscape, &self.signals)
    }

    /// Move the landscape forward `years` to `current_time`: cohorts age and
    /// senesce, then fires, harvests and establishment happen at random.
    /// Every new disturbance is stamped with `current_time`.
    pub fn advance(&mut self, current_time: u32, years: u32) -> AdvanceSummary {
        let mode = self.landscape.cohort_mode();
        let species = &self.species;
        let rng = &mut self.rng;
        let mut summary = AdvanceSummary::default();

        for site in self.landscape.all_sites_mut() {
            if !site.active {
                continue;
            }
            site.cohorts.grow(years);
            site.cohorts
                .retain(|index, c| species.get(index).is_some_and(|s| c.age <= s.longevity));

            if let Some(fire) = &self.fire {
                if rng.r#gen::<f32>() < fire.probability {
                    let severity = rng.gen_range(1..=fire.max_severity);
                    let min_age = u32::from(severity) * FIRE_AGE_PER_SEVERITY;
                    site.cohorts.retain(|_, c| c.age >= min_age);
                    self.signals.set_fire(site.index, severity, current_time);
                    summary.fires += 1;
                }
            }

            if let Some(harvest) = &self.harvest {
                if rng.r#gen::<f32>() < harvest.probability {
                    let choice = rng.gen_range(0..harvest.prescriptions.len());
                    site.cohorts.retain(|_, c| c.age <= HARVEST_MAX_SURVIVING_AGE);
                    self.signals
                        .set_harvest(site.index, &harvest.prescriptions[choice], current_time);
                    summary.harvests += 1;
                }
            }

            if rng.r#gen::<f32>() < self.establishment_probability {
                let index = rng.gen_range(0..species.len());
                let age = rng.gen_range(1..=years.max(1));
                let cohort = match mode {
                    CohortMode::AgeOnly => Cohort::age_only(age),
                    CohortMode::Biomass => Cohort::new(age, rng.gen_range(10..=100)),
                };
                site.cohorts.push(index, cohort);
                summary.established += 1;
            }
        }

        debug!(
            step = current_time,
            fires = summary.fires,
            harvests = summary.harvests,
            established = summary.established,
            "Advanced scenario landscape"
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::species::Species;

    fn default_config() -> ScenarioConfig {
        ScenarioConfig {
            seed: 42,
            rows: 20,
            cols: 25,
            active_fraction: 0.8,
            cohort_mode: CohortMode::Biomass,
            duration: 50,
            max_initial_cohorts: 3,
            establishment_probability: 0.2,
            fire: Some(FireRegime {
                probability: 0.1,
                max_severity: 5,
            }),
            harvest: Some(HarvestRegime {
                probability: 0.05,
                prescriptions: vec!["ClearCut".to_string(), "Thin".to_string()],
            }),
            species: vec![
                Species {
                    name: "querrubr".to_string(),
                    longevity: 250,
                },
                Species {
                    name: "pinubank".to_string(),
                    longevity: 100,
                },
            ],
        }
    }

    #[test]
    fn generates_requested_grid() {
        let world = generate_scenario(&default_config()).unwrap();
        assert_eq!(world.landscape.site_count(), 500);
        let active = world.landscape.active_count();
        assert!(active > 300 && active < 480, "active sites: {}", active);
        for site in world.landscape.all_sites() {
            assert_eq!(site.active, !site.cohorts.is_empty(), "site {}", site.index);
        }
    }

    #[test]
    fn initial_cohorts_within_longevity() {
        let world = generate_scenario(&default_config()).unwrap();
        for site in world.landscape.active_sites() {
            for (index, cohorts) in site.cohorts.iter() {
                let longevity = world.species.get(index).unwrap().longevity;
                for c in cohorts {
                    assert!(c.age >= 1 && c.age <= longevity);
                    assert!(c.biomass >= 50);
                }
            }
        }
    }

    #[test]
    fn generation_is_deterministic() {
        let config = default_config();
        let mut a = generate_scenario(&config).unwrap();
        let mut b = generate_scenario(&config).unwrap();
        assert_eq!(a.landscape, b.landscape);
        for t in [10, 20, 30] {
            assert_eq!(a.advance(t, 10), b.advance(t, 10));
        }
        assert_eq!(a.landscape, b.landscape);
        assert_eq!(a.signals, b.signals);
    }

    #[test]
    fn seed_zero_generates_random() {
        let mut config = default_config();
        config.seed = 0;
        let world = generate_scenario(&config).unwrap();
        assert_ne!(world.seed, 0, "Resolved seed should be non-zero");
    }

    #[test]
    fn signal_layers_follow_regimes() {
        let mut config = default_config();
        config.harvest = None;
        let world = generate_scenario(&config).unwrap();
        assert!(world.signals.has_fire());
        assert!(!world.signals.has_harvest());
    }

    #[test]
    fn cohorts_age_and_senesce() {
        let mut config = default_config();
        config.fire = None;
        config.harvest = None;
        config.establishment_probability = 0.0;
        let mut world = generate_scenario(&config).unwrap();
        let before = world.landscape.clone();
        world.advance(10, 10);

        for (old, new) in before.all_sites().zip(world.landscape.all_sites()) {
            for (index, cohorts) in old.cohorts.iter() {
                let longevity = world.species.get(index).unwrap().longevity;
                let expected: Vec<u32> = cohorts
                    .iter()
                    .map(|c| c.age + 10)
                    .filter(|age| *age <= longevity)
                    .collect();
                let actual: Vec<u32> = new.cohorts.species(index).iter().map(|c| c.age).collect();
                assert_eq!(actual, expected);
            }
        }
    }

    #[test]
    fn fire_kills_young_cohorts_and_stamps_step() {
        let mut config = default_config();
        config.fire = Some(FireRegime {
            probability: 1.0,
            max_severity: 1,
        });
        config.harvest = None;
        config.establishment_probability = 0.0;
        let mut world = generate_scenario(&config).unwrap();
        let summary = world.advance(10, 10);

        assert_eq!(summary.fires as usize, world.landscape.active_count());
        for site in world.landscape.active_sites() {
            let signal = world.signals.fire_at(site.index).unwrap();
            assert_eq!(signal.severity, 1);
            assert_eq!(signal.last_changed, 10);
            for (_, cohorts) in site.cohorts.iter() {
                assert!(cohorts.iter().all(|c| c.age >= 20));
            }
        }
    }

    #[test]
    fn harvest_removes_old_cohorts_and_stamps_step() {
        let mut config = default_config();
        config.fire = None;
        config.harvest = Some(HarvestRegime {
            probability: 1.0,
            prescriptions: vec!["ClearCut".to_string()],
        });
        config.establishment_probability = 0.0;
        let mut world = generate_scenario(&config).unwrap();
        world.advance(20, 10);

        for site in world.landscape.active_sites() {
            let signal = world.signals.harvest_at(site.index).unwrap();
            assert_eq!(signal.prescription.as_deref(), Some("ClearCut"));
            assert_eq!(signal.last_changed, 20);
            for (_, cohorts) in site.cohorts.iter() {
                assert!(cohorts.iter().all(|c| c.age <= 20));
            }
        }
        for site in world.landscape.all_sites().filter(|s| !s.active) {
            assert_eq!(world.signals.harvest_at(site.index).unwrap().prescription, None);
        }
    }

    #[test]
    fn establishment_adds_young_cohorts() {
        let mut config = default_config();
        config.fire = None;
        config.harvest = None;
        config.establishment_probability = 1.0;
        let mut world = generate_scenario(&config).unwrap();
        let summary = world.advance(10, 10);
        assert_eq!(summary.established as usize, world.landscape.active_count());
    }

    #[test]
    fn invalid_config_rejected() {
        let mut config = default_config();
        config.rows = 0;
        assert!(generate_scenario(&config).is_err());
    }
}
