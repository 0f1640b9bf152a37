use serde::Deserialize;
use std::path::Path;

use crate::config::suitability::MAX_FIRE_SEVERITY;
use crate::world::cohort::CohortMode;
use crate::world::species::{Species, SpeciesDataset};

/// Random fire regime. Its presence puts a fire layer on the landscape.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FireRegime {
    /// Per-site, per-step chance of burning.
    pub probability: f32,
    #[serde(default = "default_max_severity")]
    pub max_severity: u8,
}

fn default_max_severity() -> u8 {
    MAX_FIRE_SEVERITY
}

/// Random harvest regime. Its presence puts a harvest layer on the landscape.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HarvestRegime {
    pub probability: f32,
    pub prescriptions: Vec<String>,
}

/// Parameters for a generated host landscape.
/// A seed of 0 picks a random seed at generation time.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub seed: u64,
    pub rows: u32,
    pub cols: u32,
    #[serde(default = "default_active_fraction")]
    pub active_fraction: f32,
    #[serde(default = "default_cohort_mode")]
    pub cohort_mode: CohortMode,
    #[serde(default = "default_duration")]
    pub duration: u32,
    #[serde(default = "default_max_initial_cohorts")]
    pub max_initial_cohorts: u32,
    #[serde(default = "default_establishment_probability")]
    pub establishment_probability: f32,
    #[serde(default)]
    pub fire: Option<FireRegime>,
    #[serde(default)]
    pub harvest: Option<HarvestRegime>,
    pub species: Vec<Species>,
}

fn default_active_fraction() -> f32 {
    0.9
}
fn default_cohort_mode() -> CohortMode {
    CohortMode::Biomass
}
fn default_duration() -> u32 {
    100
}
fn default_max_initial_cohorts() -> u32 {
    3
}
fn default_establishment_probability() -> f32 {
    0.2
}

const MAX_SITES: u64 = 4_000_000;

impl ScenarioConfig {
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Cannot read {}: {}", path.display(), e))?;
        Self::from_toml_str(&content, path)
    }

    pub fn from_toml_str(content: &str, source_path: &Path) -> Result<Self, String> {
        let config: Self = toml::from_str(content)
            .map_err(|e| format!("Invalid TOML in {}: {}", source_path.display(), e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        let mut errors = Vec::new();

        if self.rows == 0 || self.cols == 0 {
            errors.push(format!(
                "rows and cols must be > 0, got {}x{}",
                self.rows, self.cols
            ));
        } else if u64::from(self.rows) * u64::from(self.cols) > MAX_SITES {
            errors.push(format!(
                "rows x cols must be <= {}, got {}x{}",
                MAX_SITES, self.rows, self.cols
            ));
        }
        check_fraction("active_fraction", self.active_fraction, &mut errors);
        check_fraction(
            "establishment_probability",
            self.establishment_probability,
            &mut errors,
        );
        if self.max_initial_cohorts == 0 {
            errors.push("max_initial_cohorts must be > 0".to_string());
        }
        if let Some(fire) = &self.fire {
            check_fraction("fire.probability", fire.probability, &mut errors);
            if !(1..=MAX_FIRE_SEVERITY).contains(&fire.max_severity) {
                errors.push(format!(
                    "fire.max_severity must be 1-{}, got {}",
                    MAX_FIRE_SEVERITY, fire.max_severity
                ));
            }
        }
        if let Some(harvest) = &self.harvest {
            check_fraction("harvest.probability", harvest.probability, &mut errors);
            if harvest.prescriptions.is_empty() {
                errors.push(
                    "harvest.prescriptions must list at least one prescription. Example: prescriptions = [\"ClearCut\"]"
                        .to_string(),
                );
            }
        }
        if self.species.is_empty() {
            errors.push("at least one [[species]] entry is required".to_string());
        } else if let Err(e) = self.species_dataset() {
            errors.push(e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.join("\n"))
        }
    }

    pub fn species_dataset(&self) -> Result<SpeciesDataset, String> {
        SpeciesDataset::new(self.species.clone())
    }
}

fn check_fraction(name: &str, value: f32, errors: &mut Vec<String>) {
    if !(0.0..=1.0).contains(&value) {
        errors.push(format!("{} must be 0.0-1.0, got {}", name, value));
    }
}
