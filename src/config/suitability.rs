use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::habitat::HabitatConfig;
use crate::error::HabitatError;
use crate::simulation::definition::{
    DisturbanceType, ForestType, ForestTypeMap, SuitabilityDefinition, SuitabilityTable,
    SuitabilityType, ThresholdRow,
};
use crate::world::species::SpeciesDataset;

/// Highest fire severity class a fire layer reports.
pub const MAX_FIRE_SEVERITY: u8 = 5;

/// A suitability file as written on disk, before species names are resolved.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SuitabilityFile {
    pub wildlife_name: String,
    pub suitability_type: SuitabilityType,
    #[serde(default)]
    pub disturbance_type: Option<DisturbanceType>,
    #[serde(default)]
    pub reclass_coefficients: IndexMap<String, f64>,
    #[serde(default)]
    pub forest_type_maps: Vec<ForestTypeMapEntry>,
    #[serde(default)]
    pub fire_severities: IndexMap<String, f64>,
    #[serde(default)]
    pub harvest_prescriptions: IndexMap<String, f64>,
    pub suitabilities: IndexMap<String, IndexMap<String, f64>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ForestTypeMapEntry {
    pub name: String,
    pub forest_types: Vec<ForestTypeEntry>,
}

/// `species` entries prefixed with `-` count against the forest type.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ForestTypeEntry {
    pub name: String,
    pub species: Vec<String>,
}

impl SuitabilityFile {
    pub fn from_toml_str(content: &str, source_path: &Path) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("{}: {}", source_path.display(), e))
    }

    /// Validate against the species table and build the runtime definition.
    /// Every problem found is reported, one per line.
    pub fn resolve(
        self,
        species: &SpeciesDataset,
        source: &Path,
    ) -> Result<SuitabilityDefinition, String> {
        let mut errors = Vec::new();
        let name = self.wildlife_name.trim().to_string();
        if name.is_empty() {
            errors.push("wildlife_name must not be empty".to_string());
        }

        let scheme = self.suitability_type;
        let disturbance_type = match (scheme.is_disturbance_based(), self.disturbance_type) {
            (true, None) => {
                errors.push(format!(
                    "disturbance_type is required for {}. Example: disturbance_type = \"Fire\"",
                    scheme
                ));
                None
            }
            (false, Some(kind)) => {
                errors.push(format!(
                    "disturbance_type = \"{}\" is not used by {}; remove it",
                    kind, scheme
                ));
                None
            }
            (_, kind) => kind,
        };

        let reclass_coefficients =
            resolve_coefficients(&self.reclass_coefficients, species, &mut errors);

        let forest_type_maps: Vec<ForestTypeMap> = self
            .forest_type_maps
            .iter()
            .map(|map| resolve_map(map, species, &mut errors))
            .collect();
        if scheme.uses_forest_type() && forest_type_maps.is_empty() {
            errors.push(format!(
                "{} needs at least one [[forest_type_maps]] entry",
                scheme
            ));
        }

        let fire_severities = resolve_fire_severities(&self.fire_severities, &mut errors);
        for (prescription, weight) in &self.harvest_prescriptions {
            check_weight("harvest_prescriptions", prescription, *weight, &mut errors);
        }
        match disturbance_type {
            Some(DisturbanceType::Fire) if fire_severities.is_empty() => errors.push(
                "disturbance_type = \"Fire\" needs a non-empty [fire_severities] table".to_string(),
            ),
            Some(DisturbanceType::Harvest) if self.harvest_prescriptions.is_empty() => errors.push(
                "disturbance_type = \"Harvest\" needs a non-empty [harvest_prescriptions] table"
                    .to_string(),
            ),
            _ => {}
        }

        let forest_type_names: Vec<&str> = forest_type_maps
            .first()
            .map(|m| m.forest_types.iter().map(|ft| ft.name.as_str()).collect())
            .unwrap_or_default();
        let suitabilities =
            resolve_table(scheme, &self.suitabilities, &forest_type_names, &mut errors);

        if !errors.is_empty() {
            return Err(errors
                .iter()
                .map(|e| format!("{}: {}", source.display(), e))
                .collect::<Vec<_>>()
                .join("\n"));
        }

        if forest_type_maps.len() > 1 {
            warn!(
                wildlife = %name,
                ignored = forest_type_maps.len() - 1,
                "Only the first forest type map is used; later maps are ignored"
            );
        }
        if let Some(map) = forest_type_maps.first() {
            for forest_type in &map.forest_types {
                let has_weight = forest_type
                    .membership
                    .iter()
                    .enumerate()
                    .any(|(i, m)| *m == 1 && reclass_coefficients[i] > 0.0);
                if !has_weight {
                    warn!(
                        wildlife = %name,
                        forest_type = %forest_type.name,
                        "Forest type has no member species with a reclass coefficient above zero and can never be selected"
                    );
                }
            }
        }

        Ok(SuitabilityDefinition {
            wildlife_name: name,
            source: source.to_path_buf(),
            suitability_type: scheme,
            disturbance_type,
            reclass_coefficients,
            forest_type_maps,
            fire_severities,
            harvest_prescriptions: self.harvest_prescriptions,
            suitabilities,
        })
    }
}

fn resolve_coefficients(
    raw: &IndexMap<String, f64>,
    species: &SpeciesDataset,
    errors: &mut Vec<String>,
) -> Vec<f64> {
    let mut coefficients = vec![0.0; species.len()];
    for (name, value) in raw {
        let Some(index) = species.index_of(name) else {
            errors.push(format!("reclass_coefficients: unknown species '{}'", name));
            continue;
        };
        if !(0.0..=1.0).contains(value) {
            errors.push(format!(
                "reclass_coefficients.{} must be 0.0-1.0, got {}",
                name, value
            ));
            continue;
        }
        coefficients[index] = *value;
    }
    coefficients
}

fn resolve_map(
    map: &ForestTypeMapEntry,
    species: &SpeciesDataset,
    errors: &mut Vec<String>,
) -> ForestTypeMap {
    let mut forest_types: Vec<ForestType> = Vec::with_capacity(map.forest_types.len());
    for entry in &map.forest_types {
        if forest_types.iter().any(|ft| ft.name == entry.name) {
            errors.push(format!(
                "forest type map '{}': forest type '{}' defined more than once",
                map.name, entry.name
            ));
        }
        let mut membership = vec![0_i8; species.len()];
        for raw in &entry.species {
            let (sign, species_name) = match raw.strip_prefix('-') {
                Some(rest) => (-1, rest),
                None => (1, raw.as_str()),
            };
            match species.index_of(species_name) {
                Some(index) => membership[index] = sign,
                None => errors.push(format!(
                    "forest type '{}': unknown species '{}'",
                    entry.name, species_name
                )),
            }
        }
        forest_types.push(ForestType {
            name: entry.name.clone(),
            membership,
        });
    }
    if forest_types.is_empty() {
        errors.push(format!("forest type map '{}' has no forest types", map.name));
    }
    ForestTypeMap {
        name: map.name.clone(),
        forest_types,
    }
}

fn resolve_fire_severities(
    raw: &IndexMap<String, f64>,
    errors: &mut Vec<String>,
) -> IndexMap<u8, f64> {
    let mut severities = IndexMap::new();
    for (code, weight) in raw {
        match code.trim().parse::<u8>() {
            Ok(severity) if (1..=MAX_FIRE_SEVERITY).contains(&severity) => {
                check_weight("fire_severities", code, *weight, errors);
                severities.insert(severity, *weight);
            }
            _ => errors.push(format!(
                "fire_severities: severity '{}' must be an integer 1-{}",
                code, MAX_FIRE_SEVERITY
            )),
        }
    }
    severities
}

fn check_weight(table: &str, key: &str, weight: f64, errors: &mut Vec<String>) {
    if !(weight.is_finite() && weight >= 0.0) {
        errors.push(format!("{}.{} must be >= 0, got {}", table, key, weight));
    }
}

fn resolve_table(
    scheme: SuitabilityType,
    raw: &IndexMap<String, IndexMap<String, f64>>,
    forest_type_names: &[&str],
    errors: &mut Vec<String>,
) -> SuitabilityTable {
    if raw.is_empty() {
        errors.push("[suitabilities] must contain at least one table".to_string());
    }
    match scheme {
        SuitabilityType::AgeClassTimeSinceDisturbance => {
            let mut buckets = Vec::with_capacity(raw.len());
            for (key, row) in raw {
                match key.trim().parse::<u32>() {
                    Ok(max_time) => buckets.push((max_time, parse_row(key, row, errors))),
                    Err(_) => errors.push(format!(
                        "suitabilities.{}: {} tables are keyed by time since disturbance, which must be a non-negative integer",
                        key, scheme
                    )),
                }
            }
            buckets.sort_by_key(|(max_time, _)| *max_time);
            if buckets.windows(2).any(|w| w[0].0 == w[1].0) {
                errors.push("suitabilities: duplicate time since disturbance keys".to_string());
            }
            SuitabilityTable::ByTimeSinceDisturbance(buckets)
        }
        SuitabilityType::AgeClassForestType | SuitabilityType::ForestTypeTimeSinceDisturbance => {
            let mut rows = IndexMap::new();
            for (key, row) in raw {
                if !forest_type_names.is_empty() && !forest_type_names.contains(&key.as_str()) {
                    errors.push(format!(
                        "suitabilities.{}: not a forest type of the first forest type map (known: {})",
                        key,
                        forest_type_names.join(", ")
                    ));
                }
                rows.insert(key.clone(), parse_row(key, row, errors));
            }
            for name in forest_type_names {
                if !rows.contains_key(*name) {
                    errors.push(format!("suitabilities: no table for forest type '{}'", name));
                }
            }
            SuitabilityTable::ByForestType(rows)
        }
    }
}

fn parse_row(key: &str, raw: &IndexMap<String, f64>, errors: &mut Vec<String>) -> ThresholdRow {
    let mut entries = Vec::with_capacity(raw.len());
    for (threshold, value) in raw {
        let Ok(threshold_value) = threshold.trim().parse::<u32>() else {
            errors.push(format!(
                "suitabilities.{}: threshold '{}' must be a non-negative integer",
                key, threshold
            ));
            continue;
        };
        if !value.is_finite() {
            errors.push(format!(
                "suitabilities.{}.{} must be a finite number, got {}",
                key, threshold, value
            ));
            continue;
        }
        if entries.iter().any(|(t, _)| *t == threshold_value) {
            errors.push(format!(
                "suitabilities.{}: threshold {} listed more than once",
                key, threshold_value
            ));
            continue;
        }
        entries.push((threshold_value, *value));
    }
    if raw.is_empty() {
        errors.push(format!("suitabilities.{} has no thresholds", key));
    }
    ThresholdRow::new(entries)
}

/// Read and resolve one suitability file.
pub fn load_definition(
    path: &Path,
    species: &SpeciesDataset,
) -> Result<SuitabilityDefinition, HabitatError> {
    let content = std::fs::read_to_string(path).map_err(|source| HabitatError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let file = SuitabilityFile::from_toml_str(&content, path).map_err(HabitatError::Config)?;
    let definition = file.resolve(species, path).map_err(HabitatError::Config)?;
    debug!(
        wildlife = %definition.wildlife_name,
        suitability_type = %definition.suitability_type,
        rows = definition.suitabilities.row_count(),
        "Loaded suitability definition"
    );
    Ok(definition)
}

/// Load every suitability file the run configuration lists, in order.
/// File paths are resolved against the directory of `config_path`.
pub fn load_definitions(
    config: &HabitatConfig,
    config_path: &Path,
    species: &SpeciesDataset,
) -> Result<Vec<SuitabilityDefinition>, HabitatError> {
    let config_dir = config_path.parent().map(Path::to_path_buf).unwrap_or_else(PathBuf::new);
    let mut definitions: Vec<SuitabilityDefinition> = Vec::new();
    for path in config.suitability_paths(&config_dir) {
        let definition = load_definition(&path, species)?;
        if let Some(other) = definitions
            .iter()
            .find(|d| d.wildlife_name == definition.wildlife_name)
        {
            return Err(HabitatError::Config(format!(
                "wildlife_name '{}' is used by both {} and {}",
                definition.wildlife_name,
                other.source.display(),
                path.display()
            )));
        }
        definitions.push(definition);
    }
    Ok(definitions)
}
