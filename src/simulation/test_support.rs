//! Shared fixtures for simulation tests.

use std::path::PathBuf;

use indexmap::IndexMap;

use crate::simulation::definition::*;
use crate::world::species::{Species, SpeciesDataset};

pub fn species() -> SpeciesDataset {
    SpeciesDataset::new(vec![
        Species {
            name: "querrubr".to_string(),
            longevity: 250,
        },
        Species {
            name: "pinubank".to_string(),
            longevity: 100,
        },
    ])
    .unwrap()
}

pub fn forest_table(rows: &[(&str, &[(u32, f64)])]) -> SuitabilityTable {
    SuitabilityTable::ByForestType(
        rows.iter()
            .map(|(name, entries)| (name.to_string(), ThresholdRow::new(entries.to_vec())))
            .collect(),
    )
}

pub fn tsd_table(buckets: &[(u32, &[(u32, f64)])]) -> SuitabilityTable {
    SuitabilityTable::ByTimeSinceDisturbance(
        buckets
            .iter()
            .map(|(max_time, entries)| (*max_time, ThresholdRow::new(entries.to_vec())))
            .collect(),
    )
}

/// Oak (querrubr) and Pine (pinubank) forest types, unit coefficients,
/// fire severity 2 → 0.5, 3 → 1.0, 1 → 0.0, and harvest ClearCut → 1.0, Thin → 0.0.
pub fn definition(
    suitability_type: SuitabilityType,
    disturbance_type: Option<DisturbanceType>,
    suitabilities: SuitabilityTable,
) -> SuitabilityDefinition {
    SuitabilityDefinition {
        wildlife_name: "warbler".to_string(),
        source: PathBuf::from("warbler.toml"),
        suitability_type,
        disturbance_type,
        reclass_coefficients: vec![1.0, 1.0],
        forest_type_maps: vec![ForestTypeMap {
            name: "Forest".to_string(),
            forest_types: vec![
                ForestType {
                    name: "Oak".to_string(),
                    membership: vec![1, 0],
                },
                ForestType {
                    name: "Pine".to_string(),
                    membership: vec![0, 1],
                },
            ],
        }],
        fire_severities: IndexMap::from([(1, 0.0), (2, 0.5), (3, 1.0)]),
        harvest_prescriptions: IndexMap::from([
            ("ClearCut".to_string(), 1.0),
            ("Thin".to_string(), 0.0),
        ]),
        suitabilities,
    }
}
