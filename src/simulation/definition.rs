use std::fmt;
use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The lookup scheme a suitability definition uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SuitabilityType {
    /// Forest type and the dominant age of that forest type's species.
    #[serde(rename = "AgeClass_ForestType")]
    AgeClassForestType,
    /// Dominant age before the last disturbance and the time since it.
    #[serde(rename = "AgeClass_TimeSinceDisturbance")]
    AgeClassTimeSinceDisturbance,
    /// Forest type before the last disturbance and the time since it.
    #[serde(rename = "ForestType_TimeSinceDisturbance")]
    ForestTypeTimeSinceDisturbance,
}

impl SuitabilityType {
    pub fn name(self) -> &'static str {
        match self {
            SuitabilityType::AgeClassForestType => "AgeClass_ForestType",
            SuitabilityType::AgeClassTimeSinceDisturbance => "AgeClass_TimeSinceDisturbance",
            SuitabilityType::ForestTypeTimeSinceDisturbance => "ForestType_TimeSinceDisturbance",
        }
    }

    pub fn is_disturbance_based(self) -> bool {
        !matches!(self, SuitabilityType::AgeClassForestType)
    }

    /// Whether the scheme classifies sites into forest types each step.
    pub fn uses_forest_type(self) -> bool {
        !matches!(self, SuitabilityType::AgeClassTimeSinceDisturbance)
    }
}

impl fmt::Display for SuitabilityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisturbanceType {
    Fire,
    Harvest,
}

impl fmt::Display for DisturbanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisturbanceType::Fire => f.write_str("Fire"),
            DisturbanceType::Harvest => f.write_str("Harvest"),
        }
    }
}

/// A named forest type: +1 for species that count toward it, -1 for species
/// that count against it, 0 otherwise. Indexed by species.
#[derive(Debug, Clone, PartialEq)]
pub struct ForestType {
    pub name: String,
    pub membership: Vec<i8>,
}

impl ForestType {
    pub fn membership(&self, species: usize) -> i8 {
        self.membership.get(species).copied().unwrap_or(0)
    }

    pub fn includes(&self, species: usize) -> bool {
        self.membership(species) == 1
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForestTypeMap {
    pub name: String,
    pub forest_types: Vec<ForestType>,
}

/// Threshold → value pairs, sorted ascending by threshold.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ThresholdRow {
    entries: Vec<(u32, f64)>,
}

impl ThresholdRow {
    pub fn new(mut entries: Vec<(u32, f64)>) -> Self {
        entries.sort_by_key(|(threshold, _)| *threshold);
        Self { entries }
    }

    /// Value of the first threshold that is >= `value`.
    pub fn first_at_or_above(&self, value: u32) -> Option<f64> {
        self.entries
            .iter()
            .find(|(threshold, _)| value <= *threshold)
            .map(|(_, v)| *v)
    }

    pub fn entries(&self) -> &[(u32, f64)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The suitability table, shaped by the definition's scheme.
#[derive(Debug, Clone, PartialEq)]
pub enum SuitabilityTable {
    /// Forest-type name → threshold row. Rows hold age thresholds for
    /// `AgeClass_ForestType` and time-since-disturbance thresholds for
    /// `ForestType_TimeSinceDisturbance`.
    ByForestType(IndexMap<String, ThresholdRow>),
    /// Time-since-disturbance bucket (ascending) → age threshold row.
    ByTimeSinceDisturbance(Vec<(u32, ThresholdRow)>),
}

impl SuitabilityTable {
    pub fn row_for_forest_type(&self, name: &str) -> Option<&ThresholdRow> {
        match self {
            SuitabilityTable::ByForestType(rows) => rows.get(name),
            SuitabilityTable::ByTimeSinceDisturbance(_) => None,
        }
    }

    /// Row of the first bucket that is >= `time_since_disturbance`.
    pub fn bucket_for(&self, time_since_disturbance: u32) -> Option<&ThresholdRow> {
        match self {
            SuitabilityTable::ByTimeSinceDisturbance(buckets) => buckets
                .iter()
                .find(|(max_time, _)| time_since_disturbance <= *max_time)
                .map(|(_, row)| row),
            SuitabilityTable::ByForestType(_) => None,
        }
    }

    pub fn row_count(&self) -> usize {
        match self {
            SuitabilityTable::ByForestType(rows) => rows.len(),
            SuitabilityTable::ByTimeSinceDisturbance(buckets) => buckets.len(),
        }
    }
}

/// One wildlife habitat rule. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct SuitabilityDefinition {
    pub wildlife_name: String,
    /// File the definition was loaded from, for diagnostics.
    pub source: PathBuf,
    pub suitability_type: SuitabilityType,
    pub disturbance_type: Option<DisturbanceType>,
    /// One coefficient per species.
    pub reclass_coefficients: Vec<f64>,
    pub forest_type_maps: Vec<ForestTypeMap>,
    pub fire_severities: IndexMap<u8, f64>,
    pub harvest_prescriptions: IndexMap<String, f64>,
    pub suitabilities: SuitabilityTable,
}

impl SuitabilityDefinition {
    /// Forest types of the first map; later maps are never consulted.
    pub fn forest_types(&self) -> &[ForestType] {
        self.forest_type_maps
            .first()
            .map(|m| m.forest_types.as_slice())
            .unwrap_or(&[])
    }

    /// Forest type for a 1-based classifier index. 0 means no forest type.
    pub fn forest_type(&self, index: usize) -> Option<&ForestType> {
        index
            .checked_sub(1)
            .and_then(|i| self.forest_types().get(i))
    }
}
