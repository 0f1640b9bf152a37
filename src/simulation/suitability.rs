use crate::error::HabitatError;
use crate::simulation::definition::{ForestType, SuitabilityDefinition, SuitabilityType};
use crate::simulation::state::{DisturbanceRecord, LocationState};

/// Suitability of one site under `definition`.
///
/// `state` must already hold this step's forest type and disturbance record.
/// `forest_type_age` yields the dominant age among a forest type's species
/// and is only called by the `AgeClass_ForestType` scheme. The result is not
/// clamped to [0, 1].
pub fn evaluate(
    definition: &SuitabilityDefinition,
    state: &LocationState,
    current_time: u32,
    forest_type_age: impl FnOnce(&ForestType) -> u32,
) -> Result<f64, HabitatError> {
    match definition.suitability_type {
        SuitabilityType::AgeClassForestType => {
            let index = state.forest_type.current();
            if index == 0 {
                return Ok(0.0);
            }
            let forest_type = resolve_forest_type(definition, index)?;
            let row = definition
                .suitabilities
                .row_for_forest_type(&forest_type.name)
                .ok_or_else(|| {
                    HabitatError::lookup_miss(
                        &definition.wildlife_name,
                        "suitability",
                        &forest_type.name,
                    )
                })?;
            let age = forest_type_age(forest_type);
            Ok(row.first_at_or_above(age).unwrap_or(0.0))
        }

        SuitabilityType::AgeClassTimeSinceDisturbance => {
            let DisturbanceRecord::Recorded {
                year, age, weight, ..
            } = *disturbance_record(definition, state)?
            else {
                return Ok(0.0);
            };
            let time_since = current_time.saturating_sub(year);
            let row = definition.suitabilities.bucket_for(time_since).ok_or_else(|| {
                HabitatError::lookup_miss(
                    &definition.wildlife_name,
                    "time-since-disturbance",
                    time_since,
                )
            })?;
            Ok(row.first_at_or_above(age).map_or(0.0, |v| v * weight))
        }

        SuitabilityType::ForestTypeTimeSinceDisturbance => {
            let DisturbanceRecord::Recorded {
                year,
                forest_type,
                weight,
                ..
            } = *disturbance_record(definition, state)?
            else {
                return Ok(0.0);
            };
            if forest_type == 0 {
                return Ok(0.0);
            }
            let ftype = resolve_forest_type(definition, forest_type)?;
            let row = definition
                .suitabilities
                .row_for_forest_type(&ftype.name)
                .ok_or_else(|| {
                    HabitatError::lookup_miss(&definition.wildlife_name, "suitability", &ftype.name)
                })?;
            let time_since = current_time.saturating_sub(year);
            let value = row.first_at_or_above(time_since).ok_or_else(|| {
                HabitatError::lookup_miss(
                    &definition.wildlife_name,
                    "time-since-disturbance",
                    format!("{} after {} years", ftype.name, time_since),
                )
            })?;
            Ok(value * weight)
        }
    }
}

fn resolve_forest_type(
    definition: &SuitabilityDefinition,
    index: usize,
) -> Result<&ForestType, HabitatError> {
    definition
        .forest_type(index)
        .ok_or_else(|| HabitatError::lookup_miss(&definition.wildlife_name, "forest type", index))
}

fn disturbance_record<'a>(
    definition: &SuitabilityDefinition,
    state: &'a LocationState,
) -> Result<&'a DisturbanceRecord, HabitatError> {
    let kind = definition.disturbance_type.ok_or_else(|| {
        HabitatError::Config(format!(
            "'{}' is {} but has no DisturbanceType",
            definition.wildlife_name, definition.suitability_type
        ))
    })?;
    Ok(state.record(kind))
}
