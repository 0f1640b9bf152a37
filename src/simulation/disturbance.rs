use crate::error::HabitatError;
use crate::simulation::definition::{DisturbanceType, SuitabilityDefinition};
use crate::simulation::state::{DisturbanceRecord, LocationState};
use crate::world::signals::DisturbanceSignals;
use crate::world::StepContext;

/// What the tracker saw at a site this step.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerOutcome {
    /// No event of the tracked kind happened this step.
    NoEvent,
    /// An event happened and was recorded with this weight.
    Recorded { weight: f64 },
    /// An event happened but its weight is 0; the previous record stands.
    ZeroWeight,
    /// A harvest used a prescription the definition does not weight.
    UnknownPrescription(String),
}

/// Fail when the run lacks the output a disturbance-based definition reads.
pub fn ensure_signal(
    definition: &SuitabilityDefinition,
    signals: &DisturbanceSignals,
) -> Result<(), HabitatError> {
    if !definition.suitability_type.is_disturbance_based() {
        return Ok(());
    }
    let Some(kind) = definition.disturbance_type else {
        return Err(HabitatError::Config(format!(
            "'{}' is {} but has no DisturbanceType",
            definition.wildlife_name, definition.suitability_type
        )));
    };
    let present = match kind {
        DisturbanceType::Fire => signals.has_fire(),
        DisturbanceType::Harvest => signals.has_harvest(),
    };
    if present {
        Ok(())
    } else {
        Err(HabitatError::MissingSignal {
            wildlife: definition.wildlife_name.clone(),
            disturbance: kind,
        })
    }
}

/// Advance the disturbance record of `kind` at one site.
///
/// An event counts when it was stamped in the current step and its table
/// weight is positive. The record then captures the step together with the
/// site's dominant age and forest type from the previous step, so the history
/// must already have been advanced for this step. Anything else leaves the
/// existing record untouched.
pub fn update(
    definition: &SuitabilityDefinition,
    kind: DisturbanceType,
    state: &mut LocationState,
    site: usize,
    ctx: &StepContext<'_>,
) -> Result<TrackerOutcome, HabitatError> {
    let now = ctx.current_time;

    let weight = match kind {
        DisturbanceType::Fire => {
            let signal = ctx
                .signals
                .fire_at(site)
                .ok_or_else(|| missing_site(definition, kind, site, ctx.signals))?;
            if signal.severity == 0 || signal.last_changed != now {
                return Ok(TrackerOutcome::NoEvent);
            }
            *definition
                .fire_severities
                .get(&signal.severity)
                .ok_or_else(|| {
                    HabitatError::lookup_miss(
                        &definition.wildlife_name,
                        "fire severity",
                        signal.severity,
                    )
                })?
        }
        DisturbanceType::Harvest => {
            let signal = ctx
                .signals
                .harvest_at(site)
                .ok_or_else(|| missing_site(definition, kind, site, ctx.signals))?;
            let Some(prescription) = signal.prescription.as_deref() else {
                return Ok(TrackerOutcome::NoEvent);
            };
            if signal.last_changed != now {
                return Ok(TrackerOutcome::NoEvent);
            }
            match definition.harvest_prescriptions.get(prescription) {
                Some(weight) => *weight,
                None => {
                    return Ok(TrackerOutcome::UnknownPrescription(prescription.to_string()));
                }
            }
        }
    };

    if weight <= 0.0 {
        return Ok(TrackerOutcome::ZeroWeight);
    }

    let record = DisturbanceRecord::Recorded {
        year: now,
        age: state.dominant_age.previous(),
        forest_type: state.forest_type.previous(),
        weight,
    };
    *state.record_mut(kind) = record;
    Ok(TrackerOutcome::Recorded { weight })
}

fn missing_site(
    definition: &SuitabilityDefinition,
    kind: DisturbanceType,
    site: usize,
    signals: &DisturbanceSignals,
) -> HabitatError {
    let layer_present = match kind {
        DisturbanceType::Fire => signals.has_fire(),
        DisturbanceType::Harvest => signals.has_harvest(),
    };
    if layer_present {
        HabitatError::Config(format!(
            "{} output has no value for site {} (needed by '{}')",
            kind, site, definition.wildlife_name
        ))
    } else {
        HabitatError::MissingSignal {
            wildlife: definition.wildlife_name.clone(),
            disturbance: kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::definition::SuitabilityType;
    use crate::simulation::test_support;
    use crate::world::cohort::CohortMode;
    use crate::world::landscape::Landscape;

    fn fire_definition() -> SuitabilityDefinition {
        test_support::definition(
            SuitabilityType::AgeClassTimeSinceDisturbance,
            Some(DisturbanceType::Fire),
            test_support::tsd_table(&[(20, &[(25, 0.1), (40, 0.9)])]),
        )
    }

    fn harvest_definition() -> SuitabilityDefinition {
        test_support::definition(
            SuitabilityType::ForestTypeTimeSinceDisturbance,
            Some(DisturbanceType::Harvest),
            test_support::forest_table(&[("Oak", &[(50, 1.0)])]),
        )
    }

    fn state_with_history(prev_age: u32, prev_type: usize) -> LocationState {
        let mut state = LocationState::default();
        state.dominant_age.advance(prev_age);
        state.forest_type.advance(prev_type);
        state.dominant_age.advance(0);
        state.forest_type.advance(0);
        state
    }

    #[test]
    fn fire_records_previous_age_and_weight() {
        let species = test_support::species();
        let landscape = Landscape::new(1, 1, CohortMode::Biomass, 2);
        let mut signals = DisturbanceSignals::none().with_fire(1);
        signals.set_fire(0, 2, 10);
        let ctx = StepContext::new(10, &species, &landscape, &signals);

        let def = fire_definition();
        let mut state = state_with_history(30, 1);
        let outcome = update(&def, DisturbanceType::Fire, &mut state, 0, &ctx).unwrap();

        assert_eq!(outcome, TrackerOutcome::Recorded { weight: 0.5 });
        assert_eq!(
            state.fire,
            DisturbanceRecord::Recorded {
                year: 10,
                age: 30,
                forest_type: 1,
                weight: 0.5
            }
        );
    }

    #[test]
    fn zero_weight_fire_keeps_previous_record() {
        let species = test_support::species();
        let landscape = Landscape::new(1, 1, CohortMode::Biomass, 2);
        let mut signals = DisturbanceSignals::none().with_fire(1);
        signals.set_fire(0, 1, 20);
        let ctx = StepContext::new(20, &species, &landscape, &signals);

        let def = fire_definition();
        let mut state = state_with_history(80, 2);
        let earlier = DisturbanceRecord::Recorded {
            year: 10,
            age: 30,
            forest_type: 1,
            weight: 0.5,
        };
        state.fire = earlier;

        let outcome = update(&def, DisturbanceType::Fire, &mut state, 0, &ctx).unwrap();
        assert_eq!(outcome, TrackerOutcome::ZeroWeight);
        assert_eq!(state.fire, earlier);
    }

    #[test]
    fn stale_fire_is_not_an_event() {
        let species = test_support::species();
        let landscape = Landscape::new(1, 1, CohortMode::Biomass, 2);
        let mut signals = DisturbanceSignals::none().with_fire(1);
        signals.set_fire(0, 3, 10);
        let ctx = StepContext::new(20, &species, &landscape, &signals);

        let mut state = state_with_history(30, 1);
        let outcome =
            update(&fire_definition(), DisturbanceType::Fire, &mut state, 0, &ctx).unwrap();
        assert_eq!(outcome, TrackerOutcome::NoEvent);
        assert!(!state.fire.is_recorded());
    }

    #[test]
    fn unmapped_fire_severity_fails() {
        let species = test_support::species();
        let landscape = Landscape::new(1, 1, CohortMode::Biomass, 2);
        let mut signals = DisturbanceSignals::none().with_fire(1);
        signals.set_fire(0, 5, 10);
        let ctx = StepContext::new(10, &species, &landscape, &signals);

        let mut state = LocationState::default();
        let err =
            update(&fire_definition(), DisturbanceType::Fire, &mut state, 0, &ctx).unwrap_err();
        assert!(matches!(err, HabitatError::LookupMiss { .. }));
    }

    #[test]
    fn harvest_records_previous_forest_type() {
        let species = test_support::species();
        let landscape = Landscape::new(1, 1, CohortMode::Biomass, 2);
        let mut signals = DisturbanceSignals::none().with_harvest(1);
        signals.set_harvest(0, "ClearCut", 40);
        let ctx = StepContext::new(40, &species, &landscape, &signals);

        let mut state = state_with_history(60, 1);
        let outcome =
            update(&harvest_definition(), DisturbanceType::Harvest, &mut state, 0, &ctx).unwrap();
        assert_eq!(outcome, TrackerOutcome::Recorded { weight: 1.0 });
        assert_eq!(state.harvest.year(), Some(40));
        assert!(!state.fire.is_recorded());
    }

    #[test]
    fn stale_harvest_is_not_an_event() {
        let species = test_support::species();
        let landscape = Landscape::new(1, 1, CohortMode::Biomass, 2);
        let mut signals = DisturbanceSignals::none().with_harvest(1);
        signals.set_harvest(0, "ClearCut", 40);
        let ctx = StepContext::new(50, &species, &landscape, &signals);

        let mut state = state_with_history(60, 1);
        let earlier = DisturbanceRecord::Recorded {
            year: 40,
            age: 55,
            forest_type: 1,
            weight: 1.0,
        };
        state.harvest = earlier;
        let outcome =
            update(&harvest_definition(), DisturbanceType::Harvest, &mut state, 0, &ctx).unwrap();
        assert_eq!(outcome, TrackerOutcome::NoEvent);
        assert_eq!(state.harvest, earlier);
    }

    #[test]
    fn no_prescription_is_not_an_event() {
        let species = test_support::species();
        let landscape = Landscape::new(1, 1, CohortMode::Biomass, 2);
        let signals = DisturbanceSignals::none().with_harvest(1);
        // Never harvested: last change is step 0 with no prescription.
        let ctx = StepContext::new(0, &species, &landscape, &signals);

        let mut state = state_with_history(60, 1);
        let outcome =
            update(&harvest_definition(), DisturbanceType::Harvest, &mut state, 0, &ctx).unwrap();
        assert_eq!(outcome, TrackerOutcome::NoEvent);
        assert!(!state.harvest.is_recorded());
    }

    #[test]
    fn later_harvest_replaces_earlier_record() {
        let species = test_support::species();
        let landscape = Landscape::new(1, 1, CohortMode::Biomass, 2);
        let def = harvest_definition();
        let mut signals = DisturbanceSignals::none().with_harvest(1);
        let mut state = LocationState::default();

        // Steps 0..=30 one year apart; age and forest type change every step.
        for step in 0..=30_u32 {
            state.dominant_age.advance(step + 100);
            state.forest_type.advance(if step < 20 { 1 } else { 2 });
            if step == 10 || step == 30 {
                signals.set_harvest(0, "ClearCut", step);
            }
            let ctx = StepContext::new(step, &species, &landscape, &signals);
            update(&def, DisturbanceType::Harvest, &mut state, 0, &ctx).unwrap();
            if step == 10 {
                assert_eq!(
                    state.harvest,
                    DisturbanceRecord::Recorded {
                        year: 10,
                        age: 109,
                        forest_type: 1,
                        weight: 1.0
                    }
                );
            }
        }

        assert_eq!(
            state.harvest,
            DisturbanceRecord::Recorded {
                year: 30,
                age: 129,
                forest_type: 2,
                weight: 1.0
            }
        );
    }

    #[test]
    fn unknown_and_zero_weight_prescriptions_do_not_record() {
        let species = test_support::species();
        let landscape = Landscape::new(1, 2, CohortMode::Biomass, 2);
        let mut signals = DisturbanceSignals::none().with_harvest(2);
        signals.set_harvest(0, "Patch", 40);
        signals.set_harvest(1, "Thin", 40);
        let ctx = StepContext::new(40, &species, &landscape, &signals);
        let def = harvest_definition();

        let mut state = LocationState::default();
        let outcome = update(&def, DisturbanceType::Harvest, &mut state, 0, &ctx).unwrap();
        assert_eq!(outcome, TrackerOutcome::UnknownPrescription("Patch".to_string()));
        let outcome = update(&def, DisturbanceType::Harvest, &mut state, 1, &ctx).unwrap();
        assert_eq!(outcome, TrackerOutcome::ZeroWeight);
        assert!(!state.harvest.is_recorded());
    }

    #[test]
    fn ensure_signal_reports_missing_source() {
        let signals = DisturbanceSignals::none().with_harvest(1);
        let err = ensure_signal(&fire_definition(), &signals).unwrap_err();
        assert!(matches!(
            err,
            HabitatError::MissingSignal {
                disturbance: DisturbanceType::Fire,
                ..
            }
        ));
        assert!(ensure_signal(&harvest_definition(), &signals).is_ok());

        let static_def = test_support::definition(
            SuitabilityType::AgeClassForestType,
            None,
            test_support::forest_table(&[]),
        );
        assert!(ensure_signal(&static_def, &DisturbanceSignals::none()).is_ok());
    }
}
