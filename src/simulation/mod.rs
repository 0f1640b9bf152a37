pub mod definition;
pub mod disturbance;
pub mod dominant_age;
pub mod forest_type;
pub mod state;
pub mod statistics;
pub mod suitability;

#[cfg(test)]
pub(crate) mod test_support;

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::HabitatError;
use crate::output::map_writer::HabitatMapWriter;
use crate::output::raster::RasterSink;
use crate::simulation::definition::SuitabilityDefinition;
use crate::simulation::disturbance::TrackerOutcome;
use crate::simulation::state::{LocationState, SiteStates};
use crate::simulation::statistics::{compute_statistics, SuitabilityStatistics};
use crate::world::StepContext;

/// Result of processing a single step.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub step: u32,
    /// One entry per definition, in definition order.
    pub statistics: Vec<SuitabilityStatistics>,
    pub maps_written: Vec<PathBuf>,
    pub duration_ms: f32,
}

/// Owns the suitability definitions and every location state derived from them.
pub struct HabitatEngine {
    definitions: Vec<SuitabilityDefinition>,
    states: Vec<SiteStates>,
    map_writer: HabitatMapWriter,
    last_step: Option<u32>,
}

impl HabitatEngine {
    pub fn new(definitions: Vec<SuitabilityDefinition>, map_writer: HabitatMapWriter) -> Self {
        let states = vec![SiteStates::default(); definitions.len()];
        Self {
            definitions,
            states,
            map_writer,
            last_step: None,
        }
    }

    pub fn definitions(&self) -> &[SuitabilityDefinition] {
        &self.definitions
    }

    pub fn last_step(&self) -> Option<u32> {
        self.last_step
    }

    pub fn location_state(&self, definition: usize, site: usize) -> Option<&LocationState> {
        self.states.get(definition).and_then(|s| s.get(site))
    }

    /// Stored suitability, 0 for unknown definitions or unvisited sites.
    pub fn suitability(&self, definition: usize, site: usize) -> f64 {
        self.states
            .get(definition)
            .map(|s| s.suitability(site))
            .unwrap_or(0.0)
    }

    /// Process one step.
    ///
    /// Definitions run in order; for each, every active site has its history
    /// advanced, its disturbance record updated and its suitability stored,
    /// and then the map is written if the step is on the output cadence.
    ///
    /// Each step is processed at most once: a step at or before the last
    /// processed step is rejected, because advancing the history twice
    /// would overwrite the previous-step values.
    pub fn run_step(
        &mut self,
        ctx: &StepContext<'_>,
        sink: &mut dyn RasterSink,
    ) -> Result<StepReport, HabitatError> {
        let step_start = Instant::now();
        let now = ctx.current_time;

        if let Some(last) = self.last_step {
            if now <= last {
                return Err(HabitatError::StepAlreadyProcessed { step: now, last });
            }
        }
        for definition in &self.definitions {
            disturbance::ensure_signal(definition, ctx.signals)?;
        }
        self.last_step = Some(now);

        let mut statistics = Vec::with_capacity(self.definitions.len());
        let mut maps_written = Vec::new();

        for (definition, states) in self.definitions.iter().zip(self.states.iter_mut()) {
            process_definition(definition, states, ctx)?;

            let stats = compute_statistics(&definition.wildlife_name, ctx.landscape, states);
            debug!(
                step = now,
                wildlife = %stats.wildlife_name,
                active = stats.active_sites,
                suitable = stats.suitable_sites,
                disturbed = stats.disturbed_sites,
                mean = stats.mean_suitability,
                max = stats.max_suitability,
                "Suitability updated"
            );
            statistics.push(stats);

            if let Some(path) = self.map_writer.write_if_due(
                &definition.wildlife_name,
                now,
                ctx.landscape,
                |site| states.suitability(site),
                sink,
            )? {
                maps_written.push(path);
            }
        }

        Ok(StepReport {
            step: now,
            statistics,
            maps_written,
            duration_ms: step_start.elapsed().as_secs_f32() * 1000.0,
        })
    }
}

fn process_definition(
    definition: &SuitabilityDefinition,
    states: &mut SiteStates,
    ctx: &StepContext<'_>,
) -> Result<(), HabitatError> {
    let mode = ctx.cohort_mode();
    let scheme = definition.suitability_type;
    let tracked = definition
        .disturbance_type
        .filter(|_| scheme.is_disturbance_based());
    let mut unknown_prescriptions = BTreeSet::new();

    for site in ctx.landscape.active_sites() {
        let state = states.get_or_create(site.index);

        state
            .dominant_age
            .advance(dominant_age::dominant_age(&site.cohorts, mode));
        if scheme.uses_forest_type() {
            state.forest_type.advance(forest_type::classify(
                definition.forest_types(),
                &site.cohorts,
                ctx.species,
                mode,
                &definition.reclass_coefficients,
            ));
        }

        if let Some(kind) = tracked {
            if let TrackerOutcome::UnknownPrescription(name) =
                disturbance::update(definition, kind, state, site.index, ctx)?
            {
                unknown_prescriptions.insert(name);
            }
        }

        // A site without cohorts offers no habitat, whatever its disturbance history.
        state.suitability = if site.cohorts.is_empty() {
            0.0
        } else {
            suitability::evaluate(definition, state, ctx.current_time, |ftype| {
                dominant_age::dominant_age_in_forest_type(&site.cohorts, mode, ftype)
            })?
        };
    }

    for name in unknown_prescriptions {
        warn!(
            wildlife = %definition.wildlife_name,
            prescription = %name,
            step = ctx.current_time,
            "Harvest prescription has no suitability weight; treated as 0"
        );
    }

    Ok(())
}
