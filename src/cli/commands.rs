use std::path::Path;

use tracing::info;

use crate::config::habitat::HabitatConfig;
use crate::config::scenario::ScenarioConfig;
use crate::config::suitability::load_definitions;
use crate::output::map_writer::HabitatMapWriter;
use crate::output::raster::RasterSink;
use crate::simulation::definition::SuitabilityTable;
use crate::simulation::{HabitatEngine, StepReport};
use crate::world::generation::generate_scenario;

/// Run the habitat engine over a generated scenario.
///
/// Step 0 is processed first, then `steps` timesteps (default: the scenario
/// duration divided by the timestep), advancing the landscape before each.
pub fn run(
    config: &HabitatConfig,
    config_path: &Path,
    scenario_path: &Path,
    steps: Option<u32>,
    sink: &mut dyn RasterSink,
) -> Result<Vec<StepReport>, String> {
    let scenario = ScenarioConfig::from_file(scenario_path)?;
    let mut world = generate_scenario(&scenario)?;

    let definitions = load_definitions(config, config_path, &world.species)
        .map_err(|e| format!("Failed to load suitability files: {}", e))?;
    let template = config.map_template()?;
    let mut engine = HabitatEngine::new(
        definitions,
        HabitatMapWriter::new(template, config.output_timestep),
    );

    let steps = steps.unwrap_or(scenario.duration / config.timestep);
    info!(
        definitions = engine.definitions().len(),
        steps,
        timestep = config.timestep,
        output_timestep = config.output_timestep,
        seed = world.seed,
        "Starting habitat run"
    );

    let mut reports = Vec::with_capacity(steps as usize + 1);
    let first = engine
        .run_step(&world.context(0), sink)
        .map_err(|e| format!("Step 0: {}", e))?;
    reports.push(first);

    for i in 1..=steps {
        let now = i
            .checked_mul(config.timestep)
            .ok_or_else(|| format!("Step {} overflows the time counter", i))?;
        world.advance(now, config.timestep);
        let report = engine
            .run_step(&world.context(now), sink)
            .map_err(|e| format!("Step {}: {}", now, e))?;
        reports.push(report);
    }

    let maps: usize = reports.iter().map(|r| r.maps_written.len()).sum();
    info!(steps = reports.len(), maps, "Habitat run finished");
    Ok(reports)
}

/// Write step reports as pretty-printed JSON.
pub fn write_summary(reports: &[StepReport], path: &Path) -> Result<(), String> {
    let json = serde_json::to_string_pretty(reports)
        .map_err(|e| format!("Cannot serialize summary: {}", e))?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Cannot create {}: {}", parent.display(), e))?;
        }
    }
    std::fs::write(path, json).map_err(|e| format!("Cannot write {}: {}", path.display(), e))
}

/// Load and validate every suitability file against the scenario's species,
/// printing one line per definition.
pub fn check(
    config: &HabitatConfig,
    config_path: &Path,
    species_path: &Path,
) -> Result<(), String> {
    let scenario = ScenarioConfig::from_file(species_path)?;
    let species = scenario.species_dataset()?;
    let definitions = load_definitions(config, config_path, &species).map_err(|e| e.to_string())?;

    for def in &definitions {
        let disturbance = def
            .disturbance_type
            .map(|d| format!(", disturbance {}", d))
            .unwrap_or_default();
        let rows = match &def.suitabilities {
            SuitabilityTable::ByForestType(rows) => format!("{} forest type rows", rows.len()),
            SuitabilityTable::ByTimeSinceDisturbance(buckets) => {
                format!("{} time-since-disturbance rows", buckets.len())
            }
        };
        println!(
            "{:<20} {}{}, {} ({})",
            def.wildlife_name,
            def.suitability_type,
            disturbance,
            rows,
            def.source.display()
        );
    }
    println!(
        "{} suitability definition(s) valid against {} species",
        definitions.len(),
        species.len()
    );
    Ok(())
}
