use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::output::raster::RasterError;
use crate::simulation::definition::DisturbanceType;

/// Errors surfaced by loading habitat configuration or running a step.
///
/// None of these are retried: the computation is deterministic, so a failed
/// step fails the same way again.
#[derive(Debug, Error)]
pub enum HabitatError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(
        "'{wildlife}' uses DisturbanceType {disturbance}, but no {disturbance} output is available. \
         Check that a {disturbance} model is part of the run"
    )]
    MissingSignal {
        wildlife: String,
        disturbance: DisturbanceType,
    },

    #[error("'{wildlife}': {table} table has no entry for {key}")]
    LookupMiss {
        wildlife: String,
        table: &'static str,
        key: String,
    },

    #[error("step {step} was already processed (last processed step: {last})")]
    StepAlreadyProcessed { step: u32, last: u32 },

    #[error(transparent)]
    Raster(#[from] RasterError),
}

impl HabitatError {
    pub fn lookup_miss(wildlife: &str, table: &'static str, key: impl ToString) -> Self {
        HabitatError::LookupMiss {
            wildlife: wildlife.to_string(),
            table,
            key: key.to_string(),
        }
    }
}
