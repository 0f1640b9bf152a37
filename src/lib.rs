//! Wildlife habitat suitability: per-site habitat values for each configured
//! wildlife definition, derived from forest type, stand age and disturbance
//! history, written as integer raster maps on an output cadence.

pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod simulation;
pub mod world;

pub use error::HabitatError;
pub use simulation::{HabitatEngine, StepReport};
pub use world::StepContext;
