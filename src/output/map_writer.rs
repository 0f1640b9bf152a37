use std::path::PathBuf;

use tracing::info;

use crate::output::map_names::MapNameTemplate;
use crate::output::raster::{IntRaster, RasterError, RasterSink};
use crate::world::landscape::Landscape;

/// Whether maps are due at `current_time`. Step 0 always qualifies.
pub fn is_output_step(current_time: u32, output_timestep: u32) -> bool {
    output_timestep > 0 && current_time % output_timestep == 0
}

/// Integer map code for a suitability value: the value as a rounded percentage.
pub fn map_code(suitability: f64) -> i32 {
    (suitability * 100.0).round() as i32
}

/// Emits one habitat raster per definition on the output cadence.
#[derive(Debug, Clone)]
pub struct HabitatMapWriter {
    template: MapNameTemplate,
    output_timestep: u32,
}

impl HabitatMapWriter {
    pub fn new(template: MapNameTemplate, output_timestep: u32) -> Self {
        Self {
            template,
            output_timestep,
        }
    }

    /// Raster of map codes: active sites from `suitability`, inactive sites 0.
    pub fn build_raster(landscape: &Landscape, suitability: impl Fn(usize) -> f64) -> IntRaster {
        let mut raster = IntRaster::new(landscape.rows(), landscape.cols());
        for site in landscape.all_sites() {
            let code = if site.active {
                map_code(suitability(site.index))
            } else {
                0
            };
            raster.set_index(site.index, code);
        }
        raster
    }

    /// Write the map for `wildlife_name` if `current_time` is an output step.
    pub fn write_if_due(
        &self,
        wildlife_name: &str,
        current_time: u32,
        landscape: &Landscape,
        suitability: impl Fn(usize) -> f64,
        sink: &mut dyn RasterSink,
    ) -> Result<Option<PathBuf>, RasterError> {
        if !is_output_step(current_time, self.output_timestep) {
            return Ok(None);
        }
        let path = self.template.render(wildlife_name, current_time);
        info!(
            wildlife = wildlife_name,
            step = current_time,
            path = %path.display(),
            "Writing wildlife habitat map"
        );
        let raster = Self::build_raster(landscape, suitability);
        sink.write(&path, &raster)?;
        Ok(Some(path))
    }
}
