pub mod map_names;
pub mod map_writer;
pub mod raster;

pub use map_names::MapNameTemplate;
pub use map_writer::{is_output_step, map_code, HabitatMapWriter};
pub use raster::{AsciiGridSink, IntRaster, MemorySink, RasterError, RasterSink};
