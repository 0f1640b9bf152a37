use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors from writing rasters.
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("cannot write raster {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A row-major grid of integer map codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntRaster {
    rows: u32,
    cols: u32,
    cells: Vec<i32>,
}

impl IntRaster {
    pub fn new(rows: u32, cols: u32) -> Self {
        Self {
            rows,
            cols,
            cells: vec![0; (rows * cols) as usize],
        }
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn cells(&self) -> &[i32] {
        &self.cells
    }

    /// Set a cell by row-major index. Out-of-range indices are ignored.
    pub fn set_index(&mut self, index: usize, value: i32) {
        if let Some(cell) = self.cells.get_mut(index) {
            *cell = value;
        }
    }
}

/// Destination for emitted habitat maps.
pub trait RasterSink {
    fn write(&mut self, path: &Path, raster: &IntRaster) -> Result<(), RasterError>;
}

/// Writes ESRI ASCII grid files.
///
/// Each map goes to a hidden temporary file next to the target and is then
/// renamed into place.
#[derive(Debug, Clone)]
pub struct AsciiGridSink {
    pub cell_size: f64,
}

impl AsciiGridSink {
    pub fn new(cell_size: f64) -> Self {
        Self { cell_size }
    }

    fn write_grid(&self, path: &Path, raster: &IntRaster) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("map");
        let tmp = path.with_file_name(format!(".{}.tmp", filename));

        let result = (|| {
            let mut out = BufWriter::new(fs::File::create(&tmp)?);
            writeln!(out, "ncols {}", raster.cols())?;
            writeln!(out, "nrows {}", raster.rows())?;
            writeln!(out, "xllcorner 0")?;
            writeln!(out, "yllcorner 0")?;
            writeln!(out, "cellsize {}", self.cell_size)?;
            writeln!(out, "NODATA_value -9999")?;
            for row in raster.cells().chunks(raster.cols().max(1) as usize) {
                let line: Vec<String> = row.iter().map(|v| v.to_string()).collect();
                writeln!(out, "{}", line.join(" "))?;
            }
            out.flush()
        })();

        if let Err(e) = result {
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }
        if let Err(e) = fs::rename(&tmp, path) {
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }
        Ok(())
    }
}

impl RasterSink for AsciiGridSink {
    fn write(&mut self, path: &Path, raster: &IntRaster) -> Result<(), RasterError> {
        self.write_grid(path, raster).map_err(|source| RasterError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Keeps every written raster in memory, in write order.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub rasters: Vec<(PathBuf, IntRaster)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RasterSink for MemorySink {
    fn write(&mut self, path: &Path, raster: &IntRaster) -> Result<(), RasterError> {
        self.rasters.push((path.to_path_buf(), raster.clone()));
        Ok(())
    }
}
