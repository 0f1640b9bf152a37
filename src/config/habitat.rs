use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::output::map_names::{MapNameTemplate, NAME_VAR};

/// Run-level settings: cadence, map naming and the suitability files to load.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HabitatConfig {
    #[serde(default = "default_timestep")]
    pub timestep: u32,
    #[serde(default = "default_output_timestep")]
    pub output_timestep: u32,
    #[serde(default = "default_map_names")]
    pub map_names: String,
    pub suitability_files: Vec<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_cell_size")]
    pub cell_size: f64,
}

fn default_timestep() -> u32 {
    10
}
fn default_output_timestep() -> u32 {
    10
}
fn default_map_names() -> String {
    "output/wildlife/{wildlifeName}-{timestep}.asc".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_cell_size() -> f64 {
    30.0
}

impl HabitatConfig {
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Cannot read {}: {}", path.display(), e))?;
        Self::from_toml_str(&content, path)
    }

    pub fn from_toml_str(content: &str, source_path: &Path) -> Result<Self, String> {
        let config: HabitatConfig =
            toml::from_str(content).map_err(|e| format!("{}: {}", source_path.display(), e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        let mut errors = Vec::new();

        if self.timestep == 0 {
            errors.push("timestep must be > 0. Example: timestep = 10".to_string());
        }

        if self.output_timestep == 0 {
            errors.push("output_timestep must be > 0. Example: output_timestep = 10".to_string());
        } else if self.timestep > 0 && self.output_timestep % self.timestep != 0 {
            errors.push(format!(
                "output_timestep must be a multiple of timestep ({}), got {}",
                self.timestep, self.output_timestep
            ));
        }

        match MapNameTemplate::parse(&self.map_names) {
            Ok(template) => {
                if self.suitability_files.len() > 1 && !template.contains(NAME_VAR) {
                    errors.push(format!(
                        "map_names must contain {{{}}} when more than one suitability file is listed, got '{}'",
                        NAME_VAR, self.map_names
                    ));
                }
            }
            Err(e) => errors.push(e),
        }

        if self.suitability_files.is_empty() {
            errors.push(
                "suitability_files must list at least one file. Example: suitability_files = [\"marten.toml\"]"
                    .to_string(),
            );
        }
        for (i, file) in self.suitability_files.iter().enumerate() {
            if self.suitability_files[..i].contains(file) {
                errors.push(format!("suitability file '{}' listed more than once", file));
            }
        }

        if !(self.cell_size > 0.0) {
            errors.push(format!("cell_size must be > 0, got {}", self.cell_size));
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            errors.push(format!(
                "log_level must be one of {:?}, got '{}'. Example: log_level = \"info\"",
                valid_levels, self.log_level
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.join("\n"))
        }
    }

    pub fn map_template(&self) -> Result<MapNameTemplate, String> {
        MapNameTemplate::parse(&self.map_names)
    }

    /// Suitability file paths, relative paths resolved against `config_dir`.
    pub fn suitability_paths(&self, config_dir: &Path) -> Vec<PathBuf> {
        self.suitability_files
            .iter()
            .map(|f| {
                let p = Path::new(f);
                if p.is_absolute() {
                    p.to_path_buf()
                } else {
                    config_dir.join(p)
                }
            })
            .collect()
    }
}
