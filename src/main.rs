use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

use tracing_subscriber::EnvFilter;
use wildlife_habitat::cli::commands;
use wildlife_habitat::config::habitat::HabitatConfig;
use wildlife_habitat::output::raster::AsciiGridSink;

#[derive(Parser)]
#[command(name = "wildlife-habitat")]
#[command(about = "Wildlife habitat suitability maps from forest composition, stand age and disturbance history")]
#[command(version)]
struct Cli {
    /// Path to the habitat configuration file
    #[arg(short, long, default_value = "habitat.toml")]
    config: String,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the habitat engine over a generated scenario landscape
    Run {
        /// Path to the scenario file
        #[arg(short, long, default_value = "scenario.toml")]
        scenario: String,

        /// Number of timesteps after step 0 (default: scenario duration / timestep)
        #[arg(long)]
        steps: Option<u32>,

        /// Write per-step statistics to this JSON file
        #[arg(long)]
        summary: Option<String>,
    },

    /// Validate the configuration and suitability files against a species list
    Check {
        /// Scenario file providing the species list
        #[arg(short, long, default_value = "scenario.toml")]
        species: String,
    },
}

fn init_logging(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn main() {
    let cli = Cli::parse();
    let config_path = PathBuf::from(&cli.config);

    let config = match HabitatConfig::from_file(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        }
    };
    init_logging(&config.log_level, cli.log_format);

    match cli.command {
        Commands::Run {
            scenario,
            steps,
            summary,
        } => {
            let mut sink = AsciiGridSink::new(config.cell_size);
            let reports = match commands::run(
                &config,
                &config_path,
                Path::new(&scenario),
                steps,
                &mut sink,
            ) {
                Ok(r) => r,
                Err(e) => {
                    eprintln!("Habitat run error: {}", e);
                    std::process::exit(1);
                }
            };

            if let Some(summary) = summary {
                let path = Path::new(&summary);
                match commands::write_summary(&reports, path) {
                    Ok(()) => println!("Summary written to {}", path.display()),
                    Err(e) => {
                        eprintln!("Cannot write summary: {}", e);
                        std::process::exit(1);
                    }
                }
            }
        }

        Commands::Check { species } => {
            if let Err(e) = commands::check(&config, &config_path, Path::new(&species)) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }
}
