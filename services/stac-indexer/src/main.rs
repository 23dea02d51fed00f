//! STAC to ODC indexer.
//!
//! Converts STAC item and feature-collection files into ODC dataset
//! documents written next to the inputs or into an output directory.

use anyhow::Result;
use clap::{Parser, Subcommand};
use stac_indexer::{
    collect_inputs, index_files, load_config, ConfigOverrides, IndexOptions, OutputFormat,
};
use stac_odc::StacTransformer;
use std::path::PathBuf;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "stac-indexer")]
#[command(about = "Convert STAC items into Open Data Cube dataset documents")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Transform STAC item files or directories of them
    Transform {
        /// Item or feature-collection files, or directories to walk
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Directory for the dataset documents (default: next to each input)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml)]
        format: OutputFormat,

        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Print the effective configuration as YAML
    ShowConfig {
        #[command(flatten)]
        settings: SettingsArgs,
    },
}

#[derive(clap::Args, Debug)]
struct SettingsArgs {
    /// Configuration file path
    #[arg(short, long, env = "STAC_ODC_CONFIG")]
    config: Option<PathBuf>,

    /// Grid key emitted as `default`, e.g. g10m
    #[arg(long)]
    default_grid: Option<String>,

    /// Write asset hrefs as given instead of file names
    #[arg(long)]
    absolute: bool,
}

impl SettingsArgs {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            default_grid: self.default_grid.clone(),
            absolute: self.absolute,
        }
    }
}

fn init_tracing(log_level: &str, json: bool) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.json_logs)?;

    match cli.command {
        Commands::Transform {
            inputs,
            output_dir,
            format,
            settings,
        } => {
            let config = load_config(settings.config.as_deref(), &settings.overrides())?;
            info!(
                default_grid = %config.default_grid,
                path_mode = %config.path_mode,
                "Loaded configuration"
            );

            let files = collect_inputs(&inputs)?;
            info!(files = files.len(), "Starting STAC indexing");

            let transformer = StacTransformer::new(config);
            let options = IndexOptions { output_dir, format };
            let report = index_files(&transformer, &files, &options)?;

            for failure in &report.failures {
                error!("{}", failure);
            }

            if !report.is_success() {
                anyhow::bail!(
                    "{} of {} items failed",
                    report.failures.len(),
                    report.failures.len() + report.written.len()
                );
            }
            Ok(())
        }
        Commands::ShowConfig { settings } => {
            let config = load_config(settings.config.as_deref(), &settings.overrides())?;
            print!("{}", serde_yaml::to_string(&config)?);
            Ok(())
        }
    }
}
