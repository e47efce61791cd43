use crate::config::{
    CollisionPolicy, GeneratorConfig, WriteStrategy, DEFAULT_OUTPUT_FILE, DEFAULT_ROOT_CONFIG,
};
use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info, warn};
use std::path::PathBuf;

/// OpenAPI from Serverless - Generate an OpenAPI document from serverless function documentation
#[derive(Parser, Debug)]
#[command(name = "openapi-from-serverless")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Root deployment descriptor
    #[arg(short = 'c', long = "config", value_name = "FILE", default_value = DEFAULT_ROOT_CONFIG)]
    pub config: PathBuf,

    /// Output file; a .json extension selects JSON, anything else YAML
    #[arg(short = 'o', long = "output-file", value_name = "FILE", default_value = DEFAULT_OUTPUT_FILE)]
    pub output_file: PathBuf,

    /// Directory function file references are resolved against (default: current directory)
    #[arg(short = 'd', long = "base-dir", value_name = "DIR")]
    pub base_dir: Option<PathBuf>,

    /// Write the metadata first, then merge each path into the written file
    #[arg(long = "incremental")]
    pub incremental: bool,

    /// Fail when two routes document the same path and method
    #[arg(long = "strict")]
    pub strict: bool,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Validate already-parsed arguments and turn them into the run configuration
pub fn parse_args_from_parsed(args: CliArgs) -> Result<GeneratorConfig> {
    debug!("Parsed arguments: {:?}", args);

    let base_dir = match args.base_dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to determine the working directory")?,
    };
    if !base_dir.is_dir() {
        anyhow::bail!("Base directory is not a directory: {}", base_dir.display());
    }

    let strategy = if args.incremental {
        WriteStrategy::Incremental
    } else {
        WriteStrategy::InMemory
    };
    let collision_policy = if args.strict {
        CollisionPolicy::Fail
    } else {
        CollisionPolicy::LastWriteWins
    };

    info!("Root configuration: {}", args.config.display());
    info!("Output file: {}", args.output_file.display());
    info!("Base directory: {}", base_dir.display());

    Ok(GeneratorConfig::new(args.config, args.output_file)
        .with_base_dir(base_dir)
        .with_strategy(strategy)
        .with_collision_policy(collision_policy))
}

/// Run the main workflow
pub fn run(config: &GeneratorConfig) -> Result<()> {
    info!("Starting OpenAPI document generation...");

    let report = crate::generator::run(config).with_context(|| {
        format!(
            "Failed to generate OpenAPI document from {}",
            config.root_config.display()
        )
    })?;

    match report {
        Some(report) => {
            if !report.diagnostics.is_empty() {
                warn!("Completed with {} warnings", report.diagnostics.len());
            }
            info!(
                "Successfully wrote OpenAPI document to {}",
                report.output_path.display()
            );
        }
        None => info!("Nothing to generate"),
    }

    Ok(())
}
