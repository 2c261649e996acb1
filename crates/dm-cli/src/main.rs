//! # dm-cli
//!
//! Command-line entry point of the 2D-mass data-model adapter.
//!
//! Exit codes: 0 on success, 1 when the step fails, 2 for usage errors and
//! 3 for configuration errors.

use anyhow::Context;
use clap::Parser;
use dm_module::{DmConfig, DmProgram, ProgramConfig, RunSummary};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const EXIT_FAILURE: u8 = 1;
const EXIT_CONFIG: u8 = 3;

#[derive(Parser, Debug)]
#[command(name = "dm-module")]
#[command(about = "Run the 2D-mass convergence patch step on a work directory")]
#[command(version)]
struct Cli {
    /// Input XML product, relative to the work directory
    #[arg(long = "in_xml_file", alias = "input_xml_file")]
    in_xml_file: PathBuf,

    /// Output XML product, relative to the work directory
    #[arg(long = "output_xml_file")]
    output_xml_file: PathBuf,

    /// Root working directory where the data is located
    #[arg(long, default_value = ".")]
    workdir: PathBuf,

    /// Parameter XML product, relative to the work directory
    #[arg(long = "parameter_file")]
    parameter_file: PathBuf,

    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `dm_module=trace` (overrides RUST_LOG)
    #[arg(long = "log-level")]
    log_level: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.log_level.as_deref()) {
        eprintln!("error: {e:#}");
        return ExitCode::from(EXIT_CONFIG);
    }

    let settings = match load_settings(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    match run(cli, settings) {
        Ok(summary) => {
            tracing::info!(
                output = %summary.output_product.display(),
                map = %summary.output_fits_file,
                "DM output product created"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

fn init_tracing(level: Option<&str>) -> anyhow::Result<()> {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level).with_context(|| format!("invalid log level '{level}'"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn load_settings(path: Option<&Path>) -> anyhow::Result<DmConfig> {
    match path {
        Some(path) => DmConfig::from_file(path)
            .with_context(|| format!("loading configuration {}", path.display())),
        None => Ok(DmConfig::default()),
    }
}

fn run(cli: Cli, settings: DmConfig) -> anyhow::Result<RunSummary> {
    let config = ProgramConfig {
        workdir: cli.workdir,
        in_xml_file: cli.in_xml_file,
        parameter_file: cli.parameter_file,
        output_xml_file: cli.output_xml_file,
        settings,
    };
    let workdir = config.workdir.display().to_string();
    DmProgram::new(config)
        .run()
        .with_context(|| format!("2D-mass convergence patch step failed in '{workdir}'"))
}
