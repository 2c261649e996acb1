//! Step driver
//!
//! Runs the whole step for one work directory: check and read the input
//! product, read the parameters, run the map maker, then describe its map in
//! the output product. Any failure stops the run; nothing is written when
//! the map maker fails.

use crate::config::DmConfig;
use crate::input::DmInput;
use crate::output::OutputAssembler;
use crate::parameters::Parameters;
use crate::process::{Invocation, ProcessRunner, SystemRunner};
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{error, info, info_span};

const DATA_DIR: &str = "data";

/// Paths and settings for one run
#[derive(Debug, Clone, Default)]
pub struct ProgramConfig {
    /// Root working directory; the other paths are relative to it
    pub workdir: PathBuf,
    pub in_xml_file: PathBuf,
    pub parameter_file: PathBuf,
    pub output_xml_file: PathBuf,
    pub settings: DmConfig,
}

/// What a successful run read and produced
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub input_product: PathBuf,
    /// Catalog location inside the work directory
    pub catalog: PathBuf,
    pub parameter_product: PathBuf,
    pub parameters: Parameters,
    pub output_fits_file: String,
    pub output_product: PathBuf,
}

/// Driver of the 2D-mass convergence patch step
pub struct DmProgram {
    config: ProgramConfig,
    runner: Box<dyn ProcessRunner>,
}

impl DmProgram {
    /// Create a driver that runs the map maker as a child process
    #[must_use]
    pub fn new(config: ProgramConfig) -> Self {
        Self {
            config,
            runner: Box::new(SystemRunner),
        }
    }

    /// Replace the process runner
    #[must_use]
    pub fn with_runner(mut self, runner: impl ProcessRunner + 'static) -> Self {
        self.runner = Box::new(runner);
        self
    }

    /// Run the step
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileNotFound`] when an input product is missing,
    /// the reading errors of [`DmInput`] and [`Parameters`],
    /// [`Error::ExternalProcess`] when the map maker fails and
    /// [`Error::Io`] when the output product cannot be written.
    pub fn run(&self) -> Result<RunSummary> {
        let span = info_span!("dm_program", workdir = %self.config.workdir.display());
        let _guard = span.enter();

        info!("Entering step");
        let summary = self.execute().inspect_err(|e| error!(error = %e, "Step failed"))?;
        info!("Done");
        Ok(summary)
    }

    fn execute(&self) -> Result<RunSummary> {
        let workdir = &self.config.workdir;
        let settings = &self.config.settings;

        let input_product = workdir.join(&self.config.in_xml_file);
        require_file(&input_product)?;
        info!(path = %input_product.display(), "Using DM input product");
        let input = DmInput::read_file(&input_product)?;

        let catalog_name = input.fits_catalog_filename();
        let catalog = workdir.join(DATA_DIR).join(catalog_name);
        info!(path = %catalog.display(), "Using FITS input catalog");

        let parameter_product = workdir.join(&self.config.parameter_file);
        require_file(&parameter_product)?;
        info!(path = %parameter_product.display(), "Using DM input parameter product");
        let parameters = Parameters::read_parameter_file(&parameter_product, settings.repeat_policy)?;

        let executable = &settings.executable;
        let invocation = Invocation::new(&executable.program)
            .args(executable.args.iter().cloned())
            .arg(format!("--workdir={}", workdir.display()))
            .arg(format!("--paramFile={}", self.config.parameter_file.display()))
            .arg(format!("--input_ShearCatalog={DATA_DIR}/{catalog_name}"))
            .arg(format!("--outShearMap={}", executable.output_fits_file));
        self.runner.run(&invocation)?;

        let output_product = workdir.join(&self.config.output_xml_file);
        OutputAssembler::new(settings.header.clone())
            .assemble(&executable.output_fits_file)
            .serialize(&output_product)?;
        info!(path = %output_product.display(), "DM output product created");

        Ok(RunSummary {
            input_product,
            catalog,
            parameter_product,
            parameters,
            output_fits_file: executable.output_fits_file.clone(),
            output_product,
        })
    }
}

fn require_file(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(Error::FileNotFound {
            path: path.display().to_string(),
        })
    }
}
