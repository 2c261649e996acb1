//! YAML configuration for the step
//!
//! Every field is optional in the file; anything left out takes the
//! built-in default. Unknown keys are rejected so typos do not go unnoticed.
//!
//! ```yaml
//! repeat_policy: keep-last
//! executable:
//!   program: E-Run
//!   args: [LE3_2D_MASS_WL_KS, 2.4.0, LE3_2D_MASS_WL_CartesianMapMaker]
//!   output_fits_file: DevWS_ShearMap.fits
//! header:
//!   curator: LOCAL
//! ```

use crate::output::HeaderConfig;
use crate::policies::RepeatPolicy;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DmConfig {
    pub repeat_policy: RepeatPolicy,
    pub executable: ExecutableConfig,
    pub header: HeaderConfig,
}

/// The external map maker and its fixed leading arguments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExecutableConfig {
    pub program: String,
    pub args: Vec<String>,
    /// Map file the executable writes, relative to the work directory
    pub output_fits_file: String,
}

impl Default for ExecutableConfig {
    fn default() -> Self {
        Self {
            program: "E-Run".to_string(),
            args: vec![
                "LE3_2D_MASS_WL_KS".to_string(),
                "2.4.0".to_string(),
                "LE3_2D_MASS_WL_CartesianMapMaker".to_string(),
            ],
            output_fits_file: "DevWS_ShearMap.fits".to_string(),
        }
    }
}

impl DmConfig {
    /// Parse configuration from YAML text
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the text is not valid configuration.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml).map_err(|e| {
            let location = e
                .location()
                .map(|l| format!(" at line {}, column {}", l.line(), l.column()))
                .unwrap_or_default();
            Error::Config(format!("YAML parse error{location}: {e}"))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "Loading configuration");
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_yaml(&content)
    }

    fn validate(&self) -> Result<()> {
        if self.executable.program.trim().is_empty() {
            return Err(Error::Config("executable.program must not be empty".to_string()));
        }
        let fits = self.executable.output_fits_file.trim();
        if fits.is_empty() {
            return Err(Error::Config(
                "executable.output_fits_file must not be empty".to_string(),
            ));
        }
        if !names_a_file(fits) {
            return Err(Error::Config(format!(
                "executable.output_fits_file '{fits}' does not name a file"
            )));
        }
        Ok(())
    }
}

/// False for directory-like paths such as `/`, `maps/` or `..`
fn names_a_file(path: &str) -> bool {
    !path.ends_with(['/', '\\']) && Path::new(path).file_name().is_some()
}
