//! External process invocation

use crate::{Error, Result};
use std::fmt;
use std::process::{Command, ExitStatus};
use tracing::{debug, info};

/// A fully resolved command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Runs external commands to completion
pub trait ProcessRunner {
    /// Run `invocation` and wait for it to finish
    ///
    /// # Errors
    ///
    /// Returns [`Error::ExternalProcess`] if the command cannot be started or
    /// does not exit successfully.
    fn run(&self, invocation: &Invocation) -> Result<()>;
}

/// Runs commands as child processes, inheriting stdio
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<()> {
        info!(command = %invocation, "Running external process");
        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .status()
            .map_err(|e| Error::external(&invocation.program, format!("could not start: {e}")))?;

        debug!(program = %invocation.program, status = %status, "External process finished");
        if status.success() {
            Ok(())
        } else {
            Err(Error::external(&invocation.program, describe(status)))
        }
    }
}

fn describe(status: ExitStatus) -> String {
    if let Some(code) = status.code() {
        return format!("exited with status {code}");
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return format!("terminated by signal {signal}");
        }
    }
    "terminated abnormally".to_string()
}
