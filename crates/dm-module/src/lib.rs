#![deny(rust_2018_idioms)]
#![warn(clippy::all)]

//! # dm-module
//!
//! Data-model adapter for the 2D-mass convergence patch step.
//!
//! The crate reads the shear catalog reference out of the input product
//! ([`DmInput`]), extracts the map-making parameters ([`Parameters`]), runs
//! the external map maker ([`DmProgram`]) and describes the produced map in
//! a new output product ([`OutputAssembler`]).

pub mod config;
pub mod header;
pub mod input;
pub mod output;
pub mod parameters;
pub mod policies;
pub mod process;
pub mod program;

pub use config::{DmConfig, ExecutableConfig};
pub use header::GenericHeaderGenerator;
pub use input::DmInput;
pub use output::{HeaderConfig, OutputAssembler, OutputProduct};
pub use parameters::{ParameterExtractor, Parameters, Patch, ProjCenter, RedshiftBin};
pub use policies::RepeatPolicy;
pub use process::{Invocation, ProcessRunner, SystemRunner};
pub use program::{DmProgram, ProgramConfig, RunSummary};

use thiserror::Error;

/// Errors that can occur while running the step
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Input product {path} not found")]
    FileNotFound { path: String },

    #[error("Cannot read {source_name}: {message}")]
    Parse { source_name: String, message: String },

    #[error("Product does not follow its schema: {path} is missing")]
    SchemaViolation { path: String },

    #[error("Required field missing: {path}")]
    MissingField { path: String },

    #[error("IO error during {operation} for '{path}': {message}")]
    Io {
        operation: String,
        path: String,
        message: String,
    },

    #[error("External process {program} failed: {message}")]
    ExternalProcess { program: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a parse error for the named source
    pub fn parse(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Create a structured I/O error with operation/path context.
    pub fn io(
        operation: impl Into<String>,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Io {
            operation: operation.into(),
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn external(program: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExternalProcess {
            program: program.into(),
            message: message.into(),
        }
    }

    /// Classify a schema finding raised while reading `source_name`
    pub fn from_schema(source_name: &str, error: dm_schema::Error) -> Self {
        match error {
            dm_schema::Error::MissingField { path } => Self::MissingField { path },
            other => Self::parse(source_name, other.to_string()),
        }
    }

    /// Classify a tree navigation failure raised while reading `source_name`
    pub fn from_ir(source_name: &str, error: dm_ir::Error) -> Self {
        match error {
            dm_ir::Error::NodeNotFound { path } => Self::MissingField { path },
            other => Self::parse(source_name, other.to_string()),
        }
    }
}

impl From<dm_xml::Error> for Error {
    fn from(e: dm_xml::Error) -> Self {
        let text = e.to_string();
        match e {
            dm_xml::Error::Parse { source_name, .. } => Error::Parse {
                source_name,
                message: text,
            },
            dm_xml::Error::Io { path, message } => Error::io("xml", path, message),
            dm_xml::Error::Serialize(message) => Error::io("serialize", "<memory>", message),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
