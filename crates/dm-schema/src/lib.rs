//! # dm-schema
//!
//! Product schema model, built-in registry and conformance checks.
//!
//! A [`ProductSchema`] lists the structural paths a product document must,
//! may, or may repeatedly contain, with the value type expected at each.
//! [`check`] walks a parsed [`dm_ir::Document`] against a schema and
//! collects findings into a [`ConformanceReport`].

pub mod conformance;
pub mod model;
pub mod products;
pub mod registry;

pub use conformance::{ConformanceReport, check};
pub use model::{Constraint, DataType, ElementDefinition, Occurrence, ProductSchema};
pub use registry::SchemaRegistry;

use thiserror::Error;

/// Errors that can occur when checking documents against schemas
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Schema not found: {0}")]
    NotFound(String),

    #[error("Document root <{found}> does not match product type {expected}")]
    RootMismatch { expected: String, found: String },

    #[error("Required field missing: {path}")]
    MissingField { path: String },

    #[error("Type mismatch at {path}: expected {expected}, found '{found}'")]
    TypeMismatch {
        path: String,
        expected: String,
        found: String,
    },

    #[error("Constraint violated at {path}: {message}")]
    Constraint { path: String, message: String },

    #[error("Invalid schema path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
