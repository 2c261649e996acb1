#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # dm-ir
//!
//! Format-neutral document tree for data-model products.
//!
//! A parsed product is a tree of named [`Node`]s. Components query it by
//! structural path (`Data/ShearCatalog/DataContainer/FileName`) through a
//! [`Cursor`], without knowing which serialization the tree came from.

/// Document container and product-level metadata.
pub mod document;
/// Source positions and validation messages.
pub mod metadata;
/// Core tree node model.
pub mod node;
/// Cursor-based path navigation and visitor traversal.
pub mod traversal;

/// Primary document type.
pub use document::{Document, DocumentMetadata};
/// Position and source metadata plus validation messages.
pub use metadata::{Position, Severity, SourceInfo, ValidationMessage};
/// Node primitives for tree structure and value typing.
pub use node::{Node, NodeType, Value};
/// Traversal entry points for path navigation.
pub use traversal::{Cursor, Traversal, walk};

use thiserror::Error;

/// Errors that can occur when working with the document tree
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Node not found at path: {path}")]
    NodeNotFound { path: String },

    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Type mismatch at {path}: expected {expected}, found '{found}'")]
    TypeMismatch {
        path: String,
        expected: String,
        found: String,
    },
}

impl Error {
    /// Build a node-not-found error with path context.
    pub fn node_not_found(path: impl Into<String>) -> Self {
        Self::NodeNotFound { path: path.into() }
    }

    /// Build an invalid-path error with input path and parsing reason.
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Build a type-mismatch error for the value at `path`.
    pub fn type_mismatch(
        path: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            path: path.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }
}

/// Crate-local result type for tree operations.
pub type Result<T> = std::result::Result<T, Error>;
