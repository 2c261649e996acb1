//! # dm-xml
//!
//! XML parser/serializer for data-model products.
//!
//! Parsing turns any well-formed XML product into a [`dm_ir::Document`];
//! element names are matched by local name so namespace prefixes used by
//! different product versions do not matter to callers. Serialization
//! writes a document back as pretty-printed UTF-8 XML.

pub mod parser;
pub mod serializer;

pub use parser::XmlParser;
pub use serializer::XmlSerializer;

use thiserror::Error;

/// Errors that can occur when parsing/serializing XML
#[derive(Error, Debug)]
pub enum Error {
    #[error("Parse error in {source_name} at line {line}, col {column}: {message}")]
    Parse {
        source_name: String,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Serialize error: {0}")]
    Serialize(String),

    #[error("IO error on '{path}': {message}")]
    Io { path: String, message: String },
}

impl Error {
    /// Create an I/O error carrying the affected path
    pub fn io(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Io {
            path: path.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
