//! Document representation for data-model products
#![allow(clippy::must_use_candidate)] // Builder/constructor API intentionally omits pervasive #[must_use].
#![allow(clippy::return_self_not_must_use)] // Fluent builder methods return Self for ergonomics.

use crate::metadata::SourceInfo;
use crate::node::Node;
use crate::traversal::Cursor;
use serde::{Deserialize, Serialize};

/// A parsed or assembled product document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Root node of the document
    pub root: Node,

    /// Document-level metadata
    pub metadata: DocumentMetadata,
}

/// Metadata associated with a document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Source information (file, position, etc.)
    pub source: Option<SourceInfo>,

    /// Product type, i.e. the local name of the root element
    pub product_type: Option<String>,

    /// Namespace URI bound to the root element, if declared
    pub namespace: Option<String>,

    /// Creation timestamp
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Document {
    /// Create a new document with the given root node
    pub fn new(root: Node) -> Self {
        let metadata = DocumentMetadata {
            product_type: Some(root.name.clone()),
            ..DocumentMetadata::default()
        };
        Self { root, metadata }
    }

    /// Create a new document with metadata
    pub fn with_metadata(root: Node, metadata: DocumentMetadata) -> Self {
        Self { root, metadata }
    }

    /// Cursor positioned on the root element
    pub fn cursor(&self) -> Cursor<'_> {
        Cursor::new(&self.root)
    }

    /// Name of the source the document was read from, or `<memory>`
    pub fn source_name(&self) -> &str {
        self.metadata
            .source
            .as_ref()
            .map_or("<memory>", |s| s.source.as_str())
    }
}
