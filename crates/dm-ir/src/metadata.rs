//! Metadata for tracking source positions and validation findings
#![allow(clippy::must_use_candidate)] // Constructor helpers are clear at call sites without #[must_use].
#![allow(clippy::return_self_not_must_use)] // Fluent setters are designed for chaining.

use serde::{Deserialize, Serialize};

/// Source position information for error reporting
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Line number (1-indexed)
    pub line: usize,

    /// Column number (1-indexed)
    pub column: usize,

    /// Byte offset from start of file
    pub offset: usize,
}

/// Information about the source of the data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInfo {
    /// Source file path or identifier
    pub source: String,

    /// Position within the source
    pub position: Position,

    /// Additional context (e.g., product type)
    pub context: Option<String>,
}

/// A finding produced while checking a document against a product schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationMessage {
    /// Finding code
    pub code: String,

    /// Human-readable message
    pub message: String,

    /// Severity level
    pub severity: Severity,

    /// Path to the affected node
    pub path: String,

    /// Expected value (if applicable)
    pub expected: Option<String>,

    /// Actual value (if applicable)
    pub actual: Option<String>,
}

/// Severity level for validation messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Warning,
    Error,
}

impl Position {
    /// Create a new position
    #[must_use]
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }

    /// Compute the line/column of a byte offset within `text`
    #[must_use]
    pub fn from_offset(text: &str, offset: usize) -> Self {
        let offset = offset.min(text.len());
        let before = text.as_bytes().get(..offset).unwrap_or_default();
        let line = before.iter().filter(|&&b| b == b'\n').count() + 1;
        let line_start = before
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |idx| idx + 1);
        Self {
            line,
            column: offset - line_start + 1,
            offset,
        }
    }
}

impl SourceInfo {
    /// Create new source info
    #[must_use]
    pub fn new(source: impl Into<String>, position: Position) -> Self {
        Self {
            source: source.into(),
            position,
            context: None,
        }
    }

    /// Add context
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

impl ValidationMessage {
    /// Create a new validation message
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        severity: Severity,
        path: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            severity,
            path: path.into(),
            expected: None,
            actual: None,
        }
    }

    /// Add expected/actual values
    #[must_use]
    pub fn with_values(mut self, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self.actual = Some(actual.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_creation() {
        let pos = Position::new(10, 20, 100);
        assert_eq!(pos.line, 10);
        assert_eq!(pos.column, 20);
        assert_eq!(pos.offset, 100);
    }

    #[test]
    fn test_position_from_offset() {
        let text = "<a>\n  <b>\n</a>";
        assert_eq!(Position::from_offset(text, 0), Position::new(1, 1, 0));
        assert_eq!(Position::from_offset(text, 6), Position::new(2, 3, 6));
        // Offsets past the end clamp to the text length.
        assert_eq!(Position::from_offset(text, 999).line, 3);
    }

    #[test]
    fn test_source_info_with_context() {
        let pos = Position::new(1, 1, 0);
        let source = SourceInfo::new("params.xml", pos).with_context("DpdTwoDMassParamsConvergencePatch");

        assert_eq!(source.source, "params.xml");
        assert_eq!(
            source.context,
            Some("DpdTwoDMassParamsConvergencePatch".to_string())
        );
    }

    #[test]
    fn test_validation_message_with_values() {
        let msg = ValidationMessage::new("TYPE", "Type mismatch", Severity::Error, "Data/Nbins")
            .with_values("integer", "two");

        assert_eq!(msg.code, "TYPE");
        assert_eq!(msg.severity, Severity::Error);
        assert_eq!(msg.path, "Data/Nbins");
        assert_eq!(msg.expected, Some("integer".to_string()));
        assert_eq!(msg.actual, Some("two".to_string()));
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Warning < Severity::Error);
    }
}
