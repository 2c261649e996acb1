//! Conformance checks of documents against product schemas

use crate::model::{Constraint, DataType, ElementDefinition, Occurrence, ProductSchema};
use crate::{Error, Result};
use dm_ir::{Cursor, Document, Severity, ValidationMessage};
use regex::Regex;
use tracing::{debug, warn};

const ROOT: &str = "ROOT";
const MISSING: &str = "MISSING";
const TYPE: &str = "TYPE";
const CONSTRAINT: &str = "CONSTRAINT";
const PATH: &str = "PATH";

/// Findings from checking one document
#[derive(Debug, Clone, Default)]
pub struct ConformanceReport {
    pub product_type: String,
    pub issues: Vec<ValidationMessage>,
}

impl ConformanceReport {
    /// True when no finding has error severity
    #[must_use]
    pub fn is_conformant(&self) -> bool {
        self.errors().next().is_none()
    }

    /// Error-level findings
    pub fn errors(&self) -> impl Iterator<Item = &ValidationMessage> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    /// Warning-level findings
    pub fn warnings(&self) -> impl Iterator<Item = &ValidationMessage> {
        self.issues.iter().filter(|i| i.severity == Severity::Warning)
    }

    /// Convert the first error-level finding into an [`Error`]
    ///
    /// # Errors
    ///
    /// Returns the error matching the first error-level finding.
    pub fn into_result(self) -> Result<()> {
        let Some(issue) = self.issues.into_iter().find(|i| i.severity == Severity::Error) else {
            return Ok(());
        };
        let expected = issue.expected.unwrap_or_default();
        let found = issue.actual.unwrap_or_default();
        Err(match issue.code.as_str() {
            ROOT => Error::RootMismatch { expected, found },
            MISSING => Error::MissingField { path: issue.path },
            TYPE => Error::TypeMismatch {
                path: issue.path,
                expected,
                found,
            },
            PATH => Error::InvalidPath {
                path: issue.path,
                reason: issue.message,
            },
            _ => Error::Constraint {
                path: issue.path,
                message: issue.message,
            },
        })
    }

    fn push(&mut self, issue: ValidationMessage) {
        match issue.severity {
            Severity::Error => debug!(path = %issue.path, code = %issue.code, "{}", issue.message),
            Severity::Warning => warn!(path = %issue.path, code = %issue.code, "{}", issue.message),
        }
        self.issues.push(issue);
    }
}

/// Check `document` against `schema`, collecting every finding
#[must_use]
pub fn check(document: &Document, schema: &ProductSchema) -> ConformanceReport {
    let mut report = ConformanceReport {
        product_type: schema.product_type.clone(),
        issues: Vec::new(),
    };

    if document.root.name != schema.product_type {
        report.push(
            ValidationMessage::new(
                ROOT,
                format!(
                    "{} is not a {} product",
                    document.source_name(),
                    schema.product_type
                ),
                Severity::Error,
                document.root.name.clone(),
            )
            .with_values(schema.product_type.clone(), document.root.name.clone()),
        );
        return report;
    }

    check_elements(&document.cursor(), &schema.elements, &mut report);
    debug!(
        product_type = %schema.product_type,
        issues = report.issues.len(),
        "Checked document against schema"
    );
    report
}

fn check_elements(cursor: &Cursor<'_>, definitions: &[ElementDefinition], report: &mut ConformanceReport) {
    for definition in definitions {
        let full_path = format!("{}/{}", cursor.path_string(), definition.path);
        match definition.occurrence {
            Occurrence::Required => match cursor.navigate(&definition.path) {
                Ok(found) if found.node().has_content() => check_node(&found, definition, report),
                Ok(_) | Err(dm_ir::Error::NodeNotFound { .. }) => report.push(ValidationMessage::new(
                    MISSING,
                    format!("required element {full_path} is absent or empty"),
                    Severity::Error,
                    full_path,
                )),
                Err(e) => report.push(invalid_path(full_path, &e)),
            },
            Occurrence::Optional => match cursor.probe(&definition.path) {
                Ok(Some(found)) => check_node(&found, definition, report),
                Ok(None) => {}
                Err(e) => report.push(invalid_path(full_path, &e)),
            },
            Occurrence::Repeated { min } => {
                let (parent_path, name) = definition
                    .path
                    .rsplit_once('/')
                    .unwrap_or(("", definition.path.as_str()));
                let occurrences = match cursor.navigate(parent_path) {
                    Ok(parent) => parent.children(name),
                    Err(_) => Vec::new(),
                };
                if occurrences.len() < min {
                    report.push(
                        ValidationMessage::new(
                            MISSING,
                            format!("{full_path} must occur at least {min} time(s)"),
                            Severity::Error,
                            full_path,
                        )
                        .with_values(min.to_string(), occurrences.len().to_string()),
                    );
                }
                for occurrence in &occurrences {
                    check_node(occurrence, definition, report);
                }
            }
        }
    }
}

fn check_node(cursor: &Cursor<'_>, definition: &ElementDefinition, report: &mut ConformanceReport) {
    if definition.data_type == DataType::Group {
        check_elements(cursor, &definition.children, report);
        return;
    }

    let Some(value) = cursor.content() else {
        return;
    };
    let text = value.as_string().unwrap_or_default();

    if !definition.data_type.accepts(value) {
        report.push(
            ValidationMessage::new(
                TYPE,
                format!(
                    "{} is not a valid {}",
                    cursor.path_string(),
                    definition.data_type.name()
                ),
                Severity::Error,
                cursor.path_string(),
            )
            .with_values(definition.data_type.name(), text.clone()),
        );
        return;
    }

    for constraint in &definition.constraints {
        match constraint {
            Constraint::Pattern { regex, severity } => match Regex::new(regex) {
                Ok(re) if re.is_match(&text) => {}
                Ok(_) => report.push(
                    ValidationMessage::new(
                        CONSTRAINT,
                        format!("'{text}' does not match pattern {regex}"),
                        *severity,
                        cursor.path_string(),
                    )
                    .with_values(regex.clone(), text.clone()),
                ),
                Err(e) => report.push(ValidationMessage::new(
                    CONSTRAINT,
                    format!("invalid pattern {regex}: {e}"),
                    Severity::Error,
                    cursor.path_string(),
                )),
            },
        }
    }
}

fn invalid_path(path: String, error: &dm_ir::Error) -> ValidationMessage {
    ValidationMessage::new(PATH, error.to_string(), Severity::Error, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dm_ir::{Node, NodeType, Value};

    fn schema() -> ProductSchema {
        ProductSchema::new("Params", "urn:test", "0.1")
            .element(ElementDefinition::required("Data/Count", DataType::Integer))
            .element(ElementDefinition::optional("Data/Threshold", DataType::Decimal))
            .element(ElementDefinition::repeated(
                "Data/Bins/Bin",
                1,
                vec![ElementDefinition::required("ZMin", DataType::Decimal)],
            ))
            .element(
                ElementDefinition::optional("Data/File", DataType::String)
                    .pattern(r"^[^/]+$", Severity::Warning),
            )
    }

    fn leaf(name: &str, text: &str) -> Node {
        Node::leaf(name, Value::String(text.to_string()))
    }

    fn document(data: Node) -> Document {
        Document::new(Node::new("Params", NodeType::Root).with_child(data))
    }

    fn bin(zmin: &str) -> Node {
        Node::new("Bin", NodeType::Element).with_child(leaf("ZMin", zmin))
    }

    #[test]
    fn test_conformant_document() {
        let data = Node::new("Data", NodeType::Element)
            .with_child(leaf("Count", "3"))
            .with_child(Node::new("Threshold", NodeType::Leaf))
            .with_child(Node::new("Bins", NodeType::Element).with_child(bin("0.1")).with_child(bin("0.2")));

        let report = check(&document(data), &schema());
        assert!(report.is_conformant(), "{:?}", report.issues);
        assert!(report.into_result().is_ok());
    }

    #[test]
    fn test_root_mismatch() {
        let doc = Document::new(Node::new("Other", NodeType::Root));
        let err = check(&doc, &schema()).into_result().unwrap_err();
        assert_eq!(
            err,
            Error::RootMismatch {
                expected: "Params".to_string(),
                found: "Other".to_string()
            }
        );
    }

    #[test]
    fn test_missing_required_reports_full_path() {
        let data = Node::new("Data", NodeType::Element)
            .with_child(Node::new("Bins", NodeType::Element).with_child(bin("0.1")));

        let err = check(&document(data), &schema()).into_result().unwrap_err();
        assert_eq!(
            err,
            Error::MissingField {
                path: "Params/Data/Count".to_string()
            }
        );
    }

    #[test]
    fn test_type_mismatch_in_optional_and_repeated() {
        let data = Node::new("Data", NodeType::Element)
            .with_child(leaf("Count", "3"))
            .with_child(leaf("Threshold", "high"))
            .with_child(Node::new("Bins", NodeType::Element).with_child(bin("0.1")).with_child(bin("x")));

        let report = check(&document(data), &schema());
        let paths: Vec<_> = report.errors().map(|i| i.path.clone()).collect();
        assert_eq!(
            paths,
            vec!["Params/Data/Threshold", "Params/Data/Bins/Bin[1]/ZMin"]
        );
    }

    #[test]
    fn test_repeated_minimum() {
        let data = Node::new("Data", NodeType::Element).with_child(leaf("Count", "3"));

        let err = check(&document(data), &schema()).into_result().unwrap_err();
        assert!(matches!(err, Error::MissingField { path } if path == "Params/Data/Bins/Bin"));
    }

    #[test]
    fn test_pattern_warning_does_not_fail() {
        let data = Node::new("Data", NodeType::Element)
            .with_child(leaf("Count", "3"))
            .with_child(Node::new("Bins", NodeType::Element).with_child(bin("0.1")))
            .with_child(leaf("File", "dir/cat.fits"));

        let report = check(&document(data), &schema());
        assert!(report.is_conformant());
        assert_eq!(report.warnings().count(), 1);
    }
}
