//! Schema model definitions

use dm_ir::{Severity, Value};

/// Structural schema of one product type
#[derive(Debug, Clone)]
pub struct ProductSchema {
    /// Local name of the root element, e.g. `DpdTwoDMassParamsConvergencePatch`
    pub product_type: String,
    /// Namespace URI bound to the root element
    pub namespace: String,
    /// Schema version
    pub version: String,
    /// Elements below the root
    pub elements: Vec<ElementDefinition>,
}

/// Definition of an element, addressed by a path relative to its parent
#[derive(Debug, Clone)]
pub struct ElementDefinition {
    pub path: String,
    pub data_type: DataType,
    pub occurrence: Occurrence,
    pub constraints: Vec<Constraint>,
    /// Children of a [`DataType::Group`], relative to each occurrence
    pub children: Vec<ElementDefinition>,
}

/// How often an element may appear
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occurrence {
    Required,
    /// May be absent; an empty element counts as absent
    Optional,
    /// Any number of occurrences, at least `min`
    Repeated { min: usize },
}

/// Expected value type of an element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    String,
    Integer,
    Decimal,
    /// `true`/`false` or `1`/`0`
    Boolean,
    /// Structural element; content is described by `children`
    Group,
}

/// Constraint rules applied to an element's text
#[derive(Debug, Clone)]
pub enum Constraint {
    Pattern {
        regex: String,
        severity: Severity,
    },
}

impl ProductSchema {
    /// Create an empty schema for a product type
    pub fn new(product_type: impl Into<String>, namespace: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            product_type: product_type.into(),
            namespace: namespace.into(),
            version: version.into(),
            elements: Vec::new(),
        }
    }

    /// Add a top-level element definition
    #[must_use]
    pub fn element(mut self, element: ElementDefinition) -> Self {
        self.elements.push(element);
        self
    }
}

impl ElementDefinition {
    /// A required element holding a value
    pub fn required(path: impl Into<String>, data_type: DataType) -> Self {
        Self::with_occurrence(path, data_type, Occurrence::Required)
    }

    /// An optional element holding a value
    pub fn optional(path: impl Into<String>, data_type: DataType) -> Self {
        Self::with_occurrence(path, data_type, Occurrence::Optional)
    }

    /// A repeated structural element; `path` ends with the repeated name
    pub fn repeated(path: impl Into<String>, min: usize, children: Vec<ElementDefinition>) -> Self {
        Self {
            children,
            ..Self::with_occurrence(path, DataType::Group, Occurrence::Repeated { min })
        }
    }

    /// An optional structural element
    pub fn optional_group(path: impl Into<String>, children: Vec<ElementDefinition>) -> Self {
        Self {
            children,
            ..Self::with_occurrence(path, DataType::Group, Occurrence::Optional)
        }
    }

    /// Require the element text to match `regex`
    #[must_use]
    pub fn pattern(mut self, regex: impl Into<String>, severity: Severity) -> Self {
        self.constraints.push(Constraint::Pattern {
            regex: regex.into(),
            severity,
        });
        self
    }

    fn with_occurrence(path: impl Into<String>, data_type: DataType, occurrence: Occurrence) -> Self {
        Self {
            path: path.into(),
            data_type,
            occurrence,
            constraints: Vec::new(),
            children: Vec::new(),
        }
    }
}

impl DataType {
    /// Whether `value` can be read as this type
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            DataType::String | DataType::Group => true,
            DataType::Integer => value.as_i64().is_some(),
            DataType::Decimal => value.as_f64().is_some(),
            DataType::Boolean => value.as_bool().is_some(),
        }
    }

    /// Name used in findings
    pub fn name(self) -> &'static str {
        match self {
            DataType::String => "string",
            DataType::Integer => "integer",
            DataType::Decimal => "decimal",
            DataType::Boolean => "boolean",
            DataType::Group => "group",
        }
    }
}
