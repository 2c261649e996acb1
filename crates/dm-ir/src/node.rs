//! Node types for the document tree
#![allow(clippy::must_use_candidate)] // Builder/constructor API intentionally omits pervasive #[must_use].
#![allow(clippy::return_self_not_must_use)] // Fluent builder methods return Self for ergonomics.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A node in the document tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Local element name (namespace prefix stripped)
    pub name: String,

    /// Prefixed name as written in the source, when it differs from `name`
    pub qualified_name: Option<String>,

    /// Node type
    pub node_type: NodeType,

    /// Text content (if any)
    pub value: Option<Value>,

    /// Child nodes, in document order
    pub children: Vec<Node>,

    /// Attributes, including namespace declarations
    pub attributes: BTreeMap<String, String>,
}

/// Types of nodes in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeType {
    /// Document element of a product
    Root,

    /// Structural element holding other elements
    Element,

    /// Element carrying a single value and no children
    Leaf,
}

/// Values that can be stored in nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// String value (parsers store all text this way)
    String(String),

    /// Integer value
    Integer(i64),

    /// Decimal value
    Decimal(f64),

    /// Boolean value
    Boolean(bool),

    /// Null/empty value
    Null,
}

impl Node {
    /// Create a new node
    pub fn new(name: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            name: name.into(),
            qualified_name: None,
            node_type,
            value: None,
            children: Vec::new(),
            attributes: BTreeMap::new(),
        }
    }

    /// Create a node with a value
    pub fn with_value(name: impl Into<String>, node_type: NodeType, value: Value) -> Self {
        Self {
            value: Some(value),
            ..Self::new(name, node_type)
        }
    }

    /// Create a leaf node holding `value`
    pub fn leaf(name: impl Into<String>, value: Value) -> Self {
        Self::with_value(name, NodeType::Leaf, value)
    }

    /// Add a child node
    pub fn add_child(&mut self, child: Node) -> &mut Self {
        self.children.push(child);
        self
    }

    /// Add a child node, consuming and returning self
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Set an attribute
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Set an attribute, consuming and returning self
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Set the prefixed name used when writing the node back out
    pub fn set_qualified_name(&mut self, qualified_name: impl Into<String>) -> &mut Self {
        let qualified_name = qualified_name.into();
        self.qualified_name = (qualified_name != self.name).then_some(qualified_name);
        self
    }

    /// Name to emit when serializing: the prefixed name if one was recorded
    pub fn output_name(&self) -> &str {
        self.qualified_name.as_deref().unwrap_or(&self.name)
    }

    /// Get an attribute value
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Find a child by name
    pub fn find_child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Find all children by name
    pub fn find_children(&self, name: &str) -> Vec<&Node> {
        self.children.iter().filter(|c| c.name == name).collect()
    }

    /// Whether the node carries a non-empty value or any children.
    ///
    /// `<ThresholdFDR/>` and `<ThresholdFDR>  </ThresholdFDR>` both report
    /// `false`.
    pub fn has_content(&self) -> bool {
        !self.children.is_empty() || self.value.as_ref().is_some_and(|v| !v.is_empty())
    }
}

impl Value {
    /// Convert value to string
    pub fn as_string(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.clone()),
            Value::Integer(i) => Some(i.to_string()),
            Value::Decimal(d) => Some(d.to_string()),
            Value::Boolean(b) => Some(b.to_string()),
            Value::Null => None,
        }
    }

    /// Interpret the value as an integer
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Interpret the value as a decimal number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Decimal(d) => Some(*d),
            // Round-trip through text to stay exact for every i64.
            Value::Integer(i) => i.to_string().parse().ok(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Interpret the value as a flag. Accepts `true`/`false` and `1`/`0`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            Value::Integer(0) => Some(false),
            Value::Integer(1) => Some(true),
            Value::String(s) => match s.trim() {
                "1" => Some(true),
                "0" => Some(false),
                t if t.eq_ignore_ascii_case("true") => Some(true),
                t if t.eq_ignore_ascii_case("false") => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Null, or a string with only whitespace
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}
