//! Traversal and cursor APIs for navigating the document tree

use crate::Error;
use crate::Result;
use crate::node::{Node, Value};

/// A cursor for navigating the document tree
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    /// Current node
    node: &'a Node,

    /// Path to current node (for error reporting)
    path: Vec<String>,
}

/// Trait for traversing the document tree
pub trait Traversal {
    /// Visit a node
    fn visit(&mut self, node: &Node, path: &[String]);

    /// Called when entering a node with children
    fn enter(&mut self, _node: &Node, _path: &[String]) {}

    /// Called when leaving a node with children
    fn leave(&mut self, _node: &Node, _path: &[String]) {}

    /// Returns true if traversal should continue
    fn should_continue(&self) -> bool {
        true
    }
}

impl<'a> Cursor<'a> {
    /// Create a new cursor at the given node
    pub fn new(node: &'a Node) -> Self {
        Self {
            node,
            path: vec![node.name.clone()],
        }
    }

    /// Get the current node
    #[must_use]
    pub fn node(&self) -> &'a Node {
        self.node
    }

    /// Get the current path
    #[must_use]
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Current path joined with `/`
    #[must_use]
    pub fn path_string(&self) -> String {
        self.path.join("/")
    }

    /// Non-empty value of the current node
    #[must_use]
    pub fn content(&self) -> Option<&'a Value> {
        self.node.value.as_ref().filter(|v| !v.is_empty())
    }

    /// Navigate to a child node by name
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeNotFound`] when no child has that name.
    pub fn child(&self, name: &str) -> Result<Cursor<'a>> {
        match self.node.find_child(name) {
            Some(child) => Ok(self.descend(child, name.to_string())),
            None => Err(Error::node_not_found(format!(
                "{}/{}",
                self.path_string(),
                name
            ))),
        }
    }

    /// Get all children matching a name, in document order
    #[must_use]
    pub fn children(&self, name: &str) -> Vec<Cursor<'a>> {
        self.node
            .find_children(name)
            .into_iter()
            .enumerate()
            .map(|(idx, child)| self.descend(child, format!("{name}[{idx}]")))
            .collect()
    }

    /// Navigate using a path (e.g., `Data/PatchParams[1]/PatchList[0]/PixelSize`)
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPath`] for malformed index syntax and
    /// [`Error::NodeNotFound`] when a segment does not resolve.
    pub fn navigate(&self, path: &str) -> Result<Cursor<'a>> {
        let mut current_node = self.node;
        let mut current_path = self.path.clone();

        for segment in path.split('/') {
            if segment.is_empty() {
                continue;
            }

            // Handle array indexing like "RedshiftBin[0]"
            if let Some(open_bracket) = segment.find('[') {
                let name = &segment[..open_bracket];
                let close_bracket = segment[open_bracket..]
                    .find(']')
                    .map(|offset| open_bracket + offset)
                    .ok_or_else(|| Error::invalid_path(path, format!("unclosed bracket in '{segment}'")))?;
                let index: usize = segment[open_bracket + 1..close_bracket]
                    .parse()
                    .map_err(|_| Error::invalid_path(path, format!("invalid index in '{segment}'")))?;

                current_node = current_node
                    .find_children(name)
                    .get(index)
                    .copied()
                    .ok_or_else(|| {
                        Error::node_not_found(format!("{}/{}", current_path.join("/"), segment))
                    })?;
                current_path.push(format!("{name}[{index}]"));
            } else {
                current_node = current_node.find_child(segment).ok_or_else(|| {
                    Error::node_not_found(format!("{}/{}", current_path.join("/"), segment))
                })?;
                current_path.push(segment.to_string());
            }
        }

        Ok(Cursor {
            node: current_node,
            path: current_path,
        })
    }

    /// Navigate to an optional node.
    ///
    /// Yields `None` when the node is absent or has no content; an empty
    /// element is treated exactly like a missing one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPath`] for malformed paths only.
    pub fn probe(&self, path: &str) -> Result<Option<Cursor<'a>>> {
        match self.navigate(path) {
            Ok(cursor) if cursor.node.has_content() => Ok(Some(cursor)),
            Ok(_) | Err(Error::NodeNotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Read a required text value
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeNotFound`] when the node is absent or empty.
    pub fn get_string(&self, path: &str) -> Result<String> {
        self.read(path, "string", Value::as_string)
    }

    /// Read a required integer value
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeNotFound`] when absent or empty and
    /// [`Error::TypeMismatch`] when the text is not an integer.
    pub fn get_i64(&self, path: &str) -> Result<i64> {
        self.read(path, "integer", Value::as_i64)
    }

    /// Read a required decimal value
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeNotFound`] when absent or empty and
    /// [`Error::TypeMismatch`] when the text is not a number.
    pub fn get_f64(&self, path: &str) -> Result<f64> {
        self.read(path, "decimal", Value::as_f64)
    }

    /// Read a required flag
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeNotFound`] when absent or empty and
    /// [`Error::TypeMismatch`] when the text is not a boolean.
    pub fn get_bool(&self, path: &str) -> Result<bool> {
        self.read(path, "boolean", Value::as_bool)
    }

    /// Read an optional integer; absent or empty yields `None`
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] when present but not an integer.
    pub fn opt_i64(&self, path: &str) -> Result<Option<i64>> {
        self.read_optional(path, "integer", Value::as_i64)
    }

    /// Read an optional decimal; absent or empty yields `None`
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] when present but not a number.
    pub fn opt_f64(&self, path: &str) -> Result<Option<f64>> {
        self.read_optional(path, "decimal", Value::as_f64)
    }

    fn read<T>(&self, path: &str, expected: &str, convert: fn(&Value) -> Option<T>) -> Result<T> {
        let cursor = self.navigate(path)?;
        cursor.convert(expected, convert)
    }

    fn read_optional<T>(
        &self,
        path: &str,
        expected: &str,
        convert: fn(&Value) -> Option<T>,
    ) -> Result<Option<T>> {
        match self.probe(path)? {
            Some(cursor) => cursor.convert(expected, convert).map(Some),
            None => Ok(None),
        }
    }

    fn convert<T>(&self, expected: &str, convert: fn(&Value) -> Option<T>) -> Result<T> {
        let value = self
            .content()
            .ok_or_else(|| Error::node_not_found(self.path_string()))?;
        convert(value).ok_or_else(|| {
            Error::type_mismatch(
                self.path_string(),
                expected,
                value.as_string().unwrap_or_default(),
            )
        })
    }

    fn descend(&self, node: &'a Node, segment: String) -> Cursor<'a> {
        let mut path = self.path.clone();
        path.push(segment);
        Cursor { node, path }
    }
}

/// Walk the tree using a visitor
pub fn walk<T: Traversal>(node: &Node, visitor: &mut T) {
    walk_recursive(node, visitor, &mut vec![]);
}

fn walk_recursive<T: Traversal>(node: &Node, visitor: &mut T, path: &mut Vec<String>) {
    if !visitor.should_continue() {
        return;
    }

    visitor.visit(node, path);

    if !node.children.is_empty() {
        visitor.enter(node, path);
        path.push(node.name.clone());

        for child in &node.children {
            walk_recursive(child, visitor, path);
        }

        path.pop();
        visitor.leave(node, path);
    }
}
