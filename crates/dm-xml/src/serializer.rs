//! XML product serializer
//!
//! Emits a [`Document`] as UTF-8 XML with an XML declaration and indented
//! elements. Attribute order follows the node's attribute map, so output is
//! deterministic.

use crate::{Error, Result};
use dm_ir::{Document, Node, Traversal, walk};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Serializer for XML product documents
#[derive(Debug, Clone)]
pub struct XmlSerializer {
    indent_char: u8,
    indent_size: usize,
}

impl XmlSerializer {
    /// Create a serializer indenting with four spaces
    #[must_use]
    pub fn new() -> Self {
        Self {
            indent_char: b' ',
            indent_size: 4,
        }
    }

    /// Set the indentation character and width
    #[must_use]
    pub fn with_indent(mut self, indent_char: u8, indent_size: usize) -> Self {
        self.indent_char = indent_char;
        self.indent_size = indent_size;
        self
    }

    /// Serialize a document to an XML string
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialize`] if an event cannot be written.
    pub fn serialize(&self, document: &Document) -> Result<String> {
        let mut buffer = Vec::new();
        self.serialize_to_writer(document, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| Error::Serialize(e.to_string()))
    }

    /// Serialize a document into any writer
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialize`] if an event cannot be written.
    pub fn serialize_to_writer<W: Write>(&self, document: &Document, writer: W) -> Result<()> {
        let mut emitter = Emitter {
            writer: Writer::new_with_indent(writer, self.indent_char, self.indent_size),
            error: None,
        };

        emitter
            .writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(|e| Error::Serialize(e.to_string()))?;

        walk(&document.root, &mut emitter);
        if let Some(error) = emitter.error {
            return Err(error);
        }

        emitter
            .writer
            .get_mut()
            .write_all(b"\n")
            .map_err(|e| Error::Serialize(e.to_string()))
    }

    /// Write a document to `path`.
    ///
    /// The XML is written to a uniquely named temporary sibling which is
    /// renamed into place once complete, so `path` either holds the whole
    /// product or is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be created, written or
    /// renamed, and [`Error::Serialize`] if serialization fails.
    pub fn write_file(&self, document: &Document, path: &Path) -> Result<()> {
        let xml = self.serialize(document)?;
        let io_error = |e: std::io::Error| Error::io(path.display().to_string(), e.to_string());

        let mut staging = tempfile::Builder::new()
            .prefix(&staging_prefix(path))
            .suffix(".partial")
            .tempfile_in(staging_dir(path))
            .map_err(io_error)?;
        staging.write_all(xml.as_bytes()).map_err(io_error)?;
        staging.persist(path).map_err(|e| io_error(e.error))?;

        debug!(path = %path.display(), bytes = xml.len(), "Wrote XML document");
        Ok(())
    }
}

impl Default for XmlSerializer {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes tree events as the walk visits them; stops at the first failure.
struct Emitter<W: Write> {
    writer: Writer<W>,
    error: Option<Error>,
}

impl<W: Write> Emitter<W> {
    fn record(&mut self, result: std::result::Result<(), String>) {
        if let Err(message) = result {
            if self.error.is_none() {
                self.error = Some(Error::Serialize(message));
            }
        }
    }

    fn emit(&mut self, event: Event<'_>) -> std::result::Result<(), String> {
        self.writer.write_event(event).map_err(|e| e.to_string())
    }

    fn write_leaf(&mut self, node: &Node) -> std::result::Result<(), String> {
        let text = node
            .value
            .as_ref()
            .and_then(dm_ir::Value::as_string)
            .filter(|t| !t.is_empty());

        match text {
            Some(text) => {
                self.emit(Event::Start(start_tag(node)))?;
                self.emit(Event::Text(BytesText::new(&text)))?;
                self.emit(Event::End(BytesEnd::new(node.output_name())))
            }
            None => self.emit(Event::Empty(start_tag(node))),
        }
    }
}

impl<W: Write> Traversal for Emitter<W> {
    fn visit(&mut self, node: &Node, _path: &[String]) {
        if node.children.is_empty() {
            let result = self.write_leaf(node);
            self.record(result);
        }
    }

    fn enter(&mut self, node: &Node, _path: &[String]) {
        let result = self.emit(Event::Start(start_tag(node)));
        self.record(result);
    }

    fn leave(&mut self, node: &Node, _path: &[String]) {
        let result = self.emit(Event::End(BytesEnd::new(node.output_name())));
        self.record(result);
    }

    fn should_continue(&self) -> bool {
        self.error.is_none()
    }
}

fn start_tag(node: &Node) -> BytesStart<'_> {
    let mut start = BytesStart::new(node.output_name());
    for (key, value) in &node.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }
    start
}

fn staging_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

fn staging_prefix(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map_or_else(|| "output".into(), |n| n.to_string_lossy().into_owned());
    format!(".{file_name}.")
}
