//! XML product parser
//!
//! Builds a [`Document`] tree from XML text. Elements become [`Node`]s named
//! by their local name; text becomes a [`Value::String`]; attributes
//! (namespace declarations included) are kept on the node. No schema
//! binding happens here: the tree is checked against a product schema by
//! the caller.

use crate::{Error, Result};
use dm_ir::document::DocumentMetadata;
use dm_ir::{Document, Node, NodeType, Position, SourceInfo, Value};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::path::Path;
use tracing::{debug, trace};

/// Parser for XML product documents
#[derive(Debug, Clone)]
pub struct XmlParser {
    source_name: String,
}

impl XmlParser {
    /// Create a new parser for in-memory input
    #[must_use]
    pub fn new() -> Self {
        Self {
            source_name: "<memory>".to_string(),
        }
    }

    /// Set the name reported in errors and document metadata
    #[must_use]
    pub fn with_source_name(mut self, source_name: impl Into<String>) -> Self {
        self.source_name = source_name.into();
        self
    }

    /// Read and parse a file
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read and [`Error::Parse`]
    /// if it is not well-formed UTF-8 XML.
    pub fn parse_file(path: &Path) -> Result<Document> {
        debug!(path = %path.display(), "Parsing XML file");
        let bytes = std::fs::read(path).map_err(|e| Error::io(path.display().to_string(), e.to_string()))?;
        Self::new()
            .with_source_name(path.display().to_string())
            .parse_bytes(&bytes)
    }

    /// Parse raw bytes, which must be UTF-8
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] on invalid UTF-8 or malformed XML.
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<Document> {
        let text = std::str::from_utf8(bytes).map_err(|e| {
            let valid = e.valid_up_to();
            let prefix = std::str::from_utf8(&bytes[..valid]).unwrap_or_default();
            self.error_at(prefix, valid, format!("input is not valid UTF-8: {e}"))
        })?;
        self.parse_str(text)
    }

    /// Parse XML text
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] when the text is not a single well-formed
    /// XML element tree.
    pub fn parse_str(&self, text: &str) -> Result<Document> {
        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<Node> = Vec::new();
        let mut root: Option<Node> = None;

        loop {
            let offset = usize::try_from(reader.buffer_position()).unwrap_or(usize::MAX);
            let event = reader
                .read_event()
                .map_err(|e| self.error_at(text, offset, e.to_string()))?;

            match event {
                Event::Start(start) => {
                    let node = self.open_node(&start, stack.is_empty() && root.is_none(), text, offset)?;
                    stack.push(node);
                }
                Event::Empty(start) => {
                    let node = self.open_node(&start, stack.is_empty() && root.is_none(), text, offset)?;
                    self.close_node(node, &mut stack, &mut root, text, offset)?;
                }
                Event::End(_) => {
                    let node = stack
                        .pop()
                        .ok_or_else(|| self.error_at(text, offset, "unexpected closing tag"))?;
                    self.close_node(node, &mut stack, &mut root, text, offset)?;
                }
                Event::Text(content) => {
                    let content = content
                        .unescape()
                        .map_err(|e| self.error_at(text, offset, e.to_string()))?;
                    self.append_text(&mut stack, &content, text, offset)?;
                }
                Event::CData(content) => {
                    let content = String::from_utf8_lossy(&content.into_inner()).into_owned();
                    self.append_text(&mut stack, &content, text, offset)?;
                }
                Event::Eof => break,
                // Declarations, comments, processing instructions and DOCTYPE carry no product data.
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(self.error_at(
                text,
                text.len(),
                format!("unexpected end of document: <{}> is not closed", open.output_name()),
            ));
        }

        let root = root.ok_or_else(|| self.error_at(text, text.len(), "document has no root element"))?;
        debug!(source = %self.source_name, product_type = %root.name, "Parsed XML document");

        let namespace = namespace_of(&root);
        let metadata = DocumentMetadata {
            source: Some(
                SourceInfo::new(self.source_name.clone(), Position::new(1, 1, 0))
                    .with_context(root.name.clone()),
            ),
            product_type: Some(root.name.clone()),
            namespace,
            created_at: None,
        };
        Ok(Document::with_metadata(root, metadata))
    }

    fn open_node(&self, start: &BytesStart<'_>, is_root: bool, text: &str, offset: usize) -> Result<Node> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let qualified = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let node_type = if is_root { NodeType::Root } else { NodeType::Element };

        let mut node = Node::new(name, node_type);
        node.set_qualified_name(qualified);

        for attribute in start.attributes() {
            let attribute = attribute.map_err(|e| self.error_at(text, offset, e.to_string()))?;
            let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
            let value = attribute
                .unescape_value()
                .map_err(|e| self.error_at(text, offset, e.to_string()))?;
            node.set_attribute(key, value.into_owned());
        }

        trace!(element = %node.output_name(), "Opened element");
        Ok(node)
    }

    fn close_node(
        &self,
        mut node: Node,
        stack: &mut Vec<Node>,
        root: &mut Option<Node>,
        text: &str,
        offset: usize,
    ) -> Result<()> {
        if node.node_type == NodeType::Element && node.children.is_empty() {
            node.node_type = NodeType::Leaf;
        }

        match stack.last_mut() {
            Some(parent) => {
                parent.add_child(node);
            }
            None if root.is_none() => *root = Some(node),
            None => {
                return Err(self.error_at(
                    text,
                    offset,
                    format!("second root element <{}>", node.output_name()),
                ));
            }
        }
        Ok(())
    }

    fn append_text(&self, stack: &mut [Node], content: &str, text: &str, offset: usize) -> Result<()> {
        let Some(node) = stack.last_mut() else {
            if content.trim().is_empty() {
                return Ok(());
            }
            return Err(self.error_at(text, offset, "text outside of the root element"));
        };

        match &mut node.value {
            Some(Value::String(existing)) => existing.push_str(content),
            _ => node.value = Some(Value::String(content.to_string())),
        }
        Ok(())
    }

    fn error_at(&self, text: &str, offset: usize, message: impl Into<String>) -> Error {
        self.error(&Position::from_offset(text, offset), message)
    }

    fn error(&self, position: &Position, message: impl Into<String>) -> Error {
        Error::Parse {
            source_name: self.source_name.clone(),
            line: position.line,
            column: position.column,
            message: message.into(),
        }
    }
}

impl Default for XmlParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Namespace URI bound to the root element's prefix (or the default namespace)
fn namespace_of(root: &Node) -> Option<String> {
    let key = match root.output_name().split_once(':') {
        Some((prefix, _)) => format!("xmlns:{prefix}"),
        None => "xmlns".to_string(),
    };
    root.attribute(&key).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LENS_CATALOG: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<dpd:DpdTwoDMassLensMCCatalog xmlns:dpd="http://euclid.esa.org/schema/dpd/le3/wl/twodmass/inp/lensmccatalog">
  <Header><ProductType>DpdTwoDMassLensMCCatalog</ProductType></Header>
  <Data>
    <ShearCatalog format="le3.wl.2dmass.input.lensmccatalog" version="0.1">
      <DataContainer filestatus="PROPOSED">
        <FileName>LensMC_catalog.fits</FileName>
      </DataContainer>
    </ShearCatalog>
  </Data>
</dpd:DpdTwoDMassLensMCCatalog>
"#;

    #[test]
    fn test_parse_strips_prefix_and_keeps_namespace() {
        let doc = XmlParser::new().parse_str(LENS_CATALOG).unwrap();

        assert_eq!(doc.root.name, "DpdTwoDMassLensMCCatalog");
        assert_eq!(doc.root.node_type, NodeType::Root);
        assert_eq!(doc.root.output_name(), "dpd:DpdTwoDMassLensMCCatalog");
        assert_eq!(
            doc.metadata.namespace.as_deref(),
            Some("http://euclid.esa.org/schema/dpd/le3/wl/twodmass/inp/lensmccatalog")
        );
        assert_eq!(doc.metadata.product_type.as_deref(), Some("DpdTwoDMassLensMCCatalog"));
    }

    #[test]
    fn test_parse_leaf_values_and_attributes() {
        let doc = XmlParser::new().parse_str(LENS_CATALOG).unwrap();
        let cursor = doc.cursor();

        let container = cursor.navigate("Data/ShearCatalog/DataContainer").unwrap();
        assert_eq!(container.node().attribute("filestatus"), Some("PROPOSED"));
        assert_eq!(container.node().node_type, NodeType::Element);

        let file_name = container.child("FileName").unwrap();
        assert_eq!(file_name.node().node_type, NodeType::Leaf);
        assert_eq!(
            file_name.content(),
            Some(&Value::String("LensMC_catalog.fits".to_string()))
        );
    }

    #[test]
    fn test_parse_empty_element_has_no_value() {
        let doc = XmlParser::new()
            .parse_str("<Root><ThresholdFDR/><Other></Other></Root>")
            .unwrap();

        let threshold = doc.root.find_child("ThresholdFDR").unwrap();
        assert_eq!(threshold.node_type, NodeType::Leaf);
        assert!(threshold.value.is_none());
        assert!(!doc.root.find_child("Other").unwrap().has_content());
    }

    #[test]
    fn test_parse_unescapes_text_and_cdata() {
        let doc = XmlParser::new()
            .parse_str("<Root><A>a &amp; b</A><B><![CDATA[<raw>]]></B></Root>")
            .unwrap();

        assert_eq!(doc.cursor().get_string("A").unwrap(), "a & b");
        assert_eq!(doc.cursor().get_string("B").unwrap(), "<raw>");
    }

    #[test]
    fn test_parse_mismatched_tag_reports_position() {
        let err = XmlParser::new()
            .with_source_name("broken.xml")
            .parse_str("<Root>\n  <A>1</B>\n</Root>")
            .unwrap_err();

        match err {
            Error::Parse {
                source_name, line, ..
            } => {
                assert_eq!(source_name, "broken.xml");
                assert_eq!(line, 2);
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_unclosed_root_is_error() {
        let err = XmlParser::new().parse_str("<Root><A>1</A>").unwrap_err();
        assert!(matches!(err, Error::Parse { .. }), "{err}");
    }

    #[test]
    fn test_parse_empty_input_is_error() {
        let err = XmlParser::new().parse_str("  ").unwrap_err();
        assert!(err.to_string().contains("no root element"), "{err}");
    }

    #[test]
    fn test_parse_rejects_invalid_utf8() {
        let err = XmlParser::new().parse_bytes(&[0x3c, 0xff, 0xfe]).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }
}
