//! Output product assembly and serialization

use crate::header::GenericHeaderGenerator;
use crate::{Error, Result};
use dm_ir::{Document, DocumentMetadata, Node, NodeType, Value};
use dm_schema::SchemaRegistry;
use dm_schema::products::{CONVERGENCE_PATCH, CONVERGENCE_PATCH_NS};
use dm_xml::XmlSerializer;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

const NAMESPACE_PREFIX: &str = "dpd-le3-wl-twodmass-out-convergencepatch";
const MAP_FORMAT: &str = "le3.wl.2dmass.output.patchconvergence";
const MAP_VERSION: &str = "0.1";
const FILE_STATUS: &str = "PROPOSED";
const DRAFT_PRODUCT_TYPE: &str = "DevWSProduct";

/// Header tag values set on every output product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeaderConfig {
    pub prod_sdc: String,
    pub software_name: String,
    pub curator: String,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            prod_sdc: "SDC-FR".to_string(),
            software_name: "2D-MASS-WL".to_string(),
            curator: "LOCAL".to_string(),
        }
    }
}

/// Builds the convergence patch product
#[derive(Debug, Clone, Default)]
pub struct OutputAssembler {
    header: HeaderConfig,
}

impl OutputAssembler {
    #[must_use]
    pub fn new(header: HeaderConfig) -> Self {
        Self { header }
    }

    /// Describe the map written to `fits_filename`; only its base name is kept
    #[must_use]
    pub fn assemble(&self, fits_filename: &str) -> OutputProduct {
        let file_name = basename(fits_filename).to_string();
        if file_name != fits_filename {
            debug!(from = fits_filename, to = %file_name, "Stripped directory from map filename");
        }

        let container = Node::new("DataContainer", NodeType::Element)
            .with_attribute("filestatus", FILE_STATUS)
            .with_child(Node::leaf("FileName", Value::String(file_name.clone())));

        let mut generator = GenericHeaderGenerator::new(DRAFT_PRODUCT_TYPE);
        generator
            .set_tag_value("ProdSDC", self.header.prod_sdc.as_str())
            .set_tag_value("SoftwareName", self.header.software_name.as_str())
            .set_tag_value("Curator", self.header.curator.as_str())
            .change_product_type(CONVERGENCE_PATCH);
        let header = generator.generate();

        let mut data = Node::new("Data", NodeType::Element)
            .with_child(Node::leaf("NResamples", Value::Integer(0)));
        let map = Node::new("NoisyConvergence", NodeType::Element)
            .with_attribute("format", MAP_FORMAT)
            .with_attribute("version", MAP_VERSION)
            .with_child(container);
        data.add_child(map);

        let mut root = Node::new(CONVERGENCE_PATCH, NodeType::Root)
            .with_attribute(format!("xmlns:{NAMESPACE_PREFIX}"), CONVERGENCE_PATCH_NS)
            .with_child(header)
            .with_child(data);
        root.set_qualified_name(format!("{NAMESPACE_PREFIX}:{CONVERGENCE_PATCH}"));

        let metadata = DocumentMetadata {
            product_type: Some(CONVERGENCE_PATCH.to_string()),
            namespace: Some(CONVERGENCE_PATCH_NS.to_string()),
            created_at: Some(chrono::Utc::now()),
            ..DocumentMetadata::default()
        };

        OutputProduct {
            document: Document::with_metadata(root, metadata),
            file_name,
        }
    }
}

/// An assembled convergence patch product
#[derive(Debug, Clone)]
pub struct OutputProduct {
    document: Document,
    file_name: String,
}

impl OutputProduct {
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Map filename stored in the product
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Pretty-printed XML text of the product
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the product cannot be written out.
    pub fn to_xml(&self) -> Result<String> {
        Ok(XmlSerializer::new().serialize(&self.document)?)
    }

    /// Write the product to `dest`
    ///
    /// The product is checked against its schema first; `dest` is either
    /// fully written or left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if the product breaks its schema and
    /// [`Error::Io`] if `dest` cannot be written.
    pub fn serialize(&self, dest: &Path) -> Result<()> {
        let source = self.document.source_name();
        let schema = SchemaRegistry::shared()
            .for_document(&self.document)
            .map_err(|e| Error::from_schema(source, e))?;
        dm_schema::check(&self.document, schema)
            .into_result()
            .map_err(|e| Error::from_schema(source, e))?;

        info!(path = %dest.display(), "Creating output XML product");
        XmlSerializer::new()
            .write_file(&self.document, dest)
            .map_err(|e| match e {
                dm_xml::Error::Io { path, message } => Error::io("write", path, message),
                other => Error::from(other),
            })?;
        info!(path = %dest.display(), "Finished creating output XML product");
        Ok(())
    }
}

/// Last path component of `path`, accepting either separator
///
/// Separator-only input has no component and yields an empty name.
fn basename(path: &str) -> &str {
    path.rsplit(['/', '\\'])
        .find(|segment| !segment.is_empty())
        .unwrap_or_default()
}
