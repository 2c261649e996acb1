//! Input product resolution

use crate::{Error, Result};
use dm_ir::Document;
use dm_schema::SchemaRegistry;
use dm_schema::products::{LENS_MC_CATALOG, SHEAR_CATALOG_FILE};
use dm_xml::XmlParser;
use std::path::Path;
use tracing::{debug, info};

/// Reference to the shear catalog named by the input product
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DmInput {
    fits_catalog_filename: String,
}

impl DmInput {
    /// Read the input product at `path`
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileNotFound`] when `path` does not exist and the
    /// errors of [`DmInput::resolve`] otherwise.
    pub fn read_file(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let document = XmlParser::parse_file(path)?;
        Self::resolve(&document)
    }

    /// Pull the catalog filename out of a parsed input product
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] when `document` is not a LensMC catalog
    /// product and [`Error::SchemaViolation`] when it names no catalog file.
    pub fn resolve(document: &Document) -> Result<Self> {
        let source = document.source_name();
        debug!(source, "Resolving input product");

        let schema = SchemaRegistry::shared()
            .get(LENS_MC_CATALOG)
            .map_err(|e| Error::from_schema(source, e))?;
        dm_schema::check(document, schema)
            .into_result()
            .map_err(|e| match e {
                dm_schema::Error::MissingField { path } => Error::SchemaViolation { path },
                other => Error::from_schema(source, other),
            })?;

        let fits_catalog_filename = document
            .cursor()
            .get_string(SHEAR_CATALOG_FILE)
            .map_err(|e| match e {
                dm_ir::Error::NodeNotFound { path } => Error::SchemaViolation { path },
                other => Error::from_ir(source, other),
            })?;

        info!(catalog = %fits_catalog_filename, "Resolved FITS catalog filename");
        Ok(Self {
            fits_catalog_filename,
        })
    }

    /// Catalog filename exactly as written in the product
    #[must_use]
    pub fn fits_catalog_filename(&self) -> &str {
        &self.fits_catalog_filename
    }
}
