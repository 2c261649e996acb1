//! Registry of product schemas keyed by product type

use crate::model::ProductSchema;
use crate::products;
use crate::{Error, Result};
use dm_ir::Document;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Registry for looking up product schemas
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    schemas: HashMap<String, ProductSchema>,
}

impl SchemaRegistry {
    /// Create a new empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            schemas: HashMap::new(),
        }
    }

    /// Registry holding the input, parameter and output product schemas
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(products::lens_mc_catalog());
        registry.register(products::params_convergence_patch());
        registry.register(products::convergence_patch());
        registry
    }

    /// Process-wide built-in registry, built on first use
    pub fn shared() -> &'static Self {
        static SHARED: OnceLock<SchemaRegistry> = OnceLock::new();
        SHARED.get_or_init(Self::builtin)
    }

    /// Register a schema under its product type, replacing any previous one
    pub fn register(&mut self, schema: ProductSchema) {
        self.schemas.insert(schema.product_type.clone(), schema);
    }

    /// Get a schema by product type
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no schema is registered for the type.
    pub fn get(&self, product_type: &str) -> Result<&ProductSchema> {
        self.schemas
            .get(product_type)
            .ok_or_else(|| Error::NotFound(product_type.to_string()))
    }

    /// Schema matching the root element of `document`
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown product type.
    pub fn for_document(&self, document: &Document) -> Result<&ProductSchema> {
        self.get(&document.root.name)
    }

    /// Check if a schema exists
    #[must_use]
    pub fn contains(&self, product_type: &str) -> bool {
        self.schemas.contains_key(product_type)
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}
