//! Generic product header generation

use chrono::{DateTime, SecondsFormat, Utc};
use dm_ir::{Node, NodeType, Value};
use std::collections::BTreeMap;
use tracing::debug;

/// Header tags in the order they are written
const TAG_ORDER: &[&str] = &[
    "ProductId",
    "ProductType",
    "SoftwareName",
    "SoftwareRelease",
    "ManualValidationStatus",
    "PipelineRun",
    "ExitStatusCode",
    "DataModelVersion",
    "MinDataModelVersion",
    "ScientificCustodian",
    "AccessRights",
    "Curator",
    "CreationDate",
    "ProdSDC",
];

const DEFAULTS: &[(&str, &str)] = &[
    ("SoftwareName", "DmModule"),
    ("SoftwareRelease", env!("CARGO_PKG_VERSION")),
    ("ManualValidationStatus", "UNKNOWN"),
    ("PipelineRun", "LOCAL"),
    ("ExitStatusCode", "OK"),
    ("DataModelVersion", "8.0.5"),
    ("MinDataModelVersion", "8.0.5"),
    ("ScientificCustodian", "LE3"),
    ("AccessRights", "PUBLIC"),
    ("Curator", "LOCAL"),
    ("ProdSDC", "SDC-FR"),
];

/// Builds the `Header` element shared by all products
#[derive(Debug, Clone)]
pub struct GenericHeaderGenerator {
    product_type: String,
    tags: BTreeMap<String, String>,
}

impl GenericHeaderGenerator {
    pub fn new(product_type: impl Into<String>) -> Self {
        Self {
            product_type: product_type.into(),
            tags: BTreeMap::new(),
        }
    }

    /// Override the value written for `tag`
    pub fn set_tag_value(&mut self, tag: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.tags.insert(tag.into(), value.into());
        self
    }

    pub fn change_product_type(&mut self, product_type: impl Into<String>) -> &mut Self {
        self.product_type = product_type.into();
        self
    }

    #[must_use]
    pub fn product_type(&self) -> &str {
        &self.product_type
    }

    /// Header stamped with the current time
    #[must_use]
    pub fn generate(&self) -> Node {
        self.generate_at(Utc::now())
    }

    /// Header stamped with `now`
    #[must_use]
    pub fn generate_at(&self, now: DateTime<Utc>) -> Node {
        let mut header = Node::new("Header", NodeType::Element);
        for tag in TAG_ORDER {
            let value = self.tag_value(tag, now);
            header.add_child(Node::leaf(*tag, Value::String(value)));
        }
        debug!(product_type = %self.product_type, "Generated product header");
        header
    }

    fn tag_value(&self, tag: &str, now: DateTime<Utc>) -> String {
        if let Some(value) = self.tags.get(tag) {
            return value.clone();
        }
        match tag {
            "ProductType" => self.product_type.clone(),
            "ProductId" => format!("{}-{}", self.product_type, now.format("%Y%m%dT%H%M%S%.3fZ")),
            "CreationDate" => now.to_rfc3339_opts(SecondsFormat::Millis, true),
            _ => DEFAULTS
                .iter()
                .find(|(name, _)| *name == tag)
                .map(|(_, value)| (*value).to_string())
                .unwrap_or_default(),
        }
    }
}
