//! Runtime view of the JSON API description the typed paths are derived from.
//!
//! The typed projection is checked by the compiler; this module closes the
//! loop with the schema file itself, rejecting declared (path, method) pairs
//! the document does not contain.

use super::ApiPath;
use crate::{Error, ErrorContext, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

const METHOD_KEYS: &[&str] = &["get", "post", "put", "patch", "delete", "head", "options"];

#[derive(Debug, Clone, Deserialize)]
struct RawDocument {
    #[serde(default)]
    paths: BTreeMap<String, BTreeMap<String, serde_json::Value>>,
}

/// The `paths` section of an OpenAPI-style document.
#[derive(Debug, Clone)]
pub struct SchemaDocument {
    paths: BTreeMap<String, Vec<String>>,
}

impl SchemaDocument {
    pub fn from_json_str(content: &str) -> Result<Self> {
        let raw: RawDocument = serde_json::from_str(content)?;
        let paths = raw
            .paths
            .into_iter()
            .map(|(path, item)| {
                let methods = item
                    .keys()
                    .filter(|k| METHOD_KEYS.contains(&k.as_str()))
                    .cloned()
                    .collect();
                (path, methods)
            })
            .collect();
        Ok(Self { paths })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.paths.keys().map(|p| p.as_str())
    }

    pub fn methods(&self, path: &str) -> &[String] {
        self.paths.get(path).map(|m| m.as_slice()).unwrap_or(&[])
    }

    pub fn supports(&self, path: &str, method: &str) -> bool {
        self.methods(path).iter().any(|m| m.eq_ignore_ascii_case(method))
    }

    /// Check that every method declared on `P` exists in the document.
    pub fn verify<P: ApiPath>(&self) -> Result<()> {
        self.verify_declared(P::TEMPLATE, P::METHODS)
    }

    pub fn verify_declared(&self, template: &str, methods: &[&str]) -> Result<()> {
        if !self.paths.contains_key(template) {
            return Err(Error::validation_with_context(
                format!("path {} is not in the schema", template),
                ErrorContext::new()
                    .with_field_path(template)
                    .with_source("schema_document"),
            ));
        }
        let missing: Vec<&str> = methods
            .iter()
            .copied()
            .filter(|m| !self.supports(template, m))
            .collect();
        if !missing.is_empty() {
            return Err(Error::validation_with_context(
                format!(
                    "{} does not support {}",
                    template,
                    missing.join(", ").to_uppercase()
                ),
                ErrorContext::new()
                    .with_field_path(template)
                    .with_details(format!("schema methods: {}", self.methods(template).join(", ")))
                    .with_source("schema_document"),
            ));
        }
        Ok(())
    }
}
