//! Translation catalogue
//!
//! Lines are stored as nested trees and addressed by dotted keys. A key may
//! carry a `namespace::` prefix; the package's own English lines live in the
//! `jsonapi-openapi` namespace and ship embedded in the binary.

pub use jsonapi_openapi_common::PACKAGE_NAMESPACE;

use jsonapi_openapi_common::{GeneratorError, Result, TranslationSource};
use serde_json::{Map, Value};
use std::collections::HashMap;

const DEFAULT_LINES: &str = include_str!("../lang/en.yaml");

/// Nested translation lines addressed by dotted keys
#[derive(Debug, Clone, Default)]
pub struct TranslationCatalog {
    namespaces: HashMap<String, Value>,
}

impl TranslationCatalog {
    /// Empty catalogue
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalogue holding the bundled English lines
    pub fn with_defaults() -> Result<Self> {
        let mut catalog = Self::new();
        let defaults: serde_yaml::Value = serde_yaml::from_str(DEFAULT_LINES).map_err(|e| {
            GeneratorError::Parse(format!("Failed to parse bundled translations: {}", e))
        })?;
        catalog.merge_namespace(PACKAGE_NAMESPACE, yaml_to_json(defaults)?);
        Ok(catalog)
    }

    /// Merge application lines parsed from YAML
    pub fn merge_yaml(&mut self, yaml: &str) -> Result<()> {
        let value: serde_yaml::Value = serde_yaml::from_str(yaml)
            .map_err(|e| GeneratorError::Parse(format!("Failed to parse translations: {}", e)))?;
        self.merge_yaml_value(value)
    }

    /// Merge application lines from an already parsed YAML tree
    pub fn merge_yaml_value(&mut self, value: serde_yaml::Value) -> Result<()> {
        self.merge_namespace("", yaml_to_json(value)?);
        Ok(())
    }

    /// Merge a tree of lines into a namespace (`""` for application lines)
    pub fn merge_namespace(&mut self, namespace: &str, lines: Value) {
        let target = self
            .namespaces
            .entry(namespace.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        deep_merge(target, lines);
    }

    /// Set a single line
    pub fn insert(&mut self, key: &str, line: Value) {
        let (namespace, path) = split_namespace(key);
        let mut tree = line;
        for segment in path.rsplit('.') {
            let mut map = Map::new();
            map.insert(segment.to_string(), tree);
            tree = Value::Object(map);
        }
        self.merge_namespace(namespace, tree);
    }
}

impl TranslationSource for TranslationCatalog {
    fn line(&self, key: &str) -> Option<Value> {
        let (namespace, path) = split_namespace(key);
        let mut node = self.namespaces.get(namespace)?;
        for segment in path.split('.') {
            node = node.as_object()?.get(segment)?;
        }
        Some(node.clone())
    }
}

fn split_namespace(key: &str) -> (&str, &str) {
    match key.split_once("::") {
        Some((namespace, path)) => (namespace, path),
        None => ("", key),
    }
}

fn deep_merge(target: &mut Value, source: Value) {
    match (target, source) {
        (Value::Object(target), Value::Object(source)) => {
            for (key, value) in source {
                let nested = value.is_object() && target.get(&key).is_some_and(Value::is_object);
                match target.get_mut(&key) {
                    Some(existing) if nested => deep_merge(existing, value),
                    _ => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (target, source) => *target = source,
    }
}

/// Convert a YAML tree to JSON, stringifying scalar mapping keys
fn yaml_to_json(value: serde_yaml::Value) -> Result<Value> {
    Ok(match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => serde_json::to_value(&n)?,
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(items) => Value::Array(
            items
                .into_iter()
                .map(yaml_to_json)
                .collect::<Result<Vec<_>>>()?,
        ),
        serde_yaml::Value::Mapping(mapping) => {
            let mut map = Map::new();
            for (key, value) in mapping {
                let key = match key {
                    serde_yaml::Value::String(s) => s,
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => {
                        return Err(GeneratorError::Parse(format!(
                            "Unsupported translation key: {:?}",
                            other
                        )))
                    }
                };
                map.insert(key, yaml_to_json(value)?);
            }
            Value::Object(map)
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(tagged.value)?,
    })
}
