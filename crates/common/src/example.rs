//! Materialized example resources
//!
//! Example resources carry the live values the generator infers attribute
//! schemas from and embeds in response examples.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A JSON:API link: a bare URL or a link object with meta
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExampleLink {
    Href(String),
    Object {
        href: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        meta: Option<Map<String, Value>>,
    },
}

impl ExampleLink {
    pub fn href(&self) -> &str {
        match self {
            ExampleLink::Href(href) => href,
            ExampleLink::Object { href, .. } => href,
        }
    }

    pub fn meta(&self) -> Option<&Map<String, Value>> {
        match self {
            ExampleLink::Href(_) => None,
            ExampleLink::Object { meta, .. } => meta.as_ref().filter(|meta| !meta.is_empty()),
        }
    }
}

/// Relationship object of an example resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExampleRelationship {
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub links: IndexMap<String, ExampleLink>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Map<String, Value>>,
}

/// A JSON:API resource object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExampleResource {
    pub id: String,

    #[serde(rename = "type")]
    pub resource_type: String,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub relationships: IndexMap<String, ExampleRelationship>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub links: IndexMap<String, ExampleLink>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Map<String, Value>>,
}

impl ExampleResource {
    /// Resource identifier object (`{type, id}`)
    pub fn identifier(&self) -> Value {
        serde_json::json!({
            "type": self.resource_type,
            "id": self.id,
        })
    }

    /// Resource object as a JSON value
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
