//! Resource schema descriptors
//!
//! A [`ResourceSchema`] is the host application's description of one resource
//! type: identifier strategy, ordered attribute and relationship fields,
//! filters, pagination and the validation rules of its requests. The
//! generator only reads these descriptors.

use crate::rules::RuleList;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Description of a single resource type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceSchema {
    /// Resource type (e.g., "articles")
    #[serde(rename = "type")]
    pub resource_type: String,

    /// Identifier strategy
    #[serde(default)]
    pub id: IdStrategy,

    /// Attribute fields in serialization order
    #[serde(default)]
    pub attributes: Vec<AttributeField>,

    /// Relationship fields in serialization order
    #[serde(default)]
    pub relationships: Vec<RelationField>,

    /// Filters accepted when fetching this resource
    #[serde(default)]
    pub filters: Vec<FilterField>,

    /// Fields the resource can be sorted by
    #[serde(default)]
    pub sort_fields: Vec<String>,

    /// Relationship paths that may be included
    #[serde(default)]
    pub include_paths: Vec<String>,

    /// Pagination strategy, if the resource is paginated
    #[serde(default)]
    pub pagination: Option<PaginationStrategy>,

    /// Pagination values applied when a request omits them
    #[serde(default)]
    pub default_pagination: IndexMap<String, Value>,

    /// Validation rules of the resource's requests
    #[serde(default)]
    pub rules: RequestRules,

    /// Whether resources of this type carry resource-level meta
    #[serde(default)]
    pub meta: bool,
}

impl ResourceSchema {
    /// Find an attribute by its serialized name
    pub fn attribute(&self, serialized_name: &str) -> Option<&AttributeField> {
        self.attributes
            .iter()
            .find(|field| field.serialized_name() == serialized_name)
    }

    /// Find a relationship by its field name
    pub fn relationship(&self, name: &str) -> Option<&RelationField> {
        self.relationships.iter().find(|field| field.name == name)
    }

    /// Find a relationship by its serialized name
    pub fn relationship_by_serialized(&self, serialized_name: &str) -> Option<&RelationField> {
        self.relationships
            .iter()
            .find(|field| field.serialized_name() == serialized_name)
    }
}

/// How resource identifiers look and who may assign them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdStrategy {
    /// Regular expression an identifier matches
    #[serde(default = "default_id_pattern")]
    pub pattern: String,

    /// Whether clients may supply identifiers on create
    #[serde(default)]
    pub accepts_client_ids: bool,

    /// Component name used when the identifier needs its own schema
    #[serde(default)]
    pub name: Option<String>,
}

fn default_id_pattern() -> String {
    "[0-9]+".to_string()
}

impl Default for IdStrategy {
    fn default() -> Self {
        Self {
            pattern: default_id_pattern(),
            accepts_client_ids: false,
            name: None,
        }
    }
}

/// When a field is excluded from request documents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadOnly {
    #[default]
    Never,
    Always,
    Creating,
    Updating,
}

impl ReadOnly {
    pub fn applies(&self, creating: bool) -> bool {
        match self {
            ReadOnly::Never => false,
            ReadOnly::Always => true,
            ReadOnly::Creating => creating,
            ReadOnly::Updating => !creating,
        }
    }
}

/// Declared kind of an attribute field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    String,
    Number,
    Boolean,
    DateTime,
    /// Array list (JSON array)
    List,
    /// Array hash (JSON object with arbitrary keys)
    Hash,
    /// Object with declared sub-fields
    Map,
    Enum,
    #[default]
    Unknown,
}

/// Attribute field of a resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeField {
    pub name: String,

    #[serde(default)]
    pub serialized_name: Option<String>,

    #[serde(default)]
    pub kind: FieldKind,

    #[serde(default)]
    pub read_only: ReadOnly,

    /// Sub-fields of a `map` attribute
    #[serde(default)]
    pub fields: Vec<AttributeField>,

    /// Cases of an `enum` attribute
    #[serde(default, rename = "enum")]
    pub enum_descriptor: Option<EnumDescriptor>,

    /// Literal schema used instead of inference
    #[serde(default)]
    pub schema: Option<Value>,

    /// Component name the literal schema is registered under
    #[serde(default)]
    pub schema_name: Option<String>,
}

impl AttributeField {
    pub fn serialized_name(&self) -> &str {
        self.serialized_name.as_deref().unwrap_or(&self.name)
    }
}

/// A named set of enumeration cases
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumDescriptor {
    pub name: String,
    pub cases: Vec<EnumCase>,
}

/// One case of an enumeration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumCase {
    pub value: Value,

    #[serde(default)]
    pub description: Option<String>,
}

/// Relationship arity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    ToOne,
    ToMany,
}

/// Relationship field of a resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationField {
    pub name: String,

    #[serde(default)]
    pub serialized_name: Option<String>,

    pub cardinality: Cardinality,

    /// Resource type on the other side of the relation
    pub inverse: String,

    /// Additional inverse types of a polymorphic relation
    #[serde(default)]
    pub inverse_types: Vec<String>,

    #[serde(default)]
    pub read_only: ReadOnly,

    /// Whether a to-one relation may be empty
    #[serde(default = "default_nullable")]
    pub nullable: bool,

    /// Filters accepted when fetching the related resources
    #[serde(default)]
    pub filters: Vec<FilterField>,
}

impl RelationField {
    pub fn serialized_name(&self) -> &str {
        self.serialized_name.as_deref().unwrap_or(&self.name)
    }

    pub fn is_to_one(&self) -> bool {
        self.cardinality == Cardinality::ToOne
    }

    pub fn is_to_many(&self) -> bool {
        self.cardinality == Cardinality::ToMany
    }

    /// Every resource type the relation can point at
    pub fn all_inverse(&self) -> Vec<&str> {
        std::iter::once(self.inverse.as_str())
            .chain(self.inverse_types.iter().map(String::as_str))
            .collect()
    }
}

/// Filter accepted by a resource or relation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterField {
    pub key: String,

    /// Whether the filter deserializes its value as a boolean
    #[serde(default)]
    pub as_boolean: bool,

    /// Component name the filter parameter is registered under
    #[serde(default)]
    pub name: Option<String>,

    /// Literal schema used instead of inference
    #[serde(default)]
    pub schema: Option<Value>,
}

/// Case applied to pagination meta keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetaCase {
    Snake,
    Dash,
}

/// Pagination strategy of a resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PaginationStrategy {
    Page {
        #[serde(default = "default_page_key")]
        page_key: String,
        #[serde(default = "default_per_page_key")]
        per_page_key: String,
        #[serde(default)]
        default_per_page: Option<u64>,
        #[serde(default = "default_meta_key")]
        meta_key: Option<String>,
        #[serde(default)]
        meta_case: Option<MetaCase>,
    },
    Cursor {
        #[serde(default = "default_before_key")]
        before: String,
        #[serde(default = "default_after_key")]
        after: String,
        #[serde(default = "default_limit_key")]
        limit: String,
        #[serde(default)]
        default_per_page: Option<u64>,
        #[serde(default = "default_meta_key")]
        meta_key: Option<String>,
        #[serde(default)]
        meta_case: Option<MetaCase>,
    },
    Multi {
        paginators: Vec<PaginationStrategy>,
    },
    /// A strategy the generator cannot describe
    #[serde(other)]
    Other,
}

fn default_nullable() -> bool {
    true
}

fn default_page_key() -> String {
    "number".to_string()
}

fn default_per_page_key() -> String {
    "size".to_string()
}

fn default_before_key() -> String {
    "before".to_string()
}

fn default_after_key() -> String {
    "after".to_string()
}

fn default_limit_key() -> String {
    "limit".to_string()
}

fn default_meta_key() -> Option<String> {
    Some("page".to_string())
}

/// Validation rules of the requests for one resource
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestRules {
    /// Rules of query (fetch) requests, keyed by dotted parameter path
    #[serde(default)]
    pub query: IndexMap<String, RuleList>,

    /// Rules of resource (create/update) requests, keyed by dotted field path
    #[serde(default)]
    pub resource: IndexMap<String, RuleList>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_resource_schema_defaults() {
        let yaml = r#"
type: articles
attributes:
  - name: title
    kind: string
relationships:
  - name: comments
    cardinality: to_many
    inverse: comments
pagination:
  kind: page
"#;
        let schema: ResourceSchema = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(schema.id.pattern, "[0-9]+");
        assert!(!schema.id.accepts_client_ids);
        assert_eq!(schema.attribute("title").unwrap().kind, FieldKind::String);
        assert!(schema.relationship("comments").unwrap().is_to_many());
        assert_eq!(
            schema.pagination,
            Some(PaginationStrategy::Page {
                page_key: "number".into(),
                per_page_key: "size".into(),
                default_per_page: None,
                meta_key: Some("page".into()),
                meta_case: None,
            })
        );
    }

    #[test]
    fn test_unknown_pagination_kind() {
        let strategy: PaginationStrategy = serde_yaml::from_str("kind: offset").unwrap();
        assert_eq!(strategy, PaginationStrategy::Other);
    }

    #[test]
    fn test_read_only_applies() {
        assert!(ReadOnly::Always.applies(true));
        assert!(ReadOnly::Creating.applies(true));
        assert!(!ReadOnly::Creating.applies(false));
        assert!(ReadOnly::Updating.applies(false));
        assert!(!ReadOnly::Never.applies(true));
    }
}
