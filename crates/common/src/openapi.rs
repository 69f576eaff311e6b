//! OpenAPI 3.1 document model
//!
//! Only the parts of the object model the generator emits are represented.
//! Every optional field is skipped when unset so documents stay minimal, and
//! all types compare structurally (two responses are the same response when
//! they serialize the same).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::collections::BTreeMap;

/// OpenAPI specification version emitted by the generator
pub const OPENAPI_VERSION: &str = "3.1.0";

/// Media type of every JSON:API request and response body
pub const JSONAPI_MEDIA_TYPE: &str = "application/vnd.api+json";

/// Component kinds addressable by a `$ref`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Schemas,
    Responses,
    Parameters,
    Examples,
    RequestBodies,
    Headers,
    SecuritySchemes,
    Links,
    Callbacks,
}

impl ComponentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::Schemas => "schemas",
            ComponentKind::Responses => "responses",
            ComponentKind::Parameters => "parameters",
            ComponentKind::Examples => "examples",
            ComponentKind::RequestBodies => "requestBodies",
            ComponentKind::Headers => "headers",
            ComponentKind::SecuritySchemes => "securitySchemes",
            ComponentKind::Links => "links",
            ComponentKind::Callbacks => "callbacks",
        }
    }
}

/// A `$ref` pointer into `components`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Reference {
    #[serde(rename = "$ref")]
    pub reference: String,
}

impl Reference {
    /// Reference to a named component
    ///
    /// # Examples
    /// ```
    /// use jsonapi_openapi_common::openapi::{ComponentKind, Reference};
    ///
    /// let r = Reference::component(ComponentKind::Schemas, "Article");
    /// assert_eq!(r.reference, "#/components/schemas/Article");
    /// ```
    pub fn component(kind: ComponentKind, name: &str) -> Self {
        Self {
            reference: format!("#/components/{}/{}", kind.as_str(), name),
        }
    }

    /// Name of the referenced component (the last pointer segment)
    pub fn name(&self) -> &str {
        self.reference
            .rsplit('/')
            .next()
            .unwrap_or(self.reference.as_str())
    }
}

/// Either a reference or an inline object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RefOr<T> {
    Ref(Reference),
    Item(Box<T>),
}

impl<T> RefOr<T> {
    pub fn item(value: T) -> Self {
        RefOr::Item(Box::new(value))
    }

    pub fn is_ref(&self) -> bool {
        matches!(self, RefOr::Ref(_))
    }

    pub fn as_item(&self) -> Option<&T> {
        match self {
            RefOr::Item(item) => Some(item),
            RefOr::Ref(_) => None,
        }
    }

    pub fn as_item_mut(&mut self) -> Option<&mut T> {
        match self {
            RefOr::Item(item) => Some(item),
            RefOr::Ref(_) => None,
        }
    }
}

impl<T> From<Reference> for RefOr<T> {
    fn from(reference: Reference) -> Self {
        RefOr::Ref(reference)
    }
}

pub type SchemaOrRef = RefOr<Schema>;

impl From<Schema> for SchemaOrRef {
    fn from(schema: Schema) -> Self {
        RefOr::item(schema)
    }
}

/// The `type` keyword: a single type name or a union
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaType {
    Single(String),
    Union(Vec<String>),
}

impl SchemaType {
    pub fn members(&self) -> Vec<&str> {
        match self {
            SchemaType::Single(t) => vec![t.as_str()],
            SchemaType::Union(types) => types.iter().map(String::as_str).collect(),
        }
    }

    fn from_members(mut types: Vec<String>) -> Self {
        if types.len() == 1 {
            SchemaType::Single(types.remove(0))
        } else {
            SchemaType::Union(types)
        }
    }
}

impl From<&str> for SchemaType {
    fn from(value: &str) -> Self {
        SchemaType::Single(value.to_string())
    }
}

/// `additionalProperties`: a boolean switch or a schema for extra members
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Allowed(bool),
    Schema(Box<SchemaOrRef>),
}

/// JSON Schema node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<SchemaType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    #[serde(rename = "const", default, skip_serializing_if = "Option::is_none")]
    pub const_value: Option<Value>,

    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Number>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Number>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_items: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_properties: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, SchemaOrRef>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<AdditionalProperties>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaOrRef>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_of: Option<Vec<SchemaOrRef>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one_of: Option<Vec<SchemaOrRef>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub any_of: Option<Vec<SchemaOrRef>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,

    /// `x-*` extension members
    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

impl Schema {
    /// Schema with a single `type`
    pub fn typed(schema_type: &str) -> Self {
        Self {
            schema_type: Some(schema_type.into()),
            ..Default::default()
        }
    }

    /// `{type: object}` with the given properties
    pub fn object(properties: IndexMap<String, SchemaOrRef>) -> Self {
        Self {
            schema_type: Some("object".into()),
            properties: Some(properties),
            ..Default::default()
        }
    }

    /// `{type: array, items}`
    pub fn array(items: impl Into<SchemaOrRef>) -> Self {
        Self {
            schema_type: Some("array".into()),
            items: Some(Box::new(items.into())),
            ..Default::default()
        }
    }

    /// Composition of the given schemas with `allOf`
    pub fn all_of(members: Vec<SchemaOrRef>) -> Self {
        Self {
            all_of: Some(members),
            ..Default::default()
        }
    }

    /// Alternatives with `oneOf`
    pub fn one_of(members: Vec<SchemaOrRef>) -> Self {
        Self {
            one_of: Some(members),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_example(mut self, example: Value) -> Self {
        self.example = Some(example);
        self
    }

    pub fn with_required(mut self, required: Vec<String>) -> Self {
        self.required = if required.is_empty() {
            None
        } else {
            Some(required)
        };
        self
    }

    pub fn with_additional_properties(mut self, allowed: bool) -> Self {
        self.additional_properties = Some(AdditionalProperties::Allowed(allowed));
        self
    }

    pub fn with_extension(mut self, key: &str, value: Value) -> Self {
        self.extensions.insert(key.to_string(), value);
        self
    }

    /// Type members in declaration order
    pub fn types(&self) -> Vec<&str> {
        self.schema_type
            .as_ref()
            .map(SchemaType::members)
            .unwrap_or_default()
    }

    pub fn has_type(&self, schema_type: &str) -> bool {
        self.types().contains(&schema_type)
    }

    /// Replace the primary type, keeping a `null` member when present
    pub fn set_type(&mut self, schema_type: &str) {
        self.schema_type = Some(if self.has_type("null") {
            SchemaType::Union(vec![schema_type.to_string(), "null".to_string()])
        } else {
            schema_type.into()
        });
    }

    /// Append `null` to the type union
    ///
    /// # Examples
    /// ```
    /// use jsonapi_openapi_common::openapi::{Schema, SchemaType};
    ///
    /// let mut schema = Schema::typed("string");
    /// schema.make_nullable();
    /// schema.make_nullable();
    /// assert_eq!(
    ///     schema.schema_type,
    ///     Some(SchemaType::Union(vec!["string".into(), "null".into()]))
    /// );
    /// ```
    pub fn make_nullable(&mut self) {
        let mut types: Vec<String> = self
            .types()
            .into_iter()
            .filter(|t| *t != "null")
            .map(str::to_string)
            .collect();
        types.push("null".to_string());
        self.schema_type = Some(SchemaType::from_members(types));
    }

    /// Insert a property, creating the property map when needed
    pub fn insert_property(&mut self, name: impl Into<String>, schema: impl Into<SchemaOrRef>) {
        self.properties
            .get_or_insert_with(IndexMap::new)
            .insert(name.into(), schema.into());
    }
}

/// Location of a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Query,
    Header,
    Path,
    Cookie,
}

/// Operation or path parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,

    #[serde(rename = "in")]
    pub location: ParameterLocation,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_empty_value: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_reserved: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explode: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaOrRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}

impl Parameter {
    /// Optional query parameter
    pub fn query(name: impl Into<String>, schema: impl Into<SchemaOrRef>) -> Self {
        Self {
            name: name.into(),
            location: ParameterLocation::Query,
            description: None,
            required: false,
            allow_empty_value: None,
            allow_reserved: None,
            style: None,
            explode: None,
            schema: Some(schema.into()),
            example: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Serialize array values as a single comma separated value
    pub fn form_style(mut self) -> Self {
        self.explode = Some(false);
        self.style = Some("form".to_string());
        self
    }
}

/// Response header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaOrRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}

/// Named example value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Example {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

/// Body content for one media type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaOrRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examples: Option<IndexMap<String, RefOr<Example>>>,
}

/// Operation response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<IndexMap<String, RefOr<Header>>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<IndexMap<String, MediaType>>,
}

impl Response {
    /// Response carrying only a description
    pub fn described(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            headers: None,
            content: None,
        }
    }
}

/// Operation request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub content: IndexMap<String, MediaType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
}

/// HTTP operation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<RefOr<Parameter>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RefOr<RequestBody>>,

    #[serde(default)]
    pub responses: IndexMap<String, RefOr<Response>>,
}

/// Operations available on one path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<RefOr<Parameter>>,

    /// Operations keyed by lowercased HTTP method, emitted in method order
    #[serde(flatten)]
    pub operations: BTreeMap<String, Operation>,
}

/// Tag used to group operations and schemas
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Contact information for the exposed API
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// License information for the exposed API
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// API information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Info {
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms_of_service: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,

    pub version: String,
}

/// Reusable components, each section sorted by name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub schemas: BTreeMap<String, Schema>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub responses: BTreeMap<String, Response>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, Parameter>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub examples: BTreeMap<String, Example>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub request_bodies: BTreeMap<String, RequestBody>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, Header>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub security_schemes: BTreeMap<String, Value>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub links: BTreeMap<String, Value>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub callbacks: BTreeMap<String, Value>,
}

/// OpenAPI document root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApi {
    pub openapi: String,

    pub info: Info,

    #[serde(default)]
    pub paths: BTreeMap<String, PathItem>,

    #[serde(default)]
    pub components: Components,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_type_keeps_null() {
        let mut schema = Schema::typed("string");
        schema.make_nullable();
        schema.set_type("integer");
        assert_eq!(
            serde_json::to_value(&schema).unwrap(),
            json!({"type": ["integer", "null"]})
        );
    }

    #[test]
    fn test_nullable_on_untyped_collapses() {
        let mut schema = Schema::default();
        schema.make_nullable();
        assert_eq!(schema.schema_type, Some(SchemaType::Single("null".into())));
    }

    #[test]
    fn test_schema_or_ref_round_trips_reference() {
        let value = json!({"$ref": "#/components/schemas/Article"});
        let parsed: SchemaOrRef = serde_json::from_value(value).unwrap();
        match parsed {
            RefOr::Ref(r) => assert_eq!(r.name(), "Article"),
            RefOr::Item(_) => panic!("expected a reference"),
        }
    }

    #[test]
    fn test_extensions_flatten() {
        let schema = Schema::typed("object")
            .with_extension("x-tags", json!(["Resources"]))
            .with_additional_properties(false);
        assert_eq!(
            serde_json::to_value(&schema).unwrap(),
            json!({"type": "object", "additionalProperties": false, "x-tags": ["Resources"]})
        );
    }

    #[test]
    fn test_path_item_orders_operations_by_method() {
        let mut item = PathItem::default();
        item.operations.insert("post".into(), Operation::default());
        item.operations.insert("get".into(), Operation::default());
        let keys: Vec<_> = item.operations.keys().cloned().collect();
        assert_eq!(keys, vec!["get", "post"]);
    }
}
