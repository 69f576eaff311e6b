//! Small reusable schema descriptors: identifiers, enumerations and links

use crate::components::{Components, DefaultSchema};
use indexmap::IndexMap;
use jsonapi_openapi_common::openapi::{Schema, SchemaOrRef};
use jsonapi_openapi_common::{
    EnumCase, EnumDescriptor, ExampleLink, GeneratorError, IdStrategy, Result,
};
use regex::Regex;
use serde_json::{json, Value};

const SAMPLE_UUID: &str = "01932c07-209c-7ac4-9c1c-55d0cf5a4a63";
const ULID_PATTERN: &str = "[0-7][0-9a-hjkmnp-tv-zA-HJKMNP-TV-Z]{25}";
const NUMERIC_PATTERN: &str = "[0-9]+";

/// Schema of a resource identifier
pub struct Id;

impl Id {
    /// Identifier schema for a strategy
    ///
    /// Identifiers with a format or a pattern get a named schema of their own
    /// (`Uuid`, `Ulid` or the strategy's name); plain numeric identifiers use
    /// the shared `JsonApi:resourceId` schema.
    pub fn make(components: &Components, strategy: &IdStrategy, as_ref: bool) -> SchemaOrRef {
        let mut name = strategy.name.clone().unwrap_or_else(|| "Id".to_string());
        let mut format = None;
        let mut pattern = None;

        if matches_uuid(&strategy.pattern) {
            name = "Uuid".to_string();
            format = Some("uuid".to_string());
        }

        if strategy.pattern == ULID_PATTERN {
            name = "Ulid".to_string();
            format = Some("ulid".to_string());
        }

        if strategy.pattern != NUMERIC_PATTERN && format.is_none() {
            pattern = Some(strategy.pattern.clone());
        }

        if format.is_none() && pattern.is_none() {
            return default_id(components, as_ref);
        }

        if let Some(existing) = components.schemas.get(&name, as_ref) {
            return existing;
        }

        let schema = Schema {
            format,
            pattern,
            ..Schema::typed("string")
        };

        if as_ref {
            components.schemas.add(&name, schema).into()
        } else {
            schema.into()
        }
    }
}

fn default_id(components: &Components, as_ref: bool) -> SchemaOrRef {
    components
        .schemas
        .get(DefaultSchema::Id.as_str(), as_ref)
        .unwrap_or_else(|| components.schema(DefaultSchema::Id))
}

fn matches_uuid(pattern: &str) -> bool {
    Regex::new(&format!("^(?:{})$", pattern))
        .map(|regex| regex.is_match(SAMPLE_UUID))
        .unwrap_or(false)
}

/// Schema of an enumeration
///
/// The complete, non-nullable enumeration is registered under its name and
/// shared; filtered or nullable variants are always inlined.
pub struct Enum<'c> {
    components: &'c Components,
    name: String,
    cases: Vec<EnumCase>,
    can_ref: bool,
    nullable: bool,
}

impl<'c> Enum<'c> {
    pub fn new(components: &'c Components, descriptor: &EnumDescriptor) -> Self {
        Self::from_cases(components, &descriptor.name, &descriptor.cases)
    }

    pub fn from_cases(components: &'c Components, name: &str, cases: &[EnumCase]) -> Self {
        Self {
            components,
            name: name.to_string(),
            cases: cases.to_vec(),
            can_ref: true,
            nullable: false,
        }
    }

    /// Keep only the cases listed in `only` and not listed in `except`
    pub fn filter(mut self, only: Option<&[Value]>, except: Option<&[Value]>) -> Self {
        let total = self.cases.len();
        self.cases.retain(|case| {
            only.map_or(true, |only| only.contains(&case.value))
                && except.map_or(true, |except| !except.contains(&case.value))
        });
        if self.cases.len() < total {
            self.can_ref = false;
        }
        self
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        if nullable {
            self.can_ref = false;
        }
        self
    }

    pub fn build(self) -> SchemaOrRef {
        if self.can_ref {
            if let Some(reference) = self.components.schemas.get_ref(&self.name) {
                return reference.into();
            }
        }

        let values: Vec<Value> = self.cases.iter().map(|case| case.value.clone()).collect();
        let mut schema = Schema::typed(value_type(values.first()));

        if values.is_empty() {
            return if self.nullable {
                Schema::typed("null").into()
            } else {
                schema.into()
            };
        }

        if values.len() == 1 && !self.nullable {
            schema.const_value = values.into_iter().next();
            return schema.into();
        }

        schema.example = values.first().cloned();
        schema.enum_values = Some(values);
        if self.nullable {
            schema.make_nullable();
            if let Some(values) = schema.enum_values.as_mut() {
                values.push(Value::Null);
            }
        }

        if self.cases.iter().any(|case| case.description.is_some()) {
            let descriptions: IndexMap<String, Value> = self
                .cases
                .iter()
                .map(|case| {
                    let key = value_key(&case.value);
                    let description = case.description.clone().unwrap_or_else(|| key.clone());
                    (key, json!(description))
                })
                .collect();
            schema = schema.with_extension("x-enum-descriptions", json!(descriptions));
        }

        if !self.can_ref {
            return schema.into();
        }

        self.components.schemas.add(&self.name, schema).into()
    }
}

fn value_type(value: Option<&Value>) -> &'static str {
    match value {
        Some(Value::Number(number)) if number.is_i64() || number.is_u64() => "integer",
        Some(Value::Number(_)) => "number",
        _ => "string",
    }
}

fn value_key(value: &Value) -> String {
    match value {
        Value::String(value) => value.clone(),
        other => other.to_string(),
    }
}

/// Schema of a link in a links object
pub struct Link;

impl Link {
    /// A bare URL, or a link object when the link carries meta
    pub fn make(components: &Components, link: &ExampleLink) -> Schema {
        match link.meta() {
            Some(meta) => Schema::all_of(vec![components.schema(DefaultSchema::LinkObject)])
                .with_example(json!({"href": link.href(), "meta": meta})),
            None => Self::url(link.href()),
        }
    }

    /// Plain `self` link to a URL
    pub fn self_link(url: &str) -> Schema {
        Self::url(url)
    }

    fn url(href: &str) -> Schema {
        Schema {
            format: Some("url".to_string()),
            ..Schema::typed("string")
        }
        .with_example(json!(href))
    }
}

/// Parse a literal schema declared by the application
///
/// Anything the document model does not know must be an `x-` extension;
/// other keys are rejected so typos surface instead of being emitted.
pub fn literal_schema(value: &Value, owner: &str) -> Result<Schema> {
    if !value.is_object() {
        return Err(GeneratorError::Configuration(format!(
            "Schema for {} must be an object, got {}",
            owner, value
        )));
    }

    let schema: Schema = serde_json::from_value(value.clone()).map_err(|e| {
        GeneratorError::Configuration(format!("Invalid schema for {}: {}", owner, e))
    })?;

    if let Some(keyword) = schema.extensions.keys().find(|key| !key.starts_with("x-")) {
        return Err(GeneratorError::Configuration(format!(
            "Invalid schema for {}: unknown keyword `{}`",
            owner, keyword
        )));
    }

    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonapi_openapi_common::openapi::RefOr;
    use jsonapi_openapi_common::ServerSettings;

    fn components() -> Components {
        let components = Components::new(&ServerSettings::new("v1"));
        components
            .schemas
            .add(DefaultSchema::Id.as_str(), Schema::typed("string"));
        components
    }

    fn strategy(pattern: &str) -> IdStrategy {
        IdStrategy {
            pattern: pattern.to_string(),
            ..IdStrategy::default()
        }
    }

    fn cases(values: &[&str]) -> Vec<EnumCase> {
        values
            .iter()
            .map(|value| EnumCase {
                value: json!(value),
                description: None,
            })
            .collect()
    }

    #[test]
    fn test_numeric_id_uses_default() {
        let components = components();
        let id = Id::make(&components, &IdStrategy::default(), true);
        assert_eq!(id, RefOr::Ref(components.schema_ref(DefaultSchema::Id)));
    }

    #[test]
    fn test_uuid_id_registered_once() {
        let components = components();
        let uuid = strategy("[\\da-f]{8}-[\\da-f]{4}-[\\da-f]{4}-[\\da-f]{4}-[\\da-f]{12}");

        let first = Id::make(&components, &uuid, true);
        let second = Id::make(&components, &uuid, true);
        assert_eq!(first, second);
        assert_eq!(
            components.schemas.get_item("Uuid").unwrap().format.as_deref(),
            Some("uuid")
        );

        let inline = Id::make(&components, &uuid, false);
        assert!(!inline.is_ref());
    }

    #[test]
    fn test_custom_pattern_id() {
        let components = components();
        let id = Id::make(&components, &strategy("[a-z]{3}-[0-9]+"), false);
        assert_eq!(
            serde_json::to_value(id).unwrap(),
            json!({"type": "string", "pattern": "[a-z]{3}-[0-9]+"})
        );
    }

    #[test]
    fn test_enum_registered_unless_filtered() {
        let components = components();
        let all = Enum::from_cases(&components, "Status", &cases(&["draft", "published"])).build();
        assert!(all.is_ref());

        let filtered = Enum::from_cases(&components, "Status", &cases(&["draft", "published"]))
            .filter(Some(&[json!("draft")][..]), None)
            .build();
        assert_eq!(
            serde_json::to_value(filtered).unwrap(),
            json!({"type": "string", "const": "draft"})
        );
    }

    #[test]
    fn test_nullable_enum_is_inline() {
        let components = components();
        let schema = Enum::from_cases(&components, "Status", &cases(&["a", "b"]))
            .nullable(true)
            .build();
        assert_eq!(
            serde_json::to_value(schema).unwrap(),
            json!({"type": ["string", "null"], "enum": ["a", "b", null], "example": "a"})
        );
        assert!(!components.schemas.has("Status"));

        let empty = Enum::from_cases(&components, "Empty", &[]).nullable(true).build();
        assert_eq!(serde_json::to_value(empty).unwrap(), json!({"type": "null"}));
    }

    #[test]
    fn test_link_with_meta() {
        let components = components();
        let plain = Link::make(&components, &ExampleLink::Href("http://x/a".into()));
        assert_eq!(
            serde_json::to_value(plain).unwrap(),
            json!({"type": "string", "format": "url", "example": "http://x/a"})
        );

        let mut meta = serde_json::Map::new();
        meta.insert("count".into(), json!(2));
        let with_meta = Link::make(
            &components,
            &ExampleLink::Object {
                href: "http://x/a".into(),
                meta: Some(meta),
            },
        );
        assert_eq!(
            serde_json::to_value(with_meta).unwrap(),
            json!({
                "allOf": [{"$ref": "#/components/schemas/JsonApi:linkObject"}],
                "example": {"href": "http://x/a", "meta": {"count": 2}}
            })
        );
    }

    #[test]
    fn test_literal_schema_rejects_unknown_keywords() {
        let schema = literal_schema(
            &json!({"type": "string", "format": "email", "x-internal": true}),
            "`email`",
        )
        .unwrap();
        assert_eq!(schema.format.as_deref(), Some("email"));

        let err = literal_schema(&json!({"type": "string", "maxLenght": 3}), "`name`")
            .unwrap_err();
        assert!(err.to_string().contains("unknown keyword `maxLenght`"));

        assert!(literal_schema(&json!("string"), "`name`").is_err());
    }
}
