//! Schema inference from validation rules and example values
//!
//! [`SchemaInferrer::compile`] turns the rules of one field into a JSON
//! Schema fragment. Rules are applied in declaration order and each one
//! refines the fragment built so far:
//!
//! - type tokens (`string`, `boolean`, `numeric`, `integer`, `uuid`, `date`)
//!   set the type and format, keeping a `null` member
//! - `nullable` adds `null` to the type union
//! - `array` looks at the nested keys to decide between a fixed shape
//!   object and a list
//! - `min:`, `max:`, `between:` and `size:` set value, item or length bounds
//! - `regex:`, `in:`, `url`, `email`, password and enum rules add
//!   patterns, formats and enumerations
//!
//! Unrecognised rules leave the fragment unchanged.

use crate::components::Components;
use crate::descriptors::Enum;
use crate::rules::{RuleMap, ValidationRules};
use indexmap::IndexMap;
use jsonapi_openapi_common::openapi::{AdditionalProperties, RefOr, Schema, SchemaOrRef};
use jsonapi_openapi_common::rules::RuleObject;
use jsonapi_openapi_common::{PasswordRule, Rule, RuleList};
use serde_json::{json, Map, Number, Value};

/// Which family of keywords a size rule maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    Value,
    Items,
    Length,
}

impl Bound {
    /// Decided by the first type rule of the field
    fn of(rules: &RuleList) -> Self {
        rules
            .iter()
            .find_map(|rule| match rule {
                Rule::Token(token) if token == "numeric" || token == "integer" => {
                    Some(Bound::Value)
                }
                Rule::Token(token) if token == "array" => Some(Bound::Items),
                Rule::Object(RuleObject::JsonNumber) => Some(Bound::Value),
                _ => None,
            })
            .unwrap_or(Bound::Length)
    }
}

/// Schema inference service shared by the schema builders of a build
pub struct SchemaInferrer<'c> {
    components: &'c Components,
}

impl<'c> SchemaInferrer<'c> {
    pub fn new(components: &'c Components) -> Self {
        Self { components }
    }

    /// Compile the rules of `key` into a schema
    ///
    /// `base` seeds the fragment; a reference base is ignored. Missing
    /// ancestors of dotted keys are synthesised before compiling.
    pub fn compile(&self, key: &str, rules: &RuleMap, base: Option<SchemaOrRef>) -> SchemaOrRef {
        let rules = ValidationRules::normalise(rules);
        self.compile_normalised(key, &rules, base)
    }

    fn compile_normalised(
        &self,
        key: &str,
        rules: &RuleMap,
        base: Option<SchemaOrRef>,
    ) -> SchemaOrRef {
        let mut schema = match base {
            Some(RefOr::Item(schema)) => *schema,
            _ => Schema::typed("string"),
        };

        let Some(field_rules) = rules.get(key) else {
            return schema.into();
        };
        let bound = Bound::of(field_rules);

        for rule in field_rules {
            match rule {
                Rule::Token(token) => self.apply_token(&mut schema, key, token, rules, bound),
                Rule::Object(object) => {
                    if let Some(reference) = self.apply_object(&mut schema, object, field_rules) {
                        return reference;
                    }
                }
            }
        }

        schema.into()
    }

    fn apply_token(&self, schema: &mut Schema, key: &str, token: &str, rules: &RuleMap, bound: Bound) {
        let (name, argument) = match token.split_once(':') {
            Some((name, argument)) => (name, Some(argument)),
            None => (token, None),
        };

        match (name, argument) {
            ("boolean" | "accepted" | "declined", _) => schema.set_type("boolean"),
            ("string", None) => schema.set_type("string"),
            ("nullable", None) => schema.make_nullable(),
            ("uuid", _) => {
                schema.set_type("string");
                schema.format = Some("uuid".to_string());
            }
            ("numeric", None) => schema.set_type("number"),
            ("integer", None) => schema.set_type("integer"),
            ("date", None) => {
                schema.set_type("string");
                schema.format = Some("date".to_string());
            }
            ("array", None) => self.apply_array(schema, key, rules),
            ("array", Some(properties)) => self.apply_array_shape(schema, key, properties, rules),
            ("min", Some(value)) => set_min(schema, bound, value),
            ("max", Some(value)) => set_max(schema, bound, value),
            ("size", Some(value)) => {
                set_min(schema, bound, value);
                set_max(schema, bound, value);
            }
            ("between", Some(range)) => {
                if let Some((min, max)) = range.split_once(',') {
                    set_min(schema, bound, min);
                    set_max(schema, bound, max);
                }
            }
            ("regex", Some(pattern)) => schema.pattern = Some(strip_delimiters(pattern)),
            ("in", Some(values)) => {
                let values = values
                    .split(',')
                    .map(|value| enum_value(schema, value.trim().trim_matches('"')))
                    .collect();
                schema.enum_values = Some(values);
            }
            _ if name.starts_with("url") => {
                schema.set_type("string");
                schema.format = Some("url".to_string());
            }
            _ if name.starts_with("email") => {
                schema.set_type("string");
                schema.format = Some("email".to_string());
            }
            _ => {}
        }
    }

    /// Returns the enumeration reference when the rule resolves to one
    fn apply_object(
        &self,
        schema: &mut Schema,
        object: &RuleObject,
        field_rules: &RuleList,
    ) -> Option<SchemaOrRef> {
        match object {
            RuleObject::Password(password) => {
                schema.set_type("string");
                schema.min_length = Some(password.min);
                schema.max_length = password.max;
                schema.pattern = Some(password_pattern(password));
            }
            RuleObject::Enum {
                name,
                cases,
                only,
                except,
            } => {
                let built = Enum::from_cases(self.components, name, cases)
                    .filter(only.as_deref(), except.as_deref())
                    .nullable(field_rules.contains("nullable"))
                    .build();
                match built {
                    RefOr::Item(inline) => *schema = *inline,
                    reference => return Some(reference),
                }
            }
            RuleObject::In { values } => schema.enum_values = Some(values.clone()),
            RuleObject::DateTimeIso8601 => {
                schema.set_type("string");
                schema.format = Some("date-time".to_string());
            }
            RuleObject::JsonBoolean => schema.set_type("boolean"),
            RuleObject::JsonNumber => schema.set_type("number"),
            _ => {}
        }
        None
    }

    fn apply_array(&self, schema: &mut Schema, key: &str, rules: &RuleMap) {
        let prefix = format!("{}.", key);
        let list_key = format!("{}.*", key);
        let children: Vec<&String> = rules.keys().filter(|k| k.starts_with(&prefix)).collect();

        if children.is_empty() {
            schema.set_type("object");
            return;
        }

        // A wildcard anywhere below the key makes it a list
        let is_list = children.iter().any(|child| child.contains(".*"));

        if !is_list {
            schema.set_type("object");
            self.fill_object(schema, key, &prefix, rules);
            return;
        }

        schema.set_type("array");
        let items = match rules.get(&list_key) {
            Some(item_rules) if !item_rules.contains("array") => {
                self.compile_normalised(&list_key, rules, None)
            }
            _ => {
                let mut item = Schema::typed("object");
                self.fill_object(&mut item, key, &format!("{}.", list_key), rules);
                item.into()
            }
        };
        schema.items = Some(Box::new(items));
    }

    /// Properties of the keys directly under `prefix`, closed to others
    ///
    /// A property is required when its rules hold `required` or
    /// `required_with:{key}`.
    fn fill_object(&self, schema: &mut Schema, key: &str, prefix: &str, rules: &RuleMap) {
        let properties: Vec<&str> = rules
            .keys()
            .filter_map(|child| child.strip_prefix(prefix))
            .filter(|rest| !rest.is_empty() && !rest.contains('.'))
            .collect();
        self.fill_properties(schema, key, prefix, &properties, rules);
    }

    fn fill_properties(
        &self,
        schema: &mut Schema,
        key: &str,
        prefix: &str,
        properties: &[&str],
        rules: &RuleMap,
    ) {
        let required_with = format!("required_with:{}", key);
        let mut compiled = IndexMap::new();
        let mut required = Vec::new();
        for property in properties {
            let child_key = format!("{}{}", prefix, property);
            if rules.get(&child_key).is_some_and(|child_rules| {
                child_rules.contains("required") || child_rules.contains(&required_with)
            }) {
                required.push(property.to_string());
            }
            compiled.insert(
                property.to_string(),
                self.compile_normalised(&child_key, rules, None),
            );
        }

        schema.properties = Some(compiled);
        schema.required = (!required.is_empty()).then_some(required);
        schema.additional_properties = Some(AdditionalProperties::Allowed(false));
    }

    fn apply_array_shape(&self, schema: &mut Schema, key: &str, properties: &str, rules: &RuleMap) {
        schema.set_type("object");

        let properties: Vec<&str> = properties
            .split(',')
            .map(str::trim)
            .filter(|property| !property.is_empty())
            .collect();
        self.fill_properties(schema, key, &format!("{}.", key), &properties, rules);
    }

    /// Schema describing an example value
    ///
    /// # Examples
    /// ```
    /// use jsonapi_openapi_common::ServerSettings;
    /// use jsonapi_openapi_generator::components::Components;
    /// use jsonapi_openapi_generator::inference::SchemaInferrer;
    /// use serde_json::json;
    ///
    /// let components = Components::new(&ServerSettings::new("v1"));
    /// let inferrer = SchemaInferrer::new(&components);
    /// let schema = inferrer.infer_from_value(&json!(["a", "b"]));
    /// assert_eq!(
    ///     serde_json::to_value(schema).unwrap(),
    ///     json!({"type": "array", "items": {"type": "string", "example": "a"}, "example": ["a", "b"]})
    /// );
    /// ```
    pub fn infer_from_value(&self, value: &Value) -> Schema {
        match value {
            Value::Null => {
                let mut schema = Schema::typed("string");
                schema.make_nullable();
                schema
            }
            Value::Bool(_) => Schema::typed("boolean").with_example(value.clone()),
            Value::Number(_) => Schema::typed("number").with_example(value.clone()),
            Value::String(_) => Schema::typed("string").with_example(value.clone()),
            Value::Array(items) => self.to_array_schema(items),
            Value::Object(map) => self.to_object_schema(map, false),
        }
    }

    /// `{type: array}` with the item schema inferred from the first element
    pub fn to_array_schema(&self, items: &[Value]) -> Schema {
        let first = items.first().unwrap_or(&Value::Null);
        Schema::array(self.infer_from_value(first)).with_example(Value::Array(items.to_vec()))
    }

    /// `{type: object}` with every member inferred
    pub fn to_object_schema(&self, map: &Map<String, Value>, additional_properties: bool) -> Schema {
        let properties = map
            .iter()
            .map(|(key, value)| (key.clone(), self.infer_from_value(value).into()))
            .collect();

        Schema::object(properties)
            .with_example(Value::Object(map.clone()))
            .with_additional_properties(additional_properties)
    }
}

fn bound_number(value: &str) -> Option<Number> {
    let value = value.trim();
    if let Ok(integer) = value.parse::<i64>() {
        return Some(Number::from(integer));
    }
    value.parse::<f64>().ok().and_then(Number::from_f64)
}

fn bound_count(value: &str) -> Option<u64> {
    let value = value.trim();
    value.parse::<u64>().ok().or_else(|| {
        value
            .parse::<f64>()
            .ok()
            .filter(|count| *count >= 0.0)
            .map(|count| count as u64)
    })
}

fn set_min(schema: &mut Schema, bound: Bound, value: &str) {
    match bound {
        Bound::Value => schema.minimum = bound_number(value),
        Bound::Items => schema.min_items = bound_count(value),
        Bound::Length => schema.min_length = bound_count(value),
    }
}

fn set_max(schema: &mut Schema, bound: Bound, value: &str) {
    match bound {
        Bound::Value => schema.maximum = bound_number(value),
        Bound::Items => schema.max_items = bound_count(value),
        Bound::Length => schema.max_length = bound_count(value),
    }
}

/// Typed member of an `in:` list
fn enum_value(schema: &Schema, value: &str) -> Value {
    if schema.has_type("integer") || schema.has_type("number") {
        if let Some(number) = bound_number(value) {
            return Value::Number(number);
        }
    }
    json!(value)
}

/// Strip PCRE delimiters and trailing flags (`/^a+$/i` gives `^a+$`)
fn strip_delimiters(pattern: &str) -> String {
    let Some(delimiter) = pattern.chars().next() else {
        return String::new();
    };
    if delimiter.is_alphanumeric() || delimiter == '_' || delimiter.is_whitespace() {
        return pattern.to_string();
    }

    let body = &pattern[delimiter.len_utf8()..];
    match body.rfind(delimiter) {
        Some(end)
            if body[end + delimiter.len_utf8()..]
                .chars()
                .all(|flag| flag.is_ascii_lowercase()) =>
        {
            body[..end].to_string()
        }
        _ => pattern.to_string(),
    }
}

fn password_pattern(password: &PasswordRule) -> String {
    let mut pattern = String::from("^");
    if password.mixed_case {
        pattern.push_str(r"(?=(.*\p{Ll}+.*\p{Lu}.*)|(.*\p{Lu}+.*\p{Ll}.*))");
    }
    if password.letters {
        pattern.push_str(r"(?=.*\pL.*)");
    }
    if password.symbols {
        pattern.push_str(r"(?=.*(\p{Z}|\p{S}|\p{P}).*)");
    }
    if password.numbers {
        pattern.push_str(r"(?=.*\pN.*)");
    }
    match password.max {
        Some(max) => pattern.push_str(&format!(".{{{},{}}}$", password.min, max)),
        None => pattern.push_str(&format!(".{{{},}}$", password.min)),
    }
    pattern
}
