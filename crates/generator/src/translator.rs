//! Translation lookup with fallback chains
//!
//! Descriptions and titles are looked up in the application's lines first and
//! fall back to the package defaults. Resource keys search the server and
//! resource-type specific keys before the generic ones.

use indexmap::IndexMap;
use jsonapi_openapi_common::inflector::{singular, ucfirst};
use jsonapi_openapi_common::{ServerSettings, TranslationSource, PACKAGE_NAMESPACE};
use serde_json::Value;

/// Placeholder values keyed by placeholder name (without the colon)
pub type Replacements = IndexMap<String, String>;

/// Build a replacement map from pairs
pub fn replacements<K, V, I>(pairs: I) -> Replacements
where
    K: Into<String>,
    V: Into<String>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .collect()
}

/// Replace `:key`, `:Key` and `:KEY` placeholders
///
/// Placeholders are matched longest first and replaced values are never
/// scanned again.
///
/// # Examples
/// ```
/// use jsonapi_openapi_generator::translator::{replace_placeholders, replacements};
///
/// let values = replacements([("resource-type", "articles"), ("resource-type-singular", "article")]);
/// assert_eq!(
///     replace_placeholders("One :Resource-type-singular of :RESOURCE-TYPE", &values),
///     "One Article of ARTICLES"
/// );
/// ```
pub fn replace_placeholders(line: &str, replacements: &Replacements) -> String {
    if replacements.is_empty() || !line.contains(':') {
        return line.to_string();
    }

    let mut patterns: Vec<(String, String)> = Vec::with_capacity(replacements.len() * 3);
    for (key, value) in replacements {
        patterns.push((format!(":{}", ucfirst(key)), ucfirst(value)));
        patterns.push((format!(":{}", key.to_uppercase()), value.to_uppercase()));
        patterns.push((format!(":{}", key), value.clone()));
    }
    patterns.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

    let mut output = String::with_capacity(line.len());
    let mut rest = line;
    while let Some(position) = rest.find(':') {
        output.push_str(&rest[..position]);
        let candidate = &rest[position..];
        match patterns
            .iter()
            .find(|(pattern, _)| candidate.starts_with(pattern.as_str()))
        {
            Some((pattern, value)) => {
                output.push_str(value);
                rest = &candidate[pattern.len()..];
            }
            None => {
                output.push(':');
                rest = &candidate[1..];
            }
        }
    }
    output.push_str(rest);
    output
}

/// Apply placeholder replacement to every string leaf of a structured line
pub fn replace_in_value(value: Value, replacements: &Replacements) -> Value {
    match value {
        Value::String(line) => Value::String(replace_placeholders(&line, replacements)),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| replace_in_value(item, replacements))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, item)| (key, replace_in_value(item, replacements)))
                .collect(),
        ),
        other => other,
    }
}

/// Translation service shared by every component of a build
pub struct Translator<'a> {
    source: &'a dyn TranslationSource,
    server: String,
    base: Replacements,
}

impl<'a> Translator<'a> {
    pub fn new(source: &'a dyn TranslationSource, settings: &ServerSettings) -> Self {
        let base = replacements([
            ("server", settings.name.clone()),
            ("app", settings.app_name.clone().unwrap_or_default()),
            ("jsonapi-version", settings.jsonapi_version.clone()),
        ]);

        Self {
            source,
            server: settings.name.clone(),
            base,
        }
    }

    /// Replacements available to every line
    pub fn base_replacements(&self) -> &Replacements {
        &self.base
    }

    /// Base replacements plus the resource type in plural and singular form
    pub fn resource_replacements(&self, resource_type: &str) -> Replacements {
        let mut replacements = self.base.clone();
        replacements.insert("resource-type".to_string(), resource_type.to_string());
        replacements.insert(
            "resource-type-singular".to_string(),
            singular(resource_type),
        );
        replacements
    }

    /// Translate a package level key, falling back to the key itself
    pub fn translate(&self, key: &str) -> String {
        self.translate_with(key, &Replacements::new(), None)
    }

    /// Translate a package level key with extra replacements and a default
    pub fn translate_with(
        &self,
        key: &str,
        extra: &Replacements,
        default: Option<String>,
    ) -> String {
        let mut replacements = self.base.clone();
        replacements.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));

        self.find_line(&self.global_keys(key), &replacements)
            .or(default)
            .unwrap_or_else(|| key.to_string())
    }

    /// Translate a structured line (e.g. a response example)
    ///
    /// Replacements apply to every string leaf. A missing line yields the key.
    pub fn translate_value(&self, key: &str) -> Value {
        self.global_keys(key)
            .iter()
            .find_map(|candidate| self.source.line(candidate))
            .map(|line| replace_in_value(line, &self.base))
            .unwrap_or_else(|| Value::String(key.to_string()))
    }

    /// Translate a resource key through the resource fallback chain
    ///
    /// `replacements` is the complete replacement set, normally built from
    /// [`Translator::resource_replacements`].
    pub fn for_resource(
        &self,
        key: &str,
        resource_type: &str,
        replacements: &Replacements,
        default: Option<String>,
    ) -> Option<String> {
        let keys = [
            format!("{}.resources.{}.{}", self.server, resource_type, key),
            format!("{}.resource.{}", self.server, key),
            format!("jsonapi.resources.{}.{}", resource_type, key),
            format!("jsonapi.resource.{}", key),
            format!("{}::resource.{}", PACKAGE_NAMESPACE, key),
        ];

        self.find_line(&keys, replacements).or(default)
    }

    fn global_keys(&self, key: &str) -> [String; 3] {
        [
            format!("jsonapi.{}.{}", self.server, key),
            format!("jsonapi.{}", key),
            format!("{}::{}", PACKAGE_NAMESPACE, key),
        ]
    }

    fn find_line(&self, keys: &[String], replacements: &Replacements) -> Option<String> {
        keys.iter().find_map(|key| match self.source.line(key) {
            Some(Value::String(line)) => Some(replace_placeholders(&line, replacements)),
            _ => None,
        })
    }
}
