//! Document tags
//!
//! Every resource type gets one tag grouping its operations and schemas.
//! Resource schemas additionally carry the shared `jsonapi-resource` tag.

use crate::translator::{replacements, Translator};
use indexmap::IndexMap;
use jsonapi_openapi_common::inflector::{camel, ucfirst};
use jsonapi_openapi_common::openapi::Tag;
use std::cell::RefCell;

/// Tag shared by every resource object schema
pub const RESOURCE_SCHEMA_TAG: &str = "jsonapi-resource";

/// Tags collected during a build, keyed by resolved name
#[derive(Debug, Default)]
pub struct Tags {
    tags: RefCell<IndexMap<String, Tag>>,
}

impl Tags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag of a resource type, registered on first use
    ///
    /// The name is the resource's `tag.name` line or the studly cased type.
    pub fn add_resource_type(&self, translator: &Translator<'_>, resource_type: &str) -> String {
        let fallback = ucfirst(&camel(resource_type));
        let name = translator
            .for_resource(
                "tag.name",
                resource_type,
                &translator.resource_replacements(resource_type),
                Some(fallback),
            )
            .unwrap_or_default();

        if self.tags.borrow().contains_key(&name) {
            return name;
        }

        let mut with_name = translator.resource_replacements(resource_type);
        with_name.insert("name".to_string(), name.clone());
        let description = translator.for_resource(
            "tag.description",
            resource_type,
            &with_name,
            Some(translator.translate_with(
                "tags.description",
                &replacements([("name", name.as_str())]),
                None,
            )),
        );

        self.insert(&name, description);
        name
    }

    /// Tag with a package or application defined name and description
    pub fn add(&self, translator: &Translator<'_>, name: &str) -> String {
        let with_name = replacements([("name", name)]);
        let resolved = translator.translate_with(
            &format!("tags.{}.name", name),
            &with_name,
            Some(name.to_string()),
        );

        if self.tags.borrow().contains_key(&resolved) {
            return resolved;
        }

        let with_resolved = replacements([("name", resolved.as_str())]);
        let description = translator.translate_with(
            &format!("tags.{}.description", name),
            &with_resolved,
            Some(translator.translate_with("tags.description", &with_resolved, None)),
        );

        self.insert(&resolved, Some(description));
        resolved
    }

    fn insert(&self, name: &str, description: Option<String>) {
        self.tags.borrow_mut().insert(
            name.to_string(),
            Tag {
                name: name.to_string(),
                description,
            },
        );
    }

    /// Every tag, sorted by name
    pub fn build(&self) -> Vec<Tag> {
        let mut tags: Vec<Tag> = self.tags.borrow().values().cloned().collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        tags
    }
}
