//! Example response documents
//!
//! When a route declares no response examples, one is synthesised from the
//! example resources of the build, shaped the way the server would render it.

use crate::pagination::ExamplePage;
use crate::route::RouteDescriptor;
use indexmap::IndexMap;
use jsonapi_openapi_common::openapi::{Example, MediaType, RefOr, SchemaOrRef};
use jsonapi_openapi_common::{ExampleRelationship, ExampleResource};
use serde_json::{json, Map, Value};

/// Body of a response or request for one media type
///
/// A single example is inlined as `example`, several become named
/// `examples`.
pub fn media_type(schema: SchemaOrRef, examples: IndexMap<String, Value>) -> MediaType {
    let mut media = MediaType {
        schema: Some(schema),
        ..Default::default()
    };

    match examples.len() {
        0 => {}
        1 => media.example = examples.into_values().next(),
        _ => media.examples = Some(named_examples(examples)),
    }

    media
}

/// Named examples, each wrapped in an example object
pub fn named_examples(examples: IndexMap<String, Value>) -> IndexMap<String, RefOr<Example>> {
    examples
        .into_iter()
        .map(|(name, value)| {
            (
                name,
                RefOr::item(Example {
                    summary: None,
                    description: None,
                    value: Some(value),
                }),
            )
        })
        .collect()
}

/// Renders example resources as JSON:API documents for one route
pub struct ExampleDocuments<'r, 'a> {
    route: &'r RouteDescriptor<'a>,
}

impl<'r, 'a> ExampleDocuments<'r, 'a> {
    pub fn new(route: &'r RouteDescriptor<'a>) -> Self {
        Self { route }
    }

    /// Document holding one resource
    pub fn one(&self, resource: &ExampleResource) -> Value {
        self.document(resource.to_value(), Map::new(), None)
    }

    /// Document holding a collection of resources
    pub fn many(&self, resources: &[ExampleResource]) -> Value {
        let data = resources.iter().map(ExampleResource::to_value).collect();
        self.document(Value::Array(data), Map::new(), None)
    }

    /// Document holding one page of resources
    pub fn page(&self, page: &ExamplePage) -> Value {
        let data = page.resources.iter().map(ExampleResource::to_value).collect();
        self.document(
            Value::Array(data),
            page.links.clone(),
            Some(page.meta.clone()).filter(|meta| !meta.is_empty()),
        )
    }

    /// Related resource(s) of a parent's relation
    ///
    /// `identifiers` renders resource identifiers instead of resource
    /// objects, as relationship routes do.
    pub fn related(
        &self,
        parent: &ExampleResource,
        data: RelatedData<'_>,
        identifiers: bool,
    ) -> Value {
        let render = |resource: &ExampleResource| {
            if identifiers {
                resource.identifier()
            } else {
                resource.to_value()
            }
        };

        let (data, mut links, mut meta) = match data {
            RelatedData::One(resource) => (
                render(resource),
                Map::new(),
                Map::new(),
            ),
            RelatedData::Many(resources) => (
                Value::Array(resources.iter().map(render).collect()),
                Map::new(),
                Map::new(),
            ),
            RelatedData::Page(page) => (
                Value::Array(page.resources.iter().map(render).collect()),
                page.links.clone(),
                page.meta.clone(),
            ),
        };

        if let Some(relationship) = self.parent_relationship(parent) {
            for (key, link) in &relationship.links {
                links.insert(key.clone(), link_value(link.href(), link.meta()));
            }
            if let Some(relationship_meta) = &relationship.meta {
                meta.extend(relationship_meta.clone());
            }
        }

        self.document(data, links, Some(meta).filter(|meta| !meta.is_empty()))
    }

    /// The example relationship of the parent the route's relation names
    pub fn parent_relationship<'p>(
        &self,
        parent: &'p ExampleResource,
    ) -> Option<&'p ExampleRelationship> {
        let relation = self.route.relation()?;
        parent
            .relationships
            .get(relation.serialized_name())
            .or_else(|| parent.relationships.get(&relation.name))
    }

    fn document(
        &self,
        data: Value,
        links: Map<String, Value>,
        meta: Option<Map<String, Value>>,
    ) -> Value {
        let mut document = Map::new();
        document.insert(
            "jsonapi".to_string(),
            json!({ "version": self.route.context().settings().jsonapi_version }),
        );

        let mut all_links = Map::new();
        all_links.insert("self".to_string(), json!(self.route.url()));
        for (key, link) in links {
            all_links.entry(key).or_insert(link);
        }
        document.insert("links".to_string(), Value::Object(all_links));

        if let Some(meta) = meta {
            document.insert("meta".to_string(), Value::Object(meta));
        }
        document.insert("data".to_string(), data);

        Value::Object(document)
    }
}

/// Primary data of a related or relationship document
pub enum RelatedData<'d> {
    One(&'d ExampleResource),
    Many(&'d [ExampleResource]),
    Page(&'d ExamplePage),
}

fn link_value(href: &str, meta: Option<&Map<String, Value>>) -> Value {
    match meta {
        Some(meta) if !meta.is_empty() => json!({ "href": href, "meta": meta }),
        _ => json!(href),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonapi_openapi_common::openapi::Schema;

    #[test]
    fn test_media_type_inlines_a_single_example() {
        let mut examples = IndexMap::new();
        examples.insert("first".to_string(), json!({"data": []}));

        let media = media_type(Schema::typed("object").into(), examples);
        assert_eq!(media.example, Some(json!({"data": []})));
        assert!(media.examples.is_none());
    }

    #[test]
    fn test_media_type_names_several_examples() {
        let mut examples = IndexMap::new();
        examples.insert("first".to_string(), json!(1));
        examples.insert("second".to_string(), json!(2));

        let media = media_type(Schema::typed("object").into(), examples);
        assert!(media.example.is_none());
        let named = media.examples.unwrap();
        assert_eq!(named.keys().collect::<Vec<_>>(), vec!["first", "second"]);
        assert_eq!(named["second"].as_item().unwrap().value, Some(json!(2)));
    }

    #[test]
    fn test_link_value() {
        assert_eq!(link_value("http://x", None), json!("http://x"));
        let mut meta = Map::new();
        meta.insert("count".to_string(), json!(2));
        assert_eq!(
            link_value("http://x", Some(&meta)),
            json!({"href": "http://x", "meta": {"count": 2}})
        );
    }
}
