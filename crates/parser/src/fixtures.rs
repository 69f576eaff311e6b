//! Fixture-backed example resource factory
//!
//! Example resources come from records declared in the manifest. The
//! factory hands each record out once per sandbox; rolling the sandbox back
//! returns every record to the pool.
//!
//! Records are completed against the declared resource schema: attributes
//! missing from a record serialize as `null` and every declared relation
//! carries its links.

use indexmap::IndexMap;
use jsonapi_openapi_common::{
    ExampleLink, ExampleRelationship, ExampleResource, GeneratorError, ResourceFactory,
    ResourceSchema, Result,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use tracing::debug;

/// Example record of one resource
#[derive(Debug, Clone, Deserialize)]
pub struct FixtureRecord {
    /// Identifier, either a string or a number
    pub id: Value,

    #[serde(default)]
    pub attributes: Map<String, Value>,

    #[serde(default)]
    pub relationships: IndexMap<String, FixtureRelationship>,

    #[serde(default)]
    pub meta: Option<Map<String, Value>>,
}

/// Relationship of an example record
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FixtureRelationship {
    #[serde(default)]
    pub data: Option<Value>,

    #[serde(default)]
    pub meta: Option<Map<String, Value>>,
}

/// Resource factory backed by manifest fixtures
#[derive(Debug)]
pub struct FixtureFactory {
    base_url: String,
    records: IndexMap<String, Vec<FixtureRecord>>,
    schemas: IndexMap<String, ResourceSchema>,
    handed_out: RefCell<HashMap<String, usize>>,
    open: Cell<bool>,
}

impl FixtureFactory {
    pub fn new(base_url: &str, records: IndexMap<String, Vec<FixtureRecord>>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            records,
            schemas: IndexMap::new(),
            handed_out: RefCell::new(HashMap::new()),
            open: Cell::new(false),
        }
    }

    /// Complete records against these resource schemas
    pub fn with_schemas<I>(mut self, schemas: I) -> Self
    where
        I: IntoIterator<Item = ResourceSchema>,
    {
        self.schemas = schemas
            .into_iter()
            .map(|schema| (schema.resource_type.clone(), schema))
            .collect();
        self
    }

    /// Number of records of a type currently handed out
    pub fn handed_out(&self, resource_type: &str) -> usize {
        self.handed_out
            .borrow()
            .get(resource_type)
            .copied()
            .unwrap_or(0)
    }

    fn materialize(&self, resource_type: &str, record: &FixtureRecord) -> ExampleResource {
        let id = match &record.id {
            Value::String(id) => id.clone(),
            other => other.to_string(),
        };
        let self_url = format!("{}/{}/{}", self.base_url, resource_type, id);

        let relationship = |name: &str, fixture: Option<&FixtureRelationship>| {
            let mut links = IndexMap::new();
            links.insert(
                "self".to_string(),
                ExampleLink::Href(format!("{}/relationships/{}", self_url, name)),
            );
            links.insert(
                "related".to_string(),
                ExampleLink::Href(format!("{}/{}", self_url, name)),
            );
            ExampleRelationship {
                links,
                data: fixture.and_then(|fixture| fixture.data.clone()),
                meta: fixture.and_then(|fixture| fixture.meta.clone()),
            }
        };

        let mut attributes = Map::new();
        let mut relationships = IndexMap::new();
        if let Some(schema) = self.schemas.get(resource_type) {
            for field in &schema.attributes {
                let key = field.serialized_name();
                let value = record
                    .attributes
                    .get(key)
                    .or_else(|| record.attributes.get(&field.name))
                    .cloned()
                    .unwrap_or(Value::Null);
                attributes.insert(key.to_string(), value);
            }
            for relation in &schema.relationships {
                let key = relation.serialized_name();
                let fixture = record
                    .relationships
                    .get(key)
                    .or_else(|| record.relationships.get(&relation.name));
                relationships.insert(key.to_string(), relationship(key, fixture));
            }
        }

        for (key, value) in &record.attributes {
            let declared = self.schemas.get(resource_type).is_some_and(|schema| {
                schema.attribute(key).is_some()
                    || schema.attributes.iter().any(|field| field.name == *key)
            });
            if !declared && !attributes.contains_key(key) {
                attributes.insert(key.clone(), value.clone());
            }
        }
        for (name, fixture) in &record.relationships {
            let declared = self.schemas.get(resource_type).is_some_and(|schema| {
                schema.relationship_by_serialized(name).is_some()
                    || schema.relationship(name).is_some()
            });
            if !declared && !relationships.contains_key(name) {
                relationships.insert(name.clone(), relationship(name, Some(fixture)));
            }
        }

        let mut links = IndexMap::new();
        links.insert("self".to_string(), ExampleLink::Href(self_url));

        ExampleResource {
            id,
            resource_type: resource_type.to_string(),
            attributes,
            relationships,
            links,
            meta: record.meta.clone(),
        }
    }
}

impl ResourceFactory for FixtureFactory {
    fn begin(&self) -> Result<()> {
        self.open.set(true);
        Ok(())
    }

    fn create(&self, resource_type: &str, count: usize) -> Result<Vec<ExampleResource>> {
        if !self.open.get() {
            return Err(GeneratorError::Factory(
                "Example resources can only be created inside a sandbox".to_string(),
            ));
        }

        let records = self
            .records
            .get(resource_type)
            .filter(|records| !records.is_empty())
            .ok_or_else(|| {
                GeneratorError::Factory(format!("No fixtures declared for '{}'", resource_type))
            })?;

        let mut handed_out = self.handed_out.borrow_mut();
        let offset = handed_out.entry(resource_type.to_string()).or_insert(0);
        let created: Vec<ExampleResource> = records
            .iter()
            .skip(*offset)
            .take(count)
            .map(|record| self.materialize(resource_type, record))
            .collect();
        *offset += created.len();

        debug!(
            resource_type,
            requested = count,
            created = created.len(),
            "Created example resources"
        );

        Ok(created)
    }

    fn rollback(&self) {
        self.handed_out.borrow_mut().clear();
        self.open.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn factory() -> FixtureFactory {
        let records: IndexMap<String, Vec<FixtureRecord>> = serde_yaml::from_str(
            r#"
articles:
  - id: 1
    attributes: { title: "Hello" }
    relationships:
      comments:
        data: [{ type: comments, id: "7" }]
  - id: "2"
    attributes: { title: "World" }
"#,
        )
        .unwrap();
        FixtureFactory::new("https://example.com/api/v1/", records)
    }

    #[test]
    fn test_create_requires_sandbox() {
        let factory = factory();
        assert!(matches!(
            factory.create("articles", 1),
            Err(GeneratorError::Factory(_))
        ));
    }

    #[test]
    fn test_materializes_links() {
        let factory = factory();
        factory.begin().unwrap();
        let created = factory.create("articles", 1).unwrap();

        assert_eq!(created.len(), 1);
        let article = &created[0];
        assert_eq!(article.id, "1");
        assert_eq!(
            article.links["self"].href(),
            "https://example.com/api/v1/articles/1"
        );
        let comments = &article.relationships["comments"];
        assert_eq!(
            comments.links["related"].href(),
            "https://example.com/api/v1/articles/1/comments"
        );
        assert_eq!(comments.data, Some(json!([{"type": "comments", "id": "7"}])));
    }

    #[test]
    fn test_pool_exhausts_and_rollback_restores() {
        let factory = factory();
        factory.begin().unwrap();
        assert_eq!(factory.create("articles", 5).unwrap().len(), 2);
        assert!(factory.create("articles", 1).unwrap().is_empty());
        assert_eq!(factory.handed_out("articles"), 2);

        factory.rollback();
        assert_eq!(factory.handed_out("articles"), 0);
        factory.begin().unwrap();
        assert_eq!(factory.create("articles", 1).unwrap()[0].id, "1");
    }

    #[test]
    fn test_records_complete_against_schema() {
        let schema: ResourceSchema = serde_yaml::from_str(
            r#"
type: articles
attributes:
  - name: title
  - name: published_at
    serialized_name: publishedAt
relationships:
  - name: comments
    cardinality: to_many
    inverse: comments
  - name: author
    cardinality: to_one
    inverse: users
"#,
        )
        .unwrap();
        let factory = factory().with_schemas([schema]);
        factory.begin().unwrap();
        let created = factory.create("articles", 2).unwrap();

        let second = &created[1];
        let keys: Vec<&str> = second.attributes.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["title", "publishedAt"]);
        assert_eq!(second.attributes["publishedAt"], Value::Null);

        let relations: Vec<&str> = second.relationships.keys().map(String::as_str).collect();
        assert_eq!(relations, vec!["comments", "author"]);
        assert_eq!(second.relationships["author"].data, None);
        assert_eq!(
            second.relationships["author"].links["self"].href(),
            "https://example.com/api/v1/articles/2/relationships/author"
        );

        assert_eq!(
            created[0].relationships["comments"].data,
            Some(json!([{"type": "comments", "id": "7"}]))
        );
    }

    #[test]
    fn test_missing_fixtures_is_factory_error() {
        let factory = factory();
        factory.begin().unwrap();
        assert!(matches!(
            factory.create("comments", 1),
            Err(GeneratorError::Factory(_))
        ));
    }
}
