//! Resource schema synthesis
//!
//! Builds the resource object schema of a type from its field declarations
//! and one example resource, plus the documents wrapping it: the single and
//! collection documents of fetch routes and the store/update documents of
//! write routes. Named schemas go through the component registry, so every
//! type is emitted once however many routes reference it.

use crate::components::DefaultSchema;
use crate::descriptors::{literal_schema, Enum, Id, Link};
use crate::route::{relation_replacements, RouteDescriptor};
use crate::rules::{RuleMap, ValidationRules};
use crate::tags::RESOURCE_SCHEMA_TAG;
use crate::translator::{replacements, Replacements};
use chrono::{DateTime, NaiveDate, SecondsFormat};
use indexmap::IndexMap;
use jsonapi_openapi_common::inflector::{camel, singular, ucfirst};
use jsonapi_openapi_common::openapi::{RefOr, Schema, SchemaOrRef, SchemaType};
use jsonapi_openapi_common::{
    AttributeField, ExampleRelationship, ExampleResource, FieldKind, GeneratorError, QueryKind,
    RelationField, ResourceSchema, Result, SimulatedRequest,
};
use serde_json::{json, Map, Value};
use std::collections::BTreeSet;
use tracing::warn;

/// Component name of a resource type's schema (`blog-posts` → `BlogPost`)
pub fn resource_schema_name(resource_type: &str) -> String {
    ucfirst(&camel(&singular(resource_type)))
}

/// Builds resource schemas in the context of one route
pub struct ResourceSchemaFactory<'r, 'a> {
    route: &'r RouteDescriptor<'a>,
}

impl<'r, 'a> ResourceSchemaFactory<'r, 'a> {
    pub fn new(route: &'r RouteDescriptor<'a>) -> Self {
        Self { route }
    }

    /// Request document of a create route
    pub fn store_document(&self, resource_type: &str) -> Result<Schema> {
        let data = self.store_data(resource_type)?;
        Ok(self.write_document("data.store", resource_type, data))
    }

    /// Request document of an update route
    pub fn update_document(&self, resource_type: &str) -> Result<Schema> {
        let data = self.update_data(resource_type)?;
        Ok(self.write_document("data.update", resource_type, data))
    }

    /// Document holding one resource
    pub fn one_document(&self, resource_type: &str) -> Result<Schema> {
        let components = self.route.context().components();

        let mut document = self.titled("data.one", resource_type);
        document.insert_property("data", self.resource(resource_type)?);
        if let Some(included) = self.included()? {
            document.insert_property("included", included);
        }
        document.insert_property("links", self.resource_links(resource_type));
        document.insert_property("meta", components.schema(DefaultSchema::Meta));
        document.insert_property("jsonapi", components.schema(DefaultSchema::JsonApi));

        Ok(document)
    }

    /// Document holding a collection of resources
    pub fn many_document(&self, resource_type: &str) -> Result<Schema> {
        let components = self.route.context().components();
        let paginator = self.route.paginator();

        let mut document = self.titled("data.many", resource_type);
        document.insert_property(
            "data",
            Schema {
                unique_items: Some(true),
                ..Schema::array(self.resource(resource_type)?)
            },
        );
        if let Some(included) = self.included()? {
            document.insert_property("included", included);
        }

        let links: SchemaOrRef = match &paginator {
            Some(paginator) => paginator.links(self.route).into(),
            None => components.schema(DefaultSchema::Links),
        };
        document.insert_property("links", self.with_self_link(links));

        let meta: SchemaOrRef = match &paginator {
            Some(paginator) => paginator.meta(self.route).into(),
            None => components.schema(DefaultSchema::Meta),
        };
        document.insert_property("meta", meta);
        document.insert_property("jsonapi", components.schema(DefaultSchema::JsonApi));

        Ok(document)
    }

    /// Reference to the resource object schema of a type
    pub fn resource(&self, resource_type: &str) -> Result<SchemaOrRef> {
        let ctx = self.route.context();
        let name = resource_schema_name(resource_type);
        if let Some(existing) = ctx.components().schemas.get(&name, true) {
            return Ok(existing);
        }

        let schema = self.schema_for(resource_type)?;
        let resource = ctx.resources().single(resource_type);
        if resource.is_none() {
            warn!(
                resource_type,
                "Unable to generate an example resource, attributes may be missing or inaccurate"
            );
        }

        let schema_tag = ctx.tag(RESOURCE_SCHEMA_TAG);
        let resource_tag = ctx.resource_tag(resource_type);

        let relationships = self.relationships(schema, resource.as_ref());
        let attributes = self.attributes(schema, resource.as_ref())?;

        let mut required = vec!["id".to_string(), "type".to_string()];
        if attributes.is_some() {
            required.push("attributes".to_string());
        }
        if relationships.is_some() {
            required.push("relationships".to_string());
        }

        let mut object = Schema {
            title: self.translate("schema.title", resource_type),
            ..Schema::object(IndexMap::new())
        }
        .with_extension("x-tags", json!([resource_tag, schema_tag]));
        object.insert_property("id", Id::make(ctx.components(), &schema.id, true));
        object.insert_property("type", self.type_schema(resource_type));
        if let Some(attributes) = attributes {
            object.insert_property("attributes", attributes);
        }
        if let Some(relationships) = relationships {
            object.insert_property("relationships", relationships);
        }
        object.insert_property("links", self.resource_links(resource_type));
        object.insert_property("meta", self.resource_meta(resource_type, resource.as_ref()));

        Ok(ctx
            .components()
            .schemas
            .add(&name, object.with_required(required))
            .into())
    }

    /// Reference to the `{id, type, meta}` linkage schema of a type
    pub fn linkage(&self, resource_type: &str) -> SchemaOrRef {
        let components = self.route.context().components();
        let name = format!("{}_Linkage", resource_schema_name(resource_type));
        if let Some(existing) = components.schemas.get(&name, true) {
            return existing;
        }

        let id = match self.route.context().schema_for(resource_type) {
            Some(schema) => Id::make(components, &schema.id, true),
            None => components.schema(DefaultSchema::Id),
        };

        let mut linkage = Schema::object(IndexMap::new())
            .with_required(vec!["id".to_string(), "type".to_string()])
            .with_additional_properties(false);
        linkage.insert_property("id", id);
        linkage.insert_property("type", self.type_schema(resource_type));
        linkage.insert_property("meta", components.schema(DefaultSchema::Meta));

        components.schemas.add(&name, linkage).into()
    }

    /// Linkage of a relation: one identifier (optionally null) or a set of them
    pub fn relationship_data(&self, relation: &RelationField, nullable: bool) -> SchemaOrRef {
        let inverse = relation.all_inverse();
        let linkage = if inverse.len() > 1 {
            Schema::one_of(inverse.iter().map(|t| self.linkage(t)).collect()).into()
        } else {
            self.linkage(&relation.inverse)
        };

        if relation.is_to_many() {
            return Schema {
                unique_items: Some(true),
                ..Schema::array(linkage)
            }
            .into();
        }

        if nullable {
            Schema::one_of(vec![Schema::typed("null").into(), linkage]).into()
        } else {
            linkage
        }
    }

    /// The `included` member for the include paths the route accepts
    pub fn included(&self) -> Result<Option<Schema>> {
        let Some(allowed) = self.route.validation_rules().includes() else {
            return Ok(None);
        };
        let Some(schema) = self.route.schema() else {
            return Ok(None);
        };

        let paths = if allowed.is_empty() {
            schema.include_paths.clone()
        } else {
            allowed
        };

        let mut types = BTreeSet::new();
        for path in &paths {
            let mut current = Some(schema);
            for segment in path.split('.') {
                let Some(relation) = current.and_then(|s| {
                    s.relationship(segment)
                        .or_else(|| s.relationship_by_serialized(segment))
                }) else {
                    break;
                };
                types.extend(relation.all_inverse().into_iter().map(str::to_string));
                current = self.route.context().schema_for(&relation.inverse);
            }
        }

        if types.is_empty() {
            return Ok(None);
        }

        let mut schemas = types
            .iter()
            .map(|t| self.resource(t))
            .collect::<Result<Vec<_>>>()?;
        let items = if schemas.len() > 1 {
            Schema::one_of(schemas).into()
        } else {
            schemas.remove(0)
        };

        let description = self.route.translate_for_resource(
            "schema.included",
            Some(self.route.translate("schema.included")),
        );

        Ok(Some(Schema {
            description,
            ..Schema::array(items)
        }))
    }

    /// The shared resource type schema narrowed to one type
    pub fn type_schema(&self, resource_type: &str) -> Schema {
        let mut schema = self
            .route
            .context()
            .components()
            .schemas
            .get_item(DefaultSchema::Type.as_str())
            .unwrap_or_else(|| Schema::typed("string"));
        schema.const_value = Some(json!(resource_type));
        schema
    }

    /// `links` of a document, extended with its `self` link
    pub fn with_self_link(&self, links: SchemaOrRef) -> Schema {
        let mut own = Schema::object(IndexMap::new());
        own.insert_property("self", Link::self_link(self.route.url()));
        Schema::all_of(vec![links, own.into()])
    }

    fn write_document(&self, title_key: &str, resource_type: &str, data: SchemaOrRef) -> Schema {
        let mut document = self
            .titled(title_key, resource_type)
            .with_additional_properties(false)
            .with_required(vec!["data".to_string()]);
        document.insert_property("data", data);
        document
    }

    fn titled(&self, key: &str, resource_type: &str) -> Schema {
        Schema {
            title: self.translate(key, resource_type),
            ..Schema::object(IndexMap::new())
        }
    }

    fn schema_for(&self, resource_type: &str) -> Result<&'a ResourceSchema> {
        self.route.context().schema_for(resource_type).ok_or_else(|| {
            GeneratorError::Generation(format!(
                "No schema registered for resource type `{}`",
                resource_type
            ))
        })
    }

    fn translate(&self, key: &str, resource_type: &str) -> Option<String> {
        self.translate_with(key, resource_type, &Replacements::new(), None)
    }

    fn translate_with(
        &self,
        key: &str,
        resource_type: &str,
        extra: &Replacements,
        default: Option<String>,
    ) -> Option<String> {
        self.route.translate_for(key, resource_type, extra, default)
    }

    fn attributes(
        &self,
        schema: &ResourceSchema,
        resource: Option<&ExampleResource>,
    ) -> Result<Option<Schema>> {
        // Declared fields first, then whatever else the example serialized
        let mut observed: Vec<(String, Option<&Value>)> = schema
            .attributes
            .iter()
            .map(|field| {
                let key = field.serialized_name();
                let value = resource.and_then(|resource| resource.attributes.get(key));
                (key.to_string(), value)
            })
            .collect();
        if let Some(resource) = resource {
            observed.extend(
                resource
                    .attributes
                    .iter()
                    .filter(|(key, _)| schema.attribute(key).is_none())
                    .map(|(key, value)| (key.clone(), Some(value))),
            );
        }

        let rules = self.resource_rules(schema);
        let mut properties = IndexMap::new();
        for (key, value) in observed {
            let mut property = match schema.attribute(&key) {
                Some(field) => match self.override_schema(field, &schema.resource_type)? {
                    Some(declared) => declared,
                    None => match self.field_schema(field, value) {
                        item @ RefOr::Item(_) if rules.contains_key(&key) => self
                            .route
                            .context()
                            .inferrer()
                            .compile(&key, &rules, Some(item)),
                        observed => observed,
                    },
                },
                None => self
                    .route
                    .context()
                    .inferrer()
                    .infer_from_value(value.unwrap_or(&Value::Null))
                    .into(),
            };
            self.describe_attribute(&schema.resource_type, &key, &mut property);
            properties.insert(key, property);
        }

        if properties.is_empty() {
            return Ok(None);
        }

        Ok(Some(
            Schema {
                description: self.translate("schema.attributes-description", &schema.resource_type),
                ..Schema::object(properties)
            }
            .with_additional_properties(false),
        ))
    }

    /// Rules the server validates resources of a type against
    ///
    /// These refine the attribute schemas inferred from example values.
    fn resource_rules(&self, schema: &ResourceSchema) -> RuleMap {
        let ctx = self.route.context();
        let settings = ctx.settings();
        let request = SimulatedRequest {
            route_name: format!("{}.{}.store", settings.name, schema.resource_type),
            method: "POST".to_string(),
            url: format!("{}/{}", settings.base_url, schema.resource_type),
            resource_type: schema.resource_type.clone(),
            kind: QueryKind::Resource,
            body: None,
        };

        ctx.server()
            .validation_rules(&request)
            .map(|rules| ValidationRules::normalise(&rules))
            .unwrap_or_default()
    }

    /// Literal schema declared on a field, registered when named
    fn override_schema(
        &self,
        field: &AttributeField,
        resource_type: &str,
    ) -> Result<Option<SchemaOrRef>> {
        let Some(value) = &field.schema else {
            return Ok(None);
        };

        let owner = format!("attribute `{}` of `{}`", field.serialized_name(), resource_type);
        let schema = literal_schema(value, &owner)?;

        Ok(Some(match &field.schema_name {
            Some(name) => self
                .route
                .context()
                .components()
                .schemas
                .add(name, schema)
                .into(),
            None => schema.into(),
        }))
    }

    /// Schema of a declared field
    ///
    /// `None` means no example value was observed. A value whose shape does
    /// not fit the declared kind falls back to value inference.
    fn field_schema(&self, field: &AttributeField, value: Option<&Value>) -> SchemaOrRef {
        let ctx = self.route.context();
        let inferrer = ctx.inferrer();

        if let (FieldKind::Enum, Some(descriptor)) = (field.kind, &field.enum_descriptor) {
            return Enum::new(ctx.components(), descriptor)
                .nullable(matches!(value, Some(Value::Null)))
                .build();
        }

        match (field.kind, value) {
            (FieldKind::Map, None | Some(Value::Null)) => self.map_schema(field, None).into(),
            (FieldKind::Map, Some(Value::Object(map))) => self.map_schema(field, Some(map)).into(),
            (FieldKind::DateTime, None | Some(Value::Null)) => date_time_schema(None).into(),
            (FieldKind::DateTime, Some(Value::String(value))) => {
                date_time_schema(Some(value)).into()
            }
            (FieldKind::List, Some(Value::Array(items))) => inferrer.to_array_schema(items).into(),
            (FieldKind::Hash, Some(Value::Object(map))) => {
                inferrer.to_object_schema(map, false).into()
            }
            (FieldKind::Number, Some(value @ Value::Number(_))) => {
                Schema::typed("number").with_example(value.clone()).into()
            }
            (FieldKind::Boolean, Some(value @ Value::Bool(_))) => {
                Schema::typed("boolean").with_example(value.clone()).into()
            }
            (kind, None) => kind_schema(kind).into(),
            (kind, Some(Value::Null)) if kind != FieldKind::Unknown => {
                let mut schema = kind_schema(kind);
                schema.make_nullable();
                schema.into()
            }
            (_, Some(value)) => inferrer.infer_from_value(value).into(),
        }
    }

    /// Object schema of a `map` field, one property per sub-field
    fn map_schema(&self, field: &AttributeField, value: Option<&Map<String, Value>>) -> Schema {
        let properties = field
            .fields
            .iter()
            .map(|sub| {
                let sub_value = value.map(|map| map.get(&sub.name).unwrap_or(&Value::Null));
                (sub.serialized_name().to_string(), self.field_schema(sub, sub_value))
            })
            .collect();

        let mut schema = Schema::object(properties);
        if let Some(map) = value.filter(|map| !map.is_empty()) {
            schema.example = Some(Value::Object(map.clone()));
        }
        schema
    }

    /// Attach translated descriptions to an attribute and its nested nodes
    fn describe_attribute(&self, resource_type: &str, key: &str, schema: &mut SchemaOrRef) {
        let Some(schema) = schema.as_item_mut() else {
            return;
        };

        let single_type = match &schema.schema_type {
            Some(SchemaType::Single(t)) => t.clone(),
            _ => String::new(),
        };

        if schema.description.as_deref().map_or(true, str::is_empty) {
            let description_key = match single_type.as_str() {
                "object" | "array" => format!("schema.attributes.{}.description", key),
                _ => format!("schema.attribute.{}", key),
            };
            let with_attribute = replacements([("attribute", key)]);
            let default = if key.contains('.') {
                None
            } else {
                self.translate_with("schema.attribute", resource_type, &with_attribute, None)
            };
            if let Some(description) =
                self.translate_with(&description_key, resource_type, &with_attribute, default)
            {
                schema.description = Some(description);
            }
        }

        if single_type == "object" {
            if let Some(properties) = schema.properties.as_mut() {
                for (sub_key, property) in properties.iter_mut() {
                    self.describe_attribute(
                        resource_type,
                        &format!("{}.properties.{}", key, sub_key),
                        property,
                    );
                }
            }
        }
        if single_type == "array" {
            if let Some(items) = schema.items.as_mut() {
                self.describe_attribute(resource_type, &format!("{}.items", key), items);
            }
        }
    }

    fn relationships(
        &self,
        schema: &ResourceSchema,
        resource: Option<&ExampleResource>,
    ) -> Option<Schema> {
        let observed: Vec<(&RelationField, Option<&ExampleRelationship>)> = schema
            .relationships
            .iter()
            .map(|relation| {
                let example = resource.and_then(|resource| {
                    resource
                        .relationships
                        .get(relation.serialized_name())
                        .or_else(|| resource.relationships.get(&relation.name))
                });
                (relation, example)
            })
            .collect();

        if observed.is_empty() {
            return None;
        }

        let properties = observed
            .into_iter()
            .map(|(relation, example)| {
                (
                    relation.name.clone(),
                    self.relationship(relation, example, &schema.resource_type)
                        .into(),
                )
            })
            .collect();

        Some(
            Schema {
                description: self.translate(
                    "schema.relationships-description",
                    &schema.resource_type,
                ),
                ..Schema::object(properties)
            }
            .with_additional_properties(false),
        )
    }

    fn relationship(
        &self,
        relation: &RelationField,
        example: Option<&ExampleRelationship>,
        resource_type: &str,
    ) -> Schema {
        let components = self.route.context().components();
        let cardinality = if relation.is_to_one() { "toOne" } else { "toMany" };
        let replacements = relation_replacements(relation, resource_type);

        let description = self
            .translate_with(
                &format!("schema.relationships.{}.description", relation.name),
                resource_type,
                &replacements,
                None,
            )
            .or_else(|| {
                self.translate_with(
                    &format!("schema.relationship.description.{}", cardinality),
                    resource_type,
                    &replacements,
                    None,
                )
            });

        let meta: SchemaOrRef = match example.and_then(|example| example.meta.as_ref()) {
            Some(meta) if !meta.is_empty() => self
                .route
                .context()
                .inferrer()
                .to_object_schema(meta, true)
                .with_description(self.route.translate("schema.meta"))
                .into(),
            _ => components.schema(DefaultSchema::Meta),
        };

        let mut schema = Schema {
            description,
            ..Schema::object(IndexMap::new())
        };
        schema.insert_property(
            "links",
            self.relationship_links(relation, example, resource_type, &replacements),
        );
        schema.insert_property("data", self.relationship_data(relation, relation.nullable));
        schema.insert_property("meta", meta);
        schema
    }

    fn relationship_links(
        &self,
        relation: &RelationField,
        example: Option<&ExampleRelationship>,
        resource_type: &str,
        replacements: &Replacements,
    ) -> Schema {
        let components = self.route.context().components();

        let links: Vec<(String, Schema)> = match example {
            Some(example) => example
                .links
                .iter()
                .map(|(key, link)| (key.clone(), Link::make(components, link)))
                .collect(),
            None => ["self", "related"]
                .into_iter()
                .map(|key| {
                    (
                        key.to_string(),
                        Schema {
                            format: Some("url".to_string()),
                            ..Schema::typed("string")
                        },
                    )
                })
                .collect(),
        };

        let mut properties = IndexMap::new();
        for (key, mut link) in links {
            let mut with_link = replacements.clone();
            with_link.insert("link".to_string(), key.clone());

            let generic_key = if key == "related" {
                format!(
                    "related.{}",
                    if relation.is_to_one() { "toOne" } else { "toMany" }
                )
            } else {
                key.clone()
            };

            link.description = self
                .translate_with(
                    &format!("schema.relationships.{}.links.{}", relation.name, key),
                    resource_type,
                    &with_link,
                    None,
                )
                .or_else(|| {
                    self.translate_with(
                        &format!("schema.relationship.links.{}", generic_key),
                        resource_type,
                        &with_link,
                        None,
                    )
                });
            properties.insert(key, link.into());
        }

        let description = self
            .translate_with(
                &format!("schema.relationships.{}.links-description", relation.name),
                resource_type,
                replacements,
                None,
            )
            .or_else(|| {
                self.translate_with(
                    "schema.relationship.links-description",
                    resource_type,
                    replacements,
                    None,
                )
            });

        Schema {
            description,
            ..Schema::object(properties)
        }
    }

    /// Reference to the `_Links` schema of a type, or the shared links schema
    /// when no example resource shows which links exist
    fn resource_links(&self, resource_type: &str) -> SchemaOrRef {
        let ctx = self.route.context();
        let components = ctx.components();
        let name = format!("{}_Links", resource_schema_name(resource_type));

        if let Some(existing) = components.schemas.get(&name, true) {
            return existing;
        }

        let Some(resource) = ctx.resources().single(resource_type) else {
            return components.schema(DefaultSchema::Links);
        };

        let mut properties = IndexMap::new();
        for (key, link) in &resource.links {
            let mut schema = Link::make(components, link);
            let with_link = replacements([("link", key.as_str())]);
            schema.description = self
                .translate_with(
                    &format!("schema.links.{}", key),
                    resource_type,
                    &with_link,
                    None,
                )
                .or_else(|| {
                    if key == "self" {
                        self.translate_with(
                            "actions.viewingOne.description",
                            resource_type,
                            &with_link,
                            None,
                        )
                    } else {
                        None
                    }
                });
            properties.insert(key.clone(), schema.into());
        }

        let links = Schema::all_of(vec![
            components.schema(DefaultSchema::Links),
            Schema::object(properties).into(),
        ]);

        components.schemas.add(&name, links).into()
    }

    fn resource_meta(&self, resource_type: &str, resource: Option<&ExampleResource>) -> SchemaOrRef {
        let components = self.route.context().components();

        match resource.and_then(|resource| resource.meta.as_ref()) {
            Some(meta) if !meta.is_empty() => {
                let mut schema = self
                    .route
                    .context()
                    .inferrer()
                    .to_object_schema(meta, true);
                schema.description = self.translate("schema.meta-description", resource_type);
                schema.into()
            }
            _ => components.schema(DefaultSchema::Meta),
        }
    }

    /// Name of a request data schema (`Article_Store`)
    fn request_data_name(&self, resource_type: &str) -> String {
        format!(
            "{}_{}",
            resource_schema_name(resource_type),
            ucfirst(&camel(self.route.handler_name()))
        )
    }

    fn store_data(&self, resource_type: &str) -> Result<SchemaOrRef> {
        let components = self.route.context().components();
        let schema = self.schema_for(resource_type)?;
        let rules = self.route.validation_rules();

        let relationships = self.request_relationships(schema, true);
        let client_id = schema.id.accepts_client_ids;

        let mut required = vec!["type".to_string(), "attributes".to_string()];
        if client_id && rules.is_required("id") {
            required.push("id".to_string());
        }
        if relationships.is_some() {
            required.push("relationships".to_string());
        }

        let mut data = Schema {
            title: self.translate("data.store", resource_type),
            ..Schema::object(IndexMap::new())
        };
        if client_id {
            data.insert_property("id", Id::make(components, &schema.id, true));
        }
        data.insert_property("type", self.type_schema(resource_type));
        data.insert_property("attributes", self.request_attributes(schema, true));
        if let Some(relationships) = relationships {
            data.insert_property("relationships", relationships);
        }

        let data = data
            .with_required(required)
            .with_additional_properties(false);
        Ok(components
            .schemas
            .add(&self.request_data_name(resource_type), data)
            .into())
    }

    fn update_data(&self, resource_type: &str) -> Result<SchemaOrRef> {
        let components = self.route.context().components();
        let schema = self.schema_for(resource_type)?;

        let relationships = self.request_relationships(schema, false);

        let mut required = vec![
            "id".to_string(),
            "type".to_string(),
            "attributes".to_string(),
        ];
        if relationships.is_some() {
            required.push("relationships".to_string());
        }

        let mut data = Schema {
            title: self.translate("data.update", resource_type),
            ..Schema::object(IndexMap::new())
        };
        data.insert_property("id", Id::make(components, &schema.id, true));
        data.insert_property("type", self.type_schema(resource_type));
        data.insert_property("attributes", self.request_attributes(schema, false));
        if let Some(relationships) = relationships {
            data.insert_property("relationships", relationships);
        }

        let data = data
            .with_required(required)
            .with_additional_properties(false);
        Ok(components
            .schemas
            .add(&self.request_data_name(resource_type), data)
            .into())
    }

    /// Writable relationships of a request document
    fn request_relationships(&self, schema: &ResourceSchema, creating: bool) -> Option<Schema> {
        let rules = self.route.validation_rules();

        let mut properties = IndexMap::new();
        let mut required = Vec::new();
        for relation in &schema.relationships {
            if relation.read_only.applies(creating) {
                continue;
            }

            let key = relation.serialized_name();
            if rules.is_required(key) {
                required.push(key.to_string());
            }

            let mut property = Schema::object(IndexMap::new())
                .with_required(vec!["data".to_string()]);
            property.insert_property(
                "data",
                self.relationship_data(relation, rules.is_nullable(key)),
            );
            properties.insert(key.to_string(), property.into());
        }

        if properties.is_empty() {
            return None;
        }

        Some(
            Schema {
                description: self.translate(
                    "schema.relationships-description",
                    &schema.resource_type,
                ),
                ..Schema::object(properties)
            }
            .with_required(required),
        )
    }

    /// Writable attributes of a request document, compiled from the rules
    ///
    /// Fields without rules are not accepted by the server and are left out.
    fn request_attributes(&self, schema: &ResourceSchema, creating: bool) -> Schema {
        let rules = self.route.validation_rules();
        let inferrer = self.route.context().inferrer();

        let mut properties = IndexMap::new();
        let mut required = Vec::new();
        for field in &schema.attributes {
            let key = field.serialized_name();
            if field.read_only.applies(creating) || !rules.has(key) {
                continue;
            }

            let mut property = inferrer.compile(key, rules.all(), None);
            if rules.is_required(key) {
                required.push(key.to_string());
            }
            self.describe_attribute(&schema.resource_type, key, &mut property);
            properties.insert(key.to_string(), property);
        }

        let attributes = Schema {
            description: self.translate("schema.attributes-description", &schema.resource_type),
            ..Schema::object(properties)
        }
        .with_additional_properties(false);

        if creating {
            attributes.with_required(required)
        } else {
            attributes
        }
    }
}

/// Plain schema for a field kind without an example value
fn kind_schema(kind: FieldKind) -> Schema {
    match kind {
        FieldKind::String | FieldKind::Enum => Schema::typed("string"),
        FieldKind::Number => Schema::typed("number"),
        FieldKind::Boolean => Schema::typed("boolean"),
        FieldKind::DateTime => date_time_schema(None),
        FieldKind::List => Schema::typed("array"),
        FieldKind::Hash | FieldKind::Map => Schema::typed("object"),
        FieldKind::Unknown => Schema::default(),
    }
}

/// Example instant of date-time fields without a value
const EXAMPLE_TIMESTAMP: i64 = 1_704_067_200;

/// `date` when the value is a plain calendar date, else `date-time`
fn date_time_schema(value: Option<&str>) -> Schema {
    let mut schema = Schema {
        format: Some("date-time".to_string()),
        ..Schema::typed("string")
    };

    match value.filter(|value| !value.is_empty()) {
        None => {
            schema.example = DateTime::from_timestamp(EXAMPLE_TIMESTAMP, 0)
                .map(|example| json!(example.to_rfc3339_opts(SecondsFormat::Secs, true)));
        }
        Some(value) => {
            if NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok() {
                schema.format = Some("date".to_string());
            }
            schema.example = Some(json!(value));
        }
    }

    schema
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_schema_name() {
        assert_eq!(resource_schema_name("articles"), "Article");
        assert_eq!(resource_schema_name("blog-posts"), "BlogPost");
        assert_eq!(resource_schema_name("categories"), "Category");
    }

    #[test]
    fn test_date_time_schema() {
        let date = date_time_schema(Some("2024-01-31"));
        assert_eq!(date.format.as_deref(), Some("date"));
        assert_eq!(date.example, Some(json!("2024-01-31")));

        let date_time = date_time_schema(Some("2024-01-31T10:00:00.000000Z"));
        assert_eq!(date_time.format.as_deref(), Some("date-time"));

        let fallback = date_time_schema(None);
        assert_eq!(fallback.format.as_deref(), Some("date-time"));
        assert_eq!(fallback.example, Some(json!("2024-01-01T00:00:00Z")));
    }

    #[test]
    fn test_kind_schema() {
        assert_eq!(kind_schema(FieldKind::List), Schema::typed("array"));
        assert_eq!(kind_schema(FieldKind::Unknown), Schema::default());
    }
}
