//! Responses and request bodies per action

use super::examples::{named_examples, ExampleDocuments, RelatedData};
use super::{OperationBuilder, Responses};
use crate::components::{DefaultResponse, DefaultSchema};
use crate::descriptors::Link;
use crate::resources::DEFAULT_COLLECTION_SIZE;
use crate::route::ResourceAction;
use indexmap::IndexMap;
use jsonapi_openapi_common::openapi::{
    MediaType, RequestBody, Schema, SchemaOrRef, JSONAPI_MEDIA_TYPE,
};
use jsonapi_openapi_common::{ExampleResource, GeneratorError, RelationField, Result};
use serde_json::Value;

/// Success codes a create route may declare
const CREATING_CODES: [u16; 3] = [201, 202, 204];

/// Success codes an update route may declare
const UPDATING_CODES: [u16; 3] = [200, 202, 204];

impl<'r, 'a> OperationBuilder<'r, 'a> {
    pub(super) fn viewing_any(&self) -> Result<Responses> {
        let resource_type = self.resource_type()?;
        let schema = self.schemas.many_document(resource_type)?;
        let examples = self.examples_or(|| self.collection_example(resource_type));

        let mut responses = Responses::new();
        responses.insert("200".to_string(), self.document("200", schema, examples));
        Ok(responses)
    }

    pub(super) fn viewing_one(&self) -> Result<Responses> {
        let resource_type = self.resource_type()?;
        let schema = self.schemas.one_document(resource_type)?;
        let examples = self.examples_or(|| self.single_example(resource_type));

        let mut responses = Responses::new();
        responses.insert("200".to_string(), self.document("200", schema, examples));
        responses.insert(
            "404".to_string(),
            self.failure("404", DefaultResponse::ViewingOne404),
        );
        Ok(responses)
    }

    pub(super) fn creating(&self) -> Result<Responses> {
        let codes = self.success_codes(&CREATING_CODES, 201)?;
        let mut responses = Responses::new();

        if codes.contains(&201) {
            let returned = self.returned_resource_type()?;
            let schema = self.schemas.one_document(returned)?;
            let examples = self.examples_or(|| self.single_example(returned));
            responses.insert("201".to_string(), self.document("201", schema, examples));
        }
        self.add_accepted_responses(&codes, &mut responses);

        responses.insert(
            "403".to_string(),
            self.failure("403", DefaultResponse::Creating403),
        );
        responses.insert(
            "404".to_string(),
            self.failure("404", DefaultResponse::Creating404),
        );
        responses.insert(
            "409".to_string(),
            self.failure("409", DefaultResponse::Creating409),
        );
        Ok(responses)
    }

    pub(super) fn updating(&self) -> Result<Responses> {
        let codes = self.success_codes(&UPDATING_CODES, 200)?;
        let mut responses = Responses::new();

        if codes.contains(&200) {
            let returned = self.returned_resource_type()?;
            let schema = self.schemas.one_document(returned)?;
            let examples = self.examples_or(|| self.single_example(returned));
            responses.insert("200".to_string(), self.document("200", schema, examples));
        }
        self.add_accepted_responses(&codes, &mut responses);

        responses.insert(
            "403".to_string(),
            self.failure("403", DefaultResponse::Updating403),
        );
        responses.insert(
            "404".to_string(),
            self.failure("404", DefaultResponse::Updating404),
        );
        responses.insert(
            "409".to_string(),
            self.failure("409", DefaultResponse::Updating409),
        );
        Ok(responses)
    }

    pub(super) fn deleting(&self) -> Responses {
        let mut responses = Responses::new();
        responses.insert(
            "204".to_string(),
            self.empty("204", Some(DefaultResponse::Deleting204)),
        );
        responses.insert(
            "404".to_string(),
            self.failure("404", DefaultResponse::Deleting404),
        );
        responses
    }

    pub(super) fn viewing_related(&self) -> Result<Responses> {
        let relation = self.relation()?;
        let components = self.route.context().components();
        let parent = self.parent_resource();

        let data: SchemaOrRef = if relation.is_to_one() {
            Schema::one_of(vec![
                Schema::typed("null").into(),
                self.related_resource(relation)?,
            ])
            .into()
        } else {
            Schema {
                unique_items: Some(true),
                ..Schema::array(self.related_resource(relation)?)
            }
            .into()
        };

        let paginator = self.route.paginator();
        let links: SchemaOrRef = match &paginator {
            Some(paginator) => paginator.links(self.route).into(),
            None => components.schema(DefaultSchema::Links),
        };
        let meta: SchemaOrRef = match (self.relation_meta(parent.as_ref()), &paginator) {
            (Some(meta), _) => meta.into(),
            (None, Some(paginator)) => paginator.meta(self.route).into(),
            (None, None) => components.schema(DefaultSchema::Meta),
        };

        let mut document = self.relation_document(relation);
        document.insert_property("data", data);
        if let Some(included) = self.schemas.included()? {
            document.insert_property("included", included);
        }
        document.insert_property("links", self.schemas.with_self_link(links));
        document.insert_property("meta", meta);
        document.insert_property("jsonapi", components.schema(DefaultSchema::JsonApi));

        let examples = self.examples_or(|| self.related_example(relation, parent.as_ref(), false));

        let mut responses = Responses::new();
        responses.insert(
            "200".to_string(),
            self.document("200", document.with_required(vec!["data".to_string()]), examples),
        );
        responses.insert(
            "404".to_string(),
            self.failure("404", DefaultResponse::ViewingRelated404),
        );
        Ok(responses)
    }

    pub(super) fn viewing_relationship(&self) -> Result<Responses> {
        let relation = self.relation()?;
        let components = self.route.context().components();
        let parent = self.parent_resource();

        let paginator = self.route.paginator();
        let base_links: SchemaOrRef = match &paginator {
            Some(paginator) => paginator.links(self.route).into(),
            None => components.schema(DefaultSchema::Links),
        };
        let links = Schema::all_of(vec![
            base_links,
            self.relation_links(parent.as_ref()).into(),
        ]);
        let meta: SchemaOrRef = match self.relation_meta(parent.as_ref()) {
            Some(meta) => meta.into(),
            None => components.schema(DefaultSchema::Meta),
        };

        let mut document = self.relation_document(relation);
        document.insert_property("data", self.schemas.relationship_data(relation, true));
        document.insert_property("links", links);
        document.insert_property("meta", meta);
        document.insert_property("jsonapi", components.schema(DefaultSchema::JsonApi));

        let examples = self.examples_or(|| self.related_example(relation, parent.as_ref(), true));

        let mut responses = Responses::new();
        responses.insert(
            "200".to_string(),
            self.document("200", document.with_required(vec!["data".to_string()]), examples),
        );
        responses.insert(
            "404".to_string(),
            self.failure("404", DefaultResponse::ViewingRelationship404),
        );
        Ok(responses)
    }

    pub(super) fn mutating_relationship(
        &self,
        no_content: DefaultResponse,
        forbidden: DefaultResponse,
    ) -> Responses {
        let mut responses = Responses::new();
        responses.insert("204".to_string(), self.empty("204", Some(no_content)));
        responses.insert("403".to_string(), self.failure("403", forbidden));
        responses
    }

    /// Request body of a write route; `None` for read routes
    pub(super) fn request_body(&self) -> Result<Option<RequestBody>> {
        let schema: Schema = match self.action {
            ResourceAction::Creating => self.schemas.store_document(self.resource_type()?)?,
            ResourceAction::Updating => self.schemas.update_document(self.resource_type()?)?,
            action if action.is_relationship_mutation() => {
                let relation = self.relation()?;
                let nullable =
                    action == ResourceAction::UpdatingRelationship && relation.nullable;

                let mut document = Schema::object(IndexMap::new())
                    .with_required(vec!["data".to_string()]);
                document.insert_property(
                    "data",
                    self.schemas.relationship_data(relation, nullable),
                );
                document
            }
            _ => return Ok(None),
        };

        let request_examples = self.route.definition().request_examples.clone();
        let media = MediaType {
            schema: Some(schema.into()),
            example: None,
            examples: Some(named_examples(request_examples))
                .filter(|examples| !examples.is_empty()),
        };

        let mut content = IndexMap::new();
        content.insert(JSONAPI_MEDIA_TYPE.to_string(), media);

        Ok(Some(RequestBody {
            description: None,
            content,
            required: Some(true),
        }))
    }

    /// Declared success codes, checked against the codes the action permits
    fn success_codes(&self, permitted: &[u16], default: u16) -> Result<Vec<u16>> {
        let codes = self
            .route
            .definition()
            .action_override
            .as_ref()
            .and_then(|action| action.response_codes.clone())
            .unwrap_or_else(|| vec![default]);

        if let Some(code) = codes.iter().find(|code| !permitted.contains(code)) {
            return Err(GeneratorError::Configuration(format!(
                "Response code {} of route `{}` is not permitted when {} (expected one of {:?})",
                code,
                self.route.name(),
                self.action,
                permitted
            )));
        }

        Ok(codes)
    }

    /// `202 Accepted` and `204 No Content` responses of a write route
    fn add_accepted_responses(&self, codes: &[u16], responses: &mut Responses) {
        for code in [202, 204] {
            if codes.contains(&code) {
                let code = code.to_string();
                let response = self.empty(&code, None);
                responses.insert(code, response);
            }
        }
    }

    /// Resource type a write route answers with
    fn returned_resource_type(&self) -> Result<&str> {
        match self
            .route
            .definition()
            .action_override
            .as_ref()
            .and_then(|action| action.return_resource_type.as_deref())
        {
            Some(resource_type) => Ok(resource_type),
            None => self.resource_type(),
        }
    }

    fn relation(&self) -> Result<&'a RelationField> {
        self.route.relation().ok_or_else(|| {
            GeneratorError::Generation(format!(
                "Route `{}` names no known relation",
                self.route.name()
            ))
        })
    }

    /// The example resource of the route's own type
    fn parent_resource(&self) -> Option<ExampleResource> {
        let parent_type = self.route.route_resource_type()?;
        self.route.context().resources().single(parent_type)
    }

    /// Resource schema of a relation's related type(s)
    fn related_resource(&self, relation: &RelationField) -> Result<SchemaOrRef> {
        let types = relation.all_inverse();
        if types.len() > 1 {
            let schemas = types
                .iter()
                .map(|resource_type| self.schemas.resource(resource_type))
                .collect::<Result<Vec<_>>>()?;
            return Ok(Schema::one_of(schemas).into());
        }
        self.schemas.resource(&relation.inverse)
    }

    /// Relation document titled after the relation's cardinality
    fn relation_document(&self, relation: &RelationField) -> Schema {
        let cardinality = if relation.is_to_one() { "toOne" } else { "toMany" };
        Schema {
            title: self.route.translate_for_resource(
                &format!("schema.relationship.description.{}", cardinality),
                None,
            ),
            ..Schema::object(IndexMap::new())
        }
    }

    /// Meta schema of the parent's relationship, when the example has one
    fn relation_meta(&self, parent: Option<&ExampleResource>) -> Option<Schema> {
        let relationship = ExampleDocuments::new(self.route).parent_relationship(parent?)?;
        let meta = relationship.meta.as_ref().filter(|meta| !meta.is_empty())?;

        Some(
            self.route
                .context()
                .inferrer()
                .to_object_schema(meta, true)
                .with_description(self.route.translate("schema.meta")),
        )
    }

    /// Links of a relationship document: the parent's relationship links
    /// when the example has them, else a `self` link
    fn relation_links(&self, parent: Option<&ExampleResource>) -> Schema {
        let components = self.route.context().components();

        let mut links = Schema::object(IndexMap::new());
        if let Some(relationship) =
            parent.and_then(|parent| ExampleDocuments::new(self.route).parent_relationship(parent))
        {
            for key in ["related", "self"] {
                if let Some(link) = relationship.links.get(key) {
                    links.insert_property(key, Link::make(components, link));
                }
            }
        }

        if links.properties.as_ref().map_or(true, IndexMap::is_empty) {
            links.insert_property("self", Link::self_link(self.route.url()));
        }
        links
    }

    fn single_example(&self, resource_type: &str) -> Option<Value> {
        let resource = self.route.context().resources().single(resource_type)?;
        Some(ExampleDocuments::new(self.route).one(&resource))
    }

    /// The default page of a paginated type, else a small collection
    fn collection_example(&self, resource_type: &str) -> Option<Value> {
        let documents = ExampleDocuments::new(self.route);

        match self.route.paginator().filter(|paginator| paginator.is_default(self.route)) {
            Some(paginator) => {
                let page = paginator.paginate(self.route);
                (!page.resources.is_empty()).then(|| documents.page(&page))
            }
            None => {
                let resources = self
                    .route
                    .context()
                    .resources()
                    .collection(resource_type, DEFAULT_COLLECTION_SIZE);
                (!resources.is_empty()).then(|| documents.many(&resources))
            }
        }
    }

    /// Related or relationship document of the parent's example resource
    fn related_example(
        &self,
        relation: &RelationField,
        parent: Option<&ExampleResource>,
        identifiers: bool,
    ) -> Option<Value> {
        let parent = parent?;
        let documents = ExampleDocuments::new(self.route);
        let resources = self.route.context().resources();

        if relation.is_to_one() {
            let related = resources.single(&relation.inverse)?;
            return Some(documents.related(
                parent,
                RelatedData::One(&related),
                identifiers,
            ));
        }

        match self.route.paginator().filter(|paginator| paginator.is_default(self.route)) {
            Some(paginator) => {
                let page = paginator.paginate(self.route);
                (!page.resources.is_empty())
                    .then(|| documents.related(parent, RelatedData::Page(&page), identifiers))
            }
            None => {
                let related = resources.collection(&relation.inverse, DEFAULT_COLLECTION_SIZE);
                (!related.is_empty())
                    .then(|| documents.related(parent, RelatedData::Many(&related), identifiers))
            }
        }
    }
}
