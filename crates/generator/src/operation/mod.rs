//! Operations
//!
//! An [`OperationBuilder`] turns one classified route into an OpenAPI
//! operation. Identity, tags and parameters are shared by every action; the
//! responses and request body depend on the [`ResourceAction`] the route was
//! classified as (see the `actions` module).

mod actions;
mod examples;
mod parameters;

pub use examples::{media_type, named_examples, ExampleDocuments, RelatedData};
pub use parameters::Parameters;

use crate::components::DefaultResponse;
use crate::resource_schema::ResourceSchemaFactory;
use crate::route::{ResourceAction, RouteDescriptor};
use indexmap::IndexMap;
use jsonapi_openapi_common::openapi::{
    Operation, RefOr, Response, SchemaOrRef, JSONAPI_MEDIA_TYPE,
};
use jsonapi_openapi_common::{GeneratorError, Result};
use serde_json::Value;

/// Responses of an operation keyed by status code
pub type Responses = IndexMap<String, RefOr<Response>>;

/// Builds the operation of one route
pub struct OperationBuilder<'r, 'a> {
    route: &'r RouteDescriptor<'a>,
    action: ResourceAction,
    schemas: ResourceSchemaFactory<'r, 'a>,
}

impl<'r, 'a> OperationBuilder<'r, 'a> {
    /// Builder for a route; fails when the route matches no action
    pub fn new(route: &'r RouteDescriptor<'a>) -> Result<Self> {
        let action = route.action().ok_or_else(|| {
            GeneratorError::Generation(format!(
                "Route `{}` matches no JSON:API action",
                route.name()
            ))
        })?;

        Ok(Self {
            route,
            action,
            schemas: ResourceSchemaFactory::new(route),
        })
    }

    pub fn build(&self) -> Result<Operation> {
        let action_name = self.action_name();
        let parameters = Parameters::new(self.route).build()?;
        let responses = self.responses()?;
        let request_body = self.request_body()?;

        Ok(Operation {
            tags: self.tags(),
            summary: self
                .route
                .translate_for_resource(&format!("actions.{}.summary", action_name), None),
            description: self
                .route
                .translate_for_resource(&format!("actions.{}.description", action_name), None),
            operation_id: Some(self.route.name().to_string()),
            parameters,
            request_body: request_body.map(RefOr::item),
            responses,
        })
    }

    /// Name of the action in translation keys
    ///
    /// The action's default name when the route uses the default handler,
    /// the handler name otherwise.
    pub fn action_name(&self) -> String {
        let handler = self.route.handler_name();
        if handler == self.action.default_method() {
            self.action.name().to_string()
        } else {
            handler.to_string()
        }
    }

    fn tags(&self) -> Vec<String> {
        self.route
            .route_resource_type()
            .map(|resource_type| vec![self.route.context().resource_tag(resource_type)])
            .unwrap_or_default()
    }

    fn responses(&self) -> Result<Responses> {
        let mut responses = match self.action {
            ResourceAction::ViewingAny => self.viewing_any()?,
            ResourceAction::ViewingOne => self.viewing_one()?,
            ResourceAction::Creating => self.creating()?,
            ResourceAction::Updating => self.updating()?,
            ResourceAction::Deleting => self.deleting(),
            ResourceAction::ViewingRelated => self.viewing_related()?,
            ResourceAction::ViewingRelationship => self.viewing_relationship()?,
            ResourceAction::AttachingRelationship => self.mutating_relationship(
                DefaultResponse::AttachingRelationship204,
                DefaultResponse::AttachingRelationship403,
            ),
            ResourceAction::DetachingRelationship => self.mutating_relationship(
                DefaultResponse::DetachingRelationship204,
                DefaultResponse::DetachingRelationship403,
            ),
            ResourceAction::UpdatingRelationship => self.mutating_relationship(
                DefaultResponse::UpdatingRelationship204,
                DefaultResponse::UpdatingRelationship403,
            ),
        };

        self.add_common_responses(&mut responses);
        Ok(responses)
    }

    /// Responses every action may produce
    fn add_common_responses(&self, responses: &mut Responses) {
        let components = self.route.context().components();

        let mut defaults = vec![
            ("406", DefaultResponse::NotAcceptable406),
            ("415", DefaultResponse::UnsupportedMediaType415),
            ("422", DefaultResponse::UnprocessableEntity422),
        ];
        if components.has_rate_limits() {
            defaults.push(("429", DefaultResponse::TooManyRequests429));
        }
        defaults.push(("4XX", DefaultResponse::BadRequest4XX));
        defaults.push(("5XX", DefaultResponse::ServerError5XX));

        for (code, default) in defaults {
            responses.insert(
                code.to_string(),
                RefOr::Ref(components.responses.reference(default.as_str())),
            );
        }
    }

    /// Description of a response, falling back to the action's default line
    fn describe(&self, code: &str) -> String {
        let key = |name: &str| format!("actions.{}.responses.{}.description", name, code);

        let default = self
            .route
            .translate_for_resource(&key(self.action.name()), None);
        self.route
            .translate_for_resource(&key(&self.action_name()), default)
            .unwrap_or_else(|| self.route.translate(&format!("responses.{}.description", code)))
    }

    /// Response with a JSON:API document body
    fn document(
        &self,
        code: &str,
        schema: impl Into<SchemaOrRef>,
        examples: IndexMap<String, Value>,
    ) -> RefOr<Response> {
        let mut content = IndexMap::new();
        content.insert(
            JSONAPI_MEDIA_TYPE.to_string(),
            media_type(schema.into(), examples),
        );

        RefOr::item(Response {
            description: self.describe(code),
            headers: self.route.context().components().rate_limit_headers(),
            content: Some(content),
        })
    }

    /// Error document response, shared when it equals the default
    fn failure(&self, code: &str, default: DefaultResponse) -> RefOr<Response> {
        let ctx = self.route.context();
        let response = ctx.components().failure_response(
            self.describe(code),
            ctx.translator()
                .translate_value(&format!("responses.{}.example", code)),
        );
        ctx.components().default_if_matching(response, default)
    }

    /// Body-less response, shared when it equals the default
    fn empty(&self, code: &str, default: Option<DefaultResponse>) -> RefOr<Response> {
        let components = self.route.context().components();
        let response = components.empty_response(self.describe(code));
        match default {
            Some(default) => components.default_if_matching(response, default),
            None => RefOr::item(response),
        }
    }

    /// The route's own response examples, else the synthesised one
    fn examples_or<F>(&self, synthesise: F) -> IndexMap<String, Value>
    where
        F: FnOnce() -> Option<Value>,
    {
        let mut examples = self.route.definition().examples.clone();
        if examples.is_empty() {
            if let Some(example) = synthesise() {
                examples.insert("example".to_string(), example);
            }
        }
        examples
    }

    fn resource_type(&self) -> Result<&'r str> {
        self.route.resource_type().ok_or_else(|| {
            GeneratorError::Generation(format!(
                "Route `{}` has no resource type",
                self.route.name()
            ))
        })
    }
}
