//! Shared OpenAPI components of a build
//!
//! [`Components`] holds one [`Registry`] per component kind plus the
//! JSON:API defaults every document carries (error documents, links, meta,
//! the media type header parameter and the default failure responses).

use crate::registry::Registry;
use crate::translator::Translator;
use indexmap::IndexMap;
use jsonapi_openapi_common::openapi::{
    AdditionalProperties, ComponentKind, Components as OpenApiComponents, Example, Header,
    MediaType, Parameter, ParameterLocation, RefOr, Reference, RequestBody, Response, Schema,
    SchemaOrRef, JSONAPI_MEDIA_TYPE,
};
use jsonapi_openapi_common::ServerSettings;
use serde_json::{json, Value};

/// Names of the default schemas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultSchema {
    JsonApi,
    Meta,
    Links,
    LinkObject,
    Errors,
    Error,
    Failure,
    Id,
    Type,
}

impl DefaultSchema {
    pub fn as_str(&self) -> &'static str {
        match self {
            DefaultSchema::JsonApi => "JsonApi:jsonapi",
            DefaultSchema::Meta => "JsonApi:meta",
            DefaultSchema::Links => "JsonApi:links",
            DefaultSchema::LinkObject => "JsonApi:linkObject",
            DefaultSchema::Errors => "JsonApi:errors",
            DefaultSchema::Error => "JsonApi:error",
            DefaultSchema::Failure => "JsonApi:failure",
            DefaultSchema::Id => "JsonApi:resourceId",
            DefaultSchema::Type => "JsonApi:resourceType",
        }
    }
}

/// Names of the default responses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultResponse {
    Deleting204,
    AttachingRelationship204,
    DetachingRelationship204,
    UpdatingRelationship204,
    Creating403,
    Updating403,
    AttachingRelationship403,
    DetachingRelationship403,
    UpdatingRelationship403,
    Creating404,
    Deleting404,
    Updating404,
    ViewingOne404,
    ViewingRelated404,
    ViewingRelationship404,
    NotAcceptable406,
    Creating409,
    Updating409,
    UnsupportedMediaType415,
    UnprocessableEntity422,
    TooManyRequests429,
    BadRequest4XX,
    ServerError5XX,
}

impl DefaultResponse {
    pub fn as_str(&self) -> &'static str {
        match self {
            DefaultResponse::Deleting204 => "JsonApi:deletingOk",
            DefaultResponse::AttachingRelationship204 => "JsonApi:attachingRelationshipOk",
            DefaultResponse::DetachingRelationship204 => "JsonApi:detachingRelationshipOk",
            DefaultResponse::UpdatingRelationship204 => "JsonApi:updatingRelationshipOk",
            DefaultResponse::Creating403 => "JsonApi:creatingForbidden",
            DefaultResponse::Updating403 => "JsonApi:updatingForbidden",
            DefaultResponse::AttachingRelationship403 => "JsonApi:attachingRelationshipForbidden",
            DefaultResponse::DetachingRelationship403 => "JsonApi:detachingRelationshipForbidden",
            DefaultResponse::UpdatingRelationship403 => "JsonApi:updatingRelationshipForbidden",
            DefaultResponse::Creating404 => "JsonApi:creatingNotFound",
            DefaultResponse::Deleting404 => "JsonApi:deletingNotFound",
            DefaultResponse::Updating404 => "JsonApi:updatingNotFound",
            DefaultResponse::ViewingOne404 => "JsonApi:viewingOneNotFound",
            DefaultResponse::ViewingRelated404 => "JsonApi:viewingRelatedNotFound",
            DefaultResponse::ViewingRelationship404 => "JsonApi:viewingRelationshipNotFound",
            DefaultResponse::NotAcceptable406 => "JsonApi:notAcceptable",
            DefaultResponse::Creating409 => "JsonApi:creatingConflict",
            DefaultResponse::Updating409 => "JsonApi:updatingConflict",
            DefaultResponse::UnsupportedMediaType415 => "JsonApi:unsupportedMediaType",
            DefaultResponse::UnprocessableEntity422 => "JsonApi:unprocessableEntity",
            DefaultResponse::TooManyRequests429 => "JsonApi:tooManyRequests",
            DefaultResponse::BadRequest4XX => "JsonApi:badRequest",
            DefaultResponse::ServerError5XX => "JsonApi:serverError",
        }
    }

    /// Translation key of the description and the status code of the example
    fn source(&self) -> (&'static str, &'static str) {
        match self {
            DefaultResponse::Deleting204 => ("resource.actions.deleting.responses.204", "204"),
            DefaultResponse::AttachingRelationship204 => {
                ("resource.actions.attachingRelationship.responses.204", "204")
            }
            DefaultResponse::DetachingRelationship204 => {
                ("resource.actions.detachingRelationship.responses.204", "204")
            }
            DefaultResponse::UpdatingRelationship204 => {
                ("resource.actions.updatingRelationship.responses.204", "204")
            }
            DefaultResponse::Creating403 => ("resource.actions.creating.responses.403", "403"),
            DefaultResponse::Updating403 => ("resource.actions.updating.responses.403", "403"),
            DefaultResponse::AttachingRelationship403 => {
                ("resource.actions.attachingRelationship.responses.403", "403")
            }
            DefaultResponse::DetachingRelationship403 => {
                ("resource.actions.detachingRelationship.responses.403", "403")
            }
            DefaultResponse::UpdatingRelationship403 => {
                ("resource.actions.updatingRelationship.responses.403", "403")
            }
            DefaultResponse::Creating404 => ("resource.actions.creating.responses.404", "404"),
            DefaultResponse::Deleting404 => ("resource.actions.deleting.responses.404", "404"),
            DefaultResponse::Updating404 => ("resource.actions.updating.responses.404", "404"),
            DefaultResponse::ViewingOne404 => ("resource.actions.viewingOne.responses.404", "404"),
            DefaultResponse::ViewingRelated404 => {
                ("resource.actions.viewingRelated.responses.404", "404")
            }
            DefaultResponse::ViewingRelationship404 => {
                ("resource.actions.viewingRelationship.responses.404", "404")
            }
            DefaultResponse::NotAcceptable406 => ("responses.406", "406"),
            DefaultResponse::Creating409 => ("resource.actions.creating.responses.409", "409"),
            DefaultResponse::Updating409 => ("resource.actions.updating.responses.409", "409"),
            DefaultResponse::UnsupportedMediaType415 => ("responses.415", "415"),
            DefaultResponse::UnprocessableEntity422 => ("responses.422", "422"),
            DefaultResponse::TooManyRequests429 => ("responses.429", "429"),
            DefaultResponse::BadRequest4XX => ("responses.4XX", "4XX"),
            DefaultResponse::ServerError5XX => ("responses.5XX", "5XX"),
        }
    }

    const ALL: [DefaultResponse; 23] = [
        DefaultResponse::Deleting204,
        DefaultResponse::AttachingRelationship204,
        DefaultResponse::DetachingRelationship204,
        DefaultResponse::UpdatingRelationship204,
        DefaultResponse::Creating403,
        DefaultResponse::Updating403,
        DefaultResponse::AttachingRelationship403,
        DefaultResponse::DetachingRelationship403,
        DefaultResponse::UpdatingRelationship403,
        DefaultResponse::Creating404,
        DefaultResponse::Deleting404,
        DefaultResponse::Updating404,
        DefaultResponse::ViewingOne404,
        DefaultResponse::ViewingRelated404,
        DefaultResponse::ViewingRelationship404,
        DefaultResponse::NotAcceptable406,
        DefaultResponse::Creating409,
        DefaultResponse::Updating409,
        DefaultResponse::UnsupportedMediaType415,
        DefaultResponse::UnprocessableEntity422,
        DefaultResponse::TooManyRequests429,
        DefaultResponse::BadRequest4XX,
        DefaultResponse::ServerError5XX,
    ];
}

/// Names of the default headers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultHeader {
    XRateLimitLimit,
    XRateLimitRemaining,
}

impl DefaultHeader {
    pub fn as_str(&self) -> &'static str {
        match self {
            DefaultHeader::XRateLimitLimit => "X-Rate-Limit-Limit",
            DefaultHeader::XRateLimitRemaining => "X-Rate-Limit-Remaining",
        }
    }
}

pub const ACCEPT_HEADER_PARAMETER: &str = "JsonApi:acceptInHeader";
pub const FIELDS_PARAMETER: &str = "JsonApi:fieldsParameter";

/// Component registries of one build
#[derive(Debug)]
pub struct Components {
    pub schemas: Registry<Schema>,
    pub responses: Registry<Response>,
    pub parameters: Registry<Parameter>,
    pub examples: Registry<Example>,
    pub request_bodies: Registry<RequestBody>,
    pub headers: Registry<Header>,
    jsonapi_version: String,
    rate_limits: bool,
}

impl Components {
    pub fn new(settings: &ServerSettings) -> Self {
        Self {
            schemas: Registry::new(ComponentKind::Schemas),
            responses: Registry::new(ComponentKind::Responses),
            parameters: Registry::new(ComponentKind::Parameters),
            examples: Registry::new(ComponentKind::Examples),
            request_bodies: Registry::new(ComponentKind::RequestBodies),
            headers: Registry::new(ComponentKind::Headers),
            jsonapi_version: settings.jsonapi_version.clone(),
            rate_limits: settings.has_global_rate_limits,
        }
    }

    fn is_v1_1(&self) -> bool {
        self.jsonapi_version == "1.1"
    }

    /// Reference to a default schema
    pub fn schema_ref(&self, schema: DefaultSchema) -> Reference {
        self.schemas.reference(schema.as_str())
    }

    /// Same as [`Components::schema_ref`], wrapped for use as a property
    pub fn schema(&self, schema: DefaultSchema) -> SchemaOrRef {
        RefOr::Ref(self.schema_ref(schema))
    }

    /// Rate limit header references, when every route is rate limited
    pub fn rate_limit_headers(&self) -> Option<IndexMap<String, RefOr<Header>>> {
        if !self.rate_limits {
            return None;
        }

        Some(
            [DefaultHeader::XRateLimitLimit, DefaultHeader::XRateLimitRemaining]
                .iter()
                .map(|header| {
                    (
                        header.as_str().to_string(),
                        RefOr::Ref(self.headers.reference(header.as_str())),
                    )
                })
                .collect(),
        )
    }

    pub fn has_rate_limits(&self) -> bool {
        self.rate_limits
    }

    /// Error document response with the shared failure schema
    pub fn failure_response(&self, description: String, example: Value) -> Response {
        let mut content = IndexMap::new();
        content.insert(
            JSONAPI_MEDIA_TYPE.to_string(),
            MediaType {
                schema: Some(self.schema(DefaultSchema::Failure)),
                example: Some(example),
                examples: None,
            },
        );

        Response {
            description,
            headers: self.rate_limit_headers(),
            content: Some(content),
        }
    }

    /// Response carrying no body
    pub fn empty_response(&self, description: String) -> Response {
        Response {
            description,
            headers: self.rate_limit_headers(),
            content: None,
        }
    }

    /// Replace a response with a reference to the default it equals
    pub fn default_if_matching(
        &self,
        response: Response,
        default: DefaultResponse,
    ) -> RefOr<Response> {
        match self.responses.get_item(default.as_str()) {
            Some(registered) if registered == response => {
                RefOr::Ref(self.responses.reference(default.as_str()))
            }
            _ => RefOr::item(response),
        }
    }

    /// Register the JSON:API defaults
    pub fn init(&self, translator: &Translator<'_>, resource_id_format: Option<&str>) {
        self.init_parameters(translator);
        self.init_schemas(translator, resource_id_format);
        self.init_headers(translator);
        self.init_responses(translator);
    }

    fn init_parameters(&self, translator: &Translator<'_>) {
        let accept_schema = Schema {
            const_value: Some(json!(JSONAPI_MEDIA_TYPE)),
            default: Some(json!(JSONAPI_MEDIA_TYPE)),
            ..Schema::typed("string")
        };
        self.parameters.add(
            ACCEPT_HEADER_PARAMETER,
            Parameter {
                location: ParameterLocation::Header,
                ..Parameter::query("Accept", accept_schema)
                    .with_description(translator.translate("parameters.media-type"))
            },
        );

        let field_value = Schema::typed("string")
            .with_extension("x-additionalPropertiesName", json!("resource-type"));
        let fields_schema = Schema {
            additional_properties: Some(AdditionalProperties::Schema(Box::new(field_value.into()))),
            ..Schema::typed("object")
        };
        self.parameters.add(
            FIELDS_PARAMETER,
            Parameter {
                allow_empty_value: Some(false),
                allow_reserved: Some(true),
                style: Some("deepObject".to_string()),
                example: Some(json!({"resource-type": "field,anotherField"})),
                ..Parameter::query("fields", fields_schema)
                    .with_description(translator.translate("parameters.fields"))
            },
        );
    }

    fn init_schemas(&self, translator: &Translator<'_>, resource_id_format: Option<&str>) {
        let described = |schema_type: &str, key: &str| {
            Schema::typed(schema_type).with_description(translator.translate(key))
        };
        let string_array = || Schema::array(Schema::typed("string"));

        let mut jsonapi = Schema::object(IndexMap::new())
            .with_description(translator.translate("schema.jsonapi.description"))
            .with_additional_properties(false)
            .with_example(json!({"version": self.jsonapi_version}));
        jsonapi.insert_property(
            "version",
            Schema {
                const_value: Some(json!(self.jsonapi_version)),
                ..described("string", "schema.jsonapi.properties.version")
            },
        );
        jsonapi.insert_property("meta", self.schema(DefaultSchema::Meta));
        if self.is_v1_1() {
            jsonapi.insert_property(
                "ext",
                string_array().with_description(translator.translate("schema.jsonapi.properties.ext")),
            );
            jsonapi.insert_property(
                "profile",
                string_array()
                    .with_description(translator.translate("schema.jsonapi.properties.profile")),
            );
        }
        self.schemas.add(DefaultSchema::JsonApi.as_str(), jsonapi);

        let link_value = Schema {
            any_of: Some(vec![
                Schema {
                    format: Some("url".to_string()),
                    ..Schema::typed("string")
                }
                .into(),
                Schema::typed("null").into(),
                self.schema(DefaultSchema::LinkObject),
            ]),
            ..Default::default()
        }
        .with_extension("x-additionalPropertiesName", json!("linkKey"));
        self.schemas.add(
            DefaultSchema::Links.as_str(),
            Schema {
                additional_properties: Some(AdditionalProperties::Schema(Box::new(
                    link_value.into(),
                ))),
                ..described("object", "schema.links")
            },
        );

        let mut link_object = Schema::object(IndexMap::new())
            .with_description(translator.translate("schema.linkObject.description"))
            .with_required(vec!["href".to_string()])
            .with_additional_properties(false);
        link_object.insert_property(
            "href",
            Schema {
                format: Some("url".to_string()),
                ..described("string", "schema.linkObject.properties.href")
            },
        );
        if self.is_v1_1() {
            for property in ["rel", "describedBy", "title", "type"] {
                link_object.insert_property(
                    property,
                    described(
                        "string",
                        &format!("schema.linkObject.properties.{}", property),
                    ),
                );
            }
            link_object.insert_property(
                "hreflang",
                Schema::one_of(vec![Schema::typed("string").into(), string_array().into()])
                    .with_description(
                        translator.translate("schema.linkObject.properties.hreflang"),
                    ),
            );
        }
        link_object.insert_property("meta", self.schema(DefaultSchema::Meta));
        self.schemas.add(DefaultSchema::LinkObject.as_str(), link_object);

        self.schemas.add(
            DefaultSchema::Meta.as_str(),
            described("object", "schema.meta")
                .with_additional_properties(true)
                .with_extension("x-additionalPropertiesName", json!("metaKey")),
        );

        self.schemas.add(
            DefaultSchema::Id.as_str(),
            Schema {
                format: resource_id_format.map(str::to_string),
                ..described("string", "schema.resourceId")
            },
        );
        self.schemas.add(
            DefaultSchema::Type.as_str(),
            described("string", "schema.resourceType"),
        );

        self.schemas.add(
            DefaultSchema::Errors.as_str(),
            Schema {
                items: Some(Box::new(self.schema(DefaultSchema::Error))),
                ..described("array", "schema.errors")
            },
        );

        let mut failure = Schema::object(IndexMap::new())
            .with_required(vec!["errors".to_string(), "jsonapi".to_string()])
            .with_additional_properties(false);
        failure.insert_property("errors", self.schema(DefaultSchema::Errors));
        failure.insert_property("meta", self.schema(DefaultSchema::Meta));
        failure.insert_property("jsonapi", self.schema(DefaultSchema::JsonApi));
        self.schemas.add(DefaultSchema::Failure.as_str(), failure);

        let mut source = Schema::object(IndexMap::new())
            .with_description(translator.translate("schema.error.properties.source.description"));
        source.insert_property(
            "pointer",
            described("string", "schema.error.properties.source.pointer"),
        );
        source.insert_property(
            "parameter",
            described("string", "schema.error.properties.source.parameter"),
        );
        let mut error = Schema {
            min_properties: Some(1),
            ..Schema::object(IndexMap::new())
        }
        .with_description(translator.translate("schema.error.description"))
        .with_additional_properties(false);
        for property in ["id", "code", "detail", "status", "title"] {
            error.insert_property(
                property,
                described("string", &format!("schema.error.properties.{}", property)),
            );
        }
        error.insert_property("source", source);
        self.schemas.add(DefaultSchema::Error.as_str(), error);
    }

    fn init_headers(&self, translator: &Translator<'_>) {
        for (header, key, example) in [
            (DefaultHeader::XRateLimitLimit, "headers.xRateLimit.limit", 60),
            (
                DefaultHeader::XRateLimitRemaining,
                "headers.xRateLimit.remaining",
                59,
            ),
        ] {
            self.headers.add(
                header.as_str(),
                Header {
                    description: Some(translator.translate(key)),
                    required: None,
                    schema: Some(Schema::typed("integer").into()),
                    example: Some(json!(example)),
                },
            );
        }
    }

    fn init_responses(&self, translator: &Translator<'_>) {
        for default in DefaultResponse::ALL {
            let (key, code) = default.source();
            let description = translator.translate(&format!("{}.description", key));

            let mut response = if code == "204" {
                self.empty_response(description)
            } else {
                self.failure_response(
                    description,
                    translator.translate_value(&format!("responses.{}.example", code)),
                )
            };

            if default == DefaultResponse::TooManyRequests429 {
                let headers = response.headers.get_or_insert_with(IndexMap::new);
                for (name, key) in [
                    ("Retry-After", "headers.retryAfter"),
                    ("X-Rate-Limit-Reset", "headers.xRateLimit.reset"),
                ] {
                    headers.insert(
                        name.to_string(),
                        RefOr::item(Header {
                            description: Some(translator.translate(key)),
                            required: None,
                            schema: Some(Schema::typed("integer").into()),
                            example: None,
                        }),
                    );
                }
            }

            self.responses.add(default.as_str(), response);
        }
    }

    /// The registered components, each section sorted by name
    pub fn build(&self) -> OpenApiComponents {
        OpenApiComponents {
            schemas: self.schemas.build(),
            responses: self.responses.build(),
            parameters: self.parameters.build(),
            examples: self.examples.build(),
            request_bodies: self.request_bodies.build(),
            headers: self.headers.build(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonapi_openapi_common::TranslationSource;

    struct NoLines;

    impl TranslationSource for NoLines {
        fn line(&self, _key: &str) -> Option<Value> {
            None
        }
    }

    fn init(settings: &ServerSettings) -> Components {
        let translator = Translator::new(&NoLines, settings);
        let components = Components::new(settings);
        components.init(&translator, settings.resource_id_format.as_deref());
        components
    }

    #[test]
    fn test_init_registers_defaults() {
        let components = init(&ServerSettings::new("v1"));

        assert!(components.schemas.has("JsonApi:failure"));
        assert!(components.parameters.has(ACCEPT_HEADER_PARAMETER));
        assert_eq!(components.responses.len(), 23);
        assert_eq!(components.headers.len(), 2);

        let jsonapi = components.schemas.get_item("JsonApi:jsonapi").unwrap();
        let properties = jsonapi.properties.unwrap();
        assert!(!properties.contains_key("ext"));
    }

    #[test]
    fn test_version_1_1_extends_schemas() {
        let mut settings = ServerSettings::new("v1");
        settings.jsonapi_version = "1.1".to_string();
        let components = init(&settings);

        let link_object = components.schemas.get_item("JsonApi:linkObject").unwrap();
        let keys: Vec<_> = link_object.properties.unwrap().into_keys().collect();
        assert_eq!(
            keys,
            vec!["href", "rel", "describedBy", "title", "type", "hreflang", "meta"]
        );
    }

    #[test]
    fn test_rate_limit_headers_only_when_global() {
        let components = init(&ServerSettings::new("v1"));
        assert!(components.rate_limit_headers().is_none());
        let deleting = components.responses.get_item("JsonApi:deletingOk").unwrap();
        assert_eq!(
            serde_json::to_value(deleting).unwrap(),
            json!({"description": "resource.actions.deleting.responses.204.description"})
        );

        let mut settings = ServerSettings::new("v1");
        settings.has_global_rate_limits = true;
        let components = init(&settings);
        let limited = components.responses.get_item("JsonApi:tooManyRequests").unwrap();
        let headers: Vec<_> = limited.headers.unwrap().into_keys().collect();
        assert_eq!(
            headers,
            vec![
                "X-Rate-Limit-Limit",
                "X-Rate-Limit-Remaining",
                "Retry-After",
                "X-Rate-Limit-Reset"
            ]
        );
    }

    #[test]
    fn test_default_if_matching() {
        let components = init(&ServerSettings::new("v1"));
        let same = components.empty_response(
            "resource.actions.deleting.responses.204.description".to_string(),
        );
        assert!(components
            .default_if_matching(same, DefaultResponse::Deleting204)
            .is_ref());

        let other = components.empty_response("Gone".to_string());
        assert!(!components
            .default_if_matching(other, DefaultResponse::Deleting204)
            .is_ref());
    }

    #[test]
    fn test_resource_id_format() {
        let mut settings = ServerSettings::new("v1");
        settings.resource_id_format = Some("uuid".to_string());
        let components = init(&settings);
        let id = components.schemas.get_item("JsonApi:resourceId").unwrap();
        assert_eq!(id.format.as_deref(), Some("uuid"));
    }
}
