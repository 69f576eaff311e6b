//! Route classification and pagination descriptors

use jsonapi_openapi_common::{
    ActionKind, ActionOverride, ResourceSchema, RouteDefinition, RouteParameters, ServerSettings,
};
use jsonapi_openapi_generator::pagination::Paginator;
use jsonapi_openapi_generator::resource_schema::ResourceSchemaFactory;
use jsonapi_openapi_generator::{BuildContext, ResourceAction, RouteDescriptor};
use jsonapi_openapi_parser::{FixtureFactory, ManifestServer, TranslationCatalog};
use serde_json::json;

fn schema(yaml: &str) -> ResourceSchema {
    serde_yaml::from_str(yaml).unwrap()
}

fn things() -> ResourceSchema {
    schema(
        r#"
type: things
relationships:
  - name: tags
    cardinality: to_many
    inverse: tags
pagination:
  kind: page
  meta_key: ~
"#,
    )
}

fn route(method: &str, uri: &str, id: bool, relationship: Option<&str>) -> RouteDefinition {
    RouteDefinition {
        name: format!("v1.{}", uri.replace('/', ".")),
        methods: vec![method.to_string()],
        uri: uri.to_string(),
        controller: None,
        action: None,
        parameters: RouteParameters {
            resource_type: Some("things".to_string()),
            resource_id_name: id.then(|| "thing".to_string()),
            resource_relationship: relationship.map(str::to_string),
        },
        action_override: None,
        rules: None,
        examples: Default::default(),
        request_examples: Default::default(),
    }
}

fn server(schemas: Vec<ResourceSchema>) -> ManifestServer {
    ManifestServer::new(ServerSettings::new("v1"), schemas, Vec::new())
}

fn classify(definition: RouteDefinition) -> Option<ResourceAction> {
    let server = server(vec![things()]);
    let translations = TranslationCatalog::new();
    let factory = FixtureFactory::new("http://localhost", Default::default());
    let ctx = BuildContext::new(&server, &translations, &factory);
    RouteDescriptor::new(&ctx, definition).action()
}

#[test]
fn test_fetch_routes() {
    assert_eq!(
        classify(route("GET", "things", false, None)),
        Some(ResourceAction::ViewingAny)
    );
    assert_eq!(
        classify(route("GET", "things/{thing}", true, None)),
        Some(ResourceAction::ViewingOne)
    );
}

#[test]
fn test_write_routes() {
    assert_eq!(
        classify(route("POST", "things", false, None)),
        Some(ResourceAction::Creating)
    );
    assert_eq!(
        classify(route("PATCH", "things/{thing}", true, None)),
        Some(ResourceAction::Updating)
    );
    assert_eq!(
        classify(route("DELETE", "things/{thing}", true, None)),
        Some(ResourceAction::Deleting)
    );
}

#[test]
fn test_relation_routes() {
    assert_eq!(
        classify(route("GET", "things/{thing}/tags", true, Some("tags"))),
        Some(ResourceAction::ViewingRelated)
    );
    assert_eq!(
        classify(route(
            "GET",
            "things/{thing}/relationships/tags",
            true,
            Some("tags")
        )),
        Some(ResourceAction::ViewingRelationship)
    );
    assert_eq!(
        classify(route(
            "POST",
            "things/{thing}/relationships/tags",
            true,
            Some("tags")
        )),
        Some(ResourceAction::AttachingRelationship)
    );
    assert_eq!(
        classify(route(
            "DELETE",
            "things/{thing}/relationships/tags",
            true,
            Some("tags")
        )),
        Some(ResourceAction::DetachingRelationship)
    );
    assert_eq!(
        classify(route(
            "PATCH",
            "things/{thing}/relationships/tags",
            true,
            Some("tags")
        )),
        Some(ResourceAction::UpdatingRelationship)
    );
}

#[test]
fn test_unmatched_route() {
    assert_eq!(classify(route("OPTIONS", "things", false, None)), None);
}

#[test]
fn test_action_override_wins() {
    let mut definition = route("POST", "things/search", false, None);
    definition.action_override = Some(ActionOverride {
        kind: ActionKind::FetchMany,
        resource_type: None,
        response_codes: None,
        return_resource_type: None,
    });
    assert_eq!(classify(definition), Some(ResourceAction::ViewingAny));
}

#[test]
fn test_relation_route_serves_the_inverse_type() {
    let server = server(vec![things()]);
    let translations = TranslationCatalog::new();
    let factory = FixtureFactory::new("http://localhost", Default::default());
    let ctx = BuildContext::new(&server, &translations, &factory);

    let related = RouteDescriptor::new(&ctx, route("GET", "things/{thing}/tags", true, Some("tags")));
    assert_eq!(related.resource_type(), Some("tags"));
    assert_eq!(related.route_resource_type(), Some("things"));
    assert!(related.is_fetching_many());
    assert_eq!(related.uri(), "/things/{thing}/tags");
}

fn page_meta(schema: ResourceSchema) -> serde_json::Value {
    let server = server(vec![schema]);
    let translations = TranslationCatalog::new();
    let factory = FixtureFactory::new("http://localhost", Default::default());
    let ctx = BuildContext::new(&server, &translations, &factory);

    let descriptor = RouteDescriptor::new(&ctx, route("GET", "things", false, None));
    let paginator = descriptor.paginator().unwrap();
    assert!(matches!(paginator, Paginator::Page(_)));
    serde_json::to_value(paginator.meta(&descriptor)).unwrap()
}

#[test]
fn test_non_default_page_meta_is_optional() {
    let meta = page_meta(things());
    assert!(meta.get("required").is_none());
    assert_eq!(meta["properties"]["perPage"]["example"], 15);
}

#[test]
fn test_default_page_meta_is_required() {
    let mut schema = things();
    schema.default_pagination.insert("size".to_string(), json!(10));

    let meta = page_meta(schema);
    assert_eq!(
        meta["required"],
        json!(["currentPage", "from", "lastPage", "perPage", "to", "total"])
    );
    assert_eq!(meta["properties"]["perPage"]["example"], 10);
}

#[test]
fn test_relationship_routes_are_not_paginated() {
    let server = server(vec![things()]);
    let translations = TranslationCatalog::new();
    let factory = FixtureFactory::new("http://localhost", Default::default());
    let ctx = BuildContext::new(&server, &translations, &factory);

    let descriptor = RouteDescriptor::new(
        &ctx,
        route("GET", "things/{thing}/relationships/tags", true, Some("tags")),
    );
    assert!(descriptor.paginator().is_none());
}

fn with_index_route<T>(schema: ResourceSchema, check: impl FnOnce(&RouteDescriptor<'_>) -> T) -> T {
    let server = server(vec![schema]);
    let translations = TranslationCatalog::new();
    let factory = FixtureFactory::new("http://localhost", Default::default());
    let ctx = BuildContext::new(&server, &translations, &factory);

    let descriptor = RouteDescriptor::new(&ctx, route("GET", "things", false, None));
    check(&descriptor)
}

fn paginated(pagination: &str) -> ResourceSchema {
    schema(&format!("type: things\npagination:\n{}", pagination))
}

fn property_names(schema: &serde_json::Value) -> Vec<String> {
    schema["properties"]
        .as_object()
        .unwrap()
        .keys()
        .cloned()
        .collect()
}

#[test]
fn test_cursor_links_have_no_last_page() {
    let links = with_index_route(paginated("  kind: cursor"), |descriptor| {
        serde_json::to_value(descriptor.paginator().unwrap().links(descriptor)).unwrap()
    });

    assert_eq!(links["allOf"][0]["$ref"], "#/components/schemas/JsonApi:links");
    assert_eq!(property_names(&links["allOf"][1]), vec!["first", "prev", "next"]);
    assert_eq!(
        links["allOf"][1]["properties"]["first"]["example"],
        "http://localhost/things?page[limit]=15"
    );
}

#[test]
fn test_cursor_meta_nests_under_the_meta_key() {
    let meta = with_index_route(paginated("  kind: cursor"), |descriptor| {
        serde_json::to_value(descriptor.paginator().unwrap().meta(descriptor)).unwrap()
    });

    let page = &meta["properties"]["page"];
    assert_eq!(
        property_names(page),
        vec!["from", "hasMore", "perPage", "to", "total"]
    );
    assert_eq!(page["properties"]["hasMore"]["type"], "boolean");
    assert_eq!(
        page["required"],
        json!(["from", "hasMore", "perPage", "to", "total"])
    );
    // Not paginated by default, so the nested object itself is optional
    assert!(meta.get("required").is_none());
}

#[test]
fn test_meta_case_transforms_keys() {
    let snake = with_index_route(
        paginated("  kind: page\n  meta_key: ~\n  meta_case: snake"),
        |descriptor| serde_json::to_value(descriptor.paginator().unwrap().meta(descriptor)).unwrap(),
    );
    assert_eq!(
        property_names(&snake),
        vec!["current_page", "from", "last_page", "per_page", "to", "total"]
    );

    let dash = with_index_route(
        paginated("  kind: page\n  meta_key: ~\n  meta_case: dash"),
        |descriptor| serde_json::to_value(descriptor.paginator().unwrap().meta(descriptor)).unwrap(),
    );
    assert_eq!(
        property_names(&dash),
        vec!["current-page", "from", "last-page", "per-page", "to", "total"]
    );
}

#[test]
fn test_default_meta_key_is_required_when_paginating_by_default() {
    let mut schema = paginated("  kind: page");
    schema.default_pagination.insert("size".to_string(), json!(5));

    let meta = with_index_route(schema, |descriptor| {
        serde_json::to_value(descriptor.paginator().unwrap().meta(descriptor)).unwrap()
    });
    assert_eq!(meta["required"], json!(["page"]));
    assert_eq!(meta["properties"]["page"]["properties"]["perPage"]["example"], 5);
}

fn multi() -> ResourceSchema {
    paginated("  kind: multi\n  paginators:\n    - kind: page\n    - kind: cursor")
}

#[test]
fn test_multi_is_default_when_any_member_is() {
    assert!(!with_index_route(multi(), |descriptor| {
        descriptor.paginator().unwrap().is_default(descriptor)
    }));

    let mut schema = multi();
    schema.default_pagination.insert("limit".to_string(), json!(5));
    with_index_route(schema, |descriptor| {
        let paginator = descriptor.paginator().unwrap();
        assert!(paginator.is_default(descriptor));
        assert_eq!(paginator.default_per_page(descriptor), 5);
    });
}

#[test]
fn test_multi_concatenates_members() {
    with_index_route(multi(), |descriptor| {
        let paginator = descriptor.paginator().unwrap();
        assert!(matches!(&paginator, Paginator::Multi(members) if members.len() == 2));

        let names: Vec<String> = paginator
            .parameters(descriptor)
            .into_iter()
            .map(|parameter| parameter.name)
            .collect();
        assert_eq!(
            names,
            vec!["page[size]", "page[number]", "page[limit]", "page[before]", "page[after]"]
        );

        let links = serde_json::to_value(paginator.links(descriptor)).unwrap();
        assert_eq!(links["allOf"].as_array().unwrap().len(), 2);
        assert_eq!(property_names(&links["allOf"][0]["allOf"][1])[1], "last");

        let meta = serde_json::to_value(paginator.meta(descriptor)).unwrap();
        let members = meta["allOf"].as_array().unwrap();
        assert_eq!(members.len(), 2);
        assert!(members[0]["properties"]["page"]["properties"]["currentPage"].is_object());
        assert!(members[1]["properties"]["page"]["properties"]["hasMore"].is_object());
    });
}

#[test]
fn test_resource_schema_is_registered_once() {
    let server = server(vec![things()]);
    let translations = TranslationCatalog::new();
    let factory = FixtureFactory::new("http://localhost", Default::default());
    let ctx = BuildContext::new(&server, &translations, &factory);
    let descriptor = RouteDescriptor::new(&ctx, route("GET", "things", false, None));
    let schemas = ResourceSchemaFactory::new(&descriptor);

    let first = serde_json::to_value(schemas.resource("things").unwrap()).unwrap();
    let registered = ctx.components().schemas.len();
    let second = serde_json::to_value(schemas.resource("things").unwrap()).unwrap();

    assert_eq!(first, json!({"$ref": "#/components/schemas/Thing"}));
    assert_eq!(first, second);
    assert_eq!(ctx.components().schemas.len(), registered);
    assert!(ctx.components().schemas.has("Thing"));
}
