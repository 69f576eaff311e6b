//! End-to-end document generation from a server manifest

use jsonapi_openapi_common::openapi::OpenApi;
use jsonapi_openapi_common::{ActionKind, ActionOverride, GeneratorError, Result};
use jsonapi_openapi_generator::{Generator, OutputFormat};
use jsonapi_openapi_parser::{FixtureFactory, ManifestServer, ServerManifest, TranslationCatalog};
use serde_json::{json, Value};
use tempfile::TempDir;

const BLOG: &str = include_str!("fixtures/blog.yaml");
const MEDIA_TYPE: &str = "application/vnd.api+json";

fn collaborators() -> (ManifestServer, TranslationCatalog, FixtureFactory) {
    let manifest = ServerManifest::from_yaml(BLOG).unwrap();
    (
        manifest.server("v1").unwrap(),
        manifest.translations().unwrap(),
        manifest.fixtures("v1").unwrap(),
    )
}

fn generate() -> Value {
    let (server, translations, factory) = collaborators();
    let document = Generator::new(&server, &translations, &factory)
        .document()
        .unwrap();
    serde_json::to_value(&document).unwrap()
}

fn parameter_names(parameters: &Value) -> Vec<&str> {
    parameters
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|parameter| parameter["name"].as_str())
        .collect()
}

#[test]
fn test_document_header() {
    let document = generate();

    assert_eq!(document["openapi"], "3.1.0");
    assert_eq!(document["info"]["title"], "Blog API");
    assert_eq!(document["info"]["version"], "1.0");
}

#[test]
fn test_paths_are_sorted_and_unbuildable_routes_dropped() {
    let document = generate();
    let paths: Vec<&str> = document["paths"]
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();

    // `/tags` has no resource schema, `/admin/users` belongs to another server
    assert_eq!(
        paths,
        vec![
            "/articles",
            "/articles/{article}",
            "/articles/{article}/comments",
            "/articles/{article}/relationships/comments",
            "/comments/{comment}",
        ]
    );
}

#[test]
fn test_article_resource_schema() {
    let document = generate();
    let article = &document["components"]["schemas"]["Article"];

    assert_eq!(article["type"], "object");
    assert_eq!(
        article["required"],
        json!(["id", "type", "attributes", "relationships"])
    );
    assert!(article["properties"]["relationships"]["properties"]["comments"].is_object());

    let title = &article["properties"]["attributes"]["properties"]["title"];
    assert_eq!(title["type"], "string");
    assert_eq!(title["maxLength"], 255);

    assert_eq!(article["properties"]["type"]["const"], "articles");
}

#[test]
fn test_declared_fields_survive_sparse_examples() {
    let manifest = ServerManifest::from_yaml(BLOG).unwrap();
    let server = manifest.server("v1").unwrap();
    let translations = manifest.translations().unwrap();
    let records = serde_yaml::from_str(
        r#"
articles:
  - id: 1
    attributes: { title: "Sparse" }
"#,
    )
    .unwrap();
    // Records are not completed against the schemas here
    let factory = FixtureFactory::new("https://example.com/api/v1", records);

    let document = Generator::new(&server, &translations, &factory)
        .document()
        .unwrap();
    let document = serde_json::to_value(&document).unwrap();
    let article = &document["components"]["schemas"]["Article"];

    assert!(article["properties"]["attributes"]["properties"]["publishedAt"].is_object());
    assert!(article["properties"]["relationships"]["properties"]["comments"].is_object());
}

#[test]
fn test_index_lists_articles() {
    let document = generate();
    let index = &document["paths"]["/articles"]["get"];

    assert_eq!(index["operationId"], "v1.articles.index");
    assert_eq!(index["summary"], "Get all Articles");
    assert_eq!(index["tags"], json!(["Articles"]));

    let body = &index["responses"]["200"]["content"][MEDIA_TYPE];
    let data = &body["schema"]["properties"]["data"];
    assert_eq!(data["type"], "array");
    assert_eq!(data["items"]["$ref"], "#/components/schemas/Article");

    // Default pagination of two articles per page
    let example = &body["example"];
    assert_eq!(example["data"].as_array().unwrap().len(), 2);
    assert_eq!(example["jsonapi"]["version"], "1.0");
}

#[test]
fn test_index_query_parameters() {
    let document = generate();
    let parameters = &document["paths"]["/articles"]["get"]["parameters"];
    let names = parameter_names(parameters);

    assert!(names.contains(&"sort"));
    assert!(names.contains(&"include"));
    assert!(names.contains(&"page[number]"));
    assert!(names.contains(&"page[size]"));

    let sort = parameters
        .as_array()
        .unwrap()
        .iter()
        .find(|parameter| parameter["name"] == "sort")
        .unwrap();
    assert_eq!(
        sort["schema"]["items"]["enum"],
        json!(["title", "-title", "publishedAt", "-publishedAt"])
    );
}

#[test]
fn test_single_resource_path() {
    let document = generate();
    let path = &document["paths"]["/articles/{article}"];

    let methods: Vec<&str> = path
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .filter(|key| *key != "parameters")
        .collect();
    assert_eq!(methods, vec!["delete", "get", "patch"]);

    assert_eq!(
        path["parameters"][0]["$ref"],
        "#/components/parameters/JsonApi:acceptInHeader"
    );
    assert_eq!(
        path["parameters"][1]["$ref"],
        "#/components/parameters/article_Id"
    );
    let id = &document["components"]["parameters"]["article_Id"];
    assert_eq!(id["in"], "path");
    assert_eq!(id["required"], true);
    assert_eq!(id["example"], "1");

    assert!(path["get"]["responses"]["200"].is_object());
    assert!(path["get"]["responses"]["404"].is_object());
    assert!(path["delete"]["responses"]["204"].is_object());
    assert!(path["patch"]["requestBody"].is_object());
}

#[test]
fn test_create_request_body_is_compiled_from_rules() {
    let document = generate();
    let store = &document["paths"]["/articles"]["post"];

    assert!(store["responses"]["201"].is_object());
    assert_eq!(store["requestBody"]["required"], true);

    let schema = &store["requestBody"]["content"][MEDIA_TYPE]["schema"];
    let data_ref = schema["properties"]["data"]["$ref"].as_str().unwrap();
    let data_name = data_ref.rsplit('/').next().unwrap();
    let data = &document["components"]["schemas"][data_name];

    let attributes = &data["properties"]["attributes"];
    assert_eq!(attributes["required"], json!(["title"]));
    assert_eq!(attributes["properties"]["title"]["maxLength"], 255);
    assert!(
        attributes["properties"].get("publishedAt").is_none(),
        "read-only attributes are not accepted"
    );
}

#[test]
fn test_relationship_routes() {
    let document = generate();

    let related = &document["paths"]["/articles/{article}/comments"]["get"];
    let related_schema = &related["responses"]["200"]["content"][MEDIA_TYPE]["schema"];
    assert_eq!(related_schema["required"], json!(["data"]));
    assert_eq!(related_schema["properties"]["data"]["type"], "array");

    let relationship = &document["paths"]["/articles/{article}/relationships/comments"];
    assert!(relationship["get"]["responses"]["200"].is_object());
    assert!(relationship["post"]["responses"]["204"].is_object());
    assert!(relationship["post"]["requestBody"].is_object());
}

/// Document with `response_codes` declared on one route
fn with_response_codes(route_name: &'static str, kind: ActionKind, codes: &[u16]) -> Result<OpenApi> {
    let (server, translations, factory) = collaborators();
    let codes = codes.to_vec();
    let document = Generator::new(&server, &translations, &factory)
        .with_route_resolver(move |routes| {
            routes
                .into_iter()
                .map(|mut route| {
                    if route.name == route_name {
                        route.action_override = Some(ActionOverride {
                            kind,
                            resource_type: None,
                            response_codes: Some(codes.clone()),
                            return_resource_type: None,
                        });
                    }
                    route
                })
                .collect()
        })
        .document();
    document
}

#[test]
fn test_accepted_and_no_content_write_responses() {
    let document = with_response_codes("v1.articles.store", ActionKind::Create, &[202, 204]).unwrap();
    let document = serde_json::to_value(&document).unwrap();
    let responses = &document["paths"]["/articles"]["post"]["responses"];

    assert!(responses.get("201").is_none());
    assert!(responses["202"]["content"].is_null());
    assert!(responses["204"]["content"].is_null());
    assert!(responses["202"]["description"].is_string());
    assert!(responses["409"].is_object());

    let document =
        with_response_codes("v1.articles.update", ActionKind::Update, &[200, 204]).unwrap();
    let document = serde_json::to_value(&document).unwrap();
    let responses = &document["paths"]["/articles/{article}"]["patch"]["responses"];
    assert!(responses["200"]["content"][MEDIA_TYPE].is_object());
    assert!(responses["204"].is_object());
}

#[test]
fn test_unpermitted_response_code_is_fatal() {
    let err = with_response_codes("v1.articles.store", ActionKind::Create, &[200]).unwrap_err();
    match err {
        GeneratorError::Configuration(message) => assert!(message.contains("v1.articles.store")),
        other => panic!("Expected a configuration error, got {:?}", other),
    }
}

#[test]
fn test_tags_are_sorted() {
    let document = generate();
    let names: Vec<&str> = document["tags"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|tag| tag["name"].as_str())
        .collect();

    assert_eq!(names, vec!["Articles", "Comments", "Resources"]);
}

#[test]
fn test_generation_is_deterministic() {
    let (server, translations, factory) = collaborators();
    let generator = Generator::new(&server, &translations, &factory);

    let first = generator.generate(OutputFormat::Json).unwrap();
    let second = generator.generate(OutputFormat::Json).unwrap();
    assert_eq!(first, second);
    assert_eq!(factory.handed_out("articles"), 0);
}

#[test]
fn test_route_resolver_filters_routes() {
    let (server, translations, factory) = collaborators();
    let document = Generator::new(&server, &translations, &factory)
        .with_route_resolver(|routes| {
            routes
                .into_iter()
                .filter(|route| !route.uri.starts_with("comments"))
                .collect()
        })
        .document()
        .unwrap();

    assert!(document.paths.contains_key("/articles"));
    assert!(!document.paths.contains_key("/comments/{comment}"));
}

#[test]
fn test_yaml_output() {
    let (server, translations, factory) = collaborators();
    let yaml = Generator::new(&server, &translations, &factory)
        .generate(OutputFormat::Yaml)
        .unwrap();

    assert!(yaml.starts_with("openapi:"));
    assert!(yaml.contains("3.1.0"));
    assert!(yaml.contains("/articles:"));
}

#[test]
fn test_write_creates_the_file() {
    let (server, translations, factory) = collaborators();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("docs").join("v1.json");

    Generator::new(&server, &translations, &factory)
        .write(&path, OutputFormat::Json)
        .unwrap();

    let written: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written["openapi"], "3.1.0");
    assert!(written["paths"]["/articles"].is_object());
}

#[test]
fn test_write_failure_is_fatal() {
    let (server, translations, factory) = collaborators();
    let dir = TempDir::new().unwrap();

    let err = Generator::new(&server, &translations, &factory)
        .write(dir.path(), OutputFormat::Json)
        .unwrap_err();

    match err {
        GeneratorError::Write { path, .. } => assert_eq!(path, dir.path()),
        other => panic!("Expected a write error, got {:?}", other),
    }
}
