//! Integration tests for manifest loading

use jsonapi_openapi_common::{GeneratorError, ResourceFactory, ServerSource, TranslationSource};
use jsonapi_openapi_parser::ServerManifest;
use serde_json::json;
use std::fs;
use tempfile::TempDir;

const YAML: &str = r#"
servers:
  v1:
    jsonapi_version: "1.1"
    base_url: https://example.com/api/v1
    has_global_rate_limits: true
    schemas:
      - type: posts
        attributes:
          - name: title
            kind: string
    routes:
      - name: v1.posts.index
        methods: [GET]
        uri: posts
        action: index
        parameters:
          resource_type: posts
    fixtures:
      posts:
        - id: 10
          attributes: { title: "First" }
translations:
  jsonapi:
    resources:
      posts:
        tag:
          name: "Blog Posts"
"#;

#[test]
fn test_load_yaml_manifest_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("jsonapi-openapi.yaml");
    fs::write(&path, YAML).unwrap();

    let manifest = ServerManifest::from_file(&path).unwrap();
    assert_eq!(manifest.server_names(), vec!["v1"]);

    let server = manifest.server("v1").unwrap();
    let settings = server.settings();
    assert_eq!(settings.name, "v1");
    assert_eq!(settings.jsonapi_version, "1.1");
    assert!(settings.has_global_rate_limits);
    assert_eq!(server.resource_types(), vec!["posts"]);
}

#[test]
fn test_load_json_manifest_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("manifest.json");
    let manifest = json!({
        "servers": {
            "admin": {
                "schemas": [{ "type": "users" }],
                "routes": []
            }
        }
    });
    fs::write(&path, manifest.to_string()).unwrap();

    let manifest = ServerManifest::from_file(&path).unwrap();
    let server = manifest.server("admin").unwrap();
    assert_eq!(server.settings().base_url, "http://localhost");
    assert!(server.schema_for("users").is_some());
}

#[test]
fn test_missing_file_is_parse_error() {
    let dir = TempDir::new().unwrap();
    let err = ServerManifest::from_file(dir.path().join("missing.yaml")).unwrap_err();
    assert!(matches!(err, GeneratorError::Parse(_)));
}

#[test]
fn test_translations_override_defaults() {
    let manifest = ServerManifest::from_yaml(YAML).unwrap();
    let catalog = manifest.translations().unwrap();

    assert_eq!(
        catalog.line("jsonapi.resources.posts.tag.name"),
        Some(json!("Blog Posts"))
    );
    assert_eq!(
        catalog.line("jsonapi-openapi::tags.jsonapi-resource.name"),
        Some(json!("Resources"))
    );
}

#[test]
fn test_fixtures_follow_the_server_base_url() {
    let manifest = ServerManifest::from_yaml(YAML).unwrap();
    let factory = manifest.fixtures("v1").unwrap();

    factory.begin().unwrap();
    let posts = factory.create("posts", 3).unwrap();
    factory.rollback();

    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].id, "10");
    assert_eq!(
        posts[0].links["self"].href(),
        "https://example.com/api/v1/posts/10"
    );
}
