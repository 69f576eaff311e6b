//! Server manifest loading
//!
//! A manifest describes one or more JSON:API servers of an application:
//! their settings, resource schemas, routes and example fixtures, plus the
//! application's translation overrides.

use crate::catalog::TranslationCatalog;
use crate::fixtures::{FixtureFactory, FixtureRecord};
use indexmap::IndexMap;
use jsonapi_openapi_common::{
    GeneratorError, QueryKind, ResourceSchema, Result, RouteDefinition, RuleList, ServerSettings,
    ServerSource, SimulatedRequest,
};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Root of a manifest file
#[derive(Debug, Clone, Deserialize)]
pub struct ServerManifest {
    /// Servers keyed by name
    #[serde(default)]
    pub servers: IndexMap<String, ServerEntry>,

    /// Translation overrides as a nested tree of lines
    #[serde(default)]
    pub translations: Option<serde_yaml::Value>,
}

/// One server declared in a manifest
#[derive(Debug, Clone, Deserialize)]
pub struct ServerEntry {
    #[serde(flatten)]
    pub settings: ServerSettings,

    #[serde(default)]
    pub schemas: Vec<ResourceSchema>,

    #[serde(default)]
    pub routes: Vec<RouteDefinition>,

    /// Example records keyed by resource type
    #[serde(default)]
    pub fixtures: IndexMap<String, Vec<FixtureRecord>>,
}

impl ServerManifest {
    /// Load a manifest from a YAML or JSON file, chosen by extension
    ///
    /// # Example
    /// ```rust,ignore
    /// let manifest = ServerManifest::from_file("jsonapi-openapi.yaml")?;
    /// let server = manifest.server("v1")?;
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            GeneratorError::Parse(format!(
                "Failed to read manifest file {}: {}",
                path.display(),
                e
            ))
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json(&content),
            _ => Self::from_yaml(&content),
        }
    }

    /// Parse a manifest from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| GeneratorError::Parse(format!("Failed to parse manifest YAML: {}", e)))
    }

    /// Parse a manifest from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| GeneratorError::Parse(format!("Failed to parse manifest JSON: {}", e)))
    }

    /// Names of the declared servers
    pub fn server_names(&self) -> Vec<&str> {
        self.servers.keys().map(String::as_str).collect()
    }

    /// Resolve a named server
    pub fn server(&self, name: &str) -> Result<ManifestServer> {
        let entry = self.servers.get(name).ok_or_else(|| {
            GeneratorError::Configuration(format!(
                "Server '{}' is not declared in the manifest (available: {})",
                name,
                self.server_names().join(", ")
            ))
        })?;

        let mut settings = entry.settings.clone();
        settings.name = name.to_string();

        Ok(ManifestServer {
            settings,
            schemas: entry
                .schemas
                .iter()
                .map(|schema| (schema.resource_type.clone(), schema.clone()))
                .collect(),
            routes: entry.routes.clone(),
        })
    }

    /// Override the base URL a server's links are built from
    pub fn set_base_url(&mut self, name: &str, base_url: &str) -> Result<()> {
        let entry = self.servers.get_mut(name).ok_or_else(|| {
            GeneratorError::Configuration(format!(
                "Server '{}' is not declared in the manifest",
                name
            ))
        })?;
        entry.settings.base_url = base_url.trim_end_matches('/').to_string();
        Ok(())
    }

    /// Fixture factory seeded with a server's example records
    pub fn fixtures(&self, name: &str) -> Result<FixtureFactory> {
        let server = self.server(name)?;
        let records = self
            .servers
            .get(name)
            .map(|entry| entry.fixtures.clone())
            .unwrap_or_default();

        Ok(FixtureFactory::new(&server.settings.base_url, records)
            .with_schemas(server.schemas.into_values()))
    }

    /// Translation catalogue with the manifest's overrides merged over the defaults
    pub fn translations(&self) -> Result<TranslationCatalog> {
        let mut catalog = TranslationCatalog::with_defaults()?;
        if let Some(translations) = &self.translations {
            catalog.merge_yaml_value(translations.clone())?;
        }
        Ok(catalog)
    }
}

/// A server resolved from a manifest
#[derive(Debug, Clone)]
pub struct ManifestServer {
    settings: ServerSettings,
    schemas: IndexMap<String, ResourceSchema>,
    routes: Vec<RouteDefinition>,
}

impl ManifestServer {
    pub fn new(
        settings: ServerSettings,
        schemas: Vec<ResourceSchema>,
        routes: Vec<RouteDefinition>,
    ) -> Self {
        Self {
            settings,
            schemas: schemas
                .into_iter()
                .map(|schema| (schema.resource_type.clone(), schema))
                .collect(),
            routes,
        }
    }

    pub fn resource_types(&self) -> Vec<&str> {
        self.schemas.keys().map(String::as_str).collect()
    }
}

impl ServerSource for ManifestServer {
    fn settings(&self) -> &ServerSettings {
        &self.settings
    }

    fn routes(&self) -> Vec<RouteDefinition> {
        self.routes.clone()
    }

    fn schema_for(&self, resource_type: &str) -> Option<&ResourceSchema> {
        self.schemas.get(resource_type)
    }

    fn validation_rules(&self, request: &SimulatedRequest) -> Option<IndexMap<String, RuleList>> {
        let route_rules = self
            .routes
            .iter()
            .find(|route| route.name == request.route_name)
            .and_then(|route| route.rules.as_ref());

        let rules = match route_rules {
            Some(rules) => rules,
            None => &self.schema_for(&request.resource_type)?.rules,
        };

        Some(match request.kind {
            QueryKind::Resource => rules.resource.clone(),
            QueryKind::QueryMany | QueryKind::QueryOne => rules.query.clone(),
        })
    }
}
