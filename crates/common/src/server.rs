//! Collaborator interfaces
//!
//! The generator reads the host application through these traits: the
//! server (routes, resource schemas, validation rules), the translation
//! backend and the example resource factory.

use crate::example::ExampleResource;
use crate::openapi::{Contact, License};
use crate::resource::ResourceSchema;
use crate::route::RouteDefinition;
use crate::rules::RuleList;
use crate::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Settings of a JSON:API server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Server name (e.g., "v1")
    #[serde(default)]
    pub name: String,

    /// JSON:API version implemented by the server
    #[serde(default = "default_jsonapi_version")]
    pub jsonapi_version: String,

    /// Application name, available to translations as `:app`
    #[serde(default)]
    pub app_name: Option<String>,

    /// Base URL links are built from
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Whether every route is subject to rate limiting
    #[serde(default)]
    pub has_global_rate_limits: bool,

    /// Format of the shared resource identifier schema
    #[serde(default)]
    pub resource_id_format: Option<String>,

    /// Overrides for the document's info section
    #[serde(default)]
    pub info: Option<InfoOverride>,
}

fn default_jsonapi_version() -> String {
    "1.0".to_string()
}

fn default_base_url() -> String {
    "http://localhost".to_string()
}

impl ServerSettings {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            jsonapi_version: default_jsonapi_version(),
            app_name: None,
            base_url: default_base_url(),
            has_global_rate_limits: false,
            resource_id_format: None,
            info: None,
        }
    }
}

/// Info section overrides declared by a server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InfoOverride {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub terms_of_service: Option<String>,

    #[serde(default)]
    pub contact: Option<Contact>,

    #[serde(default)]
    pub license: Option<License>,
}

/// Which request class validates a simulated request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryKind {
    /// Query parameters of a fetch-many request
    QueryMany,
    /// Query parameters of a fetch-one request
    QueryOne,
    /// Resource document of a create or update request
    Resource,
}

/// Request synthesized for a route so the server can resolve its rules
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedRequest {
    pub route_name: String,
    pub method: String,
    pub url: String,
    pub resource_type: String,
    pub kind: QueryKind,
    pub body: Option<Value>,
}

/// The JSON:API server being documented
pub trait ServerSource {
    fn settings(&self) -> &ServerSettings;

    /// Every route registered with the application, in registration order
    fn routes(&self) -> Vec<RouteDefinition>;

    /// Resource schema registered for a type
    fn schema_for(&self, resource_type: &str) -> Option<&ResourceSchema>;

    /// Validation rules that apply to a simulated request
    fn validation_rules(&self, request: &SimulatedRequest) -> Option<IndexMap<String, RuleList>>;

    fn name(&self) -> &str {
        &self.settings().name
    }
}

/// Namespace of the package's own translation lines
pub const PACKAGE_NAMESPACE: &str = "jsonapi-openapi";

/// Translation backend
pub trait TranslationSource {
    /// Raw line stored under a fully qualified key, if any
    fn line(&self, key: &str) -> Option<Value>;
}

/// Example resource factory
///
/// Creation happens inside a sandbox opened by [`ResourceFactory::begin`];
/// [`ResourceFactory::rollback`] discards everything created since.
pub trait ResourceFactory {
    fn begin(&self) -> Result<()>;

    /// Materialize up to `count` example resources of a type
    fn create(&self, resource_type: &str, count: usize) -> Result<Vec<ExampleResource>>;

    fn rollback(&self);
}
