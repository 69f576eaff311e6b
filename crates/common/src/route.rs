//! Route definitions
//!
//! A route as the host application's router exposes it, plus the explicit
//! action metadata and examples that would otherwise be attached to the
//! route's handler.

use crate::resource::RequestRules;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One route of the host application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteDefinition {
    /// Route name (e.g., "v1.articles.index")
    pub name: String,

    /// HTTP methods the route answers
    pub methods: Vec<String>,

    /// URI template (e.g., "api/v1/articles/{article}")
    pub uri: String,

    /// Controller the route is bound to
    #[serde(default)]
    pub controller: Option<String>,

    /// Handler method name (e.g., "index", "showRelated"), `__invoke` for
    /// invokable controllers
    #[serde(default)]
    pub action: Option<String>,

    /// JSON:API route parameters
    #[serde(default)]
    pub parameters: RouteParameters,

    /// Explicit action metadata attached to the handler
    #[serde(default)]
    pub action_override: Option<ActionOverride>,

    /// Rules replacing the resource's rules for this route
    #[serde(default)]
    pub rules: Option<RequestRules>,

    /// Named response examples
    #[serde(default)]
    pub examples: IndexMap<String, Value>,

    /// Named request body examples
    #[serde(default)]
    pub request_examples: IndexMap<String, Value>,
}

/// Route parameters bound by the JSON:API router
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteParameters {
    /// Resource type the route serves
    #[serde(default)]
    pub resource_type: Option<String>,

    /// Name of the resource id path parameter (e.g., "article")
    #[serde(default)]
    pub resource_id_name: Option<String>,

    /// Relationship the route targets
    #[serde(default)]
    pub resource_relationship: Option<String>,
}

/// Kind of an explicit action override
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    FetchOne,
    FetchMany,
    Create,
    Update,
}

/// Explicit action metadata attached to a route handler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOverride {
    pub kind: ActionKind,

    /// Resource type served, overriding the route parameters
    #[serde(default)]
    pub resource_type: Option<String>,

    /// Success response codes of a create or update action
    #[serde(default)]
    pub response_codes: Option<Vec<u16>>,

    /// Resource type returned by a create or update action
    #[serde(default)]
    pub return_resource_type: Option<String>,
}

impl RouteDefinition {
    /// Whether the route answers the given method (case-insensitive)
    pub fn accepts(&self, method: &str) -> bool {
        self.methods.iter().any(|m| m.eq_ignore_ascii_case(method))
    }
}
