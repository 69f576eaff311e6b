//! Route classification
//!
//! A [`RouteDescriptor`] wraps one route of the application. It resolves the
//! resource type the route serves, classifies it into a [`ResourceAction`]
//! and lazily derives what the operation builders need from it: the example
//! URL, the simulated request, its validation rules and the paginator.

use crate::context::BuildContext;
use crate::pagination::Paginator;
use crate::rules::{RuleMap, ValidationRules};
use crate::translator::Replacements;
use jsonapi_openapi_common::inflector::singular;
use jsonapi_openapi_common::{
    ActionKind, QueryKind, RelationField, ResourceSchema, RouteDefinition, SimulatedRequest,
};
use serde_json::{json, Value};
use std::cell::OnceCell;
use std::fmt;
use tracing::debug;

/// What a route does to its resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceAction {
    ViewingAny,
    ViewingOne,
    Creating,
    Updating,
    Deleting,
    ViewingRelated,
    ViewingRelationship,
    AttachingRelationship,
    DetachingRelationship,
    UpdatingRelationship,
}

impl ResourceAction {
    /// Name used in translation keys (`actions.{name}.summary`)
    pub fn name(&self) -> &'static str {
        match self {
            ResourceAction::ViewingAny => "viewingAny",
            ResourceAction::ViewingOne => "viewingOne",
            ResourceAction::Creating => "creating",
            ResourceAction::Updating => "updating",
            ResourceAction::Deleting => "deleting",
            ResourceAction::ViewingRelated => "viewingRelated",
            ResourceAction::ViewingRelationship => "viewingRelationship",
            ResourceAction::AttachingRelationship => "attachingRelationship",
            ResourceAction::DetachingRelationship => "detachingRelationship",
            ResourceAction::UpdatingRelationship => "updatingRelationship",
        }
    }

    /// Handler method the JSON:API router binds the action to
    pub fn default_method(&self) -> &'static str {
        match self {
            ResourceAction::ViewingAny => "index",
            ResourceAction::ViewingOne => "show",
            ResourceAction::Creating => "store",
            ResourceAction::Updating => "update",
            ResourceAction::Deleting => "destroy",
            ResourceAction::ViewingRelated => "showRelated",
            ResourceAction::ViewingRelationship => "showRelationship",
            ResourceAction::AttachingRelationship => "attachRelationship",
            ResourceAction::DetachingRelationship => "detachRelationship",
            ResourceAction::UpdatingRelationship => "updateRelationship",
        }
    }

    pub fn is_relationship_mutation(&self) -> bool {
        matches!(
            self,
            ResourceAction::AttachingRelationship
                | ResourceAction::DetachingRelationship
                | ResourceAction::UpdatingRelationship
        )
    }
}

impl fmt::Display for ResourceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One route of the documented server
pub struct RouteDescriptor<'a> {
    ctx: &'a BuildContext<'a>,
    definition: RouteDefinition,
    resource_type: Option<String>,
    action: Option<ResourceAction>,
    url: OnceCell<String>,
    rules: OnceCell<ValidationRules>,
}

impl<'a> RouteDescriptor<'a> {
    pub fn new(ctx: &'a BuildContext<'a>, definition: RouteDefinition) -> Self {
        let mut descriptor = Self {
            ctx,
            definition,
            resource_type: None,
            action: None,
            url: OnceCell::new(),
            rules: OnceCell::new(),
        };
        descriptor.resource_type = descriptor.resolve_resource_type();
        descriptor.action = descriptor.classify();

        debug!(
            route = %descriptor.definition.name,
            resource_type = ?descriptor.resource_type,
            action = ?descriptor.action,
            "Described route"
        );

        descriptor
    }

    pub fn context(&self) -> &'a BuildContext<'a> {
        self.ctx
    }

    pub fn definition(&self) -> &RouteDefinition {
        &self.definition
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// Resource type of the route's primary data
    ///
    /// For relation routes this is the inverse type of the relation.
    pub fn resource_type(&self) -> Option<&str> {
        self.resource_type.as_deref()
    }

    /// Resource type named by the route parameters
    pub fn route_resource_type(&self) -> Option<&str> {
        self.definition.parameters.resource_type.as_deref()
    }

    pub fn action(&self) -> Option<ResourceAction> {
        self.action
    }

    /// Handler method name (e.g., `index`), empty when unknown
    pub fn action_method(&self) -> &str {
        self.definition.action.as_deref().unwrap_or_default()
    }

    /// Handler method name, falling back to the action's default handler
    pub fn handler_name(&self) -> &str {
        match self.action_method() {
            "" => self.action.map_or("", |action| action.default_method()),
            method => method,
        }
    }

    /// Schema of the primary data's resource type
    pub fn schema(&self) -> Option<&'a ResourceSchema> {
        self.resource_type().and_then(|t| self.ctx.schema_for(t))
    }

    /// Schema of the route's own resource type
    pub fn route_schema(&self) -> Option<&'a ResourceSchema> {
        self.route_resource_type()
            .and_then(|t| self.ctx.schema_for(t))
    }

    pub fn has_resource_id(&self) -> bool {
        self.resource_id_name().is_some()
    }

    pub fn resource_id_name(&self) -> Option<&str> {
        self.definition
            .parameters
            .resource_id_name
            .as_deref()
            .filter(|name| !name.is_empty())
    }

    /// Whether the route targets a relationship
    pub fn is_relationship(&self) -> bool {
        self.definition
            .parameters
            .resource_relationship
            .as_deref()
            .is_some_and(|name| !name.is_empty())
    }

    /// Relation a relationship route targets
    pub fn relation(&self) -> Option<&'a RelationField> {
        let name = self
            .definition
            .parameters
            .resource_relationship
            .as_deref()?;
        let schema = self.route_schema()?;
        schema
            .relationship_by_serialized(name)
            .or_else(|| schema.relationship(name))
    }

    /// Lowercased HTTP method, ignoring HEAD
    pub fn method(&self) -> String {
        self.definition
            .methods
            .iter()
            .find(|method| !method.eq_ignore_ascii_case("HEAD"))
            .map(|method| method.to_lowercase())
            .unwrap_or_default()
    }

    /// Path of the route with a leading slash
    pub fn uri(&self) -> String {
        format!("/{}", self.definition.uri.trim_start_matches('/'))
    }

    /// Example URL of the route
    ///
    /// The resource id segment is filled with the id of the example resource
    /// when one exists.
    pub fn url(&self) -> &str {
        self.url.get_or_init(|| {
            let mut uri = self.definition.uri.trim_start_matches('/').to_string();
            if let (Some(segment), Some(route_type)) =
                (self.resource_id_name(), self.route_resource_type())
            {
                if let Some(resource) = self.ctx.resources().single(route_type) {
                    uri = uri.replace(&format!("{{{}}}", segment), &resource.id);
                }
            }
            join_url(&self.ctx.settings().base_url, &uri)
        })
    }

    pub fn is_fetching_many(&self) -> bool {
        match self.action {
            Some(ResourceAction::ViewingAny) => true,
            Some(ResourceAction::ViewingRelated) => {
                self.relation().is_some_and(RelationField::is_to_many)
            }
            _ => false,
        }
    }

    pub fn is_fetching_one(&self) -> bool {
        match self.action {
            Some(ResourceAction::ViewingOne) => true,
            Some(ResourceAction::ViewingRelated) => {
                self.relation().is_some_and(RelationField::is_to_one)
            }
            _ => false,
        }
    }

    pub fn is_creating(&self) -> bool {
        self.action == Some(ResourceAction::Creating)
    }

    pub fn is_updating(&self) -> bool {
        self.action == Some(ResourceAction::Updating)
    }

    /// Request the server resolves the route's validation rules from
    pub fn simulated_request(&self) -> Option<SimulatedRequest> {
        let schema = self.schema()?;

        let mut data = self
            .definition
            .request_examples
            .values()
            .next()
            .map(|example| example.get("data").cloned().unwrap_or_else(|| example.clone()));

        if self.is_creating() || self.is_updating() {
            let mut object = data
                .take()
                .and_then(|value| value.as_object().cloned())
                .unwrap_or_default();
            object
                .entry("type")
                .or_insert_with(|| json!(schema.resource_type));
            if self.is_creating() && !object.contains_key("id") {
                let example_id = self
                    .route_resource_type()
                    .and_then(|t| self.ctx.resources().single(t))
                    .map(|resource| Value::String(resource.id));
                if let Some(id) = example_id {
                    object.insert("id".to_string(), id);
                }
            }
            data = Some(Value::Object(object));
        }

        let kind = if self.is_fetching_many() {
            QueryKind::QueryMany
        } else if self.is_fetching_one() {
            QueryKind::QueryOne
        } else {
            QueryKind::Resource
        };

        Some(SimulatedRequest {
            route_name: self.definition.name.clone(),
            method: self.method().to_uppercase(),
            url: self.url().to_string(),
            resource_type: schema.resource_type.clone(),
            kind,
            body: data.map(|data| json!({ "data": data })),
        })
    }

    /// Normalised validation rules of the route's request
    pub fn validation_rules(&self) -> &ValidationRules {
        self.rules.get_or_init(|| {
            let rules = self
                .simulated_request()
                .and_then(|request| self.ctx.server().validation_rules(&request))
                .unwrap_or_default();
            ValidationRules::new(
                &rules,
                self.definition.accepts("GET"),
                self.is_fetching_many(),
            )
        })
    }

    /// Rules of the route's request, as declared
    pub fn rule_map(&self) -> &RuleMap {
        self.validation_rules().all()
    }

    /// Paginator of a fetch-many route
    pub fn paginator(&self) -> Option<Paginator> {
        if !self.is_fetching_many() {
            return None;
        }
        self.schema()?
            .pagination
            .as_ref()
            .and_then(Paginator::from_strategy)
    }

    /// Placeholder values for resource translation lines
    pub fn resource_replacements(&self, resource_type: &str) -> Replacements {
        let mut replacements = self.ctx.translator().resource_replacements(resource_type);
        replacements.insert("action".to_string(), self.action_method().to_string());

        if let (Some(relation), Some(parent)) = (self.relation(), self.route_resource_type()) {
            replacements.extend(relation_replacements(relation, parent));
        }

        replacements
    }

    /// Translate a resource line for the route's resource type
    pub fn translate_for_resource(&self, key: &str, default: Option<String>) -> Option<String> {
        let resource_type = self.resource_type().unwrap_or("unknown");
        self.translate_for(key, resource_type, &Replacements::new(), default)
    }

    /// Translate a resource line for any resource type with extra placeholders
    pub fn translate_for(
        &self,
        key: &str,
        resource_type: &str,
        extra: &Replacements,
        default: Option<String>,
    ) -> Option<String> {
        let mut replacements = self.resource_replacements(resource_type);
        replacements.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.ctx
            .translator()
            .for_resource(key, resource_type, &replacements, default)
    }

    /// Translate a package level line
    pub fn translate(&self, key: &str) -> String {
        self.ctx.translator().translate(key)
    }

    fn resolve_resource_type(&self) -> Option<String> {
        if let Some(resource_type) = self
            .definition
            .action_override
            .as_ref()
            .and_then(|action| action.resource_type.clone())
        {
            return Some(resource_type);
        }

        if self.is_relationship() {
            return self.relation().map(|relation| relation.inverse.clone());
        }

        self.route_resource_type().map(str::to_string)
    }

    fn classify(&self) -> Option<ResourceAction> {
        let candidates = [
            (ResourceAction::ViewingOne, self.is_viewing_one()),
            (ResourceAction::ViewingAny, self.is_viewing_any()),
            (ResourceAction::Creating, self.matches_creating()),
            (ResourceAction::Updating, self.matches_updating()),
            (ResourceAction::Deleting, self.is_deleting()),
            (ResourceAction::ViewingRelated, self.is_viewing_related()),
            (
                ResourceAction::ViewingRelationship,
                self.is_viewing_relationship(),
            ),
            (
                ResourceAction::AttachingRelationship,
                self.accepts("POST") && self.is_relationship(),
            ),
            (
                ResourceAction::DetachingRelationship,
                self.accepts("DELETE") && self.is_relationship(),
            ),
            (
                ResourceAction::UpdatingRelationship,
                self.accepts("PATCH") && self.is_relationship(),
            ),
        ];

        candidates
            .into_iter()
            .find(|(_, matches)| *matches)
            .map(|(action, _)| action)
    }

    fn override_kind(&self) -> Option<ActionKind> {
        self.definition
            .action_override
            .as_ref()
            .map(|action| action.kind)
    }

    fn accepts(&self, method: &str) -> bool {
        self.definition.accepts(method)
    }

    fn is_viewing_one(&self) -> bool {
        self.override_kind() == Some(ActionKind::FetchOne)
            || (self.accepts("GET") && self.has_resource_id() && !self.is_relationship())
    }

    fn is_viewing_any(&self) -> bool {
        self.override_kind() == Some(ActionKind::FetchMany)
            || (self.accepts("GET") && !self.has_resource_id() && !self.is_relationship())
    }

    fn matches_creating(&self) -> bool {
        self.override_kind() == Some(ActionKind::Create)
            || (self.accepts("POST") && !self.is_relationship() && !self.has_resource_id())
    }

    fn matches_updating(&self) -> bool {
        self.override_kind() == Some(ActionKind::Update)
            || (self.accepts("PATCH") && !self.is_relationship() && self.has_resource_id())
    }

    fn is_deleting(&self) -> bool {
        self.accepts("DELETE") && !self.is_relationship() && self.has_resource_id()
    }

    fn is_viewing_related(&self) -> bool {
        self.accepts("GET") && self.is_relationship() && !self.uri_has_relationships()
    }

    fn is_viewing_relationship(&self) -> bool {
        self.accepts("GET") && self.is_relationship() && self.uri_has_relationships()
    }

    fn uri_has_relationships(&self) -> bool {
        self.uri().contains("relationships")
    }
}

/// Placeholders describing a relation from its parent's side
pub fn relation_replacements(relation: &RelationField, parent: &str) -> Replacements {
    let related = if relation.is_to_one() {
        singular(&relation.inverse)
    } else {
        relation.inverse.clone()
    };

    [
        ("relation", relation.name.clone()),
        ("related-resource-type", related),
        ("parent-resource-type", parent.to_string()),
        ("parent-resource-type-singular", singular(parent)),
    ]
    .into_iter()
    .map(|(key, value)| (key.to_string(), value))
    .collect()
}

/// Join a base URL and a route URI
///
/// When the base URL ends with a path the URI already starts with, the
/// path is not repeated.
fn join_url(base: &str, uri: &str) -> String {
    let base = base.trim_end_matches('/');
    let uri = uri.trim_start_matches('/');

    let path_start = base
        .find("://")
        .map(|scheme| scheme + 3)
        .and_then(|host| base[host..].find('/').map(|path| host + path));

    if let Some(path_start) = path_start {
        let path = base[path_start..].trim_start_matches('/');
        if !path.is_empty() && (uri == path || uri.starts_with(&format!("{}/", path))) {
            return format!("{}/{}", &base[..path_start], uri);
        }
    }

    if uri.is_empty() {
        base.to_string()
    } else {
        format!("{}/{}", base, uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("http://localhost", "api/v1/articles"),
            "http://localhost/api/v1/articles"
        );
        assert_eq!(
            join_url("https://example.com/api/v1/", "api/v1/articles/1"),
            "https://example.com/api/v1/articles/1"
        );
        assert_eq!(
            join_url("https://example.com/api/v1", "articles"),
            "https://example.com/api/v1/articles"
        );
    }

    #[test]
    fn test_action_names() {
        assert_eq!(ResourceAction::ViewingAny.name(), "viewingAny");
        assert_eq!(
            ResourceAction::UpdatingRelationship.default_method(),
            "updateRelationship"
        );
        assert!(ResourceAction::DetachingRelationship.is_relationship_mutation());
        assert!(!ResourceAction::Deleting.is_relationship_mutation());
    }
}
