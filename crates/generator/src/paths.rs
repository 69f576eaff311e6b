//! Path assembly
//!
//! Routes of the server are grouped by URI. Each group becomes one path
//! item whose operations are keyed by HTTP method; a path without a single
//! buildable operation is dropped.

use crate::components::ACCEPT_HEADER_PARAMETER;
use crate::context::BuildContext;
use crate::operation::{OperationBuilder, Parameters};
use crate::route::RouteDescriptor;
use jsonapi_openapi_common::openapi::{Operation, PathItem, RefOr};
use jsonapi_openapi_common::{GeneratorError, Result, RouteDefinition};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Rewrites the route list before routes are described
pub type RouteResolver = dyn Fn(Vec<RouteDefinition>) -> Vec<RouteDefinition>;

/// Builds the `paths` section of a document
pub struct PathsBuilder<'a> {
    ctx: &'a BuildContext<'a>,
    resolver: Option<&'a RouteResolver>,
}

impl<'a> PathsBuilder<'a> {
    pub fn new(ctx: &'a BuildContext<'a>) -> Self {
        Self {
            ctx,
            resolver: None,
        }
    }

    pub fn with_resolver(mut self, resolver: Option<&'a RouteResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Path items keyed by URI, sorted
    ///
    /// Only configuration errors abort the build; any other failure skips
    /// the operation it occurred in.
    pub fn build(&self) -> Result<BTreeMap<String, PathItem>> {
        let mut paths = BTreeMap::new();

        for (uri, routes) in self.grouped_routes() {
            info!(path = %uri, "Documenting path");
            if let Some(item) = self.path_item(&routes)? {
                paths.insert(uri, item);
            } else {
                warn!(path = %uri, "Unable to generate any operations, skipping path");
            }
        }

        Ok(paths)
    }

    /// Routes of the server grouped by URI
    pub fn grouped_routes(&self) -> BTreeMap<String, Vec<RouteDescriptor<'a>>> {
        let mut groups: BTreeMap<String, Vec<RouteDescriptor<'a>>> = BTreeMap::new();
        for route in self.routes() {
            let descriptor = RouteDescriptor::new(self.ctx, route);
            groups.entry(descriptor.uri()).or_default().push(descriptor);
        }
        groups
    }

    /// The server's routes, after the resolver when one is set
    fn routes(&self) -> Vec<RouteDefinition> {
        let server_name = &self.ctx.settings().name;
        let routes: Vec<RouteDefinition> = self
            .ctx
            .server()
            .routes()
            .into_iter()
            .filter(|route| route.name.starts_with(server_name.as_str()))
            .collect();
        debug!(server = %server_name, count = routes.len(), "Collected routes");

        match self.resolver {
            Some(resolver) => resolver(routes),
            None => routes,
        }
    }

    fn path_item(&self, routes: &[RouteDescriptor<'a>]) -> Result<Option<PathItem>> {
        let Some(first) = routes.first() else {
            return Ok(None);
        };

        let mut operations = BTreeMap::new();
        for route in routes {
            if let Some(operation) = self.operation(route)? {
                operations.insert(route.method(), operation);
            }
        }

        if operations.is_empty() {
            return Ok(None);
        }

        let mut parameters = vec![RefOr::Ref(
            self.ctx
                .components()
                .parameters
                .reference(ACCEPT_HEADER_PARAMETER),
        )];
        parameters.extend(Parameters::new(first).resource_id());

        Ok(Some(PathItem {
            parameters,
            operations,
        }))
    }

    fn operation(&self, route: &RouteDescriptor<'a>) -> Result<Option<Operation>> {
        let method = route.method().to_uppercase();

        if route.resource_type().is_none() {
            warn!(method = %method, route = %route.name(), "Unable to resolve resource type");
            return Ok(None);
        }

        let built = OperationBuilder::new(route).and_then(|builder| builder.build());
        match built {
            Ok(operation) => Ok(Some(operation)),
            Err(e @ GeneratorError::Configuration(_)) => Err(e),
            Err(e) => {
                warn!(method = %method, route = %route.name(), error = %e, "Skipping operation");
                Ok(None)
            }
        }
    }
}
