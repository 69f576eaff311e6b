//! Document builder
//!
//! [`OpenApiBuilder`] drives one build: it opens the example data sandbox,
//! registers the default components, assembles the document sections and
//! rolls the sandbox back whatever the outcome.

use crate::context::BuildContext;
use crate::info::build_info;
use crate::paths::{PathsBuilder, RouteResolver};
use jsonapi_openapi_common::openapi::{OpenApi, OPENAPI_VERSION};
use jsonapi_openapi_common::{
    ResourceFactory, Result, RouteDefinition, ServerSource, TranslationSource,
};
use tracing::{debug, info};

/// Extension points around a build
///
/// Both methods default to doing nothing.
pub trait BuildHook {
    /// Runs once the default components are registered, before any path
    fn documenting(&self, _ctx: &BuildContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Runs with the assembled document, before example data is discarded
    fn documented(&self, _ctx: &BuildContext<'_>, _document: &mut OpenApi) -> Result<()> {
        Ok(())
    }
}

/// Example data scope, rolled back when dropped
struct Sandbox<'f> {
    factory: &'f dyn ResourceFactory,
}

impl<'f> Sandbox<'f> {
    fn open(factory: &'f dyn ResourceFactory) -> Result<Self> {
        factory.begin()?;
        debug!("Opened example data sandbox");
        Ok(Self { factory })
    }
}

impl Drop for Sandbox<'_> {
    fn drop(&mut self) {
        self.factory.rollback();
        debug!("Rolled back example data sandbox");
    }
}

/// Builds the OpenAPI document of one server
pub struct OpenApiBuilder<'a> {
    server: &'a dyn ServerSource,
    translations: &'a dyn TranslationSource,
    factory: &'a dyn ResourceFactory,
    hooks: Vec<Box<dyn BuildHook + 'a>>,
    resolver: Option<Box<RouteResolver>>,
}

impl<'a> OpenApiBuilder<'a> {
    pub fn new(
        server: &'a dyn ServerSource,
        translations: &'a dyn TranslationSource,
        factory: &'a dyn ResourceFactory,
    ) -> Self {
        Self {
            server,
            translations,
            factory,
            hooks: Vec::new(),
            resolver: None,
        }
    }

    pub fn with_hook(mut self, hook: impl BuildHook + 'a) -> Self {
        self.hooks.push(Box::new(hook));
        self
    }

    /// Reorder or filter the server's routes before they are described
    pub fn with_route_resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn(Vec<RouteDefinition>) -> Vec<RouteDefinition> + 'static,
    {
        self.resolver = Some(Box::new(resolver));
        self
    }

    pub fn build(&self) -> Result<OpenApi> {
        let settings = self.server.settings();
        info!(server = %settings.name, "Building OpenAPI document");

        let _sandbox = Sandbox::open(self.factory)?;
        let ctx = BuildContext::new(self.server, self.translations, self.factory);
        ctx.components()
            .init(ctx.translator(), settings.resource_id_format.as_deref());

        for hook in &self.hooks {
            hook.documenting(&ctx)?;
        }

        let paths = PathsBuilder::new(&ctx)
            .with_resolver(self.resolver.as_deref())
            .build()?;

        let mut document = OpenApi {
            openapi: OPENAPI_VERSION.to_string(),
            info: build_info(settings, ctx.translator()),
            paths,
            components: ctx.components().build(),
            tags: ctx.tags().build(),
        };

        for hook in &self.hooks {
            hook.documented(&ctx, &mut document)?;
        }

        info!(
            server = %settings.name,
            paths = document.paths.len(),
            schemas = document.components.schemas.len(),
            "Built OpenAPI document"
        );
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use jsonapi_openapi_common::{
        ExampleResource, GeneratorError, ResourceSchema, RuleList, ServerSettings,
        SimulatedRequest,
    };
    use mockall::mock;
    use serde_json::Value;

    mock! {
        Factory {}
        impl ResourceFactory for Factory {
            fn begin(&self) -> Result<()>;
            fn create(&self, resource_type: &str, count: usize) -> Result<Vec<ExampleResource>>;
            fn rollback(&self);
        }
    }

    struct EmptyServer(ServerSettings);

    impl ServerSource for EmptyServer {
        fn settings(&self) -> &ServerSettings {
            &self.0
        }

        fn routes(&self) -> Vec<RouteDefinition> {
            Vec::new()
        }

        fn schema_for(&self, _resource_type: &str) -> Option<&ResourceSchema> {
            None
        }

        fn validation_rules(
            &self,
            _request: &SimulatedRequest,
        ) -> Option<IndexMap<String, RuleList>> {
            None
        }
    }

    struct NoLines;

    impl TranslationSource for NoLines {
        fn line(&self, _key: &str) -> Option<Value> {
            None
        }
    }

    struct FailingHook;

    impl BuildHook for FailingHook {
        fn documenting(&self, _ctx: &BuildContext<'_>) -> Result<()> {
            Err(GeneratorError::Generation("hook failed".to_string()))
        }
    }

    struct RenamingHook;

    impl BuildHook for RenamingHook {
        fn documented(&self, _ctx: &BuildContext<'_>, document: &mut OpenApi) -> Result<()> {
            document.info.title = "Renamed".to_string();
            Ok(())
        }
    }

    fn sandboxed_factory() -> MockFactory {
        let mut factory = MockFactory::new();
        factory.expect_begin().times(1).returning(|| Ok(()));
        factory.expect_rollback().times(1).return_const(());
        factory
    }

    #[test]
    fn test_build_rolls_back_the_sandbox() {
        let server = EmptyServer(ServerSettings::new("v1"));
        let factory = sandboxed_factory();

        let document = OpenApiBuilder::new(&server, &NoLines, &factory)
            .with_hook(RenamingHook)
            .build()
            .unwrap();

        assert_eq!(document.openapi, "3.1.0");
        assert_eq!(document.info.title, "Renamed");
        assert_eq!(document.info.version, "1.0");
        assert!(document.paths.is_empty());
        assert!(document.components.schemas.contains_key("JsonApi:failure"));
    }

    #[test]
    fn test_failed_build_still_rolls_back() {
        let server = EmptyServer(ServerSettings::new("v1"));
        let factory = sandboxed_factory();

        let result = OpenApiBuilder::new(&server, &NoLines, &factory)
            .with_hook(FailingHook)
            .build();

        assert!(matches!(result, Err(GeneratorError::Generation(_))));
    }

    #[test]
    fn test_sandbox_that_fails_to_open_is_not_rolled_back() {
        let server = EmptyServer(ServerSettings::new("v1"));
        let mut factory = MockFactory::new();
        factory
            .expect_begin()
            .returning(|| Err(GeneratorError::Factory("no connection".to_string())));
        factory.expect_rollback().times(0);

        let result = OpenApiBuilder::new(&server, &NoLines, &factory).build();
        assert!(matches!(result, Err(GeneratorError::Factory(_))));
    }
}
