//! Shared state of one document build

use crate::components::Components;
use crate::inference::SchemaInferrer;
use crate::resources::ResourcesRepository;
use crate::tags::Tags;
use crate::translator::Translator;
use jsonapi_openapi_common::{
    ResourceFactory, ResourceSchema, ServerSettings, ServerSource, TranslationSource,
};

/// Everything a build shares: the collaborators, the translator and the
/// build-scoped registries
pub struct BuildContext<'a> {
    server: &'a dyn ServerSource,
    translator: Translator<'a>,
    components: Components,
    tags: Tags,
    resources: ResourcesRepository<'a>,
}

impl<'a> BuildContext<'a> {
    pub fn new(
        server: &'a dyn ServerSource,
        translations: &'a dyn TranslationSource,
        factory: &'a dyn ResourceFactory,
    ) -> Self {
        let settings = server.settings();
        Self {
            server,
            translator: Translator::new(translations, settings),
            components: Components::new(settings),
            tags: Tags::new(),
            resources: ResourcesRepository::new(factory),
        }
    }

    pub fn server(&self) -> &'a dyn ServerSource {
        self.server
    }

    pub fn settings(&self) -> &'a ServerSettings {
        self.server.settings()
    }

    pub fn translator(&self) -> &Translator<'a> {
        &self.translator
    }

    pub fn components(&self) -> &Components {
        &self.components
    }

    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    pub fn resources(&self) -> &ResourcesRepository<'a> {
        &self.resources
    }

    pub fn inferrer(&self) -> SchemaInferrer<'_> {
        SchemaInferrer::new(&self.components)
    }

    pub fn schema_for(&self, resource_type: &str) -> Option<&'a ResourceSchema> {
        self.server.schema_for(resource_type)
    }

    /// Register the tag of a resource type and return its name
    pub fn resource_tag(&self, resource_type: &str) -> String {
        self.tags.add_resource_type(&self.translator, resource_type)
    }

    /// Register a named tag and return its resolved name
    pub fn tag(&self, name: &str) -> String {
        self.tags.add(&self.translator, name)
    }
}
