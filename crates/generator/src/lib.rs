//! OpenAPI document generation for JSON:API servers
//!
//! This crate walks the routes of a server description and assembles an
//! OpenAPI 3.1 document: resource schemas inferred from validation rules and
//! example resources, one operation per route and the shared components
//! they reference.
//!
//! ## Usage
//! ```rust,ignore
//! use jsonapi_openapi_generator::{Generator, OutputFormat};
//!
//! let generator = Generator::new(&server, &translations, &factory);
//! generator.write("v1.json", OutputFormat::Json)?;
//! ```

pub mod builder;
pub mod components;
pub mod context;
pub mod descriptors;
pub mod inference;
pub mod info;
pub mod operation;
pub mod pagination;
pub mod paths;
pub mod registry;
pub mod resource_schema;
pub mod resources;
pub mod route;
pub mod rules;
pub mod tags;
pub mod translator;

pub use builder::{BuildHook, OpenApiBuilder};
pub use context::BuildContext;
pub use paths::PathsBuilder;
pub use registry::Registry;
pub use route::{ResourceAction, RouteDescriptor};
pub use translator::Translator;

use jsonapi_openapi_common::openapi::OpenApi;
use jsonapi_openapi_common::{
    GeneratorError, ResourceFactory, Result, RouteDefinition, ServerSource, TranslationSource,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::info;

/// Serialisation of a generated document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

impl OutputFormat {
    /// File extension of the format
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
        }
    }

    /// Serialise a document
    pub fn render(&self, document: &OpenApi) -> Result<String> {
        Ok(match self {
            OutputFormat::Json => serde_json::to_string_pretty(document)?,
            OutputFormat::Yaml => serde_yaml::to_string(document)?,
        })
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Document generator of one server
///
/// Wraps an [`OpenApiBuilder`] and takes care of serialising and writing
/// the document it builds.
pub struct Generator<'a> {
    builder: OpenApiBuilder<'a>,
}

impl<'a> Generator<'a> {
    pub fn new(
        server: &'a dyn ServerSource,
        translations: &'a dyn TranslationSource,
        factory: &'a dyn ResourceFactory,
    ) -> Self {
        Self {
            builder: OpenApiBuilder::new(server, translations, factory),
        }
    }

    pub fn with_hook(mut self, hook: impl BuildHook + 'a) -> Self {
        self.builder = self.builder.with_hook(hook);
        self
    }

    pub fn with_route_resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn(Vec<RouteDefinition>) -> Vec<RouteDefinition> + 'static,
    {
        self.builder = self.builder.with_route_resolver(resolver);
        self
    }

    /// Build the document without serialising it
    pub fn document(&self) -> Result<OpenApi> {
        self.builder.build()
    }

    /// Build and serialise the document
    pub fn generate(&self, format: OutputFormat) -> Result<String> {
        format.render(&self.document()?)
    }

    /// Build the document and write it to a file
    ///
    /// Missing parent directories are created. Any failure to write is
    /// reported as [`GeneratorError::Write`].
    pub fn write<P: AsRef<Path>>(&self, path: P, format: OutputFormat) -> Result<()> {
        let path = path.as_ref();
        let rendered = self.generate(format)?;

        let write_error = |source: std::io::Error| GeneratorError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_error)?;
        }
        fs::write(path, rendered).map_err(write_error)?;

        info!(path = %path.display(), format = %format, "Wrote OpenAPI document");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonapi_openapi_common::openapi::Info;

    fn document() -> OpenApi {
        OpenApi {
            openapi: "3.1.0".to_string(),
            info: Info {
                title: "Blog".to_string(),
                description: None,
                terms_of_service: None,
                contact: None,
                license: None,
                version: "1.0".to_string(),
            },
            paths: Default::default(),
            components: Default::default(),
            tags: Vec::new(),
        }
    }

    #[test]
    fn test_json_is_pretty_printed() {
        let rendered = OutputFormat::Json.render(&document()).unwrap();
        assert!(rendered.starts_with("{\n  \"openapi\": \"3.1.0\""));
    }

    #[test]
    fn test_yaml_output() {
        let rendered = OutputFormat::Yaml.render(&document()).unwrap();
        assert!(rendered.starts_with("openapi:"));
        assert!(rendered.contains("title: Blog"));
    }

    #[test]
    fn test_format_names() {
        assert_eq!(OutputFormat::default(), OutputFormat::Json);
        assert_eq!(OutputFormat::Yaml.to_string(), "yaml");
        let parsed: OutputFormat = serde_json::from_str("\"yaml\"").unwrap();
        assert_eq!(parsed, OutputFormat::Yaml);
    }
}
