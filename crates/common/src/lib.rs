//! Common types and utilities for jsonapi-openapi
//!
//! This crate contains the shared error type, the OpenAPI output model, the
//! description of a JSON:API server (resource schemas, routes, validation
//! rules, example resources) and the collaborator traits the generator
//! consumes.

pub mod example;
pub mod inflector;
pub mod openapi;
pub mod resource;
pub mod route;
pub mod rules;
pub mod server;

pub use example::{ExampleLink, ExampleRelationship, ExampleResource};
pub use resource::{
    AttributeField, Cardinality, EnumCase, EnumDescriptor, FieldKind, FilterField, IdStrategy,
    MetaCase, PaginationStrategy, ReadOnly, RelationField, RequestRules, ResourceSchema,
};
pub use route::{ActionKind, ActionOverride, RouteDefinition, RouteParameters};
pub use rules::{PasswordRule, Rule, RuleList};
pub use server::{
    InfoOverride, QueryKind, ResourceFactory, ServerSettings, ServerSource, SimulatedRequest,
    TranslationSource, PACKAGE_NAMESPACE,
};

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during document generation
#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Factory error: {0}")]
    Factory(String),

    #[error("Failed to write to file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type for generator operations
pub type Result<T> = std::result::Result<T, GeneratorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_error_names_path() {
        let err = GeneratorError::Write {
            path: PathBuf::from("out/v1.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "Failed to write to file out/v1.json: denied");
    }
}
