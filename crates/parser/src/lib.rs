//! Server description loading for jsonapi-openapi
//!
//! This crate turns a server manifest (YAML or JSON) into the collaborators
//! the generator consumes:
//!
//! - [`ManifestServer`] implements `ServerSource` (routes, resource schemas,
//!   validation rules per simulated request)
//! - [`TranslationCatalog`] implements `TranslationSource` with the bundled
//!   English lines plus the manifest's overrides
//! - [`FixtureFactory`] implements `ResourceFactory` from declared example
//!   records
//!
//! ## Usage
//! ```rust,ignore
//! use jsonapi_openapi_parser::ServerManifest;
//!
//! let manifest = ServerManifest::from_file("jsonapi-openapi.yaml")?;
//! let server = manifest.server("v1")?;
//! let translations = manifest.translations()?;
//! let factory = manifest.fixtures("v1")?;
//! ```

mod catalog;
mod fixtures;
mod manifest;

pub use catalog::{TranslationCatalog, PACKAGE_NAMESPACE};
pub use fixtures::{FixtureFactory, FixtureRecord, FixtureRelationship};
pub use manifest::{ManifestServer, ServerEntry, ServerManifest};
