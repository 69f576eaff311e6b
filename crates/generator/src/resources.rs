//! Example resources of a build
//!
//! Resources are created through the application's [`ResourceFactory`] the
//! first time a type is needed and cached for the rest of the build, so
//! every operation of a type shows the same example data. A type the
//! factory fails on is not retried for the rest of the build.

use jsonapi_openapi_common::{ExampleResource, ResourceFactory};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Number of resources shown in collection examples
pub const DEFAULT_COLLECTION_SIZE: usize = 3;

/// Build-scoped cache of example resources keyed by resource type
pub struct ResourcesRepository<'a> {
    factory: &'a dyn ResourceFactory,
    cache: RefCell<HashMap<String, Vec<ExampleResource>>>,
    failed: RefCell<HashSet<String>>,
}

impl<'a> ResourcesRepository<'a> {
    pub fn new(factory: &'a dyn ResourceFactory) -> Self {
        Self {
            factory,
            cache: RefCell::new(HashMap::new()),
            failed: RefCell::new(HashSet::new()),
        }
    }

    pub fn factory(&self) -> &'a dyn ResourceFactory {
        self.factory
    }

    /// One example resource, created when none is cached yet
    pub fn single(&self, resource_type: &str) -> Option<ExampleResource> {
        if let Some(resource) = self.cached(resource_type, 1).into_iter().next() {
            return Some(resource);
        }

        self.create(resource_type, 1).into_iter().next()
    }

    /// Up to `count` example resources, topping the cache up as needed
    pub fn collection(&self, resource_type: &str, count: usize) -> Vec<ExampleResource> {
        let mut resources = self.cached(resource_type, count);
        let missing = count.saturating_sub(resources.len());
        if missing > 0 {
            resources.extend(self.create(resource_type, missing));
        }
        resources
    }

    /// Whether at least `count` resources of a type are cached
    pub fn has(&self, resource_type: &str, count: usize) -> bool {
        self.cache
            .borrow()
            .get(resource_type)
            .is_some_and(|resources| resources.len() >= count)
    }

    pub fn add(&self, resource_type: &str, resources: Vec<ExampleResource>) {
        self.cache
            .borrow_mut()
            .entry(resource_type.to_string())
            .or_default()
            .extend(resources);
    }

    fn cached(&self, resource_type: &str, count: usize) -> Vec<ExampleResource> {
        self.cache
            .borrow()
            .get(resource_type)
            .map(|resources| resources.iter().take(count).cloned().collect())
            .unwrap_or_default()
    }

    fn create(&self, resource_type: &str, count: usize) -> Vec<ExampleResource> {
        if self.failed.borrow().contains(resource_type) {
            return Vec::new();
        }

        match self.factory.create(resource_type, count) {
            Ok(resources) => {
                self.add(resource_type, resources.clone());
                resources
            }
            Err(e) => {
                warn!(resource_type, error = %e, "Unable to create example resources");
                self.failed.borrow_mut().insert(resource_type.to_string());
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonapi_openapi_common::GeneratorError;
    use mockall::mock;
    use mockall::predicate::eq;

    mock! {
        Factory {}
        impl ResourceFactory for Factory {
            fn begin(&self) -> jsonapi_openapi_common::Result<()>;
            fn create(&self, resource_type: &str, count: usize) -> jsonapi_openapi_common::Result<Vec<ExampleResource>>;
            fn rollback(&self);
        }
    }

    fn resource(id: &str) -> ExampleResource {
        ExampleResource {
            id: id.to_string(),
            resource_type: "articles".to_string(),
            attributes: Default::default(),
            relationships: Default::default(),
            links: Default::default(),
            meta: None,
        }
    }

    #[test]
    fn test_single_is_cached() {
        let mut factory = MockFactory::new();
        factory
            .expect_create()
            .with(eq("articles"), eq(1))
            .times(1)
            .returning(|_, _| Ok(vec![resource("1")]));

        let repository = ResourcesRepository::new(&factory);
        assert_eq!(repository.single("articles").unwrap().id, "1");
        assert_eq!(repository.single("articles").unwrap().id, "1");
        assert!(repository.has("articles", 1));
    }

    #[test]
    fn test_collection_tops_up_the_cache() {
        let mut factory = MockFactory::new();
        factory
            .expect_create()
            .with(eq("articles"), eq(1))
            .times(1)
            .returning(|_, _| Ok(vec![resource("1")]));
        factory
            .expect_create()
            .with(eq("articles"), eq(2))
            .times(1)
            .returning(|_, _| Ok(vec![resource("2"), resource("3")]));

        let repository = ResourcesRepository::new(&factory);
        repository.single("articles");
        let ids: Vec<_> = repository
            .collection("articles", 3)
            .into_iter()
            .map(|resource| resource.id)
            .collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert!(repository.has("articles", 3));
    }

    #[test]
    fn test_factory_failure_is_remembered() {
        let mut factory = MockFactory::new();
        factory
            .expect_create()
            .with(eq("articles"), eq(1))
            .times(1)
            .returning(|_, _| Err(GeneratorError::Factory("no table".to_string())));

        let repository = ResourcesRepository::new(&factory);
        assert!(repository.single("articles").is_none());
        assert!(repository.collection("articles", 3).is_empty());
        assert!(repository.single("articles").is_none());
        assert!(!repository.has("articles", 1));
    }
}
