//! Name-keyed component registry
//!
//! Every reusable object the engine emits goes through a [`Registry`], which
//! keeps at most one definition per name and hands out `$ref` pointers to it.
//! Adding a name twice keeps the last definition.

use indexmap::IndexMap;
use jsonapi_openapi_common::openapi::{ComponentKind, RefOr, Reference};
use std::cell::RefCell;
use std::collections::BTreeMap;
use tracing::debug;

/// Build-scoped cache of one kind of component
#[derive(Debug)]
pub struct Registry<T> {
    kind: ComponentKind,
    items: RefCell<IndexMap<String, T>>,
}

impl<T: Clone> Registry<T> {
    pub fn new(kind: ComponentKind) -> Self {
        Self {
            kind,
            items: RefCell::new(IndexMap::new()),
        }
    }

    /// Register `item` under `name` and return a reference to it
    ///
    /// An existing definition with the same name is replaced.
    ///
    /// # Examples
    /// ```
    /// use jsonapi_openapi_common::openapi::{ComponentKind, Schema};
    /// use jsonapi_openapi_generator::registry::Registry;
    ///
    /// let schemas = Registry::new(ComponentKind::Schemas);
    /// let reference = schemas.add("Id", Schema::typed("string"));
    /// assert_eq!(reference.reference, "#/components/schemas/Id");
    /// assert!(schemas.has("Id"));
    /// ```
    pub fn add(&self, name: &str, item: T) -> Reference {
        let replaced = self
            .items
            .borrow_mut()
            .insert(name.to_string(), item)
            .is_some();
        if replaced {
            debug!(kind = self.kind.as_str(), name, "Replaced registered component");
        }
        self.reference(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.items.borrow().contains_key(name)
    }

    /// A registered component, as a reference or as the stored object
    pub fn get(&self, name: &str, as_ref: bool) -> Option<RefOr<T>> {
        if as_ref {
            self.get_ref(name).map(RefOr::Ref)
        } else {
            self.get_item(name).map(RefOr::item)
        }
    }

    /// Reference to a registered component
    pub fn get_ref(&self, name: &str) -> Option<Reference> {
        self.has(name).then(|| self.reference(name))
    }

    /// Copy of a registered component
    pub fn get_item(&self, name: &str) -> Option<T> {
        self.items.borrow().get(name).cloned()
    }

    /// Reference to `name`, whether or not it is registered yet
    pub fn reference(&self, name: &str) -> Reference {
        Reference::component(self.kind, name)
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    /// Every registered component, sorted by name
    pub fn build(&self) -> BTreeMap<String, T> {
        self.items
            .borrow()
            .iter()
            .map(|(name, item)| (name.clone(), item.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonapi_openapi_common::openapi::Schema;

    #[test]
    fn test_get_missing_is_none() {
        let schemas: Registry<Schema> = Registry::new(ComponentKind::Schemas);
        assert!(schemas.get("Missing", true).is_none());
        assert!(schemas.get("Missing", false).is_none());
    }

    #[test]
    fn test_last_add_wins() {
        let schemas = Registry::new(ComponentKind::Schemas);
        schemas.add("Id", Schema::typed("string"));
        let second = schemas.add("Id", Schema::typed("integer"));

        assert_eq!(schemas.len(), 1);
        assert_eq!(schemas.get("Id", true), Some(RefOr::Ref(second)));
        assert_eq!(
            schemas.get("Id", false),
            Some(RefOr::item(Schema::typed("integer")))
        );
    }

    #[test]
    fn test_build_sorts_by_name() {
        let parameters = Registry::new(ComponentKind::Parameters);
        parameters.add("b", Schema::default());
        parameters.add("a", Schema::default());
        let names: Vec<_> = parameters.build().into_keys().collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(
            parameters.reference("a").reference,
            "#/components/parameters/a"
        );
    }
}
