//! Normalised validation rule sets
//!
//! The rules of a request are normalised once per route: every dotted key
//! gains its ancestors so nested shapes can be reconstructed from leaf
//! declarations (`tags.*.name` implies `tags` and `tags.*`).

use indexmap::IndexMap;
use jsonapi_openapi_common::rules::RuleObject;
use jsonapi_openapi_common::{Rule, RuleList};

/// Rules keyed by dotted field path
pub type RuleMap = IndexMap<String, RuleList>;

/// Validation rules of one route
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationRules {
    rules: RuleMap,
    accepts_get: bool,
    fetching_many: bool,
}

impl ValidationRules {
    /// Normalised rule set of a route
    ///
    /// `accepts_get` and `fetching_many` gate the query parameter views.
    pub fn new(rules: &RuleMap, accepts_get: bool, fetching_many: bool) -> Self {
        Self {
            rules: Self::normalise(rules),
            accepts_get,
            fetching_many,
        }
    }

    /// Synthesise the ancestors of every dotted key
    ///
    /// A missing ancestor becomes `['array']`, plus `required` when the child
    /// is required. An existing ancestor gains `required` when the child is
    /// required. Explicit declarations overwrite synthesised ones.
    ///
    /// # Examples
    /// ```
    /// use indexmap::IndexMap;
    /// use jsonapi_openapi_common::RuleList;
    /// use jsonapi_openapi_generator::rules::ValidationRules;
    ///
    /// let mut rules = IndexMap::new();
    /// rules.insert("tags.*.name".to_string(), RuleList::parse("required|string"));
    ///
    /// let normalised = ValidationRules::normalise(&rules);
    /// let keys: Vec<_> = normalised.keys().map(String::as_str).collect();
    /// assert_eq!(keys, vec!["tags", "tags.*", "tags.*.name"]);
    /// assert!(normalised["tags"].contains("required"));
    /// ```
    pub fn normalise(rules: &RuleMap) -> RuleMap {
        let mut normalised = RuleMap::new();

        for (field, field_rules) in rules {
            if field.contains('.') {
                let required = field_rules.contains("required");
                let parts: Vec<&str> = field.split('.').collect();

                for depth in (1..parts.len()).rev() {
                    let ancestor = parts[..depth].join(".");
                    match normalised.get_mut(&ancestor) {
                        None => {
                            let mut synthesised = RuleList(vec![Rule::token("array")]);
                            if required {
                                synthesised.push(Rule::token("required"));
                            }
                            normalised.insert(ancestor, synthesised);
                        }
                        Some(existing) if required && !existing.contains("required") => {
                            existing.push(Rule::token("required"));
                        }
                        Some(_) => {}
                    }
                }
            }

            normalised.insert(field.clone(), field_rules.clone());
        }

        normalised
    }

    pub fn all(&self) -> &RuleMap {
        &self.rules
    }

    pub fn get(&self, key: &str) -> Option<&RuleList> {
        self.rules.get(key)
    }

    pub fn has(&self, key: &str) -> bool {
        self.rules.contains_key(key)
    }

    pub fn is_required(&self, key: &str) -> bool {
        self.rules
            .get(key)
            .is_some_and(|rules| rules.contains("required"))
    }

    pub fn is_nullable(&self, key: &str) -> bool {
        self.rules
            .get(key)
            .is_some_and(|rules| rules.contains("nullable"))
    }

    /// Whether the key carries a `not_supported` rule
    pub fn is_not_supported(&self, key: &str) -> bool {
        self.rules.get(key).is_some_and(|rules| {
            rules
                .find_object(|rule| matches!(rule, RuleObject::NotSupported))
                .is_some()
        })
    }

    /// Filters the request accepts, keyed without the `filter.` prefix
    ///
    /// `None` when the route does not answer GET or filtering is not
    /// supported. Allowed filters without rules of their own map to an empty
    /// rule list.
    pub fn filters(&self) -> Option<RuleMap> {
        if !self.accepts_get || self.is_not_supported("filter") {
            return None;
        }

        let mut filters: RuleMap = self
            .allowed("filter", |rule| match rule {
                RuleObject::AllowedFilters { allowed } => Some(allowed),
                _ => None,
            })
            .into_iter()
            .map(|key| (key, RuleList::default()))
            .collect();

        for (key, rules) in &self.rules {
            if let Some(filter) = key.strip_prefix("filter.") {
                let stripped = rules
                    .iter()
                    .map(|rule| match rule {
                        Rule::Token(token) => Rule::Token(token.replace("filter.", "")),
                        other => other.clone(),
                    })
                    .collect();
                filters.insert(filter.to_string(), stripped);
            }
        }

        Some(filters)
    }

    /// Rules of the `page.*` parameters, keyed without the prefix
    pub fn pagination(&self) -> Option<RuleMap> {
        if !self.fetching_many {
            return None;
        }

        Some(
            self.rules
                .iter()
                .filter_map(|(key, rules)| {
                    key.strip_prefix("page.")
                        .map(|page_key| (page_key.to_string(), rules.clone()))
                })
                .collect(),
        )
    }

    /// Allowed sort fields; empty when the request does not restrict them
    pub fn sortable(&self) -> Option<Vec<String>> {
        if !self.accepts_get || self.is_not_supported("sort") {
            return None;
        }

        Some(self.allowed("sort", |rule| match rule {
            RuleObject::AllowedSort { allowed } => Some(allowed),
            _ => None,
        }))
    }

    /// Allowed include paths; empty when the request does not restrict them
    pub fn includes(&self) -> Option<Vec<String>> {
        if self.is_not_supported("include") {
            return None;
        }

        Some(self.allowed("include", |rule| match rule {
            RuleObject::AllowedIncludes { allowed } => Some(allowed),
            _ => None,
        }))
    }

    /// Allowed sparse field sets; empty when the request does not restrict them
    pub fn field_sets(&self) -> Option<Vec<String>> {
        if self.is_not_supported("fields") {
            return None;
        }

        Some(self.allowed("fields", |rule| match rule {
            RuleObject::AllowedFieldSets { allowed } => Some(allowed),
            _ => None,
        }))
    }

    fn allowed<F>(&self, key: &str, select: F) -> Vec<String>
    where
        F: Fn(&RuleObject) -> Option<&Vec<String>>,
    {
        self.rules
            .get(key)
            .and_then(|rules| {
                rules.iter().find_map(|rule| match rule {
                    Rule::Object(object) => select(object),
                    Rule::Token(_) => None,
                })
            })
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule_map(yaml: &str) -> RuleMap {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_existing_ancestor_gains_required() {
        let rules = rule_map(
            r#"
address: "array|nullable"
address.city: "required|string"
"#,
        );
        let normalised = ValidationRules::normalise(&rules);
        assert_eq!(
            normalised["address"],
            RuleList::parse("array|nullable|required")
        );
    }

    #[test]
    fn test_explicit_parent_overwrites_synthesised() {
        let rules = rule_map(
            r#"
tags.*: "string"
tags: "array|max:3"
"#,
        );
        let normalised = ValidationRules::normalise(&rules);
        assert_eq!(normalised["tags"], RuleList::parse("array|max:3"));
        assert_eq!(normalised["tags.*"], RuleList::parse("string"));
    }

    #[test]
    fn test_filters_merge_allowed_and_validated() {
        let rules = rule_map(
            r#"
filter:
  - rule: allowed_filters
    allowed: [author, published]
filter.published: "boolean"
filter.id: "array"
filter.id.*: "integer|required_with:filter.id"
"#,
        );
        let rules = ValidationRules::new(&rules, true, true);
        let filters = rules.filters().unwrap();

        let keys: Vec<_> = filters.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["author", "published", "id", "id.*"]);
        assert!(filters["author"].is_empty());
        assert_eq!(filters["id.*"], RuleList::parse("integer|required_with:id"));
    }

    #[test]
    fn test_filters_not_supported_or_not_get() {
        let rules = rule_map("filter: [{rule: not_supported}]");
        assert_eq!(ValidationRules::new(&rules, true, true).filters(), None);
        assert_eq!(
            ValidationRules::new(&RuleMap::new(), false, false).filters(),
            None
        );
        assert_eq!(
            ValidationRules::new(&RuleMap::new(), true, false).filters(),
            Some(RuleMap::new())
        );
    }

    #[test]
    fn test_pagination_only_when_fetching_many() {
        let rules = rule_map(r#"page.size: "integer|min:1|max:100""#);
        assert_eq!(ValidationRules::new(&rules, true, false).pagination(), None);

        let pagination = ValidationRules::new(&rules, true, true)
            .pagination()
            .unwrap();
        let keys: Vec<_> = pagination.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["size"]);
    }

    #[test]
    fn test_allowed_lists() {
        let rules = rule_map(
            r#"
sort: [{rule: allowed_sort, allowed: [title]}]
include: [{rule: not_supported}]
"#,
        );
        let rules = ValidationRules::new(&rules, true, true);
        assert_eq!(rules.sortable(), Some(vec!["title".to_string()]));
        assert_eq!(rules.includes(), None);
        assert_eq!(rules.field_sets(), Some(vec![]));
        assert!(rules.is_not_supported("include"));
        assert!(!rules.is_required("sort"));
    }
}
