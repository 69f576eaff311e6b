//! Pagination descriptors
//!
//! A [`Paginator`] documents how a fetch-many route paginates: the `page[*]`
//! query parameters, the pagination links and the pagination meta, and
//! produces the example page shown in the collection response.

use crate::components::DefaultSchema;
use crate::route::RouteDescriptor;
use indexmap::IndexMap;
use jsonapi_openapi_common::inflector::{dasherize, snake};
use jsonapi_openapi_common::openapi::{Parameter, Schema};
use jsonapi_openapi_common::{ExampleResource, MetaCase, PaginationStrategy};
use serde_json::{json, Map, Value};

/// Page size used when neither the paginator nor the schema declares one
pub const DEFAULT_PER_PAGE: u64 = 15;

const CURSOR_BEFORE_EXAMPLE: &str = "eyJsb29wcy5oZWFkbGluZSI6IkFiIHJlcHVkaWFuZGFlIGlzdGUgcXVpLiI";
const CURSOR_AFTER_EXAMPLE: &str = "wLTczOTUtYjMxNS03ZTU4M2I3ZWMxMzAiLCJfcG9pbnRzVG9OZXh0SXRlbX";
const CURSOR_FROM_EXAMPLE: &str = "eyJ1dWlkIjoiMDE5M2I1NDctNDk0OC03MzFkLThiMmQtZGFkM2Y5MDA3MGQyIiwiX3BvaW50c1RvTmV4dEl0ZW1zIjpmYWxzZX0";
const CURSOR_TO_EXAMPLE: &str = "eyJ1dWlkIjoiMDE5M2I1NDYtYzc4NS03MTY5LWFiYjEtMzQ4MDU1NjNlMjE1IiwiX3BvaW50c1RvTmV4dEl0ZW1zIjp0cnVlfQ";

/// Page based pagination (`page[number]`, `page[size]`)
#[derive(Debug, Clone, PartialEq)]
pub struct PagePaginator {
    pub page_key: String,
    pub per_page_key: String,
    pub default_per_page: Option<u64>,
    pub meta_key: Option<String>,
    pub meta_case: Option<MetaCase>,
}

/// Cursor based pagination (`page[before]`, `page[after]`, `page[limit]`)
#[derive(Debug, Clone, PartialEq)]
pub struct CursorPaginator {
    pub before: String,
    pub after: String,
    pub limit: String,
    pub default_per_page: Option<u64>,
    pub meta_key: Option<String>,
    pub meta_case: Option<MetaCase>,
}

/// Describes the pagination of a resource type
#[derive(Debug, Clone, PartialEq)]
pub enum Paginator {
    Page(PagePaginator),
    Cursor(CursorPaginator),
    /// Several paginators accepted side by side
    Multi(Vec<Paginator>),
}

/// One page of example resources with its links and meta
#[derive(Debug, Clone, PartialEq)]
pub struct ExamplePage {
    pub resources: Vec<ExampleResource>,
    pub links: Map<String, Value>,
    pub meta: Map<String, Value>,
}

impl Paginator {
    /// Paginator for a strategy; `None` for strategies that cannot be
    /// described
    pub fn from_strategy(strategy: &PaginationStrategy) -> Option<Self> {
        match strategy {
            PaginationStrategy::Page {
                page_key,
                per_page_key,
                default_per_page,
                meta_key,
                meta_case,
            } => Some(Paginator::Page(PagePaginator {
                page_key: page_key.clone(),
                per_page_key: per_page_key.clone(),
                default_per_page: *default_per_page,
                meta_key: meta_key.clone(),
                meta_case: *meta_case,
            })),
            PaginationStrategy::Cursor {
                before,
                after,
                limit,
                default_per_page,
                meta_key,
                meta_case,
            } => Some(Paginator::Cursor(CursorPaginator {
                before: before.clone(),
                after: after.clone(),
                limit: limit.clone(),
                default_per_page: *default_per_page,
                meta_key: meta_key.clone(),
                meta_case: *meta_case,
            })),
            PaginationStrategy::Multi { paginators } => {
                let members: Vec<Paginator> =
                    paginators.iter().filter_map(Self::from_strategy).collect();
                if members.is_empty() {
                    None
                } else {
                    Some(Paginator::Multi(members))
                }
            }
            PaginationStrategy::Other => None,
        }
    }

    /// Whether the resource paginates by default with this paginator
    ///
    /// True when the schema's default pagination names the per-page key.
    pub fn is_default(&self, route: &RouteDescriptor<'_>) -> bool {
        match self {
            Paginator::Multi(members) => members.iter().any(|member| member.is_default(route)),
            _ => defaults(route).is_some_and(|defaults| defaults.contains_key(self.per_page_key())),
        }
    }

    /// Page size of the example page
    pub fn default_per_page(&self, route: &RouteDescriptor<'_>) -> u64 {
        let declared = match self {
            Paginator::Page(page) => page.default_per_page,
            Paginator::Cursor(cursor) => cursor.default_per_page,
            Paginator::Multi(members) => {
                return self
                    .primary(route, members)
                    .map_or(DEFAULT_PER_PAGE, |member| member.default_per_page(route))
            }
        };

        declared
            .or_else(|| {
                defaults(route)
                    .and_then(|defaults| defaults.get(self.per_page_key()))
                    .and_then(Value::as_u64)
            })
            .unwrap_or(DEFAULT_PER_PAGE)
    }

    /// The `page[*]` query parameters
    pub fn parameters(&self, route: &RouteDescriptor<'_>) -> Vec<Parameter> {
        match self {
            Paginator::Page(page) => vec![
                self.per_page_parameter(route, "parameters.perPageKey"),
                page_parameter(
                    &page.page_key,
                    self.translate(route, "parameters.pageKey"),
                    Schema {
                        default: Some(json!(1)),
                        ..Schema::typed("integer")
                    }
                    .with_example(json!(1)),
                ),
            ],
            Paginator::Cursor(cursor) => vec![
                self.per_page_parameter(route, "parameters.limit"),
                page_parameter(
                    &cursor.before,
                    self.translate(route, "parameters.before"),
                    Schema::typed("string").with_example(json!(CURSOR_BEFORE_EXAMPLE)),
                ),
                page_parameter(
                    &cursor.after,
                    self.translate(route, "parameters.after"),
                    Schema::typed("string").with_example(json!(CURSOR_AFTER_EXAMPLE)),
                ),
            ],
            Paginator::Multi(members) => members
                .iter()
                .flat_map(|member| member.parameters(route))
                .collect(),
        }
    }

    /// Schema of the `links` member of a paginated document
    pub fn links(&self, route: &RouteDescriptor<'_>) -> Schema {
        let per_page = self.default_per_page(route);
        let url = route.url();

        let links: Vec<(&str, String)> = match self {
            Paginator::Page(page) => {
                let href = |number: u64| {
                    format!(
                        "{}?page[{}]={}&page[{}]={}",
                        url, page.page_key, number, page.per_page_key, per_page
                    )
                };
                vec![
                    ("first", href(1)),
                    ("last", href(4)),
                    ("prev", href(1)),
                    ("next", href(3)),
                ]
            }
            Paginator::Cursor(cursor) => vec![
                (
                    "first",
                    format!("{}?page[{}]={}", url, cursor.limit, per_page),
                ),
                (
                    "prev",
                    format!(
                        "{}?page[{}]={}&page[{}]={}",
                        url, cursor.before, CURSOR_BEFORE_EXAMPLE, cursor.limit, per_page
                    ),
                ),
                (
                    "next",
                    format!(
                        "{}?page[{}]={}&page[{}]={}",
                        url, cursor.after, CURSOR_AFTER_EXAMPLE, cursor.limit, per_page
                    ),
                ),
            ],
            Paginator::Multi(members) => {
                return Schema::all_of(
                    members
                        .iter()
                        .map(|member| member.links(route).into())
                        .collect(),
                )
            }
        };

        let mut properties = Schema::object(Default::default());
        for (name, example) in links {
            properties.insert_property(
                name,
                Schema {
                    format: Some("url".to_string()),
                    ..Schema::typed("string")
                }
                .with_description(self.translate(route, &format!("links.{}", name)))
                .with_example(Value::String(example)),
            );
        }

        Schema::all_of(vec![
            route.context().components().schema(DefaultSchema::Links),
            properties.into(),
        ])
    }

    /// Schema of the `meta` member of a paginated document
    pub fn meta(&self, route: &RouteDescriptor<'_>) -> Schema {
        let per_page = self.default_per_page(route);

        let members: Vec<(&str, &str, Value)> = match self {
            Paginator::Page(_) => vec![
                ("currentPage", "integer", json!(2)),
                ("from", "integer", json!(per_page + 1)),
                ("lastPage", "integer", json!(4)),
                ("perPage", "integer", json!(per_page)),
                ("to", "integer", json!(per_page * 2)),
                ("total", "integer", json!(per_page * 3 + 1)),
            ],
            Paginator::Cursor(_) => vec![
                ("from", "string", json!(CURSOR_FROM_EXAMPLE)),
                ("hasMore", "boolean", json!(true)),
                ("perPage", "integer", json!(per_page)),
                ("to", "string", json!(CURSOR_TO_EXAMPLE)),
                ("total", "integer", json!(per_page * 3 + 1)),
            ],
            Paginator::Multi(members) => {
                return Schema::all_of(
                    members
                        .iter()
                        .map(|member| member.meta(route).into())
                        .collect(),
                )
            }
        };

        let mut meta = Schema::object(Default::default());
        let mut keys = Vec::new();
        for (name, schema_type, example) in members {
            let key = self.meta_case(name);
            meta.insert_property(
                key.clone(),
                Schema::typed(schema_type)
                    .with_description(self.translate(route, &format!("meta.{}", name)))
                    .with_example(example),
            );
            keys.push(key);
        }

        let is_default = self.is_default(route);
        let described = Schema::typed("object")
            .with_description(route.translate("schema.meta"))
            .with_additional_properties(true);

        match self.meta_key() {
            None => Schema {
                properties: meta.properties,
                ..described
            }
            .with_required(if is_default { keys } else { Vec::new() }),
            Some(meta_key) => {
                let nested = Schema {
                    properties: meta.properties,
                    ..Schema::typed("object")
                }
                .with_description(self.translate(route, "meta.description"))
                .with_required(keys);

                let mut schema = described.with_required(if is_default {
                    vec![meta_key.to_string()]
                } else {
                    Vec::new()
                });
                schema.insert_property(meta_key, nested);
                schema
            }
        }
    }

    /// First page of example resources, as the paginator would return it
    pub fn paginate(&self, route: &RouteDescriptor<'_>) -> ExamplePage {
        let per_page = self.default_per_page(route);
        let resources = route
            .resource_type()
            .map(|resource_type| {
                route
                    .context()
                    .resources()
                    .collection(resource_type, per_page as usize)
            })
            .unwrap_or_default();

        self.page_of(route, resources, per_page)
    }

    fn page_of(
        &self,
        route: &RouteDescriptor<'_>,
        resources: Vec<ExampleResource>,
        per_page: u64,
    ) -> ExamplePage {
        let url = route.url();
        let count = resources.len() as u64;

        let (links, members): (Vec<(&str, String)>, Vec<(&str, Value)>) = match self {
            Paginator::Page(page) => {
                let href = format!(
                    "{}?page[{}]=1&page[{}]={}",
                    url, page.page_key, page.per_page_key, per_page
                );
                (
                    vec![("first", href.clone()), ("last", href)],
                    vec![
                        ("currentPage", json!(1)),
                        ("from", json!(if count > 0 { 1 } else { 0 })),
                        ("lastPage", json!(1)),
                        ("perPage", json!(per_page)),
                        ("to", json!(count)),
                        ("total", json!(count)),
                    ],
                )
            }
            Paginator::Cursor(cursor) => {
                let first_id = resources.first().map(|resource| resource.id.clone());
                let last_id = resources.last().map(|resource| resource.id.clone());
                (
                    vec![(
                        "first",
                        format!("{}?page[{}]={}", url, cursor.limit, per_page),
                    )],
                    vec![
                        ("from", json!(first_id)),
                        ("hasMore", json!(false)),
                        ("perPage", json!(per_page)),
                        ("to", json!(last_id)),
                    ],
                )
            }
            Paginator::Multi(members) => {
                return match self.primary(route, members) {
                    Some(member) => member.page_of(route, resources, per_page),
                    None => ExamplePage {
                        resources,
                        links: Map::new(),
                        meta: Map::new(),
                    },
                }
            }
        };

        let page_meta: Map<String, Value> = members
            .into_iter()
            .map(|(name, value)| (self.meta_case(name), value))
            .collect();
        let meta = match self.meta_key() {
            Some(meta_key) => {
                let mut nested = Map::new();
                nested.insert(meta_key.to_string(), Value::Object(page_meta));
                nested
            }
            None => page_meta,
        };

        ExamplePage {
            resources,
            links: links
                .into_iter()
                .map(|(name, href)| (name.to_string(), Value::String(href)))
                .collect(),
            meta,
        }
    }

    /// The member that drives examples of a multi paginator
    fn primary<'p>(
        &self,
        route: &RouteDescriptor<'_>,
        members: &'p [Paginator],
    ) -> Option<&'p Paginator> {
        members
            .iter()
            .find(|member| member.is_default(route))
            .or_else(|| members.first())
    }

    fn per_page_parameter(&self, route: &RouteDescriptor<'_>, description_key: &str) -> Parameter {
        let per_page = self.default_per_page(route);
        let key = self.per_page_key();
        let base = Schema {
            default: Some(json!(per_page)),
            ..Schema::typed("integer")
        }
        .with_example(json!(per_page));

        let schema = match route.validation_rules().pagination() {
            Some(rules) => route
                .context()
                .inferrer()
                .compile(key, &rules, Some(base.into())),
            None => base.into(),
        };

        Parameter {
            allow_empty_value: Some(false),
            ..Parameter::query(format!("page[{}]", key), schema)
                .with_description(self.translate(route, description_key))
        }
    }

    fn per_page_key(&self) -> &str {
        match self {
            Paginator::Page(page) => &page.per_page_key,
            Paginator::Cursor(cursor) => &cursor.limit,
            Paginator::Multi(_) => "",
        }
    }

    fn meta_key(&self) -> Option<&str> {
        match self {
            Paginator::Page(page) => page.meta_key.as_deref(),
            Paginator::Cursor(cursor) => cursor.meta_key.as_deref(),
            Paginator::Multi(_) => None,
        }
    }

    fn meta_case(&self, key: &str) -> String {
        let case = match self {
            Paginator::Page(page) => page.meta_case,
            Paginator::Cursor(cursor) => cursor.meta_case,
            Paginator::Multi(_) => None,
        };

        match case {
            Some(MetaCase::Snake) => snake(key),
            Some(MetaCase::Dash) => dasherize(key),
            None => key.to_string(),
        }
    }

    fn translation_key(&self) -> &'static str {
        match self {
            Paginator::Cursor(_) => "cursor",
            _ => "page",
        }
    }

    /// Resource specific pagination line, else the package line
    fn translate(&self, route: &RouteDescriptor<'_>, key: &str) -> String {
        let key = format!("pagination.{}.{}", self.translation_key(), key);
        route
            .translate_for_resource(&key, None)
            .unwrap_or_else(|| route.translate(&key))
    }
}

/// Default pagination parameters of the route's resource schema
fn defaults<'r>(route: &RouteDescriptor<'r>) -> Option<&'r IndexMap<String, Value>> {
    route.schema().map(|schema| &schema.default_pagination)
}

fn page_parameter(key: &str, description: String, schema: Schema) -> Parameter {
    Parameter {
        allow_empty_value: Some(false),
        ..Parameter::query(format!("page[{}]", key), schema).with_description(description)
    }
}
