//! Query and path parameters of an operation

use crate::components::FIELDS_PARAMETER;
use crate::descriptors::{literal_schema, Id};
use crate::route::{ResourceAction, RouteDescriptor};
use crate::rules::RuleMap;
use crate::translator::replacements;
use jsonapi_openapi_common::inflector::{camel, singular};
use jsonapi_openapi_common::openapi::{
    Parameter, ParameterLocation, RefOr, Schema, SchemaOrRef,
};
use jsonapi_openapi_common::{FilterField, Result};
use serde_json::{json, Value};

/// Builds the parameters of one route's operation
pub struct Parameters<'r, 'a> {
    route: &'r RouteDescriptor<'a>,
}

impl<'r, 'a> Parameters<'r, 'a> {
    pub fn new(route: &'r RouteDescriptor<'a>) -> Self {
        Self { route }
    }

    /// Operation parameters: filters, sort, include, pagination and fields
    pub fn build(&self) -> Result<Vec<RefOr<Parameter>>> {
        let mut parameters = self.filters()?;
        parameters.extend(self.sort().map(RefOr::item));
        parameters.extend(self.include().map(RefOr::item));
        parameters.extend(self.pagination().into_iter().map(RefOr::item));
        parameters.extend(self.fields());
        Ok(parameters)
    }

    /// The resource id path parameter
    ///
    /// Registered as a shared component when the route names the parameter
    /// after its resource type, inline otherwise.
    pub fn resource_id(&self) -> Option<RefOr<Parameter>> {
        let id_name = self.route.resource_id_name()?;
        let ctx = self.route.context();
        let route_type = self.route.route_resource_type().unwrap_or_default();

        let schema: SchemaOrRef = match self.route.route_schema() {
            Some(schema) => Id::make(ctx.components(), &schema.id, false),
            None => Schema::typed("string").into(),
        };

        let description = self
            .route
            .translate_for(
                "parameters.resource-id",
                route_type,
                &Default::default(),
                None,
            )
            .unwrap_or_else(|| self.route.translate("parameters.resource-id"));

        let parameter = Parameter {
            location: ParameterLocation::Path,
            required: true,
            allow_empty_value: Some(false),
            example: ctx
                .resources()
                .single(route_type)
                .map(|resource| Value::String(resource.id)),
            ..Parameter::query(id_name, schema).with_description(description)
        };

        if id_name != camel(&singular(route_type)) {
            return Some(RefOr::item(parameter));
        }

        let name = format!("{}_Id", camel(id_name));
        Some(ctx.components().parameters.add(&name, parameter).into())
    }

    fn filters(&self) -> Result<Vec<RefOr<Parameter>>> {
        if !self.route.is_fetching_many() && !self.route.is_fetching_one() {
            return Ok(Vec::new());
        }
        let Some(schema) = self.route.schema() else {
            return Ok(Vec::new());
        };
        let Some(allowed) = self.route.validation_rules().filters() else {
            return Ok(Vec::new());
        };

        let mut filters: Vec<&FilterField> = schema.filters.iter().collect();
        if let Some(relation) = self.route.relation() {
            filters.extend(relation.filters.iter());
        }

        filters
            .into_iter()
            .filter(|filter| allowed.is_empty() || allowed.contains_key(&filter.key))
            .map(|filter| self.filter(filter, &allowed))
            .collect()
    }

    fn filter(&self, filter: &FilterField, rules: &RuleMap) -> Result<RefOr<Parameter>> {
        let components = self.route.context().components();

        if let Some(name) = &filter.name {
            if let Some(existing) = components.parameters.get(name, true) {
                return Ok(existing);
            }
        }

        let schema = self.filter_schema(filter, rules)?;
        let is_array = schema.as_item().is_some_and(|schema| schema.has_type("array"));

        let with_filter = replacements([("filter", filter.key.as_str())]);
        let description = self
            .route
            .translate_for(
                &format!("filters.{}", filter.key),
                self.route.resource_type().unwrap_or_default(),
                &with_filter,
                None,
            )
            .or_else(|| self.route.translate_for_resource("parameters.filter", None));

        let mut parameter = Parameter::query(format!("filter[{}]", filter.key), schema);
        parameter.description = description;
        if is_array {
            parameter = parameter.form_style();
        }

        Ok(match &filter.name {
            Some(name) => components.parameters.add(name, parameter).into(),
            None => RefOr::item(parameter),
        })
    }

    fn filter_schema(&self, filter: &FilterField, rules: &RuleMap) -> Result<SchemaOrRef> {
        if let Some(value) = &filter.schema {
            let owner = format!("filter `{}`", filter.key);
            return Ok(literal_schema(value, &owner)?.into());
        }

        let base = Schema::typed(if filter.as_boolean { "boolean" } else { "string" });
        if rules.get(&filter.key).map_or(true, |rules| rules.0.is_empty()) {
            return Ok(base.into());
        }

        Ok(self
            .route
            .context()
            .inferrer()
            .compile(&filter.key, rules, Some(base.into())))
    }

    fn sort(&self) -> Option<Parameter> {
        if !self.route.is_fetching_many() {
            return None;
        }
        let schema = self.route.schema()?;
        let mut sortable = self.route.validation_rules().sortable()?;
        if sortable.is_empty() {
            sortable = schema.sort_fields.clone();
        }

        let keys: Vec<Value> = sortable
            .iter()
            .flat_map(|field| [json!(field), json!(format!("-{}", field))])
            .collect();
        let first = keys.first()?.clone();

        let schema = Schema {
            enum_values: Some(keys),
            ..Schema::typed("string")
        };
        let description = self.route.translate_for_resource(
            "parameters.sort",
            Some(self.route.translate("parameters.sort")),
        );

        let mut parameter = Parameter {
            allow_empty_value: Some(false),
            ..Parameter::query("sort", Schema::array(schema).with_example(json!([first])))
        }
        .form_style();
        parameter.description = description;
        Some(parameter)
    }

    fn include(&self) -> Option<Parameter> {
        if self.route.is_relationship()
            && self.route.action() != Some(ResourceAction::ViewingRelated)
        {
            return None;
        }
        let schema = self.route.schema()?;
        if schema.include_paths.is_empty() {
            return None;
        }

        let mut includes = self.route.validation_rules().includes()?;
        if includes.is_empty() {
            includes = schema.include_paths.clone();
        }
        includes.sort();
        includes.dedup();

        let example = includes.iter().take(2).cloned().collect::<Vec<_>>().join(",");
        let schema = Schema {
            enum_values: Some(includes.into_iter().map(Value::String).collect()),
            ..Schema::typed("string")
        };
        let description = self.route.translate_for_resource(
            "parameters.include",
            Some(self.route.translate("parameters.include")),
        );

        let mut parameter = Parameter {
            allow_empty_value: Some(false),
            ..Parameter::query("include", Schema::array(schema).with_example(json!([example])))
        }
        .form_style();
        parameter.description = description;
        Some(parameter)
    }

    fn pagination(&self) -> Vec<Parameter> {
        self.route
            .paginator()
            .map(|paginator| paginator.parameters(self.route))
            .unwrap_or_default()
    }

    fn fields(&self) -> Option<RefOr<Parameter>> {
        if self.route.is_relationship()
            && self.route.action() != Some(ResourceAction::ViewingRelated)
        {
            return None;
        }
        self.route.schema()?;
        self.route.validation_rules().field_sets()?;

        Some(RefOr::Ref(
            self.route
                .context()
                .components()
                .parameters
                .reference(FIELDS_PARAMETER),
        ))
    }
}
