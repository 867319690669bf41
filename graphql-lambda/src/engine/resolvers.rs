use std::fmt;
use std::sync::Arc;

pub use apollo_compiler::resolvers::FieldError;
use apollo_compiler::ast::OperationType;
use indexmap::IndexMap;

use crate::context::Context;
use crate::json_ext::Object;
use crate::json_ext::Value;

type ResolverFn = dyn Fn(&Object, &Context) -> Result<Value, FieldError> + Send + Sync;

/// Produces the value of one root field.
///
/// Objects in the produced JSON are resolved further by property name, so a resolver only has
/// to return data shaped like the selected type. A `__typename` property selects the concrete
/// object type when the field's type is an interface or a union.
#[derive(Clone)]
pub enum FieldResolver {
    /// The same value for every request.
    Data(Value),
    /// Called with the coerced field arguments and the request context.
    Function(Arc<ResolverFn>),
}

impl FieldResolver {
    pub fn function<F>(resolver: F) -> Self
    where
        F: Fn(&Object, &Context) -> Result<Value, FieldError> + Send + Sync + 'static,
    {
        FieldResolver::Function(Arc::new(resolver))
    }

    pub(crate) fn resolve(
        &self,
        arguments: &Object,
        context: &Context,
    ) -> Result<Value, FieldError> {
        match self {
            FieldResolver::Data(value) => Ok(value.clone()),
            FieldResolver::Function(resolver) => resolver(arguments, context),
        }
    }
}

impl From<Value> for FieldResolver {
    fn from(value: Value) -> Self {
        FieldResolver::Data(value)
    }
}

impl fmt::Debug for FieldResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldResolver::Data(value) => f.debug_tuple("Data").field(value).finish(),
            FieldResolver::Function(_) => f.write_str("Function"),
        }
    }
}

/// Resolvers for the root fields of query and mutation operations.
///
/// A root field without a resolver resolves to `null`.
#[derive(Clone, Debug, Default)]
pub struct ResolverMap {
    query: IndexMap<String, FieldResolver>,
    mutation: IndexMap<String, FieldResolver>,
}

impl ResolverMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Static root data, one entry per root field.
    pub fn from_data(query: Object, mutation: Object) -> Self {
        let into_resolvers = |data: Object| {
            data.into_iter()
                .map(|(name, value)| (name.as_str().to_string(), FieldResolver::Data(value)))
                .collect()
        };
        Self {
            query: into_resolvers(query),
            mutation: into_resolvers(mutation),
        }
    }

    /// Adds a resolver for a field of the query root type.
    pub fn query_field(
        mut self,
        name: impl Into<String>,
        resolver: impl Into<FieldResolver>,
    ) -> Self {
        self.query.insert(name.into(), resolver.into());
        self
    }

    /// Adds a resolver for a field of the mutation root type.
    pub fn mutation_field(
        mut self,
        name: impl Into<String>,
        resolver: impl Into<FieldResolver>,
    ) -> Self {
        self.mutation.insert(name.into(), resolver.into());
        self
    }

    /// Names of the query root fields that have a resolver.
    pub fn query_fields(&self) -> impl Iterator<Item = &str> {
        self.query.keys().map(String::as_str)
    }

    /// Names of the mutation root fields that have a resolver.
    pub fn mutation_fields(&self) -> impl Iterator<Item = &str> {
        self.mutation.keys().map(String::as_str)
    }

    pub(crate) fn root(
        &self,
        operation_type: OperationType,
    ) -> Option<&IndexMap<String, FieldResolver>> {
        match operation_type {
            OperationType::Query => Some(&self.query),
            OperationType::Mutation => Some(&self.mutation),
            OperationType::Subscription => None,
        }
    }
}
