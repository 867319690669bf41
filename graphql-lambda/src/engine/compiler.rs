use std::sync::Arc;

use apollo_compiler::ExecutableDocument;
use apollo_compiler::Schema;
use apollo_compiler::resolvers::Execution;
use apollo_compiler::resolvers::FieldError;
use apollo_compiler::resolvers::ObjectValue;
use apollo_compiler::resolvers::ResolveInfo;
use apollo_compiler::resolvers::ResolvedValue;
use apollo_compiler::response::GraphQLError;
use apollo_compiler::validation::Valid;
use indexmap::IndexMap;
use serde::Serialize;
use tower::BoxError;

use super::GraphqlEngine;
use super::resolvers::FieldResolver;
use super::resolvers::ResolverMap;
use crate::context::Context;
use crate::error::SchemaError;
use crate::error::ValidationErrors;
use crate::json_ext::Object;
use crate::json_ext::Value;

const SCHEMA_SOURCE_NAME: &str = "schema.graphql";
const QUERY_SOURCE_NAME: &str = "query.graphql";

/// A [`GraphqlEngine`] built on `apollo-compiler`.
///
/// Schemas are parsed and validated as SDL. Documents are validated against the schema and
/// executed with [`ResolverMap`] providing the root fields. Invalid documents, unknown
/// operations and bad variables produce a result with `errors` rather than an `Err`, so the
/// client sees them with a `200`.
#[derive(Clone, Copy, Debug, Default)]
pub struct CompilerEngine;

impl CompilerEngine {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl GraphqlEngine for CompilerEngine {
    type Schema = Arc<Valid<Schema>>;

    fn build_schema(&self, schema: &str) -> Result<Self::Schema, BoxError> {
        Schema::parse_and_validate(schema, SCHEMA_SOURCE_NAME)
            .map(Arc::new)
            .map_err(|invalid| {
                SchemaError::Validate(ValidationErrors {
                    errors: invalid.errors,
                })
                .into()
            })
    }

    async fn execute(
        &self,
        schema: &Self::Schema,
        query: &str,
        resolvers: &ResolverMap,
        context: &Context,
        variables: Option<&Object>,
        operation_name: Option<&str>,
    ) -> Result<Value, BoxError> {
        let result = execute_document(schema, query, resolvers, context, variables, operation_name);
        Ok(serde_json_bytes::to_value(result)?)
    }
}

/// The GraphQL result, serialized as `{"data": ..., "errors": [...]}`.
///
/// `data` is absent when execution did not start, `null` when a field error nulled the root.
#[derive(Debug, Default, Serialize)]
struct ExecutionResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<GraphQLError>,
}

impl ExecutionResult {
    fn request_errors(errors: Vec<GraphQLError>) -> Self {
        Self { data: None, errors }
    }
}

fn execute_document(
    schema: &Valid<Schema>,
    query: &str,
    resolvers: &ResolverMap,
    context: &Context,
    variables: Option<&Object>,
    operation_name: Option<&str>,
) -> ExecutionResult {
    let document = match ExecutableDocument::parse_and_validate(schema, query, QUERY_SOURCE_NAME) {
        Ok(document) => document,
        Err(invalid) => {
            return ExecutionResult::request_errors(
                invalid.errors.iter().map(|error| error.to_json()).collect(),
            );
        }
    };
    let operation = match document.operations.get(operation_name) {
        Ok(operation) => operation,
        Err(error) => {
            return ExecutionResult::request_errors(vec![
                error.to_graphql_error(&document.sources),
            ]);
        }
    };
    let plain_error = |message: &str| {
        ExecutionResult::request_errors(vec![GraphQLError::new(message, None, &document.sources)])
    };

    let Some(fields) = resolvers.root(operation.operation_type) else {
        return plain_error("subscriptions are not supported");
    };
    let Some(type_name) = schema.root_operation(operation.operation_type) else {
        return plain_error("the schema does not define this operation type");
    };
    let root = RootObject {
        type_name: type_name.as_str(),
        fields,
        context,
    };

    let empty = Object::new();
    let result = Execution::new(schema, &document)
        .operation(operation)
        .raw_variable_values(variables.unwrap_or(&empty))
        .execute_sync(&root);
    match result {
        Ok(response) => ExecutionResult {
            data: Some(response.data.map(Value::Object).unwrap_or(Value::Null)),
            errors: response.errors,
        },
        Err(request_error) => ExecutionResult::request_errors(vec![
            request_error.to_graphql_error(&document.sources),
        ]),
    }
}

/// The root operation type, backed by the caller's resolvers.
struct RootObject<'a> {
    type_name: &'a str,
    fields: &'a IndexMap<String, FieldResolver>,
    context: &'a Context,
}

impl ObjectValue for RootObject<'_> {
    fn type_name(&self) -> &str {
        self.type_name
    }

    fn resolve_field<'a>(
        &'a self,
        info: &'a ResolveInfo<'a>,
    ) -> Result<ResolvedValue<'a>, FieldError> {
        match self.fields.get(info.field_name()) {
            Some(resolver) => {
                let value = resolver.resolve(info.arguments(), self.context)?;
                Ok(resolve_value(value, info))
            }
            None => Ok(ResolvedValue::leaf(Value::Null)),
        }
    }
}

/// An object below the root, resolved from the JSON a root resolver returned.
struct JsonObject {
    type_name: String,
    fields: Object,
}

impl ObjectValue for JsonObject {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn resolve_field<'a>(
        &'a self,
        info: &'a ResolveInfo<'a>,
    ) -> Result<ResolvedValue<'a>, FieldError> {
        let value = self
            .fields
            .get(info.field_name())
            .cloned()
            .unwrap_or(Value::Null);
        Ok(resolve_value(value, info))
    }
}

fn resolve_value<'a>(value: Value, info: &'a ResolveInfo<'a>) -> ResolvedValue<'a> {
    match value {
        Value::Object(fields) => {
            let type_name = match fields.get("__typename") {
                Some(Value::String(type_name)) => type_name.as_str().to_string(),
                _ => info
                    .field_definition()
                    .ty
                    .inner_named_type()
                    .as_str()
                    .to_string(),
            };
            ResolvedValue::object(JsonObject { type_name, fields })
        }
        Value::Array(values) => ResolvedValue::List(Box::new(
            values
                .into_iter()
                .map(move |value| Ok::<_, FieldError>(resolve_value(value, info))),
        )),
        leaf => ResolvedValue::leaf(leaf),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json_bytes::json;

    use super::*;

    const SCHEMA: &str = r#"
        type Query {
            hello(name: String): String
            me: User
            users: [User]
            node: Node
        }
        type Mutation {
            rename(name: String!): User
        }
        interface Node {
            id: ID!
        }
        type User implements Node {
            id: ID!
            name: String
            friends: [User]
        }
    "#;

    fn resolvers() -> ResolverMap {
        ResolverMap::new()
            .query_field(
                "hello",
                FieldResolver::function(|arguments, _| {
                    let name = arguments
                        .get("name")
                        .and_then(Value::as_str)
                        .unwrap_or("world");
                    Ok(Value::from(format!("hello {name}")))
                }),
            )
            .query_field(
                "me",
                json!({
                    "id": "1",
                    "name": "Ada",
                    "friends": [{ "id": "2", "name": "Grace" }]
                }),
            )
            .query_field(
                "node",
                json!({ "__typename": "User", "id": "3", "name": "Barbara" }),
            )
            .mutation_field(
                "rename",
                FieldResolver::function(|arguments, _| {
                    Ok(json!({ "id": "1", "name": arguments["name"].clone() }))
                }),
            )
    }

    async fn run(query: &str, variables: Option<Value>, operation_name: Option<&str>) -> Value {
        let engine = CompilerEngine::new();
        let schema = engine.build_schema(SCHEMA).unwrap();
        let variables = variables.map(|v| v.as_object().cloned().unwrap());
        engine
            .execute(
                &schema,
                query,
                &resolvers(),
                &Context::new(),
                variables.as_ref(),
                operation_name,
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn resolves_arguments_variables_and_aliases() {
        let result = run(
            r#"query ($name: String) { hiWorld: hello, hiBob: hello(name: "Bob"), hiVariable: hello(name: $name) }"#,
            Some(json!({ "name": "Bill" })),
            None,
        )
        .await;
        assert_eq!(
            result,
            json!({
                "data": {
                    "hiWorld": "hello world",
                    "hiBob": "hello Bob",
                    "hiVariable": "hello Bill"
                }
            })
        );
    }

    #[tokio::test]
    async fn resolves_nested_objects_from_json() {
        let result = run("{ me { name friends { name } } users { name } }", None, None).await;
        assert_eq!(
            result,
            json!({
                "data": {
                    "me": { "name": "Ada", "friends": [{ "name": "Grace" }] },
                    "users": null
                }
            })
        );
    }

    #[tokio::test]
    async fn abstract_types_use_typename() {
        let result = run("{ node { __typename ... on User { name } } }", None, None).await;
        assert_eq!(
            result,
            json!({ "data": { "node": { "__typename": "User", "name": "Barbara" } } })
        );
    }

    #[tokio::test]
    async fn selects_the_named_operation() {
        let result = run(
            r#"query A { hello } mutation B { rename(name: "Lin") { id name } }"#,
            None,
            Some("B"),
        )
        .await;
        assert_eq!(
            result,
            json!({ "data": { "rename": { "id": "1", "name": "Lin" } } })
        );
    }

    #[tokio::test]
    async fn invalid_documents_produce_errors_without_data() {
        let result = run("{ doesNotExist }", None, None).await;
        let object = result.as_object().unwrap();
        assert!(object.get("data").is_none());
        assert!(!object["errors"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_operations_produce_errors() {
        let result = run("query A { hello }", None, Some("Nope")).await;
        let object = result.as_object().unwrap();
        assert!(object.get("data").is_none());
        assert!(!object["errors"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn field_errors_are_reported_next_to_data() {
        let engine = CompilerEngine::new();
        let schema = engine.build_schema(SCHEMA).unwrap();
        let resolvers = ResolverMap::new().query_field(
            "hello",
            FieldResolver::function(|_, _| {
                Err(FieldError {
                    message: "no greeting today".to_string(),
                })
            }),
        );
        let result = engine
            .execute(&schema, "{ hello }", &resolvers, &Context::new(), None, None)
            .await
            .unwrap();
        let object = result.as_object().unwrap();
        assert_eq!(object["data"], json!({ "hello": null }));
        assert_eq!(object["errors"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn invalid_schemas_are_rejected() {
        let error = CompilerEngine::new()
            .build_schema("type Query { hello: Missing }")
            .unwrap_err();
        assert!(error.to_string().starts_with("GraphQL validation error"));
    }
}
