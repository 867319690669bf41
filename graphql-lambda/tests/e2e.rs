use std::sync::Arc;
use std::sync::Mutex;

use graphql_lambda::CompilerEngine;
use graphql_lambda::Configuration;
use graphql_lambda::Context;
use graphql_lambda::ErrorLogger;
use graphql_lambda::FieldResolver;
use graphql_lambda::GraphqlEngine;
use graphql_lambda::GraphqlHandler;
use graphql_lambda::ProxyEvent;
use graphql_lambda::ProxyResponse;
use graphql_lambda::ResolverMap;
use graphql_lambda::json_ext::Object;
use graphql_lambda::json_ext::Value;
use http::StatusCode;
use lambda_runtime::LambdaEvent;
use pretty_assertions::assert_eq;
use serde_json::json;
use tower::BoxError;
use tower::ServiceExt;

const SCHEMA: &str = include_str!("fixtures/hello.graphql");
const QUERY: &str = "query HelloQuery($name: String) { hello(name: $name) }";

fn resolvers() -> ResolverMap {
    ResolverMap::new().query_field(
        "hello",
        FieldResolver::function(|arguments, _| {
            let name = arguments
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or("world");
            Ok(Value::from(format!("hello {name}")))
        }),
    )
}

fn handler() -> GraphqlHandler<CompilerEngine> {
    GraphqlHandler::builder()
        .engine(Arc::new(CompilerEngine::new()))
        .schema(SCHEMA.to_string())
        .resolvers(resolvers())
        .build()
        .unwrap()
}

async fn invoke<E: GraphqlEngine>(
    handler: GraphqlHandler<E>,
    event: serde_json::Value,
) -> ProxyResponse {
    let event: ProxyEvent = serde_json::from_value(event).unwrap();
    handler
        .oneshot(LambdaEvent::new(event, lambda_runtime::Context::default()))
        .await
        .unwrap()
}

/// What the engine produces for the same request when called without the adapter.
async fn expected_body(variables: serde_json::Value) -> String {
    let engine = CompilerEngine::new();
    let schema = engine.build_schema(SCHEMA).unwrap();
    let variables: Object = serde_json::from_value(variables).unwrap();
    let result = engine
        .execute(
            &schema,
            QUERY,
            &resolvers(),
            &Context::new(),
            Some(&variables),
            None,
        )
        .await
        .unwrap();
    serde_json::to_string(&result).unwrap()
}

#[test_log::test(tokio::test)]
async fn get_requests_match_the_engine() {
    let response = invoke(
        handler(),
        json!({
            "httpMethod": "GET",
            "queryStringParameters": {
                "query": QUERY,
                "variables": json!({ "name": "Bill" }).to_string()
            }
        }),
    )
    .await;

    assert_eq!(response.status_code, StatusCode::OK);
    assert_eq!(
        response
            .headers
            .unwrap()
            .get("Content-Type")
            .map(String::as_str),
        Some("application/json")
    );
    assert_eq!(response.body, expected_body(json!({ "name": "Bill" })).await);
    assert_eq!(
        serde_json::from_str::<serde_json::Value>(&response.body).unwrap(),
        json!({ "data": { "hello": "hello Bill" } })
    );
}

#[tokio::test]
async fn post_requests_with_a_json_body() {
    let response = invoke(
        handler(),
        json!({
            "httpMethod": "POST",
            "body": json!({
                "query": QUERY,
                "operation": "HelloQuery",
                "variables": { "name": "Ada" }
            })
            .to_string()
        }),
    )
    .await;

    assert_eq!(response.status_code, StatusCode::OK);
    assert_eq!(response.body, expected_body(json!({ "name": "Ada" })).await);
}

#[tokio::test]
async fn post_requests_with_a_graphql_body() {
    let response = invoke(
        handler(),
        json!({
            "httpMethod": "POST",
            "headers": { "Content-Type": "application/graphql" },
            "body": QUERY,
            "queryStringParameters": {
                "variables": json!({ "name": "Grace" }).to_string()
            }
        }),
    )
    .await;

    assert_eq!(response.status_code, StatusCode::OK);
    assert_eq!(response.body, expected_body(json!({ "name": "Grace" })).await);
}

#[tokio::test]
async fn graphql_errors_are_successful_responses() {
    let response = invoke(
        handler(),
        json!({
            "httpMethod": "GET",
            "queryStringParameters": { "query": "{ goodbye }" }
        }),
    )
    .await;

    assert_eq!(response.status_code, StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&response.body).unwrap();
    assert!(body.get("data").is_none());
    assert!(!body["errors"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn unsupported_methods() {
    let response = invoke(handler(), json!({ "httpMethod": "DELETE" })).await;
    assert_eq!(
        serde_json::to_value(response).unwrap(),
        json!({
            "statusCode": 405,
            "headers": { "Accept": "GET, POST" },
            "body": "Method not allowed. See Accept header for allowed methods."
        })
    );
}

#[tokio::test]
async fn bad_requests() {
    let cases = [
        (
            json!({ "httpMethod": "POST", "body": "Not JSON" }),
            "Bad Request. Body is not a valid JSON string. If you are trying to send graphql as the body, please set your \"Content-Type\" header to \"application/graphql\"",
        ),
        (
            json!({ "httpMethod": "GET", "queryStringParameters": { "query": QUERY, "variables": "[" } }),
            "Bad Request. Variables property is not a valid JSON string.",
        ),
        (
            json!({ "httpMethod": "GET" }),
            "Bad Request. Request must contain a GaphQL Query",
        ),
    ];

    for (event, body) in cases {
        let response = invoke(handler(), event).await;
        assert_eq!(response.status_code, StatusCode::BAD_REQUEST);
        assert_eq!(response.headers, None);
        assert_eq!(response.body, body);
    }
}

struct UnavailableEngine;

#[async_trait::async_trait]
impl GraphqlEngine for UnavailableEngine {
    type Schema = ();

    fn build_schema(&self, _schema: &str) -> Result<Self::Schema, BoxError> {
        Ok(())
    }

    async fn execute(
        &self,
        _schema: &Self::Schema,
        _query: &str,
        _resolvers: &ResolverMap,
        _context: &Context,
        _variables: Option<&Object>,
        _operation_name: Option<&str>,
    ) -> Result<Value, BoxError> {
        Err("engine unavailable".into())
    }
}

#[tokio::test]
async fn engine_failures_are_logged_once() {
    let logged = Arc::new(Mutex::new(Vec::new()));
    let sink = logged.clone();
    let logger: Arc<dyn ErrorLogger> = Arc::new(move |error: &BoxError| {
        sink.lock().unwrap().push(error.to_string());
    });
    let handler = GraphqlHandler::builder()
        .engine(Arc::new(UnavailableEngine))
        .schema(SCHEMA.to_string())
        .logger(logger)
        .build()
        .unwrap();

    let response = invoke(
        handler,
        json!({
            "httpMethod": "GET",
            "queryStringParameters": { "query": QUERY }
        }),
    )
    .await;

    assert_eq!(
        serde_json::to_value(response).unwrap(),
        json!({ "statusCode": 500, "body": "Internal Server Error" })
    );
    assert_eq!(*logged.lock().unwrap(), vec!["engine unavailable".to_string()]);
}

#[tokio::test]
async fn serves_static_data_from_configuration() {
    let configuration = Configuration::from_yaml(
        r#"
schema: |
  type Query { hello(name: String): String }
query:
  hello: hello from yaml
"#,
    )
    .unwrap();
    let handler = GraphqlHandler::builder()
        .engine(Arc::new(CompilerEngine::new()))
        .schema(configuration.load_schema().unwrap())
        .resolvers(configuration.resolvers())
        .build()
        .unwrap();

    let response = invoke(
        handler,
        json!({
            "httpMethod": "POST",
            "body": json!({ "query": "{ hello }" }).to_string()
        }),
    )
    .await;

    assert_eq!(response.status_code, StatusCode::OK);
    assert_eq!(response.body, r#"{"data":{"hello":"hello from yaml"}}"#);
}
