//! Turning an API Gateway proxy event into a GraphQL request.
use std::collections::HashMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json_bytes::Value;

use crate::error::ACCEPTED_METHODS;
use crate::error::NormalizationError;
use crate::json_ext::Object;
use crate::response::CONTENT_TYPE;

/// Content type marking a body that is a raw GraphQL document rather than JSON.
pub const APPLICATION_GRAPHQL: &str = "application/graphql";

/// An API Gateway proxy integration event: `{ httpMethod, headers?, body?, queryStringParameters? }`.
///
/// Every other field of the event (`requestContext`, `path`, `stageVariables`, ...) is kept in
/// `extra` untouched, so resolvers reading the request from the context see the whole event.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct ProxyEvent {
    pub http_method: String,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub headers: Option<HashMap<String, String>>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub body: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub query_string_parameters: Option<HashMap<String, String>>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ProxyEvent {
    /// Extract the GraphQL request carried by this event.
    pub fn normalize(&self) -> Result<NormalizedQuery, NormalizationError> {
        normalize(
            &self.http_method,
            self.headers.as_ref(),
            self.body.as_deref(),
            self.query_string_parameters.as_ref(),
        )
    }
}

/// The GraphQL request extracted from a [`ProxyEvent`].
///
/// `query` is never empty: an empty query is rejected with
/// [`NormalizationError::MissingQuery`] before one of these is built.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct NormalizedQuery {
    /// The GraphQL document.
    pub query: String,

    /// Which operation of the document to run.
    ///
    /// When excluded, the document must contain a single operation.
    pub operation_name: Option<String>,

    /// Values for the operation's `$variables`.
    pub variables: Option<Object>,
}

/// Fields of a request before validation, from either the query string or a JSON body.
#[derive(Default)]
struct RawRequest {
    query: Option<String>,
    operation_name: Option<String>,
    variables: Option<Value>,
}

/// Extract a GraphQL request from the parts of a proxy event.
///
/// Query-string parameters (`query`, `operation`, `variables`) are read first. A body sent
/// with `Content-Type: application/graphql` is the query itself; any other body must be a
/// JSON object whose fields take precedence over the query string.
pub fn normalize(
    method: &str,
    headers: Option<&HashMap<String, String>>,
    body: Option<&str>,
    query_string_parameters: Option<&HashMap<String, String>>,
) -> Result<NormalizedQuery, NormalizationError> {
    validate_method(method)?;

    let from_query_string = from_query_string(query_string_parameters)?;

    let raw = if is_graphql_body(headers) {
        RawRequest {
            query: non_empty(body).map(str::to_string).or(from_query_string.query),
            ..from_query_string
        }
    } else {
        let from_body = from_json_body(body)?;
        RawRequest {
            query: from_body.query.or(from_query_string.query),
            operation_name: from_body.operation_name.or(from_query_string.operation_name),
            variables: from_body.variables.or(from_query_string.variables),
        }
    };

    let query = raw
        .query
        .filter(|query| !query.is_empty())
        .ok_or(NormalizationError::MissingQuery)?;
    let variables = raw.variables.map(coerce_variables).transpose()?;

    Ok(NormalizedQuery {
        query,
        operation_name: raw.operation_name,
        variables,
    })
}

fn validate_method(method: &str) -> Result<(), NormalizationError> {
    if ACCEPTED_METHODS
        .iter()
        .any(|accepted| accepted.as_str() == method)
    {
        Ok(())
    } else {
        Err(NormalizationError::MethodNotAllowed)
    }
}

fn is_graphql_body(headers: Option<&HashMap<String, String>>) -> bool {
    headers
        .and_then(|headers| headers.get(CONTENT_TYPE))
        .is_some_and(|content_type| content_type == APPLICATION_GRAPHQL)
}

fn from_query_string(
    parameters: Option<&HashMap<String, String>>,
) -> Result<RawRequest, NormalizationError> {
    let Some(parameters) = parameters else {
        return Ok(RawRequest::default());
    };
    let get = |key: &str| non_empty(parameters.get(key).map(String::as_str));

    let variables = get("variables")
        .map(|variables| match serde_json::from_str::<Value>(variables) {
            Ok(variables @ Value::Object(_)) => Ok(variables),
            _ => Err(NormalizationError::MalformedVariables),
        })
        .transpose()?;

    Ok(RawRequest {
        query: get("query").map(str::to_string),
        operation_name: get("operation")
            .or_else(|| get("operationName"))
            .map(str::to_string),
        variables,
    })
}

fn from_json_body(body: Option<&str>) -> Result<RawRequest, NormalizationError> {
    let Some(body) = non_empty(body) else {
        return Ok(RawRequest::default());
    };
    let json: Value = serde_json::from_str(body).map_err(|_| NormalizationError::MalformedBody)?;
    let Value::Object(mut json) = json else {
        return Ok(RawRequest::default());
    };

    let mut take_string = |key: &str| match json.remove(key) {
        Some(Value::String(value)) if !value.as_str().is_empty() => {
            Some(value.as_str().to_string())
        }
        _ => None,
    };
    let query = take_string("query");
    let operation_name = take_string("operation").or_else(|| take_string("operationName"));
    let variables = json.remove("variables").filter(|variables| !variables.is_null());

    Ok(RawRequest {
        query,
        operation_name,
        variables,
    })
}

/// Variables must end up as a JSON object. Clients may also send them JSON-encoded as a string.
fn coerce_variables(variables: Value) -> Result<Object, NormalizationError> {
    match variables {
        Value::Object(variables) => Ok(variables),
        Value::String(encoded) => match serde_json::from_str::<Value>(encoded.as_str()) {
            Ok(Value::Object(variables)) => Ok(variables),
            _ => Err(NormalizationError::MalformedVariables),
        },
        _ => Err(NormalizationError::MalformedVariables),
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}
