//! Running a normalized request through the engine and mapping the outcome to a response.
use std::sync::Arc;

use crate::configuration::ConfigurationError;
use crate::context::Context;
use crate::engine::GraphqlEngine;
use crate::engine::ResolverMap;
use crate::error::ExecutionError;
use crate::error::NormalizationError;
use crate::logger::ErrorLogger;
use crate::logger::TracingLogger;
use crate::request::NormalizedQuery;
use crate::response::ProxyResponse;

/// Maps the outcome of a GraphQL request to a [`ProxyResponse`].
///
/// * success: `200`, `Content-Type: application/json`, the serialized result as body
/// * [`NormalizationError`]: the status, headers and body of the error; the engine is not called
/// * anything else: logged once, then an opaque `500 Internal Server Error`
pub struct Responder<E: GraphqlEngine> {
    engine: Arc<E>,
}

impl<E: GraphqlEngine> Clone for Responder<E> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
        }
    }
}

#[buildstructor::buildstructor]
impl<E: GraphqlEngine> Responder<E> {
    /// Fails with [`ConfigurationError::MissingOption`] when no engine is given.
    #[builder(visibility = "pub")]
    fn new(engine: Option<Arc<E>>) -> Result<Self, ConfigurationError> {
        let engine = engine.ok_or(ConfigurationError::MissingOption("options.engine"))?;
        Ok(Self { engine })
    }

    pub fn engine(&self) -> &Arc<E> {
        &self.engine
    }

    /// Produce the response for one request. Never fails.
    ///
    /// Unexpected failures go to `logger`, or to [`TracingLogger`] when none is given.
    pub async fn respond(
        &self,
        schema: &str,
        request: Result<NormalizedQuery, NormalizationError>,
        resolvers: &ResolverMap,
        context: &Context,
        logger: Option<&dyn ErrorLogger>,
    ) -> ProxyResponse {
        match self.execute(schema, request, resolvers, context).await {
            Ok(body) => ProxyResponse::json(body),
            Err(ExecutionError::Normalization(error)) => {
                tracing::debug!(
                    code = error.extension_code(),
                    status = error.status_code().as_u16(),
                    "GraphQL request rejected"
                );
                error.into()
            }
            Err(ExecutionError::ExecutionFailure(error)) => {
                logger.unwrap_or(&TracingLogger).error(&error);
                ProxyResponse::internal_server_error()
            }
        }
    }

    /// Run the request and serialize its result.
    pub async fn execute(
        &self,
        schema: &str,
        request: Result<NormalizedQuery, NormalizationError>,
        resolvers: &ResolverMap,
        context: &Context,
    ) -> Result<String, ExecutionError> {
        let request = request?;
        let schema = self
            .engine
            .build_schema(schema)
            .map_err(ExecutionError::ExecutionFailure)?;
        let result = self
            .engine
            .execute(
                &schema,
                &request.query,
                resolvers,
                context,
                request.variables.as_ref(),
                request.operation_name.as_deref(),
            )
            .await
            .map_err(ExecutionError::ExecutionFailure)?;
        serde_json::to_string(&result)
            .map_err(|error| ExecutionError::ExecutionFailure(error.into()))
    }
}
