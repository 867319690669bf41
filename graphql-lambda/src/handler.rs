//! The Lambda entry point: a [`tower::Service`] over API Gateway proxy events.
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::task::Poll;

use futures::FutureExt;
use futures::future::BoxFuture;
use lambda_runtime::LambdaEvent;
use tower::BoxError;
use tower::Service;
use tracing::Instrument;

use crate::configuration::ConfigurationError;
use crate::context::Context;
use crate::engine::GraphqlEngine;
use crate::engine::ResolverMap;
use crate::logger::ErrorLogger;
use crate::request::ProxyEvent;
use crate::responder::Responder;
use crate::response::ProxyResponse;

pub(crate) const REQUEST_SPAN_NAME: &str = "graphql_lambda.request";

/// Serves one GraphQL schema from a Lambda function.
///
/// ```ignore
/// let handler = GraphqlHandler::builder()
///     .engine(Arc::new(CompilerEngine::new()))
///     .schema(sdl)
///     .resolvers(resolvers)
///     .build()?;
/// lambda_runtime::run(handler).await?;
/// ```
///
/// Every invocation resolves to `Ok` with a [`ProxyResponse`], including requests that were
/// rejected or failed. `Err` is only produced when the invocation panicked.
pub struct GraphqlHandler<E: GraphqlEngine> {
    responder: Responder<E>,
    schema: Arc<String>,
    resolvers: Arc<ResolverMap>,
    context: Context,
    logger: Option<Arc<dyn ErrorLogger>>,
}

impl<E: GraphqlEngine> Clone for GraphqlHandler<E> {
    fn clone(&self) -> Self {
        Self {
            responder: self.responder.clone(),
            schema: self.schema.clone(),
            resolvers: self.resolvers.clone(),
            context: self.context.clone(),
            logger: self.logger.clone(),
        }
    }
}

#[buildstructor::buildstructor]
impl<E: GraphqlEngine> GraphqlHandler<E> {
    /// Fails with [`ConfigurationError::MissingOption`] when the schema or the engine is missing.
    ///
    /// Without resolvers every root field resolves to `null`. The `context` is the base every
    /// invocation's context is derived from.
    #[builder(visibility = "pub")]
    fn new(
        engine: Option<Arc<E>>,
        schema: Option<String>,
        resolvers: Option<ResolverMap>,
        context: Option<Context>,
        logger: Option<Arc<dyn ErrorLogger>>,
    ) -> Result<Self, ConfigurationError> {
        let schema = schema.ok_or(ConfigurationError::MissingOption("options.schema"))?;
        let engine = engine.ok_or(ConfigurationError::MissingOption("options.engine"))?;
        Ok(Self {
            responder: Responder::builder().engine(engine).build()?,
            schema: Arc::new(schema),
            resolvers: Arc::new(resolvers.unwrap_or_default()),
            context: context.unwrap_or_default(),
            logger,
        })
    }

    /// Handle a single proxy event.
    pub async fn handle(&self, event: ProxyEvent) -> Result<ProxyResponse, BoxError> {
        let event = Arc::new(event);
        let span = tracing::info_span!(
            REQUEST_SPAN_NAME,
            "http.method" = %event.http_method,
            "http.response.status_code" = tracing::field::Empty,
        );
        let context = Context::for_request(&self.context, event.clone());
        let request = event.normalize();

        let response = AssertUnwindSafe(self.responder.respond(
            &self.schema,
            request,
            &self.resolvers,
            &context,
            self.logger.as_deref(),
        ))
        .catch_unwind()
        .instrument(span.clone())
        .await;

        match response {
            Ok(response) => {
                span.record("http.response.status_code", response.status_code.as_u16());
                Ok(response)
            }
            Err(panic) => {
                let message = panic_message(panic);
                tracing::error!(parent: &span, panic = %message, "GraphQL request panicked");
                Err(message.into())
            }
        }
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    match panic.downcast::<String>() {
        Ok(message) => *message,
        Err(panic) => match panic.downcast::<&'static str>() {
            Ok(message) => message.to_string(),
            Err(_) => "handler panicked".to_string(),
        },
    }
}

impl<E: GraphqlEngine> Service<LambdaEvent<ProxyEvent>> for GraphqlHandler<E> {
    type Response = ProxyResponse;
    type Error = BoxError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, event: LambdaEvent<ProxyEvent>) -> Self::Future {
        let this = self.clone();
        Box::pin(async move { this.handle(event.payload).await })
    }
}
