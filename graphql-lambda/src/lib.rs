//! Serve a GraphQL schema from an AWS Lambda function invoked with API Gateway proxy events.
//!
//! A [`GraphqlHandler`] turns each [`ProxyEvent`] into a GraphQL request, runs it through a
//! [`GraphqlEngine`] and maps the outcome to a [`ProxyResponse`]. It is a [`tower::Service`]
//! and can be handed to `lambda_runtime::run` as is.

#![warn(unreachable_pub)]

pub mod configuration;
mod context;
mod engine;
pub mod error;
mod handler;
pub mod json_ext;
mod logger;
mod request;
mod responder;
mod response;

pub use configuration::Configuration;
pub use context::Context;
pub use context::ContextValue;
pub use engine::CompilerEngine;
pub use engine::FieldError;
pub use engine::FieldResolver;
pub use engine::GraphqlEngine;
pub use engine::ResolverMap;
pub use handler::GraphqlHandler;
pub use logger::ErrorLogger;
pub use logger::TracingLogger;
pub use request::APPLICATION_GRAPHQL;
pub use request::NormalizedQuery;
pub use request::ProxyEvent;
pub use request::normalize;
pub use responder::Responder;
pub use response::INTERNAL_SERVER_ERROR_BODY;
pub use response::ProxyResponse;
