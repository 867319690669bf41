//! The GraphQL engine requests are handed to once normalized.
//!
//! The adapter only needs two things from an engine: turning schema text into something it can
//! execute against, and executing a document. [`CompilerEngine`] implements both on top of
//! `apollo-compiler`.
mod compiler;
mod resolvers;

pub use compiler::CompilerEngine;
pub use resolvers::FieldError;
pub use resolvers::FieldResolver;
pub use resolvers::ResolverMap;
use tower::BoxError;

use crate::context::Context;
use crate::json_ext::Object;
use crate::json_ext::Value;

/// Parses schemas and executes GraphQL documents.
///
/// `execute` resolving to `Ok` means a GraphQL result was produced, which may itself carry
/// GraphQL `errors`. `Err` means the engine could not produce a result at all; the adapter
/// turns it into an opaque `500`.
#[async_trait::async_trait]
pub trait GraphqlEngine: Send + Sync + 'static {
    /// The executable form of a schema.
    type Schema: Send + Sync;

    fn build_schema(&self, schema: &str) -> Result<Self::Schema, BoxError>;

    async fn execute(
        &self,
        schema: &Self::Schema,
        query: &str,
        resolvers: &ResolverMap,
        context: &Context,
        variables: Option<&Object>,
        operation_name: Option<&str>,
    ) -> Result<Value, BoxError>;
}
