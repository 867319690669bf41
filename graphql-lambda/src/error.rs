//! Adapter errors.
use std::fmt;

use apollo_compiler::validation::DiagnosticList;
use displaydoc::Display;
use http::Method;
use http::StatusCode;
use indexmap::IndexMap;
use thiserror::Error;
use tower::BoxError;

pub use crate::configuration::ConfigurationError;
use crate::response::ACCEPT;

/// HTTP methods a GraphQL request may be sent with.
pub const ACCEPTED_METHODS: [Method; 2] = [Method::GET, Method::POST];

/// A request rejected before it reaches the GraphQL engine.
///
/// The `Display` output of each variant is the exact response body sent back to the caller.
// "GaphQL" is misspelled on purpose: clients match on these bodies.
#[derive(Error, Display, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum NormalizationError {
    /// Method not allowed. See Accept header for allowed methods.
    MethodNotAllowed,

    /// Bad Request. Variables property is not a valid JSON string.
    MalformedVariables,

    /// Bad Request. Body is not a valid JSON string. If you are trying to send graphql as the body, please set your "Content-Type" header to "application/graphql"
    MalformedBody,

    /// Bad Request. Request must contain a GaphQL Query
    MissingQuery,
}

impl NormalizationError {
    /// The HTTP status this rejection maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            NormalizationError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            NormalizationError::MalformedVariables
            | NormalizationError::MalformedBody
            | NormalizationError::MissingQuery => StatusCode::BAD_REQUEST,
        }
    }

    /// Response headers carried by this rejection, if any.
    pub fn headers(&self) -> Option<IndexMap<String, String>> {
        match self {
            NormalizationError::MethodNotAllowed => {
                let allowed = ACCEPTED_METHODS
                    .iter()
                    .map(Method::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                Some(IndexMap::from([(ACCEPT.to_string(), allowed)]))
            }
            _ => None,
        }
    }

    /// The response body for this rejection.
    pub fn body(&self) -> String {
        self.to_string()
    }

    /// A stable machine-readable code, used in logs.
    pub fn extension_code(&self) -> &'static str {
        match self {
            NormalizationError::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            NormalizationError::MalformedVariables => "MALFORMED_VARIABLES",
            NormalizationError::MalformedBody => "MALFORMED_BODY",
            NormalizationError::MissingQuery => "MISSING_QUERY",
        }
    }
}

/// Why a request did not produce a GraphQL result.
#[derive(Error, Display, Debug)]
#[non_exhaustive]
pub enum ExecutionError {
    /// {0}
    Normalization(NormalizationError),

    /// GraphQL execution failed: {0}
    ExecutionFailure(BoxError),
}

impl From<NormalizationError> for ExecutionError {
    fn from(error: NormalizationError) -> Self {
        ExecutionError::Normalization(error)
    }
}

impl ExecutionError {
    /// The HTTP status this error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ExecutionError::Normalization(error) => error.status_code(),
            ExecutionError::ExecutionFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error in a GraphQL schema handed to [`CompilerEngine`](crate::engine::CompilerEngine).
#[derive(Debug, Error, Display)]
#[non_exhaustive]
pub enum SchemaError {
    /// GraphQL validation error: {0}
    Validate(ValidationErrors),
}

/// Collection of schema parsing and validation errors.
#[derive(Debug)]
pub struct ValidationErrors {
    pub(crate) errors: DiagnosticList,
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut errors = self.errors.iter();
        for (i, error) in errors.by_ref().take(5).enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{error}")?;
        }
        let remaining = errors.count();
        if remaining > 0 {
            write!(f, "\n...and {remaining} other errors")?;
        }
        Ok(())
    }
}
