//! Where unexpected execution failures are reported.
use tower::BoxError;

/// Receives every failure that is turned into an opaque `500 Internal Server Error`.
///
/// Called exactly once per failed invocation, with the original error.
#[cfg_attr(test, mockall::automock)]
pub trait ErrorLogger: Send + Sync + 'static {
    fn error(&self, error: &BoxError);
}

/// The default [`ErrorLogger`]: emits a `tracing` error event.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLogger;

impl ErrorLogger for TracingLogger {
    fn error(&self, error: &BoxError) {
        tracing::error!(
            error = %error,
            error.debug = ?error,
            "GraphQL request failed with an internal error"
        );
    }
}

impl<F> ErrorLogger for F
where
    F: Fn(&BoxError) + Send + Sync + 'static,
{
    fn error(&self, error: &BoxError) {
        self(error)
    }
}
