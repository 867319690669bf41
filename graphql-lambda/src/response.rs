//! The API Gateway proxy response handed back to the Lambda runtime.
use http::StatusCode;
use indexmap::IndexMap;
use serde::Deserialize;
use serde::Serialize;

use crate::error::NormalizationError;

pub(crate) const ACCEPT: &str = "Accept";
pub(crate) const CONTENT_TYPE: &str = "Content-Type";

/// Body sent when execution fails for a reason the caller should not see.
pub const INTERNAL_SERVER_ERROR_BODY: &str = "Internal Server Error";

/// A proxy integration response: `{ statusCode, headers?, body }`.
///
/// One is produced per invocation. The body is always a string; on success it holds the
/// JSON-serialized GraphQL result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct ProxyResponse {
    #[serde(with = "http_serde::status_code")]
    pub status_code: StatusCode,

    /// Serialized as a JSON object (`{"Accept": "GET, POST"}`), the shape API Gateway reads
    /// from a proxy integration response. Absent when there are no headers to send.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub headers: Option<IndexMap<String, String>>,

    pub body: String,
}

#[buildstructor::buildstructor]
impl ProxyResponse {
    #[builder(visibility = "pub")]
    fn new(
        status_code: StatusCode,
        headers: Option<IndexMap<String, String>>,
        body: String,
    ) -> Self {
        Self {
            status_code,
            headers,
            body,
        }
    }

    /// A `200 OK` carrying an already serialized JSON body.
    pub fn json(body: String) -> Self {
        Self {
            status_code: StatusCode::OK,
            headers: Some(IndexMap::from([(
                CONTENT_TYPE.to_string(),
                mime::APPLICATION_JSON.essence_str().to_string(),
            )])),
            body,
        }
    }

    /// The opaque `500` returned for anything that is not a [`NormalizationError`].
    pub fn internal_server_error() -> Self {
        Self {
            status_code: StatusCode::INTERNAL_SERVER_ERROR,
            headers: None,
            body: INTERNAL_SERVER_ERROR_BODY.to_string(),
        }
    }
}

impl From<NormalizationError> for ProxyResponse {
    fn from(error: NormalizationError) -> Self {
        Self {
            status_code: error.status_code(),
            headers: error.headers(),
            body: error.body(),
        }
    }
}
