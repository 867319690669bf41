//! JSON types shared by the request, the engine and resolvers.
use serde_json_bytes::ByteString;
use serde_json_bytes::Map;

pub use serde_json_bytes::Value;

/// A JSON object.
pub type Object = Map<ByteString, Value>;
