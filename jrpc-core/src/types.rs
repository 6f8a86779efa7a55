//! JSON-RPC 2.0 message envelopes
//!
//! A client only ever builds requests and reads responses, so these are the
//! two envelopes defined here. Both reference [`IdValue`] for their `id`
//! member, and both omit that member entirely when the id is absent:
//!
//! - a [`Request`] without an id is a **notification**; the peer must not
//!   answer it
//! - a [`Response`] without an id is kept as-is; it simply cannot be
//!   correlated with any request
//!
//! An id that is explicitly `null` is serialized as `"id":null` and survives a
//! round trip as [`IdValue::Null`].
//!
//! The response envelope favours pass-through fidelity over validation: a
//! response carrying both `result` and `error` decodes fine, and the client
//! gives the error precedence.

use crate::error::ErrorObject;
use crate::id::IdValue;
use serde::{Deserialize, Serialize};

/// Protocol version carried in every envelope
pub const JSONRPC_VERSION: &str = "2.0";

/// JSON-RPC 2.0 request (or notification, when the id is absent)
///
/// # Examples
///
/// ```rust
/// use jrpc_core::{IdValue, Request};
/// use serde_json::json;
///
/// let call = Request::new("subtract", Some(json!([42, 23])), IdValue::from_integer(1));
/// assert_eq!(
///     serde_json::to_string(&call).unwrap(),
///     r#"{"jsonrpc":"2.0","id":1,"method":"subtract","params":[42,23]}"#
/// );
///
/// let note = Request::notification("update", None);
/// assert_eq!(
///     serde_json::to_string(&note).unwrap(),
///     r#"{"jsonrpc":"2.0","method":"update"}"#
/// );
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    /// Protocol version, always "2.0"
    pub jsonrpc: String,
    /// Call identifier; left out of the wire form when absent
    #[serde(default, skip_serializing_if = "IdValue::is_absent")]
    pub id: IdValue,
    /// Name of the remote method
    pub method: String,
    /// Method parameters; left out of the wire form when `None`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

impl Request {
    /// Create a request with the given id
    pub fn new(method: impl Into<String>, params: Option<serde_json::Value>, id: IdValue) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            method: method.into(),
            params,
        }
    }

    /// Create a request without an id, which the peer must not answer
    pub fn notification(method: impl Into<String>, params: Option<serde_json::Value>) -> Self {
        Self::new(method, params, IdValue::Absent)
    }

    /// Whether this request is a notification
    pub fn is_notification(&self) -> bool {
        self.id.is_absent()
    }
}

/// JSON-RPC 2.0 response
///
/// `result` holds the raw JSON of the result; decoding it into a concrete type
/// is left to the caller that knows the type. A `"result": null` member reads
/// back as `None`, the same as a missing one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// Protocol version, always "2.0"
    #[serde(default = "default_version")]
    pub jsonrpc: String,
    /// Id of the request this answers
    #[serde(default, skip_serializing_if = "IdValue::is_absent")]
    pub id: IdValue,
    /// Result of the call, on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    /// Error reported by the peer, on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorObject>,
}

fn default_version() -> String {
    JSONRPC_VERSION.to_string()
}

impl Response {
    /// Create a successful response
    pub fn success(result: serde_json::Value, id: IdValue) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response
    pub fn failure(error: ErrorObject, id: IdValue) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }

    /// Whether the response carries a result
    pub fn is_success(&self) -> bool {
        self.result.is_some()
    }

    /// Whether the response carries an error
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
