//! Error types for jrpc
//!
//! This module holds both sides of error handling for a JSON-RPC client:
//!
//! - **Error**: everything that can make an invocation fail, from building the
//!   request through the transport to decoding the result (uses thiserror)
//! - **ErrorObject**: the `error` member of a JSON-RPC 2.0 response, exactly as
//!   it appears on the wire
//! - **RpcError**: an `ErrorObject` reported by the remote peer, tagged with the
//!   method that produced it
//!
//! # Error Categories
//!
//! - **Caller errors**: InvalidRequest, InvalidIdFormat, Observability
//! - **Transport errors**: Marshal, Invoke, StatusCode, Unmarshal
//! - **Response errors**: EmptyResponse, EmptyResult, Decode, MissingResponse
//! - **Protocol errors**: Rpc (the peer answered with an error object)
//!
//! Every variant that concerns a single call carries that call's method name,
//! available through [`Error::method`].
//!
//! # Examples
//!
//! ```rust
//! use jrpc_core::{Error, ErrorObject, RpcError};
//!
//! let remote = ErrorObject::new(-32601, "Method not found");
//! let error: Error = RpcError::from_object("math.pow", remote).into();
//!
//! assert!(error.is_rpc_error());
//! assert_eq!(error.method(), Some("math.pow"));
//! assert_eq!(error.as_rpc_error().map(|e| e.code), Some(-32601));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type for jrpc operations
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed cause used by transport failures whose concrete type depends on the transport
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Invalid JSON was received by the server
pub const PARSE_ERROR: i64 = -32700;
/// The JSON sent is not a valid Request object
pub const INVALID_REQUEST: i64 = -32600;
/// The method does not exist / is not available
pub const METHOD_NOT_FOUND: i64 = -32601;
/// Invalid method parameter(s)
pub const INVALID_PARAMS: i64 = -32602;
/// Internal JSON-RPC error
pub const INTERNAL_ERROR: i64 = -32603;

/// Failure of a JSON-RPC invocation
///
/// The client never retries: the first failure met while sending or
/// correlating is returned as-is. Transport variants are produced by the
/// transport and passed through the client unchanged.
#[derive(Debug, Error)]
pub enum Error {
    /// An identifier could not be decoded from its JSON form
    ///
    /// Raised for JSON booleans, objects, arrays, non-integral numbers and
    /// integers outside the `i64` range.
    #[error("rpc: invalid ID format: {0}")]
    InvalidIdFormat(String),

    /// The caller asked for something that cannot be sent
    ///
    /// For example an empty batch.
    #[error("rpc: invalid request: {0}")]
    InvalidRequest(String),

    /// The request could not be turned into a wire message
    #[error("rpc: failed to marshal request [{method}]: {source}")]
    Marshal {
        /// Method of the (first) request being sent
        method: String,
        /// Underlying serializer or request-builder failure
        #[source]
        source: BoxError,
    },

    /// The transport could not deliver the request or read the reply
    #[error("rpc: invoke error [{method}]: {source}")]
    Invoke {
        /// Method of the (first) request being sent
        method: String,
        /// Underlying network failure
        #[source]
        source: BoxError,
    },

    /// The peer answered with a non-success transport status
    #[error("rpc: non-200 status code [{method}]: {status}")]
    StatusCode {
        /// Method of the (first) request being sent
        method: String,
        /// Status code returned by the peer
        status: u16,
    },

    /// The reply body is not a JSON-RPC response (or array of responses)
    #[error("rpc: failed to unmarshal response [{method}]: {source}")]
    Unmarshal {
        /// Method of the (first) request being sent
        method: String,
        /// Underlying parse failure
        #[source]
        source: serde_json::Error,
    },

    /// The transport succeeded but produced no response envelopes
    #[error("rpc: empty response [{method}]")]
    EmptyResponse {
        /// Method of the call (or first call of the batch)
        method: String,
    },

    /// A response envelope arrived with neither a usable result nor an error
    #[error("rpc: empty result [{method}]")]
    EmptyResult {
        /// Method whose result was missing
        method: String,
    },

    /// The result does not parse into the type the caller expects
    #[error("rpc: failed to decode result [{method}]: {source}")]
    Decode {
        /// Method whose result failed to decode
        method: String,
        /// Underlying parse failure
        #[source]
        source: serde_json::Error,
    },

    /// The remote peer reported a JSON-RPC error
    ///
    /// This is an expected outcome of a call, not a transport fault.
    #[error(transparent)]
    Rpc(#[from] RpcError),

    /// A batch reply holds no response for a call that expected one
    ///
    /// Only the first such call (in request order) is reported.
    #[error("rpc: missing response for method [{method}]")]
    MissingResponse {
        /// Method of the first call left unanswered
        method: String,
    },

    /// Telemetry could not be set up while building a client
    #[error("rpc: failed to initialize observability: {0}")]
    Observability(String),
}

impl Error {
    /// Method name the failure concerns, if it concerns a single call
    pub fn method(&self) -> Option<&str> {
        match self {
            Error::InvalidIdFormat(_) | Error::InvalidRequest(_) | Error::Observability(_) => None,
            Error::Marshal { method, .. }
            | Error::Invoke { method, .. }
            | Error::StatusCode { method, .. }
            | Error::Unmarshal { method, .. }
            | Error::EmptyResponse { method }
            | Error::EmptyResult { method }
            | Error::Decode { method, .. }
            | Error::MissingResponse { method } => Some(method),
            Error::Rpc(err) => Some(&err.method),
        }
    }

    /// The remote error, when the peer answered with a JSON-RPC error object
    pub fn as_rpc_error(&self) -> Option<&RpcError> {
        match self {
            Error::Rpc(err) => Some(err),
            _ => None,
        }
    }

    /// Whether the peer answered with a JSON-RPC error object
    pub fn is_rpc_error(&self) -> bool {
        matches!(self, Error::Rpc(_))
    }

    /// Short, stable label used as a metrics attribute
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidIdFormat(_) => "invalid_id_format",
            Error::InvalidRequest(_) => "invalid_request",
            Error::Marshal { .. } => "marshal",
            Error::Invoke { .. } => "invoke",
            Error::StatusCode { .. } => "status_code",
            Error::Unmarshal { .. } => "unmarshal",
            Error::EmptyResponse { .. } => "empty_response",
            Error::EmptyResult { .. } => "empty_result",
            Error::Decode { .. } => "decode",
            Error::Rpc(_) => "json_rpc",
            Error::MissingResponse { .. } => "missing_response",
            Error::Observability(_) => "observability",
        }
    }
}

/// JSON-RPC 2.0 error object, as carried in a response's `error` member
///
/// # Examples
///
/// ```rust
/// use jrpc_core::ErrorObject;
/// use serde_json::json;
///
/// let error = ErrorObject::with_data(-32602, "Invalid params", json!({"missing": ["b"]}));
/// assert_eq!(error.to_string(), "JSON-RPC Error -32602: Invalid params");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorObject {
    /// Numeric error code; -32768 to -32000 are reserved by the protocol
    pub code: i64,
    /// Short description of the error
    pub message: String,
    /// Additional information about the error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ErrorObject {
    /// Create an error object without data
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Create an error object carrying additional data
    pub fn with_data(code: i64, message: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            code,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl fmt::Display for ErrorObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JSON-RPC Error {}: {}", self.code, self.message)
    }
}

impl std::error::Error for ErrorObject {}

/// A JSON-RPC error reported by the remote peer for a given method
#[derive(Debug, Clone, PartialEq)]
pub struct RpcError {
    /// Method that produced the error
    pub method: String,
    /// Error code from the peer
    pub code: i64,
    /// Error message from the peer
    pub message: String,
    /// Optional error data from the peer
    pub data: Option<serde_json::Value>,
}

impl RpcError {
    /// Attach a method name to a wire error object
    pub fn from_object(method: impl Into<String>, error: ErrorObject) -> Self {
        Self {
            method: method.into(),
            code: error.code,
            message: error.message,
            data: error.data,
        }
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.data {
            Some(data) => write!(
                f,
                "rpc: JSON-RPC error [{}] code={}: {}, data={}",
                self.method, self.code, self.message, data
            ),
            None => write!(
                f,
                "rpc: JSON-RPC error [{}] code={}: {}",
                self.method, self.code, self.message
            ),
        }
    }
}

impl std::error::Error for RpcError {}
