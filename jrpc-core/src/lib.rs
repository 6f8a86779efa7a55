//! Core JSON-RPC 2.0 types for jrpc
//!
//! Everything a JSON-RPC client needs before any transport is involved:
//!
//! - **Id**: [`IdValue`], the tagged `id` member (absent, string, number or null)
//! - **Types**: the [`Request`] and [`Response`] envelopes
//! - **Codec**: framing of single calls and batches as JSON bytes
//! - **Error handling**: the [`Error`] returned by every fallible operation, and
//!   the wire-level [`ErrorObject`] / peer-reported [`RpcError`]
//! - **Observability**: tracing subscriber and OpenTelemetry bootstrap
//!
//! The `jrpc-client` crate builds the typed client and the HTTP transport on
//! top of these.
//!
//! # Example
//!
//! ```rust
//! use jrpc_core::{codec, IdValue, Request};
//! use serde_json::json;
//!
//! let request = Request::new("add", Some(json!({"a": 5, "b": 3})), IdValue::from_integer(1));
//! let body = codec::encode_requests(&[request], false).unwrap();
//!
//! let reply = br#"{"jsonrpc":"2.0","id":1,"result":8}"#;
//! let responses = codec::decode_responses(reply, false, "add").unwrap().unwrap();
//!
//! assert!(!body.is_empty());
//! assert_eq!(responses[0].result, Some(json!(8)));
//! ```

pub mod codec;
pub mod error;
pub mod id;
pub mod observability;
pub mod types;

pub use error::{BoxError, Error, ErrorObject, Result, RpcError};
pub use id::{IdInteger, IdValue};
pub use observability::{init_observability, shutdown_observability, ObservabilityConfig};
pub use types::{Request, Response, JSONRPC_VERSION};
