//! Transport abstraction
//!
//! A [`Transport`] moves encoded requests to the peer and hands back whatever
//! responses came back. The client does not care how: HTTP, a pipe, or an
//! in-memory fake in tests all fit behind the same trait.
//!
//! Contract:
//!
//! - `requests` is never empty
//! - with `batch == false` there is exactly one request; a transport may still
//!   return zero responses, which the client reports as an empty response
//! - with `batch == true` all requests travel as one wire batch, and the
//!   responses are returned exactly as the peer sent them (no reordering, no
//!   padding for notifications)
//! - `Ok(None)` means the peer produced no response set at all
//! - failures are already categorized (marshal, invoke, status, unmarshal);
//!   the client passes them through unchanged
//!
//! Cancellation is by dropping the future. Deadlines belong to the transport
//! (see `HttpTransportBuilder::timeout`) or to the caller wrapping the call in
//! `tokio::time::timeout`.

use async_trait::async_trait;
use jrpc_core::{Request, Response, Result};
use std::sync::Arc;

/// Carries requests to a JSON-RPC peer
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request (`batch == false`) or a batch, returning the peer's responses
    async fn send(&self, requests: &[Request], batch: bool) -> Result<Option<Vec<Response>>>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, requests: &[Request], batch: bool) -> Result<Option<Vec<Response>>> {
        (**self).send(requests, batch).await
    }
}
