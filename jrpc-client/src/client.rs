//! Typed JSON-RPC client
//!
//! This module provides [`JrpcClient`], which turns invocation descriptors into
//! wire requests, hands them to a [`Transport`], and writes each response back
//! into the descriptor it answers.
//!
//! # Call Lifecycle
//!
//! 1. **Build**: the descriptor produces its wire request
//! 2. **Assign**: a request without an id gets one from the id generator,
//!    unless it is a notification
//! 3. **Send**: the transport delivers the request (or batch)
//! 4. **Correlate**: a batch reply is matched to requests by id, not position
//! 5. **Decode**: each result is decoded into its descriptor's response slot
//!
//! The first failure ends the call. In a batch, slots decoded before the
//! failure keep their values.
//!
//! # Cloning
//!
//! `JrpcClient` is cheaply cloneable. Clones share the transport and the id
//! generator, so ids stay unique across all of them.
//!
//! # Concurrency
//!
//! Nothing is locked while a call is in flight; the id generator is the only
//! shared mutable state. Any number of calls may run concurrently as long as
//! each uses its own descriptors.

use crate::client_builder::ClientBuilder;
use crate::id_generator::{IdGenerator, SequenceIdGenerator};
use crate::invoke::MethodCaller;
use crate::metrics::ClientMetrics;
use crate::transport::Transport;
use jrpc_core::{Error, IdValue, Response, Result, RpcError};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

/// JSON-RPC 2.0 client over an arbitrary transport
#[derive(Clone)]
pub struct JrpcClient {
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) generate_id: IdGenerator,
    pub(crate) metrics: Option<Arc<ClientMetrics>>,
}

impl JrpcClient {
    /// Client with the default sequence id generator and no metrics
    ///
    /// Use [`JrpcClient::builder`] for anything else.
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Arc::new(transport),
            generate_id: SequenceIdGenerator::new().into_generator(),
            metrics: None,
        }
    }

    /// Start configuring a client
    pub fn builder(transport: impl Transport + 'static) -> ClientBuilder {
        ClientBuilder::new(transport)
    }

    /// Draw the next id from the client's generator
    pub fn next_id(&self) -> IdValue {
        (self.generate_id)()
    }

    /// Send one call and decode its result into the descriptor
    ///
    /// # Errors
    ///
    /// - transport failures, unchanged
    /// - `Error::EmptyResponse` if a call (not a notification) got no response
    /// - `Error::Rpc` if the peer answered with an error object; the response
    ///   slot is left untouched
    /// - `Error::EmptyResult` / `Error::Decode` from decoding the result
    #[tracing::instrument(skip(self, call), fields(method = %call.method()))]
    pub async fn invoke(&self, call: &mut dyn MethodCaller) -> Result<()> {
        let start = Instant::now();
        let method = call.method().to_string();

        let outcome = self.invoke_one(call).await;
        self.observe(&outcome, |m, status| {
            m.record_invocation(&method, status, start.elapsed().as_secs_f64())
        });
        outcome
    }

    async fn invoke_one(&self, call: &mut dyn MethodCaller) -> Result<()> {
        let mut request = call.to_request()?;
        if request.id.is_absent() && !call.is_notification() {
            request.id = self.next_id();
        }

        let responses = self
            .transport
            .send(std::slice::from_ref(&request), false)
            .await?;

        if call.is_notification() {
            tracing::debug!("Notification sent");
            return Ok(());
        }

        let response = responses
            .and_then(|responses| responses.into_iter().next())
            .ok_or_else(|| Error::EmptyResponse {
                method: request.method.clone(),
            })?;

        complete(call, &response)
    }

    /// Send several calls as one batch and decode each result into its own descriptor
    ///
    /// Responses are matched to calls by id, so the peer may answer in any
    /// order. Notifications are sent but expect no response. Calls are then
    /// completed in request order; the first missing response, peer error or
    /// decode failure stops processing and is returned.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidRequest` if `calls` is empty
    /// - transport failures, unchanged
    /// - `Error::EmptyResponse` if the peer returned no response set
    /// - `Error::MissingResponse` for the first call left unanswered
    /// - `Error::Rpc`, `Error::EmptyResult`, `Error::Decode` as for [`JrpcClient::invoke`]
    #[tracing::instrument(skip(self, calls), fields(batch_size = calls.len()))]
    pub async fn invoke_batch(&self, calls: &mut [&mut dyn MethodCaller]) -> Result<()> {
        let start = Instant::now();
        let size = calls.len() as u64;

        let outcome = self.invoke_many(calls).await;
        self.observe(&outcome, |m, status| {
            m.record_batch(size, status, start.elapsed().as_secs_f64())
        });
        outcome
    }

    async fn invoke_many(&self, calls: &mut [&mut dyn MethodCaller]) -> Result<()> {
        if calls.is_empty() {
            return Err(Error::InvalidRequest("no requests provided".to_string()));
        }

        let mut requests = Vec::with_capacity(calls.len());
        for call in calls.iter() {
            let mut request = call.to_request()?;
            if request.id.is_absent() && !call.is_notification() {
                request.id = self.next_id();
            }
            requests.push(request);
        }

        let responses = self
            .transport
            .send(&requests, true)
            .await?
            .ok_or_else(|| Error::EmptyResponse {
                method: requests[0].method.clone(),
            })?;

        tracing::debug!(responses = responses.len(), "Batch reply received");

        let by_id: HashMap<String, Response> = responses
            .into_iter()
            .filter_map(|response| response.id.correlation_key().map(|key| (key, response)))
            .collect();

        for (call, request) in calls.iter_mut().zip(&requests) {
            if request.id.is_absent() {
                continue;
            }

            let response = request
                .id
                .correlation_key()
                .and_then(|key| by_id.get(&key))
                .ok_or_else(|| {
                    tracing::warn!(method = %request.method, id = %request.id, "No response for call in batch");
                    Error::MissingResponse {
                        method: request.method.clone(),
                    }
                })?;

            complete(&mut **call, response)?;
        }

        Ok(())
    }

    fn observe(&self, outcome: &Result<()>, record: impl FnOnce(&ClientMetrics, &str)) {
        let Some(ref m) = self.metrics else {
            return;
        };

        match outcome {
            Ok(()) => record(m, "success"),
            Err(e) => {
                record(m, "error");
                m.record_error(e.kind());
            }
        }
    }
}

/// Hand a response to the call it answers, surfacing a peer error first
fn complete(call: &mut dyn MethodCaller, response: &Response) -> Result<()> {
    if let Some(error) = &response.error {
        tracing::warn!(method = %call.method(), code = error.code, message = %error.message, "Peer returned error");
        return Err(RpcError::from_object(call.method(), error.clone()).into());
    }

    call.decode_into(response)
}
