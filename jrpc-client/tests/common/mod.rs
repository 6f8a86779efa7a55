//! Common test utilities for jrpc-client integration tests
//!
//! This module provides a scripted in-memory transport and a mock HTTP
//! server, so client behavior can be tested without a real peer.

#![allow(dead_code)]

use async_trait::async_trait;
use jrpc_client::Transport;
use jrpc_core::{Error, ErrorObject, IdValue, Request, Response, Result};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;
use warp::Filter;

type Reply = dyn Fn(&[Request], bool) -> Result<Option<Vec<Response>>> + Send + Sync;

/// In-memory transport answering with a scripted reply
///
/// Every call is recorded so tests can inspect what the client sent.
pub struct MockTransport {
    reply: Box<Reply>,
    sent: Mutex<Vec<(Vec<Request>, bool)>>,
}

impl MockTransport {
    /// Transport answering every send with `reply`
    pub fn new<F>(reply: F) -> Arc<Self>
    where
        F: Fn(&[Request], bool) -> Result<Option<Vec<Response>>> + Send + Sync + 'static,
    {
        Arc::new(Self {
            reply: Box::new(reply),
            sent: Mutex::new(Vec::new()),
        })
    }

    /// Transport answering each request with `result`, echoing its id
    pub fn echoing(result: Value) -> Arc<Self> {
        Self::new(move |requests, _batch| {
            Ok(Some(
                requests
                    .iter()
                    .filter(|r| !r.is_notification())
                    .map(|r| Response::success(result.clone(), r.id.clone()))
                    .collect(),
            ))
        })
    }

    /// Transport that always fails with the given error
    pub fn failing(make_error: fn() -> Error) -> Arc<Self> {
        Self::new(move |_requests, _batch| Err(make_error()))
    }

    /// Every send so far, as (requests, batch flag)
    pub fn sent(&self) -> Vec<(Vec<Request>, bool)> {
        self.sent.lock().unwrap().clone()
    }

    /// Requests of the most recent send
    pub fn last_requests(&self) -> Vec<Request> {
        self.sent().pop().map(|(requests, _)| requests).unwrap_or_default()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, requests: &[Request], batch: bool) -> Result<Option<Vec<Response>>> {
        self.sent.lock().unwrap().push((requests.to_vec(), batch));
        (self.reply)(requests, batch)
    }
}

/// What the mock HTTP server saw for one request
#[derive(Debug, Clone)]
pub struct Received {
    pub headers: warp::http::HeaderMap,
    pub body: Value,
}

/// Mock JSON-RPC HTTP server built on warp
///
/// The handler receives the decoded request body and returns the status code
/// and raw reply body.
pub struct MockHttpServer {
    addr: SocketAddr,
    received: Arc<Mutex<Vec<Received>>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockHttpServer {
    /// Start a server answering immediately
    pub async fn start<F>(handler: F) -> Self
    where
        F: Fn(Value) -> (u16, String) + Send + Sync + 'static,
    {
        Self::start_delayed(Duration::ZERO, handler).await
    }

    /// Start a server that waits `delay` before answering
    pub async fn start_delayed<F>(delay: Duration, handler: F) -> Self
    where
        F: Fn(Value) -> (u16, String) + Send + Sync + 'static,
    {
        let handler = Arc::new(handler);
        let received = Arc::new(Mutex::new(Vec::new()));
        let log = received.clone();

        let route = warp::post()
            .and(warp::header::headers_cloned())
            .and(warp::body::bytes())
            .and_then(
                move |headers: warp::http::HeaderMap, body: warp::hyper::body::Bytes| {
                    let handler = handler.clone();
                    let log = log.clone();
                    async move {
                        let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
                        log.lock().unwrap().push(Received {
                            headers,
                            body: body.clone(),
                        });

                        if !delay.is_zero() {
                            tokio::time::sleep(delay).await;
                        }

                        let (status, reply) = (*handler)(body);
                        Ok::<_, warp::Rejection>(
                            warp::http::Response::builder()
                                .status(status)
                                .header("content-type", "application/json")
                                .body(reply)
                                .unwrap(),
                        )
                    }
                },
            );

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let (addr, server) =
            warp::serve(route).bind_with_graceful_shutdown(([127, 0, 0, 1], 0), async {
                shutdown_rx.await.ok();
            });
        tokio::spawn(server);

        Self {
            addr,
            received,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Server answering every call with `calculator`, as a JSON-RPC peer would
    pub async fn calculator() -> Self {
        Self::start(|body| (200, answer(&body))).await
    }

    /// Endpoint URL
    pub fn url(&self) -> String {
        format!("http://{}/rpc", self.addr)
    }

    /// Requests received so far
    pub fn received(&self) -> Vec<Received> {
        self.received.lock().unwrap().clone()
    }

    /// Stop the server
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

/// Reply body for a request object or batch array, answered by [`calculator`]
///
/// Notifications get no entry; a batch of only notifications (or a single
/// notification) gets an empty body.
pub fn answer(body: &Value) -> String {
    match body {
        Value::Array(requests) => {
            let replies: Vec<Value> = requests.iter().filter_map(calculator).collect();
            if replies.is_empty() {
                String::new()
            } else {
                Value::Array(replies).to_string()
            }
        }
        request => calculator(request).map(|r| r.to_string()).unwrap_or_default(),
    }
}

/// Answer one request the way a small calculator service would
///
/// Supports `add`, `multiply` and `divide` over `{"a": .., "b": ..}`, plus
/// `echo`. Returns `None` for notifications.
pub fn calculator(request: &Value) -> Option<Value> {
    let id = request.get("id")?.clone();
    let method = request["method"].as_str().unwrap_or_default();
    let a = request["params"]["a"].as_i64();
    let b = request["params"]["b"].as_i64();

    let outcome = match (method, a, b) {
        ("add", Some(a), Some(b)) => Ok(json!(a + b)),
        ("multiply", Some(a), Some(b)) => Ok(json!(a * b)),
        ("divide", Some(_), Some(0)) => Err(ErrorObject::with_data(
            -32000,
            "division by zero",
            json!({"dividend": a}),
        )),
        ("divide", Some(a), Some(b)) => Ok(json!(a / b)),
        ("add" | "multiply" | "divide", _, _) => Err(ErrorObject::new(-32602, "Invalid params")),
        ("echo", _, _) => Ok(request.get("params").cloned().unwrap_or(Value::Null)),
        _ => Err(ErrorObject::new(-32601, "Method not found")),
    };

    Some(match outcome {
        Ok(result) => json!({"jsonrpc": "2.0", "id": id, "result": result}),
        Err(error) => json!({"jsonrpc": "2.0", "id": id, "error": error}),
    })
}

/// Successful response with the given integer id
pub fn ok_response(id: i64, result: Value) -> Response {
    Response::success(result, IdValue::from_integer(id))
}

/// Error response with the given integer id
pub fn error_response(id: i64, code: i64, message: &str) -> Response {
    Response::failure(ErrorObject::new(code, message), IdValue::from_integer(id))
}
