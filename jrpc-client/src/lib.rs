//! Typed JSON-RPC 2.0 client
//!
//! This crate provides a JSON-RPC 2.0 client that sends typed invocation
//! descriptors over a pluggable transport and correlates batch replies by id.
//!
//! # Core Features
//!
//! - **Typed calls**: [`Invoke`] binds a method to a serializable payload and
//!   a deserializable result slot
//! - **Batches**: [`JrpcClient::invoke_batch`] sends many calls in one round
//!   trip and matches responses by id, whatever order they arrive in
//! - **Notifications**: [`AsNotification`] sends a call without an id
//! - **Transports**: the [`Transport`] trait, with [`HttpTransport`] built in
//! - **Id generation**: integer sequence by default, or any custom function
//! - **Observability**: tracing spans plus optional OpenTelemetry metrics
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use jrpc_client::{HttpTransport, Invoke, JrpcClient};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = JrpcClient::new(HttpTransport::new("http://localhost:8080/rpc"));
//!
//!     let mut add: Invoke<_, i64> = Invoke::new("add", json!({"a": 5, "b": 3}));
//!     client.invoke(&mut add).await?;
//!     println!("5 + 3 = {:?}", add.result());
//!
//!     Ok(())
//! }
//! ```
//!
//! # Batches
//!
//! ```rust,no_run
//! use jrpc_client::{HttpTransport, Invoke, JrpcClient, MethodCaller};
//! use serde_json::json;
//!
//! # async fn example() -> jrpc_core::Result<()> {
//! let client = JrpcClient::new(HttpTransport::new("http://localhost:8080/rpc"));
//!
//! let mut add: Invoke<_, i64> = Invoke::new("add", json!({"a": 10, "b": 5}));
//! let mut mul: Invoke<_, i64> = Invoke::new("multiply", json!({"a": 10, "b": 5}));
//! let mut log = Invoke::<_, ()>::new("log", json!(["batch sent"])).into_notification();
//!
//! let mut calls: [&mut dyn MethodCaller; 3] = [&mut add, &mut mul, &mut log];
//! client.invoke_batch(&mut calls).await?;
//!
//! assert_eq!(add.result(), Some(&15));
//! assert_eq!(mul.result(), Some(&50));
//! # Ok(())
//! # }
//! ```

mod client;
mod client_builder;
mod http;
mod id_generator;
mod invoke;
mod metrics;
mod transport;

pub use client::JrpcClient;
pub use client_builder::ClientBuilder;
pub use http::{HttpTransport, HttpTransportBuilder};
pub use id_generator::{IdGenerator, SequenceIdGenerator};
pub use invoke::{AsNotification, Invoke, MethodCaller, Payload};
pub use metrics::{ClientMetrics, BATCH_METHOD};
pub use transport::Transport;
