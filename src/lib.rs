//! JRPC - typed JSON-RPC 2.0 client
//!
//! This is the main convenience crate that re-exports the JRPC sub-crates.
//! Use this crate if you want a single dependency for both the core types and
//! the client.
//!
//! # Architecture
//!
//! JRPC is organized into modular crates:
//!
//! - **jrpc-core**: Id type, envelopes, codec, error handling, observability
//! - **jrpc-client**: Typed client, batch correlation, transports
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use jrpc::{HttpTransport, Invoke, JrpcClient};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize)]
//! struct AddParams { a: i32, b: i32 }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = JrpcClient::new(HttpTransport::new("http://localhost:8080/rpc"));
//!
//!     let mut add: Invoke<AddParams, i32> = Invoke::new("add", AddParams { a: 5, b: 3 });
//!     client.invoke(&mut add).await?;
//!     println!("Result: {:?}", add.result());
//!
//!     Ok(())
//! }
//! ```

// Re-export all public APIs from sub-crates
pub use jrpc_client as client;
pub use jrpc_core as core;

// Convenience re-exports of the most commonly used types
pub use jrpc_client::{AsNotification, HttpTransport, Invoke, JrpcClient, MethodCaller, Payload};
pub use jrpc_core::{Error, IdValue, Result};
