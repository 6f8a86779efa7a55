//! HTTP client walkthrough
//!
//! Starts a small in-process calculator server and then calls it five ways:
//! a simple call, a remote error, a batch, a notification, and a call under
//! a deadline.
//!
//! Run with `cargo run --example http_client`.

use jrpc::client::{ClientBuilder, HttpTransport, Invoke, JrpcClient, MethodCaller};
use jrpc::core::{Error, ObservabilityConfig};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::time::Duration;
use warp::Filter;

#[derive(Debug, Serialize, Deserialize)]
struct AddParams {
    a: i64,
    b: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct SubtractParams {
    minuend: i64,
    subtrahend: i64,
}

#[derive(Debug, Serialize)]
struct NotifyParams {
    message: String,
}

/// Answer one request object; `None` for notifications
fn handle(request: &Value) -> Option<Value> {
    let method = request["method"].as_str().unwrap_or_default();
    let params = &request["params"];

    if method == "notify" {
        tracing::info!(message = %params["message"], "[SERVER] notification");
    }

    let id = request.get("id")?.clone();
    let outcome = match method {
        "add" | "slow_add" => serde_json::from_value::<AddParams>(params.clone())
            .map(|p| json!(p.a + p.b))
            .map_err(|_| json!({"code": -32602, "message": "Invalid params"})),
        "subtract" => serde_json::from_value::<SubtractParams>(params.clone())
            .map(|p| json!(p.minuend - p.subtrahend))
            .map_err(|_| json!({"code": -32602, "message": "Invalid params"})),
        "divide" => match serde_json::from_value::<AddParams>(params.clone()) {
            Ok(AddParams { b: 0, a }) => Err(json!({
                "code": -32000,
                "message": "division by zero",
                "data": {"dividend": a}
            })),
            Ok(p) => Ok(json!(p.a / p.b)),
            Err(_) => Err(json!({"code": -32602, "message": "Invalid params"})),
        },
        _ => Err(json!({"code": -32601, "message": "Method not found"})),
    };

    Some(match outcome {
        Ok(result) => json!({"jsonrpc": "2.0", "id": id, "result": result}),
        Err(error) => json!({"jsonrpc": "2.0", "id": id, "error": error}),
    })
}

async fn start_server() -> SocketAddr {
    let route = warp::post()
        .and(warp::path("rpc"))
        .and(warp::body::json())
        .and_then(|body: Value| async move {
            let slow = match &body {
                Value::Array(items) => items.iter().any(|r| r["method"] == "slow_add"),
                request => request["method"] == "slow_add",
            };
            if slow {
                tokio::time::sleep(Duration::from_secs(3)).await;
            }

            let reply = match &body {
                Value::Array(items) => {
                    let replies: Vec<Value> = items.iter().filter_map(handle).collect();
                    if replies.is_empty() {
                        String::new()
                    } else {
                        Value::Array(replies).to_string()
                    }
                }
                request => handle(request).map(|r| r.to_string()).unwrap_or_default(),
            };
            Ok::<_, warp::Rejection>(warp::reply::with_header(
                reply,
                "content-type",
                "application/json",
            ))
        });

    let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    addr
}

async fn simple_invocation(client: &JrpcClient) -> jrpc::Result<()> {
    let mut add: Invoke<AddParams, i64> = Invoke::new("add", AddParams { a: 10, b: 20 });
    println!("Calling {} with params: {:?}", add.name, add.request);

    client.invoke(&mut add).await?;
    println!("Result: {:?}", add.result());
    Ok(())
}

async fn error_handling(client: &JrpcClient) -> jrpc::Result<()> {
    let mut divide: Invoke<AddParams, i64> = Invoke::new("divide", AddParams { a: 10, b: 0 });
    println!("Calling {} with params: {:?}", divide.name, divide.request);

    match client.invoke(&mut divide).await {
        Ok(()) => println!("Result: {:?}", divide.result()),
        Err(e) if e.is_rpc_error() => {
            if let Some(rpc) = e.as_rpc_error() {
                println!("RPC Error: Code={}, Message={}", rpc.code, rpc.message);
                if let Some(data) = &rpc.data {
                    println!("Error data: {}", data);
                }
            }
        }
        Err(e) => return Err(e),
    }
    Ok(())
}

async fn batch_requests(client: &JrpcClient) -> jrpc::Result<()> {
    let mut add: Invoke<AddParams, i64> = Invoke::new("add", AddParams { a: 10, b: 20 });
    let mut subtract: Invoke<SubtractParams, i64> = Invoke::new(
        "subtract",
        SubtractParams {
            minuend: 30,
            subtrahend: 5,
        },
    );
    let mut log = Invoke::<_, ()>::new(
        "notify",
        NotifyParams {
            message: "batch sent".to_string(),
        },
    )
    .into_notification();

    println!("Sending batch request:");
    println!("1. {}: {:?}", add.name, add.request);
    println!("2. {}: {:?}", subtract.name, subtract.request);
    println!("3. notify (notification)");

    let mut calls: [&mut dyn MethodCaller; 3] = [&mut add, &mut subtract, &mut log];
    client.invoke_batch(&mut calls).await?;

    println!("Result 1: {:?}", add.result());
    println!("Result 2: {:?}", subtract.result());
    Ok(())
}

async fn notifications(client: &JrpcClient) -> jrpc::Result<()> {
    let mut note = Invoke::<_, ()>::new(
        "notify",
        NotifyParams {
            message: "Hello, world!".to_string(),
        },
    )
    .into_notification();

    println!("Sending notification: {}", note.method());
    client.invoke(&mut note).await?;
    println!("Notification sent successfully");
    Ok(())
}

async fn with_deadline(client: &JrpcClient, url: &str) -> jrpc::Result<()> {
    let mut add: Invoke<AddParams, i64> = Invoke::new("slow_add", AddParams { a: 10, b: 20 });
    println!("Calling {} with a 1-second deadline", add.name);

    match tokio::time::timeout(Duration::from_secs(1), client.invoke(&mut add)).await {
        Ok(outcome) => {
            outcome?;
            println!("Result: {:?}", add.result());
        }
        Err(_) => println!("Request timed out"),
    }

    // The same deadline enforced by the transport instead
    let transport = HttpTransport::builder(url)
        .timeout(Duration::from_secs(1))
        .build();
    let bounded = JrpcClient::new(transport);
    let mut add: Invoke<AddParams, i64> = Invoke::new("slow_add", AddParams { a: 1, b: 2 });
    match bounded.invoke(&mut add).await {
        Err(Error::Invoke { method, source }) => {
            println!("Transport gave up on {}: {}", method, source)
        }
        other => other?,
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    jrpc::core::init_observability(
        ObservabilityConfig::new("http-client-demo")
            .with_traces(false)
            .with_metrics(false)
            .with_json_logs(false),
    )?;

    let addr = start_server().await;
    let url = format!("http://{}/rpc", addr);
    println!("JSON-RPC Client Example");
    println!("=======================");
    println!("Server listening on {}\n", url);

    let transport = HttpTransport::builder(&url)
        .header("X-Client", "jrpc-demo")
        .build();
    let client = ClientBuilder::new(transport)
        .sequence_id_generator()
        .build()?;

    println!("Example 1: Simple method invocation");
    simple_invocation(&client).await?;

    println!("\nExample 2: Error handling");
    error_handling(&client).await?;

    println!("\nExample 3: Batch requests");
    batch_requests(&client).await?;

    println!("\nExample 4: Notifications");
    notifications(&client).await?;

    println!("\nExample 5: Deadlines");
    with_deadline(&client, &url).await?;

    jrpc::core::shutdown_observability()?;
    Ok(())
}
