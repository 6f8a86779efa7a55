//! Client metrics definitions
//!
//! OpenTelemetry instruments recorded by [`JrpcClient`](crate::JrpcClient)
//! when it is built with metrics enabled. They go to whatever meter provider
//! is installed globally; `jrpc_core::init_observability` installs an OTLP
//! one.
//!
//! # Metrics Collected
//!
//! - **invocations_total**: calls completed, by method and status (counter);
//!   batches count once under the method `"batch"`
//! - **invocation_duration**: call latency in seconds (histogram)
//! - **errors_total**: failed calls, by error kind (counter)
//! - **batch_size**: number of calls per batch (histogram)
//!
//! # Examples
//!
//! ```rust,no_run
//! use jrpc_client::ClientMetrics;
//!
//! let metrics = ClientMetrics::new("my-client");
//! metrics.record_invocation("add", "success", 0.004);
//! ```

use opentelemetry::{
    global,
    metrics::{Counter, Histogram, Meter},
    InstrumentationScope, KeyValue,
};

/// `method` attribute value for batch invocations
pub const BATCH_METHOD: &str = "batch";

/// Client metrics for monitoring
pub struct ClientMetrics {
    /// Total number of completed invocations
    pub invocations_total: Counter<u64>,
    /// Invocation duration in seconds
    pub invocation_duration: Histogram<f64>,
    /// Total number of failed invocations
    pub errors_total: Counter<u64>,
    /// Batch size distribution
    pub batch_size: Histogram<u64>,
}

impl ClientMetrics {
    /// Instruments on the global meter provider, scoped to `service_name`
    pub fn new(service_name: impl Into<String>) -> Self {
        let scope = InstrumentationScope::builder(service_name.into()).build();
        let meter = global::meter_with_scope(scope);
        Self::new_with_meter(&meter)
    }

    /// Instruments on a caller-provided meter
    pub fn new_with_meter(meter: &Meter) -> Self {
        Self {
            invocations_total: meter
                .u64_counter("jrpc.client.invocations.total")
                .with_description("Total number of completed invocations")
                .build(),
            invocation_duration: meter
                .f64_histogram("jrpc.client.invocation.duration")
                .with_description("Invocation duration in seconds")
                .with_unit("s")
                .build(),
            errors_total: meter
                .u64_counter("jrpc.client.errors.total")
                .with_description("Total number of failed invocations")
                .build(),
            batch_size: meter
                .u64_histogram("jrpc.client.batch.size")
                .with_description("Number of calls in batch invocations")
                .build(),
        }
    }

    /// Record a completed invocation
    pub fn record_invocation(&self, method: &str, status: &str, duration_secs: f64) {
        let attributes = invocation_attributes(method, status);
        self.invocations_total.add(1, &attributes);
        self.invocation_duration.record(duration_secs, &attributes);
    }

    /// Record an error
    pub fn record_error(&self, kind: &str) {
        let attributes = &[KeyValue::new("error_type", kind.to_string())];
        self.errors_total.add(1, attributes);
    }

    /// Record a completed batch invocation
    ///
    /// The batch counts as one invocation of [`BATCH_METHOD`], whatever
    /// methods it carried.
    pub fn record_batch(&self, size: u64, status: &str, duration_secs: f64) {
        self.batch_size.record(size, &[]);
        self.record_invocation(BATCH_METHOD, status, duration_secs);
    }
}

fn invocation_attributes(method: &str, status: &str) -> [KeyValue; 2] {
    [
        KeyValue::new("method", method.to_string()),
        KeyValue::new("status", status.to_string()),
    ]
}
