//! Client builder for configuring id generation and observability
//!
//! The `ClientBuilder` provides a fluent API for configuring a client before
//! use. It allows you to:
//! - Replace the id generator (the default is an integer sequence)
//! - Configure observability (OpenTelemetry)
//! - Enable metrics without installing any exporter
//! - Set the service name for telemetry
//!
//! # Examples
//!
//! ```rust,no_run
//! use jrpc_client::{ClientBuilder, HttpTransport};
//! use jrpc_core::IdValue;
//! use std::sync::atomic::{AtomicU64, Ordering};
//! use std::sync::Arc;
//!
//! # fn example() -> jrpc_core::Result<()> {
//! // String ids from a custom source
//! let counter = Arc::new(AtomicU64::new(0));
//! let client = ClientBuilder::new(HttpTransport::new("http://localhost:8080"))
//!     .id_generator(move || {
//!         IdValue::from_string(format!("req-{}", counter.fetch_add(1, Ordering::Relaxed)))
//!     })
//!     .build()?;
//!
//! // With observability
//! let client2 = ClientBuilder::new(HttpTransport::new("http://localhost:8080"))
//!     .with_default_observability()
//!     .service_name("my-client")
//!     .build()?;
//! # Ok(())
//! # }
//! ```

use crate::id_generator::{IdGenerator, SequenceIdGenerator};
use crate::metrics::ClientMetrics;
use crate::transport::Transport;
use crate::JrpcClient;
use jrpc_core::{Error, IdValue, ObservabilityConfig, Result};
use std::sync::Arc;

/// Builder for configuring and creating a JrpcClient
pub struct ClientBuilder {
    transport: Arc<dyn Transport>,
    id_generator: Option<IdGenerator>,
    observability_config: Option<ObservabilityConfig>,
    enable_metrics: bool,
    service_name: Option<String>,
}

impl ClientBuilder {
    /// Create a new client builder around a transport
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Arc::new(transport),
            id_generator: None,
            observability_config: None,
            enable_metrics: false,
            service_name: None,
        }
    }

    /// Generate ids with a custom function
    ///
    /// The function is shared by every clone of the client and may be called
    /// from several tasks at once; it must not hand out the same id twice.
    pub fn id_generator<F>(mut self, generate: F) -> Self
    where
        F: Fn() -> IdValue + Send + Sync + 'static,
    {
        self.id_generator = Some(Arc::new(generate));
        self
    }

    /// Generate ids with a fresh integer sequence (default)
    pub fn sequence_id_generator(mut self) -> Self {
        self.id_generator = Some(SequenceIdGenerator::new().into_generator());
        self
    }

    /// Enable OpenTelemetry observability with custom configuration
    ///
    /// `build` installs the global subscriber and providers, so this belongs on
    /// at most one builder per process.
    pub fn with_observability(mut self, config: ObservabilityConfig) -> Self {
        self.observability_config = Some(config);
        self
    }

    /// Enable OpenTelemetry observability with default configuration
    pub fn with_default_observability(mut self) -> Self {
        self.observability_config = Some(ObservabilityConfig::default());
        self
    }

    /// Record metrics on the global meter provider without installing one
    pub fn with_metrics(mut self) -> Self {
        self.enable_metrics = true;
        self
    }

    /// Set service name for telemetry (overrides the observability config)
    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = Some(name.into());
        self
    }

    /// Build the client
    ///
    /// # Errors
    ///
    /// Returns `Error::Observability` if observability was requested and could
    /// not be initialized.
    pub fn build(self) -> Result<JrpcClient> {
        let metrics = if let Some(mut config) = self.observability_config {
            if let Some(name) = self.service_name {
                config.service_name = name;
            }

            jrpc_core::init_observability(config.clone())
                .map_err(|e| Error::Observability(e.to_string()))?;

            Some(Arc::new(ClientMetrics::new(config.service_name)))
        } else if self.enable_metrics {
            let name = self.service_name.unwrap_or_else(|| "jrpc".to_string());
            Some(Arc::new(ClientMetrics::new(name)))
        } else {
            None
        };

        let generate_id = self
            .id_generator
            .unwrap_or_else(|| SequenceIdGenerator::new().into_generator());

        tracing::debug!(metrics = metrics.is_some(), "Client built");

        Ok(JrpcClient {
            transport: self.transport,
            generate_id,
            metrics,
        })
    }
}
