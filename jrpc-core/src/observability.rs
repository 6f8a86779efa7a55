//! Logging, tracing and metrics bootstrap
//!
//! Library code in jrpc only emits `tracing` events and spans and records
//! OpenTelemetry instruments; it never installs a subscriber by itself.
//! Applications that want the output call [`init_observability`] once at
//! startup:
//!
//! ```rust,no_run
//! use jrpc_core::ObservabilityConfig;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ObservabilityConfig::new("billing-client")
//!         .with_endpoint("http://localhost:4317")
//!         .with_log_level("jrpc_client=debug,info");
//!
//!     jrpc_core::init_observability(config).expect("observability");
//!
//!     // ... issue calls ...
//!
//!     jrpc_core::shutdown_observability().expect("flush telemetry");
//! }
//! ```
//!
//! Console logging alone, with no collector, is a matter of switching the
//! exporters off:
//!
//! ```rust,no_run
//! use jrpc_core::ObservabilityConfig;
//!
//! let config = ObservabilityConfig::new("cli")
//!     .with_traces(false)
//!     .with_metrics(false)
//!     .with_json_logs(false);
//! jrpc_core::init_observability(config).unwrap();
//! ```
//!
//! # Environment Variables
//!
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: default collector endpoint
//! - `RUST_LOG`: log filter, takes precedence over the configured level

use opentelemetry::{global, KeyValue};
use opentelemetry_sdk::metrics::SdkMeterProvider;
use opentelemetry_sdk::trace::SdkTracerProvider;
use std::sync::OnceLock;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

type InitResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Interval between two metric exports
const METRICS_EXPORT_INTERVAL: Duration = Duration::from_secs(30);

/// Handles on the providers handed to `global`, kept for shutdown
static PROVIDERS: OnceLock<Providers> = OnceLock::new();

#[derive(Default)]
struct Providers {
    tracer: Option<SdkTracerProvider>,
    meter: Option<SdkMeterProvider>,
}

impl Providers {
    /// Flush buffered spans and metrics, then stop both providers
    ///
    /// The meter provider is shut down even if the tracer provider fails; the
    /// first error is returned.
    fn shutdown(&self) -> InitResult<()> {
        let traces = self
            .tracer
            .as_ref()
            .map_or(Ok(()), |provider| provider.force_flush().and_then(|_| provider.shutdown()));
        let metrics = self
            .meter
            .as_ref()
            .map_or(Ok(()), |provider| provider.force_flush().and_then(|_| provider.shutdown()));

        traces?;
        metrics?;
        Ok(())
    }
}

/// Observability configuration
///
/// # Defaults
///
/// - service name: `"jrpc"`
/// - service version: the crate version
/// - OTLP endpoint: `OTEL_EXPORTER_OTLP_ENDPOINT`, else `http://localhost:4317`
/// - traces, metrics and logs enabled
/// - log level: `RUST_LOG`, else `"info"`
/// - JSON console output
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Name identifying this process in telemetry backends
    pub service_name: String,
    /// Version attached to every span and metric
    pub service_version: String,
    /// gRPC endpoint of the OTLP collector
    pub otlp_endpoint: String,
    /// Export spans to the collector
    pub enable_traces: bool,
    /// Export metrics to the collector
    pub enable_metrics: bool,
    /// Print log events to the console
    pub enable_logs: bool,
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub log_level: String,
    /// Print console events as JSON lines rather than human-readable text
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: "jrpc".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            otlp_endpoint: std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:4317".to_string()),
            enable_traces: true,
            enable_metrics: true,
            enable_logs: true,
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            json_logs: true,
        }
    }
}

impl ObservabilityConfig {
    /// Default configuration under the given service name
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..Default::default()
        }
    }

    /// Set the OTLP collector endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.otlp_endpoint = endpoint.into();
        self
    }

    /// Set the log filter directive (e.g. `"debug"` or `"jrpc_client=trace"`)
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Set the service version
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.service_version = version.into();
        self
    }

    /// Enable or disable span export
    pub fn with_traces(mut self, enable: bool) -> Self {
        self.enable_traces = enable;
        self
    }

    /// Enable or disable metric export
    pub fn with_metrics(mut self, enable: bool) -> Self {
        self.enable_metrics = enable;
        self
    }

    /// Enable or disable console logging
    pub fn with_logs(mut self, enable: bool) -> Self {
        self.enable_logs = enable;
        self
    }

    /// Choose JSON (`true`) or plain text (`false`) console output
    pub fn with_json_logs(mut self, enable: bool) -> Self {
        self.json_logs = enable;
        self
    }

    fn resource(&self) -> opentelemetry_sdk::Resource {
        opentelemetry_sdk::Resource::builder_empty()
            .with_attributes(vec![
                KeyValue::new(
                    opentelemetry_semantic_conventions::resource::SERVICE_NAME,
                    self.service_name.clone(),
                ),
                KeyValue::new(
                    opentelemetry_semantic_conventions::resource::SERVICE_VERSION,
                    self.service_version.clone(),
                ),
            ])
            .build()
    }
}

/// Install the tracing subscriber and the enabled OpenTelemetry providers
///
/// Call once per process. A second call fails because the global subscriber
/// is already set.
///
/// # Errors
///
/// Fails if an exporter cannot be built, the log filter does not parse, or a
/// global subscriber is already installed.
pub fn init_observability(config: ObservabilityConfig) -> InitResult<()> {
    let mut providers = Providers::default();

    let tracer = if config.enable_traces {
        let (provider, tracer) = init_tracer(&config)?;
        providers.tracer = Some(provider);
        Some(tracer)
    } else {
        None
    };

    if config.enable_metrics {
        providers.meter = Some(init_metrics(&config)?);
    }

    init_tracing_subscriber(&config, tracer)?;
    PROVIDERS
        .set(providers)
        .map_err(|_| "observability is already initialized")?;

    tracing::info!(
        service_name = %config.service_name,
        otlp_endpoint = %config.otlp_endpoint,
        traces = config.enable_traces,
        metrics = config.enable_metrics,
        logs = config.enable_logs,
        "Observability initialized"
    );

    Ok(())
}

fn init_tracer(
    config: &ObservabilityConfig,
) -> InitResult<(SdkTracerProvider, opentelemetry_sdk::trace::Tracer)> {
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry_otlp::WithExportConfig;
    use opentelemetry_sdk::trace::{RandomIdGenerator, Sampler};

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(config.otlp_endpoint.clone())
        .build()?;

    let provider = SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(config.resource())
        .with_sampler(Sampler::AlwaysOn)
        .with_id_generator(RandomIdGenerator::default())
        .build();

    // The subscriber layer needs a tracer before the provider goes global.
    let tracer = provider.tracer(config.service_name.clone());
    global::set_tracer_provider(provider.clone());

    Ok((provider, tracer))
}

fn init_metrics(config: &ObservabilityConfig) -> InitResult<SdkMeterProvider> {
    use opentelemetry_otlp::WithExportConfig;

    let exporter = opentelemetry_otlp::MetricExporter::builder()
        .with_tonic()
        .with_endpoint(config.otlp_endpoint.clone())
        .build()?;

    let reader = opentelemetry_sdk::metrics::PeriodicReader::builder(exporter)
        .with_interval(METRICS_EXPORT_INTERVAL)
        .build();

    let provider = SdkMeterProvider::builder()
        .with_reader(reader)
        .with_resource(config.resource())
        .build();

    global::set_meter_provider(provider.clone());
    Ok(provider)
}

fn init_tracing_subscriber(
    config: &ObservabilityConfig,
    tracer: Option<opentelemetry_sdk::trace::Tracer>,
) -> InitResult<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.log_level))?;

    let telemetry_layer = tracer.map(|tracer| tracing_opentelemetry::layer().with_tracer(tracer));

    let fmt_layer = if !config.enable_logs {
        None
    } else if config.json_logs {
        Some(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true)
                .json()
                .boxed(),
        )
    } else {
        Some(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .boxed(),
        )
    };

    tracing_subscriber::registry()
        .with(telemetry_layer)
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

/// Flush and stop telemetry before the process exits
///
/// Exports the spans still queued in the batch processor and the metrics
/// gathered since the last periodic export, then shuts both providers down.
/// Does nothing if [`init_observability`] never succeeded.
///
/// # Errors
///
/// Fails if a flush or shutdown fails, including when the providers were
/// already shut down by an earlier call.
pub fn shutdown_observability() -> InitResult<()> {
    tracing::info!("Shutting down observability");
    PROVIDERS.get().map_or(Ok(()), Providers::shutdown)
}
