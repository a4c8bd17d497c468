use opentelemetry::trace::noop::NoopTracerProvider;
use opentelemetry::{global, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;
use opentelemetry_semantic_conventions::attribute::SERVICE_VERSION;
use serde::{Deserialize, Serialize};

use crate::logging::{self, Attr};

/// Tracing bootstrap configuration.
///
/// Disabled by default so that local runs and tests pay no tracing cost;
/// deployments opt in and point the exporter at their collector:
///
/// ```rust,no_run
/// use svckit::trace::TraceConfig;
///
/// let config = TraceConfig::new()
///     .with_enabled(true)
///     .with_endpoint("http://otel-collector:4317")
///     .with_service_name("billing")
///     .with_environment("production")
///     .with_version("1.4.2");
/// let _guard = svckit::trace::init(config)?;
/// # Ok::<(), svckit::trace::Error>(())
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_environment")]
    pub environment: String,
    #[serde(default)]
    pub version: String,
}

fn default_endpoint() -> String {
    "http://127.0.0.1:4317".to_string()
}

fn default_service_name() -> String {
    "svckit".to_string()
}

fn default_environment() -> String {
    "local".to_string()
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_endpoint(),
            service_name: default_service_name(),
            environment: default_environment(),
            version: String::new(),
        }
    }
}

impl TraceConfig {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_service_name(mut self, service_name: impl Into<String>) -> Self {
        self.service_name = service_name.into();
        self
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }
}

/// Tracing bootstrap failure.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to initialize span exporter: {0}")]
    Exporter(#[from] opentelemetry_otlp::ExporterBuildError),
}

/// Flushes and shuts down the tracer provider when dropped.
///
/// Shutdown failures are logged rather than returned: teardown happens on
/// the way out of `main`, where there is nobody left to handle an error.
#[must_use = "dropping the guard immediately shuts tracing down"]
pub struct ShutdownGuard {
    provider: Option<SdkTracerProvider>,
}

impl ShutdownGuard {
    /// Explicit form of the drop behavior, for call sites that want to
    /// control when the final flush happens.
    pub fn shutdown(mut self) {
        self.flush_and_shutdown();
    }

    fn flush_and_shutdown(&mut self) {
        if let Some(provider) = self.provider.take() {
            if let Err(err) = provider.force_flush() {
                logging::error(
                    "failed to flush pending spans",
                    vec![Attr::string("error", err.to_string())],
                );
            }
            if let Err(err) = provider.shutdown() {
                logging::error(
                    "failed to shut down tracer provider",
                    vec![Attr::string("error", err.to_string())],
                );
            }
        }
    }
}

impl Drop for ShutdownGuard {
    fn drop(&mut self) {
        self.flush_and_shutdown();
    }
}

/// Installs the global tracer provider described by `config`.
///
/// With `enabled = false` a noop provider is installed and the returned
/// guard has nothing to shut down. Otherwise spans are exported over OTLP
/// gRPC in batches, the resource carries the service identity, and W3C
/// trace-context propagation is set up globally.
///
/// # Errors
///
/// Returns [`Error::Exporter`] when the OTLP exporter cannot be built.
pub fn init(config: TraceConfig) -> Result<ShutdownGuard, Error> {
    if !config.enabled {
        global::set_tracer_provider(NoopTracerProvider::new());
        return Ok(ShutdownGuard { provider: None });
    }

    global::set_text_map_propagator(TraceContextPropagator::new());

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&config.endpoint)
        .build()?;
    let resource = Resource::builder()
        .with_service_name(config.service_name.clone())
        .with_attributes([
            KeyValue::new(SERVICE_VERSION, config.version.clone()),
            KeyValue::new("environment", config.environment.clone()),
        ])
        .build();
    let provider = SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(resource)
        .build();
    global::set_tracer_provider(provider.clone());

    Ok(ShutdownGuard {
        provider: Some(provider),
    })
}
