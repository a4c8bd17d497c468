//! A thin convenience layer over the OpenTelemetry tracing SDK.
//!
//! [`init`] bootstraps the global tracer provider from a [`TraceConfig`]
//! (OTLP over gRPC, batched, W3C trace-context propagation) and returns a
//! [`ShutdownGuard`] that flushes and shuts the provider down. [`start_span`]
//! and [`end_span`] wrap the span API for code that passes
//! [`Context`](opentelemetry::Context) values around explicitly, and
//! [`key_values`] converts [`logging`](crate::logging) attributes into span
//! attributes so call sites can describe an event once and feed both
//! systems.

mod attribute;
mod provider;
mod span;

pub use attribute::{key_value, key_values};
pub use provider::{init, Error, ShutdownGuard, TraceConfig};
pub use span::{end_span, end_span_with_status, span_name, start_span, start_span_with_kind, TRACER_NAME};
