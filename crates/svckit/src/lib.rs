//! # svckit
//!
//! Cross-cutting middleware utilities for RPC services built on top of
//! [poem](https://docs.rs/poem) and [poem-grpc](https://docs.rs/poem-grpc):
//! request interceptors, structured-logging sinks, and a thin convenience
//! layer over the OpenTelemetry tracing SDK.
//!
//! ## Key Components
//!
//! - [`logging`] — A structured-logging [`Sink`](logging::Sink) capability
//!   plus a set of composable sink decorators: a fan-out sink broadcasting to
//!   several backends, JSON/text formatters, terminal color output, process
//!   metadata, Datadog trace correlation, and a Rollbar error exporter.
//! - [`trace`] — Tracer provider bootstrap, span helpers, and conversion
//!   between log attributes and OpenTelemetry span attributes.
//! - [`interceptors`] — Poem middleware for gRPC services: authentication,
//!   request logging, panic recovery, and outgoing-request tracing.
//! - [`RequestExt`] — An extension trait extracting common cross-cutting
//!   metadata (request id, client ip, user agent) from incoming requests.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use svckit::logging::{
//!     FanOut, JsonSink, Logger, ProcessSink, SharedSink, SinkOptions, TextSink,
//! };
//!
//! let json: SharedSink = Arc::new(JsonSink::new(SinkOptions::new()));
//! let text: SharedSink = Arc::new(TextSink::new(SinkOptions::new()));
//! let sink = Arc::new(ProcessSink::new(Arc::new(FanOut::new(vec![json, text]))));
//!
//! let logger = Logger::new(sink);
//! logger.info("service started", vec![]);
//! ```

pub mod interceptors;
pub mod logging;
pub mod trace;

mod request_ext;

pub use request_ext::RequestExt;
