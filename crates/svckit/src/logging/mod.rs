//! Structured logging sinks and decorators.
//!
//! The module is organized around the [`Sink`] capability: a backend that
//! accepts a [`Record`], reports whether a [`Level`] is enabled, and returns
//! decorated copies of itself carrying extra attributes or a group prefix.
//! Concrete sinks compose freely:
//!
//! | Sink | Purpose |
//! |---|---|
//! | [`FanOut`] | Broadcasts every record to a fixed set of child sinks |
//! | [`JsonSink`] / [`TextSink`] | Format records as JSON / `key=value` lines |
//! | [`ColorSink`] | Wraps formatted lines in ANSI colors picked by level |
//! | [`ProcessSink`] | Stamps `pid` / `ppid` attributes on every record |
//! | [`DatadogSink`] | Adds Datadog trace-correlation attributes |
//! | [`RollbarSink`] | Ships matching records to the Rollbar API |
//!
//! [`Logger`] is the front door: it gates on [`Sink::enabled`], stamps the
//! timestamp, and forwards the record. A process-wide default logger writing
//! JSON to stdout is available through [`default_logger`] and the free
//! functions [`debug`], [`info`], [`warn`], and [`error`].

mod color;
mod datadog;
mod default;
mod error;
mod error_stack;
mod fanout;
mod format;
mod kind;
mod level;
mod logger;
mod options;
mod process;
mod record;
mod rollbar;
mod sink;
mod writer;

pub use color::{terminal_color_enabled, ColorSink};
pub use datadog::{DatadogSink, DatadogTags};
pub use default::{debug, default_logger, error, info, warn};
pub use error::{AggregateError, Error};
pub use error_stack::error_stack;
pub use fanout::FanOut;
pub use format::{JsonSink, TextSink};
pub use kind::{ParseKindError, SinkKind};
pub use level::{env_level, Level, ParseLevelError};
pub use logger::Logger;
pub use options::{ReplaceAttr, SinkOptions};
pub use process::ProcessSink;
pub use record::{Attr, Record, Value};
pub use rollbar::{RollbarConfig, RollbarSink};
pub use sink::{SharedSink, Sink};
pub use writer::{MemoryWriter, SharedWriter};
