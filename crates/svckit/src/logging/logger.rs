use std::sync::Arc;

use super::error::Error;
use super::level::Level;
use super::record::{Attr, Record};
use super::sink::Sink;

/// The logging front door.
///
/// A `Logger` checks [`Sink::enabled`] before constructing a record, stamps
/// the current time, and forwards the record to its sink. Handle errors are
/// deliberately dropped here; the sink composition decides what failure
/// means, and callers of `info`/`error` should not have to.
///
/// ```rust
/// use std::sync::Arc;
///
/// use svckit::logging::{Attr, JsonSink, Logger, SinkOptions};
///
/// let logger = Logger::new(Arc::new(JsonSink::new(SinkOptions::new())));
/// let scoped = logger.with_attrs(vec![Attr::string("component", "gateway")]);
/// scoped.info("listening", vec![Attr::int("port", 8080)]);
/// ```
#[derive(Clone)]
pub struct Logger {
    sink: Arc<dyn Sink>,
}

impl Logger {
    pub fn new(sink: Arc<dyn Sink>) -> Self {
        Self { sink }
    }

    pub fn enabled(&self, level: Level) -> bool {
        self.sink.enabled(level)
    }

    pub fn log(&self, level: Level, message: impl Into<String>, attrs: Vec<Attr>) {
        if !self.sink.enabled(level) {
            return;
        }
        let mut record = Record::new(level, message);
        record.add_attrs(attrs);
        let _ = self.sink.handle(&record);
    }

    pub fn debug(&self, message: impl Into<String>, attrs: Vec<Attr>) {
        self.log(Level::Debug, message, attrs);
    }

    pub fn info(&self, message: impl Into<String>, attrs: Vec<Attr>) {
        self.log(Level::Info, message, attrs);
    }

    pub fn warn(&self, message: impl Into<String>, attrs: Vec<Attr>) {
        self.log(Level::Warn, message, attrs);
    }

    pub fn error(&self, message: impl Into<String>, attrs: Vec<Attr>) {
        self.log(Level::Error, message, attrs);
    }

    /// Returns a logger whose sink carries `attrs` on every record.
    pub fn with_attrs(&self, attrs: Vec<Attr>) -> Logger {
        Logger::new(self.sink.with_attrs(attrs))
    }

    /// Returns a logger namespacing subsequent attribute keys under `name`.
    pub fn with_group(&self, name: &str) -> Logger {
        Logger::new(self.sink.with_group(name))
    }

    /// Tears down the underlying sink composition.
    pub fn close(&self) -> Result<(), Error> {
        self.sink.close()
    }
}
