use std::sync::Arc;

use super::error::{AggregateError, Error};
use super::level::Level;
use super::record::{Attr, Record};
use super::sink::Sink;

/// Broadcasts every record to a fixed, ordered set of child sinks.
///
/// The child list is set at construction and never changes. Callers compose
/// their backends once, then hand the fan-out to a
/// [`Logger`](super::Logger) as if it were a single sink:
///
/// ```rust
/// use std::sync::Arc;
///
/// use svckit::logging::{FanOut, JsonSink, MemoryWriter, SharedSink, SinkOptions, TextSink};
///
/// let json_buf = MemoryWriter::new();
/// let text_buf = MemoryWriter::new();
/// let sink = FanOut::new(vec![
///     Arc::new(JsonSink::new(SinkOptions::new().with_writer(json_buf))) as SharedSink,
///     Arc::new(TextSink::new(SinkOptions::new().with_writer(text_buf))),
/// ]);
/// ```
///
/// Failure of one child never blocks delivery to the others: `handle`
/// invokes every child in construction order and returns the collected
/// failures as one [`AggregateError`]. Teardown is best-effort: `close`
/// closes every child and always reports success.
pub struct FanOut {
    children: Vec<Arc<dyn Sink>>,
}

impl FanOut {
    /// Creates a fan-out over `children`. An empty list is legal and yields
    /// a sink that is never enabled and always succeeds.
    pub fn new(children: Vec<Arc<dyn Sink>>) -> Self {
        Self { children }
    }
}

impl Sink for FanOut {
    /// Logical OR across children. Every child is queried even once a match
    /// is found, so children that do auxiliary work inside `enabled` still
    /// observe the call.
    fn enabled(&self, level: Level) -> bool {
        let mut any = false;
        for child in &self.children {
            if child.enabled(level) {
                any = true;
            }
        }
        any
    }

    fn handle(&self, record: &Record) -> Result<(), Error> {
        let mut failures = AggregateError::new();
        for child in &self.children {
            if let Err(err) = child.handle(record) {
                failures.push(err);
            }
        }
        failures.into_result()
    }

    fn with_attrs(&self, attrs: Vec<Attr>) -> Arc<dyn Sink> {
        Arc::new(Self {
            children: self
                .children
                .iter()
                .map(|child| child.with_attrs(attrs.clone()))
                .collect(),
        })
    }

    fn with_group(&self, name: &str) -> Arc<dyn Sink> {
        Arc::new(Self {
            children: self
                .children
                .iter()
                .map(|child| child.with_group(name))
                .collect(),
        })
    }

    fn close(&self) -> Result<(), Error> {
        for child in &self.children {
            let _ = child.close();
        }
        Ok(())
    }
}
