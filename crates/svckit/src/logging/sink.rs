use std::sync::Arc;

use super::{Attr, Error, Level, Record};

/// A structured-logging backend.
///
/// Decoration is by value: [`Sink::with_attrs`] and [`Sink::with_group`]
/// return a new handle and leave the receiver untouched, so a sink can be
/// shared and decorated concurrently without synchronization.
///
/// Implementations must be safe to call from multiple threads; any internal
/// buffering or I/O is the implementation's own concurrency concern.
pub trait Sink: Send + Sync {
    /// Reports whether records at `level` should be constructed at all.
    fn enabled(&self, level: Level) -> bool;

    /// Processes one record.
    fn handle(&self, record: &Record) -> Result<(), Error>;

    /// Returns a new sink that attaches `attrs` to every future record.
    fn with_attrs(&self, attrs: Vec<Attr>) -> Arc<dyn Sink>;

    /// Returns a new sink that namespaces subsequent attribute keys under
    /// `name`.
    fn with_group(&self, name: &str) -> Arc<dyn Sink>;

    /// Releases resources held by the sink. The default implementation does
    /// nothing; sinks without teardown needs can leave it alone.
    fn close(&self) -> Result<(), Error> {
        Ok(())
    }
}

/// A shareable sink handle.
pub type SharedSink = Arc<dyn Sink>;
