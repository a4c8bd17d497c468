use std::sync::Arc;

use super::error::Error;
use super::level::Level;
use super::record::{Attr, Record};
use super::sink::Sink;

/// Stamps process metadata on every record before delegating.
///
/// Adds a `pid` attribute, and a `ppid` attribute when the parent process id
/// is known and nonzero.
pub struct ProcessSink {
    inner: Arc<dyn Sink>,
}

impl ProcessSink {
    pub fn new(inner: Arc<dyn Sink>) -> Self {
        Self { inner }
    }
}

impl Sink for ProcessSink {
    fn enabled(&self, level: Level) -> bool {
        self.inner.enabled(level)
    }

    fn handle(&self, record: &Record) -> Result<(), Error> {
        let mut record = record.clone();
        record.add_attr(Attr::int("pid", i64::from(std::process::id())));
        let ppid = parent_id();
        if ppid != 0 {
            record.add_attr(Attr::int("ppid", i64::from(ppid)));
        }
        self.inner.handle(&record)
    }

    fn with_attrs(&self, attrs: Vec<Attr>) -> Arc<dyn Sink> {
        Arc::new(Self::new(self.inner.with_attrs(attrs)))
    }

    fn with_group(&self, name: &str) -> Arc<dyn Sink> {
        Arc::new(Self::new(self.inner.with_group(name)))
    }

    fn close(&self) -> Result<(), Error> {
        self.inner.close()
    }
}

#[cfg(unix)]
fn parent_id() -> u32 {
    std::os::unix::process::parent_id()
}

#[cfg(not(unix))]
fn parent_id() -> u32 {
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::format::JsonSink;
    use crate::logging::options::SinkOptions;
    use crate::logging::writer::MemoryWriter;

    #[test]
    fn records_carry_the_process_id() {
        let buf = MemoryWriter::new();
        let sink = ProcessSink::new(Arc::new(JsonSink::new(
            SinkOptions::new().with_writer(buf.clone()),
        )));

        sink.handle(&Record::new(Level::Info, "stamped")).unwrap();

        let line: serde_json::Value = serde_json::from_str(buf.contents().trim()).unwrap();
        assert_eq!(line["pid"], i64::from(std::process::id()));
    }

    #[test]
    fn decoration_keeps_stamping() {
        let buf = MemoryWriter::new();
        let sink: Arc<dyn Sink> = Arc::new(ProcessSink::new(Arc::new(JsonSink::new(
            SinkOptions::new().with_writer(buf.clone()),
        ))));

        let decorated = sink.with_attrs(vec![Attr::string("component", "worker")]);
        decorated.handle(&Record::new(Level::Info, "tagged")).unwrap();

        let line: serde_json::Value = serde_json::from_str(buf.contents().trim()).unwrap();
        assert_eq!(line["component"], "worker");
        assert!(line["pid"].is_i64());
    }
}
