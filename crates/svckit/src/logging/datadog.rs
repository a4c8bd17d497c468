use std::sync::Arc;

use opentelemetry::trace::TraceContextExt;
use opentelemetry::Context;
use serde::{Deserialize, Serialize};

use super::error::Error;
use super::level::Level;
use super::record::{Attr, Record};
use super::sink::Sink;

/// Service identity reported alongside every correlated record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatadogTags {
    pub service_name: String,
    pub environment: String,
    pub version: String,
}

/// Adds Datadog trace-correlation attributes before delegating.
///
/// When the current OpenTelemetry context carries a valid span, the record
/// gains `dd.trace_id` and `dd.span_id` in the decimal form Datadog's log
/// pipeline joins on. `dd.service`, `dd.env`, and `dd.version` are attached
/// unconditionally.
pub struct DatadogSink {
    tags: DatadogTags,
    inner: Arc<dyn Sink>,
}

impl DatadogSink {
    pub fn new(tags: DatadogTags, inner: Arc<dyn Sink>) -> Self {
        Self { tags, inner }
    }
}

impl Sink for DatadogSink {
    fn enabled(&self, level: Level) -> bool {
        self.inner.enabled(level)
    }

    fn handle(&self, record: &Record) -> Result<(), Error> {
        let mut record = record.clone();
        let cx = Context::current();
        let span = cx.span();
        let span_context = span.span_context();
        if span_context.is_valid() {
            record.add_attr(Attr::string(
                "dd.trace_id",
                convert_trace_id(&span_context.trace_id().to_string()),
            ));
            record.add_attr(Attr::string(
                "dd.span_id",
                convert_hex_id(&span_context.span_id().to_string()),
            ));
        }
        record.add_attr(Attr::string("dd.service", self.tags.service_name.clone()));
        record.add_attr(Attr::string("dd.env", self.tags.environment.clone()));
        record.add_attr(Attr::string("dd.version", self.tags.version.clone()));
        self.inner.handle(&record)
    }

    fn with_attrs(&self, attrs: Vec<Attr>) -> Arc<dyn Sink> {
        Arc::new(Self::new(self.tags.clone(), self.inner.with_attrs(attrs)))
    }

    fn with_group(&self, name: &str) -> Arc<dyn Sink> {
        Arc::new(Self::new(self.tags.clone(), self.inner.with_group(name)))
    }

    fn close(&self) -> Result<(), Error> {
        self.inner.close()
    }
}

/// Converts a 128-bit hex trace id into the decimal form of its low 64
/// bits. Returns an empty string for input too short or not hexadecimal.
fn convert_trace_id(id: &str) -> String {
    if id.len() < 16 {
        return String::new();
    }
    match id.get(id.len() - 16..) {
        Some(low) => convert_hex_id(low),
        None => String::new(),
    }
}

fn convert_hex_id(id: &str) -> String {
    u64::from_str_radix(id, 16)
        .map(|value| value.to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use opentelemetry::trace::{Tracer, TracerProvider as _};
    use opentelemetry_sdk::trace::SdkTracerProvider;

    use super::*;
    use crate::logging::format::TextSink;
    use crate::logging::options::SinkOptions;
    use crate::logging::writer::MemoryWriter;

    fn sink(buf: &MemoryWriter) -> DatadogSink {
        DatadogSink::new(
            DatadogTags {
                service_name: "test-service".into(),
                environment: "test".into(),
                version: "1.0.0".into(),
            },
            Arc::new(TextSink::new(SinkOptions::new().with_writer(buf.clone()))),
        )
    }

    #[test]
    fn convert_trace_id_takes_low_sixty_four_bits() {
        assert_eq!(
            convert_trace_id("0000000000000000abcdef1234567890"),
            "12379813812177893520"
        );
        assert_eq!(convert_trace_id("1234567890"), "");
        assert_eq!(convert_trace_id("0000000000000000abcdefghijklmno"), "");
        assert_eq!(convert_trace_id(""), "");
    }

    #[test]
    fn correlates_with_the_active_span() {
        let buf = MemoryWriter::new();
        let sink = sink(&buf);

        let provider = SdkTracerProvider::builder().build();
        let tracer = provider.tracer("test-tracer");
        let span = tracer.start("test-span");
        let cx = Context::current_with_span(span);
        let _guard = cx.attach();

        sink.handle(&Record::new(Level::Info, "correlated")).unwrap();

        let contents = buf.contents();
        assert!(contents.contains("dd.trace_id="));
        assert!(contents.contains("dd.span_id="));
        assert!(contents.contains("dd.service=test-service"));
        assert!(contents.contains("dd.env=test"));
        assert!(contents.contains("dd.version=1.0.0"));
    }

    #[test]
    fn without_a_span_only_service_tags_are_attached() {
        let buf = MemoryWriter::new();
        let sink = sink(&buf);

        sink.handle(&Record::new(Level::Info, "uncorrelated")).unwrap();

        let contents = buf.contents();
        assert!(contents.contains("msg=uncorrelated"));
        assert!(contents.contains("dd.service=test-service"));
        assert!(!contents.contains("dd.trace_id="));
    }

    #[test]
    fn group_decoration_still_correlates() {
        let buf = MemoryWriter::new();
        let sink: Arc<dyn Sink> = Arc::new(sink(&buf));
        let grouped = sink.with_group("testgroup");

        let mut record = Record::new(Level::Info, "grouped");
        record.add_attr(Attr::string("key", "value"));
        grouped.handle(&record).unwrap();

        let contents = buf.contents();
        assert!(contents.contains("testgroup.key=value"));
        assert!(contents.contains("dd.service=test-service"));
    }
}
