use opentelemetry::trace::{SpanKind, Status, TraceContextExt, Tracer};
use opentelemetry::{global, Context};

use crate::logging::Attr;

use super::attribute::key_values;

/// Instrumentation scope name under which this crate's spans are created.
pub const TRACER_NAME: &str = "svckit";

/// Builds the full span name, prefixing `name` with the tracer name.
pub fn span_name(name: &str) -> String {
    format!("{}/{}", TRACER_NAME, name.trim_start_matches('/'))
}

/// Starts a span on the globally installed tracer provider and returns a
/// context carrying it. The span stays open until [`end_span`] is called on
/// the returned context.
pub fn start_span(cx: &Context, name: &str, attrs: &[Attr]) -> Context {
    start_span_with_kind(cx, name, SpanKind::Internal, attrs)
}

/// Like [`start_span`], with an explicit span kind.
pub fn start_span_with_kind(cx: &Context, name: &str, kind: SpanKind, attrs: &[Attr]) -> Context {
    let tracer = global::tracer(TRACER_NAME);
    let mut builder = tracer.span_builder(span_name(name)).with_kind(kind);
    let kvs = key_values(attrs);
    if !kvs.is_empty() {
        builder = builder.with_attributes(kvs);
    }
    let span = tracer.build_with_context(builder, cx);
    cx.with_span(span)
}

/// Ends the span carried by `cx`. When `err` is given, the span is marked
/// failed and the error recorded on it first.
pub fn end_span(cx: &Context, err: Option<&(dyn std::error::Error + 'static)>) {
    let span = cx.span();
    if let Some(err) = err {
        span.set_status(Status::error(err.to_string()));
        span.record_error(err);
    }
    span.end();
}

/// Ends the span carried by `cx` with an explicit status, for callers whose
/// failure type does not implement `std::error::Error`.
pub fn end_span_with_status(cx: &Context, status: Status) {
    let span = cx.span();
    span.set_status(status);
    span.end();
}

#[cfg(test)]
mod tests {
    use opentelemetry_sdk::trace::SdkTracerProvider;

    use super::*;

    #[test]
    fn span_name_is_prefixed() {
        assert_eq!(span_name("lookup"), "svckit/lookup");
        assert_eq!(span_name("/lookup"), "svckit/lookup");
    }

    #[test]
    fn started_span_is_carried_by_the_context() {
        global::set_tracer_provider(SdkTracerProvider::builder().build());

        let cx = start_span(
            &Context::new(),
            "unit-test",
            &[Attr::string("probe", "yes")],
        );
        assert!(cx.span().span_context().is_valid());
        end_span(&cx, None);
    }

    #[test]
    fn failed_span_is_marked() {
        global::set_tracer_provider(SdkTracerProvider::builder().build());

        #[derive(Debug, thiserror::Error)]
        #[error("lookup timed out")]
        struct Timeout;

        let cx = start_span(&Context::new(), "failing", &[]);
        // Ending with an error must not panic even though the span is
        // recording into a provider without an exporter.
        end_span(&cx, Some(&Timeout));
    }
}
