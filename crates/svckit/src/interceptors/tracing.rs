use opentelemetry::trace::{FutureExt, SpanKind, Status};
use opentelemetry::{global, Context};
use opentelemetry_http::HeaderInjector;
use opentelemetry_semantic_conventions::trace::URL_FULL;
use poem::{Endpoint, Middleware, Request, Result};

use crate::logging::Attr;
use crate::trace::{end_span, end_span_with_status, start_span_with_kind};

/// Client-side middleware that traces each outgoing request.
///
/// For every request this middleware:
///
/// 1. Starts a client-kind span named after the request path on the
///    globally installed tracer provider.
/// 2. Records the full request URI as the
///    [`URL_FULL`] span attribute.
/// 3. Injects the current trace context into the outgoing request headers
///    using the globally configured propagator (typically W3C
///    `traceparent` / `tracestate`).
/// 4. Runs the inner endpoint within the span's context so downstream
///    spans are correctly parented, and marks the span failed when the
///    call errors.
///
/// With tracing disabled (the noop provider installed) all of this
/// degrades to header bookkeeping on an unsampled span.
pub struct ClientTracing;

impl<E: Endpoint> Middleware<E> for ClientTracing {
    type Output = ClientTracingEndpoint<E>;

    fn transform(&self, ep: E) -> Self::Output {
        ClientTracingEndpoint { inner: ep }
    }
}

/// The endpoint wrapper produced by [`ClientTracing`].
pub struct ClientTracingEndpoint<E> {
    inner: E,
}

impl<E: Endpoint> Endpoint for ClientTracingEndpoint<E> {
    type Output = E::Output;

    async fn call(&self, mut req: Request) -> Result<Self::Output> {
        let cx = start_span_with_kind(
            &Context::current(),
            req.uri().path(),
            SpanKind::Client,
            &[Attr::string(URL_FULL, req.uri().to_string())],
        );

        global::get_text_map_propagator(|propagator| {
            propagator.inject_context(&cx, &mut HeaderInjector(req.headers_mut()))
        });

        let result = self.inner.call(req).with_context(cx.clone()).await;
        match &result {
            Ok(_) => end_span(&cx, None),
            Err(err) => end_span_with_status(&cx, Status::error(err.to_string())),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use opentelemetry::trace::TraceContextExt;
    use opentelemetry_sdk::propagation::TraceContextPropagator;
    use opentelemetry_sdk::trace::SdkTracerProvider;

    use poem::{IntoResponse, Response};

    use super::*;

    struct TraceparentEcho;

    impl Endpoint for TraceparentEcho {
        type Output = Response;

        async fn call(&self, req: Request) -> Result<Self::Output> {
            let traceparent = req
                .headers()
                .get("traceparent")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            Ok(traceparent.into_response())
        }
    }

    struct SpanProbe;

    impl Endpoint for SpanProbe {
        type Output = Response;

        async fn call(&self, _req: Request) -> Result<Self::Output> {
            let active = Context::current().span().span_context().is_valid();
            Ok(active.to_string().into_response())
        }
    }

    #[tokio::test]
    async fn outgoing_requests_carry_trace_context() {
        global::set_tracer_provider(SdkTracerProvider::builder().build());
        global::set_text_map_propagator(TraceContextPropagator::new());

        let ep = ClientTracing.transform(TraceparentEcho);

        let req = Request::builder().uri("/svc/Method".parse().unwrap()).finish();
        let resp = ep.call(req).await.unwrap();
        let traceparent = resp.into_body().into_string().await.unwrap();
        assert!(!traceparent.is_empty(), "traceparent header should be injected");
    }

    #[tokio::test]
    async fn inner_endpoint_runs_inside_the_span() {
        global::set_tracer_provider(SdkTracerProvider::builder().build());

        let ep = ClientTracing.transform(SpanProbe);

        let resp = ep.call(Request::default()).await.unwrap();
        let active = resp.into_body().into_string().await.unwrap();
        assert_eq!(active, "true");
    }
}
