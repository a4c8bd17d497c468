use std::time::{Duration, Instant};

use chrono::Utc;
use poem::http::HeaderValue;
use poem::{Endpoint, IntoResponse, Middleware, Request, Response, Result};
use uuid::Uuid;

use crate::logging::{self, Attr, Logger};
use crate::request_ext::RequestExt;

use super::status::status_from_response;

/// Header carrying the request id across services.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Middleware logging one line when a request arrives and one when its
/// response leaves, tagged with a request id and the observed latency.
///
/// The request id is taken from the `x-request-id` header when the caller
/// supplies one and generated (UUIDv7) otherwise; either way it is ensured
/// on the forwarded request and echoed on the response, so the id can be
/// followed through logs on both sides of the hop.
pub struct RequestLogging {
    logger: Logger,
}

impl RequestLogging {
    pub fn new() -> Self {
        Self {
            logger: logging::default_logger(),
        }
    }

    /// Routes the interceptor's output through a specific logger instead of
    /// the process default.
    pub fn with_logger(logger: Logger) -> Self {
        Self { logger }
    }
}

impl Default for RequestLogging {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Endpoint> Middleware<E> for RequestLogging {
    type Output = RequestLoggingEndpoint<E>;

    fn transform(&self, ep: E) -> Self::Output {
        RequestLoggingEndpoint {
            inner: ep,
            logger: self.logger.clone(),
        }
    }
}

/// The endpoint wrapper produced by [`RequestLogging`].
pub struct RequestLoggingEndpoint<E> {
    inner: E,
    logger: Logger,
}

impl<E: Endpoint> Endpoint for RequestLoggingEndpoint<E> {
    type Output = Response;

    async fn call(&self, mut req: Request) -> Result<Self::Output> {
        let request_id = req
            .request_id()
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::now_v7().to_string());
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            req.headers_mut().insert(REQUEST_ID_HEADER, value);
        }

        let procedure = req.uri().path().to_string();
        let logger = self
            .logger
            .with_attrs(vec![Attr::string("request-id", request_id.clone())]);

        logger.info(
            format!("request calling: {procedure}"),
            vec![Attr::string("request-time", Utc::now().to_rfc3339())],
        );
        logger.debug(
            format!("request method: {}", req.method()),
            vec![Attr::string("uri", req.uri().to_string())],
        );

        let started = Instant::now();
        let result = self.inner.call(req).await;
        let latency = started.elapsed();

        let response_attrs = vec![
            Attr::string("response-time", Utc::now().to_rfc3339()),
            Attr::string("latency", format_latency(latency)),
        ];

        match result {
            Ok(resp) => {
                let mut resp = resp.into_response();
                if let Ok(value) = HeaderValue::from_str(&request_id) {
                    resp.headers_mut().insert(REQUEST_ID_HEADER, value);
                }
                let code = status_from_response(&resp);
                if code.is_error() {
                    let mut attrs = response_attrs;
                    attrs.push(Attr::int("grpc-status", i64::from(i32::from(code))));
                    logger.error(format!("response calling: {procedure}"), attrs);
                } else {
                    logger.info(format!("response calling: {procedure}"), response_attrs);
                }
                Ok(resp)
            }
            Err(err) => {
                logger.error(format!("error calling: {procedure}: {err}"), response_attrs);
                Err(err)
            }
        }
    }
}

/// Formats a latency as wall-clock style `HH:MM:SS.mmm`.
fn format_latency(latency: Duration) -> String {
    let secs = latency.as_secs();
    let millis = latency.subsec_millis();
    format!(
        "{:02}:{:02}:{:02}.{:03}",
        secs / 3600,
        (secs % 3600) / 60,
        secs % 60,
        millis
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use poem::http::StatusCode;

    use super::*;
    use crate::logging::{JsonSink, Level, MemoryWriter, SinkOptions};

    fn capture_logger(buf: &MemoryWriter) -> Logger {
        Logger::new(Arc::new(JsonSink::new(
            SinkOptions::new()
                .with_writer(buf.clone())
                .with_level(Level::Debug),
        )))
    }

    struct Pong;

    impl Endpoint for Pong {
        type Output = Response;

        async fn call(&self, _req: Request) -> Result<Self::Output> {
            Ok("pong".into_response())
        }
    }

    struct RequestIdEcho;

    impl Endpoint for RequestIdEcho {
        type Output = Response;

        async fn call(&self, req: Request) -> Result<Self::Output> {
            let id = req
                .headers()
                .get(REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            Ok(id.into_response())
        }
    }

    struct FailsInternally;

    impl Endpoint for FailsInternally {
        type Output = Response;

        async fn call(&self, _req: Request) -> Result<Self::Output> {
            Ok(crate::interceptors::status::error_reply(
                crate::interceptors::Code::Internal,
                "boom",
            ))
        }
    }

    #[test]
    fn latency_formats_as_wall_clock() {
        assert_eq!(format_latency(Duration::from_millis(3_661_500)), "01:01:01.500");
        assert_eq!(format_latency(Duration::from_millis(42)), "00:00:00.042");
    }

    #[tokio::test]
    async fn logs_both_sides_of_the_call() {
        let buf = MemoryWriter::new();
        let ep = RequestLogging::with_logger(capture_logger(&buf)).transform(Pong);

        let req = Request::builder().uri("/ping".parse().unwrap()).finish();
        let resp = ep.call(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().get(REQUEST_ID_HEADER).is_some());

        let contents = buf.contents();
        assert!(contents.contains("request calling: /ping"));
        assert!(contents.contains("response calling: /ping"));
        assert!(contents.contains("request-id"));
        assert!(contents.contains("latency"));
    }

    #[tokio::test]
    async fn caller_supplied_request_id_is_kept() {
        let buf = MemoryWriter::new();
        let ep = RequestLogging::with_logger(capture_logger(&buf)).transform(RequestIdEcho);

        let req = Request::builder()
            .header(REQUEST_ID_HEADER, "req-12345")
            .finish();
        let resp = ep.call(req).await.unwrap();

        assert_eq!(
            resp.headers()
                .get(REQUEST_ID_HEADER)
                .unwrap()
                .to_str()
                .unwrap(),
            "req-12345"
        );
        assert!(buf.contents().contains("req-12345"));
    }

    #[tokio::test]
    async fn error_replies_log_at_error_level() {
        let buf = MemoryWriter::new();
        let ep = RequestLogging::with_logger(capture_logger(&buf)).transform(FailsInternally);

        let resp = ep.call(Request::default()).await.unwrap();
        assert_eq!(status_from_response(&resp), crate::interceptors::Code::Internal);

        let contents = buf.contents();
        assert!(contents.contains("\"level\":\"ERROR\""));
        assert!(contents.contains("\"grpc-status\":13"));
    }
}
