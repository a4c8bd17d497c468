use std::any::Any;
use std::backtrace::Backtrace;
use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;
use poem::{Endpoint, IntoResponse, Middleware, Request, Response, Result};

use crate::logging::{self, Attr, Logger};

use super::status::{error_reply, Code};

/// Middleware that turns a panicking handler into an `Internal` gRPC reply.
///
/// The panic message is logged at error level together with a captured
/// backtrace; the caller sees a generic message, never the panic payload.
pub struct Recovery {
    logger: Logger,
}

impl Recovery {
    pub fn new() -> Self {
        Self {
            logger: logging::default_logger(),
        }
    }

    pub fn with_logger(logger: Logger) -> Self {
        Self { logger }
    }
}

impl Default for Recovery {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Endpoint> Middleware<E> for Recovery {
    type Output = RecoveryEndpoint<E>;

    fn transform(&self, ep: E) -> Self::Output {
        RecoveryEndpoint {
            inner: ep,
            logger: self.logger.clone(),
        }
    }
}

/// The endpoint wrapper produced by [`Recovery`].
pub struct RecoveryEndpoint<E> {
    inner: E,
    logger: Logger,
}

impl<E: Endpoint> Endpoint for RecoveryEndpoint<E> {
    type Output = Response;

    async fn call(&self, req: Request) -> Result<Self::Output> {
        match AssertUnwindSafe(self.inner.call(req)).catch_unwind().await {
            Ok(result) => result.map(IntoResponse::into_response),
            Err(panic) => {
                let backtrace = Backtrace::force_capture();
                self.logger.error(
                    format!("recovered from panic: {}", panic_message(&panic)),
                    vec![Attr::string("stack", backtrace.to_string())],
                );
                Ok(error_reply(Code::Internal, "unexpected error"))
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
