macro_rules! define_values {
    ($($(#[$docs:meta])* ($method:ident, $name:literal)),*) => {
        $(
            $(#[$docs])*
            fn $method(&self) -> Option<&str>;
        )*
    };
}

/// Extension trait for extracting cross-cutting metadata from an incoming
/// request.
///
/// All values are read from the request's headers (gRPC metadata travels as
/// HTTP/2 headers). Methods return `None` when the corresponding field is
/// absent.
///
/// The trait is implemented for [`poem::Request`] and blanket-implemented
/// for all [`poem_grpc::Request<T>`] types, so service handlers and
/// middleware share one vocabulary:
///
/// ```rust,ignore
/// use svckit::RequestExt;
///
/// async fn handle(req: poem_grpc::Request<MyMessage>) {
///     let id = req.request_id().unwrap_or("-");
///     let language = req.prefer_language().or(req.accept_language());
/// }
/// ```
pub trait RequestExt {
    define_values!(
        /// Returns the request id from the `x-request-id` field.
        (request_id, "x-request-id"),
        /// Returns the real client IP from the `x-real-ip` field.
        ///
        /// Typically set by the reverse proxy / API gateway.
        (real_ip, "x-real-ip"),
        /// Returns the client user-agent string from the `x-user-agent` field.
        (user_agent, "x-user-agent"),
        /// Returns the `Accept-Language` value from the `accept-language` field.
        (accept_language, "accept-language"),
        /// Returns the preferred language from the `x-prefer-language` field.
        ///
        /// This takes priority over [`accept_language`](Self::accept_language)
        /// when the client explicitly overrides the display language.
        (prefer_language, "x-prefer-language")
    );
}

macro_rules! impl_grpc_values {
    ($($(#[$docs:meta])* ($method:ident, $name:literal)),*) => {
        $(
            #[inline]
            fn $method(&self) -> Option<&str> {
                self.metadata().get($name)
            }
        )*
    };
}

macro_rules! impl_header_values {
    ($($(#[$docs:meta])* ($method:ident, $name:literal)),*) => {
        $(
            #[inline]
            fn $method(&self) -> Option<&str> {
                self.headers().get($name).and_then(|value| value.to_str().ok())
            }
        )*
    };
}

impl<T> RequestExt for poem_grpc::Request<T> {
    impl_grpc_values!(
        (request_id, "x-request-id"),
        (real_ip, "x-real-ip"),
        (user_agent, "x-user-agent"),
        (accept_language, "accept-language"),
        (prefer_language, "x-prefer-language")
    );
}

impl RequestExt for poem::Request {
    impl_header_values!(
        (request_id, "x-request-id"),
        (real_ip, "x-real-ip"),
        (user_agent, "x-user-agent"),
        (accept_language, "accept-language"),
        (prefer_language, "x-prefer-language")
    );
}
