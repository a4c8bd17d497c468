//! Poem middleware for gRPC services.
//!
//! Each interceptor is a [`Middleware`](poem::Middleware) producing an
//! [`Endpoint`](poem::Endpoint) wrapper, so they stack in the usual poem
//! way:
//!
//! ```rust,ignore
//! let app = route
//!     .with(Recovery::new())
//!     .with(RequestLogging::new())
//!     .with(Authenticate::new(validator));
//! ```
//!
//! Failures are answered as gRPC Trailers-Only replies: an HTTP 200 with
//! `grpc-status` and `grpc-message` headers, built by
//! [`status::error_reply`].

pub mod auth;
pub mod logging;
pub mod recovery;
pub mod status;
pub mod tracing;

pub use auth::{AuthError, AuthInfo, Authenticate, Validator};
pub use logging::{RequestLogging, REQUEST_ID_HEADER};
pub use recovery::Recovery;
pub use status::Code;
pub use tracing::ClientTracing;
