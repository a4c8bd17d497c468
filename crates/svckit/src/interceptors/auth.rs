use std::sync::Arc;

use async_trait::async_trait;
use poem::http::HeaderMap;
use poem::{Endpoint, IntoResponse, Middleware, Request, Response, Result};

use super::status::{error_reply, Code};

/// Authentication failure reported by a [`Validator`].
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing credentials")]
    MissingCredentials,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("{0}")]
    Other(String),
}

/// Credential validation seam.
///
/// Implementations inspect the request headers (gRPC metadata travels as
/// HTTP/2 headers) and produce the caller's claims, whatever shape those
/// take for the service.
#[async_trait]
pub trait Validator: Send + Sync {
    type Claims: Clone + Send + Sync + 'static;

    async fn validate(&self, headers: &HeaderMap) -> Result<Self::Claims, AuthError>;
}

/// The claims of an authenticated request, stored in request extensions.
///
/// Handlers read them back with `req.data::<AuthInfo<MyClaims>>()`.
#[derive(Debug, Clone)]
pub struct AuthInfo<C>(pub C);

type ErrorHandler = Arc<dyn Fn(AuthError) -> Response + Send + Sync>;

/// Middleware that authenticates every request through a [`Validator`].
///
/// On success the claims are attached to the request for handlers to read.
/// On failure the request is answered with an `Unauthenticated` reply
/// without reaching the inner endpoint; the reply can be customized with
/// [`Authenticate::with_error_handler`].
pub struct Authenticate<V> {
    validator: Arc<V>,
    error_handler: Option<ErrorHandler>,
}

impl<V> Authenticate<V> {
    pub fn new(validator: V) -> Self {
        Self {
            validator: Arc::new(validator),
            error_handler: None,
        }
    }

    pub fn with_error_handler(
        mut self,
        handler: impl Fn(AuthError) -> Response + Send + Sync + 'static,
    ) -> Self {
        self.error_handler = Some(Arc::new(handler));
        self
    }
}

impl<V: Validator + 'static, E: Endpoint> Middleware<E> for Authenticate<V> {
    type Output = AuthenticateEndpoint<V, E>;

    fn transform(&self, ep: E) -> Self::Output {
        AuthenticateEndpoint {
            inner: ep,
            validator: self.validator.clone(),
            error_handler: self.error_handler.clone(),
        }
    }
}

/// The endpoint wrapper produced by [`Authenticate`].
pub struct AuthenticateEndpoint<V, E> {
    inner: E,
    validator: Arc<V>,
    error_handler: Option<ErrorHandler>,
}

impl<V: Validator + 'static, E: Endpoint> Endpoint for AuthenticateEndpoint<V, E> {
    type Output = Response;

    async fn call(&self, mut req: Request) -> Result<Self::Output> {
        match self.validator.validate(req.headers()).await {
            Ok(claims) => {
                req.extensions_mut().insert(AuthInfo(claims));
                self.inner.call(req).await.map(IntoResponse::into_response)
            }
            Err(err) => match &self.error_handler {
                Some(handler) => Ok(handler(err)),
                None => Ok(error_reply(Code::Unauthenticated, &err.to_string())),
            },
        }
    }
}
