use axum::body::Body;
use hyper::{Request, Response};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Error type for HTTP client operations against the upstream.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum HttpClientError {
    /// Connecting to or exchanging data with the upstream failed.
    #[error("connection error: {0}")]
    Connection(String),

    /// The outbound request could not be constructed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Result type alias for HTTP client operations.
pub type HttpClientResult<T> = Result<T, HttpClientError>;

/// Type alias for async HTTP request responses.
pub type HttpResponseFuture<'a> =
    Pin<Box<dyn Future<Output = HttpClientResult<Response<Body>>> + Send + 'a>>;

/// HttpClient defines the port (interface) for dialing the upstream.
///
/// The forwarder and the startup prober only see this trait, so both can be
/// exercised in tests with a synthetic client and no network.
pub trait HttpClient: Send + Sync + 'static {
    /// Send an HTTP request to the upstream and return its response.
    fn send_request<'a>(&'a self, req: Request<Body>) -> HttpResponseFuture<'a>;
}
