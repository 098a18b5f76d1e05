use std::sync::Arc;

use axum::body::Body;
use hyper::header::{self, HeaderName, HeaderValue};
use hyper::{Request, Response, StatusCode, Uri};
use thiserror::Error;

use crate::core::upstream::UpstreamTarget;
use crate::ports::http_client::{HttpClient, HttpClientError};

/// Request header carrying the original inbound host across the proxy hop.
pub const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");

/// Response headers removed before relaying, so the edge process stays the
/// single source of CORS policy. Header names are case-insensitive.
const STRIPPED_CORS_HEADERS: [HeaderName; 4] = [
    header::ACCESS_CONTROL_ALLOW_HEADERS,
    header::ACCESS_CONTROL_ALLOW_METHODS,
    header::ACCESS_CONTROL_ALLOW_ORIGIN,
    header::ACCESS_CONTROL_EXPOSE_HEADERS,
];

#[derive(Error, Debug)]
pub enum ForwarderError {
    #[error("route prefix '{0}' must start and end with '/'")]
    InvalidPrefix(String),

    #[error("upstream authority '{0}' is not a valid Host header value")]
    InvalidAuthority(String),
}

/// Reverse proxy for exactly one upstream target.
///
/// Holds only immutable state set at construction, so a single instance is
/// shared across all in-flight requests without locking. Cancellation rides
/// on the handler future: when the inbound client disconnects, the future is
/// dropped and the outbound request is abandoned with it.
pub struct Forwarder {
    target: UpstreamTarget,
    prefix: String,
    host_header: HeaderValue,
    client: Arc<dyn HttpClient>,
}

impl Forwarder {
    pub fn new(
        target: UpstreamTarget,
        prefix: impl Into<String>,
        client: Arc<dyn HttpClient>,
    ) -> Result<Self, ForwarderError> {
        let prefix = prefix.into();
        if !prefix.starts_with('/') || !prefix.ends_with('/') {
            return Err(ForwarderError::InvalidPrefix(prefix));
        }

        let host_header = HeaderValue::from_str(target.authority())
            .map_err(|_| ForwarderError::InvalidAuthority(target.authority().to_string()))?;

        Ok(Self {
            target,
            prefix,
            host_header,
            client,
        })
    }

    /// Route prefix stripped from inbound paths; never sent upstream.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Relay one inbound request to the upstream and hand back its response.
    ///
    /// Upstream failures surface as a generic gateway error; the caller
    /// never sees transport details beyond the status code.
    pub async fn forward(&self, req: Request<Body>) -> Response<Body> {
        let outbound = match self.rewrite(req) {
            Ok(outbound) => outbound,
            Err(response) => return response,
        };

        match self.client.send_request(outbound).await {
            Ok(mut response) => {
                for name in &STRIPPED_CORS_HEADERS {
                    response.headers_mut().remove(name);
                }
                response
            }
            Err(err) => {
                tracing::error!("upstream request failed: {err}");
                let status = match err {
                    HttpClientError::Connection(_) | HttpClientError::InvalidRequest(_) => {
                        StatusCode::BAD_GATEWAY
                    }
                };
                error_response(status)
            }
        }
    }

    /// Rewrites an inbound request into the outbound upstream request.
    ///
    /// Pure with respect to the network, so tests feed synthetic requests
    /// through it and inspect the result without a real upstream.
    fn rewrite(&self, mut req: Request<Body>) -> Result<Request<Body>, Response<Body>> {
        let path = req.uri().path().to_string();
        // The router only dispatches prefixed paths here; anything else
        // must not leak upstream with the prefix still attached.
        let rest = match path.strip_prefix(&self.prefix) {
            Some(rest) => rest,
            None => {
                tracing::error!(
                    %path,
                    prefix = %self.prefix,
                    "request outside the route prefix reached the forwarder"
                );
                return Err(error_response(StatusCode::NOT_FOUND));
            }
        };

        let uri_string = self.target.endpoint(rest, req.uri().query());
        let uri: Uri = match uri_string.parse() {
            Ok(uri) => uri,
            Err(err) => {
                tracing::error!("failed to build upstream URI '{uri_string}': {err}");
                return Err(error_response(StatusCode::BAD_GATEWAY));
            }
        };

        // Preserve the inbound host before the Host header is overwritten
        // with the upstream authority. HTTP/2 requests carry the host in the
        // URI authority rather than a Host header.
        let inbound_host = req.headers().get(header::HOST).cloned().or_else(|| {
            req.uri()
                .authority()
                .and_then(|authority| HeaderValue::from_str(authority.as_str()).ok())
        });
        if let Some(host) = inbound_host {
            req.headers_mut().insert(X_FORWARDED_HOST, host);
        }
        req.headers_mut()
            .insert(header::HOST, self.host_header.clone());

        *req.uri_mut() = uri;
        Ok(req)
    }
}

fn error_response(status: StatusCode) -> Response<Body> {
    Response::builder()
        .status(status)
        .body(Body::from(status.canonical_reason().unwrap_or("error")))
        .unwrap()
}
