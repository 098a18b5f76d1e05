use axum::body::Body;
use hyper::{Method, Request, StatusCode};
use thiserror::Error;

use crate::core::upstream::UpstreamTarget;
use crate::ports::http_client::{HttpClient, HttpClientError};

/// Liveness path probed once at startup, relative to the upstream base URL.
const LIVENESS_PATH: &str = "v2/clusters";

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("upstream probe to {url} failed: {source}")]
    Unreachable {
        url: String,
        #[source]
        source: HttpClientError,
    },

    #[error("upstream probe to {url} returned status {status}")]
    Unhealthy { url: String, status: StatusCode },

    #[error("failed to build probe request for {url}: {reason}")]
    InvalidRequest { url: String, reason: String },
}

/// One-shot startup health check against the upstream's cluster listing.
///
/// Any failure is fatal to startup. There is deliberately no retry, no
/// backoff, and no periodic re-check: the process fails fast at boot and an
/// upstream outage after startup only surfaces per-request.
pub async fn probe_upstream(
    client: &dyn HttpClient,
    target: &UpstreamTarget,
) -> Result<(), ProbeError> {
    let url = target.endpoint(LIVENESS_PATH, None);
    tracing::info!(%url, "probing upstream before serving traffic");

    let req = Request::builder()
        .method(Method::GET)
        .uri(&url)
        .body(Body::empty())
        .map_err(|err| ProbeError::InvalidRequest {
            url: url.clone(),
            reason: err.to_string(),
        })?;

    let response = client
        .send_request(req)
        .await
        .map_err(|source| ProbeError::Unreachable {
            url: url.clone(),
            source,
        })?;

    if response.status() != StatusCode::OK {
        return Err(ProbeError::Unhealthy {
            url,
            status: response.status(),
        });
    }

    Ok(())
}
