use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use axum::Router;
use axum::body::Body;
use axum::extract::{Request, State};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum_server::tls_rustls::RustlsConfig;
use hyper::StatusCode;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::adapters::reset::ResetSentinel;
use crate::adapters::spa::SpaBundle;
use crate::config::TlsConfig;
use crate::core::Forwarder;

/// Upper bound on a single inbound exchange, read and write included.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Clone)]
struct AppState {
    forwarder: Arc<Forwarder>,
    spa: SpaBundle,
    sentinel: Arc<ResetSentinel>,
}

/// Assembles the edge router: the reset side channel, the API proxy under
/// its prefix, and the SPA bundle for everything else.
pub fn build_router(
    forwarder: Arc<Forwarder>,
    spa: SpaBundle,
    sentinel: Arc<ResetSentinel>,
) -> Router {
    let state = AppState {
        forwarder,
        spa,
        sentinel,
    };

    Router::new()
        .route("/reset", post(handle_reset))
        .fallback(handle_request)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
}

async fn handle_reset(State(state): State<AppState>) -> Response {
    match state.sentinel.touch().await {
        Ok(()) => (StatusCode::OK, "reset requested").into_response(),
        Err(err) => {
            tracing::error!(
                sentinel = %state.sentinel.path().display(),
                "failed to touch reset sentinel: {err}"
            );
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

async fn handle_request(State(state): State<AppState>, req: Request<Body>) -> Response {
    if req.uri().path().starts_with(state.forwarder.prefix()) {
        state.forwarder.forward(req).await.into_response()
    } else {
        state.spa.serve(req).await
    }
}

/// Binds the listener and serves the router, with TLS when a certificate
/// pair is configured.
pub async fn run(addr: SocketAddr, tls: Option<&TlsConfig>, app: Router) -> Result<()> {
    if let Some(tls) = tls {
        tracing::info!("starting edge server with TLS on {addr}");

        let cert_data = tokio::fs::read(&tls.cert_path).await.with_context(|| {
            format!(
                "failed to read certificate file: {}",
                tls.cert_path.display()
            )
        })?;
        let key_data = tokio::fs::read(&tls.key_path)
            .await
            .with_context(|| format!("failed to read key file: {}", tls.key_path.display()))?;

        let cert_chain: Vec<CertificateDer<'static>> =
            rustls_pemfile::certs(&mut cert_data.as_slice())
                .collect::<Result<_, _>>()
                .context("failed to parse certificate PEM")?;
        let key_der: PrivateKeyDer<'static> = rustls_pemfile::private_key(&mut key_data.as_slice())
            .with_context(|| {
                format!("failed to parse private key file: {}", tls.key_path.display())
            })?
            .ok_or_else(|| anyhow!("no private key found in {}", tls.key_path.display()))?;

        let server_config = rustls::ServerConfig::builder()
            .with_no_client_auth()
            .with_single_cert(cert_chain, key_der)
            .context("failed to create TLS server config")?;

        axum_server::bind_rustls(addr, RustlsConfig::from_config(Arc::new(server_config)))
            .serve(app.into_make_service())
            .await
            .map_err(|err| anyhow!("TLS server error: {err}"))?;
    } else {
        tracing::info!("starting edge server without TLS on {addr}");

        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind to address: {addr}"))?;
        axum::serve(listener, app.into_make_service())
            .await
            .map_err(|err| anyhow!("server error: {err}"))?;
    }

    Ok(())
}
