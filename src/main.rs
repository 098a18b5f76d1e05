use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use assisted_edge::adapters::server;
use assisted_edge::config::{ConfigValidator, Settings};
use assisted_edge::{Forwarder, HyperHttpClient, ResetSentinel, SpaBundle, probe_upstream};

#[tokio::main]
async fn main() -> Result<()> {
    assisted_edge::tracing_setup::init_tracing();

    // Install the process-wide crypto provider before any TLS config is built.
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let settings = Settings::parse();
    let (addr, target) =
        ConfigValidator::validate(&settings).context("invalid configuration")?;

    let client = Arc::new(
        HyperHttpClient::new(&settings.transport())
            .context("failed to build upstream HTTP client")?,
    );

    // Fail fast: an unreachable or unhealthy upstream keeps the listener
    // from ever binding.
    probe_upstream(client.as_ref(), &target)
        .await
        .context("upstream health check failed")?;
    tracing::info!(upstream = %settings.upstream_url, "upstream is reachable and healthy");

    let forwarder = Arc::new(Forwarder::new(target, settings.api_prefix.clone(), client)?);
    let spa = SpaBundle::new(&settings.static_dir);
    let sentinel = Arc::new(ResetSentinel::new(&settings.reset_sentinel));

    let app = server::build_router(forwarder, spa, sentinel);
    server::run(addr, settings.tls().as_ref(), app).await
}
