use clap::Parser;
use std::path::PathBuf;

/// Runtime settings, each sourced from a flag or its environment variable.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Settings {
    /// Address the edge listener binds to.
    #[arg(long, env = "EDGE_LISTEN_ADDR", default_value = "0.0.0.0:8080")]
    pub listen_addr: String,

    /// Absolute base URL of the backend installer API.
    #[arg(long, env = "EDGE_UPSTREAM_URL")]
    pub upstream_url: String,

    /// PEM bundle of additional trusted roots for the upstream connection.
    #[arg(long, env = "EDGE_UPSTREAM_CA_BUNDLE")]
    pub upstream_ca_bundle: Option<PathBuf>,

    /// Skip upstream certificate verification. Development only.
    #[arg(long, env = "EDGE_UPSTREAM_SKIP_VERIFY", default_value_t = false)]
    pub upstream_skip_verify: bool,

    /// Route prefix stripped from inbound paths before forwarding.
    #[arg(long, env = "EDGE_API_PREFIX", default_value = "/api/assisted-install/")]
    pub api_prefix: String,

    /// Directory holding the built SPA bundle.
    #[arg(long, env = "EDGE_STATIC_DIR", default_value = "dist")]
    pub static_dir: PathBuf,

    /// Certificate for the edge listener; enables TLS together with --tls-key.
    #[arg(long, env = "EDGE_TLS_CERT", requires = "tls_key")]
    pub tls_cert: Option<PathBuf>,

    /// Private key for the edge listener.
    #[arg(long, env = "EDGE_TLS_KEY", requires = "tls_cert")]
    pub tls_key: Option<PathBuf>,

    /// File touched when a cluster reset is requested.
    #[arg(long, env = "EDGE_RESET_SENTINEL", default_value = "/tmp/assisted-edge-reset")]
    pub reset_sentinel: PathBuf,
}

impl Settings {
    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            ca_bundle: self.upstream_ca_bundle.clone(),
            insecure_skip_verify: self.upstream_skip_verify,
        }
    }

    pub fn tls(&self) -> Option<TlsConfig> {
        match (&self.tls_cert, &self.tls_key) {
            (Some(cert), Some(key)) => Some(TlsConfig {
                cert_path: cert.clone(),
                key_path: key.clone(),
            }),
            _ => None,
        }
    }
}

/// TLS parameters used when dialing the upstream. Owned by the HTTP client;
/// never mutated after construction.
#[derive(Debug, Clone, Default)]
pub struct TransportConfig {
    pub ca_bundle: Option<PathBuf>,
    pub insecure_skip_verify: bool,
}

/// Certificate pair for the edge listener itself.
#[derive(Debug, Clone)]
pub struct TlsConfig {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}
