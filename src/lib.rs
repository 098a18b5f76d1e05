//! assisted-edge - edge proxy for the installer web console.
//!
//! Terminates inbound HTTP(S), forwards `/api/assisted-install/...` traffic
//! to a single upstream API over TLS, serves the SPA bundle with index
//! fallback for everything else, and exposes a reset side channel that
//! touches a sentinel file.

pub mod adapters;
pub mod config;
pub mod core;
pub mod ports;
pub mod tracing_setup;

pub use crate::adapters::http_client::HyperHttpClient;
pub use crate::adapters::prober::probe_upstream;
pub use crate::adapters::reset::ResetSentinel;
pub use crate::adapters::spa::SpaBundle;
pub use crate::core::forwarder::Forwarder;
pub use crate::core::upstream::UpstreamTarget;
