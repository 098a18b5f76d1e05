pub mod forwarder;
pub mod upstream;

pub use forwarder::Forwarder;
pub use upstream::UpstreamTarget;
