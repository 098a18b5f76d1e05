pub mod http_client;
pub mod prober;
pub mod reset;
pub mod server;
pub mod spa;

pub use http_client::HyperHttpClient;
pub use reset::ResetSentinel;
pub use spa::SpaBundle;
