pub mod models;
pub mod validation;

pub use models::{Settings, TlsConfig, TransportConfig};
pub use validation::{ConfigValidator, ValidationError};
