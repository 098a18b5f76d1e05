use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

use crate::config::models::Settings;
use crate::core::upstream::{UpstreamTarget, UpstreamUrlError};

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("invalid listen address '{address}': {reason}")]
    InvalidListenAddress { address: String, reason: String },

    #[error(transparent)]
    InvalidUpstreamUrl(#[from] UpstreamUrlError),

    #[error("invalid field '{field}': {message}")]
    InvalidField { field: String, message: String },

    #[error("file not found: {path}")]
    FileNotFound { path: String },
}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Startup-time settings validator.
///
/// Everything caught here is a deployment error; validation runs before the
/// listener binds so a broken proxy never starts serving.
pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(settings: &Settings) -> ValidationResult<(SocketAddr, UpstreamTarget)> {
        let addr: SocketAddr = settings.listen_addr.parse().map_err(
            |err: std::net::AddrParseError| ValidationError::InvalidListenAddress {
                address: settings.listen_addr.clone(),
                reason: err.to_string(),
            },
        )?;

        let target = UpstreamTarget::parse(&settings.upstream_url)?;

        if !settings.api_prefix.starts_with('/') || !settings.api_prefix.ends_with('/') {
            return Err(ValidationError::InvalidField {
                field: "api_prefix".to_string(),
                message: "route prefix must start and end with '/'".to_string(),
            });
        }

        if let Some(path) = &settings.upstream_ca_bundle {
            Self::require_file(path)?;
        }
        if let Some(path) = &settings.tls_cert {
            Self::require_file(path)?;
        }
        if let Some(path) = &settings.tls_key {
            Self::require_file(path)?;
        }

        Ok((addr, target))
    }

    fn require_file(path: &Path) -> ValidationResult<()> {
        if path.is_file() {
            Ok(())
        } else {
            Err(ValidationError::FileNotFound {
                path: path.display().to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn settings(upstream_url: &str) -> Settings {
        Settings {
            listen_addr: "0.0.0.0:8080".to_string(),
            upstream_url: upstream_url.to_string(),
            upstream_ca_bundle: None,
            upstream_skip_verify: false,
            api_prefix: "/api/assisted-install/".to_string(),
            static_dir: PathBuf::from("dist"),
            tls_cert: None,
            tls_key: None,
            reset_sentinel: PathBuf::from("/tmp/assisted-edge-reset"),
        }
    }

    #[test]
    fn accepts_minimal_settings() {
        let (addr, target) = ConfigValidator::validate(&settings("https://api.example.com"))
            .expect("settings should validate");
        assert_eq!(addr.port(), 8080);
        assert_eq!(target.authority(), "api.example.com");
    }

    #[test]
    fn rejects_empty_upstream_url() {
        assert!(matches!(
            ConfigValidator::validate(&settings("")),
            Err(ValidationError::InvalidUpstreamUrl(UpstreamUrlError::Empty))
        ));
    }

    #[test]
    fn rejects_malformed_upstream_url() {
        assert!(matches!(
            ConfigValidator::validate(&settings("://nope")),
            Err(ValidationError::InvalidUpstreamUrl(_))
        ));
    }

    #[test]
    fn rejects_bad_listen_address() {
        let mut s = settings("https://api.example.com");
        s.listen_addr = "not-an-addr".to_string();
        assert!(matches!(
            ConfigValidator::validate(&s),
            Err(ValidationError::InvalidListenAddress { .. })
        ));
    }

    #[test]
    fn rejects_prefix_without_trailing_slash() {
        let mut s = settings("https://api.example.com");
        s.api_prefix = "/api/assisted-install".to_string();
        assert!(matches!(
            ConfigValidator::validate(&s),
            Err(ValidationError::InvalidField { .. })
        ));
    }

    #[test]
    fn rejects_missing_ca_bundle_file() {
        let mut s = settings("https://api.example.com");
        s.upstream_ca_bundle = Some(PathBuf::from("/nonexistent/ca.pem"));
        assert!(matches!(
            ConfigValidator::validate(&s),
            Err(ValidationError::FileNotFound { .. })
        ));
    }

    #[test]
    fn accepts_existing_ca_bundle_file() {
        let mut ca = tempfile::NamedTempFile::new().unwrap();
        ca.write_all(b"not checked here").unwrap();

        let mut s = settings("https://api.example.com");
        s.upstream_ca_bundle = Some(ca.path().to_path_buf());
        assert!(ConfigValidator::validate(&s).is_ok());
    }
}
